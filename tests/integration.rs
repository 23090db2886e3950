use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

fn termref_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_termref"));
    cmd.current_dir(dir);
    cmd.env_remove("TERMREF_LOG");
    cmd.env("GIT_CEILING_DIRECTORIES", dir);
    cmd
}

fn run_with_stdin(dir: &Path, args: &[&str], stdin: &str) -> Output {
    let mut child = termref_cmd(dir)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(stdin.as_bytes()).unwrap();
    child.wait_with_output().unwrap()
}

fn dry_run(dir: &Path, text: &str, extra: &[&str]) -> serde_json::Value {
    let output = termref_cmd(dir).args(["open", text, "--dry-run"]).args(extra).output().unwrap();
    assert!(output.status.success(), "open failed: {}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn scan_stdin_lists_links_per_line() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_with_stdin(dir.path(), &["scan"], "Fixed #42 and closed\nnothing here\n\x1b[31mBug#7\x1b[0m src/baz.ts:10:5\n");
    assert!(output.status.success(), "scan failed: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout).unwrap();
    let rows: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        rows,
        [
            "1:6+3  issue      42  Open #42 on GitHub",
            "3:0+5  work-item  7  Open Bug#7 in Azure DevOps",
            "3:6+15  file       src/baz.ts:10:5  Open baz.ts",
        ]
    );
}

#[test]
fn scan_file_as_json_keeps_matches_from_every_rule() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("build.log"), "See PR #99 for details\n").unwrap();

    let output = termref_cmd(dir.path())
        .args(["scan", "build.log", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let rows: Vec<serde_json::Value> = String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["span"]["start"], 4);
    assert_eq!(rows[1]["span"]["start"], 7);
    assert!(rows.iter().all(|r| r["span"]["target"]["number"] == "99"));
}

#[test]
fn scan_dedupe_reports_each_reference_once() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_with_stdin(dir.path(), &["scan", "--dedupe"], "See PR #9 and #9\n");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let rows: Vec<&str> = stdout.lines().collect();
    assert_eq!(
        rows,
        ["1:4+5  issue      9  Open #9 on GitHub", "1:14+2  issue      9  Open #9 on GitHub"]
    );
}

#[test]
fn scan_ignores_paths_inside_urls() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_with_stdin(dir.path(), &["scan"], "docs at https://example.com/a/page.html\n");
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn scan_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = termref_cmd(dir.path()).args(["scan", "absent.log"]).output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("File Not Found"));
}

#[test]
fn open_issue_with_configured_repository() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".termref.toml"), "repository = \"acme/widgets\"\n").unwrap();

    let action = dry_run(dir.path(), "See PR #99 for details", &[]);
    assert_eq!(action["action"], "open-url");
    assert_eq!(action["url"], "https://github.com/acme/widgets/issues/99");
}

#[test]
fn open_issue_without_repository_warns() {
    let dir = tempfile::tempdir().unwrap();
    let action = dry_run(dir.path(), "Fixed #42", &[]);
    assert_eq!(action["action"], "show-warning");
    assert_eq!(action["message"], "Cannot open #42: no repository configured");
}

#[test]
fn open_work_item() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(".termref.toml"),
        "[work_tracking]\norganization = \"acme\"\nproject = \"Widgets\"\n",
    )
    .unwrap();

    let action = dry_run(dir.path(), "Bug#42 blocks Task#7", &["--index", "1"]);
    assert_eq!(action["url"], "https://dev.azure.com/acme/Widgets/_workitems/edit/7");
}

#[test]
fn open_relative_file_against_working_directory() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();

    let action = dry_run(&root, "error at src/baz.ts:10:5", &[]);
    assert_eq!(action["action"], "open-document");
    assert_eq!(action["path"], root.join("src/baz.ts").display().to_string());
    assert_eq!(action["selection"]["line"], 9);
    assert_eq!(action["selection"]["column"], 4);
}

#[test]
fn open_relative_file_with_empty_roots_prints_nothing() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".termref.toml"), "roots = []\n").unwrap();

    let output = termref_cmd(dir.path())
        .args(["open", "error at src/baz.ts:10:5", "--dry-run"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn open_absolute_file_keeps_path() {
    let dir = tempfile::tempdir().unwrap();
    let action = dry_run(dir.path(), "/var/log/app.log:3", &[]);
    assert_eq!(action["path"], "/var/log/app.log");
    assert_eq!(action["selection"]["column"], 0);
}

#[test]
fn open_without_link_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = termref_cmd(dir.path()).args(["open", "Version 123 released"]).output().unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No Link"));
}

#[test]
fn info_json_reports_rules_and_state() {
    let dir = tempfile::tempdir().unwrap();
    let output = termref_cmd(dir.path()).args(["info", "--json"]).output().unwrap();
    assert!(output.status.success());

    let info: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = info["rules"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["pr-keyword", "bare-hash", "work-item", "file-path"]);
    assert_eq!(info["current_state"]["config_found"], false);
    assert_eq!(info["current_state"]["repository_source"], "missing");
}
