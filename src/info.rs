use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::{CONFIG_FILE, Config};
use crate::context::{ConfigContext, ResolutionContext as _};
use crate::error::Error;
use crate::git;
use crate::patterns::{FILE_PATH_RULE, REFERENCE_PATTERNS};
use crate::types::WorkTracking;

/// Output the termref reference document and current resolution state.
///
/// # Errors
///
/// Returns `Error::Io` if the working directory is unavailable, or `Error::Json`
/// if JSON rendering fails.
pub fn run(json: bool) -> Result<(), Error> {
    let root = std::env::current_dir()?;
    let state = gather_state(&root);

    if json {
        print_json(&state)?;
    } else {
        print_markdown(&state);
    }
    return Ok(());
}

// ── State gathering ───────────────────────────────────────────────────

/// Where the repository slug came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
enum SlugSource {
    Config,
    GitRemote,
    Missing,
}

struct CurrentState {
    code_host: String,
    config_error: Option<String>,
    config_found: bool,
    repository: Option<String>,
    roots: Vec<PathBuf>,
    slug_source: SlugSource,
    work_host: String,
    work_tracking: Option<WorkTracking>,
}

fn gather_state(root: &Path) -> CurrentState {
    let config_found = Config::exists(root);
    let (config, config_error) = match Config::load(root) {
        Ok(c) => (c, None),
        Err(e) => (Config::with_defaults(), Some(e.to_string())),
    };

    let (repository, slug_source) = match config.repository.clone() {
        Some(slug) => (Some(slug), SlugSource::Config),
        None => match git::origin_slug(root) {
            Some(slug) => (Some(slug), SlugSource::GitRemote),
            None => (None, SlugSource::Missing),
        },
    };

    let context = ConfigContext::new(root.to_path_buf());
    return CurrentState {
        code_host: config.code_host,
        config_error,
        config_found,
        repository,
        roots: context.workspace_roots(),
        slug_source,
        work_host: config.work_host,
        work_tracking: config.work_tracking,
    };
}

// ── Markdown output ───────────────────────────────────────────────────

fn print_markdown(state: &CurrentState) {
    let version = env!("CARGO_PKG_VERSION");
    print_markdown_header(version);
    print_markdown_rules();
    print_markdown_state(state);
}

fn print_markdown_header(version: &str) {
    print!(
        "\
# termref {version}

Clickable references for terminal output: issue and pull request numbers,
work items, and file paths with optional line and column.

## Reference Syntax

    PR #12, issue #12, pull #12       issue on the code host
    #12                               issue (1-6 digits, standalone)
    Bug#7, Task#7, WI#7, US#7,        work item
    Feature#7, Epic#7
    src/app.ts:10:5, ./run.sh,        file path (needs an extension)
    /abs/path.rs, C:\\dir\\file.cs

## Workflow

    termref scan [FILE]               List links in each line of FILE or stdin
    termref open <TEXT> [--index N]   Open the Nth link in TEXT
    termref open <TEXT> --dry-run     Print the resolved action as JSON
    termref watch <FILE>              Follow a log file and list links as lines arrive
    termref info [--json]             This document

## Configuration ({CONFIG_FILE})

    repository = \"owner/name\"          # default: git origin remote
    code_host = \"github.com\"
    roots = [\".\"]                      # default: working directory; [] for none
    editor = \"code --goto {{path}}:{{line}}:{{column}}\"

    [work_tracking]
    organization = \"org\"
    project = \"project\"
    host = \"dev.azure.com\"

"
    );
}

fn print_markdown_rules() {
    println!("## Rules\n");
    println!("| Order | Name | Kind | Pattern |");
    println!("|-------|------|------|---------|");
    for (idx, pattern) in REFERENCE_PATTERNS.iter().enumerate() {
        println!(
            "| {} | {} | {} | `{}` |",
            idx.saturating_add(1),
            pattern.name,
            pattern.kind.label(),
            pattern.regex.as_str()
        );
    }
    println!("| - | file-path | file | `{}` |", FILE_PATH_RULE.as_str());
    println!();
}

fn print_markdown_state(state: &CurrentState) {
    println!("## Current State\n");

    match (&state.config_error, state.config_found) {
        (Some(e), _) => println!("Config:        {CONFIG_FILE} (invalid: {e})"),
        (None, true) => println!("Config:        {CONFIG_FILE} (found)"),
        (None, false) => println!("Config:        {CONFIG_FILE} (not found)"),
    }

    match (&state.repository, state.slug_source) {
        (Some(slug), SlugSource::GitRemote) => {
            println!("Repository:    {slug} on {} (from git remote)", state.code_host);
        },
        (Some(slug), _) => println!("Repository:    {slug} on {}", state.code_host),
        (None, _) => println!("Repository:    (none, issue links will warn)"),
    }

    match &state.work_tracking {
        Some(t) => println!("Work tracking: {}/{} on {}", t.organization, t.project, state.work_host),
        None => println!("Work tracking: (none, work item links will warn)"),
    }

    if state.roots.is_empty() {
        println!("Roots:         (none, relative paths are ignored)");
    } else {
        let roots = state
            .roots
            .iter()
            .map(|r| return r.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        println!("Roots:         {roots}");
    }
}

// ── JSON output ───────────────────────────────────────────────────────

#[derive(Serialize)]
struct InfoJson {
    current_state: StateJson,
    rules: Vec<RuleJson>,
    version: String,
}

#[derive(Serialize)]
struct RuleJson {
    kind: String,
    name: String,
    pattern: String,
}

#[derive(Serialize)]
struct StateJson {
    code_host: String,
    config_error: Option<String>,
    config_found: bool,
    repository: Option<String>,
    repository_source: SlugSource,
    roots: Vec<PathBuf>,
    work_host: String,
    work_tracking: Option<WorkTracking>,
}

fn print_json(state: &CurrentState) -> Result<(), Error> {
    let mut rules: Vec<RuleJson> = REFERENCE_PATTERNS
        .iter()
        .map(|p| {
            return RuleJson {
                kind: p.kind.label().to_string(),
                name: p.name.to_string(),
                pattern: p.regex.as_str().to_string(),
            };
        })
        .collect();
    rules.push(RuleJson {
        kind: "file".to_string(),
        name: "file-path".to_string(),
        pattern: FILE_PATH_RULE.as_str().to_string(),
    });

    let info = InfoJson {
        current_state: StateJson {
            code_host: state.code_host.clone(),
            config_error: state.config_error.clone(),
            config_found: state.config_found,
            repository: state.repository.clone(),
            repository_source: state.slug_source,
            roots: state.roots.clone(),
            work_host: state.work_host.clone(),
            work_tracking: state.work_tracking.clone(),
        },
        rules,
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    println!("{}", serde_json::to_string_pretty(&info)?);
    return Ok(());
}
