use crate::config::CONFIG_FILE;
use crate::error::Error;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Render an error as markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic: what happened, and how to fix it
/// when there is something the user can do.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::EditorTemplateEmpty { template } => render_editor_template_empty(template),
        Error::NoLink { found, index } => render_no_link(*index, *found),
        Error::OpenerMissing { program } => render_opener_missing(program),
        Error::TomlDe(inner) => render_invalid_config(&inner.to_string()),
        Error::UnsupportedPlatform { os } => render_unsupported_platform(os),
        _ => render_generic(e),
    };
}

fn render_generic(e: &Error) -> String {
    return match e {
        Error::FileNotFound { path } => format!("\
# Error: File Not Found

`{}` does not exist.
", path.display()),

        Error::OpenerFailed { program, reason } => format!("\
# Error: Open Failed

`{program}` could not open the link: {reason}
"),

        Error::WatchFailed { reason } => format!("\
# Error: Watch Failed

{reason}
"),

        Error::Io(inner) => format!("\
# Error: I/O

{inner}
"),

        Error::Json(inner) => format!("\
# Error: JSON

{inner}
"),

        // Variants with a dedicated renderer are handled in render_error.
        _ => format!("\
# Error

{e}
"),
    };
}

fn render_editor_template_empty(template: &str) -> String {
    return format!("\
# Error: Empty Editor Command

The `editor` setting `{template}` has no program in it.

## Fix

Set a command in `{CONFIG_FILE}`, for example:

    editor = \"code --goto {{path}}:{{line}}:{{column}}\"
");
}

fn render_invalid_config(reason: &str) -> String {
    return format!("\
# Error: Invalid Config

`{CONFIG_FILE}` could not be parsed: {reason}

## Fix

Correct the file, or remove it to fall back to defaults.
");
}

fn render_no_link(index: usize, found: usize) -> String {
    if found == 0 {
        return "\
# Error: No Link

The text contains no issue, work item, or file path reference.
"
        .to_string();
    }

    let last = found.saturating_sub(1);
    return format!("\
# Error: No Link

Link index {index} is out of range; the text has {found} link(s).

## Fix

Pass `--index` between 0 and {last}, or list the links first:

    termref scan
");
}

fn render_opener_missing(program: &str) -> String {
    return format!("\
# Error: Opener Not Found

`{program}` is not installed or not on `PATH`.

## Fix

Install `{program}`, or set an `editor` command in `{CONFIG_FILE}` for opening files.
");
}

fn render_unsupported_platform(os: &str) -> String {
    return format!("\
# Error: Unsupported Platform

termref does not know how to open links on `{os}`.

## Fix

Use `termref open --dry-run` and pass the printed action to your own opener.
");
}
