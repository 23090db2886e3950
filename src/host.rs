//! Side effects of activating a link: opening URLs and files, warning the user.

use std::cell::RefCell;
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::Path;
use std::process::Command;

use crate::error::Error;
use crate::types::{Action, Selection};

/// Capabilities a host environment offers to the resolver's actions.
pub trait Host {
    /// Open `path`, placing the cursor at the zero-based `selection` when given.
    ///
    /// # Errors
    ///
    /// Returns an error if the document could not be opened.
    fn open_document(&self, path: &Path, selection: Option<Selection>) -> Result<(), Error>;

    /// Open `url` in a browser.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL could not be opened.
    fn open_url(&self, url: &str) -> Result<(), Error>;

    /// Show a non-fatal, one-line warning.
    fn show_warning(&self, message: &str);
}

/// Carry out one action on `host`. `NoOp` does nothing.
///
/// # Errors
///
/// Returns the host's error when opening fails.
pub fn perform<H: Host + ?Sized>(host: &H, action: &Action) -> Result<(), Error> {
    match action {
        Action::NoOp => {},
        Action::OpenDocument { path, selection } => host.open_document(path, *selection)?,
        Action::OpenUrl { url } => host.open_url(url)?,
        Action::ShowWarning { message } => host.show_warning(message),
    }
    return Ok(());
}

/// Program plus leading arguments used to hand a URL or path to the desktop.
#[derive(Debug, Clone, PartialEq, Eq)]
struct OpenCommand {
    /// Leading arguments placed before the target.
    prefix_args: Vec<OsString>,
    /// Program to run.
    program: String,
}

impl OpenCommand {
    /// The desktop opener for `target_os`.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedPlatform` for systems without a known opener.
    fn for_os(target_os: &str) -> Result<Self, Error> {
        return match target_os {
            "linux" | "freebsd" | "openbsd" | "netbsd" => Ok(Self {
                prefix_args: Vec::new(),
                program: "xdg-open".to_string(),
            }),
            "macos" => Ok(Self {
                prefix_args: Vec::new(),
                program: "open".to_string(),
            }),
            "windows" => Ok(Self {
                prefix_args: vec![OsString::from("/C"), OsString::from("start"), OsString::from("")],
                program: "cmd".to_string(),
            }),
            _ => Err(Error::UnsupportedPlatform {
                os: target_os.to_string(),
            }),
        };
    }
}

/// Host that opens links on the local desktop and warns on stderr.
#[derive(Debug)]
pub struct SystemHost {
    /// Editor command template from the config, if any.
    editor: Option<String>,
    /// Desktop opener for URLs, and for files when no editor is set.
    opener: OpenCommand,
}

impl SystemHost {
    /// Host using the platform opener and, for files, the optional editor template.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedPlatform` if this OS has no known opener.
    pub fn new(editor: Option<String>) -> Result<Self, Error> {
        let opener = OpenCommand::for_os(std::env::consts::OS)?;
        return Ok(Self { editor, opener });
    }
}

impl Host for SystemHost {
    fn open_document(&self, path: &Path, selection: Option<Selection>) -> Result<(), Error> {
        let Some(template) = &self.editor else {
            if selection.is_some() {
                tracing::debug!(path = %path.display(), "no editor configured, cursor position dropped");
            }
            let mut args = self.opener.prefix_args.clone();
            args.push(path.as_os_str().to_os_string());
            tracing::info!(path = %path.display(), "opening document");
            return run(&self.opener.program, &args);
        };

        let mut argv = expand_editor_template(template, path, selection).into_iter();
        let Some(program) = argv.next() else {
            return Err(Error::EditorTemplateEmpty {
                template: template.clone(),
            });
        };
        let args: Vec<OsString> = argv.map(OsString::from).collect();
        tracing::info!(path = %path.display(), editor = %program, "opening document");
        return run(&program, &args);
    }

    fn open_url(&self, url: &str) -> Result<(), Error> {
        let mut args = self.opener.prefix_args.clone();
        args.push(OsString::from(url));
        tracing::info!(url, "opening url");
        return run(&self.opener.program, &args);
    }

    fn show_warning(&self, message: &str) {
        tracing::debug!(message, "unresolved link");
        eprintln!("warning: {message}");
    }
}

/// Host that performs nothing and writes each action it receives as one JSON line.
/// Backs `open --dry-run`.
#[derive(Debug)]
pub struct PrintHost<W> {
    /// Where the JSON lines go.
    out: RefCell<W>,
}

impl<W: Write> PrintHost<W> {
    /// Host printing to `out`.
    pub const fn new(out: W) -> Self {
        return Self { out: RefCell::new(out) };
    }

    /// Write `action` as one JSON line and flush.
    ///
    /// # Errors
    ///
    /// Returns `Error::Json` if serialization fails, `Error::Io` if writing fails.
    fn print(&self, action: &Action) -> Result<(), Error> {
        let mut out = self.out.borrow_mut();
        serde_json::to_writer(&mut *out, action)?;
        writeln!(out)?;
        out.flush()?;
        return Ok(());
    }
}

impl<W: Write> Host for PrintHost<W> {
    fn open_document(&self, path: &Path, selection: Option<Selection>) -> Result<(), Error> {
        return self.print(&Action::OpenDocument {
            path: path.to_path_buf(),
            selection,
        });
    }

    fn open_url(&self, url: &str) -> Result<(), Error> {
        return self.print(&Action::OpenUrl { url: url.to_string() });
    }

    fn show_warning(&self, message: &str) {
        let action = Action::ShowWarning {
            message: message.to_string(),
        };
        if let Err(e) = self.print(&action) {
            tracing::warn!(error = %e, "could not print warning");
        }
    }
}

/// Split an editor template on whitespace and fill in `{path}`, `{line}` and `{column}`.
/// Positions are one-based here, as editors expect. Without a `{path}` placeholder the
/// path is appended as the last argument.
fn expand_editor_template(template: &str, path: &Path, selection: Option<Selection>) -> Vec<String> {
    let path_text = path.display().to_string();
    let (line, column) = selection.map_or((1, 1), |s| {
        return (s.line.saturating_add(1), s.column.saturating_add(1));
    });

    let mut argv: Vec<String> = template
        .split_whitespace()
        .map(|word| {
            return word
                .replace("{path}", &path_text)
                .replace("{line}", &line.to_string())
                .replace("{column}", &column.to_string());
        })
        .collect();

    if !template.contains("{path}") && !argv.is_empty() {
        argv.push(path_text);
    }
    return argv;
}

/// Run an opener and wait for it, turning failures into errors that name the program.
///
/// # Errors
///
/// Returns `Error::OpenerMissing` if the program cannot be found, or
/// `Error::OpenerFailed` if it cannot be started or exits unsuccessfully.
fn run(program: &str, args: &[OsString]) -> Result<(), Error> {
    let output = Command::new(program).args(args).output().map_err(|e| {
        return match e.kind() {
            io::ErrorKind::NotFound => Error::OpenerMissing {
                program: program.to_string(),
            },
            _ => Error::OpenerFailed {
                program: program.to_string(),
                reason: e.to_string(),
            },
        };
    })?;

    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let reason = if stderr.is_empty() {
        format!("exit status {}", output.status)
    } else {
        stderr
    };
    return Err(Error::OpenerFailed {
        program: program.to_string(),
        reason,
    });
}
