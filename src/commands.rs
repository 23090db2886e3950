//! CLI commands for termref: scan and open. The CLI is the host adapter: it feeds
//! lines to the scanner and performs resolved actions on the local desktop.

use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::Config;
use crate::context::ConfigContext;
use crate::error::Error;
use crate::host::{PrintHost, SystemHost};
use crate::resolver::{self, Resolver, Services};
use crate::scanner;
use crate::types::{Action, LinkSpan};

/// Output format for scanned spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    /// One JSON object per span.
    Json,
    /// One aligned text row per span.
    Text,
}

/// Options shared by `scan` and `watch`.
#[derive(Debug, Clone, Copy)]
pub struct ScanOptions {
    /// Drop spans naming the same reference as an earlier span.
    pub dedupe: bool,
    /// How spans are printed.
    pub format: Format,
    /// Scan raw text, escape sequences included.
    pub keep_ansi: bool,
}

/// A span tagged with the one-based line it was found on, for JSON output.
#[derive(Serialize)]
struct LineSpan<'a> {
    /// One-based line number within the input.
    line: usize,
    /// The span itself.
    span: &'a LinkSpan,
}

/// Scan every line of `file` (or stdin) and print the links found.
///
/// # Errors
///
/// Returns `Error::FileNotFound` if `file` does not exist, `Error::Io` on read or
/// write failure, or `Error::Json` if a span cannot be serialized.
pub fn scan(file: Option<&Path>, options: ScanOptions) -> Result<(), Error> {
    let reader: Box<dyn BufRead> = match file {
        None => Box::new(std::io::stdin().lock()),
        Some(path) => Box::new(BufReader::new(open_input(path)?)),
    };

    let mut out = std::io::stdout().lock();
    let mut total = 0_usize;
    for (idx, raw) in read_lossy_lines(reader).enumerate() {
        let line = clean_line(&raw?, options.keep_ansi);
        let spans = scan_with(&line, options.dedupe);
        total = total.saturating_add(spans.len());
        write_spans(&mut out, idx.saturating_add(1), &spans, options.format)?;
    }
    out.flush()?;

    tracing::debug!(total, "scan finished");
    return Ok(());
}

/// Scan `text`, pick the link at `index`, and activate it. With `dry_run` the resolved
/// action is printed as one JSON line instead of performed; a link that resolves to
/// nothing prints nothing.
///
/// # Errors
///
/// Returns `Error::NoLink` if there is no link at `index`, config errors from
/// `.termref.toml`, or the host's error when opening fails.
pub fn open(text: &str, index: usize, dry_run: bool) -> Result<(), Error> {
    let line = clean_line(text, false);
    let spans = scanner::scan_line(&line);
    let Some(span) = spans.get(index) else {
        return Err(Error::NoLink {
            found: spans.len(),
            index,
        });
    };

    let dir = std::env::current_dir()?;
    let config = Config::load(&dir)?;
    let resolver = Resolver::new(ConfigContext::new(dir), Services::from(&config));

    let action = if dry_run {
        resolver::activate(&resolver, &PrintHost::new(std::io::stdout()), span)?
    } else {
        resolver::activate(&resolver, &SystemHost::new(config.editor)?, span)?
    };
    if action == Action::NoOp {
        tracing::info!(start = span.start, "link resolves to nothing");
    }
    return Ok(());
}

/// Scan one cleaned line, optionally deduplicating.
pub fn scan_with(line: &str, dedupe: bool) -> Vec<LinkSpan> {
    let spans = scanner::scan_line(line);
    if dedupe {
        return scanner::dedupe(spans);
    }
    return spans;
}

/// Prepare raw terminal text for scanning: drop the trailing carriage return and,
/// unless `keep_ansi` is set, strip escape sequences so offsets match what is visible.
pub fn clean_line(raw: &str, keep_ansi: bool) -> String {
    let trimmed = raw.strip_suffix('\r').unwrap_or(raw);
    if keep_ansi {
        return trimmed.to_string();
    }
    return strip_ansi_escapes::strip_str(trimmed);
}

/// Print the spans of one line in the requested format.
///
/// # Errors
///
/// Returns `Error::Io` on write failure or `Error::Json` on serialization failure.
pub fn write_spans<W: Write>(out: &mut W, line: usize, spans: &[LinkSpan], format: Format) -> Result<(), Error> {
    for span in spans {
        match format {
            Format::Json => {
                serde_json::to_writer(&mut *out, &LineSpan { line, span })?;
                writeln!(out)?;
            },
            Format::Text => writeln!(
                out,
                "{line}:{}+{}  {:<9}  {}  {}",
                span.start,
                span.length,
                span.kind().label(),
                span.target.display_payload(),
                span.tooltip,
            )?,
        }
    }
    return Ok(());
}

/// Open an input file, reporting a missing file by name.
///
/// # Errors
///
/// Returns `Error::FileNotFound` if the file does not exist, `Error::Io` otherwise.
pub fn open_input(path: &Path) -> Result<std::fs::File, Error> {
    return std::fs::File::open(path).map_err(|e| {
        return match e.kind() {
            std::io::ErrorKind::NotFound => Error::FileNotFound {
                path: PathBuf::from(path),
            },
            _ => Error::Io(e),
        };
    });
}

/// Lines of `reader`, decoded lossily so stray non-UTF-8 bytes in terminal output
/// never abort a scan.
fn read_lossy_lines<R: BufRead>(mut reader: R) -> impl Iterator<Item = Result<String, Error>> {
    return std::iter::from_fn(move || {
        let mut buf = Vec::new();
        return match reader.read_until(b'\n', &mut buf) {
            Err(e) => Some(Err(Error::Io(e))),
            Ok(0) => None,
            Ok(_) => {
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                }
                Some(Ok(String::from_utf8_lossy(&buf).into_owned()))
            },
        };
    });
}
