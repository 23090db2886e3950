//! Log follower: scans lines appended to a file as they arrive.

use std::io::{Read as _, Seek as _, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{RecursiveMode, Watcher as _};

use crate::commands::{self, ScanOptions};
use crate::error::Error;

/// Debounce delay between filesystem events and re-reading the file.
const DEBOUNCE_MS: u64 = 100;

/// Tracks how far into a growing file we have read, holding back a trailing partial line.
#[derive(Debug)]
struct Follower {
    /// Lines emitted so far; the next complete line gets `line_no + 1`.
    line_no: usize,
    /// Byte offset of the next unread byte.
    offset: u64,
    /// File being followed.
    path: PathBuf,
    /// Bytes after the last newline, waiting for the rest of their line.
    pending: Vec<u8>,
}

impl Follower {
    /// Follow `path`, either from its first byte or from its current end.
    ///
    /// # Errors
    ///
    /// Returns `Error::FileNotFound` if the file does not exist, `Error::Io` otherwise.
    fn new(path: PathBuf, from_start: bool) -> Result<Self, Error> {
        let file = commands::open_input(&path)?;
        let offset = if from_start { 0 } else { file.metadata()?.len() };
        return Ok(Self {
            line_no: 0,
            offset,
            path,
            pending: Vec::new(),
        });
    }

    /// Read everything appended since the last call and return the complete lines with
    /// their one-based numbers. A file that shrank was truncated or replaced, so reading
    /// restarts from its beginning.
    ///
    /// # Errors
    ///
    /// Returns `Error::FileNotFound` if the file vanished, `Error::Io` on read failure.
    fn read_new_lines(&mut self) -> Result<Vec<(usize, String)>, Error> {
        let mut file = commands::open_input(&self.path)?;
        let len = file.metadata()?.len();
        if len < self.offset {
            tracing::info!(path = %self.path.display(), "file truncated, restarting from the top");
            self.offset = 0;
            self.pending.clear();
        }

        file.seek(SeekFrom::Start(self.offset))?;
        let mut chunk = Vec::new();
        let read = file.read_to_end(&mut chunk)?;
        self.offset = self.offset.saturating_add(u64::try_from(read).unwrap_or(u64::MAX));
        self.pending.extend_from_slice(&chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| return *b == b'\n') {
            let rest = self.pending.split_off(pos.saturating_add(1));
            let mut line = std::mem::replace(&mut self.pending, rest);
            line.pop();
            self.line_no = self.line_no.saturating_add(1);
            lines.push((self.line_no, String::from_utf8_lossy(&line).into_owned()));
        }
        return Ok(lines);
    }
}

/// Create a filesystem watcher that signals on changes to the file named `name`.
///
/// # Errors
///
/// Returns `Error::WatchFailed` if the watcher cannot be created.
fn create_watcher(
    tx: crossbeam_channel::Sender<()>,
    name: std::ffi::OsString,
) -> Result<notify::RecommendedWatcher, Error> {
    return notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
        if let Ok(event) = res
            && matches!(
                event.kind,
                notify::EventKind::Create(_) | notify::EventKind::Modify(_) | notify::EventKind::Remove(_)
            )
            && event.paths.iter().any(|p| return p.file_name() == Some(name.as_os_str()))
        {
            let _ = tx.send(());
        }
    })
    .map_err(|e| {
        return Error::WatchFailed {
            reason: format!("watcher setup failed: {e}"),
        };
    });
}

/// Entry point for the watch command.
///
/// Prints links in any existing content (with `from_start`), then follows the file and
/// prints links in each newly completed line until interrupted.
///
/// # Errors
///
/// Returns errors from opening the file, setting up the watcher, or writing output.
pub fn run(path: &Path, options: ScanOptions, from_start: bool) -> Result<(), Error> {
    let mut follower = Follower::new(path.to_path_buf(), from_start)?;
    let mut out = std::io::stdout().lock();
    emit(&mut follower, &mut out, options)?;

    let name = path.file_name().map(std::ffi::OsStr::to_os_string).unwrap_or_default();
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let (tx, rx) = crossbeam_channel::unbounded();
    let mut watcher = create_watcher(tx, name)?;
    watcher
        .watch(&dir, RecursiveMode::NonRecursive)
        .map_err(|e| return Error::WatchFailed { reason: e.to_string() })?;

    eprintln!("watch: following {}, press Ctrl+C to stop", path.display());

    while rx.recv().is_ok() {
        let debounce = Duration::from_millis(DEBOUNCE_MS);
        while rx.recv_timeout(debounce).is_ok() {}
        match emit(&mut follower, &mut out, options) {
            Err(Error::FileNotFound { .. }) => {
                tracing::debug!(path = %path.display(), "file missing, waiting for it to return");
            },
            Err(e) => return Err(e),
            Ok(()) => {},
        }
    }

    return Ok(());
}

/// Scan and print every new complete line.
///
/// # Errors
///
/// Returns errors from reading the file or writing output.
fn emit<W: std::io::Write>(follower: &mut Follower, out: &mut W, options: ScanOptions) -> Result<(), Error> {
    for (line_no, raw) in follower.read_new_lines()? {
        let line = commands::clean_line(&raw, options.keep_ansi);
        let spans = commands::scan_with(&line, options.dedupe);
        commands::write_spans(out, line_no, &spans, options.format)?;
    }
    out.flush()?;
    return Ok(());
}
