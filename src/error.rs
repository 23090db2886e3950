/// Crate-level error types for termref diagnostics.
use std::path::PathBuf;

/// Every error names the file, program, or reason for failure, so a diagnostic can be
/// printed without a debugger. Unresolvable links are not errors; they become
/// warning or no-op actions.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An editor command template expanded to nothing.
    #[error("editor command is empty: `{template}`")]
    EditorTemplateEmpty {
        /// Template as written in the config.
        template: String,
    },

    /// A file given on the command line does not exist.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Underlying I/O error from the filesystem or a terminal stream.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON serialization failed.
    #[error("json: {0}")]
    Json(
        /// The wrapped JSON error.
        #[from]
        serde_json::Error,
    ),

    /// The text handed to `open` has no link at the requested index.
    #[error("no link at index {index} (found {found})")]
    NoLink {
        /// Number of links found in the text.
        found: usize,
        /// Zero-based index that was requested.
        index: usize,
    },

    /// An opener program ran but reported failure.
    #[error("`{program}` failed: {reason}")]
    OpenerFailed {
        /// Program that was run.
        program: String,
        /// Exit status or captured stderr.
        reason: String,
    },

    /// An opener program could not be started.
    #[error("`{program}` was not found")]
    OpenerMissing {
        /// Program that was looked up.
        program: String,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),

    /// No platform opener is known for this operating system.
    #[error("opening links is unsupported on `{os}`")]
    UnsupportedPlatform {
        /// Value of `std::env::consts::OS`.
        os: String,
    },

    /// The filesystem watcher could not be set up.
    #[error("watch failed: {reason}")]
    WatchFailed {
        /// Description of the watcher failure.
        reason: String,
    },
}
