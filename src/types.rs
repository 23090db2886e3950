/// Core domain types for terminal links, their payloads, and resolution actions.
use std::path::PathBuf;

use serde::Serialize;

/// Outcome of resolving one link. Hosts perform it; tests inspect it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Action {
    /// Nothing to do. Produced for relative paths when no workspace root is known.
    NoOp,
    /// Open a file, optionally placing the cursor.
    OpenDocument {
        /// Fully resolved path of the document.
        path: PathBuf,
        /// Zero-based cursor position, present when the link carried a line.
        selection: Option<Selection>,
    },
    /// Open a web page in the user's browser.
    OpenUrl {
        /// Fully formed URL.
        url: String,
    },
    /// Tell the user the link could not be resolved.
    ShowWarning {
        /// One-line human-readable explanation.
        message: String,
    },
}

/// Classification of a link, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkKind {
    /// A path to a file, optionally with `:line:col`.
    FilePath,
    /// A numbered issue or pull request on the code host.
    Issue,
    /// A numbered item on the work-tracking service.
    WorkItem,
}

impl LinkKind {
    /// Short label used in text output.
    pub const fn label(self) -> &'static str {
        return match self {
            Self::FilePath => "file",
            Self::Issue => "issue",
            Self::WorkItem => "work-item",
        };
    }
}

/// One detected link within a scanned line. Never mutated after the scanner builds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkSpan {
    /// Number of characters covered, including any `:line:col` suffix.
    pub length: usize,
    /// Zero-based character offset of the first covered character.
    pub start: usize,
    /// What the link points at.
    pub target: LinkTarget,
    /// Hover text for the host to show.
    pub tooltip: String,
}

impl LinkSpan {
    /// Kind of this link, derived from its payload.
    pub const fn kind(&self) -> LinkKind {
        return self.target.kind();
    }
}

/// Kind-specific payload of a link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum LinkTarget {
    /// File path with the position suffix removed.
    FilePath {
        /// One-based column. Only meaningful when `line` is present.
        column: Option<u32>,
        /// One-based line.
        line: Option<u32>,
        /// Path text exactly as it appeared, minus the suffix.
        path: String,
    },
    /// Issue or pull request number.
    Issue {
        /// Digit run as matched, leading zeros included.
        number: String,
    },
    /// Work item number.
    WorkItem {
        /// Digit run as matched, leading zeros included.
        number: String,
    },
}

impl LinkTarget {
    /// Kind of this payload.
    pub const fn kind(&self) -> LinkKind {
        return match self {
            Self::FilePath { .. } => LinkKind::FilePath,
            Self::Issue { .. } => LinkKind::Issue,
            Self::WorkItem { .. } => LinkKind::WorkItem,
        };
    }

    /// The payload rendered for text output: the number, or `path[:line[:col]]`.
    pub fn display_payload(&self) -> String {
        return match self {
            Self::FilePath { path, line: Some(line), column: Some(column) } => {
                format!("{path}:{line}:{column}")
            },
            Self::FilePath { path, line: Some(line), column: None } => format!("{path}:{line}"),
            Self::FilePath { path, .. } => path.clone(),
            Self::Issue { number } | Self::WorkItem { number } => number.clone(),
        };
    }
}

/// Zero-based cursor position inside an opened document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Selection {
    /// Zero-based column.
    pub column: u32,
    /// Zero-based line.
    pub line: u32,
}

/// Organization and project on the work-tracking service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkTracking {
    /// Organization (account) name.
    pub organization: String,
    /// Project name within the organization.
    pub project: String,
}
