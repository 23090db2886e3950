use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::types::WorkTracking;

/// Name of the config file looked up in the working directory.
pub const CONFIG_FILE: &str = ".termref.toml";

/// Default code-hosting service.
pub const DEFAULT_CODE_HOST: &str = "github.com";

/// Default work-tracking service.
pub const DEFAULT_WORK_HOST: &str = "dev.azure.com";

/// Project configuration loaded from `.termref.toml`.
/// Every field is optional; a missing file means "nothing configured".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Host name of the code-hosting service.
    pub code_host: String,
    /// Editor command template for opening files.
    pub editor: Option<String>,
    /// `owner/name` slug on the code host.
    pub repository: Option<String>,
    /// Workspace roots, already resolved against the config directory. `None` when the
    /// file names no roots; `Some` of an empty list when it sets `roots = []`.
    pub roots: Option<Vec<PathBuf>>,
    /// Host name of the work-tracking service.
    pub work_host: String,
    /// Organization and project, when both are set.
    pub work_tracking: Option<WorkTracking>,
}

/// Raw TOML structure for `.termref.toml`.
#[derive(serde::Deserialize)]
struct TermrefTomlConfig {
    #[serde(default)]
    code_host: Option<String>,
    #[serde(default)]
    editor: Option<String>,
    #[serde(default)]
    repository: Option<String>,
    #[serde(default)]
    roots: Option<Vec<PathBuf>>,
    #[serde(default)]
    work_tracking: Option<WorkTrackingToml>,
}

/// Raw `[work_tracking]` table.
#[derive(serde::Deserialize)]
struct WorkTrackingToml {
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    organization: Option<String>,
    #[serde(default)]
    project: Option<String>,
}

impl Config {
    /// Load config from `.termref.toml` in the given directory.
    /// Returns defaults if the file doesn't exist.
    /// Returns an error if the file exists but is malformed; a config file the
    /// user wrote is never silently replaced by defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(dir: &Path) -> Result<Self, Error> {
        let path = dir.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::with_defaults());
            },
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };

        let raw: TermrefTomlConfig = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded config");
        return Ok(Self::from_raw(dir, raw));
    }

    /// Whether `.termref.toml` exists in `dir`.
    pub fn exists(dir: &Path) -> bool {
        return dir.join(CONFIG_FILE).is_file();
    }

    /// Defaults: public hosts, nothing else configured.
    pub fn with_defaults() -> Self {
        return Self {
            code_host: DEFAULT_CODE_HOST.to_string(),
            work_host: DEFAULT_WORK_HOST.to_string(),
            ..Self::default()
        };
    }

    /// Normalize the raw TOML into a config. Blank strings count as unset, work tracking
    /// needs both organization and project, and relative roots hang off `dir`.
    fn from_raw(dir: &Path, raw: TermrefTomlConfig) -> Self {
        let (work_host, work_tracking) = match raw.work_tracking {
            None => (None, None),
            Some(table) => {
                let tracking = match (non_blank(table.organization), non_blank(table.project)) {
                    (Some(organization), Some(project)) => Some(WorkTracking { organization, project }),
                    _ => None,
                };
                (non_blank(table.host), tracking)
            },
        };

        return Self {
            code_host: non_blank(raw.code_host).unwrap_or_else(|| return DEFAULT_CODE_HOST.to_string()),
            editor: non_blank(raw.editor),
            repository: non_blank(raw.repository),
            roots: raw.roots.map(|roots| {
                return roots
                    .into_iter()
                    .map(|root| return if root.is_absolute() { root } else { dir.join(root) })
                    .collect();
            }),
            work_host: work_host.unwrap_or_else(|| return DEFAULT_WORK_HOST.to_string()),
            work_tracking,
        };
    }
}

/// Trim a string and drop it if nothing is left.
fn non_blank(value: Option<String>) -> Option<String> {
    return value
        .map(|v| return v.trim().to_string())
        .filter(|v| return !v.is_empty());
}
