//! Lookups the resolver consults at activation time.

use std::path::PathBuf;

use crate::config::Config;
use crate::git;
use crate::types::WorkTracking;

/// Externally owned, time-varying facts needed to resolve a link.
/// Implementations must read current state on every call; the resolver never caches.
pub trait ResolutionContext {
    /// `owner/name` slug on the code host, if known.
    fn repository_slug(&self) -> Option<String>;

    /// Work-tracking organization and project, if known.
    fn work_tracking(&self) -> Option<WorkTracking>;

    /// Known workspace roots, most relevant first. May be empty.
    fn workspace_roots(&self) -> Vec<PathBuf>;
}

/// Context backed by `.termref.toml` in a directory, re-read on each lookup.
/// A repository slug missing from the config falls back to the git `origin` remote.
#[derive(Debug, Clone)]
pub struct ConfigContext {
    /// Directory holding the config file; also the default workspace root.
    dir: PathBuf,
}

impl ConfigContext {
    /// Context rooted at `dir`.
    pub const fn new(dir: PathBuf) -> Self {
        return Self { dir };
    }

    /// Current config. A config that fails to load counts as empty, so activation
    /// degrades to the "not configured" paths instead of failing.
    fn current(&self) -> Config {
        return Config::load(&self.dir).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "ignoring unreadable config");
            return Config::with_defaults();
        });
    }
}

impl ResolutionContext for ConfigContext {
    fn repository_slug(&self) -> Option<String> {
        if let Some(slug) = self.current().repository {
            return Some(slug);
        }
        return git::origin_slug(&self.dir);
    }

    fn work_tracking(&self) -> Option<WorkTracking> {
        return self.current().work_tracking;
    }

    fn workspace_roots(&self) -> Vec<PathBuf> {
        return match self.current().roots {
            None => vec![self.dir.clone()],
            Some(roots) => roots,
        };
    }
}
