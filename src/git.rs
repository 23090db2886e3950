//! Repository slug discovery from the git checkout's `origin` remote.

use std::path::Path;
use std::process::Command;

/// Read `remote.origin.url` from the checkout at `dir` and reduce it to `owner/name`.
/// Any failure (no git, not a checkout, no origin, odd URL) is reported as `None`.
pub fn origin_slug(dir: &Path) -> Option<String> {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(["config", "--get", "remote.origin.url"])
        .output();

    let output = match output {
        Ok(o) if o.status.success() => o,
        Ok(o) => {
            tracing::debug!(dir = %dir.display(), status = %o.status, "no origin remote");
            return None;
        },
        Err(e) => {
            tracing::debug!(error = %e, "git unavailable");
            return None;
        },
    };

    let url = String::from_utf8_lossy(&output.stdout);
    return slug_from_remote_url(&url);
}

/// Extract `owner/name` from a remote URL.
///
/// Accepts `https://host/owner/name(.git)`, `ssh://git@host[:port]/owner/name(.git)`
/// and scp-like `git@host:owner/name(.git)`. Only the last two path segments are kept,
/// so nested group paths reduce to their final owner and name.
pub fn slug_from_remote_url(url: &str) -> Option<String> {
    let url = url.trim();

    let path = if let Some((_, rest)) = url.split_once("://") {
        rest.split_once('/')?.1
    } else if let Some((host, rest)) = url.split_once(':') {
        // scp-like syntax never has a slash before the colon.
        if host.contains('/') {
            return None;
        }
        rest
    } else {
        return None;
    };

    let path = path.trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let mut segments = path.rsplit('/').filter(|s| return !s.is_empty());
    let name = segments.next()?;
    let owner = segments.next()?;
    return Some(format!("{owner}/{name}"));
}
