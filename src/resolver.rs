use std::path::{Component, Path, PathBuf};

use crate::config::Config;
use crate::context::ResolutionContext;
use crate::error::Error;
use crate::host::{self, Host};
use crate::types::{Action, LinkSpan, LinkTarget, Selection};

/// Service hosts used to build URLs. Fixed when the resolver is constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Services {
    /// Code-hosting service, e.g. `github.com`.
    pub code_host: String,
    /// Work-tracking service, e.g. `dev.azure.com`.
    pub work_host: String,
}

impl From<&Config> for Services {
    fn from(config: &Config) -> Self {
        return Self {
            code_host: config.code_host.clone(),
            work_host: config.work_host.clone(),
        };
    }
}

/// Turns scanned links into actions. Holds no state besides its inputs, so resolving
/// the same span twice yields the same action twice.
#[derive(Debug)]
pub struct Resolver<C> {
    /// Source of repository, work-tracking, and workspace facts.
    context: C,
    /// Hosts for generated URLs.
    services: Services,
}

impl<C: ResolutionContext> Resolver<C> {
    /// Resolver over `context`, building URLs against `services`.
    pub const fn new(context: C, services: Services) -> Self {
        return Self { context, services };
    }

    /// Decide what activating `span` should do.
    pub fn resolve(&self, span: &LinkSpan) -> Action {
        let action = self.resolve_target(&span.target);
        tracing::debug!(start = span.start, kind = span.kind().label(), ?action, "resolved link");
        return action;
    }

    /// Decide what activating a link with this payload should do.
    pub fn resolve_target(&self, target: &LinkTarget) -> Action {
        return match target {
            LinkTarget::FilePath { path, line, column } => self.resolve_file_path(path, *line, *column),
            LinkTarget::Issue { number } => self.resolve_issue(number),
            LinkTarget::WorkItem { number } => self.resolve_work_item(number),
        };
    }

    /// Issue links need a repository slug; without one the user is warned.
    fn resolve_issue(&self, number: &str) -> Action {
        let Some(slug) = self.context.repository_slug() else {
            return Action::ShowWarning {
                message: format!("Cannot open #{number}: no repository configured"),
            };
        };
        return Action::OpenUrl {
            url: format!("https://{}/{slug}/issues/{number}", self.services.code_host),
        };
    }

    /// Work item links need an organization and project; without them the user is warned.
    fn resolve_work_item(&self, number: &str) -> Action {
        let Some(tracking) = self.context.work_tracking() else {
            return Action::ShowWarning {
                message: format!(
                    "Cannot open work item {number}: no work-tracking organization/project configured"
                ),
            };
        };
        return Action::OpenUrl {
            url: format!(
                "https://{}/{}/{}/_workitems/edit/{number}",
                self.services.work_host, tracking.organization, tracking.project
            ),
        };
    }

    /// Absolute paths open as written. Relative paths hang off the first workspace root;
    /// with no root there is nothing to open and no warning either, because a missing
    /// file is only discovered when opening it.
    fn resolve_file_path(&self, path: &str, line: Option<u32>, column: Option<u32>) -> Action {
        let resolved = if is_absolute_path_text(path) {
            PathBuf::from(path)
        } else {
            let Some(root) = self.context.workspace_roots().into_iter().next() else {
                tracing::debug!(path, "no workspace root, ignoring relative path");
                return Action::NoOp;
            };
            normalize_path(&root.join(path))
        };

        return Action::OpenDocument {
            path: resolved,
            selection: line.map(|line| {
                return Selection {
                    column: column.map_or(0, |c| return c.saturating_sub(1)),
                    line: line.saturating_sub(1),
                };
            }),
        };
    }
}

/// Resolve `span` and hand the resulting action to `host`. Returns the action performed.
///
/// # Errors
///
/// Returns errors from the host when opening a URL or document fails.
pub fn activate<C: ResolutionContext, H: Host>(
    resolver: &Resolver<C>,
    host: &H,
    span: &LinkSpan,
) -> Result<Action, Error> {
    let action = resolver.resolve(span);
    host::perform(host, &action)?;
    return Ok(action);
}

/// Whether `path` is absolute in either POSIX (`/…`) or Windows (`C:\…`) form,
/// independent of the platform this runs on.
fn is_absolute_path_text(path: &str) -> bool {
    if path.starts_with('/') {
        return true;
    }
    let mut chars = path.chars();
    return matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some(drive), Some(':'), Some('\\')) if drive.is_ascii_alphabetic()
    );
}

/// Collapse `.` and `..` components in a path without touching the filesystem.
/// Preserves leading `..` when there is nothing left to pop.
fn normalize_path(path: &Path) -> PathBuf {
    let mut components: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        push_normalized_component(&mut components, component);
    }
    return components.iter().collect();
}

/// Handle a single path component during normalization.
/// Pops the last component for `..` when possible, preserves it otherwise.
fn push_normalized_component<'a>(components: &mut Vec<Component<'a>>, component: Component<'a>) {
    match component {
        Component::CurDir => {},
        Component::ParentDir => {
            let can_pop = matches!(
                components.last(),
                Some(c) if !matches!(c, Component::ParentDir | Component::RootDir)
            );
            if can_pop {
                components.pop();
            } else {
                components.push(component);
            }
        },
        other => components.push(other),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::scanner::scan_line;
    use crate::types::WorkTracking;

    /// Fixed answers, counting how often each lookup is made.
    #[derive(Default)]
    struct FakeContext {
        root_lookups: Cell<u32>,
        roots: Vec<PathBuf>,
        slug: Option<String>,
        slug_lookups: Cell<u32>,
        tracking: Option<WorkTracking>,
    }

    impl ResolutionContext for FakeContext {
        fn repository_slug(&self) -> Option<String> {
            self.slug_lookups.set(self.slug_lookups.get() + 1);
            self.slug.clone()
        }

        fn work_tracking(&self) -> Option<WorkTracking> {
            self.tracking.clone()
        }

        fn workspace_roots(&self) -> Vec<PathBuf> {
            self.root_lookups.set(self.root_lookups.get() + 1);
            self.roots.clone()
        }
    }

    fn services() -> Services {
        Services::from(&Config::with_defaults())
    }

    fn resolve_first(context: FakeContext, line: &str) -> Action {
        let spans = scan_line(line);
        Resolver::new(context, services()).resolve(spans.first().unwrap())
    }

    #[test]
    fn issue_with_slug_opens_url() {
        let context = FakeContext { slug: Some("acme/widgets".to_string()), ..FakeContext::default() };
        assert_eq!(
            resolve_first(context, "Fixed #42"),
            Action::OpenUrl { url: "https://github.com/acme/widgets/issues/42".to_string() }
        );
    }

    #[test]
    fn issue_without_slug_warns() {
        for number in ["1", "42", "007", "999999"] {
            let action = resolve_first(FakeContext::default(), &format!("see #{number}"));
            assert_eq!(
                action,
                Action::ShowWarning { message: format!("Cannot open #{number}: no repository configured") }
            );
        }
    }

    #[test]
    fn issue_uses_configured_code_host() {
        let context = FakeContext { slug: Some("a/b".to_string()), ..FakeContext::default() };
        let resolver = Resolver::new(
            context,
            Services { code_host: "git.acme.dev".to_string(), work_host: "unused".to_string() },
        );
        let action = resolver.resolve_target(&LinkTarget::Issue { number: "5".to_string() });
        assert_eq!(action, Action::OpenUrl { url: "https://git.acme.dev/a/b/issues/5".to_string() });
    }

    #[test]
    fn work_item_with_tracking_opens_url() {
        let context = FakeContext {
            tracking: Some(WorkTracking { organization: "acme".to_string(), project: "Widgets".to_string() }),
            ..FakeContext::default()
        };
        assert_eq!(
            resolve_first(context, "Bug#42 blocks"),
            Action::OpenUrl { url: "https://dev.azure.com/acme/Widgets/_workitems/edit/42".to_string() }
        );
    }

    #[test]
    fn work_item_without_tracking_warns() {
        assert_eq!(
            resolve_first(FakeContext::default(), "Task#7"),
            Action::ShowWarning {
                message: "Cannot open work item 7: no work-tracking organization/project configured".to_string()
            }
        );
    }

    #[test]
    fn absolute_path_never_consults_roots() {
        let context = FakeContext { roots: vec![PathBuf::from("/ws")], ..FakeContext::default() };
        let resolver = Resolver::new(context, services());
        let span = scan_line("/var/log/app.log:3:9").remove(0);

        assert_eq!(
            resolver.resolve(&span),
            Action::OpenDocument {
                path: PathBuf::from("/var/log/app.log"),
                selection: Some(Selection { column: 8, line: 2 }),
            }
        );
        assert_eq!(resolver.context.root_lookups.get(), 0);
    }

    #[test]
    fn windows_absolute_path_is_kept_verbatim() {
        let context = FakeContext { roots: vec![PathBuf::from("/ws")], ..FakeContext::default() };
        let action = resolve_first(context, r"C:\proj\main.rs:10");
        assert_eq!(
            action,
            Action::OpenDocument {
                path: PathBuf::from(r"C:\proj\main.rs"),
                selection: Some(Selection { column: 0, line: 9 }),
            }
        );
    }

    #[test]
    fn relative_path_uses_first_root() {
        let context = FakeContext {
            roots: vec![PathBuf::from("/ws/one"), PathBuf::from("/ws/two")],
            ..FakeContext::default()
        };
        assert_eq!(
            resolve_first(context, "./src/../lib/a.rs"),
            Action::OpenDocument { path: PathBuf::from("/ws/one/lib/a.rs"), selection: None }
        );
    }

    #[test]
    fn relative_path_without_roots_is_silent() {
        assert_eq!(resolve_first(FakeContext::default(), "src/bar.ts:42"), Action::NoOp);
    }

    #[test]
    fn line_zero_saturates() {
        let context = FakeContext { roots: vec![PathBuf::from("/ws")], ..FakeContext::default() };
        assert_eq!(
            resolve_first(context, "src/a.ts:0:0"),
            Action::OpenDocument {
                path: PathBuf::from("/ws/src/a.ts"),
                selection: Some(Selection { column: 0, line: 0 }),
            }
        );
    }

    #[test]
    fn every_resolution_reads_context_again() {
        let context = FakeContext { slug: Some("a/b".to_string()), ..FakeContext::default() };
        let resolver = Resolver::new(context, services());
        let span = scan_line("#3").remove(0);
        assert_eq!(resolver.resolve(&span), resolver.resolve(&span));
        assert_eq!(resolver.context.slug_lookups.get(), 2);
    }

    #[test]
    fn normalize_keeps_leading_parent() {
        assert_eq!(normalize_path(Path::new("../a/./b/../c")), PathBuf::from("../a/c"));
        assert_eq!(normalize_path(Path::new("/../x")), PathBuf::from("/../x"));
    }
}
