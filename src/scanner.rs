use std::collections::HashSet;

use regex::Captures;

use crate::patterns::{self, FILE_PATH_RULE, REFERENCE_PATTERNS, ReferencePattern};
use crate::types::{LinkKind, LinkSpan, LinkTarget};

/// Scan one line of terminal text and return every link found in it.
///
/// Reference rules run first, in table order, then the file path rule. Each rule scans
/// the whole line on its own, so the same digits may be reported by two rules; callers
/// that want one span per location can pass the result through [`dedupe`].
pub fn scan_line(line: &str) -> Vec<LinkSpan> {
    let mut spans = Vec::new();

    for pattern in REFERENCE_PATTERNS.iter() {
        extract_reference_spans(line, pattern, &mut spans);
    }
    extract_file_path_spans(line, &mut spans);

    tracing::trace!(count = spans.len(), "scanned line");
    return spans;
}

/// Drop spans naming the same reference as an earlier span. Two spans are the same
/// reference when kind and payload match and they end at the same character, as
/// `PR #99` and the `#99` inside it do. Keeps first occurrences in their original order.
pub fn dedupe(spans: Vec<LinkSpan>) -> Vec<LinkSpan> {
    let mut seen: HashSet<(LinkKind, String, usize)> = HashSet::new();
    return spans
        .into_iter()
        .filter(|span| {
            let end = span.start.saturating_add(span.length);
            return seen.insert((span.kind(), span.target.display_payload(), end));
        })
        .collect();
}

/// Collect all matches of one reference rule.
fn extract_reference_spans(line: &str, pattern: &ReferencePattern, spans: &mut Vec<LinkSpan>) {
    for cap in pattern.regex.captures_iter(line) {
        if !pattern.accepts(line, &cap) {
            continue;
        }
        let Some(span) = parse_reference_capture(line, pattern.kind, &cap) else {
            continue;
        };
        spans.push(span);
    }
}

/// Turn a reference capture into a span. Group 1 is always the digit run.
fn parse_reference_capture(line: &str, kind: LinkKind, cap: &Captures<'_>) -> Option<LinkSpan> {
    let whole = cap.get(0)?;
    let number = cap.get(1)?.as_str().to_string();

    let (target, tooltip) = match kind {
        LinkKind::Issue => {
            let tooltip = format!("Open #{number} on GitHub");
            (LinkTarget::Issue { number }, tooltip)
        },
        LinkKind::WorkItem => {
            let tooltip = format!("Open {} in Azure DevOps", whole.as_str());
            (LinkTarget::WorkItem { number }, tooltip)
        },
        LinkKind::FilePath => return None,
    };

    return Some(LinkSpan {
        length: whole.as_str().chars().count(),
        start: char_offset(line, whole.start()),
        target,
        tooltip,
    });
}

/// Collect all file path matches, splitting off the `:line:col` suffix.
fn extract_file_path_spans(line: &str, spans: &mut Vec<LinkSpan>) {
    for cap in FILE_PATH_RULE.captures_iter(line) {
        if cap.get(0).is_some_and(|m| return !patterns::starts_path_token(line, m.start())) {
            continue;
        }
        let Some(span) = parse_file_path_capture(line, &cap) else {
            continue;
        };
        spans.push(span);
    }
}

/// Turn a file path capture into a span. The reported path never carries the suffix,
/// while the span length always covers it.
fn parse_file_path_capture(line: &str, cap: &Captures<'_>) -> Option<LinkSpan> {
    let whole = cap.get(0)?;
    let suffix_start = cap.get(1).map_or(whole.end(), |m| return m.start().saturating_sub(1));
    let path = line.get(whole.start()..suffix_start)?.to_string();

    let line_number = cap.get(1).and_then(|m| return m.as_str().parse::<u32>().ok());
    let column = line_number.and(cap.get(2)).and_then(|m| return m.as_str().parse::<u32>().ok());

    let tooltip = format!("Open {}", basename(&path));
    return Some(LinkSpan {
        length: whole.as_str().chars().count(),
        start: char_offset(line, whole.start()),
        target: LinkTarget::FilePath {
            column,
            line: line_number,
            path,
        },
        tooltip,
    });
}

/// Last component of a path written with either separator.
fn basename(path: &str) -> &str {
    return path.rsplit(['/', '\\']).next().unwrap_or(path);
}

/// Convert a byte offset into a character offset within `line`.
fn char_offset(line: &str, byte_offset: usize) -> usize {
    return line.get(..byte_offset).map_or(0, |prefix| return prefix.chars().count());
}
