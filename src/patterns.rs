//! Ordered reference rules and the file path rule.
//!
//! Rule order is the order spans are reported in. Each rule scans the whole line on
//! its own, so one number can be claimed by more than one rule. Keywords, word
//! boundaries and digits are ASCII only.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::types::LinkKind;

/// Longest digit run the bare `#123` form accepts.
const BARE_HASH_MAX_DIGITS: usize = 6;

/// Path rule: an anchor, a body without whitespace or reserved characters, an extension,
/// then an optional `:line` or `:line:col` suffix. The anchor must also start a token,
/// see [`starts_path_token`].
const FILE_PATH_SOURCE: &str = concat!(
    r"(?:[A-Za-z]:\\|/|\./|(?:src|test|lib|dist|out|bin|packages|package|apps|app)/)",
    r#"[^\s:*?"<>|]+\.[A-Za-z]{1,10}"#,
    r"(?::([0-9]+)(?::([0-9]+))?)?",
);

/// Compiled file path rule.
///
/// # Panics
///
/// Panics on first use if the hardcoded pattern is invalid (compile-time invariant).
pub static FILE_PATH_RULE: LazyLock<Regex> =
    LazyLock::new(|| return Regex::new(FILE_PATH_SOURCE).expect("valid file path regex"));

/// Reference rules in precedence order.
///
/// # Panics
///
/// Panics on first use if a hardcoded pattern is invalid (compile-time invariant).
pub static REFERENCE_PATTERNS: LazyLock<Vec<ReferencePattern>> = LazyLock::new(|| {
    return vec![
        rule("pr-keyword", r"(?i-u)\b(?:PR|issue|pull)\s*#([0-9]+)\b", LinkKind::Issue, Boundary::Regex),
        rule("bare-hash", r"#([0-9]+)", LinkKind::Issue, Boundary::StandaloneDigits),
        rule(
            "work-item",
            r"(?i-u)\b(?:WI|US|Bug|Task|Feature|Epic)#([0-9]+)\b",
            LinkKind::WorkItem,
            Boundary::Regex,
        ),
    ];
});

/// How a rule decides that its digit run is properly delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// The regex itself enforces the boundary.
    Regex,
    /// No word character may touch the `#` or the digits, and the run is at most six long.
    /// Checked in code because the regex engine has no look-around.
    StandaloneDigits,
}

/// One reference rule: a regex whose first group is the numeric identifier.
#[derive(Debug)]
pub struct ReferencePattern {
    /// How matches are delimited.
    pub boundary: Boundary,
    /// Kind assigned to every span this rule emits.
    pub kind: LinkKind,
    /// Stable rule name, shown by `info`.
    pub name: &'static str,
    /// Compiled matcher.
    pub regex: Regex,
}

impl ReferencePattern {
    /// Whether a raw regex match is a real reference in `line`.
    pub fn accepts(&self, line: &str, cap: &Captures<'_>) -> bool {
        return match self.boundary {
            Boundary::Regex => true,
            Boundary::StandaloneDigits => is_standalone_digit_run(line, cap),
        };
    }
}

/// Build one rule from a hardcoded pattern.
///
/// # Panics
///
/// Panics if `pattern` is invalid (compile-time invariant).
fn rule(name: &'static str, pattern: &str, kind: LinkKind, boundary: Boundary) -> ReferencePattern {
    return ReferencePattern {
        boundary,
        kind,
        name,
        regex: Regex::new(pattern).expect("valid reference regex"),
    };
}

/// ASCII word character, as in `[A-Za-z0-9_]`.
const fn is_word_char(c: char) -> bool {
    return c.is_ascii_alphanumeric() || c == '_';
}

/// Check the bare `#123` boundary: nothing word-like before `#` or after the digits,
/// and the digit run is short enough to be an issue number rather than a hex color or hash.
fn is_standalone_digit_run(line: &str, cap: &Captures<'_>) -> bool {
    let (Some(whole), Some(digits)) = (cap.get(0), cap.get(1)) else {
        return false;
    };
    if digits.len() > BARE_HASH_MAX_DIGITS {
        return false;
    }
    let before = line.get(..whole.start()).and_then(|s| return s.chars().next_back());
    let after = line.get(whole.end()..).and_then(|s| return s.chars().next());
    return !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char);
}

/// Character that can sit inside a path token, so an anchor right after it is
/// mid-token (`node_modules/lib/x.js`, `https://host/x.html`).
fn is_path_char(c: char) -> bool {
    return c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | '\\' | ':' | '~' | '@' | '%' | '+');
}

/// Whether a file path match at byte `start` begins a token rather than continuing one.
pub fn starts_path_token(line: &str, start: usize) -> bool {
    let before = line.get(..start).and_then(|s| return s.chars().next_back());
    return !before.is_some_and(is_path_char);
}
