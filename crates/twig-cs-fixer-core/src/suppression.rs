//! Comment-based suppression directives.
//!
//! Supports directives like:
//! ```text
//! {# twig-cs-fixer-disable OperatorSpacing #}
//! {# twig-cs-fixer-disable-line OperatorSpacing.After, TrailingSpace #}
//! {# twig-cs-fixer-disable-next-line DelimiterSpacing #}
//! ```
//!
//! A directive without any id silences every rule in its scope.

use crate::violation_id::ViolationId;
use regex::Regex;
use std::sync::LazyLock;

static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^twig-cs-fixer-disable(-line|-next-line)?(?:\s+(.*))?$")
        .unwrap_or_else(|e| unreachable!("directive regex is valid: {e}"))
});

/// Scope of a suppression directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveScope {
    /// `disable`: ids apply as written, file-wide unless they carry a line.
    File,
    /// `disable-line`: ids apply to the comment's own line.
    Line,
    /// `disable-next-line`: ids apply to the line after the comment.
    NextLine,
}

impl DirectiveScope {
    fn line(self, comment_line: usize) -> Option<usize> {
        match self {
            Self::File => None,
            Self::Line => Some(comment_line),
            Self::NextLine => Some(comment_line + 1),
        }
    }
}

/// Parses the body of a comment starting on `line`.
///
/// Returns `None` when the comment is not a directive, otherwise the
/// suppression patterns it declares.
#[must_use]
pub fn parse_directive(comment: &str, line: usize) -> Option<Vec<ViolationId>> {
    let captures = DIRECTIVE.captures(comment.trim())?;
    let scope = match captures.get(1).map(|m| m.as_str()) {
        Some("-line") => DirectiveScope::Line,
        Some("-next-line") => DirectiveScope::NextLine,
        _ => DirectiveScope::File,
    };
    let default_line = scope.line(line);

    let ids: Vec<ViolationId> = captures
        .get(2)
        .map(|m| m.as_str())
        .unwrap_or_default()
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| ViolationId::parse(s, default_line))
        .collect();

    if ids.is_empty() {
        return Some(vec![ViolationId {
            line: default_line,
            ..ViolationId::default()
        }]);
    }

    Some(ids)
}

/// Returns true if any directive matches the concrete id.
#[must_use]
pub fn is_suppressed(directives: &[ViolationId], id: &ViolationId) -> bool {
    directives.iter().any(|directive| directive.matches(id))
}
