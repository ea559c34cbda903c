//! Structured identifiers used both to report and to suppress violations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a violation: `rule[.sub[.token]][:line[:column]]`.
///
/// A reported violation carries every field. A suppression pattern may leave
/// any of them out; absent fields match anything (see [`ViolationId::matches`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViolationId {
    /// Short name of the rule (e.g. `OperatorSpacing`).
    pub rule: Option<String>,
    /// Rule-specific message id (e.g. `After`).
    pub sub_id: Option<String>,
    /// Name of the token type the violation was reported on.
    pub token: Option<String>,
    /// Line (1-indexed).
    pub line: Option<usize>,
    /// Column (1-indexed).
    pub column: Option<usize>,
}

impl ViolationId {
    /// Creates a fully specified id.
    #[must_use]
    pub fn new(
        rule: impl Into<String>,
        sub_id: Option<&str>,
        token: Option<&str>,
        line: Option<usize>,
        column: Option<usize>,
    ) -> Self {
        Self {
            rule: Some(rule.into()),
            sub_id: sub_id.map(String::from),
            token: token.map(String::from),
            line,
            column,
        }
    }

    /// Creates an id that only locates a line, used for fatal errors that no
    /// rule owns.
    #[must_use]
    pub fn at_line(line: usize) -> Self {
        Self {
            line: Some(line),
            ..Self::default()
        }
    }

    /// Parses the textual form.
    ///
    /// `default_line` is used when the text carries no line. Empty parts and
    /// parts that are not numbers are treated as absent.
    #[must_use]
    pub fn parse(text: &str, default_line: Option<usize>) -> Self {
        let mut location = text.trim().split(':');
        let name = location.next().unwrap_or_default();
        let line = location
            .next()
            .and_then(|l| l.trim().parse().ok())
            .or(default_line);
        let column = location.next().and_then(|c| c.trim().parse().ok());

        let mut parts = name.splitn(3, '.').map(str::trim);
        let non_empty = |p: Option<&str>| p.filter(|s| !s.is_empty()).map(String::from);

        Self {
            rule: non_empty(parts.next()),
            sub_id: non_empty(parts.next()),
            token: non_empty(parts.next()),
            line,
            column,
        }
    }

    /// Returns true if `other` satisfies this pattern.
    ///
    /// Every field absent from `self` is a wildcard, so the relation is not
    /// symmetric: `MyRule` matches `MyRule.Sub.Name:3:4` but not the reverse.
    /// Names compare case-insensitively.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        fn text(pattern: Option<&String>, value: Option<&String>) -> bool {
            match (pattern, value) {
                (None, _) => true,
                (Some(p), Some(v)) => p.eq_ignore_ascii_case(v),
                (Some(_), None) => false,
            }
        }
        fn number(pattern: Option<usize>, value: Option<usize>) -> bool {
            pattern.is_none() || pattern == value
        }

        text(self.rule.as_ref(), other.rule.as_ref())
            && text(self.sub_id.as_ref(), other.sub_id.as_ref())
            && text(self.token.as_ref(), other.token.as_ref())
            && number(self.line, other.line)
            && number(self.column, other.column)
    }
}

impl fmt::Display for ViolationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.rule.as_deref().unwrap_or_default())?;
        if let Some(sub_id) = &self.sub_id {
            write!(f, ".{sub_id}")?;
            if let Some(token) = &self.token {
                write!(f, ".{token}")?;
            }
        }
        if let Some(line) = self.line {
            write!(f, ":{line}")?;
            if let Some(column) = self.column {
                write!(f, ":{column}")?;
            }
        }
        Ok(())
    }
}
