//! Core types for lint violations.

use crate::violation_id::ViolationId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Severity level for lint violations.
///
/// Ordered: `Notice < Warning < Error < Fatal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message, does not fail lint.
    Notice,
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    Error,
    /// The file could not be processed at all.
    Fatal,
}

impl Severity {
    /// Parses a lowercase severity name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "notice" => Some(Self::Notice),
            "warning" => Some(Self::Warning),
            "error" => Some(Self::Error),
            "fatal" => Some(Self::Fatal),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Notice => write!(f, "notice"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
            Self::Fatal => write!(f, "fatal"),
        }
    }
}

/// A lint violation found during analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Severity of this violation.
    pub severity: Severity,
    /// Human-readable message.
    pub message: String,
    /// File the violation belongs to.
    pub file: PathBuf,
    /// Short name of the reporting rule, absent for fatal errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
    /// Identifier, also carrying the location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ViolationId>,
}

impl Violation {
    /// Creates a new violation.
    #[must_use]
    pub fn new(severity: Severity, message: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            severity,
            message: message.into(),
            file: file.into(),
            rule: None,
            id: None,
        }
    }

    /// Creates a fatal violation located on a line.
    #[must_use]
    pub fn fatal(message: impl Into<String>, file: impl Into<PathBuf>, line: Option<usize>) -> Self {
        let violation = Self::new(Severity::Fatal, message, file);
        match line {
            Some(line) => violation.with_id(ViolationId::at_line(line)),
            None => violation,
        }
    }

    /// Sets the reporting rule name.
    #[must_use]
    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    /// Sets the identifier.
    #[must_use]
    pub fn with_id(mut self, id: ViolationId) -> Self {
        self.id = Some(id);
        self
    }

    /// Line of the violation, if known.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        self.id.as_ref().and_then(|id| id.line)
    }

    /// Column of the violation, if known.
    #[must_use]
    pub fn column(&self) -> Option<usize> {
        self.id.as_ref().and_then(|id| id.column)
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}",
            self.file.display(),
            self.line().unwrap_or(0),
            self.column().unwrap_or(0),
            self.severity,
        )?;
        if let Some(rule) = &self.rule {
            write!(f, " [{rule}]")?;
        }
        write!(f, " {}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_violation(severity: Severity) -> Violation {
        Violation::new(severity, "Expecting 1 whitespace after \"+\"", "templates/base.html.twig")
            .with_rule("OperatorSpacing")
            .with_id(ViolationId::new(
                "OperatorSpacing",
                Some("After"),
                Some("Operator"),
                Some(42),
                Some(10),
            ))
    }

    #[test]
    fn severity_is_totally_ordered() {
        assert!(Severity::Notice < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error < Severity::Fatal);
        assert_eq!(Severity::from_name("fatal"), Some(Severity::Fatal));
        assert_eq!(Severity::from_name("critical"), None);
    }

    #[test]
    fn location_comes_from_id() {
        let v = make_violation(Severity::Error);
        assert_eq!(v.line(), Some(42));
        assert_eq!(v.column(), Some(10));
    }

    #[test]
    fn display_is_compact() {
        let v = make_violation(Severity::Warning);
        assert_eq!(
            v.to_string(),
            "templates/base.html.twig:42:10: warning [OperatorSpacing] Expecting 1 whitespace after \"+\""
        );
    }

    #[test]
    fn fatal_has_line_but_no_rule() {
        let v = Violation::fatal("Unclosed comment", "a.twig", Some(3));
        assert_eq!(v.severity, Severity::Fatal);
        assert_eq!(v.line(), Some(3));
        assert!(v.rule.is_none());
        assert_eq!(v.to_string(), "a.twig:3:0: fatal Unclosed comment");
    }
}
