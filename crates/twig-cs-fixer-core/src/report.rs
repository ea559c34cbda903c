//! Per-run aggregation of violations.

use crate::types::{Severity, Violation};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised by [`Report`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    /// The file is not part of the report's file set.
    #[error("file {} is not part of this report", .0.display())]
    UnknownFile(PathBuf),
}

/// Violations of a fixed set of files.
///
/// The file set is chosen at construction; violations for any other file are
/// rejected, which catches rules attributing output to the wrong file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    files: BTreeMap<PathBuf, Vec<Violation>>,
    fixed_files: Vec<PathBuf>,
    total_notices: usize,
    total_warnings: usize,
    total_errors: usize,
    total_fatal_errors: usize,
}

impl Report {
    /// Creates a report for the given files.
    #[must_use]
    pub fn new<I, P>(files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            files: files.into_iter().map(|f| (f.into(), Vec::new())).collect(),
            ..Self::default()
        }
    }

    /// Records a violation.
    ///
    /// # Errors
    ///
    /// Fails if the violation's file is not part of this report.
    pub fn add_violation(&mut self, violation: Violation) -> Result<(), ReportError> {
        let Some(violations) = self.files.get_mut(&violation.file) else {
            return Err(ReportError::UnknownFile(violation.file));
        };

        match violation.severity {
            Severity::Notice => self.total_notices += 1,
            Severity::Warning => self.total_warnings += 1,
            Severity::Error => self.total_errors += 1,
            Severity::Fatal => self.total_fatal_errors += 1,
        }
        violations.push(violation);
        Ok(())
    }

    /// Returns the violations of one file at or above `min` severity.
    ///
    /// # Errors
    ///
    /// Fails if the file is not part of this report.
    pub fn file_violations(
        &self,
        file: &Path,
        min: Option<Severity>,
    ) -> Result<Vec<&Violation>, ReportError> {
        let violations = self
            .files
            .get(file)
            .ok_or_else(|| ReportError::UnknownFile(file.to_path_buf()))?;
        Ok(violations
            .iter()
            .filter(|v| min.map_or(true, |min| v.severity >= min))
            .collect())
    }

    /// Returns every violation at or above `min` severity, in file order.
    #[must_use]
    pub fn all_violations(&self, min: Option<Severity>) -> Vec<&Violation> {
        self.files
            .values()
            .flatten()
            .filter(|v| min.map_or(true, |min| v.severity >= min))
            .collect()
    }

    /// Files covered by this report, sorted.
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    /// Number of files covered by this report.
    #[must_use]
    pub fn total_files(&self) -> usize {
        self.files.len()
    }

    /// Records that a file was rewritten by the fixer.
    ///
    /// # Errors
    ///
    /// Fails if the file is not part of this report.
    pub fn add_fixed_file(&mut self, file: impl Into<PathBuf>) -> Result<(), ReportError> {
        let file = file.into();
        if !self.files.contains_key(&file) {
            return Err(ReportError::UnknownFile(file));
        }
        if !self.fixed_files.contains(&file) {
            self.fixed_files.push(file);
        }
        Ok(())
    }

    /// Files rewritten by the fixer, in the order they were fixed.
    #[must_use]
    pub fn fixed_files(&self) -> &[PathBuf] {
        &self.fixed_files
    }

    /// Number of notices.
    #[must_use]
    pub fn total_notices(&self) -> usize {
        self.total_notices
    }

    /// Number of warnings.
    #[must_use]
    pub fn total_warnings(&self) -> usize {
        self.total_warnings
    }

    /// Number of errors.
    #[must_use]
    pub fn total_errors(&self) -> usize {
        self.total_errors
    }

    /// Number of fatal errors.
    #[must_use]
    pub fn total_fatal_errors(&self) -> usize {
        self.total_fatal_errors
    }

    /// Checks if any violation meets or exceeds the given severity.
    #[must_use]
    pub fn has_violations_at(&self, severity: Severity) -> bool {
        self.files.values().flatten().any(|v| v.severity >= severity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn violation(file: &str, severity: Severity) -> Violation {
        Violation::new(severity, "message", file)
    }

    #[test]
    fn rejects_unknown_file() {
        let mut report = Report::new(["a.twig"]);
        assert_eq!(
            report.add_violation(violation("b.twig", Severity::Error)),
            Err(ReportError::UnknownFile(PathBuf::from("b.twig")))
        );
        assert_eq!(report.total_errors(), 0);
    }

    #[test]
    fn counts_by_severity() {
        let mut report = Report::new(["a.twig", "b.twig"]);
        report.add_violation(violation("a.twig", Severity::Notice)).unwrap();
        report.add_violation(violation("a.twig", Severity::Warning)).unwrap();
        report.add_violation(violation("b.twig", Severity::Error)).unwrap();
        report.add_violation(violation("b.twig", Severity::Fatal)).unwrap();

        assert_eq!(report.total_notices(), 1);
        assert_eq!(report.total_warnings(), 1);
        assert_eq!(report.total_errors(), 1);
        assert_eq!(report.total_fatal_errors(), 1);
        assert_eq!(report.total_files(), 2);
    }

    #[test]
    fn filters_file_violations_by_level() {
        let mut report = Report::new(["a.twig"]);
        report.add_violation(violation("a.twig", Severity::Notice)).unwrap();
        report.add_violation(violation("a.twig", Severity::Error)).unwrap();

        let file = Path::new("a.twig");
        assert_eq!(report.file_violations(file, None).unwrap().len(), 2);
        assert_eq!(
            report.file_violations(file, Some(Severity::Warning)).unwrap().len(),
            1
        );
        assert!(report.file_violations(Path::new("c.twig"), None).is_err());
        assert!(report.has_violations_at(Severity::Error));
        assert!(!report.has_violations_at(Severity::Fatal));
    }

    #[test]
    fn fixed_files_are_deduplicated() {
        let mut report = Report::new(["a.twig"]);
        report.add_fixed_file("a.twig").unwrap();
        report.add_fixed_file("a.twig").unwrap();
        assert_eq!(report.fixed_files(), &[PathBuf::from("a.twig")]);
        assert!(report.add_fixed_file("b.twig").is_err());
    }
}
