//! Shared output formatting for lint results.

use anyhow::Result;
use serde::Serialize;
use std::io::{IsTerminal, Write};
use std::path::Path;
use twig_cs_fixer_core::{Report, Severity, Violation};

use crate::OutputFormat;

/// What to print and how.
#[derive(Debug, Clone, Copy)]
pub struct OutputOptions<'a> {
    /// Output format.
    pub format: OutputFormat,
    /// Minimum severity to print. Totals always count everything.
    pub level: Option<Severity>,
    /// Paths are printed relative to this directory.
    pub root: &'a Path,
    /// Use ANSI colors in text output.
    pub color: bool,
}

/// Print lint results in the specified format.
pub fn print(report: &Report, format: OutputFormat, level: Option<Severity>, root: &Path) -> Result<()> {
    let stdout = std::io::stdout();
    let options = OutputOptions {
        format,
        level,
        root,
        color: stdout.is_terminal(),
    };
    write(&mut stdout.lock(), report, &options)
}

/// Writes lint results to `out`.
pub fn write(out: &mut dyn Write, report: &Report, options: &OutputOptions<'_>) -> Result<()> {
    match options.format {
        OutputFormat::Text => write_text(out, report, options)?,
        OutputFormat::Json => write_json(out, report, options)?,
        OutputFormat::Compact => write_compact(out, report, options)?,
    }
    out.flush()?;
    Ok(())
}

fn relative<'p>(path: &'p Path, root: &Path) -> &'p Path {
    path.strip_prefix(root).unwrap_or(path)
}

/// `Rule.Sub.Token`, without the location part.
fn short_id(violation: &Violation) -> Option<String> {
    let mut id = violation.id.clone()?;
    id.rule.as_ref()?;
    id.line = None;
    id.column = None;
    Some(id.to_string())
}

fn location(violation: &Violation) -> String {
    match (violation.line(), violation.column()) {
        (Some(line), Some(column)) => format!("{line}:{column}"),
        (Some(line), None) => line.to_string(),
        _ => "-".to_string(),
    }
}

fn paint(text: &str, code: &str, color: bool) -> String {
    if color {
        format!("\x1b[{code}m{text}\x1b[0m")
    } else {
        text.to_string()
    }
}

fn severity_code(severity: Severity) -> &'static str {
    match severity {
        Severity::Fatal => "1;31",
        Severity::Error => "31",
        Severity::Warning => "33",
        Severity::Notice => "34",
    }
}

fn write_text(out: &mut dyn Write, report: &Report, options: &OutputOptions<'_>) -> Result<()> {
    for file in report.files() {
        let violations = report
            .file_violations(file, options.level)
            .unwrap_or_default();
        if violations.is_empty() {
            continue;
        }
        writeln!(out, "{}", relative(file, options.root).display())?;
        for violation in violations {
            let severity = paint(
                &format!("{:<7}", violation.severity.to_string()),
                severity_code(violation.severity),
                options.color,
            );
            let id = short_id(violation).map(|id| format!("  ({id})")).unwrap_or_default();
            writeln!(
                out,
                "  {:<8} {severity} {}{id}",
                location(violation),
                violation.message
            )?;
        }
        writeln!(out)?;
    }

    if !report.fixed_files().is_empty() {
        writeln!(out, "Fixed {} file(s)", report.fixed_files().len())?;
    }

    let errors = report.total_errors() + report.total_fatal_errors();
    let summary = format!(
        "Found {} error(s), {} warning(s), {} notice(s) in {} file(s)",
        errors,
        report.total_warnings(),
        report.total_notices(),
        report.total_files()
    );
    let summary_code = if errors > 0 {
        "31"
    } else if report.total_warnings() > 0 {
        "33"
    } else {
        "32"
    };
    writeln!(out, "{}", paint(&summary, summary_code, options.color))?;
    Ok(())
}

#[derive(Serialize)]
struct JsonReport {
    totals: JsonTotals,
    fixed: Vec<String>,
    files: Vec<JsonFile>,
}

#[derive(Serialize)]
struct JsonTotals {
    files: usize,
    notices: usize,
    warnings: usize,
    errors: usize,
    fatal_errors: usize,
}

#[derive(Serialize)]
struct JsonFile {
    path: String,
    violations: Vec<JsonViolation>,
}

#[derive(Serialize)]
struct JsonViolation {
    severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    column: Option<usize>,
    message: String,
}

fn write_json(out: &mut dyn Write, report: &Report, options: &OutputOptions<'_>) -> Result<()> {
    let path = |p: &Path| relative(p, options.root).display().to_string();

    let files = report
        .files()
        .filter_map(|file| {
            let violations = report.file_violations(file, options.level).ok()?;
            if violations.is_empty() {
                return None;
            }
            Some(JsonFile {
                path: path(file),
                violations: violations
                    .into_iter()
                    .map(|v| JsonViolation {
                        severity: v.severity,
                        id: short_id(v),
                        line: v.line(),
                        column: v.column(),
                        message: v.message.clone(),
                    })
                    .collect(),
            })
        })
        .collect();

    let json = JsonReport {
        totals: JsonTotals {
            files: report.total_files(),
            notices: report.total_notices(),
            warnings: report.total_warnings(),
            errors: report.total_errors(),
            fatal_errors: report.total_fatal_errors(),
        },
        fixed: report.fixed_files().iter().map(|p| path(p)).collect(),
        files,
    };
    serde_json::to_writer_pretty(&mut *out, &json)?;
    writeln!(out)?;
    Ok(())
}

fn write_compact(out: &mut dyn Write, report: &Report, options: &OutputOptions<'_>) -> Result<()> {
    for violation in report.all_violations(options.level) {
        let id = short_id(violation).map(|id| format!(" [{id}]")).unwrap_or_default();
        writeln!(
            out,
            "{}:{}: {}{id} {}",
            relative(&violation.file, options.root).display(),
            location(violation),
            violation.severity,
            violation.message
        )?;
    }
    Ok(())
}
