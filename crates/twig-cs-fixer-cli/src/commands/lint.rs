//! Lint command implementation.

use anyhow::{Context, Result};
use std::path::PathBuf;
use twig_cs_fixer_core::{Cache, Linter, Report, Severity};
use twig_cs_fixer_rules::build_ruleset;

use crate::cache::{self, FileCache, DEFAULT_CACHE_FILE};
use crate::config_resolver::ConfigSource;
use crate::OutputFormat;

/// Arguments of the lint command.
#[derive(Debug, Clone, Default)]
pub struct LintArgs {
    /// Files or directories to lint; the configured root when empty.
    pub paths: Vec<PathBuf>,
    /// Fix files in place first.
    pub fix: bool,
    /// Output format.
    pub format: OutputFormat,
    /// Minimum severity to print.
    pub level: Option<Severity>,
    /// Skip the cache entirely.
    pub no_cache: bool,
    /// Extra exclude globs.
    pub exclude: Vec<String>,
}

/// Runs the lint command and prints the report.
///
/// Returns `true` when violations at or above `fail_on` remain.
pub fn run(args: &LintArgs, source: &ConfigSource) -> Result<bool> {
    let (report, linter, fail_on) = execute(args, source)?;
    super::output::print(&report, args.format, args.level, linter.root())?;
    Ok(report.has_violations_at(fail_on))
}

/// Lints without printing.
fn execute(args: &LintArgs, source: &ConfigSource) -> Result<(Report, Linter, Severity)> {
    let config = source.load()?;
    let fail_on = config
        .fail_on_severity()
        .context("Invalid configuration")?;
    let ruleset = build_ruleset(&config).context("Invalid rule configuration")?;
    let cache_file = config.cache_file.clone();

    let linter = Linter::builder()
        .ruleset(ruleset)
        .excludes(args.exclude.iter().cloned())
        .config(config)
        .build()
        .context("Failed to build linter")?;

    let files = if args.paths.is_empty() {
        linter.discover_files()
    } else {
        linter.discover_paths(&args.paths)
    }
    .context("Failed to discover templates")?;

    tracing::info!(
        "Linting {} file(s) with {} rule(s)",
        files.len(),
        linter.ruleset().len()
    );

    let report = if args.no_cache {
        linter.run(&files, args.fix)
    } else {
        let path = linter
            .root()
            .join(cache_file.unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_FILE)));
        let mut file_cache = FileCache::load(&path, &cache::signature(linter.ruleset()));
        tracing::debug!("Cache holds {} clean file(s)", file_cache.file_count());

        let report = linter.run_with_cache(&files, args.fix, Some(&mut file_cache as &mut dyn Cache));
        if let Err(e) = file_cache.save() {
            tracing::warn!("{e:#}");
        }
        report
    }
    .context("Lint run failed")?;

    Ok((report, linter, fail_on))
}
