//! Orchestrates linting and fixing over a set of files.

use crate::config::{Config, ConfigError};
use crate::context::FileContext;
use crate::fixer::{Fixer, FixerError};
use crate::report::{Report, ReportError};
use crate::ruleset::Ruleset;
use crate::tokenizer::Tokenizer;
use crate::types::Violation;

use glob::Pattern;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that abort a whole run. Per-file failures never do: they become
/// fatal violations of that file.
#[derive(Debug, Error)]
pub enum LinterError {
    /// IO error outside of a single file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error while walking the file tree.
    #[error("Failed to walk files: {0}")]
    Walk(#[from] ignore::Error),

    /// Glob pattern error.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The worker pool could not be created.
    #[error("Failed to create thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A violation was attributed to a file outside the run.
    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Remembers which files were already clean in a previous run.
///
/// Implementations decide how files are fingerprinted; the linter only asks
/// before processing a file and reports files found clean.
pub trait Cache {
    /// Returns true if the file must be linted again.
    fn needs_processing(&self, path: &Path, content: &str) -> bool;

    /// Records that the file is clean with this content.
    fn mark_processed(&mut self, path: &Path, content: &str);
}

/// Builder for configuring a [`Linter`].
#[derive(Default)]
pub struct LinterBuilder {
    root: Option<PathBuf>,
    ruleset: Option<Ruleset>,
    exclude_patterns: Vec<String>,
    config: Option<Config>,
    tokenizer: Option<Tokenizer>,
}

impl LinterBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the root directory to lint.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Sets the rules to apply.
    #[must_use]
    pub fn ruleset(mut self, ruleset: Ruleset) -> Self {
        self.ruleset = Some(ruleset);
        self
    }

    /// Adds an exclude glob pattern.
    #[must_use]
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude_patterns.push(pattern.into());
        self
    }

    /// Adds multiple exclude glob patterns.
    #[must_use]
    pub fn excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Uses a tokenizer with a custom operator table.
    #[must_use]
    pub fn tokenizer(mut self, tokenizer: Tokenizer) -> Self {
        self.tokenizer = Some(tokenizer);
        self
    }

    /// Builds the linter.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory is unavailable or a glob is
    /// invalid.
    pub fn build(self) -> Result<Linter, LinterError> {
        let config = self.config.unwrap_or_default();
        let root = self.root.unwrap_or_else(|| config.linter.root.clone());
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };

        let exclude = self
            .exclude_patterns
            .iter()
            .chain(&config.linter.exclude)
            .map(|p| Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        let include = config
            .linter
            .include
            .iter()
            .map(|p| Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Linter {
            root,
            ruleset: self.ruleset.unwrap_or_default(),
            exclude,
            include,
            config,
            tokenizer: self.tokenizer.unwrap_or_default(),
        })
    }
}

/// What happened to one file.
struct FileOutcome {
    path: PathBuf,
    content: String,
    violations: Vec<Violation>,
    fixed: bool,
}

/// Lints (and optionally fixes) template files.
///
/// Use [`Linter::builder()`] to construct an instance.
#[derive(Debug)]
pub struct Linter {
    root: PathBuf,
    ruleset: Ruleset,
    exclude: Vec<Pattern>,
    include: Vec<Pattern>,
    config: Config,
    tokenizer: Tokenizer,
}

impl Linter {
    /// Creates a new builder for configuring a linter.
    #[must_use]
    pub fn builder() -> LinterBuilder {
        LinterBuilder::new()
    }

    /// Returns the root directory being linted.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the rules applied.
    #[must_use]
    pub fn ruleset(&self) -> &Ruleset {
        &self.ruleset
    }

    /// Discovers every template under the root.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree cannot be walked.
    pub fn discover_files(&self) -> Result<Vec<PathBuf>, LinterError> {
        self.discover_paths(std::slice::from_ref(&self.root))
    }

    /// Discovers templates under the given files and directories.
    ///
    /// Explicit files are kept as given. Directories are walked, honouring
    /// `.gitignore` when configured, and filtered by extension and globs.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be walked.
    pub fn discover_paths(&self, paths: &[PathBuf]) -> Result<Vec<PathBuf>, LinterError> {
        let mut files = Vec::new();

        for path in paths {
            let path = if path.is_absolute() {
                path.clone()
            } else {
                self.root.join(path)
            };

            if path.is_file() {
                files.push(path);
                continue;
            }

            let mut builder = ignore::WalkBuilder::new(&path);
            builder
                .hidden(false)
                .git_ignore(self.config.linter.respect_gitignore)
                .require_git(false);

            for entry in builder.build() {
                let entry = entry?;
                let file = entry.path();
                if !file.is_file() || !self.has_template_extension(file) {
                    continue;
                }
                if self.should_exclude(file) {
                    debug!("Excluding: {}", file.display());
                    continue;
                }
                files.push(file.to_path_buf());
            }
        }

        files.sort();
        files.dedup();
        Ok(files)
    }

    fn has_template_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.config.linter.extensions.iter().any(|e| e == ext))
    }

    /// Checks if a path should be excluded.
    fn should_exclude(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);

        if self.exclude.iter().any(|p| p.matches_path(relative)) {
            return true;
        }
        !self.include.is_empty() && !self.include.iter().any(|p| p.matches_path(relative))
    }

    /// Lints the files, fixing them first when `fix` is set.
    ///
    /// # Errors
    ///
    /// Returns an error only for failures that are not specific to a file.
    pub fn run(&self, files: &[PathBuf], fix: bool) -> Result<Report, LinterError> {
        self.run_with_cache(files, fix, None)
    }

    /// Same as [`Linter::run`], skipping files the cache knows to be clean
    /// and recording the files found clean.
    ///
    /// # Errors
    ///
    /// Returns an error only for failures that are not specific to a file.
    pub fn run_with_cache(
        &self,
        files: &[PathBuf],
        fix: bool,
        mut cache: Option<&mut dyn Cache>,
    ) -> Result<Report, LinterError> {
        info!("Starting lint at {:?}", self.root);

        let mut report = Report::new(files.iter().cloned());
        let mut pending = Vec::new();

        for path in files {
            match std::fs::read_to_string(path) {
                Ok(content) => {
                    let needed = cache
                        .as_deref()
                        .map_or(true, |c| c.needs_processing(path, &content));
                    if needed {
                        pending.push((path.clone(), content));
                    } else {
                        debug!("Cached: {}", path.display());
                    }
                }
                Err(e) => {
                    warn!("Failed to read {}: {}", path.display(), e);
                    report.add_violation(Violation::fatal(
                        format!("Unable to read file: {e}"),
                        path,
                        None,
                    ))?;
                }
            }
        }

        info!("Processing {} of {} files", pending.len(), files.len());

        let outcomes: Vec<FileOutcome> = match self.config.linter.parallelism {
            Some(threads) => rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()?
                .install(|| self.process_all(&pending, fix)),
            None => self.process_all(&pending, fix),
        };

        for outcome in outcomes {
            let clean = outcome.violations.is_empty();
            for violation in outcome.violations {
                report.add_violation(violation)?;
            }
            if outcome.fixed {
                report.add_fixed_file(&outcome.path)?;
            }
            if clean {
                if let Some(cache) = cache.as_deref_mut() {
                    cache.mark_processed(&outcome.path, &outcome.content);
                }
            }
        }

        info!(
            "Lint complete: {} errors, {} warnings in {} files ({} fixed)",
            report.total_errors() + report.total_fatal_errors(),
            report.total_warnings(),
            report.total_files(),
            report.fixed_files().len()
        );

        Ok(report)
    }

    fn process_all(&self, pending: &[(PathBuf, String)], fix: bool) -> Vec<FileOutcome> {
        pending
            .par_iter()
            .map(|(path, content)| self.process_file(path, content.clone(), fix))
            .collect()
    }

    /// Fixes then lints one file. Never fails: problems become violations.
    fn process_file(&self, path: &Path, mut content: String, fix: bool) -> FileOutcome {
        debug!("Linting: {}", path.display());
        let mut violations = Vec::new();
        let mut fixed = false;

        if fix {
            let file = FileContext::new(path, &content, &self.root);
            let mut fixer = Fixer::with_tokenizer(self.tokenizer.clone());
            match fixer.fix_file(&self.ruleset, &file) {
                Ok(new_content) if new_content != content => {
                    match std::fs::write(path, &new_content) {
                        Ok(()) => {
                            debug!("Fixed {} in {} loops", path.display(), fixer.loops());
                            fixed = true;
                            content = new_content;
                        }
                        Err(e) => violations.push(Violation::fatal(
                            format!("Unable to write fixed file: {e}"),
                            path,
                            None,
                        )),
                    }
                }
                Ok(_) => {}
                // The lint pass reports the same error on the original text.
                Err(FixerError::Tokenize(_)) => {}
                Err(e) => {
                    warn!("Failed to fix {}: {}", path.display(), e);
                    violations.push(Violation::fatal(e.to_string(), path, e.line()));
                }
            }
        }

        let file = FileContext::new(path, &content, &self.root);
        let mut report = Report::new([path]);
        match self.tokenizer.tokenize(&file) {
            Ok((tokens, directives)) => {
                if let Err(e) = self
                    .ruleset
                    .lint_file(&tokens, &file, &directives, &mut report)
                {
                    warn!("Failed to lint {}: {}", path.display(), e);
                }
            }
            Err(e) => violations.push(Violation::fatal(e.to_string(), path, e.line())),
        }
        violations.extend(report.all_violations(None).into_iter().cloned());

        FileOutcome {
            path: path.to_path_buf(),
            content,
            violations,
            fixed,
        }
    }
}
