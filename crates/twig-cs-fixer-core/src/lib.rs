//! # twig-cs-fixer-core
//!
//! Core engine for linting and fixing Twig templates.
//!
//! This crate provides:
//!
//! - [`Tokenizer`], a lossless lexer turning templates into [`Tokens`]
//! - [`Rule`] and [`FixableRule`] traits for token-based rules
//! - [`Ruleset`] for ordered, de-duplicated rule composition
//! - [`Fixer`] for iterative, conflict-aware auto-fixing
//! - [`Linter`] for orchestrating lint and fix runs over many files
//! - [`Report`] and [`Violation`] for representing lint findings
//!
//! ## Example
//!
//! ```ignore
//! use twig_cs_fixer_core::{Linter, Ruleset};
//!
//! let mut ruleset = Ruleset::new();
//! ruleset.add_rule(MyRule::new());
//!
//! let linter = Linter::builder()
//!     .root("./templates")
//!     .ruleset(ruleset)
//!     .build()?;
//!
//! let files = linter.discover_files()?;
//! let report = linter.run(&files, false)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod context;
mod fixer;
mod linter;
mod path_aware;
mod report;
mod rule;
mod ruleset;
mod token;
mod tokenizer;
mod tokens;
mod types;
mod violation_id;

/// Template for rules enforcing spaces around tokens.
pub mod spacing;
/// Comment-based suppression directives.
pub mod suppression;

pub use config::{Config, ConfigError, LinterConfig, RuleConfig};
pub use context::FileContext;
pub use fixer::{Fixer, FixerError, MAX_FIXER_ITERATION};
pub use linter::{Cache, Linter, LinterBuilder, LinterError};
pub use path_aware::PathAwareRule;
pub use report::{Report, ReportError};
pub use rule::{FixableRule, Rule, RuleBox, RuleContext};
pub use ruleset::Ruleset;
pub use spacing::SpacingRule;
pub use token::{Token, TokenType};
pub use tokenizer::{
    LexState, TokenizeError, Tokenizer, DEFAULT_BINARY_OPERATORS, DEFAULT_UNARY_OPERATORS,
};
pub use tokens::{Tokens, TokensError};
pub use types::{Severity, Violation};
pub use violation_id::ViolationId;
