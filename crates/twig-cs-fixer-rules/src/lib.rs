//! # twig-cs-fixer-rules
//!
//! Built-in rules and standards for twig-cs-fixer.
//!
//! ## Available Rules
//!
//! | Name | Fixable | Description |
//! |------|---------|-------------|
//! | `DelimiterSpacing` | yes | One space inside `{{ }}` and `{% %}` |
//! | `OperatorSpacing` | yes | One space around binary operators, none after unary `-`/`+`, none around `..` |
//! | `PunctuationSpacing` | yes | No space inside brackets or before `, : . \|`; one after `,` and hash `:` |
//! | `TrailingSpace` | yes | No spaces or tabs at the end of a line |
//! | `BlankEof` | yes | Exactly one line break at the end of a file |
//! | `Indent` | yes | Leading tabs become spaces |
//! | `VariableName` | no | `set` variables follow a naming convention |
//!
//! ## Usage
//!
//! ```ignore
//! use twig_cs_fixer_core::{Config, Linter};
//! use twig_cs_fixer_rules::build_ruleset;
//!
//! let config = Config::from_file(".twig-cs-fixer.toml".as_ref())?;
//! let linter = Linter::builder()
//!     .root("./templates")
//!     .ruleset(build_ruleset(&config)?)
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod blank_eof;
mod config;
mod delimiter_spacing;
mod indent;
mod operator_spacing;
mod punctuation_spacing;
mod standards;
#[cfg(test)]
mod test_utils;
mod trailing_space;
mod variable_name;

pub use blank_eof::BlankEof;
pub use config::{build_ruleset, configure_rule, RulesetError};
pub use delimiter_spacing::DelimiterSpacing;
pub use indent::Indent;
pub use operator_spacing::OperatorSpacing;
pub use punctuation_spacing::PunctuationSpacing;
pub use standards::{all_rules, twig_cs_fixer_rules, twig_rules, Standard};
pub use trailing_space::TrailingSpace;
pub use variable_name::{Case, VariableName};

/// Re-export core types for convenience.
pub use twig_cs_fixer_core::{Rule, RuleBox, Ruleset, Severity, Violation};
