//! Assembly of a [`Ruleset`] from a [`Config`].
//!
//! The standard named by `standard` is loaded first. Each `[rules.<Name>]`
//! table then, in name order:
//!
//! - removes the rule when `enabled = false`;
//! - otherwise rebuilds it from its options and replaces it in place (or
//!   appends it when the standard does not include it);
//! - restricts it to `paths` when any are given.

use crate::indent::{self, Indent};
use crate::standards::Standard;
use crate::variable_name::{self, Case, VariableName};
use crate::{
    blank_eof, delimiter_spacing, operator_spacing, punctuation_spacing, trailing_space,
    BlankEof, DelimiterSpacing, OperatorSpacing, PunctuationSpacing, TrailingSpace,
};
use thiserror::Error;
use tracing::{debug, warn};
use twig_cs_fixer_core::{Config, PathAwareRule, RuleBox, RuleConfig, Ruleset};

/// Errors raised while turning a configuration into a ruleset.
#[derive(Debug, Error)]
pub enum RulesetError {
    /// `standard` names no built-in standard.
    #[error("unknown standard `{0}`")]
    UnknownStandard(String),

    /// A `[rules.<Name>]` table names no built-in rule.
    #[error("unknown rule `{0}`")]
    UnknownRule(String),

    /// A rule option has the wrong type or value.
    #[error("invalid option `{key}` for rule `{rule}`: {message}")]
    InvalidOption {
        /// Rule name.
        rule: String,
        /// Option key.
        key: String,
        /// What is wrong with it.
        message: String,
    },

    /// A `paths` entry is not a valid glob.
    #[error("invalid path pattern for rule `{rule}`: {source}")]
    Pattern {
        /// Rule name.
        rule: String,
        /// Underlying glob error.
        #[source]
        source: glob::PatternError,
    },
}

/// Builds the ruleset described by `config`.
///
/// # Errors
///
/// Returns an error for an unknown standard or rule, an invalid option, or an
/// invalid path pattern.
pub fn build_ruleset(config: &Config) -> Result<Ruleset, RulesetError> {
    let standard = match config.standard.as_deref() {
        None => Standard::default(),
        Some(name) => Standard::from_name(name)
            .ok_or_else(|| RulesetError::UnknownStandard(name.to_string()))?,
    };

    let mut ruleset = Ruleset::new();
    ruleset.add_standard(standard.rules());

    let mut entries: Vec<_> = config.rules.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    for (name, rule_config) in entries {
        if !config.is_rule_enabled(name) {
            if ruleset.remove_rule(name).is_none() {
                debug!(rule = %name, "disabled rule was not part of the standard");
            }
            continue;
        }

        let rule = configure_rule(name, rule_config)?;
        let rule: RuleBox = if rule_config.paths.is_empty() {
            rule
        } else {
            Box::new(PathAwareRule::new(rule, &rule_config.paths).map_err(|source| {
                RulesetError::Pattern {
                    rule: name.clone(),
                    source,
                }
            })?)
        };
        ruleset.add_rule_box(rule);
    }

    debug!(standard = standard.name(), rules = ruleset.len(), "ruleset built");
    Ok(ruleset)
}

/// Instantiates a built-in rule from its configuration table.
///
/// # Errors
///
/// Returns an error for an unknown rule or an invalid option.
pub fn configure_rule(name: &str, config: &RuleConfig) -> Result<RuleBox, RulesetError> {
    let known: &[&str] = match name {
        indent::NAME => &["spaces"],
        variable_name::NAME => &["case"],
        _ => &[],
    };
    for key in config.options.keys() {
        if !known.contains(&key.as_str()) {
            warn!(rule = %name, option = %key, "ignoring unknown rule option");
        }
    }

    let rule: RuleBox = match name {
        delimiter_spacing::NAME => Box::new(DelimiterSpacing::new()),
        operator_spacing::NAME => Box::new(OperatorSpacing::new()),
        punctuation_spacing::NAME => Box::new(PunctuationSpacing::new()),
        trailing_space::NAME => Box::new(TrailingSpace::new()),
        blank_eof::NAME => Box::new(BlankEof::new()),
        indent::NAME => Box::new(Indent::new().spaces(spaces_option(config)?)),
        variable_name::NAME => Box::new(VariableName::new().case(case_option(config)?)),
        _ => return Err(RulesetError::UnknownRule(name.to_string())),
    };
    Ok(rule)
}

fn invalid(rule: &str, key: &str, message: impl Into<String>) -> RulesetError {
    RulesetError::InvalidOption {
        rule: rule.to_string(),
        key: key.to_string(),
        message: message.into(),
    }
}

fn spaces_option(config: &RuleConfig) -> Result<usize, RulesetError> {
    if !config.options.contains_key("spaces") {
        return Ok(indent::DEFAULT_SPACES);
    }
    match config.get_usize("spaces", 0) {
        0 => Err(invalid(indent::NAME, "spaces", "expected a positive integer")),
        spaces => Ok(spaces),
    }
}

fn case_option(config: &RuleConfig) -> Result<Case, RulesetError> {
    if !config.options.contains_key("case") {
        return Ok(Case::default());
    }
    Case::from_name(config.get_str("case", "")).ok_or_else(|| {
        let expected: Vec<_> = Case::ALL.iter().map(|c| c.name()).collect();
        invalid(
            variable_name::NAME,
            "case",
            format!("expected one of {}", expected.join(", ")),
        )
    })
}
