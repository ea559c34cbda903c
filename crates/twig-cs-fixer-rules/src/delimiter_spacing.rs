//! Rule to enforce one space inside `{{ }}` and `{% %}`.
//!
//! # Rationale
//!
//! `{{ foo }}` reads better than `{{foo}}`, and a single convention keeps
//! diffs small.
//!
//! # Suppression
//!
//! - `{# twig-cs-fixer-disable-line DelimiterSpacing #}`

use twig_cs_fixer_core::spacing::{self, SpacingRule};
use twig_cs_fixer_core::{FixableRule, Rule, RuleContext, TokenType, Tokens};

/// Rule name for delimiter spacing.
pub const NAME: &str = "DelimiterSpacing";

const OPENERS: &[TokenType] = &[TokenType::VarStart, TokenType::BlockStart];
const CLOSERS: &[TokenType] = &[TokenType::VarEnd, TokenType::BlockEnd];

/// Requires exactly one space after opening and before closing delimiters.
///
/// Empty delimiters (`{{}}`) and delimiters followed by a line break are left
/// alone.
#[derive(Debug, Clone, Default)]
pub struct DelimiterSpacing;

impl DelimiterSpacing {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SpacingRule for DelimiterSpacing {
    fn space_before(&self, index: usize, tokens: &Tokens) -> Option<usize> {
        if !tokens.get(index).ok()?.is_any(CLOSERS) {
            return None;
        }
        let previous = tokens.find_previous(TokenType::WHITESPACE, index.checked_sub(1)?, None, true)?;
        if tokens.get(previous).ok()?.is_any(OPENERS) {
            return None;
        }
        Some(1)
    }

    fn space_after(&self, index: usize, tokens: &Tokens) -> Option<usize> {
        if !tokens.get(index).ok()?.is_any(OPENERS) {
            return None;
        }
        let next = tokens.find_next(TokenType::WHITESPACE, index + 1, None, true)?;
        if tokens.get(next).ok()?.is_any(CLOSERS) {
            return None;
        }
        Some(1)
    }
}

impl Rule for DelimiterSpacing {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Enforces one space inside {{ }} and {% %} delimiters"
    }

    fn process(&self, index: usize, tokens: &Tokens, ctx: &mut RuleContext<'_>) {
        spacing::process(self, index, tokens, ctx);
    }

    fn as_fixable(&self) -> Option<&dyn FixableRule> {
        Some(self)
    }
}

impl FixableRule for DelimiterSpacing {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{fix, report};

    #[test]
    fn test_detects_missing_spaces() {
        insta::assert_snapshot!(report(DelimiterSpacing::new(), "{{foo}}\n{%-  if a %}"), @r#"
        1:1 DelimiterSpacing.After.VarStart error: Expecting 1 whitespace after "{{"; found 0.
        1:6 DelimiterSpacing.Before.VarEnd error: Expecting 1 whitespace before "}}"; found 0.
        2:1 DelimiterSpacing.After.BlockStart error: Expecting 1 whitespace after "{%-"; found 2.
        "#);
    }

    #[test]
    fn test_fixes_delimiters() {
        assert_eq!(
            fix(DelimiterSpacing::new(), "{{foo}}{%   set a = 1%}"),
            "{{ foo }}{% set a = 1 %}"
        );
    }

    #[test]
    fn test_ignores_empty_and_multiline() {
        assert_eq!(report(DelimiterSpacing::new(), "{{}}{{\n    foo\n}}"), "");
    }
}
