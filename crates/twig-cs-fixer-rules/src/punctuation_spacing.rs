//! Rule to enforce spacing around punctuation.
//!
//! # Rationale
//!
//! Brackets hug their content (`foo(a)`, `[1, 2]`), separators stick to the
//! left (`a, b`, `a|upper`, `a.b`) and a hash colon is followed by one space
//! (`{a: 1}`). A colon directly inside square brackets is a slice and takes no
//! space at all (`items[1:2]`).

use twig_cs_fixer_core::spacing::{self, SpacingRule};
use twig_cs_fixer_core::{FixableRule, Rule, RuleContext, TokenType, Tokens};

/// Rule name for punctuation spacing.
pub const NAME: &str = "PunctuationSpacing";

/// Requires conventional spacing around `( ) [ ] { } , : . |`.
#[derive(Debug, Clone, Default)]
pub struct PunctuationSpacing;

impl PunctuationSpacing {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn is_slice(index: usize, tokens: &Tokens) -> bool {
        tokens
            .enclosing_bracket(index)
            .and_then(|open| tokens.get(open).ok())
            .is_some_and(|open| open.value() == "[")
    }
}

impl SpacingRule for PunctuationSpacing {
    fn space_before(&self, index: usize, tokens: &Tokens) -> Option<usize> {
        let token = tokens.get(index).ok()?;
        if !token.is(TokenType::Punctuation) {
            return None;
        }
        match token.value() {
            ")" | "]" | "}" | "," | ":" | "." | "|" => Some(0),
            _ => None,
        }
    }

    fn space_after(&self, index: usize, tokens: &Tokens) -> Option<usize> {
        let token = tokens.get(index).ok()?;
        if !token.is(TokenType::Punctuation) {
            return None;
        }
        match token.value() {
            "(" | "[" | "{" | "." | "|" => Some(0),
            "," => Some(1),
            ":" if Self::is_slice(index, tokens) => Some(0),
            ":" => Some(1),
            _ => None,
        }
    }
}

impl Rule for PunctuationSpacing {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Enforces spacing around brackets, separators and hash colons"
    }

    fn process(&self, index: usize, tokens: &Tokens, ctx: &mut RuleContext<'_>) {
        spacing::process(self, index, tokens, ctx);
    }

    fn as_fixable(&self) -> Option<&dyn FixableRule> {
        Some(self)
    }
}

impl FixableRule for PunctuationSpacing {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{fix, report};

    #[test]
    fn test_reports_comma() {
        insta::assert_snapshot!(report(PunctuationSpacing::new(), "{{ [1 ,2] }}"), @r#"
        1:7 PunctuationSpacing.After.Punctuation error: Expecting 1 whitespace after ","; found 0.
        1:7 PunctuationSpacing.Before.Punctuation error: Expecting 0 whitespace before ","; found 1.
        "#);
    }

    #[test]
    fn test_fixes_brackets_and_separators() {
        assert_eq!(
            fix(PunctuationSpacing::new(), "{{ foo( a ,b ) | upper }}"),
            "{{ foo(a, b)|upper }}"
        );
        assert_eq!(fix(PunctuationSpacing::new(), "{{ user . name }}"), "{{ user.name }}");
    }

    #[test]
    fn test_hash_and_slice_colons() {
        assert_eq!(
            fix(PunctuationSpacing::new(), "{{ {a:1, 'b' : 2} }}"),
            "{{ {a: 1, 'b': 2} }}"
        );
        assert_eq!(fix(PunctuationSpacing::new(), "{{ items[1 : 2] }}"), "{{ items[1:2] }}");
    }

    #[test]
    fn test_multiline_literals_are_accepted() {
        assert_eq!(report(PunctuationSpacing::new(), "{{ [\n    1,\n    2,\n] }}"), "");
    }
}
