//! Rule to forbid blank space at the end of a line.
//!
//! # Rationale
//!
//! Trailing spaces and tabs are invisible noise that editors strip
//! inconsistently, producing spurious diffs. Lines inside comments are
//! checked too.

use twig_cs_fixer_core::{FixableRule, Rule, RuleContext, TokenType, Tokens};

/// Rule name for trailing space.
pub const NAME: &str = "TrailingSpace";

const BLANKS: &[TokenType] = &[
    TokenType::Whitespace,
    TokenType::Tab,
    TokenType::CommentWhitespace,
    TokenType::CommentTab,
];

const LINE_ENDS: &[TokenType] = &[TokenType::Eol, TokenType::CommentEol, TokenType::Eof];

/// Forbids spaces and tabs before a line break or the end of the file.
#[derive(Debug, Clone, Default)]
pub struct TrailingSpace;

impl TrailingSpace {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for TrailingSpace {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Forbids spaces and tabs at the end of a line"
    }

    fn process(&self, index: usize, tokens: &Tokens, ctx: &mut RuleContext<'_>) {
        if index == 0 || !tokens.get(index).is_ok_and(|t| t.is_any(LINE_ENDS)) {
            return;
        }
        let start = tokens
            .find_previous(BLANKS, index - 1, None, true)
            .map_or(0, |previous| previous + 1);
        if start == index {
            return;
        }
        let Ok(first) = tokens.get(start) else {
            return;
        };

        if let Some(fixer) =
            ctx.add_fixable_error("A line should not end with blank space(s).", first, None)
        {
            fixer.begin_change_set();
            for i in start..index {
                fixer.replace_token(i, "");
            }
            fixer.end_change_set();
        }
    }

    fn as_fixable(&self) -> Option<&dyn FixableRule> {
        Some(self)
    }
}

impl FixableRule for TrailingSpace {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{fix, report};

    #[test]
    fn test_reports_code_and_comment_lines() {
        insta::assert_snapshot!(report(TrailingSpace::new(), "{{ a }}  \n{#\n  b  \n#}\n"), @r"
        1:8 TrailingSpace error: A line should not end with blank space(s).
        3:4 TrailingSpace error: A line should not end with blank space(s).
        ");
    }

    #[test]
    fn test_fixes_mixed_runs() {
        assert_eq!(fix(TrailingSpace::new(), "a \t \nb  "), "a\nb");
        assert_eq!(fix(TrailingSpace::new(), "a\n    \nb\n"), "a\n\nb\n");
    }

    #[test]
    fn test_clean_file() {
        assert_eq!(report(TrailingSpace::new(), "{{ a }}\n    {{ b }}\n"), "");
    }
}
