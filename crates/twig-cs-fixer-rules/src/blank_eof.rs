//! Rule to require exactly one line break at the end of a file.
//!
//! # Rationale
//!
//! POSIX tools expect text files to end with a newline, and trailing blank
//! lines only add noise. An empty file is left alone; a file made only of
//! blank lines is emptied.

use twig_cs_fixer_core::{FixableRule, Rule, RuleContext, TokenType, Tokens};

/// Rule name for blank end of file.
pub const NAME: &str = "BlankEof";

const BLANKS: &[TokenType] = &[TokenType::Eol, TokenType::Whitespace, TokenType::Tab];

/// Requires a single line break before the end of the file.
#[derive(Debug, Clone, Default)]
pub struct BlankEof;

impl BlankEof {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Rule for BlankEof {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Requires files to end with exactly one line break"
    }

    fn process(&self, index: usize, tokens: &Tokens, ctx: &mut RuleContext<'_>) {
        let Ok(token) = tokens.get(index) else {
            return;
        };
        if index == 0 || !token.is(TokenType::Eof) {
            return;
        }

        let Some(last) = tokens.find_previous(BLANKS, index - 1, None, true) else {
            if let Some(fixer) =
                ctx.add_fixable_error("A file must not contain only blank lines.", token, None)
            {
                fixer.begin_change_set();
                for i in 0..index {
                    fixer.replace_token(i, "");
                }
                fixer.end_change_set();
            }
            return;
        };

        let tail = last + 1..index;
        let eols = tail
            .clone()
            .filter(|&i| tokens.get(i).is_ok_and(|t| t.is(TokenType::Eol)))
            .count();
        if eols == 1 {
            return;
        }

        let message = format!("A file must end with 1 blank line; found {eols}.");
        let Some(fixer) = ctx.add_fixable_error(message, token, None) else {
            return;
        };
        if tail.is_empty() {
            fixer.add_newline(last);
            return;
        }
        let eol = fixer.eol().to_string();
        fixer.begin_change_set();
        fixer.replace_token(tail.start, eol);
        for i in tail.start + 1..tail.end {
            fixer.replace_token(i, "");
        }
        fixer.end_change_set();
    }

    fn as_fixable(&self) -> Option<&dyn FixableRule> {
        Some(self)
    }
}

impl FixableRule for BlankEof {}
