//! Shared engine for rules that enforce a number of spaces around tokens.
//!
//! A spacing rule only says how many spaces it wants before and after a token;
//! [`process`] measures what is there and reports or fixes the difference.
//!
//! ```ignore
//! impl SpacingRule for CommaSpacing {
//!     fn space_before(&self, index: usize, tokens: &Tokens) -> Option<usize> {
//!         tokens.get(index).ok()?.is_value(TokenType::Punctuation, ",").then_some(0)
//!     }
//!     fn space_after(&self, index: usize, tokens: &Tokens) -> Option<usize> {
//!         tokens.get(index).ok()?.is_value(TokenType::Punctuation, ",").then_some(1)
//!     }
//! }
//!
//! impl Rule for CommaSpacing {
//!     fn name(&self) -> &'static str { "CommaSpacing" }
//!     fn process(&self, index: usize, tokens: &Tokens, ctx: &mut RuleContext<'_>) {
//!         spacing::process(self, index, tokens, ctx);
//!     }
//!     fn as_fixable(&self) -> Option<&dyn FixableRule> { Some(self) }
//! }
//! ```

use crate::rule::{Rule, RuleContext};
use crate::token::TokenType;
use crate::tokens::Tokens;
use std::ops::Range;

/// Formatting tokens a spacing run is made of.
const RUN: &[TokenType] = &[TokenType::Whitespace, TokenType::Tab, TokenType::Eol];

/// Desired spacing around tokens.
pub trait SpacingRule: Rule {
    /// Spaces wanted before the token at `index`, `None` to leave it alone.
    fn space_before(&self, index: usize, tokens: &Tokens) -> Option<usize>;

    /// Spaces wanted after the token at `index`, `None` to leave it alone.
    fn space_after(&self, index: usize, tokens: &Tokens) -> Option<usize>;

    /// Whether a line break is acceptable in place of the spaces.
    ///
    /// Tabs never are: a run containing a tab is always rewritten.
    fn skip_if_newline(&self) -> bool {
        true
    }
}

#[derive(Clone, Copy)]
enum Side {
    Before,
    After,
}

impl Side {
    fn sub_id(self) -> &'static str {
        match self {
            Self::Before => "Before",
            Self::After => "After",
        }
    }
}

/// Checks the spacing after, then before, the token at `index`.
pub fn process<R>(rule: &R, index: usize, tokens: &Tokens, ctx: &mut RuleContext<'_>)
where
    R: SpacingRule + ?Sized,
{
    if let Some(expected) = rule.space_after(index, tokens) {
        check(rule, Side::After, index, tokens, ctx, expected);
    }
    if let Some(expected) = rule.space_before(index, tokens) {
        check(rule, Side::Before, index, tokens, ctx, expected);
    }
}

/// Formatting run between the token and its nearest meaningful neighbour.
fn run(side: Side, index: usize, tokens: &Tokens) -> Option<Range<usize>> {
    match side {
        Side::After => {
            let next = tokens.find_next(RUN, index + 1, None, true)?;
            Some(index + 1..next)
        }
        Side::Before => {
            if index == 0 {
                return None;
            }
            let previous = tokens.find_previous(RUN, index - 1, None, true)?;
            Some(previous + 1..index)
        }
    }
}

fn check<R>(
    rule: &R,
    side: Side,
    index: usize,
    tokens: &Tokens,
    ctx: &mut RuleContext<'_>,
    expected: usize,
) where
    R: SpacingRule + ?Sized,
{
    let Ok(token) = tokens.get(index) else {
        return;
    };
    let Some(range) = run(side, index, tokens) else {
        return;
    };

    let mut found = 0;
    let mut newline = false;
    let mut tabs = false;
    for i in range.clone() {
        let Ok(t) = tokens.get(i) else {
            return;
        };
        match t.kind() {
            TokenType::Eol => newline = true,
            TokenType::Tab => {
                tabs = true;
                found += t.value().len();
            }
            _ => found += t.value().len(),
        }
    }

    if newline {
        if rule.skip_if_newline() {
            return;
        }
    } else if found == expected && !tabs {
        return;
    }

    let found = if newline {
        "newline".to_string()
    } else {
        found.to_string()
    };
    let message = match side {
        Side::Before => format!(
            "Expecting {expected} whitespace before \"{}\"; found {found}.",
            token.value()
        ),
        Side::After => format!(
            "Expecting {expected} whitespace after \"{}\"; found {found}.",
            token.value()
        ),
    };

    let Some(fixer) = ctx.add_fixable_error(message, token, Some(side.sub_id())) else {
        return;
    };

    let spaces = " ".repeat(expected);
    fixer.begin_change_set();
    if range.is_empty() {
        match side {
            Side::Before => fixer.add_content_before(index, &spaces),
            Side::After => fixer.add_content(index, &spaces),
        };
    } else {
        fixer.replace_token(range.start, spaces);
        for i in range.start + 1..range.end {
            fixer.replace_token(i, "");
        }
    }
    fixer.end_change_set();
}
