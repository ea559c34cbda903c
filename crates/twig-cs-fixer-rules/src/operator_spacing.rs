//! Rule to enforce spacing around operators.
//!
//! # Rationale
//!
//! Binary operators get one space on each side (`a + b`, `a ? b : c`).
//! Unary `-` and `+` stick to their operand (`-1`), and the range operator
//! takes no space at all (`1..5`).
//!
//! Whether an operator is unary is decided by the token before it: an
//! operator, an opening bracket, a separator or the start of an expression
//! all make the following `-`, `+` or `not` unary.

use twig_cs_fixer_core::spacing::{self, SpacingRule};
use twig_cs_fixer_core::{FixableRule, Rule, RuleContext, TokenType, Tokens};

/// Rule name for operator spacing.
pub const NAME: &str = "OperatorSpacing";

/// Requires one space around binary operators.
#[derive(Debug, Clone, Default)]
pub struct OperatorSpacing;

impl OperatorSpacing {
    /// Creates the rule.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn is_unary(index: usize, tokens: &Tokens) -> bool {
        let Some(previous) = index
            .checked_sub(1)
            .and_then(|i| tokens.find_previous(TokenType::EMPTY, i, None, true))
        else {
            return true;
        };
        let Ok(token) = tokens.get(previous) else {
            return true;
        };
        match token.kind() {
            TokenType::Operator
            | TokenType::VarStart
            | TokenType::BlockStart
            | TokenType::BlockName
            | TokenType::Arrow
            | TokenType::InterpolationStart => true,
            TokenType::Punctuation => matches!(token.value(), "(" | "[" | "{" | "," | ":"),
            _ => false,
        }
    }
}

impl SpacingRule for OperatorSpacing {
    fn space_before(&self, index: usize, tokens: &Tokens) -> Option<usize> {
        let token = tokens.get(index).ok()?;
        if !token.is(TokenType::Operator) {
            return None;
        }
        match token.value() {
            ".." => Some(0),
            "-" | "+" | "not" if Self::is_unary(index, tokens) => None,
            _ => Some(1),
        }
    }

    fn space_after(&self, index: usize, tokens: &Tokens) -> Option<usize> {
        let token = tokens.get(index).ok()?;
        if !token.is(TokenType::Operator) {
            return None;
        }
        match token.value() {
            ".." => Some(0),
            "-" | "+" if Self::is_unary(index, tokens) => Some(0),
            _ => Some(1),
        }
    }
}

impl Rule for OperatorSpacing {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Enforces one space around binary operators and none after unary ones"
    }

    fn process(&self, index: usize, tokens: &Tokens, ctx: &mut RuleContext<'_>) {
        spacing::process(self, index, tokens, ctx);
    }

    fn as_fixable(&self) -> Option<&dyn FixableRule> {
        Some(self)
    }
}

impl FixableRule for OperatorSpacing {}
