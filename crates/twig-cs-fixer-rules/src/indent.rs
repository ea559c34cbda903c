//! Rule to forbid tab indentation.
//!
//! # Rationale
//!
//! Tabs render at different widths depending on the editor, which breaks the
//! alignment of nested tags. Only leading tabs are replaced: a tab in the
//! middle of a line is left for the spacing rules.
//!
//! # Configuration
//!
//! ```toml
//! [rules.Indent]
//! spaces = 2   # spaces per tab, default 4
//! ```

use twig_cs_fixer_core::{FixableRule, Rule, RuleContext, TokenType, Tokens};

/// Rule name for indentation.
pub const NAME: &str = "Indent";

/// Default number of spaces replacing one tab.
pub const DEFAULT_SPACES: usize = 4;

const INDENTATION: &[TokenType] = &[
    TokenType::Whitespace,
    TokenType::Tab,
    TokenType::CommentWhitespace,
    TokenType::CommentTab,
];

/// Replaces indentation tabs with spaces.
#[derive(Debug, Clone)]
pub struct Indent {
    /// Spaces per tab.
    pub spaces: usize,
}

impl Default for Indent {
    fn default() -> Self {
        Self::new()
    }
}

impl Indent {
    /// Creates the rule with the default width.
    #[must_use]
    pub fn new() -> Self {
        Self {
            spaces: DEFAULT_SPACES,
        }
    }

    /// Sets the number of spaces per tab.
    #[must_use]
    pub fn spaces(mut self, spaces: usize) -> Self {
        self.spaces = spaces;
        self
    }

    fn starts_line(index: usize, tokens: &Tokens) -> bool {
        let Some(previous) = index
            .checked_sub(1)
            .and_then(|i| tokens.find_previous(INDENTATION, i, None, true))
        else {
            return true;
        };
        tokens
            .get(previous)
            .is_ok_and(|t| t.is_any(&[TokenType::Eol, TokenType::CommentEol]))
    }
}

impl Rule for Indent {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Requires spaces instead of tabs for indentation"
    }

    fn signature(&self) -> String {
        format!("{NAME}(spaces={})", self.spaces)
    }

    fn process(&self, index: usize, tokens: &Tokens, ctx: &mut RuleContext<'_>) {
        let Ok(token) = tokens.get(index) else {
            return;
        };
        if !token.is_any(&[TokenType::Tab, TokenType::CommentTab])
            || !Self::starts_line(index, tokens)
        {
            return;
        }

        if let Some(fixer) =
            ctx.add_fixable_error("A file must not be indented with tabs.", token, None)
        {
            fixer.replace_token(index, " ".repeat(self.spaces * token.value().len()));
        }
    }

    fn as_fixable(&self) -> Option<&dyn FixableRule> {
        Some(self)
    }
}

impl FixableRule for Indent {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{fix, report};

    #[test]
    fn test_reports_leading_tabs_only() {
        insta::assert_snapshot!(report(Indent::new(), "\ta\tb\n  \t{{ c }}"), @r"
        1:1 Indent error: A file must not be indented with tabs.
        2:3 Indent error: A file must not be indented with tabs.
        ");
    }

    #[test]
    fn test_fixes_code_and_comments() {
        assert_eq!(
            fix(Indent::new(), "\t{{ a }}\n\t\tb\n"),
            "    {{ a }}\n        b\n"
        );
        assert_eq!(fix(Indent::new(), "{#\n\tnote\n#}"), "{#\n    note\n#}");
        assert_eq!(fix(Indent::new(), "{{ [\n\t1,\n] }}"), "{{ [\n    1,\n] }}");
    }

    #[test]
    fn test_configured_width() {
        let rule = Indent::new().spaces(2);
        assert_eq!(rule.signature(), "Indent(spaces=2)");
        assert_eq!(fix(rule, "\ta"), "  a");
    }
}
