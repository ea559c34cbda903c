//! Restricts a rule to files matching glob patterns.

use crate::context::FileContext;
use crate::rule::{FixableRule, Rule, RuleBox, RuleContext};
use crate::tokens::Tokens;
use glob::{Pattern, PatternError};

/// Wraps a rule so that it only runs on files whose path relative to the
/// project root matches one of the patterns.
///
/// The wrapper keeps the inner rule's name, so it replaces the unrestricted
/// rule when added to a [`Ruleset`](crate::Ruleset).
pub struct PathAwareRule {
    rule: RuleBox,
    patterns: Vec<Pattern>,
}

impl PathAwareRule {
    /// Creates a path-restricted rule.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern is not a valid glob.
    pub fn new<S: AsRef<str>>(rule: RuleBox, patterns: &[S]) -> Result<Self, PatternError> {
        let patterns = patterns
            .iter()
            .map(|p| Pattern::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rule, patterns })
    }

    /// Returns true if the rule applies to the file.
    #[must_use]
    pub fn applies_to(&self, file: &FileContext<'_>) -> bool {
        self.patterns
            .iter()
            .any(|p| p.matches_path(&file.relative_path))
    }
}

impl Rule for PathAwareRule {
    fn name(&self) -> &'static str {
        self.rule.name()
    }

    fn description(&self) -> &'static str {
        self.rule.description()
    }

    fn signature(&self) -> String {
        let patterns: Vec<&str> = self.patterns.iter().map(Pattern::as_str).collect();
        format!("{}@[{}]", self.rule.signature(), patterns.join("|"))
    }

    fn lint_file(&self, tokens: &Tokens, ctx: &mut RuleContext<'_>) {
        if self.applies_to(ctx.file()) {
            self.rule.lint_file(tokens, ctx);
        }
    }

    fn process(&self, index: usize, tokens: &Tokens, ctx: &mut RuleContext<'_>) {
        self.rule.process(index, tokens, ctx);
    }

    fn as_fixable(&self) -> Option<&dyn FixableRule> {
        self.rule.as_fixable().map(|_| self as &dyn FixableRule)
    }
}

impl FixableRule for PathAwareRule {
    fn fix_file(&self, tokens: &Tokens, ctx: &mut RuleContext<'_>) {
        if !self.applies_to(ctx.file()) {
            return;
        }
        if let Some(rule) = self.rule.as_fixable() {
            rule.fix_file(tokens, ctx);
        }
    }
}
