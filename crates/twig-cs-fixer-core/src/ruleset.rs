//! Ordered, de-duplicated collection of rules.

use crate::context::FileContext;
use crate::report::{Report, ReportError};
use crate::rule::{FixableRule, Rule, RuleBox, RuleContext};
use crate::tokens::Tokens;
use crate::violation_id::ViolationId;
use std::fmt;

/// Rules applied to every file, in registration order.
///
/// Rules are identified by name: adding a rule whose name is already present
/// replaces the earlier one in place, so a standard can be reconfigured rule
/// by rule.
#[derive(Default)]
pub struct Ruleset {
    rules: Vec<RuleBox>,
}

impl fmt::Debug for Ruleset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|r| r.name()))
            .finish()
    }
}

impl Ruleset {
    /// Creates an empty ruleset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule, replacing any rule with the same name.
    pub fn add_rule<R: Rule + 'static>(&mut self, rule: R) -> &mut Self {
        self.add_rule_box(Box::new(rule))
    }

    /// Adds a boxed rule, replacing any rule with the same name.
    pub fn add_rule_box(&mut self, rule: RuleBox) -> &mut Self {
        match self.rules.iter_mut().find(|r| r.name() == rule.name()) {
            Some(slot) => *slot = rule,
            None => self.rules.push(rule),
        }
        self
    }

    /// Adds every rule of a standard.
    pub fn add_standard<I>(&mut self, rules: I) -> &mut Self
    where
        I: IntoIterator<Item = RuleBox>,
    {
        for rule in rules {
            self.add_rule_box(rule);
        }
        self
    }

    /// Removes a rule by name.
    pub fn remove_rule(&mut self, name: &str) -> Option<RuleBox> {
        let position = self.rules.iter().position(|r| r.name() == name)?;
        Some(self.rules.remove(position))
    }

    /// All rules, in order.
    #[must_use]
    pub fn rules(&self) -> &[RuleBox] {
        &self.rules
    }

    /// Fixable rules, in order.
    pub fn fixable_rules(&self) -> impl Iterator<Item = &dyn FixableRule> {
        self.rules.iter().filter_map(|r| r.as_fixable())
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if there is no rule.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Signature of every rule, used as part of the cache key.
    #[must_use]
    pub fn signature(&self) -> String {
        self.rules
            .iter()
            .map(|r| r.signature())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Lints one tokenized file into `report`.
    ///
    /// # Errors
    ///
    /// Fails if the file is not part of the report.
    pub fn lint_file(
        &self,
        tokens: &Tokens,
        file: &FileContext<'_>,
        directives: &[ViolationId],
        report: &mut Report,
    ) -> Result<(), ReportError> {
        report.file_violations(file.path, None)?;

        for rule in &self.rules {
            let mut ctx = RuleContext::lint(rule.name(), file, directives, report);
            rule.lint_file(tokens, &mut ctx);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::Tokenizer;
    use std::path::Path;

    struct Named(&'static str, &'static str);

    impl Rule for Named {
        fn name(&self) -> &'static str {
            self.0
        }

        fn signature(&self) -> String {
            format!("{}({})", self.0, self.1)
        }

        fn process(&self, _index: usize, _tokens: &Tokens, _ctx: &mut RuleContext<'_>) {}
    }

    #[test]
    fn same_name_replaces_in_place() {
        let mut ruleset = Ruleset::new();
        ruleset
            .add_rule(Named("A", "1"))
            .add_rule(Named("B", "1"))
            .add_rule(Named("A", "2"));

        assert_eq!(ruleset.len(), 2);
        assert_eq!(ruleset.signature(), "A(2),B(1)");
        assert_eq!(format!("{ruleset:?}"), r#"["A", "B"]"#);
    }

    #[test]
    fn standards_compose_and_rules_can_be_removed() {
        let standard = || -> Vec<RuleBox> { vec![Box::new(Named("A", "s")), Box::new(Named("C", "s"))] };
        let mut ruleset = Ruleset::new();
        ruleset.add_rule(Named("B", "x")).add_standard(standard());

        let names: Vec<_> = ruleset.rules().iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["B", "A", "C"]);

        assert!(ruleset.remove_rule("A").is_some());
        assert!(ruleset.remove_rule("A").is_none());
        assert_eq!(ruleset.len(), 2);
        assert_eq!(ruleset.fixable_rules().count(), 0);
    }

    #[test]
    fn lint_requires_a_known_file() {
        let file = FileContext::from_source(Path::new("a.twig"), "{{ a }}");
        let (tokens, directives) = Tokenizer::new().tokenize(&file).unwrap();
        let mut report = Report::new(["other.twig"]);
        let ruleset = Ruleset::new();
        assert!(ruleset
            .lint_file(&tokens, &file, &directives, &mut report)
            .is_err());
    }
}
