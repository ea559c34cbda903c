//! Rule traits for defining lint rules.

use crate::context::FileContext;
use crate::fixer::Fixer;
use crate::report::Report;
use crate::suppression::is_suppressed;
use crate::token::Token;
use crate::tokens::Tokens;
use crate::types::{Severity, Violation};
use crate::violation_id::ViolationId;
use tracing::warn;

/// A per-file lint rule working on the token stream.
///
/// Rules hold configuration only. Everything that changes during a pass (the
/// file, its suppression directives, the report or fixer) is handed in through
/// the [`RuleContext`], so a single instance can check many files at once.
///
/// # Example
///
/// ```ignore
/// use twig_cs_fixer_core::{Rule, RuleContext, TokenType, Tokens};
///
/// pub struct NoTabs;
///
/// impl Rule for NoTabs {
///     fn name(&self) -> &'static str { "NoTabs" }
///
///     fn process(&self, index: usize, tokens: &Tokens, ctx: &mut RuleContext<'_>) {
///         let Ok(token) = tokens.get(index) else { return };
///         if token.is(TokenType::Tab) {
///             ctx.add_warning("Tabs are not allowed.", token, None);
///         }
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Short name of this rule (e.g. "OperatorSpacing").
    ///
    /// The name identifies the rule in a [`Ruleset`](crate::Ruleset) and is
    /// the first part of every [`ViolationId`] it reports.
    fn name(&self) -> &'static str;

    /// Returns a brief description of what this rule checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Identity of this rule and its configuration, used to invalidate caches.
    fn signature(&self) -> String {
        self.name().to_string()
    }

    /// Lints a whole file. Visits every token index in ascending order.
    fn lint_file(&self, tokens: &Tokens, ctx: &mut RuleContext<'_>) {
        for index in 0..tokens.len() {
            self.process(index, tokens, ctx);
        }
    }

    /// Checks the token at `index`.
    fn process(&self, index: usize, tokens: &Tokens, ctx: &mut RuleContext<'_>);

    /// Returns this rule as a fixable rule, if it is one.
    fn as_fixable(&self) -> Option<&dyn FixableRule> {
        None
    }
}

/// A rule able to correct what it reports.
///
/// Implementors also override [`Rule::as_fixable`] to return `Some(self)`.
pub trait FixableRule: Rule {
    /// Runs one fix pass over a file. Same traversal as [`Rule::lint_file`].
    fn fix_file(&self, tokens: &Tokens, ctx: &mut RuleContext<'_>) {
        for index in 0..tokens.len() {
            self.process(index, tokens, ctx);
        }
    }
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;

/// Where reports of a pass go.
enum Sink<'c> {
    Lint(&'c mut Report),
    Fix(&'c mut Fixer),
}

/// Per-pass parameters of a rule.
pub struct RuleContext<'c> {
    rule: &'static str,
    file: &'c FileContext<'c>,
    directives: &'c [ViolationId],
    sink: Sink<'c>,
}

impl<'c> RuleContext<'c> {
    /// Creates a context for a lint pass recording into `report`.
    #[must_use]
    pub fn lint(
        rule: &'static str,
        file: &'c FileContext<'c>,
        directives: &'c [ViolationId],
        report: &'c mut Report,
    ) -> Self {
        Self {
            rule,
            file,
            directives,
            sink: Sink::Lint(report),
        }
    }

    /// Creates a context for a fix pass editing through `fixer`.
    #[must_use]
    pub fn fix(
        rule: &'static str,
        file: &'c FileContext<'c>,
        directives: &'c [ViolationId],
        fixer: &'c mut Fixer,
    ) -> Self {
        Self {
            rule,
            file,
            directives,
            sink: Sink::Fix(fixer),
        }
    }

    /// The file being processed.
    #[must_use]
    pub fn file(&self) -> &FileContext<'c> {
        self.file
    }

    /// Name of the rule this context reports for.
    #[must_use]
    pub fn rule_name(&self) -> &'static str {
        self.rule
    }

    /// Returns true during a fix pass.
    #[must_use]
    pub fn is_fixing(&self) -> bool {
        matches!(self.sink, Sink::Fix(_))
    }

    /// Reports a notice. Returns true if it was recorded.
    pub fn add_notice(
        &mut self,
        message: impl Into<String>,
        token: &Token,
        sub_id: Option<&str>,
    ) -> bool {
        self.add(Severity::Notice, message.into(), token, sub_id)
    }

    /// Reports a warning. Returns true if it was recorded.
    pub fn add_warning(
        &mut self,
        message: impl Into<String>,
        token: &Token,
        sub_id: Option<&str>,
    ) -> bool {
        self.add(Severity::Warning, message.into(), token, sub_id)
    }

    /// Reports an error. Returns true if it was recorded.
    pub fn add_error(
        &mut self,
        message: impl Into<String>,
        token: &Token,
        sub_id: Option<&str>,
    ) -> bool {
        self.add(Severity::Error, message.into(), token, sub_id)
    }

    /// Reports a fixable warning.
    ///
    /// While linting this records the warning and returns `None`. While fixing
    /// it returns the fixer, unless the violation is suppressed.
    pub fn add_fixable_warning(
        &mut self,
        message: impl Into<String>,
        token: &Token,
        sub_id: Option<&str>,
    ) -> Option<&mut Fixer> {
        self.add_fixable(Severity::Warning, message.into(), token, sub_id)
    }

    /// Reports a fixable error. See [`RuleContext::add_fixable_warning`].
    pub fn add_fixable_error(
        &mut self,
        message: impl Into<String>,
        token: &Token,
        sub_id: Option<&str>,
    ) -> Option<&mut Fixer> {
        self.add_fixable(Severity::Error, message.into(), token, sub_id)
    }

    fn violation_id(&self, token: &Token, sub_id: Option<&str>) -> ViolationId {
        ViolationId::new(
            self.rule,
            sub_id,
            Some(token.kind().name()),
            Some(token.line()),
            Some(token.column()),
        )
    }

    fn add(&mut self, severity: Severity, message: String, token: &Token, sub_id: Option<&str>) -> bool {
        let id = self.violation_id(token, sub_id);
        if is_suppressed(self.directives, &id) {
            return false;
        }

        match &mut self.sink {
            Sink::Lint(report) => {
                let violation = Violation::new(severity, message, self.file.path)
                    .with_rule(self.rule)
                    .with_id(id);
                match report.add_violation(violation) {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(rule = self.rule, error = %e, "dropping violation");
                        false
                    }
                }
            }
            Sink::Fix(_) => false,
        }
    }

    fn add_fixable(
        &mut self,
        severity: Severity,
        message: String,
        token: &Token,
        sub_id: Option<&str>,
    ) -> Option<&mut Fixer> {
        if !self.is_fixing() {
            self.add(severity, message, token, sub_id);
            return None;
        }

        let id = self.violation_id(token, sub_id);
        if is_suppressed(self.directives, &id) {
            return None;
        }
        match &mut self.sink {
            Sink::Fix(fixer) => Some(&mut **fixer),
            Sink::Lint(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suppression::parse_directive;
    use crate::token::TokenType;
    use crate::tokenizer::Tokenizer;
    use std::path::Path;

    struct NoTabs;

    impl Rule for NoTabs {
        fn name(&self) -> &'static str {
            "NoTabs"
        }

        fn process(&self, index: usize, tokens: &Tokens, ctx: &mut RuleContext<'_>) {
            let Ok(token) = tokens.get(index) else {
                return;
            };
            if token.is(TokenType::Tab) {
                ctx.add_warning("Tabs are not allowed.", token, Some("Found"));
            }
        }
    }

    struct FixableNoTabs;

    impl Rule for FixableNoTabs {
        fn name(&self) -> &'static str {
            "FixableNoTabs"
        }

        fn process(&self, index: usize, tokens: &Tokens, ctx: &mut RuleContext<'_>) {
            let Ok(token) = tokens.get(index) else {
                return;
            };
            if !token.is(TokenType::Tab) {
                return;
            }
            if let Some(fixer) = ctx.add_fixable_error("Tabs are not allowed.", token, None) {
                fixer.replace_token(index, " ");
            }
        }

        fn as_fixable(&self) -> Option<&dyn FixableRule> {
            Some(self)
        }
    }

    impl FixableRule for FixableNoTabs {}

    fn lint(rule: &dyn Rule, source: &str) -> Report {
        let path = Path::new("test.twig");
        let file = FileContext::from_source(path, source);
        let (tokens, directives) = Tokenizer::new().tokenize(&file).unwrap();
        let mut report = Report::new([path]);
        let mut ctx = RuleContext::lint(rule.name(), &file, &directives, &mut report);
        rule.lint_file(&tokens, &mut ctx);
        report
    }

    #[test]
    fn reports_with_full_id() {
        let report = lint(&NoTabs, "a\tb");
        let violations = report.all_violations(None);
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].id.as_ref().unwrap().to_string(),
            "NoTabs.Found.Tab:1:2"
        );
        assert_eq!(violations[0].severity, Severity::Warning);
    }

    #[test]
    fn suppressed_reports_are_dropped() {
        let report = lint(&NoTabs, "{# twig-cs-fixer-disable-next-line NoTabs #}\na\tb\n\tc");
        let lines: Vec<_> = report
            .all_violations(None)
            .iter()
            .map(|v| v.line())
            .collect();
        assert_eq!(lines, vec![Some(3)]);
    }

    #[test]
    fn fixable_report_is_recorded_when_linting() {
        let report = lint(&FixableNoTabs, "a\tb");
        assert_eq!(report.total_errors(), 1);
        assert!(NoTabs.as_fixable().is_none());
        assert!(FixableNoTabs.as_fixable().is_some());
    }

    #[test]
    fn fix_mode_hands_out_the_fixer_unless_suppressed() {
        let path = Path::new("test.twig");
        let file = FileContext::from_source(path, "a\tb");
        let (tokens, _) = Tokenizer::new().tokenize(&file).unwrap();
        let token = tokens.get(1).unwrap();
        let mut fixer = Fixer::new();

        let none: Vec<ViolationId> = Vec::new();
        let mut ctx = RuleContext::fix("FixableNoTabs", &file, &none, &mut fixer);
        assert!(ctx.is_fixing());
        assert!(ctx.add_fixable_error("tab", token, None).is_some());
        assert!(!ctx.add_error("not fixable", token, None));

        let silenced = parse_directive("twig-cs-fixer-disable FixableNoTabs", 1).unwrap();
        let mut ctx = RuleContext::fix("FixableNoTabs", &file, &silenced, &mut fixer);
        assert!(ctx.add_fixable_error("tab", token, None).is_none());
    }
}
