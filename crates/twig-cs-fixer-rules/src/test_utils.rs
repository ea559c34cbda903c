//! Helpers shared by the rule tests.

use std::path::Path;
use twig_cs_fixer_core::{FileContext, Fixer, Report, Rule, Ruleset, Tokenizer};

/// Lints `source` with a single rule, one `line:column id severity: message`
/// line per violation.
pub(crate) fn report<R: Rule + 'static>(rule: R, source: &str) -> String {
    let path = Path::new("test.twig");
    let file = FileContext::from_source(path, source);
    let (tokens, directives) = Tokenizer::new().tokenize(&file).unwrap();
    let mut report = Report::new([path]);
    let mut ruleset = Ruleset::new();
    ruleset.add_rule(rule);
    ruleset
        .lint_file(&tokens, &file, &directives, &mut report)
        .unwrap();

    report
        .all_violations(None)
        .iter()
        .map(|v| {
            let mut id = v.id.clone().unwrap_or_default();
            let line = id.line.take().unwrap_or_default();
            let column = id.column.take().unwrap_or_default();
            format!("{line}:{column} {id} {}: {}", v.severity, v.message)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fixes `source` with a single rule.
pub(crate) fn fix<R: Rule + 'static>(rule: R, source: &str) -> String {
    let mut ruleset = Ruleset::new();
    ruleset.add_rule(rule);
    let file = FileContext::from_source(Path::new("test.twig"), source);
    Fixer::new().fix_file(&ruleset, &file).unwrap()
}
