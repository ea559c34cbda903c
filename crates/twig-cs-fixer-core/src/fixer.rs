//! Iterative fixer.
//!
//! Each loop tokenizes the current text, lets every fixable rule edit the
//! token values, and joins the values into the next text. The loop stops on
//! the first pass without edits, or fails after [`MAX_FIXER_ITERATION`].
//!
//! Edits are keyed by token index. Since an edit can change the length of a
//! token, and with it every later index, a token can only be rewritten once
//! per loop; further edits wait for the next tokenization.

use crate::context::FileContext;
use crate::rule::RuleContext;
use crate::ruleset::Ruleset;
use crate::tokenizer::{TokenizeError, Tokenizer};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, warn};

/// Upper bound of tokenize/fix loops for one file.
pub const MAX_FIXER_ITERATION: usize = 50;

/// Errors raised by [`Fixer::fix_file`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FixerError {
    /// The rules kept editing the file until the iteration ceiling.
    #[error("Cannot fix the file: the rules did not converge after {loops} iterations.")]
    CannotConverge {
        /// Number of loops run.
        loops: usize,
    },

    /// The original text cannot be tokenized.
    #[error("Cannot fix the file: {0}")]
    Tokenize(#[from] TokenizeError),

    /// The edits of one loop produced text that cannot be tokenized.
    #[error("Cannot fix the file: the fixes of loop {loop_number} produced an invalid template ({source})")]
    InvalidFix {
        /// Loop whose edits broke the text, starting at 1.
        loop_number: usize,
        /// Error raised on the edited text.
        source: TokenizeError,
    },
}

impl FixerError {
    /// Line the error is localized to, if any.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::CannotConverge { .. } | Self::InvalidFix { .. } => None,
            Self::Tokenize(e) => e.line(),
        }
    }
}

/// Last two values written to one token index.
#[derive(Debug, Clone)]
struct History {
    previous: String,
    current: String,
    loop_number: usize,
}

/// Rewrites token values until the fixable rules are satisfied.
///
/// A `Fixer` owns mutable per-file buffers and must not be shared between
/// concurrent callers. Use one instance per worker.
#[derive(Debug, Default)]
pub struct Fixer {
    tokenizer: Tokenizer,
    loops: usize,
    values: Vec<String>,
    fixed_tokens: HashSet<usize>,
    event_count: usize,
    in_conflict: bool,
    history: HashMap<usize, History>,
    change_set: Option<Vec<(usize, String)>>,
    eol: String,
}

impl Fixer {
    /// Creates a fixer using the default tokenizer.
    #[must_use]
    pub fn new() -> Self {
        Self::with_tokenizer(Tokenizer::new())
    }

    /// Creates a fixer using a custom tokenizer.
    #[must_use]
    pub fn with_tokenizer(tokenizer: Tokenizer) -> Self {
        Self {
            tokenizer,
            eol: default_eol().to_string(),
            ..Self::default()
        }
    }

    /// Fixes one file and returns the corrected text.
    ///
    /// # Errors
    ///
    /// Fails if a pass cannot be tokenized or the rules never stop editing.
    pub fn fix_file(
        &mut self,
        ruleset: &Ruleset,
        file: &FileContext<'_>,
    ) -> Result<String, FixerError> {
        let mut content = file.content.to_string();
        self.eol = sniff_eol(&content).to_string();
        self.loops = 0;
        self.history.clear();

        let mut stable = false;
        while self.loops < MAX_FIXER_ITERATION {
            self.fixed_tokens.clear();
            self.event_count = 0;
            self.in_conflict = false;
            self.change_set = None;

            {
                let current = file.with_content(&content);
                let (tokens, directives) = match self.tokenizer.tokenize(&current) {
                    Ok(result) => result,
                    Err(source) if self.loops == 0 => return Err(source.into()),
                    Err(source) => {
                        return Err(FixerError::InvalidFix {
                            loop_number: self.loops,
                            source,
                        })
                    }
                };
                self.values = tokens.values();

                for rule in ruleset.fixable_rules() {
                    let mut ctx = RuleContext::fix(rule.name(), &current, &directives, self);
                    rule.fix_file(&tokens, &mut ctx);
                }
            }

            self.loops += 1;
            if self.event_count == 0 && !self.in_conflict {
                stable = true;
                break;
            }
            if self.in_conflict {
                warn!(
                    file = %file.display_name(),
                    loop_number = self.loops,
                    "conflicting edits, retrying"
                );
                continue;
            }

            debug!(
                file = %file.display_name(),
                loop_number = self.loops,
                edits = self.event_count,
                "fixer pass"
            );
            content = self.values.concat();
        }

        if !stable {
            return Err(FixerError::CannotConverge { loops: self.loops });
        }
        Ok(content)
    }

    /// Number of loops run by the current (or last) call to `fix_file`.
    #[must_use]
    pub fn loops(&self) -> usize {
        self.loops
    }

    /// Line break used for inserted newlines.
    #[must_use]
    pub fn eol(&self) -> &str {
        &self.eol
    }

    /// Current value of a token in this pass.
    #[must_use]
    pub fn token_value(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    /// Value the next edit of a token builds on: the staged one inside a
    /// change-set, else the current one.
    fn pending_value(&self, index: usize) -> Option<&str> {
        self.change_set
            .as_ref()
            .and_then(|staged| staged.iter().find(|(i, _)| *i == index))
            .map(|(_, value)| value.as_str())
            .or_else(|| self.token_value(index))
    }

    /// Replaces the value of a token.
    ///
    /// Returns false when the edit is rejected: the token was already edited
    /// in this pass, the index is unknown, the pass is in conflict, or the edit
    /// would undo the previous loop's edit of the same token. The last case
    /// puts the whole pass in conflict.
    ///
    /// Inside a change-set the edit is only staged and this returns true.
    pub fn replace_token(&mut self, index: usize, content: impl Into<String>) -> bool {
        let content = content.into();
        if self.in_conflict {
            return false;
        }
        if let Some(change_set) = &mut self.change_set {
            match change_set.iter_mut().find(|(i, _)| *i == index) {
                Some(staged) => staged.1 = content,
                None => change_set.push((index, content)),
            }
            return true;
        }
        if self.fixed_tokens.contains(&index) {
            return false;
        }
        let Some(old) = self.values.get(index).cloned() else {
            return false;
        };

        match self.history.get_mut(&index) {
            None => {
                self.history.insert(
                    index,
                    History {
                        previous: old,
                        current: content.clone(),
                        loop_number: self.loops,
                    },
                );
            }
            Some(entry) => {
                if content == entry.previous && entry.loop_number + 1 == self.loops {
                    debug!(index, loop_number = self.loops, "edit reverts the previous loop");
                    self.in_conflict = true;
                    return false;
                }
                entry.previous = std::mem::replace(&mut entry.current, content.clone());
                entry.loop_number = self.loops;
            }
        }

        self.fixed_tokens.insert(index);
        self.values[index] = content;
        self.event_count += 1;
        true
    }

    /// Appends `content` to the current value of a token.
    pub fn add_content(&mut self, index: usize, content: &str) -> bool {
        let Some(value) = self.pending_value(index) else {
            return false;
        };
        let value = format!("{value}{content}");
        self.replace_token(index, value)
    }

    /// Prepends `content` to the current value of a token.
    pub fn add_content_before(&mut self, index: usize, content: &str) -> bool {
        let Some(value) = self.pending_value(index) else {
            return false;
        };
        let value = format!("{content}{value}");
        self.replace_token(index, value)
    }

    /// Inserts a line break after a token.
    pub fn add_newline(&mut self, index: usize) -> bool {
        let eol = self.eol.clone();
        self.add_content(index, &eol)
    }

    /// Inserts a line break before a token.
    pub fn add_newline_before(&mut self, index: usize) -> bool {
        let eol = self.eol.clone();
        self.add_content_before(index, &eol)
    }

    /// Starts staging edits. Staged edits apply together or not at all.
    pub fn begin_change_set(&mut self) {
        if self.in_conflict {
            return;
        }
        self.change_set = Some(Vec::new());
    }

    /// Applies the staged edits.
    ///
    /// If any of them is rejected, the ones already applied are rolled back
    /// and false is returned.
    pub fn end_change_set(&mut self) -> bool {
        let Some(change_set) = self.change_set.take() else {
            return false;
        };
        if self.in_conflict {
            return false;
        }

        let mut applied: Vec<(usize, String, Option<History>)> = Vec::new();
        for (index, content) in change_set {
            let old_value = self.values.get(index).cloned().unwrap_or_default();
            let old_history = self.history.get(&index).cloned();
            if !self.replace_token(index, content) {
                self.rollback(applied);
                return false;
            }
            applied.push((index, old_value, old_history));
        }
        true
    }

    fn rollback(&mut self, applied: Vec<(usize, String, Option<History>)>) {
        for (index, old_value, old_history) in applied.into_iter().rev() {
            self.values[index] = old_value;
            match old_history {
                Some(history) => self.history.insert(index, history),
                None => self.history.remove(&index),
            };
            self.fixed_tokens.remove(&index);
            self.event_count -= 1;
        }
    }
}

#[cfg(windows)]
fn default_eol() -> &'static str {
    "\r\n"
}

#[cfg(not(windows))]
fn default_eol() -> &'static str {
    "\n"
}

/// First line break of `content`, or the platform default.
fn sniff_eol(content: &str) -> &'static str {
    match content.find(['\r', '\n']) {
        Some(i) if content[i..].starts_with("\r\n") => "\r\n",
        Some(i) if content[i..].starts_with('\r') => "\r",
        Some(_) => "\n",
        None => default_eol(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{FixableRule, Rule};
    use crate::token::TokenType;
    use crate::tokens::Tokens;
    use std::path::Path;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    /// Rewrites every `from` name into `to`.
    struct Rename {
        name: &'static str,
        from: &'static str,
        to: &'static str,
    }

    impl Rule for Rename {
        fn name(&self) -> &'static str {
            self.name
        }

        fn process(&self, index: usize, tokens: &Tokens, ctx: &mut RuleContext<'_>) {
            let Ok(token) = tokens.get(index) else {
                return;
            };
            if !token.is_value(TokenType::Name, self.from) {
                return;
            }
            if let Some(fixer) = ctx.add_fixable_error("rename", token, None) {
                fixer.replace_token(index, self.to);
            }
        }

        fn as_fixable(&self) -> Option<&dyn FixableRule> {
            Some(self)
        }
    }

    impl FixableRule for Rename {}

    /// Renames `a` into `b` and `c` into `d` within one change-set.
    struct PairRename;

    impl Rule for PairRename {
        fn name(&self) -> &'static str {
            "PairRename"
        }

        fn process(&self, index: usize, tokens: &Tokens, ctx: &mut RuleContext<'_>) {
            let Ok(token) = tokens.get(index) else {
                return;
            };
            if !token.is_value(TokenType::Name, "a") {
                return;
            }
            let Some(other) = tokens
                .iter()
                .position(|t| t.is_value(TokenType::Name, "c"))
            else {
                return;
            };
            if let Some(fixer) = ctx.add_fixable_error("pair", token, None) {
                fixer.begin_change_set();
                fixer.replace_token(index, "b");
                fixer.replace_token(other, "d");
                fixer.end_change_set();
            }
        }

        fn as_fixable(&self) -> Option<&dyn FixableRule> {
            Some(self)
        }
    }

    impl FixableRule for PairRename {}

    /// Renames `b` back into `a`, the first time only.
    #[derive(Default)]
    struct RevertOnce {
        fired: AtomicBool,
    }

    impl Rule for RevertOnce {
        fn name(&self) -> &'static str {
            "RevertOnce"
        }

        fn process(&self, index: usize, tokens: &Tokens, ctx: &mut RuleContext<'_>) {
            let Ok(token) = tokens.get(index) else {
                return;
            };
            if !token.is_value(TokenType::Name, "b") || self.fired.swap(true, Ordering::SeqCst) {
                return;
            }
            if let Some(fixer) = ctx.add_fixable_error("revert", token, None) {
                fixer.replace_token(index, "a");
            }
        }

        fn as_fixable(&self) -> Option<&dyn FixableRule> {
            Some(self)
        }
    }

    impl FixableRule for RevertOnce {}

    /// Records the text each loop starts from.
    struct Snapshots {
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl Rule for Snapshots {
        fn name(&self) -> &'static str {
            "Snapshots"
        }

        fn process(&self, index: usize, tokens: &Tokens, _ctx: &mut RuleContext<'_>) {
            if index == 0 {
                self.seen.lock().unwrap().push(tokens.values().concat());
            }
        }

        fn as_fixable(&self) -> Option<&dyn FixableRule> {
            Some(self)
        }
    }

    impl FixableRule for Snapshots {}

    fn rename(name: &'static str, from: &'static str, to: &'static str) -> Rename {
        Rename { name, from, to }
    }

    fn fix(ruleset: &Ruleset, source: &str) -> Result<String, FixerError> {
        let file = FileContext::from_source(Path::new("test.twig"), source);
        Fixer::new().fix_file(ruleset, &file)
    }

    fn prepared(source: &str) -> Fixer {
        let file = FileContext::from_source(Path::new("test.twig"), source);
        let (tokens, _) = Tokenizer::new().tokenize(&file).unwrap();
        let mut fixer = Fixer::new();
        fixer.values = tokens.values();
        fixer.eol = sniff_eol(source).to_string();
        fixer
    }

    // ── Loop ────────────────────────────────────

    #[test]
    fn converges_and_is_idempotent() {
        let mut ruleset = Ruleset::new();
        ruleset.add_rule(Rename {
            name: "Rename",
            from: "foo",
            to: "bar",
        });

        let fixed = fix(&ruleset, "{{ foo ~ foo }}\n").unwrap();
        assert_eq!(fixed, "{{ bar ~ bar }}\n");
        assert_eq!(fix(&ruleset, &fixed).unwrap(), fixed);
    }

    #[test]
    fn untouched_file_takes_one_loop() {
        let ruleset = Ruleset::new();
        let file = FileContext::from_source(Path::new("t.twig"), "{{ a }}");
        let mut fixer = Fixer::new();
        assert_eq!(fixer.fix_file(&ruleset, &file).unwrap(), "{{ a }}");
        assert_eq!(fixer.loops(), 1);
    }

    #[test]
    fn toggling_rules_cannot_converge() {
        let mut ruleset = Ruleset::new();
        ruleset.add_rule(Rename {
            name: "AToB",
            from: "a",
            to: "b",
        });
        ruleset.add_rule(Rename {
            name: "BToA",
            from: "b",
            to: "a",
        });

        assert_eq!(
            fix(&ruleset, "{{ a }}"),
            Err(FixerError::CannotConverge {
                loops: MAX_FIXER_ITERATION
            })
        );
    }

    #[test]
    fn tokenize_failure_is_reported() {
        let err = fix(&Ruleset::new(), "{{ a").unwrap_err();
        assert!(matches!(err, FixerError::Tokenize(_)));
        assert_eq!(err.line(), Some(1));
    }

    #[test]
    fn conflicting_loop_drops_its_earlier_edits() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut ruleset = Ruleset::new();
        ruleset
            .add_rule(Snapshots { seen: seen.clone() })
            .add_rule(rename("AToB", "a", "b"))
            .add_rule(rename("FToG", "f", "g"))
            .add_rule(rename("GToH", "g", "h"))
            .add_rule(RevertOnce::default());

        let file = FileContext::from_source(Path::new("t.twig"), "{{ a ~ f }}");
        let mut fixer = Fixer::new();
        assert_eq!(fixer.fix_file(&ruleset, &file).unwrap(), "{{ b ~ h }}");
        assert_eq!(fixer.loops(), 4);

        // Loop 2 renamed `g` before `b` was reverted: that edit is dropped
        // with the rest of the loop and only lands in loop 3.
        assert_eq!(
            *seen.lock().unwrap(),
            ["{{ a ~ f }}", "{{ b ~ g }}", "{{ b ~ g }}", "{{ b ~ h }}"]
        );
    }

    #[test]
    fn broken_fix_names_its_loop() {
        let mut ruleset = Ruleset::new();
        ruleset.add_rule(rename("Breaker", "a", "("));

        let err = fix(&ruleset, "{{ a }}").unwrap_err();
        assert!(matches!(err, FixerError::InvalidFix { loop_number: 1, .. }));
        assert_eq!(err.line(), None);
        assert!(err.to_string().contains("loop 1"));
    }

    #[test]
    fn change_set_applies_as_a_whole() {
        let mut ruleset = Ruleset::new();
        ruleset.add_rule(PairRename);
        assert_eq!(fix(&ruleset, "{{ a ~ c }}").unwrap(), "{{ b ~ d }}");
    }

    // ── Edits ───────────────────────────────────

    #[test]
    fn a_token_is_edited_once_per_pass() {
        let mut fixer = prepared("{{ a }}");
        assert!(fixer.replace_token(2, "b"));
        assert!(!fixer.replace_token(2, "c"));
        assert_eq!(fixer.token_value(2), Some("b"));
        assert!(!fixer.replace_token(99, "x"));
    }

    #[test]
    fn rejected_edit_rolls_back_the_change_set() {
        let mut fixer = prepared("{{ a ~ c }}");
        // `c` is already fixed in this pass.
        assert!(fixer.replace_token(6, "z"));

        fixer.begin_change_set();
        assert!(fixer.replace_token(2, "b"));
        assert!(fixer.replace_token(6, "d"));
        assert!(!fixer.end_change_set());

        assert_eq!(fixer.token_value(2), Some("a"));
        assert_eq!(fixer.token_value(6), Some("z"));
        assert_eq!(fixer.event_count, 1);
        assert!(!fixer.history.contains_key(&2));
        assert!(fixer.replace_token(2, "b"));
    }

    #[test]
    fn reverting_last_loop_puts_the_pass_in_conflict() {
        let mut fixer = prepared("{{ a ~ c }}");
        assert!(fixer.replace_token(2, "b"));

        fixer.loops = 1;
        fixer.fixed_tokens.clear();
        assert!(!fixer.replace_token(2, "a"));
        assert!(fixer.in_conflict);
        assert!(!fixer.replace_token(6, "d"));

        fixer.begin_change_set();
        assert!(!fixer.end_change_set());
    }

    #[test]
    fn content_helpers_build_on_replace() {
        let mut fixer = prepared("a\r\nb");
        assert_eq!(fixer.eol(), "\r\n");
        assert!(fixer.add_content(0, "+"));
        assert!(fixer.add_newline_before(2));
        assert_eq!(fixer.values.concat(), "a+\r\n\r\nb");
        assert!(!fixer.add_newline(0));
    }

    #[test]
    fn content_helpers_build_on_staged_value() {
        let mut fixer = prepared("{{ a }}");
        fixer.begin_change_set();
        assert!(fixer.replace_token(2, "b"));
        assert!(fixer.add_content(2, "c"));
        assert!(fixer.add_content_before(2, "x"));
        assert!(fixer.end_change_set());
        assert_eq!(fixer.token_value(2), Some("xbc"));
        assert_eq!(fixer.event_count, 1);
    }

    #[test]
    fn sniffs_first_line_break() {
        assert_eq!(sniff_eol("a\nb\r\n"), "\n");
        assert_eq!(sniff_eol("a\r\nb\n"), "\r\n");
        assert_eq!(sniff_eol("a\rb"), "\r");
        assert_eq!(sniff_eol("ab"), default_eol());
    }
}
