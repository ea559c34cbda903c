//! Rule to enforce a naming convention for variables declared with `set`.
//!
//! # Rationale
//!
//! Templates mixing `userName` and `user_name` are hard to grep. Only
//! declarations are checked, since uses may come from the rendering context.
//!
//! # Configuration
//!
//! ```toml
//! [rules.VariableName]
//! case = "camelCase"   # snake_case (default), camelCase or PascalCase
//! ```
//!
//! Leading underscores are kept as they are.

use std::fmt;
use twig_cs_fixer_core::{Rule, RuleContext, TokenType, Tokens};

/// Rule name for variable naming.
pub const NAME: &str = "VariableName";

/// Naming convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Case {
    /// `foo_bar`
    #[default]
    Snake,
    /// `fooBar`
    Camel,
    /// `FooBar`
    Pascal,
}

impl Case {
    /// Every convention, in configuration order.
    pub const ALL: [Self; 3] = [Self::Snake, Self::Camel, Self::Pascal];

    /// Configuration name of this convention.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Snake => "snake_case",
            Self::Camel => "camelCase",
            Self::Pascal => "PascalCase",
        }
    }

    /// Parses a configuration name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|case| case.name() == name)
    }

    /// Rewrites `name` in this convention.
    #[must_use]
    pub fn convert(self, name: &str) -> String {
        let body = name.trim_start_matches('_');
        let prefix = &name[..name.len() - body.len()];
        let words = words(body);

        let converted = match self {
            Self::Snake => words.join("_"),
            Self::Camel => words
                .iter()
                .enumerate()
                .map(|(i, w)| if i == 0 { w.clone() } else { capitalize(w) })
                .collect(),
            Self::Pascal => words.iter().map(|w| capitalize(w)).collect(),
        };
        format!("{prefix}{converted}")
    }
}

impl fmt::Display for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Splits on underscores and case changes, lowercasing every word.
fn words(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if c.is_uppercase() && !current.is_empty() {
            let previous = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if previous.is_lowercase()
                || previous.is_ascii_digit()
                || (previous.is_uppercase() && next_is_lower)
            {
                words.push(std::mem::take(&mut current));
            }
        }
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Checks the names declared by `{% set %}`.
#[derive(Debug, Clone, Default)]
pub struct VariableName {
    /// Convention names must follow.
    pub case: Case,
}

impl VariableName {
    /// Creates the rule with `snake_case`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the convention.
    #[must_use]
    pub fn case(mut self, case: Case) -> Self {
        self.case = case;
        self
    }
}

impl Rule for VariableName {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Requires variables declared with set to follow a naming convention"
    }

    fn signature(&self) -> String {
        format!("{NAME}(case={})", self.case)
    }

    fn process(&self, index: usize, tokens: &Tokens, ctx: &mut RuleContext<'_>) {
        if !tokens
            .get(index)
            .is_ok_and(|t| t.is_value(TokenType::BlockName, "set"))
        {
            return;
        }

        // Declared names run up to `=` or, for the capturing form, `%}`.
        for token in tokens.iter().skip(index + 1) {
            if token.is(TokenType::BlockEnd) || token.is_value(TokenType::Operator, "=") {
                break;
            }
            if !token.is(TokenType::Name) {
                continue;
            }
            let expected = self.case.convert(token.value());
            if expected != token.value() {
                ctx.add_error(
                    format!("The var name must use {}; expected {expected}.", self.case),
                    token,
                    None,
                );
            }
        }
    }
}
