//! Standards: named, ordered sets of rules.

use crate::{
    BlankEof, DelimiterSpacing, Indent, OperatorSpacing, PunctuationSpacing, TrailingSpace,
    VariableName,
};
use twig_cs_fixer_core::RuleBox;

/// Built-in standards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Standard {
    /// The official Twig coding standard.
    Twig,
    /// [`Standard::Twig`] plus whitespace hygiene. The default.
    #[default]
    TwigCsFixer,
}

impl Standard {
    /// Every standard.
    pub const ALL: [Self; 2] = [Self::Twig, Self::TwigCsFixer];

    /// Configuration name of this standard.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Twig => "Twig",
            Self::TwigCsFixer => "TwigCsFixer",
        }
    }

    /// Looks a standard up by its configuration name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }

    /// Returns the rules for this standard.
    #[must_use]
    pub fn rules(self) -> Vec<RuleBox> {
        match self {
            Self::Twig => twig_rules(),
            Self::TwigCsFixer => twig_cs_fixer_rules(),
        }
    }
}

/// Returns the rules of the official Twig coding standard.
///
/// Includes:
/// - `DelimiterSpacing`
/// - `OperatorSpacing`
/// - `PunctuationSpacing`
/// - `VariableName`
#[must_use]
pub fn twig_rules() -> Vec<RuleBox> {
    vec![
        Box::new(DelimiterSpacing::new()),
        Box::new(OperatorSpacing::new()),
        Box::new(PunctuationSpacing::new()),
        Box::new(VariableName::new()),
    ]
}

/// Returns the default standard.
///
/// Includes every Twig rule plus:
/// - `BlankEof`
/// - `Indent` (4 spaces)
/// - `TrailingSpace`
#[must_use]
pub fn twig_cs_fixer_rules() -> Vec<RuleBox> {
    let mut rules = twig_rules();
    rules.push(Box::new(BlankEof::new()));
    rules.push(Box::new(Indent::new()));
    rules.push(Box::new(TrailingSpace::new()));
    rules
}

/// Returns all available rules with their default settings.
#[must_use]
pub fn all_rules() -> Vec<RuleBox> {
    twig_cs_fixer_rules()
}
