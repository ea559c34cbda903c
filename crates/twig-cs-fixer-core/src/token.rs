//! Lexical units produced by the [`Tokenizer`](crate::Tokenizer).

use std::fmt;
use std::sync::Arc;

/// Kind of a [`Token`].
///
/// Formatting tokens (whitespace, tab, line break) exist twice: once for
/// template code and once for comment bodies, so that comment formatting never
/// collides with code formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    /// End of file. Always the last token, with an empty value.
    Eof,
    /// Literal template text outside of any delimiter.
    Text,
    /// A run of spaces.
    Whitespace,
    /// A run of tabs.
    Tab,
    /// A line break (`\n`, `\r\n` or `\r`).
    Eol,
    /// `{{`, optionally followed by a trim marker.
    VarStart,
    /// `}}`, optionally preceded by a trim marker.
    VarEnd,
    /// `{%`, optionally followed by a trim marker.
    BlockStart,
    /// `%}`, optionally preceded by a trim marker.
    BlockEnd,
    /// The tag name right after a block start (`if`, `set`, `verbatim`...).
    BlockName,
    /// Any other name.
    Name,
    /// A number literal.
    Number,
    /// A single-quoted string, or the literal part of a double-quoted one.
    String,
    /// An operator, including the bare ternary `?` and its `:`.
    Operator,
    /// Punctuation: `( ) [ ] { } : . , |`.
    Punctuation,
    /// `=>`.
    Arrow,
    /// `...`.
    Spread,
    /// Opening `"` of a double-quoted string.
    DqStringStart,
    /// Closing `"` of a double-quoted string.
    DqStringEnd,
    /// `#{` inside a double-quoted string.
    InterpolationStart,
    /// `}` closing an interpolation.
    InterpolationEnd,
    /// `{#`, optionally followed by a trim marker.
    CommentStart,
    /// `#}`, optionally preceded by a trim marker.
    CommentEnd,
    /// Non-blank comment content.
    CommentText,
    /// A run of spaces inside a comment.
    CommentWhitespace,
    /// A run of tabs inside a comment.
    CommentTab,
    /// A line break inside a comment.
    CommentEol,
}

impl TokenType {
    /// Spaces and tabs of template code.
    pub const INDENT: &'static [Self] = &[Self::Whitespace, Self::Tab];

    /// Every formatting token, in code and in comments.
    pub const WHITESPACE: &'static [Self] = &[
        Self::Whitespace,
        Self::Tab,
        Self::Eol,
        Self::CommentWhitespace,
        Self::CommentTab,
        Self::CommentEol,
    ];

    /// Every token belonging to a comment.
    pub const COMMENT: &'static [Self] = &[
        Self::CommentStart,
        Self::CommentEnd,
        Self::CommentText,
        Self::CommentWhitespace,
        Self::CommentTab,
        Self::CommentEol,
    ];

    /// Tokens that carry no meaning for the template: formatting and comments.
    pub const EMPTY: &'static [Self] = &[
        Self::Whitespace,
        Self::Tab,
        Self::Eol,
        Self::CommentStart,
        Self::CommentEnd,
        Self::CommentText,
        Self::CommentWhitespace,
        Self::CommentTab,
        Self::CommentEol,
    ];

    /// Returns true if this type is part of `set`.
    #[must_use]
    pub fn is_any(self, set: &[Self]) -> bool {
        set.contains(&self)
    }

    /// Stable name, used as the token part of a violation id.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Eof => "Eof",
            Self::Text => "Text",
            Self::Whitespace => "Whitespace",
            Self::Tab => "Tab",
            Self::Eol => "Eol",
            Self::VarStart => "VarStart",
            Self::VarEnd => "VarEnd",
            Self::BlockStart => "BlockStart",
            Self::BlockEnd => "BlockEnd",
            Self::BlockName => "BlockName",
            Self::Name => "Name",
            Self::Number => "Number",
            Self::String => "String",
            Self::Operator => "Operator",
            Self::Punctuation => "Punctuation",
            Self::Arrow => "Arrow",
            Self::Spread => "Spread",
            Self::DqStringStart => "DqStringStart",
            Self::DqStringEnd => "DqStringEnd",
            Self::InterpolationStart => "InterpolationStart",
            Self::InterpolationEnd => "InterpolationEnd",
            Self::CommentStart => "CommentStart",
            Self::CommentEnd => "CommentEnd",
            Self::CommentText => "CommentText",
            Self::CommentWhitespace => "CommentWhitespace",
            Self::CommentTab => "CommentTab",
            Self::CommentEol => "CommentEol",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An immutable lexical unit.
///
/// Tokens only exist inside a [`Tokens`](crate::Tokens) arena: `index` is the
/// token's own slot and `related` points at the paired bracket in the same
/// arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    kind: TokenType,
    line: usize,
    column: usize,
    filename: Arc<str>,
    value: String,
    pub(crate) index: usize,
    pub(crate) related: Option<usize>,
}

impl Token {
    /// Creates a detached token. It gets its index when added to a `Tokens`.
    #[must_use]
    pub(crate) fn new(
        kind: TokenType,
        line: usize,
        column: usize,
        filename: Arc<str>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            line,
            column,
            filename,
            value: value.into(),
            index: 0,
            related: None,
        }
    }

    /// Type of this token.
    #[must_use]
    pub fn kind(&self) -> TokenType {
        self.kind
    }

    /// Line of the first character (1-indexed).
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Column of the first character (1-indexed, in characters).
    #[must_use]
    pub fn column(&self) -> usize {
        self.column
    }

    /// Logical name of the file this token comes from.
    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Raw source text of this token.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Index of the paired bracket, if this token is one side of a pair.
    #[must_use]
    pub fn related(&self) -> Option<usize> {
        self.related
    }

    /// Returns true if the token has the given type.
    #[must_use]
    pub fn is(&self, kind: TokenType) -> bool {
        self.kind == kind
    }

    /// Returns true if the token has the given type and value.
    #[must_use]
    pub fn is_value(&self, kind: TokenType, value: &str) -> bool {
        self.kind == kind && self.value == value
    }

    /// Returns true if the token type belongs to `set`.
    #[must_use]
    pub fn is_any(&self, set: &[TokenType]) -> bool {
        self.kind.is_any(set)
    }
}
