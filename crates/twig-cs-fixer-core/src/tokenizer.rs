//! Hand-written lexer for Twig templates.
//!
//! The lexer keeps every byte of the input: text, whitespace, tabs and line
//! breaks are first-class tokens, so joining the values of the emitted tokens
//! gives back the source exactly. Rules can then rewrite single tokens without
//! touching anything else.
//!
//! Lexing is driven by an explicit stack of states instead of recursion:
//!
//! ```text
//! Data ──{{──▶ Var ──"──▶ DqString ──#{──▶ Interpolation ──"──▶ DqString ...
//!      ──{%──▶ Block
//!      ──{#──▶ Comment
//! ```
//!
//! A second stack tracks open brackets and pending ternary `?` so that `:` can
//! be told apart and closing brackets can be paired with their opener.

use crate::context::FileContext;
use crate::suppression::parse_directive;
use crate::token::{Token, TokenType};
use crate::tokens::{Tokens, TokensError};
use crate::violation_id::ViolationId;

use regex::Regex;
use std::fmt;
use std::sync::{Arc, LazyLock};
use thiserror::Error;
use tracing::trace;

/// Unary operators of the default Twig environment.
pub const DEFAULT_UNARY_OPERATORS: &[&str] = &["not", "-", "+"];

/// Binary operators of the default Twig environment.
pub const DEFAULT_BINARY_OPERATORS: &[&str] = &[
    "or", "xor", "and", "b-or", "b-xor", "b-and", "==", "!=", "<=>", "<", ">", ">=", "<=",
    "not in", "in", "matches", "starts with", "ends with", "has some", "has every", "..", "+",
    "-", "~", "*", "/", "//", "%", "is", "is not", "**", "??", "?:",
];

macro_rules! static_regex {
    ($name:ident, $pattern:expr) => {
        static $name: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new($pattern).unwrap_or_else(|e| unreachable!("invalid built-in regex: {e}"))
        });
    };
}

static_regex!(DELIMITER_START, r"\{([{%#])[-~]?");
static_regex!(BLOCK_END, r"^[-~]?%\}");
static_regex!(VAR_END, r"^[-~]?\}\}");
static_regex!(COMMENT_END, r"[-~]?#\}");
static_regex!(END_VERBATIM, r"^\{%[-~]?\s*end(?:verbatim|raw)\s*[-~]?%\}");
static_regex!(NAME, r"^[a-zA-Z_\x{80}-\x{10FFFF}][a-zA-Z0-9_\x{80}-\x{10FFFF}]*");
static_regex!(NUMBER, r"^[0-9]+(?:\.[0-9]+)?(?:[eE][+-][0-9]+)?");
static_regex!(SQ_STRING, r"^(?s)'(?:[^'\\]|\\.)*'");

static DEFAULT_OPERATORS: LazyLock<Regex> = LazyLock::new(|| {
    operator_regex(DEFAULT_UNARY_OPERATORS, DEFAULT_BINARY_OPERATORS)
        .unwrap_or_else(|e| unreachable!("invalid default operator table: {e}"))
});

/// Lexer states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexState {
    /// Template text.
    Data,
    /// Inside `{% %}`.
    Block,
    /// Inside `{{ }}`.
    Var,
    /// Inside a double-quoted string.
    DqString,
    /// Inside `#{ }` of a double-quoted string.
    Interpolation,
    /// Inside `{# #}`.
    Comment,
}

impl fmt::Display for LexState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Data => "data",
            Self::Block => "block",
            Self::Var => "variable",
            Self::DqString => "string",
            Self::Interpolation => "interpolation",
            Self::Comment => "comment",
        })
    }
}

/// Errors raised while tokenizing. All of them are fatal for the file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizeError {
    /// No lexing rule matches the character.
    #[error("Unexpected character \"{character}\" at line {line}.")]
    UnexpectedCharacter {
        /// The offending character.
        character: char,
        /// Line of the character.
        line: usize,
    },

    /// A comment is never closed.
    #[error("Unclosed comment at line {line}.")]
    UnclosedComment {
        /// Line of the comment start.
        line: usize,
    },

    /// A bracket is never closed, closed by the wrong bracket, or closed
    /// without being opened.
    #[error("Unclosed \"{bracket}\" at line {line}.")]
    UnclosedBracket {
        /// The bracket at fault.
        bracket: String,
        /// Line of that bracket.
        line: usize,
    },

    /// The input ended while a block, variable or string was still open.
    #[error("Unexpected end of file inside {state} at line {line}.")]
    UnexpectedEndOfFile {
        /// The state left open.
        state: LexState,
        /// Last line of the input.
        line: usize,
    },

    /// The token stream refused a token.
    #[error(transparent)]
    Tokens(#[from] TokensError),
}

impl TokenizeError {
    /// Line the error is localized to.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::UnexpectedCharacter { line, .. }
            | Self::UnclosedComment { line }
            | Self::UnclosedBracket { line, .. }
            | Self::UnexpectedEndOfFile { line, .. } => Some(*line),
            Self::Tokens(_) => None,
        }
    }
}

/// Builds the anchored, longest-first operator regex.
///
/// `=` is always an operator. Operators made of several words accept any
/// whitespace run between the words, and operators ending with a letter must
/// end on a word boundary so that `in` never swallows the start of `index`.
fn operator_regex(unary: &[&str], binary: &[&str]) -> Result<Regex, regex::Error> {
    let mut operators: Vec<&str> = std::iter::once("=")
        .chain(unary.iter().copied())
        .chain(binary.iter().copied())
        .map(str::trim)
        .filter(|op| !op.is_empty())
        .collect();
    operators.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    operators.dedup();

    let alternatives: Vec<String> = operators
        .iter()
        .map(|op| {
            let mut pattern = op
                .split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+");
            if op.ends_with(|c: char| c.is_ascii_alphabetic()) {
                pattern.push_str(r"\b");
            }
            pattern
        })
        .collect();

    Regex::new(&format!("^(?:{})", alternatives.join("|")))
}

/// Turns template source into a [`Tokens`] stream plus the suppression
/// directives found in its comments.
///
/// A `Tokenizer` only holds its operator table; every call to
/// [`Tokenizer::tokenize`] starts from a fresh lexer, so one instance can be
/// shared freely.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    operators: Regex,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    /// Creates a tokenizer for the default Twig operators.
    #[must_use]
    pub fn new() -> Self {
        Self {
            operators: DEFAULT_OPERATORS.clone(),
        }
    }

    /// Creates a tokenizer for a custom operator table.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting regex exceeds the regex size limits.
    pub fn with_operators(unary: &[&str], binary: &[&str]) -> Result<Self, regex::Error> {
        Ok(Self {
            operators: operator_regex(unary, binary)?,
        })
    }

    /// Tokenizes one file.
    ///
    /// # Errors
    ///
    /// Returns a [`TokenizeError`] located on a line when the input cannot be
    /// lexed.
    pub fn tokenize(
        &self,
        file: &FileContext<'_>,
    ) -> Result<(Tokens, Vec<ViolationId>), TokenizeError> {
        Lexer::new(&self.operators, file).run()
    }
}

/// An opening delimiter found by the pre-scan.
#[derive(Debug, Clone, Copy)]
struct Delimiter {
    start: usize,
    end: usize,
    state: LexState,
}

/// A frame of the state stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Data,
    Block,
    Var,
    DqString,
    /// `depth` is the bracket stack height when the interpolation opened.
    Interpolation {
        depth: usize,
    },
    Comment,
}

impl Frame {
    fn state(self) -> LexState {
        match self {
            Self::Data => LexState::Data,
            Self::Block => LexState::Block,
            Self::Var => LexState::Var,
            Self::DqString => LexState::DqString,
            Self::Interpolation { .. } => LexState::Interpolation,
            Self::Comment => LexState::Comment,
        }
    }

    fn bracket_depth(self) -> usize {
        match self {
            Self::Interpolation { depth } => depth,
            _ => 0,
        }
    }
}

/// Single-use lexing state for one input.
struct Lexer<'t, 's> {
    operators: &'t Regex,
    code: &'s str,
    filename: Arc<str>,
    cursor: usize,
    line: usize,
    column: usize,
    tokens: Tokens,
    frames: Vec<Frame>,
    /// Token indices of open brackets and pending ternary `?`.
    brackets: Vec<usize>,
    delimiters: Vec<Delimiter>,
    next_delimiter: usize,
    directives: Vec<ViolationId>,
    /// Line of the comment being lexed.
    comment_line: usize,
    block_name: Option<String>,
    verbatim: bool,
}

impl<'t, 's> Lexer<'t, 's> {
    fn new(operators: &'t Regex, file: &FileContext<'s>) -> Self {
        let code = file.content;
        let delimiters = DELIMITER_START
            .captures_iter(code)
            .filter_map(|captures| {
                let whole = captures.get(0)?;
                let state = match captures.get(1)?.as_str() {
                    "{" => LexState::Var,
                    "%" => LexState::Block,
                    _ => LexState::Comment,
                };
                Some(Delimiter {
                    start: whole.start(),
                    end: whole.end(),
                    state,
                })
            })
            .collect();

        Self {
            operators,
            code,
            filename: Arc::from(file.display_name()),
            cursor: 0,
            line: 1,
            column: 1,
            tokens: Tokens::new(),
            frames: vec![Frame::Data],
            brackets: Vec::new(),
            delimiters,
            next_delimiter: 0,
            directives: Vec::new(),
            comment_line: 1,
            block_name: None,
            verbatim: false,
        }
    }

    fn run(mut self) -> Result<(Tokens, Vec<ViolationId>), TokenizeError> {
        while self.cursor < self.code.len() {
            match self.frame() {
                Frame::Data => self.lex_data()?,
                Frame::Block => self.lex_block()?,
                Frame::Var => self.lex_var()?,
                Frame::DqString => self.lex_dq_string()?,
                Frame::Interpolation { depth } => self.lex_interpolation(depth)?,
                Frame::Comment => self.lex_comment()?,
            }
        }

        self.push(TokenType::Eof, 0)?;

        let state = self.frame().state();
        if state != LexState::Data {
            return Err(TokenizeError::UnexpectedEndOfFile {
                state,
                line: self.line,
            });
        }

        trace!(
            file = %self.filename,
            tokens = self.tokens.len(),
            directives = self.directives.len(),
            "tokenized"
        );
        Ok((self.tokens, self.directives))
    }

    fn frame(&self) -> Frame {
        self.frames.last().copied().unwrap_or(Frame::Data)
    }

    fn rest(&self) -> &'s str {
        &self.code[self.cursor..]
    }

    /// Emits the next `len` bytes as a token of type `kind`.
    fn push(&mut self, kind: TokenType, len: usize) -> Result<usize, TokenizeError> {
        let code = self.code;
        let value = &code[self.cursor..self.cursor + len];
        let token = Token::new(kind, self.line, self.column, Arc::clone(&self.filename), value);
        let index = self.tokens.add(token)?;
        self.advance(value);
        Ok(index)
    }

    fn advance(&mut self, value: &str) {
        self.cursor += value.len();
        let mut chars = value.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '\r' if chars.peek() == Some(&'\n') => {
                    chars.next();
                    self.new_line();
                }
                '\r' | '\n' => self.new_line(),
                _ => self.column += 1,
            }
        }
    }

    fn new_line(&mut self) {
        self.line += 1;
        self.column = 1;
    }

    // ── Data ────────────────────────────────────

    fn lex_data(&mut self) -> Result<(), TokenizeError> {
        let next = self.next_delimiter();
        let limit = next.map_or(self.code.len(), |d| d.start);
        self.lex_formatted(
            limit,
            [
                TokenType::Text,
                TokenType::Whitespace,
                TokenType::Tab,
                TokenType::Eol,
            ],
        )?;

        if let Some(delimiter) = next {
            self.next_delimiter += 1;
            self.lex_start(delimiter)?;
        }
        Ok(())
    }

    /// Returns the next opening delimiter at or after the cursor.
    ///
    /// Delimiters already swallowed by a block or a string are skipped, and so
    /// is everything but `endverbatim` while inside a verbatim block.
    fn next_delimiter(&mut self) -> Option<Delimiter> {
        while let Some(delimiter) = self.delimiters.get(self.next_delimiter).copied() {
            if delimiter.start < self.cursor {
                self.next_delimiter += 1;
                continue;
            }
            if self.verbatim {
                if END_VERBATIM.is_match(&self.code[delimiter.start..]) {
                    self.verbatim = false;
                    return Some(delimiter);
                }
                self.next_delimiter += 1;
                continue;
            }
            return Some(delimiter);
        }
        None
    }

    fn lex_start(&mut self, delimiter: Delimiter) -> Result<(), TokenizeError> {
        let len = delimiter.end - delimiter.start;
        match delimiter.state {
            LexState::Var => {
                self.push(TokenType::VarStart, len)?;
                self.frames.push(Frame::Var);
            }
            LexState::Block => {
                self.push(TokenType::BlockStart, len)?;
                self.frames.push(Frame::Block);
                self.block_name = None;
            }
            _ => {
                let line = self.line;
                self.push(TokenType::CommentStart, len)?;
                self.frames.push(Frame::Comment);
                self.comment_line = line;
                self.lex_comment()?;
            }
        }
        Ok(())
    }

    /// Splits `cursor..limit` into text, space, tab and line break runs.
    fn lex_formatted(&mut self, limit: usize, kinds: [TokenType; 4]) -> Result<(), TokenizeError> {
        let [text, space, tab, eol] = kinds;
        while self.cursor < limit {
            let rest = &self.code.as_bytes()[self.cursor..limit];
            let (kind, len) = match rest[0] {
                b'\r' if rest.get(1) == Some(&b'\n') => (eol, 2),
                b'\r' | b'\n' => (eol, 1),
                b' ' => (space, run_length(rest, b' ')),
                b'\t' => (tab, run_length(rest, b'\t')),
                _ => (
                    text,
                    rest.iter()
                        .position(|b| matches!(b, b' ' | b'\t' | b'\r' | b'\n'))
                        .unwrap_or(rest.len()),
                ),
            };
            self.push(kind, len)?;
        }
        Ok(())
    }

    // ── Comment ─────────────────────────────────

    fn lex_comment(&mut self) -> Result<(), TokenizeError> {
        let code = self.code;
        let Some(end) = COMMENT_END.find(&code[self.cursor..]) else {
            return Err(TokenizeError::UnclosedComment {
                line: self.comment_line,
            });
        };
        let body_end = self.cursor + end.start();

        if let Some(ids) = parse_directive(&code[self.cursor..body_end], self.comment_line) {
            self.directives.extend(ids);
        }

        self.lex_formatted(
            body_end,
            [
                TokenType::CommentText,
                TokenType::CommentWhitespace,
                TokenType::CommentTab,
                TokenType::CommentEol,
            ],
        )?;
        self.push(TokenType::CommentEnd, end.len())?;
        self.frames.pop();
        Ok(())
    }

    // ── Block / Var ─────────────────────────────

    fn lex_block(&mut self) -> Result<(), TokenizeError> {
        if !self.has_open_brackets(0) {
            if let Some(end) = BLOCK_END.find(self.rest()) {
                self.brackets.clear();
                self.push(TokenType::BlockEnd, end.len())?;
                self.frames.pop();
                if matches!(self.block_name.take().as_deref(), Some("verbatim" | "raw")) {
                    self.verbatim = true;
                }
                return Ok(());
            }
        }
        self.lex_expression()
    }

    fn lex_var(&mut self) -> Result<(), TokenizeError> {
        if !self.has_open_brackets(0) {
            if let Some(end) = VAR_END.find(self.rest()) {
                self.brackets.clear();
                self.push(TokenType::VarEnd, end.len())?;
                self.frames.pop();
                return Ok(());
            }
        }
        self.lex_expression()
    }

    // ── Strings ─────────────────────────────────

    fn lex_dq_string(&mut self) -> Result<(), TokenizeError> {
        let rest = self.rest();
        if rest.starts_with("#{") {
            let depth = self.brackets.len();
            self.push(TokenType::InterpolationStart, 2)?;
            self.frames.push(Frame::Interpolation { depth });
        } else if rest.starts_with('"') {
            self.push(TokenType::DqStringEnd, 1)?;
            self.frames.pop();
        } else {
            self.push(TokenType::String, dq_content_len(rest))?;
        }
        Ok(())
    }

    fn lex_interpolation(&mut self, depth: usize) -> Result<(), TokenizeError> {
        if self.rest().starts_with('}') && !self.has_open_brackets(depth) {
            self.brackets.truncate(depth);
            self.push(TokenType::InterpolationEnd, 1)?;
            self.frames.pop();
            return Ok(());
        }
        self.lex_expression()
    }

    // ── Expressions ─────────────────────────────

    fn lex_expression(&mut self) -> Result<(), TokenizeError> {
        let rest = self.rest();
        let bytes = rest.as_bytes();

        match bytes[0] {
            b'\t' => {
                self.push(TokenType::Tab, run_length(bytes, b'\t'))?;
                return Ok(());
            }
            b' ' => {
                self.push(TokenType::Whitespace, run_length(bytes, b' '))?;
                return Ok(());
            }
            b'\r' if bytes.get(1) == Some(&b'\n') => {
                self.push(TokenType::Eol, 2)?;
                return Ok(());
            }
            b'\r' | b'\n' => {
                self.push(TokenType::Eol, 1)?;
                return Ok(());
            }
            _ => {}
        }

        if rest.starts_with("...") {
            self.push(TokenType::Spread, 3)?;
        } else if rest.starts_with("=>") {
            self.push(TokenType::Arrow, 2)?;
        } else if let Some(op) = self
            .operators
            .find(rest)
            .filter(|op| !self.names_attribute(op.as_str()))
        {
            self.push(TokenType::Operator, op.end())?;
        } else if let Some(name) = NAME.find(rest) {
            self.lex_name(name.as_str())?;
        } else if let Some(number) = NUMBER.find(rest) {
            self.push(TokenType::Number, number.end())?;
        } else if b"()[]{}?:.,|".contains(&bytes[0]) {
            self.lex_punctuation(bytes[0])?;
        } else if let Some(string) = SQ_STRING.find(rest) {
            self.push(TokenType::String, string.end())?;
        } else if bytes[0] == b'"' {
            self.push(TokenType::DqStringStart, 1)?;
            self.frames.push(Frame::DqString);
        } else {
            return Err(TokenizeError::UnexpectedCharacter {
                character: rest.chars().next().unwrap_or_default(),
                line: self.line,
            });
        }
        Ok(())
    }

    fn lex_name(&mut self, name: &str) -> Result<(), TokenizeError> {
        if self.frame() == Frame::Block && self.block_name.is_none() {
            self.block_name = Some(name.to_string());
            self.push(TokenType::BlockName, name.len())?;
        } else {
            self.push(TokenType::Name, name.len())?;
        }
        Ok(())
    }

    fn lex_punctuation(&mut self, current: u8) -> Result<(), TokenizeError> {
        match current {
            b'?' => {
                let index = self.push(TokenType::Operator, 1)?;
                self.brackets.push(index);
            }
            b':' => {
                if self.top_bracket_is("?") {
                    // Separator of a pending ternary.
                    self.brackets.pop();
                    self.push(TokenType::Operator, 1)?;
                } else {
                    // Slice separator inside `[`, hash key separator otherwise.
                    self.push(TokenType::Punctuation, 1)?;
                }
            }
            b',' => {
                self.drop_pending_ternaries();
                self.push(TokenType::Punctuation, 1)?;
            }
            b'(' | b'[' | b'{' => {
                let index = self.push(TokenType::Punctuation, 1)?;
                self.brackets.push(index);
            }
            b')' | b']' | b'}' => self.lex_closing_bracket(current)?,
            _ => {
                self.push(TokenType::Punctuation, 1)?;
            }
        }
        Ok(())
    }

    fn lex_closing_bracket(&mut self, current: u8) -> Result<(), TokenizeError> {
        self.drop_pending_ternaries();

        let depth = self.frame().bracket_depth();
        if self.brackets.len() <= depth {
            return Err(TokenizeError::UnclosedBracket {
                bracket: char::from(current).to_string(),
                line: self.line,
            });
        }
        let Some(open) = self.brackets.pop() else {
            unreachable!("bracket stack checked above");
        };

        let opener = self.tokens.get(open)?;
        let expected = match opener.value() {
            "(" => b')',
            "[" => b']',
            _ => b'}',
        };
        if expected != current {
            return Err(TokenizeError::UnclosedBracket {
                bracket: opener.value().to_string(),
                line: opener.line(),
            });
        }

        let close = self.push(TokenType::Punctuation, 1)?;
        self.tokens.pair(open, close)?;
        Ok(())
    }

    /// Returns true if a real bracket (not a pending `?`) is open above `depth`.
    fn has_open_brackets(&self, depth: usize) -> bool {
        self.brackets
            .iter()
            .skip(depth)
            .any(|&i| self.tokens.get(i).is_ok_and(|t| t.value() != "?"))
    }

    fn top_bracket_is(&self, value: &str) -> bool {
        let depth = self.frame().bracket_depth();
        self.brackets.len() > depth
            && self
                .brackets
                .last()
                .and_then(|&i| self.tokens.get(i).ok())
                .is_some_and(|t| t.value() == value)
    }

    /// Whether a word operator right after `.` or `|` is an attribute or
    /// filter name instead (`foo.in`, `a|not`).
    fn names_attribute(&self, op: &str) -> bool {
        op.starts_with(|c: char| c.is_ascii_alphabetic())
            && self
                .tokens
                .find_previous(TokenType::WHITESPACE, usize::MAX, None, true)
                .and_then(|i| self.tokens.get(i).ok())
                .is_some_and(|t| {
                    t.is_value(TokenType::Punctuation, ".") || t.is_value(TokenType::Punctuation, "|")
                })
    }

    /// Forgets ternaries used without `:` (`a ? b`) in the current frame.
    fn drop_pending_ternaries(&mut self) {
        while self.top_bracket_is("?") {
            self.brackets.pop();
        }
    }
}

fn run_length(bytes: &[u8], byte: u8) -> usize {
    bytes.iter().take_while(|&&b| b == byte).count()
}

/// Length of the literal part of a double-quoted string, up to the closing
/// quote or the next interpolation. Backslash escapes are kept as is.
fn dq_content_len(rest: &str) -> usize {
    let mut chars = rest.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '"' => return i,
            '#' if matches!(chars.peek(), Some((_, '{'))) => return i,
            _ => {}
        }
    }
    rest.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn tokenize(source: &str) -> Result<(Tokens, Vec<ViolationId>), TokenizeError> {
        let ctx = FileContext::from_source(Path::new("test.twig"), source);
        Tokenizer::new().tokenize(&ctx)
    }

    fn dump(tokens: &Tokens) -> String {
        tokens
            .iter()
            .map(|t| format!("{} {:?}", t.kind(), t.value()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn find(tokens: &Tokens, kind: TokenType, value: &str) -> usize {
        tokens
            .iter()
            .position(|t| t.is_value(kind, value))
            .unwrap_or_else(|| panic!("no {kind} token {value:?}"))
    }

    #[test]
    fn round_trips_every_byte() {
        let sources = [
            "",
            "plain text\n",
            "{{ foo }}",
            "{% if a and b %}\r\n\t<p>{{ a|upper }}</p>\n{% endif %}\n",
            "{{ \"Hello #{ name ~ '!' } and #{ {a: 1}['a'] }\" }}",
            "{# comment\n  spanning\tlines #}after",
            "{%- set list = [1, 2, 3] -%}{{~ list[1:2] ~}}",
            "{{ a ? b : c }}{{ a ?: b }}{{ a ?? b }}{{ a ? b }}",
            "{% verbatim %}{{ not lexed }}{% endverbatim %}",
            "{{ fn(...args) }}{{ items|map(i => i * 2) }}",
            "{{ 'it\\'s' }} unicode: héllo {{ café }}",
        ];

        for source in sources {
            let (tokens, _) = tokenize(source).unwrap();
            assert_eq!(tokens.to_source(), source, "round-trip failed for {source:?}");
            assert!(tokens.is_complete());
        }
    }

    #[test]
    fn dumps_a_simple_expression() {
        let (tokens, _) = tokenize("{{ a in index }}").unwrap();
        insta::assert_snapshot!(dump(&tokens), @r#"
        VarStart "{{"
        Whitespace " "
        Name "a"
        Whitespace " "
        Operator "in"
        Whitespace " "
        Name "index"
        Whitespace " "
        VarEnd "}}"
        Eof ""
        "#);
    }

    #[test]
    fn data_is_split_into_formatting_runs() {
        let (tokens, _) = tokenize("a  b\t\tc\r\nd").unwrap();
        let kinds: Vec<TokenType> = tokens.iter().map(Token::kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenType::Text,
                TokenType::Whitespace,
                TokenType::Text,
                TokenType::Tab,
                TokenType::Text,
                TokenType::Eol,
                TokenType::Text,
                TokenType::Eof,
            ]
        );
        assert_eq!(tokens.get(5).unwrap().value(), "\r\n");
        assert_eq!(tokens.get(6).unwrap().line(), 2);
    }

    #[test]
    fn tracks_lines_and_columns() {
        let (tokens, _) = tokenize("ab\n  {{ x }}").unwrap();
        let x = tokens.get(find(&tokens, TokenType::Name, "x")).unwrap();
        assert_eq!((x.line(), x.column()), (2, 6));
        let eof = tokens.get(tokens.len() - 1).unwrap();
        assert_eq!((eof.line(), eof.column()), (2, 10));
    }

    #[test]
    fn pairs_brackets_both_ways() {
        let (tokens, _) = tokenize("{{ [ (1,2) ] }}").unwrap();
        let open_square = find(&tokens, TokenType::Punctuation, "[");
        let close_square = find(&tokens, TokenType::Punctuation, "]");
        let open_paren = find(&tokens, TokenType::Punctuation, "(");
        let close_paren = find(&tokens, TokenType::Punctuation, ")");

        assert_eq!(tokens.related(close_square), Some(open_square));
        assert_eq!(tokens.related(open_square), Some(close_square));
        assert_eq!(tokens.related(close_paren), Some(open_paren));
        assert_eq!(tokens.related(open_paren), Some(close_paren));
    }

    #[test]
    fn colon_depends_on_context() {
        let (tokens, _) = tokenize("{{ a ? b : c }}").unwrap();
        assert!(tokens.iter().any(|t| t.is_value(TokenType::Operator, ":")));

        let (tokens, _) = tokenize("{{ a[1:2] }}{{ {k: v} }}").unwrap();
        assert!(!tokens.iter().any(|t| t.is_value(TokenType::Operator, ":")));
        let colons: Vec<usize> = tokens
            .iter()
            .filter(|t| t.is_value(TokenType::Punctuation, ":"))
            .map(|t| tokens.get_index(t).unwrap())
            .collect();
        assert_eq!(colons.len(), 2);
        let slice_owner = tokens.enclosing_bracket(colons[0]).unwrap();
        assert_eq!(tokens.get(slice_owner).unwrap().value(), "[");
    }

    #[test]
    fn ternary_shortcut_does_not_block_the_end() {
        let (tokens, _) = tokenize("{{ (a ? b) }}{{ a ? b }}").unwrap();
        assert_eq!(
            tokens.iter().filter(|t| t.is(TokenType::VarEnd)).count(),
            2
        );
    }

    #[test]
    fn word_operators_respect_boundaries() {
        let (tokens, _) = tokenize("{{ a not in b }}{{ notice is not empty }}").unwrap();
        assert!(tokens.iter().any(|t| t.is_value(TokenType::Operator, "not in")));
        assert!(tokens.iter().any(|t| t.is_value(TokenType::Name, "notice")));
        assert!(tokens.iter().any(|t| t.is_value(TokenType::Operator, "is not")));
    }

    #[test]
    fn word_operators_after_accessors_are_names() {
        let (tokens, _) = tokenize("{{ foo.in }}{{ foo. is }}{{ a|not }}{{ a.b in c }}").unwrap();
        assert!(tokens.iter().any(|t| t.is_value(TokenType::Name, "in")));
        assert!(tokens.iter().any(|t| t.is_value(TokenType::Name, "is")));
        assert!(tokens.iter().any(|t| t.is_value(TokenType::Name, "not")));
        let operators: Vec<&str> = tokens
            .iter()
            .filter(|t| t.is(TokenType::Operator))
            .map(Token::value)
            .collect();
        assert_eq!(operators, vec!["in"]);
    }

    #[test]
    fn custom_operator_table() {
        let tokenizer = Tokenizer::with_operators(&["!"], &["<>", "contains"]).unwrap();
        let ctx = FileContext::from_source(Path::new("t.twig"), "{{ !a <> b contains c }}");
        let (tokens, _) = tokenizer.tokenize(&ctx).unwrap();
        let operators: Vec<&str> = tokens
            .iter()
            .filter(|t| t.is(TokenType::Operator))
            .map(Token::value)
            .collect();
        assert_eq!(operators, vec!["!", "<>", "contains"]);
    }

    #[test]
    fn first_block_name_is_tagged() {
        let (tokens, _) = tokenize("{% set foo = 1 %}").unwrap();
        assert!(tokens.iter().any(|t| t.is_value(TokenType::BlockName, "set")));
        assert!(tokens.iter().any(|t| t.is_value(TokenType::Name, "foo")));
        assert!(tokens.iter().any(|t| t.is_value(TokenType::Operator, "=")));
    }

    #[test]
    fn interpolation_nests_expressions() {
        let (tokens, _) = tokenize("{{ \"a#{ {b: 1}['b'] }c\" }}").unwrap();
        let kinds: Vec<TokenType> = tokens.iter().map(Token::kind).collect();
        assert!(kinds.contains(&TokenType::DqStringStart));
        assert!(kinds.contains(&TokenType::InterpolationStart));
        assert!(kinds.contains(&TokenType::InterpolationEnd));
        assert!(kinds.contains(&TokenType::DqStringEnd));
        let strings: Vec<&str> = tokens
            .iter()
            .filter(|t| t.is(TokenType::String))
            .map(Token::value)
            .collect();
        assert_eq!(strings, vec!["a", "'b'", "c"]);
    }

    #[test]
    fn verbatim_content_is_text() {
        let (tokens, _) = tokenize("{% verbatim %}{{ a }}{% if %}{% endverbatim %}{{ b }}").unwrap();
        assert!(!tokens.iter().any(|t| t.is_value(TokenType::Name, "a")));
        assert!(tokens.iter().any(|t| t.is_value(TokenType::Text, "{{")));
        assert!(tokens.iter().any(|t| t.is_value(TokenType::BlockName, "endverbatim")));
        assert!(tokens.iter().any(|t| t.is_value(TokenType::Name, "b")));
    }

    #[test]
    fn comment_uses_comment_formatting_types() {
        let (tokens, _) = tokenize("{# a\tb #}").unwrap();
        let kinds: Vec<TokenType> = tokens.iter().map(Token::kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenType::CommentStart,
                TokenType::CommentWhitespace,
                TokenType::CommentText,
                TokenType::CommentTab,
                TokenType::CommentText,
                TokenType::CommentWhitespace,
                TokenType::CommentEnd,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn collects_suppression_directives() {
        let source = "{# twig-cs-fixer-disable-line MyRule #}\n{# twig-cs-fixer-disable-next-line Other.After #}\n";
        let (_, directives) = tokenize(source).unwrap();
        assert_eq!(directives.len(), 2);
        assert_eq!(directives[0].to_string(), "MyRule:1");
        assert_eq!(directives[1].to_string(), "Other.After:3");
    }

    #[test]
    fn unexpected_character_is_fatal() {
        let err = tokenize("\n{{ a @ b }}").unwrap_err();
        assert_eq!(
            err,
            TokenizeError::UnexpectedCharacter {
                character: '@',
                line: 2
            }
        );
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn unclosed_comment_is_fatal() {
        let err = tokenize("a\n{# never closed\n").unwrap_err();
        assert_eq!(err, TokenizeError::UnclosedComment { line: 2 });
    }

    #[test]
    fn mismatched_bracket_is_fatal() {
        let err = tokenize("{{ (a] }}").unwrap_err();
        assert_eq!(
            err,
            TokenizeError::UnclosedBracket {
                bracket: "(".to_string(),
                line: 1
            }
        );

        let err = tokenize("{{ a) }}").unwrap_err();
        assert!(matches!(err, TokenizeError::UnclosedBracket { ref bracket, .. } if bracket == ")"));
    }

    #[test]
    fn unterminated_states_are_fatal() {
        assert!(matches!(
            tokenize("{{ foo"),
            Err(TokenizeError::UnexpectedEndOfFile {
                state: LexState::Var,
                ..
            })
        ));
        assert!(matches!(
            tokenize("{% if a"),
            Err(TokenizeError::UnexpectedEndOfFile {
                state: LexState::Block,
                ..
            })
        ));
        assert!(matches!(
            tokenize("{{ \"abc }}"),
            Err(TokenizeError::UnexpectedEndOfFile {
                state: LexState::DqString,
                ..
            })
        ));
    }

    #[test]
    fn tokenizer_is_reusable() {
        let tokenizer = Tokenizer::new();
        let ctx = FileContext::from_source(Path::new("a.twig"), "{{ (a }}");
        assert!(tokenizer.tokenize(&ctx).is_err());
        let ctx = FileContext::from_source(Path::new("b.twig"), "{{ a }}");
        let (tokens, _) = tokenizer.tokenize(&ctx).unwrap();
        assert_eq!(tokens.get(0).unwrap().filename(), "b.twig");
    }
}
