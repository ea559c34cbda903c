//! Indexed token collection for one file.

use crate::token::{Token, TokenType};
use thiserror::Error;

/// Errors raised by [`Tokens`] accessors and mutators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokensError {
    /// Index past the end of the stream.
    #[error("token index {index} is out of range (stream has {len} tokens)")]
    OutOfRange {
        /// Requested index.
        index: usize,
        /// Number of tokens in the stream.
        len: usize,
    },

    /// The token does not live in this stream.
    #[error("token `{value}` at line {line} does not belong to this stream")]
    ForeignToken {
        /// Value of the foreign token.
        value: String,
        /// Line of the foreign token.
        line: usize,
    },

    /// The stream was handed to a read-only consumer.
    #[error("token stream is read-only")]
    ReadOnly,

    /// Nothing may follow the end-of-file token.
    #[error("cannot add a token after the end of file")]
    AfterEof,
}

/// Ordered collection of the tokens of one file.
///
/// The stream always ends with exactly one [`TokenType::Eof`] once the
/// tokenizer is done with it.
#[derive(Debug, Clone, Default)]
pub struct Tokens {
    tokens: Vec<Token>,
    read_only: bool,
}

impl Tokens {
    /// Creates an empty stream.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a token and returns its index.
    ///
    /// # Errors
    ///
    /// Fails if the stream is read-only or already terminated by EOF.
    pub fn add(&mut self, mut token: Token) -> Result<usize, TokensError> {
        if self.read_only {
            return Err(TokensError::ReadOnly);
        }
        if self.tokens.last().is_some_and(|t| t.is(TokenType::Eof)) {
            return Err(TokensError::AfterEof);
        }

        let index = self.tokens.len();
        token.index = index;
        self.tokens.push(token);
        Ok(index)
    }

    /// Records a mutual bracket pairing between two tokens.
    pub(crate) fn pair(&mut self, open: usize, close: usize) -> Result<(), TokensError> {
        if self.read_only {
            return Err(TokensError::ReadOnly);
        }
        let len = self.tokens.len();
        if open >= len || close >= len {
            return Err(TokensError::OutOfRange {
                index: open.max(close),
                len,
            });
        }
        self.tokens[open].related = Some(close);
        self.tokens[close].related = Some(open);
        Ok(())
    }

    /// Returns the token at `index`.
    ///
    /// # Errors
    ///
    /// Fails if `index` is out of range.
    pub fn get(&self, index: usize) -> Result<&Token, TokensError> {
        self.tokens.get(index).ok_or(TokensError::OutOfRange {
            index,
            len: self.tokens.len(),
        })
    }

    /// Returns true if a token exists at `index`.
    #[must_use]
    pub fn has(&self, index: usize) -> bool {
        index < self.tokens.len()
    }

    /// Returns the index of a token of this stream.
    ///
    /// # Errors
    ///
    /// Fails if the token was not produced for this stream.
    pub fn get_index(&self, token: &Token) -> Result<usize, TokensError> {
        match self.tokens.get(token.index) {
            Some(own) if std::ptr::eq(own, token) => Ok(token.index),
            _ => Err(TokensError::ForeignToken {
                value: token.value().to_string(),
                line: token.line(),
            }),
        }
    }

    /// Returns the index paired with the bracket at `index`.
    #[must_use]
    pub fn related(&self, index: usize) -> Option<usize> {
        self.tokens.get(index).and_then(Token::related)
    }

    /// Finds the first index in `start..end` whose type membership in `types`
    /// differs from `exclude`.
    ///
    /// `end` defaults to the stream length and is exclusive.
    #[must_use]
    pub fn find_next(
        &self,
        types: &[TokenType],
        start: usize,
        end: Option<usize>,
        exclude: bool,
    ) -> Option<usize> {
        let end = end.unwrap_or(self.tokens.len()).min(self.tokens.len());
        (start..end).find(|&i| self.tokens[i].is_any(types) != exclude)
    }

    /// Finds the first index scanning down from `start` to `end` (inclusive)
    /// whose type membership in `types` differs from `exclude`.
    ///
    /// `end` defaults to 0.
    #[must_use]
    pub fn find_previous(
        &self,
        types: &[TokenType],
        start: usize,
        end: Option<usize>,
        exclude: bool,
    ) -> Option<usize> {
        if self.tokens.is_empty() {
            return None;
        }
        let start = start.min(self.tokens.len() - 1);
        let end = end.unwrap_or(0);
        if end > start {
            return None;
        }
        (end..=start)
            .rev()
            .find(|&i| self.tokens[i].is_any(types) != exclude)
    }

    /// Returns the innermost opening bracket that contains `index`.
    ///
    /// Walks backwards, jumping over already closed pairs.
    #[must_use]
    pub fn enclosing_bracket(&self, index: usize) -> Option<usize> {
        let mut i = index.min(self.tokens.len());
        while i > 0 {
            i -= 1;
            let token = &self.tokens[i];
            if !token.is(TokenType::Punctuation) {
                continue;
            }
            match (token.value(), token.related()) {
                ("(" | "[" | "{", _) => return Some(i),
                (")" | "]" | "}", Some(open)) => i = open,
                _ => {}
            }
        }
        None
    }

    /// Marks the stream read-only: further additions are rejected.
    pub fn set_read_only(&mut self) {
        self.read_only = true;
    }

    /// Returns true once [`Tokens::set_read_only`] was called.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Returns true if the stream ends with exactly one EOF token.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.tokens.last().is_some_and(|t| t.is(TokenType::Eof))
            && self.tokens.iter().filter(|t| t.is(TokenType::Eof)).count() == 1
    }

    /// Number of tokens, EOF included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true if the stream holds no token at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Iterates over the tokens in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }

    /// Raw values of every token, index-aligned with the stream.
    #[must_use]
    pub fn values(&self) -> Vec<String> {
        self.tokens.iter().map(|t| t.value().to_string()).collect()
    }

    /// Concatenates every token value back into source text.
    #[must_use]
    pub fn to_source(&self) -> String {
        self.tokens.iter().map(Token::value).collect()
    }
}

impl<'a> IntoIterator for &'a Tokens {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}
