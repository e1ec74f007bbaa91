//! Lexer for GraphLang
//!
//! The lexer converts source code into a stream of tokens.
//! It uses the `logos` crate for efficient lexing; this wrapper turns the
//! raw logos stream into spanned [`Token`]s and records lexical errors
//! instead of silently skipping bad input.

use crate::span::Span;
use crate::token::{Token, TokenKind};
use logos::Logos;
use thiserror::Error;

/// Lexer errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexError {
    #[error("unexpected character `{ch}`")]
    UnexpectedChar { ch: char, span: Span },

    #[error("unterminated string literal")]
    UnterminatedString { span: Span },

    #[error("unterminated block comment")]
    UnterminatedComment { span: Span },

    #[error("invalid escape sequence `\\{ch}` in string literal")]
    InvalidEscape { ch: char, span: Span },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedChar { span, .. } => *span,
            LexError::UnterminatedString { span } => *span,
            LexError::UnterminatedComment { span } => *span,
            LexError::InvalidEscape { span, .. } => *span,
        }
    }
}

/// The lexer for GraphLang
pub struct Lexer<'src> {
    source: &'src str,
    inner: logos::Lexer<'src, TokenKind>,
    errors: Vec<LexError>,
    finished: bool,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source code
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            inner: TokenKind::lexer(source),
            errors: Vec::new(),
            finished: false,
        }
    }

    /// Get the source code
    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Take ownership of the errors collected so far
    pub fn take_errors(&mut self) -> Vec<LexError> {
        std::mem::take(&mut self.errors)
    }

    /// Get the next token. After the end of input every call yields `Eof`.
    pub fn next_token(&mut self) -> Token {
        let eof = Token::new(
            TokenKind::Eof,
            Span::new(self.source.len(), self.source.len()),
        );
        if self.finished {
            return eof;
        }

        loop {
            match self.inner.next() {
                Some(Ok(TokenKind::UnterminatedString)) => {
                    let span = self.inner.span();
                    self.errors.push(LexError::UnterminatedString {
                        span: Span::new(span.start, span.end),
                    });
                }
                Some(Ok(TokenKind::UnterminatedComment)) => {
                    // Everything up to the end of input is comment text.
                    let span = self.inner.span();
                    self.errors.push(LexError::UnterminatedComment {
                        span: Span::new(span.start, self.source.len()),
                    });
                    self.finished = true;
                    return eof;
                }
                Some(Ok(kind)) => {
                    let span = self.inner.span();
                    return Token::new(kind, Span::new(span.start, span.end));
                }
                Some(Err(())) => {
                    let span = self.inner.span();
                    let ch = self.source[span.start..].chars().next().unwrap_or('\u{FFFD}');
                    self.errors.push(LexError::UnexpectedChar {
                        ch,
                        span: Span::new(span.start, span.end),
                    });
                }
                None => {
                    self.finished = true;
                    return eof;
                }
            }
        }
    }

    /// Collect all tokens into a vector
    pub fn tokenize(mut self) -> (Vec<Token>, Vec<LexError>) {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token();
            let at_end = token.kind == TokenKind::Eof;
            tokens.push(token);
            if at_end {
                break;
            }
        }

        (tokens, self.errors)
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}

/// Helper function to lex source code
pub fn lex(source: &str) -> (Vec<Token>, Vec<LexError>) {
    Lexer::new(source).tokenize()
}

/// Decode the contents of a string literal token (quotes included in `raw`).
///
/// `span` is the span of the whole literal and is used to locate escape
/// errors.
pub fn unescape_string(raw: &str, span: Span) -> Result<String, LexError> {
    let inner = &raw[1..raw.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.char_indices();

    while let Some((i, c)) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some((_, 'n')) => out.push('\n'),
            Some((_, 't')) => out.push('\t'),
            Some((_, 'r')) => out.push('\r'),
            Some((_, '\\')) => out.push('\\'),
            Some((_, '"')) => out.push('"'),
            Some((j, other)) => {
                let start = span.start + 1 + i;
                return Err(LexError::InvalidEscape {
                    ch: other,
                    span: Span::new(start, span.start + 1 + j + other.len_utf8()),
                });
            }
            None => {
                return Err(LexError::UnterminatedString { span });
            }
        }
    }

    Ok(out)
}
