//! Token definitions for GraphLang
//!
//! This module defines all the tokens that the lexer can produce.

use crate::span::Span;
use logos::Logos;
use std::fmt;

/// A token produced by the lexer
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Get the text of this token from source
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        self.span.text(source)
    }
}

/// All possible token types in GraphLang
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n\f]+")]               // Skip whitespace
#[logos(skip r"//[^\n]*")]                   // Skip line comments
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]    // Skip block comments
pub enum TokenKind {
    // ============ Literals ============

    /// Integer literal: 42
    #[regex(r"[0-9]+")]
    IntLiteral,

    /// Float literal: 3.14 (exactly one dot)
    #[regex(r"[0-9]+\.[0-9]+")]
    FloatLiteral,

    /// String literal: "hello", "with \"escapes\""
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    StringLiteral,

    /// A string literal missing its closing quote before the end of the line
    #[regex(r#""([^"\\\n]|\\.)*"#)]
    UnterminatedString,

    /// A block comment that is never closed
    #[token("/*")]
    UnterminatedComment,

    /// Boolean literals
    #[token("true")]
    True,
    #[token("false")]
    False,

    #[token("null")]
    Null,

    // ============ Keywords ============

    #[token("if")]
    If,
    #[token("then")]
    Then,
    #[token("else")]
    Else,
    #[token("switch")]
    Switch,
    #[token("case")]
    Case,
    #[token("default")]
    Default,
    #[token("until")]
    Until,
    #[token("return")]
    Return,
    #[token("ref")]
    Ref,

    // ============ Types ============

    #[token("graph")]
    Graph,
    #[token("node")]
    Node,
    #[token("arc")]
    Arc,
    #[token("list")]
    List,
    #[token("int")]
    Int,
    #[token("bool")]
    Bool,
    #[token("float")]
    Float,
    #[token("string")]
    String,
    #[token("void")]
    Void,

    // ============ Operators ============

    #[token("=")]
    Eq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token(">")]
    Gt,
    #[token(">=")]
    GtEq,
    #[token("||")]
    OrOr,
    #[token("!")]
    Not,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,

    // ============ Delimiters ============

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("<")]
    Lt,

    // ============ Punctuation ============

    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,

    // ============ Identifiers ============

    /// Identifier: foo, _bar, n1
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    // ============ Special ============

    /// End of file
    Eof,
}

impl TokenKind {
    /// Check if this token can start a type (and therefore a declaration
    /// or a function definition)
    pub fn is_type_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Graph
                | TokenKind::Node
                | TokenKind::Arc
                | TokenKind::List
                | TokenKind::Int
                | TokenKind::Bool
                | TokenKind::Float
                | TokenKind::String
                | TokenKind::Void
        )
    }

    /// Check if this token is a literal
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            TokenKind::IntLiteral
                | TokenKind::FloatLiteral
                | TokenKind::StringLiteral
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::IntLiteral => "integer literal",
            TokenKind::FloatLiteral => "float literal",
            TokenKind::StringLiteral => "string literal",
            TokenKind::UnterminatedString => "unterminated string",
            TokenKind::UnterminatedComment => "unterminated comment",
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
            TokenKind::Null => "'null'",
            TokenKind::If => "'if'",
            TokenKind::Then => "'then'",
            TokenKind::Else => "'else'",
            TokenKind::Switch => "'switch'",
            TokenKind::Case => "'case'",
            TokenKind::Default => "'default'",
            TokenKind::Until => "'until'",
            TokenKind::Return => "'return'",
            TokenKind::Ref => "'ref'",
            TokenKind::Graph => "'graph'",
            TokenKind::Node => "'node'",
            TokenKind::Arc => "'arc'",
            TokenKind::List => "'list'",
            TokenKind::Int => "'int'",
            TokenKind::Bool => "'bool'",
            TokenKind::Float => "'float'",
            TokenKind::String => "'string'",
            TokenKind::Void => "'void'",
            TokenKind::Eq => "'='",
            TokenKind::EqEq => "'=='",
            TokenKind::NotEq => "'!='",
            TokenKind::Gt => "'>'",
            TokenKind::GtEq => "'>='",
            TokenKind::OrOr => "'||'",
            TokenKind::Not => "'!'",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Lt => "'<'",
            TokenKind::Semicolon => "';'",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::Ident => "identifier",
            TokenKind::Eof => "end of file",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_classification() {
        assert!(TokenKind::Graph.is_type_keyword());
        assert!(!TokenKind::Ident.is_type_keyword());
        assert!(!TokenKind::If.is_type_keyword());
    }

    #[test]
    fn test_display() {
        assert_eq!(TokenKind::Semicolon.to_string(), "';'");
        assert_eq!(TokenKind::Ident.to_string(), "identifier");
        assert_eq!(TokenKind::Eof.to_string(), "end of file");
    }
}
