//! Parser for GraphLang
//!
//! This is a recursive descent parser that converts tokens into an AST.
//! The left-recursive expression rules of the grammar are parsed as
//! left-associative chains, one function per precedence level:
//!
//! ```text
//! ||                 (lowest)
//! == != >= >
//! + -
//! ! (prefix)
//! primary, postfix [ expr ]   (highest)
//! ```
//!
//! After a syntax error the parser records it, skips to the next `;` or `}`
//! and carries on, so that one run can report several errors.

use crate::ast::*;
use crate::lexer::{unescape_string, LexError, Lexer};
use crate::span::Span;
use crate::token::{Token, TokenKind};
use thiserror::Error;

/// Parser errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: TokenKind,
        span: Span,
    },

    #[error("unexpected end of file, expected {expected}")]
    UnexpectedEof { expected: String, span: Span },

    #[error("integer literal `{text}` does not fit in a 32-bit int")]
    IntegerOutOfRange { text: String, span: Span },

    #[error("float literal `{text}` is out of range")]
    FloatOutOfRange { text: String, span: Span },

    #[error("nesting deeper than {limit} levels")]
    NestingTooDeep { limit: usize, span: Span },

    #[error(transparent)]
    Lex(#[from] LexError),
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnexpectedToken { span, .. } => *span,
            ParseError::UnexpectedEof { span, .. } => *span,
            ParseError::IntegerOutOfRange { span, .. } => *span,
            ParseError::FloatOutOfRange { span, .. } => *span,
            ParseError::NestingTooDeep { span, .. } => *span,
            ParseError::Lex(e) => e.span(),
        }
    }

    /// Whether the error comes from the lexer rather than the grammar
    pub fn is_lexical(&self) -> bool {
        matches!(self, ParseError::Lex(_))
    }
}

/// Parse result
pub type ParseResult<T> = Result<T, ParseError>;

/// Deepest allowed nesting of statements, parentheses, index brackets and `!`
pub const MAX_NESTING: usize = 128;

/// The parser for GraphLang
pub struct Parser<'src> {
    lexer: Lexer<'src>,
    current: Token,
    previous: Token,
    errors: Vec<ParseError>,
    /// Lookahead buffer for multi-token lookahead
    lookahead: Vec<Token>,
    /// Current nesting depth, bounded by [`MAX_NESTING`]
    depth: usize,
}

impl<'src> Parser<'src> {
    /// Create a new parser
    pub fn new(source: &'src str) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        let previous = current.clone();

        Self {
            lexer,
            current,
            previous,
            errors: Vec::new(),
            lookahead: Vec::new(),
            depth: 0,
        }
    }

    /// Get the source code
    pub fn source(&self) -> &'src str {
        self.lexer.source()
    }

    /// Advance to next token
    fn advance(&mut self) -> Token {
        self.previous = self.current.clone();
        self.current = if !self.lookahead.is_empty() {
            self.lookahead.remove(0)
        } else {
            self.lexer.next_token()
        };
        self.previous.clone()
    }

    /// Peek at the nth token ahead (0 = current, 1 = next, etc.)
    fn peek_nth(&mut self, n: usize) -> &Token {
        if n == 0 {
            return &self.current;
        }
        while self.lookahead.len() < n {
            let token = self.lexer.next_token();
            self.lookahead.push(token);
        }
        &self.lookahead[n - 1]
    }

    /// Check if current token matches
    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    /// Check if at end of file
    fn is_at_end(&self) -> bool {
        self.check(TokenKind::Eof)
    }

    /// Consume token if it matches, otherwise error
    fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(kind.to_string()))
        }
    }

    /// Consume token if it matches
    fn consume(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Error describing the current token as unexpected
    fn unexpected(&self, expected: impl Into<String>) -> ParseError {
        if self.is_at_end() {
            ParseError::UnexpectedEof {
                expected: expected.into(),
                span: self.current.span,
            }
        } else {
            ParseError::UnexpectedToken {
                expected: expected.into(),
                found: self.current.kind,
                span: self.current.span,
            }
        }
    }

    /// Get text of a token
    fn text(&self, token: &Token) -> &'src str {
        token.text(self.source())
    }

    /// Span from `start` to the end of the last consumed token
    fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.previous.span.end.max(start))
    }

    // ============ Top-level parsing ============

    /// Parse a complete program
    pub fn parse_program(&mut self) -> Program {
        let start = self.current.span.start;
        let mut stmts = Vec::new();

        while !self.is_at_end() {
            if self.check(TokenKind::RBrace) {
                let err = self.unexpected("statement");
                self.errors.push(err);
                self.advance();
                continue;
            }
            self.parse_stmt_into(&mut stmts);
        }

        let lex_errors = self.lexer.take_errors();
        self.errors.extend(lex_errors.into_iter().map(ParseError::Lex));
        self.errors.sort_by_key(|e| e.span().start);

        Program {
            stmts,
            span: Span::new(start, self.current.span.end),
        }
    }

    /// Parse one statement, recovering locally on error
    fn parse_stmt_into(&mut self, stmts: &mut Vec<Stmt>) {
        let before = self.current.span.start;
        match self.parse_stmt() {
            Ok(stmt) => stmts.push(stmt),
            Err(e) => {
                self.errors.push(e);
                self.synchronize();
                // Guarantee progress when the offending token is one that
                // synchronization stops in front of.
                if self.current.span.start == before
                    && !self.is_at_end()
                    && !self.check(TokenKind::RBrace)
                {
                    self.advance();
                }
            }
        }
    }

    /// Skip tokens until just after a `;`, or until a `}` or switch arm
    /// keyword that an enclosing construct can resume at.
    fn synchronize(&mut self) {
        while !self.is_at_end() {
            match self.current.kind {
                TokenKind::RBrace | TokenKind::Case | TokenKind::Default => return,
                TokenKind::Semicolon => {
                    self.advance();
                    return;
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    // ============ Statements ============

    fn parse_stmt(&mut self) -> ParseResult<Stmt> {
        self.nested(Self::parse_stmt_inner)
    }

    fn parse_stmt_inner(&mut self) -> ParseResult<Stmt> {
        let kind = self.current.kind;
        match kind {
            kind if kind.is_type_keyword() => self.parse_decl_or_fn(),
            TokenKind::If => self.parse_if(),
            TokenKind::Switch => self.parse_switch(),
            TokenKind::Until => self.parse_until(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Ident if self.peek_nth(1).kind == TokenKind::Eq => self.parse_assignment(),
            _ => self.parse_expr_stmt(),
        }
    }

    /// `type ID ';'` or `type ID '(' params ')' block`
    fn parse_decl_or_fn(&mut self) -> ParseResult<Stmt> {
        let start = self.current.span.start;
        let ty = self.parse_type()?;
        let name = self.parse_ident()?;

        if self.check(TokenKind::LParen) {
            return self.parse_fn_rest(start, ty, name);
        }

        if !self.check(TokenKind::Semicolon) {
            return Err(self.unexpected("';' or '('"));
        }
        self.advance();

        Ok(Stmt {
            kind: StmtKind::Decl { ty, name },
            span: self.span_from(start),
        })
    }

    fn parse_fn_rest(&mut self, start: usize, return_type: TypeExpr, name: Ident) -> ParseResult<Stmt> {
        self.expect(TokenKind::LParen)?;
        let params = self.parse_params()?;
        self.expect(TokenKind::RParen)?;
        let body = self.parse_block()?;

        let span = self.span_from(start);
        Ok(Stmt {
            kind: StmtKind::Function(FnDef {
                return_type,
                name,
                params,
                body,
                span,
            }),
            span,
        })
    }

    fn parse_params(&mut self) -> ParseResult<Vec<Param>> {
        let mut params = Vec::new();

        if !self.check(TokenKind::RParen) {
            loop {
                params.push(self.parse_param()?);
                if !self.consume(TokenKind::Comma) {
                    break;
                }
            }
        }

        Ok(params)
    }

    fn parse_param(&mut self) -> ParseResult<Param> {
        let start = self.current.span.start;
        let is_ref = self.consume(TokenKind::Ref);
        let ty = self.parse_type()?;
        let name = self.parse_ident()?;

        Ok(Param {
            is_ref,
            ty,
            name,
            span: self.span_from(start),
        })
    }

    fn parse_if(&mut self) -> ParseResult<Stmt> {
        let start = self.current.span.start;
        self.expect(TokenKind::If)?;
        self.expect(TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::Then)?;
        let then_block = self.parse_block()?;

        let else_block = if self.consume(TokenKind::Else) {
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(Stmt {
            kind: StmtKind::If {
                cond,
                then_block,
                else_block,
            },
            span: self.span_from(start),
        })
    }

    fn parse_switch(&mut self) -> ParseResult<Stmt> {
        let start = self.current.span.start;
        self.expect(TokenKind::Switch)?;
        self.expect(TokenKind::LParen)?;
        let scrutinee = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::LBrace)?;

        let mut cases = Vec::new();
        while self.check(TokenKind::Case) {
            cases.push(self.parse_case()?);
        }

        let default = if self.check(TokenKind::Default) {
            let default_start = self.current.span.start;
            self.advance();
            self.expect(TokenKind::Colon)?;
            let body = self.parse_arm_body();
            Some(DefaultCase {
                body,
                span: self.span_from(default_start),
            })
        } else {
            None
        };

        if !self.check(TokenKind::RBrace) {
            return Err(self.unexpected("'case', 'default' or '}'"));
        }
        self.advance();

        Ok(Stmt {
            kind: StmtKind::Switch {
                scrutinee,
                cases,
                default,
            },
            span: self.span_from(start),
        })
    }

    fn parse_case(&mut self) -> ParseResult<Case> {
        let start = self.current.span.start;
        self.expect(TokenKind::Case)?;
        let (label, label_span) = self.parse_literal()?;
        self.expect(TokenKind::Colon)?;
        let body = self.parse_arm_body();

        Ok(Case {
            label,
            label_span,
            body,
            span: self.span_from(start),
        })
    }

    /// Statements of a case or default arm, up to the next arm or the
    /// closing brace
    fn parse_arm_body(&mut self) -> Vec<Stmt> {
        let mut stmts = Vec::new();
        while !matches!(
            self.current.kind,
            TokenKind::Case | TokenKind::Default | TokenKind::RBrace | TokenKind::Eof
        ) {
            self.parse_stmt_into(&mut stmts);
        }
        stmts
    }

    fn parse_until(&mut self) -> ParseResult<Stmt> {
        let start = self.current.span.start;
        self.expect(TokenKind::Until)?;
        self.expect(TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        let body = self.parse_block()?;

        Ok(Stmt {
            kind: StmtKind::Until { cond, body },
            span: self.span_from(start),
        })
    }

    fn parse_return(&mut self) -> ParseResult<Stmt> {
        let start = self.current.span.start;
        self.expect(TokenKind::Return)?;

        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::Semicolon)?;

        Ok(Stmt {
            kind: StmtKind::Return(value),
            span: self.span_from(start),
        })
    }

    fn parse_assignment(&mut self) -> ParseResult<Stmt> {
        let start = self.current.span.start;
        let target = self.parse_ident()?;
        self.expect(TokenKind::Eq)?;
        let value = self.parse_expr()?;
        self.expect(TokenKind::Semicolon)?;

        Ok(Stmt {
            kind: StmtKind::Assign { target, value },
            span: self.span_from(start),
        })
    }

    fn parse_expr_stmt(&mut self) -> ParseResult<Stmt> {
        let start = self.current.span.start;
        let expr = self.parse_expr()?;
        self.expect(TokenKind::Semicolon)?;

        Ok(Stmt {
            kind: StmtKind::Expr(expr),
            span: self.span_from(start),
        })
    }

    // ============ Block parsing ============

    fn parse_block(&mut self) -> ParseResult<Block> {
        let start = self.current.span.start;
        self.expect(TokenKind::LBrace)?;

        let mut stmts = Vec::new();
        while !self.check(TokenKind::RBrace) && !self.is_at_end() {
            self.parse_stmt_into(&mut stmts);
        }

        self.expect(TokenKind::RBrace)?;

        Ok(Block {
            stmts,
            span: self.span_from(start),
        })
    }

    // ============ Expression parsing ============

    /// Parse a single expression
    pub fn parse_expr(&mut self) -> ParseResult<Expr> {
        self.nested(Self::parse_or)
    }

    /// Run `parse` one nesting level deeper
    fn nested<T>(&mut self, parse: fn(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.depth >= MAX_NESTING {
            return Err(ParseError::NestingTooDeep {
                limit: MAX_NESTING,
                span: self.current.span,
            });
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn parse_or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_comparison()?;

        while self.consume(TokenKind::OrOr) {
            let start = expr.span.start;
            let right = self.parse_comparison()?;
            expr = Expr {
                kind: ExprKind::Binary {
                    op: BinaryOp::Or,
                    left: Box::new(expr),
                    right: Box::new(right),
                },
                span: self.span_from(start),
            };
        }

        Ok(expr)
    }

    fn parse_comparison(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_additive()?;

        loop {
            let op = match self.current.kind {
                TokenKind::EqEq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::Ne,
                TokenKind::GtEq => BinaryOp::Ge,
                TokenKind::Gt => BinaryOp::Gt,
                _ => break,
            };
            self.advance();
            let start = expr.span.start;
            let right = self.parse_additive()?;
            expr = Expr {
                kind: ExprKind::Binary {
                    op,
                    left: Box::new(expr),
                    right: Box::new(right),
                },
                span: self.span_from(start),
            };
        }

        Ok(expr)
    }

    fn parse_additive(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_unary()?;

        loop {
            let op = match self.current.kind {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let start = expr.span.start;
            let right = self.parse_unary()?;
            expr = Expr {
                kind: ExprKind::Binary {
                    op,
                    left: Box::new(expr),
                    right: Box::new(right),
                },
                span: self.span_from(start),
            };
        }

        Ok(expr)
    }

    fn parse_unary(&mut self) -> ParseResult<Expr> {
        let start = self.current.span.start;

        if self.consume(TokenKind::Not) {
            let operand = self.nested(Self::parse_unary)?;
            return Ok(Expr {
                kind: ExprKind::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                },
                span: self.span_from(start),
            });
        }

        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_primary()?;

        while self.consume(TokenKind::LBracket) {
            let index = self.parse_expr()?;
            self.expect(TokenKind::RBracket)?;
            let start = expr.span.start;
            expr = Expr {
                kind: ExprKind::Index {
                    base: Box::new(expr),
                    index: Box::new(index),
                },
                span: self.span_from(start),
            };
        }

        Ok(expr)
    }

    fn parse_primary(&mut self) -> ParseResult<Expr> {
        let start = self.current.span.start;

        match self.current.kind {
            TokenKind::Ident => {
                let callee = self.parse_ident()?;
                if self.consume(TokenKind::LParen) {
                    let args = self.parse_args()?;
                    self.expect(TokenKind::RParen)?;
                    return Ok(Expr {
                        kind: ExprKind::Call { callee, args },
                        span: self.span_from(start),
                    });
                }
                Ok(Expr {
                    span: callee.span,
                    kind: ExprKind::Ident(callee),
                })
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(Expr {
                    kind: ExprKind::Paren(Box::new(inner)),
                    span: self.span_from(start),
                })
            }
            kind if kind.is_literal() => {
                let (literal, span) = self.parse_literal()?;
                Ok(Expr {
                    kind: ExprKind::Literal(literal),
                    span,
                })
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    fn parse_args(&mut self) -> ParseResult<Vec<Expr>> {
        let mut args = Vec::new();

        if !self.check(TokenKind::RParen) {
            loop {
                args.push(self.parse_expr()?);
                if !self.consume(TokenKind::Comma) {
                    break;
                }
            }
        }

        Ok(args)
    }

    fn parse_literal(&mut self) -> ParseResult<(Literal, Span)> {
        let token = self.current.clone();
        let text = self.text(&token);

        let literal = match token.kind {
            TokenKind::IntLiteral => {
                let value = text.parse::<i32>().map_err(|_| ParseError::IntegerOutOfRange {
                    text: text.to_string(),
                    span: token.span,
                })?;
                Literal::Int(value)
            }
            TokenKind::FloatLiteral => {
                check_float_range(text, token.span)?;
                Literal::Float(text.to_string())
            }
            TokenKind::StringLiteral => Literal::Str(unescape_string(text, token.span)?),
            TokenKind::True => Literal::Bool(true),
            TokenKind::False => Literal::Bool(false),
            TokenKind::Null => Literal::Null,
            _ => return Err(self.unexpected("literal")),
        };

        self.advance();
        Ok((literal, token.span))
    }

    // ============ Types ============

    fn parse_type(&mut self) -> ParseResult<TypeExpr> {
        let start = self.current.span.start;

        if self.consume(TokenKind::Void) {
            return Ok(TypeExpr {
                kind: TypeExprKind::Void,
                span: self.span_from(start),
            });
        }

        let base = match self.current.kind {
            TokenKind::Graph => SimpleType::Graph,
            TokenKind::Node => SimpleType::Node,
            TokenKind::Arc => SimpleType::Arc,
            TokenKind::List => SimpleType::List,
            TokenKind::Int => SimpleType::Int,
            TokenKind::Bool => SimpleType::Bool,
            TokenKind::Float => SimpleType::Float,
            TokenKind::String => SimpleType::String,
            _ => return Err(self.unexpected("type")),
        };
        self.advance();

        if self.consume(TokenKind::Lt) {
            let arg = self.parse_type()?;
            self.expect(TokenKind::Gt)?;
            return Ok(TypeExpr {
                kind: TypeExprKind::Generic {
                    base,
                    arg: Box::new(arg),
                },
                span: self.span_from(start),
            });
        }

        Ok(TypeExpr {
            kind: TypeExprKind::Simple(base),
            span: self.span_from(start),
        })
    }

    // ============ Helper functions ============

    fn parse_ident(&mut self) -> ParseResult<Ident> {
        if self.check(TokenKind::Ident) {
            let token = self.advance();
            let name = self.text(&token).to_string();
            Ok(Ident {
                name,
                span: token.span,
            })
        } else {
            Err(self.unexpected("identifier"))
        }
    }
}

/// Reject float literals the host compiler would refuse: values that
/// overflow to infinity, or nonzero values that round to zero.
fn check_float_range(text: &str, span: Span) -> ParseResult<()> {
    let out_of_range = || ParseError::FloatOutOfRange {
        text: text.to_string(),
        span,
    };
    let value: f64 = text.parse().map_err(|_| out_of_range())?;
    let nonzero_digits = text.bytes().any(|b| (b'1'..=b'9').contains(&b));
    if !value.is_finite() || (value == 0.0 && nonzero_digits) {
        return Err(out_of_range());
    }
    Ok(())
}

/// Parse source code into an AST.
///
/// Lexical and syntactic errors are returned together, ordered by position.
/// The program is best-effort when the error list is non-empty.
pub fn parse(source: &str) -> (Program, Vec<ParseError>) {
    let mut parser = Parser::new(source);
    let program = parser.parse_program();
    (program, parser.errors)
}
