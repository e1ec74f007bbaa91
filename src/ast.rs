//! Abstract Syntax Tree (AST) for GraphLang
//!
//! The AST represents the structure of a GraphLang program after parsing.
//! Each node in the AST corresponds to a syntactic construct in the language;
//! grammar alternatives are enum variants so that the analyzer and the code
//! emitter can pattern-match on them directly.

use crate::span::Span;
use std::fmt;

/// A complete GraphLang program (compilation unit)
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

/// An identifier with its location
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

// ============ Statements ============

/// A braced block: `{ stmt* }`
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

/// A statement
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// Variable declaration: `graph g;`
    Decl { ty: TypeExpr, name: Ident },

    /// Assignment: `g = create_graph();`
    Assign { target: Ident, value: Expr },

    /// `if (cond) then { ... } else { ... }`
    If {
        cond: Expr,
        then_block: Block,
        else_block: Option<Block>,
    },

    /// `switch (expr) { case 1: ... default: ... }`
    Switch {
        scrutinee: Expr,
        cases: Vec<Case>,
        default: Option<DefaultCase>,
    },

    /// `until (cond) { ... }` - loops while `cond` is false
    Until { cond: Expr, body: Block },

    /// Function definition
    Function(FnDef),

    /// `return expr;` or `return;`
    Return(Option<Expr>),

    /// Expression statement: `println("hi");`
    Expr(Expr),
}

/// One `case literal: stmt*` arm of a switch (no fallthrough)
#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    pub label: Literal,
    pub label_span: Span,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// The `default: stmt*` arm of a switch
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultCase {
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// Function definition: `int f(ref graph g, int n) { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct FnDef {
    pub return_type: TypeExpr,
    pub name: Ident,
    pub params: Vec<Param>,
    pub body: Block,
    pub span: Span,
}

/// Function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub is_ref: bool,
    pub ty: TypeExpr,
    pub name: Ident,
    pub span: Span,
}

impl Stmt {
    /// Whether control can never fall off the end of this statement because
    /// every path through it executes a `return`.
    pub fn definitely_returns(&self) -> bool {
        match &self.kind {
            StmtKind::Return(_) => true,
            StmtKind::If {
                then_block,
                else_block: Some(else_block),
                ..
            } => stmts_definitely_return(&then_block.stmts)
                && stmts_definitely_return(&else_block.stmts),
            StmtKind::Switch {
                cases,
                default: Some(default),
                ..
            } => {
                cases.iter().all(|case| stmts_definitely_return(&case.body))
                    && stmts_definitely_return(&default.body)
            }
            _ => false,
        }
    }
}

/// A statement sequence definitely returns if any of its statements does.
pub fn stmts_definitely_return(stmts: &[Stmt]) -> bool {
    stmts.iter().any(Stmt::definitely_returns)
}

// ============ Expressions ============

/// An expression
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Binary operation: `a || b`, `a == b`, `a + b`
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Unary operation: `!a`
    Unary { op: UnaryOp, operand: Box<Expr> },

    /// Function call: `add_node(g, "A")`
    Call { callee: Ident, args: Vec<Expr> },

    /// Indexing: `nodes[0]`
    Index { base: Box<Expr>, index: Box<Expr> },

    /// Variable reference
    Ident(Ident),

    /// Literal value
    Literal(Literal),

    /// Parenthesized expression
    Paren(Box<Expr>),
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// The expression with any enclosing parentheses removed
    pub fn strip_parens(&self) -> &Expr {
        match &self.kind {
            ExprKind::Paren(inner) => inner.strip_parens(),
            _ => self,
        }
    }
}

/// Binary operators, lowest precedence first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Or,
    Eq,
    Ne,
    Ge,
    Gt,
    Add,
    Sub,
}

impl BinaryOp {
    /// Operator spelling, shared by GraphLang and the host language
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Ge => ">=",
            BinaryOp::Gt => ">",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
        }
    }

    /// Binding strength; larger binds tighter
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Ge | BinaryOp::Gt => 2,
            BinaryOp::Add | BinaryOp::Sub => 3,
        }
    }

    pub fn is_comparison(&self) -> bool {
        self.precedence() == 2
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
        }
    }
}

/// Literal values
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i32),
    /// Float literals keep their source spelling so that emission is exact
    Float(String),
    /// Decoded string contents (escapes already processed)
    Str(String),
    Bool(bool),
    Null,
}

// ============ Types ============

/// A type as written in the source
#[derive(Debug, Clone, PartialEq)]
pub struct TypeExpr {
    pub kind: TypeExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeExprKind {
    /// `int`, `graph`, bare `list`, ...
    Simple(SimpleType),
    /// `list<node>`
    Generic { base: SimpleType, arg: Box<TypeExpr> },
    /// `void`
    Void,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimpleType {
    Graph,
    Node,
    Arc,
    List,
    Int,
    Bool,
    Float,
    String,
}

impl SimpleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimpleType::Graph => "graph",
            SimpleType::Node => "node",
            SimpleType::Arc => "arc",
            SimpleType::List => "list",
            SimpleType::Int => "int",
            SimpleType::Bool => "bool",
            SimpleType::Float => "float",
            SimpleType::String => "string",
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeExprKind::Simple(s) => write!(f, "{}", s.as_str()),
            TypeExprKind::Generic { base, arg } => write!(f, "{}<{}>", base.as_str(), arg),
            TypeExprKind::Void => write!(f, "void"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stmt(kind: StmtKind) -> Stmt {
        Stmt {
            kind,
            span: Span::default(),
        }
    }

    fn ret() -> Stmt {
        stmt(StmtKind::Return(None))
    }

    fn block(stmts: Vec<Stmt>) -> Block {
        Block {
            stmts,
            span: Span::default(),
        }
    }

    fn truth() -> Expr {
        Expr::new(ExprKind::Literal(Literal::Bool(true)), Span::default())
    }

    #[test]
    fn test_if_without_else_does_not_return() {
        let s = stmt(StmtKind::If {
            cond: truth(),
            then_block: block(vec![ret()]),
            else_block: None,
        });
        assert!(!s.definitely_returns());
    }

    #[test]
    fn test_if_with_both_branches_returning() {
        let s = stmt(StmtKind::If {
            cond: truth(),
            then_block: block(vec![ret()]),
            else_block: Some(block(vec![ret()])),
        });
        assert!(s.definitely_returns());
    }

    #[test]
    fn test_switch_needs_default_to_return() {
        let case = Case {
            label: Literal::Int(1),
            label_span: Span::default(),
            body: vec![ret()],
            span: Span::default(),
        };
        let without_default = stmt(StmtKind::Switch {
            scrutinee: truth(),
            cases: vec![case.clone()],
            default: None,
        });
        assert!(!without_default.definitely_returns());

        let with_default = stmt(StmtKind::Switch {
            scrutinee: truth(),
            cases: vec![case],
            default: Some(DefaultCase {
                body: vec![ret()],
                span: Span::default(),
            }),
        });
        assert!(with_default.definitely_returns());
    }

    #[test]
    fn test_until_never_definitely_returns() {
        let s = stmt(StmtKind::Until {
            cond: truth(),
            body: block(vec![ret()]),
        });
        assert!(!s.definitely_returns());
    }

    #[test]
    fn test_type_display() {
        let inner = TypeExpr {
            kind: TypeExprKind::Simple(SimpleType::Node),
            span: Span::default(),
        };
        let ty = TypeExpr {
            kind: TypeExprKind::Generic {
                base: SimpleType::List,
                arg: Box::new(inner),
            },
            span: Span::default(),
        };
        assert_eq!(ty.to_string(), "list<node>");
    }

    #[test]
    fn test_operator_precedence_order() {
        assert!(BinaryOp::Or.precedence() < BinaryOp::Eq.precedence());
        assert!(BinaryOp::Gt.precedence() < BinaryOp::Add.precedence());
        assert!(BinaryOp::Ge.is_comparison());
        assert!(!BinaryOp::Sub.is_comparison());
    }
}
