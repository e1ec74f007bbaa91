//! Semantic Error Definitions
//!
//! This module defines all error types that can occur during semantic
//! analysis. Messages are lowercase and name the offending item in backticks.

use crate::span::Span;
use crate::typeck::Ty;
use std::fmt;

/// Semantic error
#[derive(Debug, Clone, PartialEq)]
pub struct TypeError {
    pub kind: TypeErrorKind,
    pub span: Span,
}

impl TypeError {
    pub fn new(kind: TypeErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    // ============ Error Constructors ============

    pub fn undefined_variable(name: &str, span: Span) -> Self {
        Self::new(
            TypeErrorKind::UndefinedVariable {
                name: name.to_string(),
            },
            span,
        )
    }

    pub fn undefined_function(name: &str, span: Span) -> Self {
        Self::new(
            TypeErrorKind::UndefinedFunction {
                name: name.to_string(),
            },
            span,
        )
    }

    pub fn binary_op_mismatch(op: &str, left: Ty, right: Ty, span: Span) -> Self {
        Self::new(
            TypeErrorKind::BinaryOpMismatch {
                op: op.to_string(),
                left,
                right,
            },
            span,
        )
    }

    pub fn wrong_arg_count(name: &str, expected: usize, found: usize, span: Span) -> Self {
        Self::new(
            TypeErrorKind::WrongArgCount {
                name: name.to_string(),
                expected,
                found,
            },
            span,
        )
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for TypeError {}

/// The kind of semantic error
#[derive(Debug, Clone, PartialEq)]
pub enum TypeErrorKind {
    /// Use of a name with no visible declaration
    UndefinedVariable { name: String },

    /// Assignment whose target has no visible declaration
    AssignToUndefined { name: String },

    /// Second declaration of a name in the same scope
    DuplicateVariable { name: String },

    /// Right-hand side not compatible with the variable's type
    AssignMismatch { name: String, target: Ty, found: Ty },

    /// `if` / `until` condition is not bool
    ConditionNotBool { construct: &'static str, found: Ty },

    BinaryOpMismatch { op: String, left: Ty, right: Ty },

    UnaryOpMismatch { op: String, ty: Ty },

    NotIndexable { ty: Ty },

    IndexNotInt { found: Ty },

    UndefinedFunction { name: String },

    WrongArgCount {
        name: String,
        expected: usize,
        found: usize,
    },

    ArgumentMismatch {
        name: String,
        position: usize,
        expected: Ty,
        found: Ty,
    },

    ReturnOutsideFunction,

    /// `return expr;` inside a void function
    ReturnValueInVoid { function: String },

    /// Bare `return;` inside a non-void function
    MissingReturnValue { function: String, expected: Ty },

    ReturnMismatch {
        function: String,
        expected: Ty,
        found: Ty,
    },

    /// Non-void function body can complete without `return`
    MissingReturn { function: String },

    DuplicateFunction { name: String },

    /// User function named like a built-in
    BuiltinRedefinition { name: String },

    RefParameter { param: String, function: String },

    VoidVariable { name: String },

    VoidParameter { name: String },

    /// `list<void>`
    VoidElementType,

    /// Type argument on something other than `list`
    UnexpectedTypeArgument { ty: String },

    VoidScrutinee,

    CaseLabelMismatch { label: Ty, scrutinee: Ty },

    DuplicateCaseLabel { label: String },
}

impl fmt::Display for TypeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeErrorKind::UndefinedVariable { name } => {
                write!(f, "undefined variable `{}`", name)
            }
            TypeErrorKind::AssignToUndefined { name } => {
                write!(f, "assignment to undefined variable `{}`", name)
            }
            TypeErrorKind::DuplicateVariable { name } => {
                write!(f, "variable `{}` is already declared in this scope", name)
            }
            TypeErrorKind::AssignMismatch {
                name,
                target,
                found,
            } => {
                write!(f, "cannot assign {} to {} variable `{}`", found, target, name)
            }
            TypeErrorKind::ConditionNotBool { construct, found } => {
                write!(f, "`{}` condition must be bool, found {}", construct, found)
            }
            TypeErrorKind::BinaryOpMismatch { op, left, right } => {
                write!(
                    f,
                    "operator `{}` cannot be applied to {} and {}",
                    op, left, right
                )
            }
            TypeErrorKind::UnaryOpMismatch { op, ty } => {
                write!(f, "operator `{}` cannot be applied to {}", op, ty)
            }
            TypeErrorKind::NotIndexable { ty } => {
                write!(f, "type {} cannot be indexed", ty)
            }
            TypeErrorKind::IndexNotInt { found } => {
                write!(f, "list index must be int, found {}", found)
            }
            TypeErrorKind::UndefinedFunction { name } => {
                write!(f, "undefined function `{}`", name)
            }
            TypeErrorKind::WrongArgCount {
                name,
                expected,
                found,
            } => {
                let plural = if *expected == 1 { "" } else { "s" };
                write!(
                    f,
                    "{} expects {} argument{}, got {}",
                    name, expected, plural, found
                )
            }
            TypeErrorKind::ArgumentMismatch {
                name,
                position,
                expected,
                found,
            } => {
                write!(
                    f,
                    "argument {} of `{}` expects {}, found {}",
                    position, name, expected, found
                )
            }
            TypeErrorKind::ReturnOutsideFunction => {
                write!(f, "`return` outside of a function")
            }
            TypeErrorKind::ReturnValueInVoid { function } => {
                write!(f, "void function `{}` cannot return a value", function)
            }
            TypeErrorKind::MissingReturnValue { function, expected } => {
                write!(
                    f,
                    "function `{}` must return a value of type {}",
                    function, expected
                )
            }
            TypeErrorKind::ReturnMismatch {
                function,
                expected,
                found,
            } => {
                write!(
                    f,
                    "function `{}` returns {}, found {}",
                    function, expected, found
                )
            }
            TypeErrorKind::MissingReturn { function } => {
                write!(
                    f,
                    "function `{}` may finish without returning a value",
                    function
                )
            }
            TypeErrorKind::DuplicateFunction { name } => {
                write!(f, "function `{}` is already defined", name)
            }
            TypeErrorKind::BuiltinRedefinition { name } => {
                write!(f, "cannot redefine built-in function `{}`", name)
            }
            TypeErrorKind::RefParameter { param, function } => {
                write!(
                    f,
                    "`ref` parameters are not supported (parameter `{}` of `{}`)",
                    param, function
                )
            }
            TypeErrorKind::VoidVariable { name } => {
                write!(f, "variable `{}` cannot have type void", name)
            }
            TypeErrorKind::VoidParameter { name } => {
                write!(f, "parameter `{}` cannot have type void", name)
            }
            TypeErrorKind::VoidElementType => {
                write!(f, "list element type cannot be void")
            }
            TypeErrorKind::UnexpectedTypeArgument { ty } => {
                write!(f, "type {} does not take a type argument", ty)
            }
            TypeErrorKind::VoidScrutinee => {
                write!(f, "cannot switch on a void expression")
            }
            TypeErrorKind::CaseLabelMismatch { label, scrutinee } => {
                write!(
                    f,
                    "case label of type {} does not match switch on {}",
                    label, scrutinee
                )
            }
            TypeErrorKind::DuplicateCaseLabel { label } => {
                write!(f, "duplicate case label `{}`", label)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = TypeError::wrong_arg_count("add_node", 2, 1, Span::default());
        assert_eq!(err.to_string(), "add_node expects 2 arguments, got 1");

        let err = TypeError::wrong_arg_count("abs", 1, 0, Span::default());
        assert_eq!(err.to_string(), "abs expects 1 argument, got 0");

        let err = TypeError::new(
            TypeErrorKind::AssignMismatch {
                name: "x".to_string(),
                target: Ty::Int,
                found: Ty::Str,
            },
            Span::default(),
        );
        assert_eq!(err.to_string(), "cannot assign string to int variable `x`");
    }
}
