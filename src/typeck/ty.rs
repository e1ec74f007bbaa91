//! Semantic Type Representation for GraphLang
//!
//! These types are distinct from the AST's [`TypeExpr`]: they are resolved,
//! canonical, and include the internal `null` and `unknown` types that never
//! appear in source.
//!
//! # The compatibility lattice
//!
//! [`compatible`] is the single relation used for assignment, argument
//! passing, return values, comparisons and switch labels. It is reflexive and
//! additionally admits:
//! - `int` where `float` is expected (widening)
//! - `null` where a reference type (`graph`, `node`, `arc`, any list) is expected
//! - bare `list` and `list<T>` in either direction (outermost level only)
//! - `unknown` on either side, so one error does not cascade into many

use crate::ast::{SimpleType, TypeExpr, TypeExprKind};
use crate::typeck::error::{TypeError, TypeErrorKind};
use std::fmt;

/// A resolved GraphLang type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Ty {
    Int,
    Bool,
    Float,
    Str,
    Graph,
    Node,
    Arc,
    /// `list<T>`, or bare `list` when the element type is `None`
    List(Option<Box<Ty>>),
    Void,
    /// Type of the `null` literal
    Null,
    /// Error-recovery sentinel, and the element type of a bare `list`
    Unknown,
}

impl Ty {
    pub fn list_of(elem: Ty) -> Self {
        Ty::List(Some(Box::new(elem)))
    }

    pub fn bare_list() -> Self {
        Ty::List(None)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Ty::Int | Ty::Float)
    }

    /// Types whose host values are object references that may be `null`
    pub fn is_reference(&self) -> bool {
        matches!(self, Ty::Graph | Ty::Node | Ty::Arc | Ty::List(_))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Ty::Unknown)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Ty::Void)
    }

    /// Result type of indexing a value of this type, if it can be indexed
    pub fn element_type(&self) -> Option<Ty> {
        match self {
            Ty::List(Some(elem)) => Some((**elem).clone()),
            Ty::List(None) | Ty::Unknown => Some(Ty::Unknown),
            _ => None,
        }
    }

    /// Resolve a type written in source.
    pub fn from_type_expr(ty: &TypeExpr) -> Result<Ty, TypeError> {
        match &ty.kind {
            TypeExprKind::Void => Ok(Ty::Void),
            TypeExprKind::Simple(simple) => Ok(Self::from_simple(*simple)),
            TypeExprKind::Generic {
                base: SimpleType::List,
                arg,
            } => {
                let elem = Self::from_type_expr(arg)?;
                if elem.is_void() {
                    return Err(TypeError::new(TypeErrorKind::VoidElementType, arg.span));
                }
                Ok(Ty::list_of(elem))
            }
            TypeExprKind::Generic { base, .. } => Err(TypeError::new(
                TypeErrorKind::UnexpectedTypeArgument {
                    ty: base.as_str().to_string(),
                },
                ty.span,
            )),
        }
    }

    fn from_simple(simple: SimpleType) -> Ty {
        match simple {
            SimpleType::Graph => Ty::Graph,
            SimpleType::Node => Ty::Node,
            SimpleType::Arc => Ty::Arc,
            SimpleType::List => Ty::bare_list(),
            SimpleType::Int => Ty::Int,
            SimpleType::Bool => Ty::Bool,
            SimpleType::Float => Ty::Float,
            SimpleType::String => Ty::Str,
        }
    }
}

/// Whether a value of type `source` may be stored where `target` is expected
pub fn compatible(target: &Ty, source: &Ty) -> bool {
    match (target, source) {
        (Ty::Unknown, _) | (_, Ty::Unknown) => true,
        (Ty::Float, Ty::Int) => true,
        (t, Ty::Null) if t.is_reference() => true,
        (Ty::List(target_elem), Ty::List(source_elem)) => match (target_elem, source_elem) {
            (Some(t), Some(s)) => elements_match(t, s),
            _ => true,
        },
        (t, s) => t == s,
    }
}

/// List element types must agree exactly, modulo `unknown`: host generics
/// are invariant, so neither widening nor bare/typed interchange applies
/// below the outermost list.
fn elements_match(a: &Ty, b: &Ty) -> bool {
    match (a, b) {
        (Ty::Unknown, _) | (_, Ty::Unknown) => true,
        (Ty::List(Some(x)), Ty::List(Some(y))) => elements_match(x, y),
        (x, y) => x == y,
    }
}

/// Whether two operands may be compared with `==` / `!=`
pub fn comparable(a: &Ty, b: &Ty) -> bool {
    !a.is_void() && !b.is_void() && (compatible(a, b) || compatible(b, a))
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Int => write!(f, "int"),
            Ty::Bool => write!(f, "bool"),
            Ty::Float => write!(f, "float"),
            Ty::Str => write!(f, "string"),
            Ty::Graph => write!(f, "graph"),
            Ty::Node => write!(f, "node"),
            Ty::Arc => write!(f, "arc"),
            Ty::List(Some(elem)) => write!(f, "list<{}>", elem),
            Ty::List(None) => write!(f, "list"),
            Ty::Void => write!(f, "void"),
            Ty::Null => write!(f, "null"),
            Ty::Unknown => write!(f, "unknown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::ast::StmtKind;

    fn resolve(source: &str) -> Result<Ty, TypeError> {
        let (program, errors) = parse(&format!("{} x;", source));
        assert!(errors.is_empty(), "{:?}", errors);
        match &program.stmts[0].kind {
            StmtKind::Decl { ty, .. } => Ty::from_type_expr(ty),
            other => panic!("Expected declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_reflexive() {
        for ty in [Ty::Int, Ty::Bool, Ty::Float, Ty::Str, Ty::Graph, Ty::Node, Ty::Arc] {
            assert!(compatible(&ty, &ty));
        }
        assert!(compatible(&Ty::list_of(Ty::Node), &Ty::list_of(Ty::Node)));
    }

    #[test]
    fn test_int_widens_to_float_only() {
        assert!(compatible(&Ty::Float, &Ty::Int));
        assert!(!compatible(&Ty::Int, &Ty::Float));
        assert!(!compatible(&Ty::list_of(Ty::Float), &Ty::list_of(Ty::Int)));
    }

    #[test]
    fn test_null_to_reference() {
        for ty in [Ty::Graph, Ty::Node, Ty::Arc, Ty::bare_list(), Ty::list_of(Ty::Int)] {
            assert!(compatible(&ty, &Ty::Null));
        }
        for ty in [Ty::Int, Ty::Bool, Ty::Float, Ty::Str] {
            assert!(!compatible(&ty, &Ty::Null));
        }
    }

    #[test]
    fn test_bare_list_interchange() {
        assert!(compatible(&Ty::bare_list(), &Ty::list_of(Ty::Arc)));
        assert!(compatible(&Ty::list_of(Ty::Arc), &Ty::bare_list()));
        assert!(!compatible(&Ty::list_of(Ty::Arc), &Ty::list_of(Ty::Node)));
        assert!(!compatible(
            &Ty::list_of(Ty::bare_list()),
            &Ty::list_of(Ty::list_of(Ty::Int))
        ));
        assert!(compatible(
            &Ty::list_of(Ty::bare_list()),
            &Ty::list_of(Ty::bare_list())
        ));
    }

    #[test]
    fn test_unknown_swallows() {
        assert!(compatible(&Ty::Int, &Ty::Unknown));
        assert!(compatible(&Ty::Unknown, &Ty::Str));
        assert!(compatible(&Ty::Void, &Ty::Unknown));
    }

    #[test]
    fn test_comparable() {
        assert!(comparable(&Ty::Int, &Ty::Float));
        assert!(comparable(&Ty::Node, &Ty::Null));
        assert!(!comparable(&Ty::Str, &Ty::Int));
        assert!(!comparable(&Ty::Void, &Ty::Void));
    }

    #[test]
    fn test_element_type() {
        assert_eq!(Ty::list_of(Ty::Node).element_type(), Some(Ty::Node));
        assert_eq!(Ty::bare_list().element_type(), Some(Ty::Unknown));
        assert_eq!(Ty::Int.element_type(), None);
    }

    #[test]
    fn test_resolve_type_expr() {
        assert_eq!(resolve("list<list<float>>").ok(), Some(Ty::list_of(Ty::list_of(Ty::Float))));
        assert_eq!(resolve("string").ok(), Some(Ty::Str));
        assert!(matches!(
            resolve("int<node>").map_err(|e| e.kind),
            Err(TypeErrorKind::UnexpectedTypeArgument { .. })
        ));
        assert!(matches!(
            resolve("list<void>").map_err(|e| e.kind),
            Err(TypeErrorKind::VoidElementType)
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(Ty::list_of(Ty::Node).to_string(), "list<node>");
        assert_eq!(Ty::bare_list().to_string(), "list");
        assert_eq!(Ty::Str.to_string(), "string");
    }
}
