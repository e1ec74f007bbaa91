//! Semantic Analyzer for GraphLang
//!
//! A single walk over the AST that resolves names against a stack of lexical
//! scopes, types every expression, and checks it against the compatibility
//! lattice in [`ty`]. Diagnostics accumulate; analysis never stops at the
//! first error. Expressions whose type cannot be determined get
//! [`Ty::Unknown`], which is compatible with everything so that a single
//! mistake is reported once.
//!
//! # Functions
//!
//! A function is registered in the global [`FunctionTable`] before its body is
//! analysed, so it may call itself. Its body is checked against a fresh scope
//! stack holding only its parameters: functions are lifted to the top level
//! of the host program, where the enclosing statements' locals do not exist.

mod builtins;
mod error;
mod scope;
mod ty;

pub use builtins::{builtin_signatures, DefineError, FnKind, FnSig, FunctionTable};
pub use error::{TypeError, TypeErrorKind};
pub use scope::{Scope, ScopeStack};
pub use ty::{comparable, compatible, Ty};

use crate::ast::*;
use crate::pretty::pretty_literal;
use crate::span::Span;
use std::collections::HashMap;

/// Main entry point for semantic analysis
pub fn check_program(program: &Program) -> Result<TypedProgram, Vec<TypeError>> {
    let mut analyzer = Analyzer::new();
    analyzer.check(program)
}

/// A checked program with resolved types
#[derive(Debug)]
pub struct TypedProgram {
    /// Map from expression spans to their types
    pub expr_types: HashMap<Span, Ty>,
    /// Built-ins and every user function
    pub functions: FunctionTable,
}

impl TypedProgram {
    /// Type of an expression, `Unknown` if it was never visited
    pub fn type_of(&self, expr: &Expr) -> Ty {
        self.expr_types.get(&expr.span).cloned().unwrap_or(Ty::Unknown)
    }
}

/// The function whose body is being analysed
#[derive(Debug, Clone)]
struct FnContext {
    name: String,
    ret: Ty,
}

/// Case labels compared by value, so `1` and `1.0` collide
#[derive(Debug, Clone, PartialEq)]
enum LabelKey {
    Num(f64),
    Str(String),
    Bool(bool),
    Null,
}

impl LabelKey {
    fn of(literal: &Literal) -> Self {
        match literal {
            Literal::Int(n) => LabelKey::Num(f64::from(*n)),
            Literal::Float(text) => LabelKey::Num(text.parse().unwrap_or(f64::NAN)),
            Literal::Str(s) => LabelKey::Str(s.clone()),
            Literal::Bool(b) => LabelKey::Bool(*b),
            Literal::Null => LabelKey::Null,
        }
    }
}

/// The semantic analyzer
pub struct Analyzer {
    scopes: ScopeStack,
    functions: FunctionTable,
    expr_types: HashMap<Span, Ty>,
    current_fn: Option<FnContext>,
    errors: Vec<TypeError>,
}

impl Analyzer {
    pub fn new() -> Self {
        Self {
            scopes: ScopeStack::new(),
            functions: FunctionTable::with_builtins(),
            expr_types: HashMap::new(),
            current_fn: None,
            errors: Vec::new(),
        }
    }

    /// Check a complete program
    pub fn check(&mut self, program: &Program) -> Result<TypedProgram, Vec<TypeError>> {
        for stmt in &program.stmts {
            self.check_stmt(stmt);
        }

        if self.errors.is_empty() {
            Ok(TypedProgram {
                expr_types: std::mem::take(&mut self.expr_types),
                functions: self.functions.clone(),
            })
        } else {
            Err(std::mem::take(&mut self.errors))
        }
    }

    fn error(&mut self, kind: TypeErrorKind, span: Span) {
        self.errors.push(TypeError::new(kind, span));
    }

    /// Resolve a written type, reporting problems and falling back to `Unknown`
    fn resolve(&mut self, ty: &TypeExpr) -> Ty {
        match Ty::from_type_expr(ty) {
            Ok(ty) => ty,
            Err(e) => {
                self.errors.push(e);
                Ty::Unknown
            }
        }
    }

    // ============ Statements ============

    fn check_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Decl { ty, name } => {
                let mut resolved = self.resolve(ty);
                if resolved.is_void() {
                    self.error(
                        TypeErrorKind::VoidVariable {
                            name: name.name.clone(),
                        },
                        ty.span,
                    );
                    resolved = Ty::Unknown;
                }
                self.declare(name, resolved);
            }

            StmtKind::Assign { target, value } => {
                let value_ty = self.check_expr(value);
                match self.scopes.lookup(&target.name).cloned() {
                    None => self.error(
                        TypeErrorKind::AssignToUndefined {
                            name: target.name.clone(),
                        },
                        target.span,
                    ),
                    Some(target_ty) => {
                        if !compatible(&target_ty, &value_ty) {
                            self.error(
                                TypeErrorKind::AssignMismatch {
                                    name: target.name.clone(),
                                    target: target_ty,
                                    found: value_ty,
                                },
                                value.span,
                            );
                        }
                    }
                }
            }

            StmtKind::If {
                cond,
                then_block,
                else_block,
            } => {
                self.check_condition("if", cond);
                self.check_block(&then_block.stmts);
                if let Some(else_block) = else_block {
                    self.check_block(&else_block.stmts);
                }
            }

            StmtKind::Switch {
                scrutinee,
                cases,
                default,
            } => self.check_switch(scrutinee, cases, default.as_ref()),

            StmtKind::Until { cond, body } => {
                self.check_condition("until", cond);
                self.check_block(&body.stmts);
            }

            StmtKind::Function(f) => self.check_function(f),

            StmtKind::Return(value) => self.check_return(value.as_ref(), stmt.span),

            StmtKind::Expr(expr) => {
                self.check_expr(expr);
            }
        }
    }

    fn declare(&mut self, name: &Ident, ty: Ty) {
        if !self.scopes.declare(&name.name, ty) {
            self.error(
                TypeErrorKind::DuplicateVariable {
                    name: name.name.clone(),
                },
                name.span,
            );
        }
    }

    /// Statements in their own scope
    fn check_block(&mut self, stmts: &[Stmt]) {
        self.scopes.push_scope();
        for stmt in stmts {
            self.check_stmt(stmt);
        }
        self.scopes.pop_scope();
    }

    fn check_condition(&mut self, construct: &'static str, cond: &Expr) {
        let ty = self.check_expr(cond);
        if !matches!(ty, Ty::Bool | Ty::Unknown) {
            self.error(TypeErrorKind::ConditionNotBool { construct, found: ty }, cond.span);
        }
    }

    fn check_switch(&mut self, scrutinee: &Expr, cases: &[Case], default: Option<&DefaultCase>) {
        let scrutinee_ty = self.check_expr(scrutinee);
        if scrutinee_ty.is_void() {
            self.error(TypeErrorKind::VoidScrutinee, scrutinee.span);
        }

        let mut seen: Vec<LabelKey> = Vec::new();
        for case in cases {
            let label_ty = literal_type(&case.label);
            if !scrutinee_ty.is_void() && !compatible(&scrutinee_ty, &label_ty) {
                self.error(
                    TypeErrorKind::CaseLabelMismatch {
                        label: label_ty,
                        scrutinee: scrutinee_ty.clone(),
                    },
                    case.label_span,
                );
            }

            let key = LabelKey::of(&case.label);
            if seen.contains(&key) {
                self.error(
                    TypeErrorKind::DuplicateCaseLabel {
                        label: pretty_literal(&case.label),
                    },
                    case.label_span,
                );
            } else {
                seen.push(key);
            }

            self.check_block(&case.body);
        }

        if let Some(default) = default {
            self.check_block(&default.body);
        }
    }

    fn check_function(&mut self, f: &FnDef) {
        let ret = self.resolve(&f.return_type);

        let mut params = Vec::with_capacity(f.params.len());
        for param in &f.params {
            if param.is_ref {
                self.error(
                    TypeErrorKind::RefParameter {
                        param: param.name.name.clone(),
                        function: f.name.name.clone(),
                    },
                    param.span,
                );
            }
            let mut ty = self.resolve(&param.ty);
            if ty.is_void() {
                self.error(
                    TypeErrorKind::VoidParameter {
                        name: param.name.name.clone(),
                    },
                    param.ty.span,
                );
                ty = Ty::Unknown;
            }
            params.push(ty);
        }

        // Registered before the body so that recursion resolves.
        match self.functions.define(&f.name.name, FnSig::user(params.clone(), ret.clone())) {
            Ok(()) => {}
            Err(DefineError::Builtin) => self.error(
                TypeErrorKind::BuiltinRedefinition {
                    name: f.name.name.clone(),
                },
                f.name.span,
            ),
            Err(DefineError::Duplicate) => self.error(
                TypeErrorKind::DuplicateFunction {
                    name: f.name.name.clone(),
                },
                f.name.span,
            ),
        }

        let outer_scopes = std::mem::replace(&mut self.scopes, ScopeStack::new());
        let outer_fn = self.current_fn.replace(FnContext {
            name: f.name.name.clone(),
            ret: ret.clone(),
        });

        self.scopes.push_scope();
        for (param, ty) in f.params.iter().zip(params) {
            self.declare(&param.name, ty);
        }
        for stmt in &f.body.stmts {
            self.check_stmt(stmt);
        }

        self.scopes = outer_scopes;
        self.current_fn = outer_fn;

        if !ret.is_void() && !ret.is_unknown() && !stmts_definitely_return(&f.body.stmts) {
            self.error(
                TypeErrorKind::MissingReturn {
                    function: f.name.name.clone(),
                },
                f.name.span,
            );
        }
    }

    fn check_return(&mut self, value: Option<&Expr>, span: Span) {
        let value_ty = value.map(|v| (self.check_expr(v), v.span));

        let Some(ctx) = self.current_fn.clone() else {
            self.error(TypeErrorKind::ReturnOutsideFunction, span);
            return;
        };

        match (ctx.ret.is_void(), value_ty) {
            (true, None) => {}
            (true, Some((_, value_span))) => {
                self.error(TypeErrorKind::ReturnValueInVoid { function: ctx.name }, value_span)
            }
            (false, None) => self.error(
                TypeErrorKind::MissingReturnValue {
                    function: ctx.name,
                    expected: ctx.ret,
                },
                span,
            ),
            (false, Some((found, value_span))) => {
                if !compatible(&ctx.ret, &found) {
                    self.error(
                        TypeErrorKind::ReturnMismatch {
                            function: ctx.name,
                            expected: ctx.ret,
                            found,
                        },
                        value_span,
                    );
                }
            }
        }
    }

    // ============ Expressions ============

    /// Type an expression and record the result
    fn check_expr(&mut self, expr: &Expr) -> Ty {
        let ty = self.infer_expr(expr);
        self.expr_types.insert(expr.span, ty.clone());
        ty
    }

    fn infer_expr(&mut self, expr: &Expr) -> Ty {
        match &expr.kind {
            ExprKind::Literal(literal) => literal_type(literal),

            ExprKind::Ident(ident) => match self.scopes.lookup(&ident.name) {
                Some(ty) => ty.clone(),
                None => {
                    self.errors
                        .push(TypeError::undefined_variable(&ident.name, ident.span));
                    Ty::Unknown
                }
            },

            ExprKind::Paren(inner) => self.check_expr(inner),

            ExprKind::Unary { op, operand } => {
                let ty = self.check_expr(operand);
                if !matches!(ty, Ty::Bool | Ty::Unknown) {
                    self.error(
                        TypeErrorKind::UnaryOpMismatch {
                            op: op.as_str().to_string(),
                            ty,
                        },
                        expr.span,
                    );
                }
                Ty::Bool
            }

            ExprKind::Binary { op, left, right } => {
                let left_ty = self.check_expr(left);
                let right_ty = self.check_expr(right);
                match binary_result(*op, &left_ty, &right_ty) {
                    Some(ty) => ty,
                    None => {
                        self.errors.push(TypeError::binary_op_mismatch(
                            op.as_str(),
                            left_ty,
                            right_ty,
                            expr.span,
                        ));
                        binary_fallback(*op)
                    }
                }
            }

            ExprKind::Index { base, index } => {
                let base_ty = self.check_expr(base);
                let index_ty = self.check_expr(index);
                if !matches!(index_ty, Ty::Int | Ty::Unknown) {
                    self.error(TypeErrorKind::IndexNotInt { found: index_ty }, index.span);
                }
                match base_ty.element_type() {
                    Some(elem) => elem,
                    None => {
                        self.error(TypeErrorKind::NotIndexable { ty: base_ty }, base.span);
                        Ty::Unknown
                    }
                }
            }

            ExprKind::Call { callee, args } => self.check_call(callee, args, expr.span),
        }
    }

    fn check_call(&mut self, callee: &Ident, args: &[Expr], span: Span) -> Ty {
        let arg_types: Vec<Ty> = args.iter().map(|arg| self.check_expr(arg)).collect();

        let Some(sig) = self.functions.lookup(&callee.name).cloned() else {
            self.errors
                .push(TypeError::undefined_function(&callee.name, callee.span));
            return Ty::Unknown;
        };

        if sig.params.len() != args.len() {
            self.errors.push(TypeError::wrong_arg_count(
                &callee.name,
                sig.params.len(),
                args.len(),
                span,
            ));
            return sig.ret;
        }

        for (position, ((param, found), arg)) in sig.params.iter().zip(arg_types).zip(args).enumerate() {
            if !compatible(param, &found) {
                self.error(
                    TypeErrorKind::ArgumentMismatch {
                        name: callee.name.clone(),
                        position: position + 1,
                        expected: param.clone(),
                        found,
                    },
                    arg.span,
                );
            }
        }

        sig.ret
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Type of a literal
pub fn literal_type(literal: &Literal) -> Ty {
    match literal {
        Literal::Int(_) => Ty::Int,
        Literal::Float(_) => Ty::Float,
        Literal::Str(_) => Ty::Str,
        Literal::Bool(_) => Ty::Bool,
        Literal::Null => Ty::Null,
    }
}

/// Result type of a well-typed binary operation, `None` if ill-typed
fn binary_result(op: BinaryOp, left: &Ty, right: &Ty) -> Option<Ty> {
    let bool_or_unknown = |ty: &Ty| matches!(ty, Ty::Bool | Ty::Unknown);
    let numeric_or_unknown = |ty: &Ty| ty.is_numeric() || ty.is_unknown();

    match op {
        BinaryOp::Or => (bool_or_unknown(left) && bool_or_unknown(right)).then_some(Ty::Bool),
        BinaryOp::Eq | BinaryOp::Ne => comparable(left, right).then_some(Ty::Bool),
        BinaryOp::Ge | BinaryOp::Gt => {
            (numeric_or_unknown(left) && numeric_or_unknown(right)).then_some(Ty::Bool)
        }
        BinaryOp::Add | BinaryOp::Sub => match (left, right) {
            (Ty::Int, Ty::Int) => Some(Ty::Int),
            (Ty::Int | Ty::Float, Ty::Int | Ty::Float) => Some(Ty::Float),
            // Untyped list elements in arithmetic are taken to be ints.
            (Ty::Unknown, Ty::Unknown) => Some(Ty::Int),
            (Ty::Unknown, known) | (known, Ty::Unknown) if known.is_numeric() => Some(known.clone()),
            _ => None,
        },
    }
}

/// Type assumed for an ill-typed binary operation
fn binary_fallback(op: BinaryOp) -> Ty {
    match op {
        BinaryOp::Add | BinaryOp::Sub => Ty::Unknown,
        _ => Ty::Bool,
    }
}
