//! Java code generation
//!
//! Translates a checked program into a single Java compilation unit:
//!
//! 1. the runtime types `Node`, `Arc` and `Graph` (top-level, package-private)
//! 2. the program class, holding the built-ins as static methods
//! 3. every user function, lifted to a static method in definition order
//! 4. `main`, holding the program's top-level statements
//!
//! Java is stricter than GraphLang in a few places, so the emitter also:
//! - renames locals that would shadow a visible local (`x` becomes `x$1`),
//!   and identifiers that are Java reserved words (`class` becomes `class$`)
//! - drops statements that follow a definite `return` in the same block
//! - lowers `until` to `while (true)` with a leading exit test
//! - casts values of unknown type (elements of a bare `list`) to the type
//!   their context expects
//!
//! GraphLang identifiers cannot contain `$`, so names with `$` never clash
//! with user names.

use crate::ast::*;
use crate::typeck::{FnKind, Ty, TypedProgram};
use std::collections::HashMap;
use std::path::Path;

/// Graph, Node and Arc
const RUNTIME_TYPES: &str = include_str!("runtime/types.java");

/// Static built-ins, already indented for the class body
const RUNTIME_BUILTINS: &str = include_str!("runtime/builtins.java");

/// Java keywords, literals and restricted identifiers, plus the methods of
/// `java.lang.Object`, which a static method must not hide.
const JAVA_RESERVED: &[&str] = &[
    "_", "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class",
    "clone", "const", "continue", "default", "do", "double", "else", "enum", "equals",
    "extends", "false", "final", "finalize", "finally", "float", "for", "getClass", "goto",
    "hashCode", "if", "implements", "import", "instanceof", "int", "interface", "long",
    "native", "new", "notify", "notifyAll", "null", "package", "permits", "private",
    "protected", "public", "record", "return", "sealed", "short", "static", "strictfp",
    "super", "switch", "synchronized", "this", "throw", "throws", "toString", "transient",
    "true", "try", "var", "void", "volatile", "wait", "while", "yield",
];

/// Type names the generated file refers to; the program class must not
/// take one of them.
const HOST_TYPE_NAMES: &[&str] = &[
    "Arc", "ArrayDeque", "ArrayList", "BufferedReader", "Boolean", "Collections", "Deque",
    "Double", "FileDescriptor", "FileOutputStream", "Graph", "HashMap", "HashSet",
    "IOException", "InputStreamReader", "Integer", "LinkedHashMap", "List", "Map", "Math",
    "Node", "Number", "Object", "Objects", "PrintStream", "Set", "String", "System",
    "UncheckedIOException",
];

/// Default name of the generated class
pub const DEFAULT_CLASS_NAME: &str = "GeneratedGraphProgram";

/// Generate Java source for a checked program
pub fn emit_program(program: &Program, typed: &TypedProgram, class_name: &str) -> String {
    JavaEmitter::new(typed).emit(program, class_name)
}

/// Java class name for an output file: its stem, made a valid identifier
pub fn class_name_for(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut name: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '$' { c } else { '_' })
        .collect();

    if name.is_empty() {
        return DEFAULT_CLASS_NAME.to_string();
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    if JAVA_RESERVED.contains(&name.as_str()) || HOST_TYPE_NAMES.contains(&name.as_str()) {
        name.push_str("Program");
    }
    name
}

/// Host spelling of a GraphLang identifier
pub fn host_ident(name: &str) -> String {
    if JAVA_RESERVED.contains(&name) {
        format!("{}$", name)
    } else {
        name.to_string()
    }
}

/// Java type for a GraphLang type
pub fn java_type(ty: &Ty) -> String {
    match ty {
        Ty::Int => "int".to_string(),
        Ty::Bool => "boolean".to_string(),
        Ty::Float => "double".to_string(),
        Ty::Str => "String".to_string(),
        Ty::Graph => "Graph".to_string(),
        Ty::Node => "Node".to_string(),
        Ty::Arc => "Arc".to_string(),
        Ty::List(Some(elem)) => format!("List<{}>", boxed_type(elem)),
        Ty::List(None) => "List".to_string(),
        Ty::Void => "void".to_string(),
        Ty::Null | Ty::Unknown => "Object".to_string(),
    }
}

/// Java reference type for a GraphLang type (used for list elements and casts)
pub fn boxed_type(ty: &Ty) -> String {
    match ty {
        Ty::Int => "Integer".to_string(),
        Ty::Bool => "Boolean".to_string(),
        Ty::Float => "Double".to_string(),
        other => java_type(other),
    }
}

/// Initial value of a declared variable
fn default_value(ty: &Ty) -> &'static str {
    match ty {
        Ty::Int => "0",
        Ty::Bool => "false",
        Ty::Float => "0.0",
        Ty::Str => "\"\"",
        Ty::List(_) => "new ArrayList<>()",
        _ => "null",
    }
}

/// Java string literal; non-printable characters use octal escapes
pub fn java_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                out.push_str(&format!("\\{:03o}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn java_literal(literal: &Literal) -> String {
    match literal {
        Literal::Int(n) => n.to_string(),
        Literal::Float(text) => text.clone(),
        Literal::Str(s) => java_string(s),
        Literal::Bool(b) => b.to_string(),
        Literal::Null => "null".to_string(),
    }
}

/// Cast an expression of unknown type to `target`
fn cast_unknown(code: String, target: &Ty) -> String {
    match target {
        Ty::Unknown | Ty::Void | Ty::Null => code,
        Ty::Float => format!("((Number)({})).doubleValue()", code),
        other => format!("(({})({}))", boxed_type(other), code),
    }
}

/// Function definitions in pre-order, nested ones included
fn collect_functions<'p>(stmts: &'p [Stmt], out: &mut Vec<&'p FnDef>) {
    for stmt in stmts {
        match &stmt.kind {
            StmtKind::Function(f) => {
                out.push(f);
                collect_functions(&f.body.stmts, out);
            }
            StmtKind::If {
                then_block,
                else_block,
                ..
            } => {
                collect_functions(&then_block.stmts, out);
                if let Some(else_block) = else_block {
                    collect_functions(&else_block.stmts, out);
                }
            }
            StmtKind::Switch { cases, default, .. } => {
                for case in cases {
                    collect_functions(&case.body, out);
                }
                if let Some(default) = default {
                    collect_functions(&default.body, out);
                }
            }
            StmtKind::Until { body, .. } => collect_functions(&body.stmts, out),
            _ => {}
        }
    }
}

/// A local variable of the method being emitted
#[derive(Debug, Clone)]
struct Local {
    host: String,
    ty: Ty,
}

/// Emits one Java method at a time
pub struct JavaEmitter<'a> {
    typed: &'a TypedProgram,
    output: String,
    indent: usize,
    /// GraphLang name to local, one frame per open block
    scopes: Vec<HashMap<String, Local>>,
    /// Last suffix used per name in the current method
    renames: HashMap<String, usize>,
    temp_count: usize,
    return_type: Option<Ty>,
}

impl<'a> JavaEmitter<'a> {
    pub fn new(typed: &'a TypedProgram) -> Self {
        Self {
            typed,
            output: String::new(),
            indent: 0,
            scopes: Vec::new(),
            renames: HashMap::new(),
            temp_count: 0,
            return_type: None,
        }
    }

    /// Generate the whole compilation unit
    pub fn emit(mut self, program: &Program, class_name: &str) -> String {
        let mut functions = Vec::new();
        collect_functions(&program.stmts, &mut functions);

        let methods: Vec<String> = functions.iter().map(|f| self.emit_function(f)).collect();
        let main = self.emit_main(&program.stmts);

        let mut out = String::new();
        out.push_str(&format!(
            "// Generated by glc {}. Do not edit.\n\n",
            crate::VERSION
        ));
        out.push_str("import java.io.*;\nimport java.util.*;\n\n");
        out.push_str(RUNTIME_TYPES);
        out.push('\n');
        out.push_str(&format!("final class {} {{\n", class_name));
        out.push_str(RUNTIME_BUILTINS);
        for method in methods {
            out.push('\n');
            out.push_str(&method);
        }
        out.push('\n');
        out.push_str(&main);
        out.push_str("}\n");
        out
    }

    // ============ Output helpers ============

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.output.push_str("    ");
        }
        self.output.push_str(text);
        self.output.push('\n');
    }

    fn begin_method(&mut self, return_type: Option<Ty>) {
        self.output.clear();
        self.indent = 1;
        self.scopes = vec![HashMap::new()];
        self.renames.clear();
        self.temp_count = 0;
        self.return_type = return_type;
    }

    fn finish_method(&mut self) -> String {
        std::mem::take(&mut self.output)
    }

    // ============ Locals ============

    fn lookup_local(&self, name: &str) -> Option<&Local> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Bind a GraphLang local in the innermost frame and pick its Java name
    fn declare_local(&mut self, name: &str, ty: Ty) -> String {
        let base = host_ident(name);
        let host = if self.lookup_local(name).is_some() {
            let count = self.renames.entry(name.to_string()).or_insert(0);
            *count += 1;
            format!("{}${}", base, count)
        } else {
            base
        };

        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(
                name.to_string(),
                Local {
                    host: host.clone(),
                    ty,
                },
            );
        }
        host
    }

    fn fresh_temp(&mut self, prefix: &str) -> String {
        let name = format!("{}${}", prefix, self.temp_count);
        self.temp_count += 1;
        name
    }

    // ============ Methods ============

    fn emit_function(&mut self, f: &FnDef) -> String {
        let ret = Ty::from_type_expr(&f.return_type).unwrap_or(Ty::Unknown);
        self.begin_method(Some(ret.clone()));

        let params: Vec<String> = f
            .params
            .iter()
            .map(|p| {
                let ty = Ty::from_type_expr(&p.ty).unwrap_or(Ty::Unknown);
                let java = java_type(&ty);
                format!("{} {}", java, self.declare_local(&p.name.name, ty))
            })
            .collect();

        self.line(&format!(
            "static {} {}({}) {{",
            java_type(&ret),
            host_ident(&f.name.name),
            params.join(", ")
        ));
        self.indent += 1;
        self.emit_stmts(&f.body.stmts);
        self.indent -= 1;
        self.line("}");
        self.finish_method()
    }

    fn emit_main(&mut self, stmts: &[Stmt]) -> String {
        self.begin_method(None);
        self.line("public static void main(String[] args$) {");
        self.indent += 1;
        self.emit_stmts(stmts);
        self.indent -= 1;
        self.line("}");
        self.finish_method()
    }

    // ============ Statements ============

    /// Emit a statement list, stopping after a statement that always returns
    fn emit_stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.emit_stmt(stmt);
            if stmt.definitely_returns() {
                break;
            }
        }
    }

    /// A braced body: one level deeper, in a fresh frame
    fn emit_nested(&mut self, stmts: &[Stmt]) {
        self.indent += 1;
        self.scopes.push(HashMap::new());
        self.emit_stmts(stmts);
        self.scopes.pop();
        self.indent -= 1;
    }

    fn emit_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Decl { ty, name } => {
                let ty = Ty::from_type_expr(ty).unwrap_or(Ty::Unknown);
                let java = java_type(&ty);
                let default = default_value(&ty);
                let host = self.declare_local(&name.name, ty);
                self.line(&format!("{} {} = {};", java, host, default));
            }

            StmtKind::Assign { target, value } => {
                let (host, ty) = match self.lookup_local(&target.name) {
                    Some(local) => (local.host.clone(), local.ty.clone()),
                    None => (host_ident(&target.name), Ty::Unknown),
                };
                let value = self.emit_expr_as(value, &ty);
                self.line(&format!("{} = {};", host, value));
            }

            StmtKind::If {
                cond,
                then_block,
                else_block,
            } => {
                let cond = self.emit_expr_as(cond, &Ty::Bool);
                self.line(&format!("if ({}) {{", cond));
                self.emit_nested(&then_block.stmts);
                if let Some(else_block) = else_block {
                    self.line("} else {");
                    self.emit_nested(&else_block.stmts);
                }
                self.line("}");
            }

            StmtKind::Switch {
                scrutinee,
                cases,
                default,
            } => self.emit_switch(scrutinee, cases, default.as_ref()),

            StmtKind::Until { cond, body } => {
                let cond = self.emit_expr_as(cond, &Ty::Bool);
                self.line("while (true) {");
                self.indent += 1;
                self.line(&format!("if ({}) {{", cond));
                self.indent += 1;
                self.line("break;");
                self.indent -= 1;
                self.line("}");
                self.indent -= 1;
                self.emit_nested(&body.stmts);
                self.line("}");
            }

            // Lifted to a method of its own.
            StmtKind::Function(_) => {}

            StmtKind::Return(None) => self.line("return;"),

            StmtKind::Return(Some(value)) => {
                let ty = self.return_type.clone().unwrap_or(Ty::Unknown);
                let value = self.emit_expr_as(value, &ty);
                self.line(&format!("return {};", value));
            }

            StmtKind::Expr(expr) => {
                let expr = expr.strip_parens();
                let code = self.emit_expr(expr);
                if matches!(expr.kind, ExprKind::Call { .. }) {
                    self.line(&format!("{};", code));
                } else {
                    self.line(&format!("ignore$({});", code));
                }
            }
        }
    }

    /// `switch` becomes an if / else-if cascade over a temporary holding
    /// the scrutinee
    fn emit_switch(&mut self, scrutinee: &Expr, cases: &[Case], default: Option<&DefaultCase>) {
        let ty = self.typed.type_of(scrutinee);
        let temp = self.fresh_temp("switch");
        let value = self.emit_expr(scrutinee);
        self.line(&format!("{} {} = {};", java_type(&ty), temp, value));

        let primitive = matches!(ty, Ty::Int | Ty::Float | Ty::Bool);
        for (i, case) in cases.iter().enumerate() {
            let label = java_literal(&case.label);
            let test = if primitive {
                format!("{} == {}", temp, label)
            } else {
                format!("eq$({}, {})", temp, label)
            };
            if i == 0 {
                self.line(&format!("if ({}) {{", test));
            } else {
                self.line(&format!("}} else if ({}) {{", test));
            }
            self.emit_nested(&case.body);
        }

        match default {
            Some(default) if cases.is_empty() => {
                self.line("{");
                self.emit_nested(&default.body);
                self.line("}");
            }
            Some(default) => {
                self.line("} else {");
                self.emit_nested(&default.body);
                self.line("}");
            }
            None if !cases.is_empty() => self.line("}"),
            None => {}
        }
    }

    // ============ Expressions ============

    /// Emit an expression for a context expecting `target`
    fn emit_expr_as(&self, expr: &Expr, target: &Ty) -> String {
        let code = self.emit_expr(expr);
        if self.typed.type_of(expr).is_unknown() {
            cast_unknown(code, target)
        } else {
            code
        }
    }

    fn emit_expr(&self, expr: &Expr) -> String {
        match &expr.kind {
            ExprKind::Literal(literal) => java_literal(literal),

            ExprKind::Ident(ident) => match self.lookup_local(&ident.name) {
                Some(local) => local.host.clone(),
                None => host_ident(&ident.name),
            },

            ExprKind::Paren(inner) => format!("({})", self.emit_expr(inner)),

            ExprKind::Unary { op, operand } => {
                format!("({}{})", op.as_str(), self.emit_expr_as(operand, &Ty::Bool))
            }

            ExprKind::Binary { op, left, right } => {
                let left_ty = self.typed.type_of(left);
                let right_ty = self.typed.type_of(right);

                let (l, r) = match op {
                    BinaryOp::Or => (
                        self.emit_expr_as(left, &Ty::Bool),
                        self.emit_expr_as(right, &Ty::Bool),
                    ),
                    BinaryOp::Eq | BinaryOp::Ne => (
                        self.emit_equality_operand(left, &left_ty, &right_ty),
                        self.emit_equality_operand(right, &right_ty, &left_ty),
                    ),
                    BinaryOp::Ge | BinaryOp::Gt | BinaryOp::Add | BinaryOp::Sub => {
                        let (left_target, right_target) =
                            match (left_ty.is_unknown(), right_ty.is_unknown()) {
                                (true, true) => (Ty::Int, Ty::Int),
                                (true, false) => (right_ty.clone(), right_ty),
                                (false, true) => (left_ty.clone(), left_ty),
                                (false, false) => (left_ty, right_ty),
                            };
                        (
                            self.emit_expr_as(left, &left_target),
                            self.emit_expr_as(right, &right_target),
                        )
                    }
                };

                format!("({} {} {})", l, op.as_str(), r)
            }

            ExprKind::Index { base, index } => {
                let base_code = self.emit_expr(base);
                let base_code = if self.typed.type_of(base).is_unknown() {
                    format!("((List)({}))", base_code)
                } else {
                    base_code
                };
                format!("{}.get({})", base_code, self.emit_expr_as(index, &Ty::Int))
            }

            ExprKind::Call { callee, args } => {
                let sig = self.typed.functions.lookup(&callee.name);
                let name = match sig {
                    Some(sig) if sig.kind == FnKind::Builtin => callee.name.clone(),
                    _ => host_ident(&callee.name),
                };
                let args: Vec<String> = args
                    .iter()
                    .enumerate()
                    .map(|(i, arg)| {
                        let param = sig
                            .and_then(|sig| sig.params.get(i))
                            .cloned()
                            .unwrap_or(Ty::Unknown);
                        self.emit_expr_as(arg, &param)
                    })
                    .collect();
                format!("{}({})", name, args.join(", "))
            }
        }
    }

    /// Operand of `==` / `!=`. Unknown operands take the other side's type;
    /// list elements of primitive type are unboxed so that Java compares
    /// values rather than references.
    fn emit_equality_operand(&self, expr: &Expr, own: &Ty, other: &Ty) -> String {
        let code = self.emit_expr(expr);
        if own.is_unknown() {
            return match other {
                Ty::Unknown | Ty::Null => code,
                other => cast_unknown(code, other),
            };
        }
        let is_element = matches!(expr.strip_parens().kind, ExprKind::Index { .. });
        if is_element && matches!(own, Ty::Int | Ty::Float | Ty::Bool) {
            format!("(({})({}))", java_type(own), code)
        } else {
            code
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::typeck::check_program;

    fn emit(source: &str) -> String {
        let (program, errors) = parse(source);
        assert!(errors.is_empty(), "Parse errors: {:?}", errors);
        let typed = check_program(&program).unwrap_or_else(|errors| {
            panic!(
                "Semantic errors: {:?}",
                errors.iter().map(|e| e.to_string()).collect::<Vec<_>>()
            )
        });
        emit_program(&program, &typed, DEFAULT_CLASS_NAME)
    }

    /// The body of `main`, dedented by its two levels
    fn main_body(java: &str) -> String {
        let start = java
            .find("public static void main(String[] args$) {\n")
            .expect("main method");
        let body = &java[start..];
        let body = &body[body.find('\n').unwrap() + 1..];
        let end = body.find("\n    }\n").expect("end of main");
        body[..end + 1]
            .lines()
            .map(|l| l.strip_prefix("        ").unwrap_or(l))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_unit_layout() {
        let java = emit("println(\"hi\");");
        assert!(java.starts_with("// Generated by glc"));
        assert!(java.contains("import java.util.*;"));
        assert!(java.contains("final class Graph {"));
        assert!(java.contains("final class GeneratedGraphProgram {"));
        assert!(java.contains("    static Node add_node(Graph graph, String id) {"));
        assert!(java.ends_with("    }\n}\n"));
        assert_eq!(main_body(&java), "println(\"hi\");");
    }

    #[test]
    fn test_declarations_get_defaults() {
        let java = emit(
            "int i; bool b; float f; string s; graph g; node n; arc a; list<int> xs; list raw; list<list<float>> grid;",
        );
        assert_eq!(
            main_body(&java),
            [
                "int i = 0;",
                "boolean b = false;",
                "double f = 0.0;",
                "String s = \"\";",
                "Graph g = null;",
                "Node n = null;",
                "Arc a = null;",
                "List<Integer> xs = new ArrayList<>();",
                "List raw = new ArrayList<>();",
                "List<List<Double>> grid = new ArrayList<>();",
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_widening_assignment() {
        let java = emit("float f; f = 3;");
        assert_eq!(main_body(&java), "double f = 0.0;\nf = 3;");
    }

    #[test]
    fn test_expressions_are_fully_parenthesized() {
        let java = emit("int a; int b; bool c; c = !(a - b + 1 >= 2) || a == b;");
        assert!(main_body(&java).ends_with("c = ((!((((a - b) + 1) >= 2))) || (a == b));"));
    }

    #[test]
    fn test_if_else() {
        let java = emit("bool c; if (c) then { println(\"y\"); } else { println(\"n\"); }");
        assert_eq!(
            main_body(&java),
            "boolean c = false;\nif (c) {\n    println(\"y\");\n} else {\n    println(\"n\");\n}"
        );
    }

    #[test]
    fn test_until_lowering() {
        let java = emit("int i; until (i >= 3) { i = i + 1; }");
        assert_eq!(
            main_body(&java),
            "int i = 0;\nwhile (true) {\n    if ((i >= 3)) {\n        break;\n    }\n    i = (i + 1);\n}"
        );
    }

    #[test]
    fn test_switch_on_int() {
        let java = emit("int n; switch (n) { case 1: println(\"one\"); case 2: default: println(\"many\"); }");
        assert_eq!(
            main_body(&java),
            [
                "int n = 0;",
                "int switch$0 = n;",
                "if (switch$0 == 1) {",
                "    println(\"one\");",
                "} else if (switch$0 == 2) {",
                "} else {",
                "    println(\"many\");",
                "}",
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_switch_on_string_uses_value_equality() {
        let java = emit("string s; s = read_line(); switch (s) { case \"a\": print(\"A\"); }");
        assert!(main_body(&java).contains("String switch$0 = s;\nif (eq$(switch$0, \"a\")) {"));
    }

    #[test]
    fn test_switch_with_only_default() {
        let java = emit("switch (1) { default: int x; }");
        assert_eq!(main_body(&java), "int switch$0 = 1;\n{\n    int x = 0;\n}");
    }

    #[test]
    fn test_shadowed_locals_are_renamed() {
        let java = emit("int x; if (true) then { string x; x = \"s\"; if (true) then { bool x; } } x = 1;");
        assert_eq!(
            main_body(&java),
            [
                "int x = 0;",
                "if (true) {",
                "    String x$1 = \"\";",
                "    x$1 = \"s\";",
                "    if (true) {",
                "        boolean x$2 = false;",
                "    }",
                "}",
                "x = 1;",
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_sibling_blocks_reuse_names() {
        let java = emit("if (true) then { int y; } else { int y; }");
        assert_eq!(
            main_body(&java),
            "if (true) {\n    int y = 0;\n} else {\n    int y = 0;\n}"
        );
    }

    #[test]
    fn test_reserved_words_are_renamed() {
        let java = emit("int class; class = 1; int hashCode() { return 0; } int r; r = hashCode();");
        let body = main_body(&java);
        assert!(body.contains("int class$ = 0;\nclass$ = 1;"));
        assert!(body.contains("r = hashCode$();"));
        assert!(java.contains("    static int hashCode$() {"));
    }

    #[test]
    fn test_functions_are_lifted_in_order() {
        let java = emit(
            r#"
            int twice(int n) {
                int helper(int m) { return m + m; }
                return helper(n);
            }
            void greet(string who) { println(who); }
            int r; r = twice(2);
            "#,
        );
        let twice = java.find("static int twice(int n) {").unwrap();
        let helper = java.find("static int helper(int m) {").unwrap();
        let greet = java.find("static void greet(String who) {").unwrap();
        let main = java.find("public static void main").unwrap();
        assert!(twice < helper && helper < greet && greet < main);
        assert_eq!(main_body(&java), "int r = 0;\nr = twice(2);");
    }

    #[test]
    fn test_unreachable_statements_are_dropped() {
        let java = emit("int f() { return 1; println(\"never\"); }");
        assert!(!java.contains("never"));
        assert!(java.contains("    static int f() {\n        return 1;\n    }\n"));
    }

    #[test]
    fn test_expression_statements() {
        let java = emit("int x; x + 1; (println(\"p\")); null;");
        assert_eq!(
            main_body(&java),
            "int x = 0;\nignore$((x + 1));\nprintln(\"p\");\nignore$(null);"
        );
    }

    #[test]
    fn test_bare_list_elements_are_cast() {
        let java = emit("list xs; int i; i = xs[0] + 1; float f; f = xs[1]; string s; s = xs[2]; bool b; b = xs[3] == null;");
        let body = main_body(&java);
        assert!(body.contains("i = (((Integer)(xs.get(0))) + 1);"));
        assert!(body.contains("f = ((Number)(xs.get(1))).doubleValue();"));
        assert!(body.contains("s = ((String)(xs.get(2)));"));
        assert!(body.contains("b = (xs.get(3) == null);"));
    }

    #[test]
    fn test_nested_bare_list_index() {
        let java = emit("list<list> grid; int v; v = grid[0][1];");
        assert!(main_body(&java).contains("v = ((Integer)(grid.get(0).get(1)));"));
    }

    #[test]
    fn test_boxed_elements_compare_by_value() {
        let java = emit("list<int> xs; bool b; b = xs[0] == xs[1];");
        assert!(main_body(&java).contains("b = (((int)(xs.get(0))) == ((int)(xs.get(1))));"));
    }

    #[test]
    fn test_string_escaping() {
        assert_eq!(java_string("a\"b\\c\nd\te\r"), "\"a\\\"b\\\\c\\nd\\te\\r\"");
        assert_eq!(java_string("\u{1}"), "\"\\001\"");
        assert_eq!(java_string("\\u0041"), "\"\\\\u0041\"");
        assert_eq!(java_string("ÿ"), "\"ÿ\"");
    }

    #[test]
    fn test_class_name_for() {
        assert_eq!(class_name_for(Path::new("out/GeneratedGraphProgram.java")), "GeneratedGraphProgram");
        assert_eq!(class_name_for(Path::new("my-prog.java")), "my_prog");
        assert_eq!(class_name_for(Path::new("2fast.java")), "_2fast");
        assert_eq!(class_name_for(Path::new("Graph.java")), "GraphProgram");
        assert_eq!(class_name_for(Path::new("PrintStream.java")), "PrintStreamProgram");
        assert_eq!(class_name_for(Path::new("")), DEFAULT_CLASS_NAME);
    }

    #[test]
    fn test_console_output_is_utf8() {
        let java = emit("println(\"ÿ\");");
        assert!(java.contains("new PrintStream(new FileOutputStream(FileDescriptor.out), true, java.nio.charset.StandardCharsets.UTF_8)"));
        assert!(java.contains("        stdout$.println(text);\n"));
        assert!(!java.contains("System.out"));
    }

    #[test]
    fn test_deterministic() {
        let source = "int f(int a) { return a; } int g(int b) { return b; } int x; x = f(1) + g(2);";
        assert_eq!(emit(source), emit(source));
    }
}
