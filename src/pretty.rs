//! Pretty-printer: AST back to GraphLang source
//!
//! Output is canonical (4-space indentation, one statement per line) and
//! reparses to the same tree. Parenthesized expressions are kept as written,
//! so no precedence analysis is needed here.

use crate::ast::*;

/// Render a whole program as GraphLang source
pub fn pretty_program(program: &Program) -> String {
    let mut printer = Printer::new();
    for stmt in &program.stmts {
        printer.stmt(stmt);
    }
    printer.finish()
}

/// Render a single expression
pub fn pretty_expr(expr: &Expr) -> String {
    let mut out = String::new();
    write_expr(&mut out, expr);
    out
}

struct Printer {
    output: String,
    indent: usize,
}

impl Printer {
    fn new() -> Self {
        Self {
            output: String::new(),
            indent: 0,
        }
    }

    fn finish(self) -> String {
        self.output
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.output.push_str("    ");
        }
        self.output.push_str(text);
        self.output.push('\n');
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Decl { ty, name } => self.line(&format!("{} {};", ty, name)),
            StmtKind::Assign { target, value } => {
                self.line(&format!("{} = {};", target, pretty_expr(value)))
            }
            StmtKind::If {
                cond,
                then_block,
                else_block,
            } => {
                self.line(&format!("if ({}) then {{", pretty_expr(cond)));
                self.body(&then_block.stmts);
                match else_block {
                    Some(else_block) => {
                        self.line("} else {");
                        self.body(&else_block.stmts);
                        self.line("}");
                    }
                    None => self.line("}"),
                }
            }
            StmtKind::Switch {
                scrutinee,
                cases,
                default,
            } => {
                self.line(&format!("switch ({}) {{", pretty_expr(scrutinee)));
                self.indent += 1;
                for case in cases {
                    self.line(&format!("case {}:", pretty_literal(&case.label)));
                    self.body(&case.body);
                }
                if let Some(default) = default {
                    self.line("default:");
                    self.body(&default.body);
                }
                self.indent -= 1;
                self.line("}");
            }
            StmtKind::Until { cond, body } => {
                self.line(&format!("until ({}) {{", pretty_expr(cond)));
                self.body(&body.stmts);
                self.line("}");
            }
            StmtKind::Function(f) => {
                let params: Vec<String> = f
                    .params
                    .iter()
                    .map(|p| {
                        let marker = if p.is_ref { "ref " } else { "" };
                        format!("{}{} {}", marker, p.ty, p.name)
                    })
                    .collect();
                self.line(&format!(
                    "{} {}({}) {{",
                    f.return_type,
                    f.name,
                    params.join(", ")
                ));
                self.body(&f.body.stmts);
                self.line("}");
            }
            StmtKind::Return(Some(value)) => self.line(&format!("return {};", pretty_expr(value))),
            StmtKind::Return(None) => self.line("return;"),
            StmtKind::Expr(expr) => self.line(&format!("{};", pretty_expr(expr))),
        }
    }

    fn body(&mut self, stmts: &[Stmt]) {
        self.indent += 1;
        for stmt in stmts {
            self.stmt(stmt);
        }
        self.indent -= 1;
    }
}

fn write_expr(out: &mut String, expr: &Expr) {
    match &expr.kind {
        ExprKind::Binary { op, left, right } => {
            write_expr(out, left);
            out.push(' ');
            out.push_str(op.as_str());
            out.push(' ');
            write_expr(out, right);
        }
        ExprKind::Unary { op, operand } => {
            out.push_str(op.as_str());
            write_expr(out, operand);
        }
        ExprKind::Call { callee, args } => {
            out.push_str(&callee.name);
            out.push('(');
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_expr(out, arg);
            }
            out.push(')');
        }
        ExprKind::Index { base, index } => {
            write_expr(out, base);
            out.push('[');
            write_expr(out, index);
            out.push(']');
        }
        ExprKind::Ident(ident) => out.push_str(&ident.name),
        ExprKind::Literal(literal) => out.push_str(&pretty_literal(literal)),
        ExprKind::Paren(inner) => {
            out.push('(');
            write_expr(out, inner);
            out.push(')');
        }
    }
}

/// Render a literal in GraphLang syntax
pub fn pretty_literal(literal: &Literal) -> String {
    match literal {
        Literal::Int(n) => n.to_string(),
        Literal::Float(text) => text.clone(),
        Literal::Str(s) => {
            let mut out = String::with_capacity(s.len() + 2);
            out.push('"');
            for c in s.chars() {
                match c {
                    '\\' => out.push_str("\\\\"),
                    '"' => out.push_str("\\\""),
                    '\n' => out.push_str("\\n"),
                    '\t' => out.push_str("\\t"),
                    '\r' => out.push_str("\\r"),
                    c => out.push(c),
                }
            }
            out.push('"');
            out
        }
        Literal::Bool(b) => b.to_string(),
        Literal::Null => "null".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    /// Debug rendering of a tree with every span cut out
    fn shape(program: &Program) -> String {
        let debug = format!("{:?}", program);
        let mut out = String::with_capacity(debug.len());
        let mut rest = debug.as_str();
        while let Some(at) = rest.find("Span {") {
            out.push_str(&rest[..at]);
            let close = rest[at..].find('}').unwrap();
            rest = &rest[at + close + 1..];
        }
        out.push_str(rest);
        out
    }

    fn roundtrip(source: &str) -> String {
        let (program, errors) = parse(source);
        assert!(errors.is_empty(), "Parse errors: {:?}", errors);
        let printed = pretty_program(&program);
        let (reparsed, errors) = parse(&printed);
        assert!(errors.is_empty(), "Reparse errors: {:?}\n{}", errors, printed);
        assert_eq!(shape(&program), shape(&reparsed), "{}", printed);
        printed
    }

    #[test]
    fn test_shape_ignores_only_spans() {
        let (spaced, _) = parse("int   x ;");
        let (tight, _) = parse("int x;");
        let (other, _) = parse("int y;");
        assert_eq!(shape(&spaced), shape(&tight));
        assert_ne!(shape(&tight), shape(&other));
        assert!(!shape(&tight).contains("start"));
    }

    #[test]
    fn test_ref_marker_is_printed() {
        let printed = roundtrip("int f(ref node b, graph g) { return 1; }");
        assert!(printed.starts_with("int f(ref node b, graph g) {"));
    }

    #[test]
    fn test_canonical_layout() {
        let printed = roundtrip("int x;x=1+2;if(x>=3)then{println(\"big\");}else{x=x-1;}");
        assert_eq!(
            printed,
            "int x;\nx = 1 + 2;\nif (x >= 3) then {\n    println(\"big\");\n} else {\n    x = x - 1;\n}\n"
        );
    }

    #[test]
    fn test_switch_layout() {
        let printed = roundtrip("switch (n) { case 1: print(\"a\"); case 2: default: print(\"z\"); }");
        assert_eq!(
            printed,
            "switch (n) {\n    case 1:\n        print(\"a\");\n    case 2:\n    default:\n        print(\"z\");\n}\n"
        );
    }

    #[test]
    fn test_parens_and_unary_are_preserved() {
        let printed = roundtrip("b = !(a || c) == (x - (y - z) > 0);");
        assert_eq!(printed, "b = !(a || c) == (x - (y - z) > 0);\n");
    }

    #[test]
    fn test_string_escapes_roundtrip() {
        let printed = roundtrip(r#"println("tab\tquote\"slash\\nl\n");"#);
        assert_eq!(printed, "println(\"tab\\tquote\\\"slash\\\\nl\\n\");\n");
    }

    #[test]
    fn test_functions_roundtrip() {
        roundtrip(
            r#"
            list<node> route(graph g, node a, ref node b) {
                until (is_connected(g, a, b)) { return find_path(g, a, b); }
                return get_nodes(g);
            }
            void log() { return; }
            float f; f = 1.50;
            "#,
        );
    }

    #[test]
    fn test_pretty_expr() {
        let (program, _) = parse("xs[i + 1][0];");
        match &program.stmts[0].kind {
            StmtKind::Expr(e) => assert_eq!(pretty_expr(e), "xs[i + 1][0]"),
            other => panic!("Expected expression statement, got {:?}", other),
        }
    }
}
