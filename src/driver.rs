//! Compilation driver
//!
//! Runs the five phases in order and stops at the first one that fails:
//!
//! ```text
//! [1/5] read source
//! [2/5] parse            (lexical and syntax errors are fatal)
//! [3/5] semantic check   (all errors are reported, then fatal)
//! [4/5] emit Java        (written to the output path)
//! [5/5] javac            (then `java` when running)
//! ```
//!
//! The library entry points [`analyze`] and [`compile_to_java`] do no I/O;
//! [`run`] adds the file system, progress output and the host toolchain.

use crate::ast::Program;
use crate::codegen::{self, class_name_for};
use crate::lexer;
use crate::parser::{self, ParseError};
use crate::span::{LineIndex, Span};
use crate::typeck::{self, TypedProgram};
use std::env;
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Settings for one compiler invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Run the compiled program after a successful build
    pub run: bool,
    /// Stop after semantic analysis
    pub check_only: bool,
    /// Write the Java source but do not invoke the host compiler
    pub emit_only: bool,
    pub emit_tokens: bool,
    pub emit_ast: bool,
}

impl DriverOptions {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: PathBuf::from(crate::DEFAULT_OUTPUT),
            run: false,
            check_only: false,
            emit_only: false,
            emit_tokens: false,
            emit_ast: false,
        }
    }
}

/// Why a compilation stopped
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("found {0} syntax error(s)")]
    Syntax(usize),

    #[error("found {0} semantic error(s)")]
    Semantic(usize),

    #[error("failed to execute {tool}: {source} (is it installed and on PATH?)")]
    ToolNotFound {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("{tool} exited with {status}")]
    HostCompile {
        tool: String,
        status: String,
        code: Option<i32>,
    },

    #[error("program exited with {status}")]
    HostRun { status: String, code: Option<i32> },
}

impl DriverError {
    /// Exit code the `glc` process should finish with. Failures of the
    /// host compiler or program pass on the child's code.
    pub fn exit_code(&self) -> i32 {
        match self {
            DriverError::HostCompile { code: Some(code), .. }
            | DriverError::HostRun { code: Some(code), .. } => *code,
            _ => 1,
        }
    }
}

/// Compiler phase that produced a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Lexical,
    Syntax,
    Semantic,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Lexical => write!(f, "lexical"),
            Stage::Syntax => write!(f, "syntax"),
            Stage::Semantic => write!(f, "semantic"),
        }
    }
}

/// A located error message from any front-end phase
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub stage: Stage,
    pub span: Span,
    pub message: String,
}

impl Diagnostic {
    pub fn is_fatal_before_analysis(&self) -> bool {
        matches!(self.stage, Stage::Lexical | Stage::Syntax)
    }

    /// `<stage> error at <line>:<col>: <message>`
    pub fn render(&self, index: &LineIndex<'_>) -> String {
        format!(
            "{} error at {}: {}",
            self.stage,
            index.span_start(self.span),
            self.message
        )
    }
}

impl From<&ParseError> for Diagnostic {
    fn from(error: &ParseError) -> Self {
        let stage = if error.is_lexical() {
            Stage::Lexical
        } else {
            Stage::Syntax
        };
        Self {
            stage,
            span: error.span(),
            message: error.to_string(),
        }
    }
}

impl From<&typeck::TypeError> for Diagnostic {
    fn from(error: &typeck::TypeError) -> Self {
        Self {
            stage: Stage::Semantic,
            span: error.span,
            message: error.kind.to_string(),
        }
    }
}

// ============ Library entry points ============

/// Parse and check a program. Syntax errors stop before semantic analysis.
pub fn analyze(source: &str) -> Result<(Program, TypedProgram), Vec<Diagnostic>> {
    let (program, parse_errors) = parser::parse(source);
    if !parse_errors.is_empty() {
        return Err(parse_errors.iter().map(Diagnostic::from).collect());
    }

    match typeck::check_program(&program) {
        Ok(typed) => Ok((program, typed)),
        Err(errors) => Err(errors.iter().map(Diagnostic::from).collect()),
    }
}

/// Compile GraphLang source to a Java compilation unit
pub fn compile_to_java(source: &str, class_name: &str) -> Result<String, Vec<Diagnostic>> {
    let (program, typed) = analyze(source)?;
    Ok(codegen::emit_program(&program, &typed, class_name))
}

// ============ Command-line driver ============

/// Run a full compilation as configured by `options`
pub fn run(options: &DriverOptions) -> Result<(), DriverError> {
    println!(
        "GraphLang compiler {} - {}",
        crate::VERSION,
        options.input.display()
    );

    println!("[1/5] Reading source...");
    let source = fs::read_to_string(&options.input).map_err(|source| DriverError::Read {
        path: options.input.clone(),
        source,
    })?;
    let index = LineIndex::new(&source);

    if options.emit_tokens {
        dump_tokens(&source, &index);
    }

    println!("[2/5] Parsing...");
    let (program, parse_errors) = parser::parse(&source);
    if options.emit_ast {
        println!("\n=== AST ===");
        println!("{:#?}", program);
    }
    if !parse_errors.is_empty() {
        report(parse_errors.iter().map(Diagnostic::from), &index);
        return Err(DriverError::Syntax(parse_errors.len()));
    }
    println!("      ✓ {} top-level statement(s)", program.stmts.len());

    println!("[3/5] Semantic analysis...");
    let typed = match typeck::check_program(&program) {
        Ok(typed) => typed,
        Err(errors) => {
            report(errors.iter().map(Diagnostic::from), &index);
            return Err(DriverError::Semantic(errors.len()));
        }
    };
    println!("      ✓ no errors");

    if options.check_only {
        return Ok(());
    }

    println!("[4/5] Emitting Java...");
    let class_name = class_name_for(&options.output);
    let java = codegen::emit_program(&program, &typed, &class_name);
    fs::write(&options.output, &java).map_err(|source| DriverError::Write {
        path: options.output.clone(),
        source,
    })?;
    println!("      ✓ wrote {}", options.output.display());

    if options.emit_only {
        return Ok(());
    }

    println!("[5/5] Compiling with javac...");
    let class_dir = class_dir_for(&options.output);
    let javac = tool_path("JAVAC", "javac");
    let mut cmd = Command::new(&javac);
    cmd.arg("-encoding")
        .arg("UTF-8")
        .arg("-d")
        .arg(&class_dir)
        .arg(&options.output);
    if let Err(status) = run_command(&mut cmd, &javac)? {
        return Err(DriverError::HostCompile {
            tool: javac.to_string_lossy().into_owned(),
            status: status.to_string(),
            code: status.code(),
        });
    }
    println!("      ✓ classes in {}", class_dir.display());

    if options.run {
        println!("Running {}...", class_name);
        let java_bin = tool_path("JAVA", "java");
        let mut cmd = Command::new(&java_bin);
        cmd.arg("-cp").arg(&class_dir).arg(&class_name);
        if let Err(status) = run_command(&mut cmd, &java_bin)? {
            return Err(DriverError::HostRun {
                status: status.to_string(),
                code: status.code(),
            });
        }
    }

    Ok(())
}

fn dump_tokens(source: &str, index: &LineIndex<'_>) {
    println!("\n=== Tokens ===");
    let (tokens, errors) = lexer::lex(source);
    for token in &tokens {
        println!(
            "{:?} @ {} = {:?}",
            token.kind,
            index.span_start(token.span),
            token.text(source)
        );
    }
    if !errors.is_empty() {
        println!("\nLexer errors: {:?}", errors);
    }
    println!();
}

fn report(diagnostics: impl Iterator<Item = Diagnostic>, index: &LineIndex<'_>) {
    for diagnostic in diagnostics {
        eprintln!("{}", diagnostic.render(index));
    }
}

/// Directory receiving the `.class` files: the output file's directory
fn class_dir_for(output: &Path) -> PathBuf {
    match output.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Path of a host tool. Respects the `$var` override, otherwise falls back
/// to `default` on `$PATH`.
fn tool_path(var: &str, default: &str) -> OsString {
    env::var_os(var).unwrap_or_else(|| OsString::from(default))
}

/// Run a child process with inherited stdio. The outer error means the tool
/// could not be started; the inner one carries an unsuccessful exit status.
fn run_command(
    cmd: &mut Command,
    tool: &OsString,
) -> Result<Result<(), std::process::ExitStatus>, DriverError> {
    let status = cmd.status().map_err(|source| DriverError::ToolNotFound {
        tool: tool.to_string_lossy().into_owned(),
        source,
    })?;

    if status.success() {
        Ok(Ok(()))
    } else {
        Ok(Err(status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diagnostics(source: &str) -> Vec<Diagnostic> {
        match analyze(source) {
            Ok(_) => Vec::new(),
            Err(diagnostics) => diagnostics,
        }
    }

    #[test]
    fn test_accepts_valid_program() {
        assert!(analyze("graph g; g = create_graph();").is_ok());
    }

    #[test]
    fn test_syntax_errors_stop_before_analysis() {
        // `y` is undefined too, but semantic analysis never runs.
        let found = diagnostics("int x\n y = 1;");
        assert!(!found.is_empty());
        assert!(found.iter().all(Diagnostic::is_fatal_before_analysis));
    }

    #[test]
    fn test_lexical_errors_are_tagged() {
        let found = diagnostics("int x; x = 1 # 2;");
        assert!(found.iter().any(|d| d.stage == Stage::Lexical));
    }

    #[test]
    fn test_semantic_errors_accumulate() {
        let found = diagnostics("int x; x = \"a\"; y = 1;");
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|d| d.stage == Stage::Semantic));
    }

    #[test]
    fn test_render_uses_line_and_column() {
        let source = "int x;\nx = \"hello\";";
        let found = diagnostics(source);
        let index = LineIndex::new(source);
        assert_eq!(
            found[0].render(&index),
            "semantic error at 2:5: cannot assign string to int variable `x`"
        );
    }

    #[test]
    fn test_compile_to_java_names_the_class() {
        let java = compile_to_java("println(\"hi\");", "Demo").unwrap();
        assert!(java.contains("final class Demo {"));
    }

    #[test]
    fn test_exit_code_follows_program() {
        let error = DriverError::HostRun {
            status: "exit status: 3".to_string(),
            code: Some(3),
        };
        assert_eq!(error.exit_code(), 3);
        assert_eq!(DriverError::Semantic(2).exit_code(), 1);
    }

    #[test]
    fn test_exit_code_follows_host_compiler() {
        let error = DriverError::HostCompile {
            tool: "javac".to_string(),
            status: "exit status: 7".to_string(),
            code: Some(7),
        };
        assert_eq!(error.exit_code(), 7);
        assert_eq!(error.to_string(), "javac exited with exit status: 7");

        let killed = DriverError::HostCompile {
            tool: "javac".to_string(),
            status: "signal: 9 (SIGKILL)".to_string(),
            code: None,
        };
        assert_eq!(killed.exit_code(), 1);
    }

    #[test]
    fn test_class_dir_for() {
        assert_eq!(class_dir_for(Path::new("Out.java")), PathBuf::from("."));
        assert_eq!(class_dir_for(Path::new("build/Out.java")), PathBuf::from("build"));
    }

    #[test]
    fn test_emit_only_writes_java() {
        let dir = env::temp_dir().join(format!("glc-driver-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let input = dir.join("hello.gl");
        fs::write(&input, "println(\"hello\");").unwrap();

        let mut options = DriverOptions::new(&input);
        options.output = dir.join("Hello.java");
        options.emit_only = true;
        run(&options).unwrap();

        let java = fs::read_to_string(&options.output).unwrap();
        assert!(java.contains("final class Hello {"));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_check_only_writes_nothing() {
        let dir = env::temp_dir().join(format!("glc-check-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let input = dir.join("bad.gl");
        fs::write(&input, "int x; x = true;").unwrap();

        let mut options = DriverOptions::new(&input);
        options.output = dir.join("Bad.java");
        options.check_only = true;
        assert!(matches!(run(&options), Err(DriverError::Semantic(1))));
        assert!(!options.output.exists());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_javac_passes_on_its_code() {
        use std::os::unix::fs::PermissionsExt;

        let dir = env::temp_dir().join(format!("glc-javac-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let javac = dir.join("failing-javac");
        fs::write(&javac, "#!/bin/sh\nexit 7\n").unwrap();
        fs::set_permissions(&javac, fs::Permissions::from_mode(0o755)).unwrap();
        let input = dir.join("ok.gl");
        fs::write(&input, "println(\"ok\");").unwrap();

        let mut options = DriverOptions::new(&input);
        options.output = dir.join("Ok.java");
        env::set_var("JAVAC", &javac);
        let result = run(&options);
        env::remove_var("JAVAC");

        match result {
            Err(error @ DriverError::HostCompile { .. }) => {
                assert_eq!(error.exit_code(), 7);
                assert!(error.to_string().ends_with("exited with exit status: 7"));
            }
            other => panic!("Expected a host compiler failure, got {:?}", other),
        }
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_input() {
        let options = DriverOptions::new("/nonexistent/graphlang/input.gl");
        assert!(matches!(run(&options), Err(DriverError::Read { .. })));
    }
}
