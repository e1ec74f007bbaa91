//! GraphLang Compiler
//!
//! GraphLang is a small imperative language with a built-in directed graph
//! type. This crate compiles GraphLang source into a single Java compilation
//! unit that carries its own graph runtime, then hands it to `javac`.
//!
//! # Architecture
//!
//! ```text
//! Source Code (.gl)
//!       │
//!       ▼
//! ┌─────────────┐
//! │    Lexer    │  → Tokens
//! └─────────────┘
//!       │
//!       ▼
//! ┌─────────────┐
//! │   Parser    │  → AST
//! └─────────────┘
//!       │
//!       ▼
//! ┌─────────────┐
//! │  Type Check │  → expression types + function table
//! └─────────────┘
//!       │
//!       ▼
//! ┌─────────────┐
//! │  Code Gen   │  → Java source
//! └─────────────┘
//!       │
//!       ▼
//! ┌─────────────┐
//! │   Driver    │  → javac / java
//! └─────────────┘
//! ```

pub mod lexer;
pub mod token;
pub mod span;
pub mod ast;
pub mod parser;
pub mod pretty;
pub mod typeck;
pub mod codegen;
pub mod driver;

// Re-exports for convenience
pub use driver::{compile_to_java, Diagnostic, DriverError, DriverOptions};
pub use lexer::Lexer;
pub use token::{Token, TokenKind};
pub use span::Span;

/// Compiler version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Output file used when none is given on the command line
pub const DEFAULT_OUTPUT: &str = "GeneratedGraphProgram.java";
