//! GraphLang Compiler CLI
//!
//! The `glc` command compiles a GraphLang program to Java and, with `--run`,
//! builds and runs it.

use clap::Parser;
use graphlang::driver::{self, DriverError, DriverOptions};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "glc")]
#[command(version = graphlang::VERSION)]
#[command(about = "The GraphLang Compiler", long_about = None)]
struct Cli {
    /// GraphLang source file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Java file to write
    #[arg(value_name = "OUTPUT", default_value = graphlang::DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Run the program after compiling it
    #[arg(long)]
    run: bool,

    /// Check the program for errors without emitting anything
    #[arg(long, conflicts_with_all = ["run", "emit_only"])]
    check: bool,

    /// Write the Java source without invoking javac
    #[arg(long, conflicts_with = "run")]
    emit_only: bool,

    /// Emit tokens (for debugging)
    #[arg(long)]
    emit_tokens: bool,

    /// Emit AST (for debugging)
    #[arg(long)]
    emit_ast: bool,
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    let options = DriverOptions {
        input: cli.input,
        output: cli.output,
        run: cli.run,
        check_only: cli.check,
        emit_only: cli.emit_only,
        emit_tokens: cli.emit_tokens,
        emit_ast: cli.emit_ast,
    };

    match driver::run(&options) {
        Ok(()) => {
            println!("\nDone.");
            Ok(())
        }
        // The program's own output already explains the failure.
        Err(error @ DriverError::HostRun { .. }) => std::process::exit(error.exit_code()),
        Err(error @ DriverError::HostCompile { .. }) => {
            eprintln!("Error: {}", error);
            std::process::exit(error.exit_code())
        }
        Err(error) => Err(miette::miette!("{}", error)),
    }
}
