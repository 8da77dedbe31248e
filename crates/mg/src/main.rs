//! margin CLI - directive preprocessor for Markdown.
//!
//! Provides commands for:
//! - `process`: Resolve `::ai` and layout directives in a file
//! - `check`: Report directive problems without writing output
//! - `list`: Show registered directives in execution order

mod commands;
mod error;
mod frontmatter;
mod output;
mod pipeline;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CheckArgs, ProcessArgs};
use output::Output;

/// margin - directive preprocessor for Markdown.
#[derive(Parser)]
#[command(name = "mg", version, about)]
struct Cli {
    /// Enable verbose output (info-level logs).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a Markdown file.
    Process(ProcessArgs),
    /// Check files for directive problems.
    Check(CheckArgs),
    /// List registered directives.
    List,
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Process(args) => args.execute(),
        Commands::Check(args) => args.execute(),
        Commands::List => commands::list::execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
