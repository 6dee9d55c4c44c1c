//! scms CLI - page graph trees.
//!
//! Provides commands for:
//! - `tree`: Tree of pages containing elements of a kind
//! - `nav`: Navigation tree of pages
//! - `index`: Numbered outline of a tree
//! - `parents`: Parent pages applicable to a view

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{GlobalArgs, IndexArgs, NavArgs, ParentsArgs, TreeArgs};
use output::Output;

/// scms - page graph capture and tree rendering.
#[derive(Parser)]
#[command(name = "scms", version, about)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the tree of pages containing elements of a kind.
    Tree(TreeArgs),
    /// Render the navigation tree below a page.
    Nav(NavArgs),
    /// List a tree as a numbered outline.
    Index(IndexArgs),
    /// List parent pages applicable to a view.
    Parents(ParentsArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.global.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Tree(args) => args.execute(&cli.global, &output),
        Commands::Nav(args) => args.execute(&cli.global, &output),
        Commands::Index(args) => args.execute(&cli.global, &output),
        Commands::Parents(args) => args.execute(&cli.global, &output),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
