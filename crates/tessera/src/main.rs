//! # tessera
//!
//! Tessera - Type synthesis and checking for React class factories.
//!
//! ## Name Origin
//!
//! **Tessera** (/ˈtɛsərə/) is a single tile of a mosaic. This binary assembles the tiles
//! of every component, its specification and its mixins, and checks each use against
//! the finished picture.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tessera")]
#[command(about = "Type synthesis and checking for React class factories", long_about = None)]
#[command(version)]
struct Cli {
    /// Log pipeline stages to stderr (overridden by TESSERA_LOG)
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check component and mixin usage across files
    Check(commands::check::CheckArgs),
}

fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = match std::env::var("TESSERA_LOG") {
        Ok(directives) => EnvFilter::builder().parse_lossy(directives),
        Err(_) => EnvFilter::new(default),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let code = match cli.command {
        Commands::Check(args) => commands::check::run(args),
    };
    std::process::exit(code);
}
