pub mod commands;

use clap::Parser;

pub use commands::{Commands, ConfigArgs, RunArgs};

/// lintdigest: one ranked view over all your linters
///
/// Runs the configured linters, merges and deduplicates their findings,
/// and shows the most urgent ones with source context.
#[derive(Parser, Debug)]
#[command(
    name = "lintdigest",
    version,
    about = "🔍 lintdigest — one ranked view over all your linters",
    long_about = "lintdigest collects diagnostics from a JSON-reporting linter and any number of\nextra analyzers, removes duplicates, ranks them by severity and priority, and\nshows each with the surrounding source lines."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}
