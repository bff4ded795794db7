use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the linters and show the most urgent issues
    Run(RunArgs),

    /// Initialize a .lintdigest.toml config file in the current directory
    Init,

    /// List the analyzers that would run (auto-detected and configured)
    ListAnalyzers(ConfigArgs),
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Load this config file instead of searching for one
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Ignore config files found in the working directory or its parents.
    #[arg(long, conflicts_with = "config")]
    pub no_config: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct RunArgs {
    /// Packages or paths to lint (defaults to "./...")
    pub targets: Vec<String>,

    /// Output format: "terminal" or "json"
    #[arg(short, long, default_value = "terminal")]
    pub format: String,

    /// Write the JSON report to a file as well
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Read the primary JSON report from a file ("-" for stdin) instead of
    /// running the primary linter
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Skip the primary linter and only run the extra analyzers
    #[arg(long, conflicts_with = "report")]
    pub no_primary: bool,

    /// Maximum number of issues to show (0 = unlimited). Overrides config.
    #[arg(long)]
    pub max_issues: Option<usize>,

    /// Kill any external tool that runs longer than this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    #[command(flatten)]
    pub settings: ConfigArgs,
}
