mod cli;
mod config;
mod engine;
mod error;
mod listing;
mod report;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::Cli;
use engine::Pipeline;

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("lintdigest=debug")
    } else if cli.quiet {
        EnvFilter::new("lintdigest=error")
    } else {
        EnvFilter::new("lintdigest=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    info!("lintdigest v{}", env!("CARGO_PKG_VERSION"));

    match &cli.command {
        cli::Commands::Run(args) => {
            let pipeline = Pipeline::new(args)?;
            info!("🔍 Linting target: {}", pipeline.targets().join(" "));

            let report = match pipeline.run() {
                Ok(report) => report,
                Err(e) => {
                    error!("❌ {}", e);
                    std::process::exit(1);
                }
            };

            // Output the report
            match args.format.as_str() {
                "json" => {
                    let output = report::json::render(&report)?;
                    if let Some(ref path) = args.out {
                        std::fs::write(path, &output)?;
                        info!("Report written to {}", path.display());
                    } else {
                        println!("{}", output);
                    }
                }
                _ => {
                    report::terminal::render(&report);
                    if let Some(ref path) = args.out {
                        let json_output = report::json::render(&report)?;
                        std::fs::write(path, &json_output)?;
                        info!("JSON report also written to {}", path.display());
                    }
                }
            }

            // Any error-severity issue fails the run
            let code = report.exit_code();
            if code != 0 {
                std::process::exit(code);
            }
        }
        cli::Commands::Init => {
            config::init_config()?;
        }
        cli::Commands::ListAnalyzers(args) => {
            let config = engine::load_config(args)?;
            listing::list_analyzers(&config);
        }
    }

    Ok(())
}
