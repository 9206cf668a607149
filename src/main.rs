//! tomcat-home - Tomcat layer contributor
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use std::process::ExitCode;
use tomcat_home::cli::{Cli, Commands, LogFormat};
use tomcat_home::config::ConfigManager;
use tomcat_home::error::TomcatResult;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Exit code for a failed detection
const DETECT_FAIL: u8 = 100;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> TomcatResult<ExitCode> {
    let cli = Cli::parse();

    // Config decides the log format, so it is loaded before logging starts
    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };
    let config = config_manager.load().await?;

    // Initialize logging: 0 = info (build log body), 1 = debug, 2+ = trace
    let verbose = cli.verbose.max(u8::from(config.general.verbose));
    let filter = match verbose {
        0 => EnvFilter::new("tomcat_home=info"),
        1 => EnvFilter::new("tomcat_home=debug"),
        _ => EnvFilter::new("tomcat_home=trace"),
    };

    let format = cli
        .log_format
        .unwrap_or_else(|| LogFormat::from_config(&config.general.log_format));
    match format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .without_time()
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }

    debug!("Using config {}", config_manager.path().display());

    match cli.command {
        Commands::Build(args) => tomcat_home::cli::commands::build(args, &config).await?,
        Commands::Detect(args) => {
            if !tomcat_home::cli::commands::detect(args, &config).await? {
                return Ok(ExitCode::from(DETECT_FAIL));
            }
        }
        Commands::Patch(args) => tomcat_home::cli::commands::patch(args).await?,
        Commands::Config(args) => {
            tomcat_home::cli::commands::config(args, &config, &config_manager).await?
        }
    }

    Ok(ExitCode::SUCCESS)
}
