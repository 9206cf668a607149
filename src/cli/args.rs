//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// tomcat-home - Tomcat layer contributor for buildpacks
///
/// Installs Apache Tomcat into a cacheable layer, points CATALINA_HOME at
/// it and declares the application's process types.
#[derive(Parser, Debug)]
#[command(name = "tomcat-home")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "TOMCAT_HOME_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log output format (overrides config)
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormat>,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// Parse the config file spelling, falling back to text
    pub fn from_config(value: &str) -> Self {
        match value {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Contribute the Tomcat layer and launch metadata
    Build(BuildArgs),

    /// Check whether the application is a servlet web application
    Detect(DetectArgs),

    /// Comment out the empty CLASSPATH assignment in a startup script
    Patch(PatchArgs),

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments for the build command
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Layers directory to contribute into
    #[arg(long, env = "CNB_LAYERS_DIR")]
    pub layers: PathBuf,

    /// Resolved build plan
    #[arg(long, env = "CNB_BP_PLAN_PATH")]
    pub plan: PathBuf,

    /// Buildpack directory containing buildpack.toml
    #[arg(long, env = "CNB_BUILDPACK_DIR", default_value = ".")]
    pub buildpack: PathBuf,

    /// Stack the image is built on
    #[arg(long, env = "CNB_STACK_ID", default_value = "*")]
    pub stack: String,

    /// Never download archives (overrides config)
    #[arg(long)]
    pub offline: bool,
}

/// Arguments for the detect command
#[derive(Parser, Debug)]
pub struct DetectArgs {
    /// Application directory
    #[arg(long, default_value = ".")]
    pub app: PathBuf,

    /// Where to write the build plan on pass
    #[arg(long, env = "CNB_BUILD_PLAN_PATH")]
    pub plan: PathBuf,
}

/// Arguments for the patch command
#[derive(Parser, Debug)]
pub struct PatchArgs {
    /// Startup script to patch in place
    pub script: PathBuf,

    /// Report what would change without writing
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Print the config file path
    Path,

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
