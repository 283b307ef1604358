//! keypin command-line interface.
//!
//! Without a subcommand the binary serves the Assuan protocol on
//! stdin/stdout, the way an agent expects its PIN-entry helper to behave.

pub mod commands;
pub mod logging;
pub mod presenter;
pub mod prompt;
pub mod render;
pub mod serve;
pub mod tty;

use clap::{Args, Parser, Subcommand};
use keypin_core::config::Config;
use keypin_core::error::ConfigError;
use keypin_core::paths;
use std::path::{Path, PathBuf};

/// keypin - PIN-entry helper with a credential cache
#[derive(Parser)]
#[command(name = "keypin")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file
    #[arg(long, env = "KEYPIN_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub pinentry: PinentryArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Options the agent passes when it spawns the helper.
#[derive(Args, Debug, Default, Clone)]
pub struct PinentryArgs {
    /// X display to use
    #[arg(short = 'D', long)]
    pub display: Option<String>,

    /// Terminal the agent was started from
    #[arg(short = 'T', long)]
    pub ttyname: Option<String>,

    /// Terminal type
    #[arg(short = 'N', long)]
    pub ttytype: Option<String>,

    /// Locale for character classification
    #[arg(short = 'C', long)]
    pub lc_ctype: Option<String>,

    /// Locale for messages
    #[arg(short = 'M', long)]
    pub lc_messages: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Default prompt timeout in seconds
    #[arg(short = 'o', long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Accepted for compatibility
    #[arg(short = 'g', long, hide = true)]
    pub no_global_grab: bool,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Inspect or clear cached credentials
    Cache(commands::cache::CacheArgs),

    /// Configuration management
    Config(commands::config::ConfigArgs),

    /// Show version information
    Version,
}

impl Cli {
    /// Config file in effect: `--config`/`KEYPIN_CONFIG`, else the default.
    pub fn config_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => paths::config_file(),
        }
    }

    /// Log level requested on the command line, if any.
    pub fn log_level_override(&self) -> Option<&'static str> {
        match (self.verbose, self.pinentry.debug) {
            (0, false) => None,
            (0, true) | (1, _) => Some("debug"),
            _ => Some("trace"),
        }
    }
}

/// Load the config at `path`, falling back to defaults when it is missing.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let config = Config::load_or_default(path)?;
    config.validate()?;
    Ok(config)
}

/// Run the CLI with the given arguments.
///
/// `config` is the result of loading the config file; protocol service
/// falls back to defaults when it failed so the agent is never left without
/// a helper.
pub async fn run(cli: Cli, config: Result<Config, ConfigError>) -> anyhow::Result<()> {
    let config_path = cli.config_path();

    match cli.command {
        Some(Commands::Cache(args)) => commands::cache::run(args, &config?).await,
        Some(Commands::Config(args)) => commands::config::run(args, &config_path?).await,
        Some(Commands::Version) => {
            println!("keypin {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        None => {
            let config = config.unwrap_or_else(|e| {
                tracing::warn!("ignoring configuration: {e}");
                Config::default()
            });
            serve::run(&config, &cli.pinentry).await
        }
    }
}
