//! Configuration management commands.

use crate::render;
use clap::Args;
use keypin_core::config::{BiometricsMode, CacheBackend, Config};
use keypin_core::error::ConfigError;
use keypin_core::paths;
use std::path::Path;

/// Config command arguments.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(clap::Subcommand)]
pub enum ConfigCommand {
    /// Load and validate the configuration, and report what it selects
    Check,

    /// Show the effective configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

/// Run the config command against the file at `path`.
pub async fn run(args: ConfigArgs, path: &Path) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Check => {
            let (report, errors) = check(path);
            for line in report {
                println!("{line}");
            }
            if errors > 0 {
                anyhow::bail!("{} error(s) found", errors);
            }
        }

        ConfigCommand::Show => {
            let config = Config::load_or_default(path)?;
            println!("{}", config.to_json5()?);
        }

        ConfigCommand::Path => {
            println!("{}", path.display());
        }

        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists: {:?}. Use --force to overwrite.",
                    path
                );
            }
            Config::default().save(path)?;
            println!("Created config file: {:?}", path);
        }
    }

    Ok(())
}

/// Report lines and error count for the config at `path`.
fn check(path: &Path) -> (Vec<String>, usize) {
    let mut report = vec![format!("Checking {}", path.display())];
    let mut errors = 0;

    let config = match Config::load(path) {
        Ok(config) => {
            report.push(render::ok_line("Configuration loaded"));
            config
        }
        Err(ConfigError::NotFound(_)) => {
            report.push(render::warn_line("Configuration file not found, using defaults"));
            Config::default()
        }
        Err(e) => {
            report.push(render::fail_line(&format!("Configuration error: {e}")));
            return (report, 1);
        }
    };

    match config.validate() {
        Ok(()) => report.push(render::ok_line("Configuration valid")),
        Err(e) => {
            report.push(render::fail_line(&format!("Configuration invalid: {e}")));
            errors += 1;
        }
    }

    let backend = match config.cache.backend {
        CacheBackend::File => {
            let dir = match &config.cache.dir {
                Some(dir) => Ok(dir.clone()),
                None => paths::cache_dir(),
            };
            match dir {
                Ok(dir) => format!("encrypted files in {}", dir.display()),
                Err(e) => {
                    errors += 1;
                    format!("encrypted files (cache dir unknown: {e})")
                }
            }
        }
        CacheBackend::Keychain => format!("keychain service \"{}\"", config.cache.service),
        CacheBackend::None => "disabled".to_string(),
    };
    report.push(render::ok_line(&format!("Cache backend: {backend}")));

    let biometrics = match config.biometrics.mode {
        BiometricsMode::Unavailable => "unavailable (cached credentials always prompt)",
        BiometricsMode::Trusted => "trusted (cached credentials are released without a check)",
    };
    report.push(render::ok_line(&format!("Biometrics: {biometrics}")));

    (report, errors)
}
