//! keypin entry point.

use clap::Parser;
use keypin_cli::{load_config, logging, run, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Logging settings come from the config file, so load it first
    let config = cli.config_path().and_then(|path| load_config(&path));
    let settings = config
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_default();
    logging::init(&settings, cli.log_level_override())?;

    // Run the command
    run(cli, config).await
}
