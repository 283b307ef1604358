//! Cache maintenance commands.
//!
//! Provides `keypin cache list|delete` for the configured cache backend.

use clap::Args;
use keypin_core::config::Config;
use keypin_secrets::{Cache, CachedEntry};

/// Cache command arguments.
#[derive(Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommand,
}

#[derive(clap::Subcommand)]
pub enum CacheCommand {
    /// List cached credentials (metadata only)
    List,

    /// Forget the credential cached for a key
    Delete {
        /// Cache key (keygrip)
        key: String,
    },
}

/// Run the cache command.
pub async fn run(args: CacheArgs, config: &Config) -> anyhow::Result<()> {
    let cache = Cache::open(&config.cache)
        .map_err(|e| anyhow::anyhow!("Failed to open credential cache: {}", e))?;

    match args.command {
        CacheCommand::List => {
            let entries = cache.list().await.map_err(|e| anyhow::anyhow!("{}", e))?;
            print!("{}", format_entries(&entries));
        }

        CacheCommand::Delete { key } => {
            let removed = cache
                .delete(&key)
                .await
                .map_err(|e| anyhow::anyhow!("{}", e))?;

            if removed {
                println!("Cached credential for '{}' deleted.", key);
            } else {
                anyhow::bail!("No cached credential for '{}'", key);
            }
        }
    }

    Ok(())
}

fn format_entries(entries: &[CachedEntry]) -> String {
    if entries.is_empty() {
        return "No cached credentials.\n".to_string();
    }

    let mut out = format!("{:<42} {:<32} {:<20} {}\n", "KEY", "LABEL", "UPDATED", "USES");
    out.push_str(&"-".repeat(102));
    out.push('\n');
    for entry in entries {
        out.push_str(&format!(
            "{:<42} {:<32} {:<20} {}\n",
            entry.key,
            entry.label,
            entry.updated_at.format("%Y-%m-%d %H:%M:%S"),
            entry.usage_count
        ));
    }
    out.push_str(&format!("\n{} credential(s) cached.\n", entries.len()));
    out
}
