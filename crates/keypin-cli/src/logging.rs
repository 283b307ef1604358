//! tracing-subscriber setup.
//!
//! stdout carries the protocol, so logs go to stderr or to the configured
//! file, never to stdout.

use keypin_core::config::LoggingConfig;
use keypin_core::env::{self, vars};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber.
///
/// The filter comes from `KEYPIN_LOG`, then `RUST_LOG`, then `level_override`
/// (from `-v`/`--debug`), then `logging.level`.
pub fn init(settings: &LoggingConfig, level_override: Option<&str>) -> anyhow::Result<()> {
    let filter = build_filter(
        env::get_var(vars::KEYPIN_LOG).as_deref(),
        env::get_var("RUST_LOG").as_deref(),
        level_override.unwrap_or(&settings.level),
    );

    let (writer, ansi) = match &settings.file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        None => (BoxMakeWriter::new(std::io::stderr), true),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(ansi),
        )
        .try_init()?;
    Ok(())
}

fn build_filter(keypin_log: Option<&str>, rust_log: Option<&str>, level: &str) -> EnvFilter {
    [keypin_log, rust_log]
        .into_iter()
        .flatten()
        .find_map(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(format!("keypin={}", level.to_lowercase())))
}
