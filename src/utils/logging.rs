//! Tracing subscriber setup.
//!
//! The library only emits `tracing` events; hosts call [`init`] once at
//! startup to get compact console output. `RUST_LOG` overrides the default
//! filter.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Configuration for the logging system.
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// Enable verbose logging (sets default level to DEBUG)
    pub verbose: bool,
    /// Keep ANSI colours in the output
    pub ansi: bool,
}

/// Installs the global subscriber.
///
/// Fails instead of panicking when a subscriber is already installed, so
/// tests and embedding hosts can call it freely.
pub fn init(config: LogConfig) -> anyhow::Result<()> {
    let default_level = if config.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "image_compressor_lib={}",
            default_level.as_str().to_lowercase()
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_target(false)
        .with_ansi(config.ansi)
        .with_writer(std::io::stdout)
        .compact()
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

    tracing::debug!("Logging initialized (verbose: {})", config.verbose);
    Ok(())
}
