//! Configuration module
//!
//! This module handles connection settings and logging setup.

pub mod storage;

pub use storage::Config;

use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize tracing with a daily rotating log file.
///
/// The terminal belongs to the UI, so nothing is written to stdout.
/// Log level is controlled by RUST_LOG (default: info). The returned
/// guard must be kept alive for buffered lines to be flushed.
pub fn init_tracing() -> Option<WorkerGuard> {
    let Some(log_dir) = resolve_log_dir(dirs::data_local_dir()) else {
        eprintln!("No local data directory; logging disabled");
        return None;
    };

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Failed to create log directory: {}", e);
        return None;
    }

    let file_appender = tracing_appender::rolling::daily(&log_dir, "redis-tui");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .compact(),
        )
        .try_init()
        .ok();

    Some(guard)
}

/// Directory for log files under the platform data root
fn resolve_log_dir(data_root: Option<PathBuf>) -> Option<PathBuf> {
    data_root.map(|root| root.join("redis-tui").join("logs"))
}

/// Load configuration, falling back to defaults when the file is unusable
pub fn load_or_default() -> Config {
    match Config::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "using default configuration");
            let mut config = Config::default();
            config.apply_env(std::env::var(storage::URL_ENV).ok());
            config
        }
    }
}
