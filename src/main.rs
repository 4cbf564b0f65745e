// redis-tui: an interactive terminal client for Redis
//
// This is the main entry point for the redis-tui application.

use anyhow::{Context, Result};
use redis_tui::cli::{Repl, Session};
use redis_tui::config;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let _log_guard = config::init_tracing();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "redis-tui starting");

    let config = config::load_or_default();
    let session = Session::bootstrap(&config).await;

    Repl::new(session)
        .run()
        .await
        .context("terminal session failed")?;

    tracing::info!("redis-tui exiting");
    Ok(())
}
