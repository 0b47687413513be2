use anyhow::{Context, Result};
use quiver_server::config::ServerConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Set up logging before configuration loads, so load-time warnings land
    let log_filter = std::env::var("LOG_FILTER").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_filter)))
        .with_target(true)
        .init();

    // Load configuration from environment variables
    let config = ServerConfig::load().context("Failed to load configuration")?;

    // Run the server using the library's run function
    quiver_server::run(config).await.context("Server error")?;

    Ok(())
}
