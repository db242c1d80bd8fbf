//! Sift Screener - Natural-language stock screening service for the Sift
//! research dashboard.

use anyhow::Result;
use sift_common::config::Config;
use sift_common::logging::init_logging_with_exclusions;
use sift_screener::ScreenerService;

#[tokio::main]
async fn main() -> Result<()> {
    // Start timing immediately for cold-start measurement
    let startup_start = std::time::Instant::now();

    // Load and validate configuration
    let config = Config::load_with_env()?;
    config.validate()?;

    // Initialize logging
    init_logging_with_exclusions(
        &config.observability.log_level,
        &config.observability.log_format,
        &config.observability.excluded_targets,
    );

    tracing::info!("Sift Screener v{}", env!("CARGO_PKG_VERSION"));

    // Load the dataset snapshot and build the service
    let service = ScreenerService::new(config).await?;

    // Log startup timing before entering the server loop
    let startup_duration = startup_start.elapsed();
    tracing::info!(
        duration_ms = startup_duration.as_millis() as u64,
        "Service initialized in {:?}",
        startup_duration
    );

    service.start().await
}
