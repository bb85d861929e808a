//! Balancing Service entry point.

use balancing_service::config::BalancingConfig;
use balancing_service::startup::Application;

use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load configuration
    let config = BalancingConfig::from_env().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    // Initialize tracing
    init_tracing(&config.service_name, &config.log_level);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting balancing-service"
    );

    // Log configuration (mask sensitive values)
    tracing::info!(
        service_name = %config.service_name,
        range = config.range.preset.as_str(),
        chunk_size = config.report.chunk_size,
        db_max_connections = %config.database.max_connections,
        db_min_connections = %config.database.min_connections,
        export_dir = %config.export.dir.display(),
        "Configuration loaded"
    );

    // Build and run the report
    let app = Application::build(config).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to build application");
        std::io::Error::other(format!("Application build error: {}", e))
    })?;

    if let Err(e) = app.run().await {
        tracing::error!(error = %e, kind = e.kind().as_str(), hint = e.hint(), "Balancing report failed");
        return Err(std::io::Error::other(e.to_string()));
    }

    tracing::info!("Balancing report complete");
    Ok(())
}
