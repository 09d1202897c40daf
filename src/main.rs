//! Timekeeper - A state-managed HTTP server hosting stopwatches and countdowns
//!
//! This is the main entry point for the timekeeper application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use timekeeper::{
    api::create_router,
    config::Config,
    state::AppState,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("timekeeper={},tower_http=info", config.log_level()))
        .init();

    info!("Starting timekeeper server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, tick={}ms",
          config.host, config.port, config.tick_ms);

    // Create application state; running units tick on this runtime
    let state = AppState::new(
        config.port,
        config.host.clone(),
        config.tick_interval(),
        config.event_capacity(),
    );

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET    /units                - List units");
    info!("  POST   /stopwatches          - Create a stopwatch");
    info!("  POST   /countdowns           - Create a countdown");
    info!("  POST   /units/:id/<action>   - start, pause, resume, toggle, stop");
    info!("  PUT    /units/:id/name       - Rename a unit");
    info!("  PUT    /units/:id/duration   - Set a countdown's duration");
    info!("  DELETE /units/:id            - Delete a unit");
    info!("  DELETE /positions/:position  - Delete the unit at a position");
    info!("  GET    /events               - Stream unit changes");
    info!("  GET    /status               - Check current status");
    info!("  GET    /health               - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    // Release every ticker before the runtime goes away
    match state.stop_all() {
        Ok(count) => info!("Stopped {} units on shutdown", count),
        Err(e) => tracing::error!("Failed to stop units on shutdown: {}", e),
    }

    info!("Server shutdown complete");
    Ok(())
}
