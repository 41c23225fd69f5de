//! Relay Timer - A sequencing countdown-timer service
//!
//! This is the main entry point for the relay-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use relay_timer::{
    config::Config,
    state::AppState,
    api::create_router,
    services::{JsonFileStore, MemoryStore, Store},
    tasks::{announcement_task, ticker_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("relay_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting relay-timer server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, frame={}ms",
          config.host, config.port, config.frame_ms);

    let store: Arc<dyn Store> = if config.ephemeral {
        info!("Ephemeral mode, queue and settings will not be saved");
        Arc::new(MemoryStore::new())
    } else {
        info!("Storing queue and settings in {}", config.data_dir.display());
        Arc::new(JsonFileStore::new(&config.data_dir))
    };

    // Create application state
    let state = Arc::new(AppState::new(config.port, config.host.clone(), store));

    // Drive the engine at display cadence
    let ticker_state = Arc::clone(&state);
    let frame = config.frame();
    tokio::spawn(async move {
        ticker_task(ticker_state, frame).await;
    });

    let announcement_state = Arc::clone(&state);
    tokio::spawn(async move {
        announcement_task(announcement_state).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST   /start       - Start or resume the active timer");
    info!("  POST   /pause       - Pause the active timer");
    info!("  POST   /skip        - Skip to the next timer");
    info!("  POST   /reset       - Reset all timers");
    info!("  GET    /timers      - List timers");
    info!("  POST   /timers      - Append a timer");
    info!("  PATCH  /timers/:id  - Edit a timer");
    info!("  DELETE /timers/:id  - Remove a timer");
    info!("  GET    /settings    - Read settings");
    info!("  PUT    /settings    - Replace settings");
    info!("  GET    /status      - Check playback status");
    info!("  GET    /health      - Health check");

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

    info!("Server shutdown complete");
    Ok(())
}
