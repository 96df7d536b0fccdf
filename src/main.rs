//! Focus Timer - work/break cycle timer controlled over HTTP
//!
//! This is the main entry point for the focus-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use focus_timer::{
    config::Config,
    state::AppState,
    api::create_router,
    tasks::{finish_alerts_task, stage_ticker_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("focus_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting focus-timer server v{}", env!("CARGO_PKG_VERSION"));

    let timer_config = config.timer_config()?;
    info!(
        "Configuration: host={}, port={}, work={}min, short break={}min, long break={}min, long break every {} cycles",
        config.host,
        config.port,
        timer_config.work_duration,
        timer_config.short_break_duration,
        timer_config.long_break_duration,
        timer_config.cycles_before_long_break
    );

    // Create application state
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        timer_config,
        config.alert_settings(),
    )?);

    // Start the tick source and the finish announcer
    let ticker_state = Arc::clone(&state);
    tokio::spawn(async move {
        stage_ticker_task(ticker_state).await;
    });

    let alerts_state = Arc::clone(&state);
    tokio::spawn(async move {
        finish_alerts_task(alerts_state).await;
    });

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /toggle       - Start or pause the timer");
    info!("  POST /reset        - Reset to the first work stage");
    info!("  POST /skip/:stage  - Jump to work, shortBreak or longBreak");
    info!("  GET  /config       - Current durations");
    info!("  PUT  /config       - Change durations");
    info!("  GET  /status       - Current timer status");
    info!("  GET  /health       - Health check");

    // Serve until SIGTERM/SIGINT
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            info!("Shutdown signal received");
        })
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
