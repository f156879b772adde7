//! Countdown Dial - a countdown timer with a circular progress dial
//! 
//! This is the main entry point for the countdown-dial application.

use std::sync::Arc;
use anyhow::Context;
use tokio::{
    net::TcpListener,
    sync::{mpsc, watch},
    time::Instant,
};
use tracing::{error, info, warn};

use countdown_dial::{
    api::create_router,
    config::Config,
    state::AppState,
    surface::{
        headless::{Discard, LogNotifier},
        terminal::Screen,
    },
    tasks::{countdown_task, Command},
    timer::{DurationEditor, TimerEngine},
    utils::shutdown_signal,
};

/// Wire the engine to the terminal dial, or to nothing when quiet
fn build_engine(config: &Config) -> TimerEngine {
    if config.quiet {
        TimerEngine::new(
            DurationEditor::headless(config.validation, config.with_hundredths()),
            Box::new(Discard),
            Box::new(Discard),
            Box::new(LogNotifier),
        )
    } else {
        let screen = Screen::new(config.with_hundredths());
        TimerEngine::new(
            DurationEditor::new(config.validation, screen.fields()),
            Box::new(screen.toggle()),
            Box::new(screen.renderer()),
            Box::new(screen.notifier()),
        )
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Logs go to stderr so they do not tear the dial line on stdout
    tracing_subscriber::fmt()
        .with_env_filter(format!("countdown_dial={},tower_http=info", config.log_level()))
        .with_writer(std::io::stderr)
        .init();

    info!("Starting countdown-dial v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, validation={:?}, frame={}ms", 
          config.host, config.port, config.validation, config.frame_ms);

    let engine = build_engine(&config);
    let (command_tx, command_rx) = mpsc::channel(32);
    let (snapshot_tx, snapshot_rx) = watch::channel(engine.snapshot(Instant::now()));

    // Start the countdown task
    tokio::spawn(countdown_task(engine, command_rx, snapshot_tx, config.frame_interval()));

    let state = Arc::new(AppState::new(config.port, config.host.clone(), command_tx, snapshot_rx));

    for (field, text) in config.initial_fields() {
        let command = Command::Edit { field, text: text.to_string() };
        if let Err(e) = state.send("edit", command).await {
            warn!("Could not apply initial {} field: {}", field, e);
        }
    }
    if config.start {
        if let Err(e) = state.send("start", Command::Start).await {
            error!("Could not start countdown: {}", e);
        }
    }

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    
    info!("Control API on http://{}", addr);
    info!("Endpoints:");
    info!("  PUT  /fields/:field - Edit hours, minutes, seconds or hundredths");
    info!("  POST /toggle        - Start, pause or resume");
    info!("  POST /start|/pause|/resume|/stop");
    info!("  GET  /status        - Current timer snapshot");
    info!("  GET  /health        - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);
    
    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        signal = shutdown_signal() => {
            info!("Shutdown signal {} received", signal);
        }
    }

    if let Err(e) = state.send("stop", Command::Stop).await {
        warn!("Failed to stop countdown on shutdown: {}", e);
    }
    if !config.quiet {
        println!();
    }
    info!("Server shutdown complete");
    Ok(())
}
