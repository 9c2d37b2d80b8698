//! PlankIt timer - hosts one timer session for an embedding UI
//!
//! This is the main entry point for the plankit-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use plankit_timer::{
    api::create_router,
    config::Config,
    orchestrator::Collaborators,
    services::{AudioCueEmitter, LogRecorder, StaticCapabilities},
    state::AppState,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("plankit_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting plankit-timer v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: host={}, port={}, duration={}s, exercise={}",
        config.host, config.port, config.duration, config.exercise
    );

    let collaborators = Collaborators {
        audio: completion_audio(!config.mute),
        recorder: Arc::new(LogRecorder),
        capabilities: Arc::new(StaticCapabilities::new(config.capabilities())),
    };

    // Create application state with the initial session
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        config.settings(),
        collaborators,
    )?);

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /timer              - New session {{duration_seconds, exercise_id}}");
    info!("  POST /timer/start|pause|resume|stop|reset|skip");
    info!("  POST /breathing          - Toggle breathing guidance {{enabled}}");
    info!("  POST /coaching, /tips    - Set overlay text {{message}}");
    info!("  POST /sound/toggle       - Toggle completion sound");
    info!("  GET  /status             - Current timer view");
    info!("  GET  /timer/events       - Countdown updates (SSE)");
    info!("  GET  /health             - Health check");

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

#[cfg(feature = "speaker")]
fn completion_audio(sound_enabled: bool) -> AudioCueEmitter {
    AudioCueEmitter::new(sound_enabled, Arc::new(plankit_timer::services::SpeakerSink))
}

#[cfg(not(feature = "speaker"))]
fn completion_audio(sound_enabled: bool) -> AudioCueEmitter {
    AudioCueEmitter::silent(sound_enabled)
}
