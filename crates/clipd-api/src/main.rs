//! clipd server binary.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use clipd_api::{create_router, ApiConfig, AppState};
use clipd_worker::{ClipPipeline, Worker};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting clipd");

    // Load configuration
    let config = ApiConfig::from_env();
    info!(
        "Config: host={}, port={}, data_dir={}",
        config.host,
        config.port,
        config.data_dir.display()
    );

    // Probe encoder capabilities once; immutable afterwards
    let encoder = clipd_media::detect_encoder().await;

    // Create application state and the worker's queue receiver
    let (state, rx) = match AppState::new(config.clone(), encoder).await {
        Ok(v) => v,
        Err(e) => {
            error!("Failed to create application state: {}", e);
            std::process::exit(1);
        }
    };

    // Spawn the single clip worker for the process lifetime
    let pipeline = ClipPipeline::new(state.resolver.clone(), (*state.encoder).clone());
    let worker = Worker::new(Arc::clone(&state.registry), pipeline, config.clips_dir());
    tokio::spawn(worker.run(rx));

    // Create router
    let app = create_router(state);

    // Bind and serve
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Invalid bind address");

    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    info!("Server shutdown complete");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    info!("Received shutdown signal");
}
