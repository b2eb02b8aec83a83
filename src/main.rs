use axum::{
    extract::FromRef,
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod db;
mod error;
mod handlers;
mod health;
mod jobs;
mod message_log;
mod metrics;
mod models;
mod presence;

use message_log::{MemoryMessageStore, MessageLog, MessageStore};
use presence::{PresenceConfig, PresenceRegistry};

// Composite state for Axum
#[derive(Clone, FromRef)]
struct AppState {
    message_log: Arc<MessageLog>,
    presence: Arc<PresenceRegistry>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parlor_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    tracing::info!("Starting Parlor chat server");

    // Initialize metrics
    let metrics_recorder = metrics::MetricsRecorder::new();
    let metrics_handle = metrics_recorder.handle().clone();
    tracing::info!("Metrics initialized");

    // Pick the message store. Messages are only durable when asked for;
    // typing presence is always in-memory.
    let durable = matches!(
        std::env::var("DURABLE_MESSAGES").as_deref(),
        Ok("1") | Ok("true") | Ok("TRUE")
    );
    let store: Arc<dyn MessageStore> = if durable {
        let pool = db::init_db_default().await?;
        tracing::info!("Durable message store initialized");
        Arc::new(db::PgMessageStore::new(pool))
    } else {
        tracing::info!("Using in-memory message store");
        Arc::new(MemoryMessageStore::new())
    };
    let message_log = Arc::new(MessageLog::new(store));

    // Presence registry and its sweep worker
    let presence_config = PresenceConfig::default();
    let presence = Arc::new(PresenceRegistry::new(&presence_config));
    let sweeper = tokio::spawn(jobs::run_presence_sweep_worker(
        presence.clone(),
        presence_config.sweep_interval,
    ));
    tracing::info!(
        "Presence sweep worker started (active={:?}, reap={:?}, interval={:?})",
        presence_config.active_window,
        presence_config.reap_window,
        presence_config.sweep_interval
    );

    // Create composite app state
    let app_state = AppState {
        message_log,
        presence,
    };

    // Build application router
    let metrics_router = Router::new()
        .route("/metrics", get(metrics::metrics_handler))
        .with_state(metrics_handle);

    let app = Router::new()
        // Health check endpoints
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        // Polling sync endpoints
        .route("/api/messages", get(handlers::get_messages))
        .route("/api/messages", post(handlers::send_message))
        .route("/api/typing", get(handlers::get_typing))
        .route("/api/typing", post(handlers::send_typing))
        .merge(metrics_router)
        .layer(axum::middleware::from_fn(metrics::track_request_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let port = std::env::var("SERVER_PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse::<u16>()
        .unwrap_or(8080);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    // The sweep task is owned by this function's lifetime; stop it with the
    // server.
    sweeper.abort();

    Ok(())
}
