use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::{sync::Arc, time::SystemTime};

use crate::message_log::MessageLog;
use crate::presence::PresenceRegistry;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    timestamp: u64,
    version: String,
    checks: HealthChecks,
}

#[derive(Debug, Serialize)]
pub struct HealthChecks {
    storage: CheckStatus,
    presence: PresenceHealthStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    ready: bool,
    checks: ReadinessChecks,
}

#[derive(Debug, Serialize)]
pub struct ReadinessChecks {
    storage: bool,
}

/// Health status for the typing-presence registry.
#[derive(Debug, Serialize)]
pub struct PresenceHealthStatus {
    /// Authors currently tracked, active or awaiting reap. The reap window
    /// naturally bounds this.
    tracked_authors: usize,
    status: CheckStatus,
}

/// Liveness probe - checks if the application is running
/// Should return 200 OK if the application is alive
pub async fn liveness() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

/// Readiness probe - checks if the application is ready to serve traffic.
///
/// Probes the message store. Returns 200 OK if it is reachable,
/// 503 SERVICE_UNAVAILABLE otherwise.
pub async fn readiness(
    State(log): State<Arc<MessageLog>>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let storage_ready = log.ping().await.is_ok();

    let status = if storage_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ReadinessResponse {
            ready: storage_ready,
            checks: ReadinessChecks {
                storage: storage_ready,
            },
        }),
    )
}

/// Health endpoint - detailed health information.
///
/// Returns storage reachability and presence registry metrics. 200 OK while
/// the storage check passes, 503 SERVICE_UNAVAILABLE otherwise.
pub async fn health(
    State(log): State<Arc<MessageLog>>,
    State(presence): State<Arc<PresenceRegistry>>,
) -> (StatusCode, Json<HealthResponse>) {
    let storage_status = if log.ping().await.is_ok() {
        CheckStatus::Healthy
    } else {
        CheckStatus::Unhealthy
    };

    let presence_status = PresenceHealthStatus {
        tracked_authors: presence.tracked_authors().await,
        status: CheckStatus::Healthy,
    };

    let overall_healthy = matches!(storage_status, CheckStatus::Healthy);
    let status = if overall_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let timestamp = match SystemTime::now().duration_since(SystemTime::UNIX_EPOCH) {
        Ok(d) => d.as_secs(),
        Err(_) => 0,
    };

    (
        status,
        Json(HealthResponse {
            status: if overall_healthy {
                "healthy".to_string()
            } else {
                "unhealthy".to_string()
            },
            timestamp,
            version: env!("CARGO_PKG_VERSION").to_string(),
            checks: HealthChecks {
                storage: storage_status,
                presence: presence_status,
            },
        }),
    )
}
