use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::{error::Error, presence::PresenceRegistry};

#[derive(Debug, Deserialize)]
pub struct TypingInput {
    pub author: String,
}

#[derive(Debug, Serialize)]
pub struct TypingOutput {
    pub success: bool,
}

/// Refresh the caller's typing signal
/// POST /api/typing
///
/// Clients call this on every local keystroke event; there is no server-side
/// debounce. Bursts of touches are idempotent refreshes of the same entry.
#[tracing::instrument(skip(presence, input))]
pub async fn send_typing(
    State(presence): State<Arc<PresenceRegistry>>,
    Json(input): Json<TypingInput>,
) -> Result<Json<TypingOutput>, Error> {
    presence.touch(&input.author).await.map_err(|e| {
        warn!("Rejected typing touch: {}", e);
        e
    })?;

    metrics::counter!("typing_touches_total", 1);

    Ok(Json(TypingOutput { success: true }))
}
