use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::presence::PresenceRegistry;

#[derive(Debug, Deserialize)]
pub struct TypingStatusParams {
    /// Caller's own name; excluded so a user never sees their own indicator.
    pub exclude: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingStatusOutput {
    pub typing_authors: Vec<String>,
}

/// Who is typing right now, excluding the caller
/// GET /api/typing?exclude=<author>
#[tracing::instrument(skip(presence))]
pub async fn get_typing(
    State(presence): State<Arc<PresenceRegistry>>,
    Query(params): Query<TypingStatusParams>,
) -> Json<TypingStatusOutput> {
    let typing_authors = presence.active_authors(params.exclude.as_deref()).await;

    Json(TypingStatusOutput { typing_authors })
}
