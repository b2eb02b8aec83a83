use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::error;

use crate::{error::Error, message_log::MessageLog, models::Message};

/// List the full room log, ascending by creation time
/// GET /api/messages
///
/// The response is a complete snapshot, not a delta: polling clients keep
/// their previously seen count/ids and diff locally. That is only safe
/// because the log is append-only.
#[tracing::instrument(skip(log))]
pub async fn get_messages(
    State(log): State<Arc<MessageLog>>,
) -> Result<Json<Vec<Message>>, Error> {
    let messages = log.list().await.map_err(|e| {
        error!("Failed to list messages: {}", e);
        e
    })?;

    Ok(Json(messages))
}
