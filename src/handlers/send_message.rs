use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

use crate::{
    error::Error, message_log::MessageLog, models::Message, presence::PresenceRegistry,
};

#[derive(Debug, Deserialize)]
pub struct SendMessageInput {
    pub content: String,
    pub author: String,
}

/// Append a message to the room log
/// POST /api/messages
#[tracing::instrument(skip(log, presence, input))]
pub async fn send_message(
    State(log): State<Arc<MessageLog>>,
    State(presence): State<Arc<PresenceRegistry>>,
    Json(input): Json<SendMessageInput>,
) -> Result<(StatusCode, Json<Message>), Error> {
    let message = log.append(&input.content, &input.author).await.map_err(|e| {
        warn!("Rejected message append: {}", e);
        e
    })?;

    metrics::counter!("chat_messages_sent_total", 1);

    // The sender is no longer typing. Presence is advisory, so this must
    // never affect the send.
    presence.clear(&message.author).await;

    Ok((StatusCode::CREATED, Json(message)))
}
