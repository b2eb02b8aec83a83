//! Core data models for the room log and typing presence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tokio::time::Instant;

/// A chat message.
///
/// The id and timestamp are assigned by the server at insertion and never
/// change afterwards; the log as a whole only grows. Maps to the `messages`
/// table when the durable store is enabled. Wire form is
/// `{id, content, author, createdAt}`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub content: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

/// A live typing signal.
///
/// At most one per author: a new signal from the same author replaces the
/// existing one. Signals are never persisted; a restart drops them.
#[derive(Debug, Clone)]
pub struct TypingSignal {
    pub author: String,
    pub last_seen: Instant,
}
