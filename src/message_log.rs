//! Append-only message log for the room.
//!
//! Messages are validated, stamped, and appended; nothing is ever updated or
//! deleted. Polling clients rely on the log only growing, so `list` must
//! return a consistent snapshot even while appends are in flight.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::error::Error;
use crate::models::Message;

/// Maximum message body length, in characters.
pub const MAX_CONTENT_CHARS: usize = 500;

/// Storage seam for the message log.
///
/// The in-memory store is the default; `db::PgMessageStore` implements the
/// same contract on Postgres. Implementations must return `list` snapshots
/// that never tear or duplicate entries under concurrent inserts.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn insert(&self, message: &Message) -> Result<(), Error>;
    async fn list(&self) -> Result<Vec<Message>, Error>;
    async fn ping(&self) -> Result<(), Error>;
}

/// In-memory message store. Insertion order is arrival order.
#[derive(Default)]
pub struct MemoryMessageStore {
    messages: RwLock<Vec<Message>>,
}

impl MemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageStore for MemoryMessageStore {
    async fn insert(&self, message: &Message) -> Result<(), Error> {
        self.messages.write().await.push(message.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Message>, Error> {
        Ok(self.messages.read().await.clone())
    }

    async fn ping(&self) -> Result<(), Error> {
        Ok(())
    }
}

/// The room's append-only log.
pub struct MessageLog {
    store: Arc<dyn MessageStore>,
    // Serializes appends so timestamp assignment and arrival order at the
    // store cannot disagree. Ties on created_at break by arrival.
    append_lock: Mutex<()>,
}

impl MessageLog {
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self {
            store,
            append_lock: Mutex::new(()),
        }
    }

    /// Validate and append a message, assigning its id and timestamp.
    ///
    /// All-or-nothing: on rejection the log is unchanged.
    pub async fn append(&self, content: &str, author: &str) -> Result<Message, Error> {
        validate_message(content, author)?;

        let _guard = self.append_lock.lock().await;
        let message = Message {
            id: Uuid::new_v4().to_string(),
            content: content.to_string(),
            author: author.trim().to_string(),
            created_at: Utc::now(),
        };
        self.store.insert(&message).await?;
        Ok(message)
    }

    /// Snapshot of all messages, ascending by `created_at`.
    ///
    /// The sort is stable, so entries with equal timestamps keep their
    /// arrival order.
    pub async fn list(&self) -> Result<Vec<Message>, Error> {
        let mut messages = self.store.list().await?;
        messages.sort_by_key(|m| m.created_at);
        Ok(messages)
    }

    /// Probe the underlying store, for readiness checks.
    pub async fn ping(&self) -> Result<(), Error> {
        self.store.ping().await
    }
}

fn validate_message(content: &str, author: &str) -> Result<(), Error> {
    if content.trim().is_empty() {
        return Err(Error::Validation("content must not be empty".to_string()));
    }
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(Error::Validation(format!(
            "content must be at most {} characters",
            MAX_CONTENT_CHARS
        )));
    }
    if author.trim().is_empty() {
        return Err(Error::Validation("author must not be empty".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn new_log() -> MessageLog {
        MessageLog::new(Arc::new(MemoryMessageStore::new()))
    }

    #[tokio::test]
    async fn test_append_assigns_id_and_timestamp() {
        let log = new_log();

        let message = log.append("hello", "alice").await.expect("append failed");

        assert!(!message.id.is_empty());
        assert_eq!(message.content, "hello");
        assert_eq!(message.author, "alice");
    }

    #[tokio::test]
    async fn test_list_preserves_append_order() {
        let log = new_log();

        log.append("hi", "alice").await.expect("append failed");
        log.append("yo", "bob").await.expect("append failed");

        let messages = log.list().await.expect("list failed");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "hi");
        assert_eq!(messages[0].author, "alice");
        assert_eq!(messages[1].content, "yo");
        assert_eq!(messages[1].author, "bob");
        assert!(messages[0].created_at <= messages[1].created_at);
    }

    #[tokio::test]
    async fn test_append_rejects_invalid_input() {
        let log = new_log();

        assert!(matches!(
            log.append("", "alice").await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            log.append("   ", "alice").await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            log.append(&"x".repeat(MAX_CONTENT_CHARS + 1), "alice").await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            log.append("hello", "").await,
            Err(Error::Validation(_))
        ));

        // No entry was created on any rejection.
        let messages = log.list().await.expect("list failed");
        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn test_append_accepts_content_at_length_limit() {
        let log = new_log();

        let content = "x".repeat(MAX_CONTENT_CHARS);
        log.append(&content, "alice").await.expect("append failed");

        let messages = log.list().await.expect("list failed");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content.chars().count(), MAX_CONTENT_CHARS);
    }

    #[tokio::test]
    async fn test_length_limit_counts_characters_not_bytes() {
        let log = new_log();

        // 500 multibyte characters is within the limit even though the byte
        // length is far above it.
        let content = "é".repeat(MAX_CONTENT_CHARS);
        assert!(content.len() > MAX_CONTENT_CHARS);
        log.append(&content, "alice").await.expect("append failed");
    }

    #[tokio::test]
    async fn test_equal_timestamps_keep_arrival_order() {
        // Seed the store directly with identical timestamps; the stable sort
        // in list() must keep insertion order.
        let store = Arc::new(MemoryMessageStore::new());
        let at = chrono::Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        for i in 0..5 {
            let message = Message {
                id: format!("id-{}", i),
                content: format!("message {}", i),
                author: "alice".to_string(),
                created_at: at,
            };
            store.insert(&message).await.expect("insert failed");
        }

        let log = MessageLog::new(store);
        let messages = log.list().await.expect("list failed");
        let ids: Vec<&str> = messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["id-0", "id-1", "id-2", "id-3", "id-4"]);
    }

    #[tokio::test]
    async fn test_author_is_trimmed() {
        let log = new_log();

        let message = log.append("hello", "  alice  ").await.expect("append failed");
        assert_eq!(message.author, "alice");
    }
}
