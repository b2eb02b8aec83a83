//! Postgres-backed message store.
//!
//! Only messages are durable. Typing presence lives in memory on purpose;
//! a restart may safely drop it.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

use crate::error::Error;
use crate::message_log::MessageStore;
use crate::models::Message;

pub type DbPool = PgPool;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost/parlor".to_string()),
            max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            min_connections: 2,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
        }
    }
}

/// Initialize database connection pool with configuration
pub async fn init_db(config: DbConfig) -> Result<DbPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    info!(
        "Database pool initialized with max_connections={}, min_connections={}",
        config.max_connections, config.min_connections
    );

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    Ok(pool)
}

/// Initialize database with default configuration
pub async fn init_db_default() -> Result<DbPool> {
    init_db(DbConfig::default()).await
}

/// Durable message store. The `seq` column records arrival order so equal
/// timestamps list back in the order they were appended.
pub struct PgMessageStore {
    pool: DbPool,
}

impl PgMessageStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageStore for PgMessageStore {
    async fn insert(&self, message: &Message) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO messages (id, content, author, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&message.id)
        .bind(&message.content)
        .bind(&message.author)
        .bind(message.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Unavailable(e.to_string()))?;

        Ok(())
    }

    async fn list(&self) -> Result<Vec<Message>, Error> {
        sqlx::query_as::<_, Message>(
            r#"
            SELECT id, content, author, created_at
            FROM messages
            ORDER BY created_at ASC, seq ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::Unavailable(e.to_string()))
    }

    async fn ping(&self) -> Result<(), Error> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| Error::Unavailable(e.to_string()))
    }
}
