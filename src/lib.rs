pub mod db;
pub mod error;
pub mod handlers;
pub mod health;
pub mod jobs;
pub mod message_log;
pub mod metrics;
pub mod models;
pub mod presence;
