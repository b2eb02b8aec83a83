//! Ephemeral typing-presence registry.
//!
//! Each author has at most one signal, refreshed on every keystroke poll.
//! Two windows govern behavior: signals younger than the active window count
//! as "currently typing"; signals older than the reap window are physically
//! removed by the periodic sweep. Reap is longer than active, so an entry can
//! be invisible to queries before it is actually deleted.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::error::Error;
use crate::models::TypingSignal;

/// Presence window configuration.
#[derive(Debug, Clone)]
pub struct PresenceConfig {
    /// Signals younger than this are reported as currently typing.
    pub active_window: Duration,
    /// Signals older than this are deleted by the sweep.
    pub reap_window: Duration,
    /// How often the background sweep runs.
    pub sweep_interval: Duration,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            active_window: env_duration_ms("TYPING_ACTIVE_WINDOW_MS", 3_000),
            reap_window: env_duration_ms("TYPING_REAP_WINDOW_MS", 5_000),
            sweep_interval: env_duration_ms("TYPING_SWEEP_INTERVAL_MS", 10_000),
        }
    }
}

fn env_duration_ms(key: &str, default_ms: u64) -> Duration {
    let ms = std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default_ms);
    Duration::from_millis(ms)
}

/// Registry of live typing signals, keyed by author.
///
/// `touch` is the only writer that creates or refreshes entries, `sweep` the
/// only one that deletes them; both take the write lock, so a touch racing a
/// sweep is never lost. Reads see a consistent snapshot.
pub struct PresenceRegistry {
    entries: RwLock<HashMap<String, Instant>>,
    active_window: Duration,
    reap_window: Duration,
}

impl PresenceRegistry {
    pub fn new(config: &PresenceConfig) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            active_window: config.active_window,
            reap_window: config.reap_window,
        }
    }

    /// Record that `author` is typing right now.
    ///
    /// Creates the entry on first signal, refreshes `last_seen` on every
    /// subsequent one. Safe to call at arbitrarily high frequency.
    pub async fn touch(&self, author: &str) -> Result<TypingSignal, Error> {
        let author = author.trim();
        if author.is_empty() {
            return Err(Error::Validation("author must not be empty".to_string()));
        }

        let now = Instant::now();
        self.entries.write().await.insert(author.to_string(), now);
        Ok(TypingSignal {
            author: author.to_string(),
            last_seen: now,
        })
    }

    /// Authors whose signal is within the active window, minus `excluding`.
    ///
    /// Order is unspecified. A user passes their own name as `excluding` so
    /// they never see their own indicator.
    pub async fn active_authors(&self, excluding: Option<&str>) -> Vec<String> {
        let excluding = excluding.map(str::trim);
        let entries = self.entries.read().await;
        let now = Instant::now();

        entries
            .iter()
            .filter(|(author, last_seen)| {
                now.duration_since(**last_seen) < self.active_window
                    && excluding != Some(author.as_str())
            })
            .map(|(author, _)| author.clone())
            .collect()
    }

    /// Drop an author's signal, if present. Advisory; absence is not an
    /// error.
    pub async fn clear(&self, author: &str) -> bool {
        self.entries.write().await.remove(author.trim()).is_some()
    }

    /// Remove every entry older than the reap window, bounding memory.
    ///
    /// Idempotent. `last_seen` is read here, at sweep time, so an entry
    /// refreshed after the tick that scheduled this pass survives it.
    pub async fn sweep(&self) -> usize {
        let mut entries = self.entries.write().await;
        let now = Instant::now();
        let before = entries.len();
        entries.retain(|_, last_seen| now.duration_since(*last_seen) <= self.reap_window);
        before - entries.len()
    }

    /// Number of authors currently tracked, active or awaiting reap.
    pub async fn tracked_authors(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> PresenceConfig {
        PresenceConfig {
            active_window: Duration::from_secs(3),
            reap_window: Duration::from_secs(5),
            sweep_interval: Duration::from_secs(10),
        }
    }

    #[tokio::test]
    async fn test_touch_rejects_empty_author() {
        let registry = PresenceRegistry::new(&test_config());

        assert!(matches!(
            registry.touch("").await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            registry.touch("   ").await,
            Err(Error::Validation(_))
        ));
        assert_eq!(registry.tracked_authors().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_touch_twice_keeps_one_entry_with_latest_time() {
        let registry = PresenceRegistry::new(&test_config());

        let first = registry.touch("alice").await.expect("touch failed");
        tokio::time::advance(Duration::from_millis(100)).await;
        let second = registry.touch("alice").await.expect("touch failed");

        assert_eq!(registry.tracked_authors().await, 1);
        assert!(second.last_seen > first.last_seen);
    }

    #[tokio::test]
    async fn test_active_authors_excludes_caller() {
        let registry = PresenceRegistry::new(&test_config());

        registry.touch("alice").await.expect("touch failed");

        let seen_by_bob = registry.active_authors(Some("bob")).await;
        assert_eq!(seen_by_bob, vec!["alice".to_string()]);

        let seen_by_alice = registry.active_authors(Some("alice")).await;
        assert!(seen_by_alice.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_signal_goes_inactive_before_it_is_reaped() {
        let registry = PresenceRegistry::new(&test_config());

        registry.touch("alice").await.expect("touch failed");
        tokio::time::advance(Duration::from_millis(3_100)).await;

        // Past the active window: invisible to queries, but still tracked.
        assert!(registry.active_authors(None).await.is_empty());
        assert_eq!(registry.tracked_authors().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_removes_stale_entries_only() {
        let registry = PresenceRegistry::new(&test_config());

        registry.touch("alice").await.expect("touch failed");
        tokio::time::advance(Duration::from_secs(6)).await;
        registry.touch("bob").await.expect("touch failed");

        let removed = registry.sweep().await;
        assert_eq!(removed, 1);
        assert_eq!(registry.tracked_authors().await, 1);
        assert_eq!(registry.active_authors(None).await, vec!["bob".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_touch_after_reap_creates_fresh_entry() {
        let registry = PresenceRegistry::new(&test_config());

        registry.touch("alice").await.expect("touch failed");
        tokio::time::advance(Duration::from_secs(6)).await;
        assert_eq!(registry.sweep().await, 1);
        assert_eq!(registry.tracked_authors().await, 0);

        registry.touch("alice").await.expect("touch failed");
        assert_eq!(
            registry.active_authors(None).await,
            vec!["alice".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_is_idempotent() {
        let registry = PresenceRegistry::new(&test_config());

        registry.touch("alice").await.expect("touch failed");
        tokio::time::advance(Duration::from_secs(6)).await;

        assert_eq!(registry.sweep().await, 1);
        assert_eq!(registry.sweep().await, 0);
    }

    #[tokio::test]
    async fn test_clear_drops_signal() {
        let registry = PresenceRegistry::new(&test_config());

        registry.touch("alice").await.expect("touch failed");
        assert!(registry.clear("alice").await);
        assert!(!registry.clear("alice").await);
        assert!(registry.active_authors(None).await.is_empty());
    }
}
