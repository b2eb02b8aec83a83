use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tracing::{debug, info};

use crate::presence::PresenceRegistry;

/// Background worker that reaps stale typing signals.
///
/// Ticks for the lifetime of the process; each pass is independent, so
/// nothing one pass does can halt the next. The caller owns the spawned
/// task's handle and aborts it on shutdown.
pub async fn run_presence_sweep_worker(registry: Arc<PresenceRegistry>, period: Duration) {
    let mut ticker = interval(period);

    info!("Starting presence sweep worker (runs every {:?})", period);

    loop {
        ticker.tick().await;

        let removed = registry.sweep().await;
        if removed > 0 {
            metrics::counter!("presence_entries_swept_total", removed as u64);
            info!("Swept {} stale typing signals", removed);
        } else {
            debug!("No stale typing signals to sweep");
        }
    }
}
