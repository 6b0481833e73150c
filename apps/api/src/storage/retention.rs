use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::LocalStore;

const SWEEP_INTERVAL: Duration = Duration::from_secs(3600);

/// Spawns the hourly sweep that purges local session files older than `retention`.
pub fn spawn_retention_sweep(store: LocalStore, retention: Duration) -> JoinHandle<()> {
    info!(
        "Session retention sweep every {}s, max age {}h",
        SWEEP_INTERVAL.as_secs(),
        retention.as_secs() / 3600
    );
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            if let Err(e) = store.purge_older_than(retention).await {
                warn!("Retention sweep failed: {e}");
            }
        }
    })
}
