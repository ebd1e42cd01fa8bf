use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::ExpiryConfig;
use crate::error::{ExpiryError, StoreError};
use crate::store::ArticleStore;

pub struct ExpiryHandle {
    cancel_tx: broadcast::Sender<()>,
    join: JoinHandle<()>,
}

impl ExpiryHandle {
    /// Stops the scheduler. A sweep already running is allowed to finish.
    pub async fn stop(self) -> Result<(), ExpiryError> {
        let _ = self.cancel_tx.send(());
        self.join.await.map_err(ExpiryError::from)
    }
}

/// Removes every article whose TTL has elapsed.
pub async fn sweep_once(store: &ArticleStore) -> Result<usize, StoreError> {
    let cutoff = Utc::now()
        .checked_sub_signed(store.ttl())
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    store.expire(cutoff).await
}

pub fn spawn_expiry(store: ArticleStore, config: ExpiryConfig) -> ExpiryHandle {
    let (cancel_tx, mut cancel_rx) = broadcast::channel(1);
    let join = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(config.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel_rx.recv() => {
                    info!("expiry scheduler shutdown requested");
                    break;
                }
                _ = ticker.tick() => {
                    match sweep_once(&store).await {
                        Ok(removed) => debug!(removed, "expiry sweep finished"),
                        Err(err) => warn!(error = %err, "expiry sweep failed"),
                    }
                }
            }
        }
    });

    ExpiryHandle { cancel_tx, join }
}
