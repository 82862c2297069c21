//! Background idle-session expiry.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::dialogue::store::SessionStore;

/// Periodically expires idle sessions until shut down or dropped.
#[derive(Debug)]
pub struct SessionSweeper {
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl SessionSweeper {
    /// Start sweeping `store` every `interval`. Must be called inside a tokio
    /// runtime.
    pub fn spawn(store: Arc<SessionStore>, interval: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let expired = store.sweep_expired(Instant::now());
                        if expired > 0 {
                            debug!("sweep expired {expired} session(s), {} active", store.active_sessions());
                        }
                    }
                    _ = &mut shutdown_rx => break,
                }
            }
            info!("session sweeper stopped");
        });

        info!("session sweeper started, interval {interval:?}");
        Self {
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// Stop the sweeper and wait for the task to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for SessionSweeper {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}
