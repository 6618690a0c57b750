use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::api::MessageSource;

/// Fetch pending notifications once. Failures are logged and yield nothing.
pub async fn poll_once(source: &dyn MessageSource) -> Vec<String> {
    match source.fetch_notifications().await {
        Ok(notes) => notes,
        Err(e) => {
            tracing::warn!("Notification poll failed: {}", e);
            Vec::new()
        }
    }
}

/// Poll the server on a fixed interval and forward non-empty batches.
///
/// This is polling, not push: batches carry no ordering relative to page
/// fetches running at the same time. The task stops when `cancel` fires or
/// the receiver is dropped.
pub fn spawn_poller(
    source: Arc<dyn MessageSource>,
    every: Duration,
    tx: mpsc::Sender<Vec<String>>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = ticker.tick() => {}
            }

            let notes = poll_once(source.as_ref()).await;
            if notes.is_empty() {
                continue;
            }
            tracing::debug!(count = notes.len(), "Notifications received");
            if tx.send(notes).await.is_err() {
                return;
            }
        }
    })
}
