//! Event sink for running batches.
//!
//! The transfer worker reports through this trait rather than a concrete
//! channel so tests (and embedders) can observe events synchronously.

use async_trait::async_trait;
use modsync_schema::SyncEvent;
use tokio::sync::mpsc::{self, error::TrySendError};

#[async_trait]
pub trait EventSink: Send + Sync {
    /// Deliver a progress update without waiting. May be dropped under backpressure.
    fn progress(&self, event: SyncEvent);

    /// Deliver a per-job or terminal event, waiting for capacity if needed.
    async fn emit(&self, event: SyncEvent);
}

/// Bounded channel from the worker task to the caller.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<SyncEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<SyncEvent>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl EventSink for ChannelSink {
    fn progress(&self, event: SyncEvent) {
        match self.tx.try_send(event) {
            Ok(()) | Err(TrySendError::Closed(_)) => {}
            Err(TrySendError::Full(_)) => tracing::trace!("Event channel full, dropping progress"),
        }
    }

    async fn emit(&self, event: SyncEvent) {
        if self.tx.send(event).await.is_err() {
            tracing::debug!("Event receiver dropped");
        }
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy)]
pub struct NullSink;

#[async_trait]
impl EventSink for NullSink {
    fn progress(&self, _: SyncEvent) {}
    async fn emit(&self, _: SyncEvent) {}
}
