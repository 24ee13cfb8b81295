//! At most one batch at a time, running on a background task.

use std::sync::{Arc, Mutex, PoisonError};

use modsync_schema::SyncEvent;
use reqwest::Client;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::sink::{ChannelSink, EventSink};
use super::{BatchReport, TransferError, TransferJob, run_jobs};

/// Default capacity of the event channel handed to callers.
const EVENT_CAPACITY: usize = 64;

type ActiveSlot = Arc<Mutex<Option<CancellationToken>>>;

/// Starts batches and holds the cancel control of the one running.
///
/// Cloning shares the slot, so every clone sees the same running batch.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    client: Client,
    active: ActiveSlot,
    capacity: usize,
}

impl Orchestrator {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            active: Arc::default(),
            capacity: EVENT_CAPACITY,
        }
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Spawn `jobs` as a batch and return immediately.
    ///
    /// Fails with [`TransferError::BatchAlreadyRunning`] if a batch is still
    /// active. Must be called from within a tokio runtime.
    pub fn start(&self, jobs: Vec<TransferJob>) -> Result<BatchHandle, TransferError> {
        let cancel = {
            let mut slot = lock(&self.active);
            if slot.is_some() {
                return Err(TransferError::BatchAlreadyRunning);
            }
            let token = CancellationToken::new();
            *slot = Some(token.clone());
            token
        };

        tracing::debug!("Starting batch of {} jobs", jobs.len());

        let (tx, rx) = mpsc::channel(self.capacity);
        let sink = ChannelSink::new(tx);
        let client = self.client.clone();
        let guard = SlotGuard(Arc::clone(&self.active));
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            let report = run_jobs(&client, &jobs, &token, &sink).await;
            // Release before announcing the end so a caller reacting to the
            // terminal event can start the next batch.
            drop(guard);
            sink.emit(report.terminal_event()).await;
            report
        });

        Ok(BatchHandle {
            events: rx,
            cancel,
            task,
        })
    }

    /// Signal the running batch, if any. Returns whether one was running.
    pub fn cancel(&self) -> bool {
        match lock(&self.active).as_ref() {
            Some(token) => {
                tracing::info!("Cancelling running batch");
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        lock(&self.active).is_some()
    }
}

/// The slot only holds a token, so a poisoned lock is still usable.
fn lock(slot: &ActiveSlot) -> std::sync::MutexGuard<'_, Option<CancellationToken>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clears the active slot when the worker ends, even by panic.
struct SlotGuard(ActiveSlot);

impl Drop for SlotGuard {
    fn drop(&mut self) {
        lock(&self.0).take();
    }
}

/// Caller side of a running batch.
#[derive(Debug)]
pub struct BatchHandle {
    events: mpsc::Receiver<SyncEvent>,
    cancel: CancellationToken,
    task: JoinHandle<BatchReport>,
}

impl BatchHandle {
    /// Next event, or `None` once the batch has ended and the channel drained.
    pub async fn next_event(&mut self) -> Option<SyncEvent> {
        self.events.recv().await
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A token that cancels this batch, for signal handlers.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait for the worker and return its report. Undelivered events are discarded.
    pub async fn finish(self) -> Result<BatchReport, TransferError> {
        drop(self.events);
        Ok(self.task.await?)
    }
}
