//! Events emitted while a sync batch runs.
//!
//! The serialized form uses the event names the front end subscribes to
//! (`download:progress`, `sync:complete`, ...) as the `event` tag.

use serde::{Deserialize, Serialize};

/// One notification from a running batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum SyncEvent {
    /// Throttled progress for the job currently transferring.
    #[serde(rename = "download:progress", rename_all = "camelCase")]
    Progress {
        /// Archive being fetched.
        filename: String,
        /// Fraction in `[0, 1]`; `0` when the total is unknown.
        progress: f64,
        /// 1-based position of the job within the batch.
        index: usize,
        /// Number of jobs in the batch.
        total: usize,
        /// Bytes received so far.
        bytes_so_far: u64,
        /// Advertised length, `0` when the server sent none.
        bytes_total: u64,
        /// Average throughput since the job started (e.g. `1.20 MB/s`).
        speed_label: String,
    },
    /// A job was committed to its final path.
    #[serde(rename = "download:complete")]
    Complete {
        /// Archive that was committed.
        filename: String,
    },
    /// A job failed; the batch continues with the next job.
    #[serde(rename = "download:error")]
    Error {
        /// Archive that failed.
        filename: String,
        /// Failure detail.
        error: String,
    },
    /// Every job reached a terminal state and no cancellation was observed.
    #[serde(rename = "sync:complete")]
    SyncComplete,
    /// The batch stopped because it was cancelled.
    #[serde(rename = "sync:cancelled")]
    SyncCancelled,
}

impl SyncEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Progress { .. } => "download:progress",
            Self::Complete { .. } => "download:complete",
            Self::Error { .. } => "download:error",
            Self::SyncComplete => "sync:complete",
            Self::SyncCancelled => "sync:cancelled",
        }
    }

    /// Whether this event ends the batch.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::SyncComplete | Self::SyncCancelled)
    }

    /// Progress events may be dropped under backpressure; everything else must be delivered.
    pub fn is_lossy(&self) -> bool {
        matches!(self, Self::Progress { .. })
    }
}
