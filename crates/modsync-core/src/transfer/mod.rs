//! Download orchestration.
//!
//! A batch runs its jobs strictly one after another. Each job streams to a
//! `<dest>.tmp` staging file which is renamed over the destination only once
//! the body has arrived in full, so a mods directory never holds a partial
//! archive under its real name.

mod download;
mod orchestrator;
mod sink;
mod throttle;

pub use download::{TransferProgress, download_job};
pub use orchestrator::{BatchHandle, Orchestrator};
pub use sink::{ChannelSink, EventSink, NullSink};
pub use throttle::{PROGRESS_INTERVAL, ProgressThrottle};

use std::io;
use std::path::PathBuf;

use modsync_schema::{STAGING_SUFFIX, SyncEvent};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("Download failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned status {0}")]
    Status(StatusCode),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to move download into {dest}: {source}")]
    Commit {
        dest: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Transfer cancelled")]
    Cancelled,

    #[error("A sync is already running")]
    BatchAlreadyRunning,

    #[error("Transfer worker stopped unexpectedly: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// One archive to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferJob {
    pub filename: String,
    pub url: String,
    pub dest: PathBuf,
}

impl TransferJob {
    pub fn new(filename: &str, url: &str, dest: PathBuf) -> Self {
        Self {
            filename: filename.to_string(),
            url: url.to_string(),
            dest,
        }
    }

    /// Where bytes land while the transfer is in flight.
    pub fn staging_path(&self) -> PathBuf {
        let mut path = self.dest.clone().into_os_string();
        path.push(STAGING_SUFFIX);
        PathBuf::from(path)
    }
}

/// Where a job ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Transferring,
    Committed,
    Failed(String),
    Cancelled,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending | Self::Transferring)
    }
}

/// Per-job outcomes of a batch, in job order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub outcomes: Vec<(String, JobState)>,
    pub cancelled: bool,
}

impl BatchReport {
    pub fn committed(&self) -> usize {
        self.count(|s| matches!(s, JobState::Committed))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, JobState::Failed(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, JobState::Cancelled))
    }

    /// The event that closes the batch.
    pub fn terminal_event(&self) -> SyncEvent {
        if self.cancelled {
            SyncEvent::SyncCancelled
        } else {
            SyncEvent::SyncComplete
        }
    }

    fn count(&self, pred: impl Fn(&JobState) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, s)| pred(s)).count()
    }
}

/// Run every job and emit per-job events, but not the terminal event.
///
/// A failed job does not stop the batch. Cancellation is checked before
/// each job and while one is streaming; jobs that never started are
/// reported as cancelled.
pub async fn run_jobs<S: EventSink + ?Sized>(
    client: &Client,
    jobs: &[TransferJob],
    cancel: &CancellationToken,
    sink: &S,
) -> BatchReport {
    let total = jobs.len();
    let mut states = vec![JobState::Pending; total];
    let mut cancelled = false;

    for (i, job) in jobs.iter().enumerate() {
        if cancel.is_cancelled() {
            cancelled = true;
            break;
        }

        let index = i + 1;
        states[i] = JobState::Transferring;
        tracing::info!("Downloading {} ({index}/{total})", job.filename);

        let mut on_progress = |p: TransferProgress| {
            sink.progress(SyncEvent::Progress {
                filename: job.filename.clone(),
                progress: p.fraction(),
                index,
                total,
                bytes_so_far: p.bytes_so_far,
                bytes_total: p.bytes_total.unwrap_or(0),
                speed_label: p.speed_label(),
            });
        };

        match download_job(client, job, cancel, &mut on_progress).await {
            Ok(bytes) => {
                tracing::debug!("{}: committed {bytes} bytes", job.filename);
                states[i] = JobState::Committed;
                sink.emit(SyncEvent::Complete {
                    filename: job.filename.clone(),
                })
                .await;
            }
            Err(TransferError::Cancelled) => {
                tracing::info!("{}: cancelled", job.filename);
                states[i] = JobState::Cancelled;
                cancelled = true;
                break;
            }
            Err(e) => {
                tracing::warn!("{}: {e}", job.filename);
                let error = e.to_string();
                states[i] = JobState::Failed(error.clone());
                sink.emit(SyncEvent::Error {
                    filename: job.filename.clone(),
                    error,
                })
                .await;
            }
        }
    }

    if cancelled {
        for state in states.iter_mut().filter(|s| !s.is_terminal()) {
            *state = JobState::Cancelled;
        }
    }

    BatchReport {
        outcomes: jobs.iter().map(|j| j.filename.clone()).zip(states).collect(),
        cancelled,
    }
}

/// Run a batch to the end, closing it with `SyncComplete` or `SyncCancelled`.
pub async fn run_batch<S: EventSink + ?Sized>(
    client: &Client,
    jobs: &[TransferJob],
    cancel: &CancellationToken,
    sink: &S,
) -> BatchReport {
    let report = run_jobs(client, jobs, cancel, sink).await;
    sink.emit(report.terminal_event()).await;
    report
}
