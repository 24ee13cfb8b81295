//! Single-archive download: stream to a staging file, then rename into place.

use std::path::Path;
use std::time::{Duration, Instant};

use futures::StreamExt;
use modsync_schema::format_speed;
use reqwest::{Client, Response};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

use super::throttle::ProgressThrottle;
use super::{TransferError, TransferJob};

/// Bytes received so far for the job in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferProgress {
    pub bytes_so_far: u64,
    /// `None` when the server sent no Content-Length.
    pub bytes_total: Option<u64>,
    pub elapsed: Duration,
}

impl TransferProgress {
    /// Completed fraction in `[0, 1]`, or 0 when the total is unknown.
    pub fn fraction(&self) -> f64 {
        match self.bytes_total {
            Some(total) if total > 0 => (self.bytes_so_far as f64 / total as f64).min(1.0),
            _ => 0.0,
        }
    }

    pub fn speed_label(&self) -> String {
        format_speed(self.bytes_so_far, self.elapsed)
    }
}

/// Download one job, reporting throttled progress through `on_progress`.
///
/// On success the archive sits at `job.dest` and the staging file is gone.
/// On any failure, cancellation included, the staging file is removed and
/// `job.dest` is untouched.
pub async fn download_job(
    client: &Client,
    job: &TransferJob,
    cancel: &CancellationToken,
    on_progress: &mut (dyn FnMut(TransferProgress) + Send),
) -> Result<u64, TransferError> {
    let request = client
        .get(&job.url)
        .header(reqwest::header::USER_AGENT, crate::USER_AGENT)
        .send();

    let response = tokio::select! {
        biased;
        () = cancel.cancelled() => return Err(TransferError::Cancelled),
        response = request => response?,
    };

    let status = response.status();
    if !status.is_success() {
        return Err(TransferError::Status(status));
    }

    if let Some(parent) = job.dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let staging = job.staging_path();
    let result = match stream_to_staging(response, &staging, cancel, on_progress).await {
        Ok(bytes) => commit(&staging, &job.dest).await.map(|()| bytes),
        Err(e) => Err(e),
    };

    if result.is_err() {
        // Best effort; the file may never have been created.
        tokio::fs::remove_file(&staging).await.ok();
    }
    result
}

async fn stream_to_staging(
    response: Response,
    staging: &Path,
    cancel: &CancellationToken,
    on_progress: &mut (dyn FnMut(TransferProgress) + Send),
) -> Result<u64, TransferError> {
    let bytes_total = response.content_length();
    let started = Instant::now();
    let mut throttle = ProgressThrottle::new(started);
    let mut downloaded: u64 = 0;

    let mut file = File::create(staging).await?;
    let mut stream = response.bytes_stream();

    loop {
        let chunk = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(TransferError::Cancelled),
            chunk = stream.next() => chunk,
        };
        let Some(chunk) = chunk else { break };
        let chunk = chunk?;

        file.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;

        let now = Instant::now();
        if throttle.ready(now) {
            on_progress(TransferProgress {
                bytes_so_far: downloaded,
                bytes_total,
                elapsed: now - started,
            });
        }
    }

    // A body cut short of its Content-Length surfaces above as an Http error.
    file.flush().await?;
    drop(file);

    on_progress(TransferProgress {
        bytes_so_far: downloaded,
        bytes_total,
        elapsed: started.elapsed(),
    });
    Ok(downloaded)
}

async fn commit(staging: &Path, dest: &Path) -> Result<(), TransferError> {
    tokio::fs::rename(staging, dest)
        .await
        .map_err(|source| TransferError::Commit {
            dest: dest.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use tempfile::TempDir;

    #[test]
    fn test_fraction() {
        let p = TransferProgress {
            bytes_so_far: 25,
            bytes_total: Some(100),
            elapsed: Duration::from_secs(1),
        };
        assert_eq!(p.fraction(), 0.25);

        let unknown = TransferProgress {
            bytes_total: None,
            ..p.clone()
        };
        assert_eq!(unknown.fraction(), 0.0);
    }

    #[tokio::test]
    async fn test_download_creates_parent_and_commits() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/mods/a.zip")
            .with_status(200)
            .with_body("archive-bytes")
            .create_async()
            .await;

        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("nested/mods/a.zip");
        let job = TransferJob::new("a.zip", &format!("{}/mods/a.zip", server.url()), dest.clone());

        let mut seen = Vec::new();
        let bytes = download_job(
            &Client::new(),
            &job,
            &CancellationToken::new(),
            &mut |p| seen.push(p),
        )
        .await
        .unwrap();

        assert_eq!(bytes, 13);
        assert_eq!(std::fs::read(&dest).unwrap(), b"archive-bytes");
        assert!(!job.staging_path().exists());
        // The final report always carries the full byte count.
        assert_eq!(seen.last().unwrap().bytes_so_far, 13);
    }

    #[tokio::test]
    async fn test_download_replaces_existing_archive() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/mods/a.zip")
            .with_status(200)
            .with_body("new")
            .create_async()
            .await;

        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("a.zip");
        std::fs::write(&dest, "old archive").unwrap();
        let job = TransferJob::new("a.zip", &format!("{}/mods/a.zip", server.url()), dest.clone());

        download_job(&Client::new(), &job, &CancellationToken::new(), &mut |_| {})
            .await
            .unwrap();
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "new");
    }

    #[tokio::test]
    async fn test_error_status_leaves_destination_alone() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/mods/a.zip")
            .with_status(404)
            .create_async()
            .await;

        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("a.zip");
        std::fs::write(&dest, "old archive").unwrap();
        let job = TransferJob::new("a.zip", &format!("{}/mods/a.zip", server.url()), dest.clone());

        let err = download_job(&Client::new(), &job, &CancellationToken::new(), &mut |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::Status(s) if s.as_u16() == 404));
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "old archive");
        assert!(!job.staging_path().exists());
    }

    #[tokio::test]
    async fn test_cancel_mid_stream_removes_staging() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/mods/slow.zip")
            .with_status(200)
            .with_chunked_body(|w| {
                for _ in 0..3 {
                    w.write_all(b"chunk")?;
                    std::thread::sleep(Duration::from_millis(200));
                }
                Ok(())
            })
            .create_async()
            .await;

        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("slow.zip");
        let job = TransferJob::new(
            "slow.zip",
            &format!("{}/mods/slow.zip", server.url()),
            dest.clone(),
        );

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let err = download_job(&Client::new(), &job, &cancel, &mut |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::Cancelled));
        assert!(!dest.exists());
        assert!(!job.staging_path().exists());
    }

    #[tokio::test]
    async fn test_rename_failure_is_commit_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/mods/a.zip")
            .with_status(200)
            .with_body("archive-bytes")
            .create_async()
            .await;

        let tmp = TempDir::new().unwrap();
        // A non-empty directory squats on the destination name.
        let dest = tmp.path().join("a.zip");
        std::fs::create_dir(&dest).unwrap();
        std::fs::write(dest.join("keep.txt"), "x").unwrap();
        let job = TransferJob::new("a.zip", &format!("{}/mods/a.zip", server.url()), dest.clone());

        let err = download_job(&Client::new(), &job, &CancellationToken::new(), &mut |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::Commit { dest: ref d, .. } if *d == dest));
        assert!(!job.staging_path().exists());
        assert!(dest.join("keep.txt").exists());
    }

    #[tokio::test]
    async fn test_truncated_body_fails_and_cleans_up() {
        use tokio::io::AsyncReadExt;
        use tokio::net::TcpListener;

        // Advertise more bytes than are sent, then hang up.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\nshort")
                .await
                .unwrap();
            socket.shutdown().await.ok();
        });

        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("a.zip");
        std::fs::write(&dest, "old archive").unwrap();
        let job = TransferJob::new("a.zip", &format!("http://{addr}/mods/a.zip"), dest.clone());

        let err = download_job(&Client::new(), &job, &CancellationToken::new(), &mut |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, TransferError::Http(_)));
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "old archive");
        assert!(!job.staging_path().exists());
    }
}
