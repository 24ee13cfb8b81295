//! Catalog page retrieval.

use reqwest::{Client, StatusCode};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to connect: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned status {0}")]
    Status(StatusCode),
}

/// GET the catalog page and return its body. Any non-2xx status is an error.
pub async fn fetch_document(client: &Client, url: &str) -> Result<String, FetchError> {
    tracing::debug!("Fetching catalog from {url}");

    let response = client
        .get(url)
        .header(reqwest::header::USER_AGENT, crate::USER_AGENT)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }

    Ok(response.text().await?)
}
