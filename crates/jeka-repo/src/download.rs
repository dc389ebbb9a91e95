//! HTTP downloads with authentication and retries.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use jeka_util::errors::JekaError;
use reqwest::Client;

use crate::auth;
use crate::layout::RepositorySpec;

const MAX_RETRIES: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_millis(500);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const PROGRESS_THRESHOLD: u64 = 512 * 1024;

/// Build the HTTP client shared by all downloads of one repository.
pub fn build_client(repository: &str) -> Result<Client, JekaError> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("jeka/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| JekaError::RepositoryAccess {
            repository: repository.to_string(),
            message: format!("Failed to create HTTP client: {e}"),
        })
}

/// Download raw bytes from `url`.
///
/// Returns `Ok(None)` for 404. Server errors, timeouts and connection
/// failures are retried with a growing delay before giving up.
pub async fn download_bytes(
    client: &Client,
    repo: &RepositorySpec,
    url: &str,
) -> Result<Option<Vec<u8>>, JekaError> {
    let fail = |message: String| JekaError::RepositoryAccess {
        repository: repo.name.clone(),
        message,
    };
    let mut last_err = String::new();

    for attempt in 0..MAX_RETRIES {
        if attempt > 0 {
            tracing::debug!(%url, attempt, "retrying download");
            tokio::time::sleep(RETRY_DELAY * attempt).await;
        }

        let request = auth::apply_auth(client.get(url), repo);
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() || e.is_connect() => {
                last_err = e.to_string();
                continue;
            }
            Err(e) => return Err(fail(format!("Request to {url} failed: {e}"))),
        };

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if status.is_server_error() {
            last_err = format!("HTTP {status}");
            continue;
        }
        if !status.is_success() {
            return Err(fail(format!("HTTP {status} fetching {url}")));
        }

        let progress = response
            .content_length()
            .filter(|len| *len > PROGRESS_THRESHOLD)
            .map(|len| progress_bar(len, url));
        let bytes = response
            .bytes()
            .await
            .map_err(|e| fail(format!("Failed to read response from {url}: {e}")))?;
        if let Some(pb) = progress {
            pb.set_position(bytes.len() as u64);
            pb.finish_and_clear();
        }
        return Ok(Some(bytes.to_vec()));
    }

    Err(fail(format!(
        "Failed after {MAX_RETRIES} attempts for {url}: {last_err}"
    )))
}

/// Download a text file (POM, metadata, checksum sidecar).
pub async fn download_text(
    client: &Client,
    repo: &RepositorySpec,
    url: &str,
) -> Result<Option<String>, JekaError> {
    Ok(download_bytes(client, repo, url)
        .await?
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
}

fn progress_bar(total: u64, url: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::with_template("  {msg} {bar:30.cyan/dim} {bytes}/{total_bytes}") {
        pb.set_style(style.progress_chars("##-"));
    }
    let label = url.rsplit('/').next().unwrap_or(url);
    pb.set_message(label.to_string());
    pb
}
