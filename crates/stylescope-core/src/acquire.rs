//! Sample image acquisition over HTTP.
//!
//! Fetches each configured URL in order and writes successful responses to
//! `<output_prefix>_<index>.jpg`. A failed download is logged and skipped;
//! nothing here is retried.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;

use crate::config::FetchConfig;
use crate::error::DownloadError;

/// Outcome of a [`ImageFetcher::fetch_all`] run.
#[derive(Debug, Default)]
pub struct FetchReport {
    /// Files written, in URL order
    pub saved: Vec<PathBuf>,
    /// URLs that could not be saved, with the reason
    pub failed: Vec<(String, DownloadError)>,
}

impl FetchReport {
    pub fn total(&self) -> usize {
        self.saved.len() + self.failed.len()
    }
}

/// Downloads the images listed in a [`FetchConfig`].
pub struct ImageFetcher {
    client: reqwest::Client,
    config: FetchConfig,
}

impl ImageFetcher {
    pub fn new(config: FetchConfig) -> Result<Self, DownloadError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| DownloadError::Http {
                url: String::new(),
                message: format!("Failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client, config })
    }

    pub fn urls(&self) -> &[String] {
        &self.config.urls
    }

    /// Fetch the URL at `index` to its numbered destination.
    pub async fn fetch_one(&self, index: usize) -> Result<PathBuf, DownloadError> {
        let url = self
            .config
            .urls
            .get(index)
            .ok_or_else(|| DownloadError::Http {
                url: String::new(),
                message: format!("No URL at index {index}"),
            })?;
        let dest = output_path(&self.config.output_prefix, index);
        download_to(&self.client, url, &dest).await?;
        tracing::info!("Image downloaded: {}", dest.display());
        Ok(dest)
    }

    /// Fetch every URL in order, continuing past failures.
    pub async fn fetch_all(&self) -> FetchReport {
        self.fetch_all_with(|_, _| {}).await
    }

    /// Like [`fetch_all`](Self::fetch_all), calling `on_done` after each URL.
    pub async fn fetch_all_with<F>(&self, mut on_done: F) -> FetchReport
    where
        F: FnMut(&str, Result<&Path, &DownloadError>),
    {
        let mut report = FetchReport::default();
        for (index, url) in self.config.urls.iter().enumerate() {
            match self.fetch_one(index).await {
                Ok(path) => {
                    on_done(url, Ok(path.as_path()));
                    report.saved.push(path);
                }
                Err(e) => {
                    tracing::warn!("Unable to download {}: {}", url, e);
                    on_done(url, Err(&e));
                    report.failed.push((url.clone(), e));
                }
            }
        }
        report
    }
}

/// Destination of the `index`-th download: `<prefix>_<index>.jpg`.
pub fn output_path(prefix: &str, index: usize) -> PathBuf {
    PathBuf::from(format!("{prefix}_{index}.jpg"))
}

/// Sibling that receives the body while `dest` is being downloaded.
pub fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

/// Stream `url` to `dest`.
///
/// The body goes to [`partial_path`] and is renamed onto `dest` only once it
/// is complete; on any failure the partial file is removed and `dest` is left
/// untouched. Non-success statuses fail before anything is created.
pub async fn download_to(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
) -> Result<u64, DownloadError> {
    let partial = partial_path(dest);
    match stream_to(client, url, &partial).await {
        Ok(bytes) => {
            tokio::fs::rename(&partial, dest)
                .await
                .map_err(|source| DownloadError::Io {
                    path: dest.to_path_buf(),
                    source,
                })?;
            Ok(bytes)
        }
        Err(e) => {
            let _ = tokio::fs::remove_file(&partial).await;
            Err(e)
        }
    }
}

async fn stream_to(client: &reqwest::Client, url: &str, dest: &Path) -> Result<u64, DownloadError> {
    let http_err = |e: reqwest::Error| DownloadError::Http {
        url: url.to_string(),
        message: e.to_string(),
    };
    let io_err = |source: std::io::Error| DownloadError::Io {
        path: dest.to_path_buf(),
        source,
    };

    let response = client.get(url).send().await.map_err(http_err)?;
    let status = response.status();
    if !status.is_success() {
        return Err(DownloadError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let total_size = response.content_length();
    let mut file = tokio::fs::File::create(dest).await.map_err(io_err)?;
    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(http_err)?;
        file.write_all(&chunk).await.map_err(io_err)?;
        downloaded += chunk.len() as u64;

        if let Some(total) = total_size {
            if downloaded % (50 * 1024 * 1024) < chunk.len() as u64 && total > 0 {
                tracing::debug!(
                    "  {}: {:.0}%",
                    dest.display(),
                    downloaded as f64 / total as f64 * 100.0
                );
            }
        }
    }

    file.flush().await.map_err(io_err)?;
    Ok(downloaded)
}
