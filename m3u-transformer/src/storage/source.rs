use std::{
    error::Error,
    fmt::Display,
    io,
    path::{Path, PathBuf},
};

use axum::http::StatusCode;
use bytes::Bytes;
use log::{debug, warn};
use reqwest::{Client, header};
use sha2::{Digest, Sha256};
use url::Url;

use crate::errors::HttpStatus;

#[derive(Debug)]
pub enum SourceError {
    RequestError(reqwest::Error),
    RequestNotSuccess(u16),
    Io(io::Error),
}

impl Display for SourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RequestError(e) => e.fmt(f),
            Self::RequestNotSuccess(status_code) => {
                write!(f, "Server respond with status code {}", status_code)
            }
            Self::Io(e) => e.fmt(f),
        }
    }
}

impl Error for SourceError {}

impl HttpStatus for SourceError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::RequestError(_) | Self::RequestNotSuccess(_) => StatusCode::BAD_GATEWAY,
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(value: reqwest::Error) -> Self {
        Self::RequestError(value)
    }
}

impl From<io::Error> for SourceError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// Directory name for everything cached about one url
fn cache_key(url: &Url) -> String {
    let digest = Sha256::digest(url.as_str().as_bytes());
    let hex = format!("{:x}", digest);
    hex[..16].to_owned()
}

/// Removes every file in `directory` except `keep`
async fn remove_stale(directory: &Path, keep: &str) -> io::Result<()> {
    let mut entries = tokio::fs::read_dir(directory).await?;
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_name() == keep {
            continue;
        }
        tokio::fs::remove_file(entry.path()).await?;
        debug!("Stale source {:?} removed", entry.path());
    }
    Ok(())
}

/// Fetches source playlists, reusing the last body while the upstream
/// `Content-Length` stays the same.
///
/// Bodies live at `<directory>/<url hash>/<content length>`.
pub struct CachedSource {
    http_client: Client,
    directory: PathBuf,
}

impl CachedSource {
    pub async fn new(http_client: Client, directory: impl AsRef<Path>) -> Result<Self, SourceError> {
        let directory = directory.as_ref().to_owned();
        tokio::fs::create_dir_all(&directory).await?;

        Ok(Self {
            http_client,
            directory,
        })
    }

    fn entry_path(&self, url: &Url, content_length: u64) -> PathBuf {
        self.directory
            .join(cache_key(url))
            .join(content_length.to_string())
    }

    async fn content_length(&self, url: &Url) -> Result<Option<u64>, SourceError> {
        let response = self.http_client.head(url.clone()).send().await?;
        if !response.status().is_success() {
            // a refused HEAD falls back to a plain download
            debug!("HEAD {} answered {}", url, response.status());
            return Ok(None);
        }

        Ok(response
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|x| x.to_str().ok())
            .and_then(|x| x.parse::<u64>().ok()))
    }

    async fn download(&self, url: &Url) -> Result<Bytes, SourceError> {
        let response = self.http_client.get(url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(SourceError::RequestNotSuccess(response.status().as_u16()));
        }

        Ok(response.bytes().await?)
    }

    async fn load_cached(&self, url: &Url, content_length: u64) -> Option<Bytes> {
        match tokio::fs::read(self.entry_path(url, content_length)).await {
            Ok(data) if data.len() as u64 == content_length => Some(Bytes::from(data)),
            Ok(data) => {
                debug!(
                    "Cached source {} has {} of {} bytes, ignored",
                    url,
                    data.len(),
                    content_length
                );
                None
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Failed to read cached source {}: {}", url, e);
                None
            }
        }
    }

    async fn store_cached(
        &self,
        url: &Url,
        content_length: u64,
        data: &[u8],
    ) -> Result<(), SourceError> {
        let path = self.entry_path(url, content_length);
        let Some(directory) = path.parent().map(Path::to_owned) else {
            return Ok(());
        };
        tokio::fs::create_dir_all(&directory).await?;
        tokio::fs::write(&path, data).await?;

        if let Err(e) = remove_stale(&directory, &content_length.to_string()).await {
            warn!("Failed to clean source cache {:?}: {}", directory, e);
        }

        Ok(())
    }

    pub async fn fetch(&self, url: &Url) -> Result<Bytes, SourceError> {
        let Some(content_length) = self.content_length(url).await? else {
            debug!("No Content-Length for {}, downloading", url);
            return self.download(url).await;
        };

        if let Some(data) = self.load_cached(url, content_length).await {
            debug!("Source cache hit for {} ({} bytes)", url, content_length);
            return Ok(data);
        }

        let data = self.download(url).await?;
        // a body whose size disagrees with the advertised length is served but not cached
        if data.len() as u64 == content_length {
            self.store_cached(url, content_length, &data).await?;
        }
        Ok(data)
    }
}
