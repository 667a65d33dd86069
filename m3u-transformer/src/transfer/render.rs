use std::{error::Error, fmt::Display, str::Utf8Error, sync::Arc};

use axum::http::StatusCode;
use bytes::Bytes;
use m3u_transform_rs::{ParseError, format::M3uPlaylist};
use tokio::task::JoinError;

use crate::{errors::HttpStatus, transfer::TransformedPlaylist};

/// Failures between a fetched source body and the rendered playlist
#[derive(Debug)]
pub enum RenderError {
    Malformed(ParseError),
    InvalidEncoding(Utf8Error),
    Interrupted(JoinError),
}

impl Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(e) => write!(f, "Source playlist is malformed: {}", e),
            Self::InvalidEncoding(e) => write!(f, "Source playlist is not valid UTF-8: {}", e),
            Self::Interrupted(e) => write!(f, "Rendering task failed: {}", e),
        }
    }
}

impl Error for RenderError {}

impl HttpStatus for RenderError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Malformed(_) | Self::InvalidEncoding(_) => StatusCode::BAD_GATEWAY,
            Self::Interrupted(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JoinError> for RenderError {
    fn from(value: JoinError) -> Self {
        Self::Interrupted(value)
    }
}

impl From<ParseError> for RenderError {
    fn from(value: ParseError) -> Self {
        Self::Malformed(value)
    }
}

impl From<Utf8Error> for RenderError {
    fn from(value: Utf8Error) -> Self {
        Self::InvalidEncoding(value)
    }
}

/// Decodes and parses a source body off the async workers
pub async fn parse_playlist_async(data: Bytes) -> Result<M3uPlaylist, RenderError> {
    tokio::task::spawn_blocking(move || -> Result<M3uPlaylist, RenderError> {
        let text = std::str::from_utf8(&data)?;
        Ok(text.parse::<M3uPlaylist>()?)
    })
    .await?
}

pub async fn transform_playlist_async(
    playlist: M3uPlaylist,
    document: Arc<TransformedPlaylist>,
) -> Result<M3uPlaylist, RenderError> {
    Ok(tokio::task::spawn_blocking(move || playlist.transform(document.pipeline.as_ref())).await?)
}
