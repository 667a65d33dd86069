use std::time::Instant;

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use log::{debug, info};

use crate::{
    AppStateRef, status_with_log,
    transfer::{parse_playlist_async, transform_playlist_async},
};

pub const PLAYLIST_CONTENT_TYPE: &str = "audio/x-mpegurl";

pub async fn create_playlist(
    State(state): State<AppStateRef>,
    body: String,
) -> Result<Response, StatusCode> {
    let id = state
        .storage
        .create(&body)
        .await
        .map_err(status_with_log!("Create playlist"))?;

    Ok((StatusCode::CREATED, id).into_response())
}

pub async fn update_playlist(
    State(state): State<AppStateRef>,
    Path(id): Path<String>,
    body: String,
) -> Result<Response, StatusCode> {
    state
        .storage
        .update(&id, &body)
        .await
        .map_err(status_with_log!("Update playlist"))?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

pub async fn get_playlist(
    State(state): State<AppStateRef>,
    Path(id): Path<String>,
) -> Result<Response, StatusCode> {
    let document = state
        .storage
        .get(&id)
        .await
        .map_err(status_with_log!("Load playlist"))?;

    let started = Instant::now();
    let data = state
        .source
        .fetch(&document.url)
        .await
        .map_err(status_with_log!("Fetch source"))?;
    let fetched = Instant::now();
    debug!("Fetched {} in {:?}", document.url, fetched - started);

    let playlist = parse_playlist_async(data)
        .await
        .map_err(status_with_log!("Parse source"))?;
    let parsed = Instant::now();
    debug!("Parsed {} items in {:?}", playlist.len(), parsed - fetched);

    let playlist = transform_playlist_async(playlist, document.clone())
        .await
        .map_err(status_with_log!("Transform playlist"))?;
    let transformed = Instant::now();
    debug!(
        "Transformed into {} items in {:?}",
        playlist.len(),
        transformed - parsed
    );

    let body = playlist.to_string();
    let written = Instant::now();
    debug!("Wrote {} bytes in {:?}", body.len(), written - transformed);
    info!("Playlist {} rendered in {:?}", id, written - started);

    Ok(([(header::CONTENT_TYPE, PLAYLIST_CONTENT_TYPE)], body).into_response())
}
