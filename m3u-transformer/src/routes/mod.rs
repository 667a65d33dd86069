use axum::{
    Router,
    routing::{get, post},
};

use crate::AppStateRef;

mod playlist;

pub use playlist::PLAYLIST_CONTENT_TYPE;

pub fn get_routes(app_state: &AppStateRef) -> Router {
    Router::new()
        .route("/playlist", post(playlist::create_playlist))
        .route(
            "/playlist/{id}",
            get(playlist::get_playlist).put(playlist::update_playlist),
        )
        .with_state(app_state.clone())
}
