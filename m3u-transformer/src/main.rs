use std::{env, sync::Arc};

use anyhow::Result;
use log::{info, warn};
use m3u_transformer::{AppState, load_config, routes};
use tokio::net::TcpListener;

const CONFIG_PATH_VAR: &str = "MT_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config.yml";

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config_path =
        env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_owned());
    info!("Loading config from {}", config_path);
    let app_state = Arc::new(AppState::new(load_config(&config_path)?).await?);

    let listener = TcpListener::bind(&app_state.config.listen_addr).await?;
    info!("Serving playlists on {}", listener.local_addr()?);
    axum::serve(listener, routes::get_routes(&app_state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
