use std::sync::Arc;

use anyhow::Result;
use log::info;
use reqwest::{Client, Proxy};

use crate::{
    Config, HttpConfig,
    storage::{CachedSource, CachedTransformationStorage, FileTransformationStorage},
};

pub type AppStateRef = Arc<AppState>;
pub struct AppState {
    pub config: Arc<Config>,
    pub storage: CachedTransformationStorage,
    pub source: CachedSource,
}

fn build_http_client(config: &HttpConfig) -> Result<Client> {
    let mut builder = Client::builder();

    if let Some(user_agent) = &config.user_agent {
        builder = builder.user_agent(user_agent)
    }

    match &config.proxy {
        Some(proxy) => {
            info!("With proxy: {}", proxy);
            builder = builder.proxy(Proxy::all(proxy)?);
        }
        None => builder = builder.no_proxy(),
    }

    Ok(builder.build()?)
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self> {
        let config = Arc::new(config);

        let storage = CachedTransformationStorage::new(
            FileTransformationStorage::new(&config.storage_dir).await?,
        );
        let source = CachedSource::new(
            build_http_client(&config.http)?,
            &config.source_cache_dir,
        )
        .await?;
        info!(
            "Playlists stored in {}, sources cached in {}",
            config.storage_dir, config.source_cache_dir
        );

        Ok(Self {
            config,
            storage,
            source,
        })
    }
}
