use std::{
    collections::HashMap,
    error::Error,
    fmt::Display,
    io,
    path::{Path, PathBuf},
    sync::Arc,
};

use axum::http::StatusCode;
use log::{debug, info};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    errors::HttpStatus,
    transfer::{DocumentError, TransformedPlaylist},
};

#[derive(Debug)]
pub enum StorageError {
    InvalidId(String),
    NotFound(String),
    Document(DocumentError),
    Io(io::Error),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidId(id) => write!(f, "Invalid playlist id `{}`", id),
            Self::NotFound(id) => write!(f, "Playlist `{}` not found", id),
            Self::Document(e) => e.fmt(f),
            Self::Io(e) => e.fmt(f),
        }
    }
}

impl Error for StorageError {}

impl HttpStatus for StorageError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidId(_) | Self::Document(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<io::Error> for StorageError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<DocumentError> for StorageError {
    fn from(value: DocumentError) -> Self {
        Self::Document(value)
    }
}

fn validate_id(id: &str) -> Result<(), StorageError> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|x| x.is_ascii_alphanumeric() || x == '-' || x == '_');

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidId(id.to_owned()))
    }
}

/// Raw documents kept as one file per id
pub struct FileTransformationStorage {
    directory: PathBuf,
}

impl FileTransformationStorage {
    pub async fn new(directory: impl AsRef<Path>) -> Result<Self, StorageError> {
        let directory = directory.as_ref().to_owned();
        tokio::fs::create_dir_all(&directory).await?;

        Ok(Self { directory })
    }

    fn path_of(&self, id: &str) -> Result<PathBuf, StorageError> {
        validate_id(id)?;
        Ok(self.directory.join(id))
    }

    pub async fn load(&self, id: &str) -> Result<Option<String>, StorageError> {
        match tokio::fs::read_to_string(self.path_of(id)?).await {
            Ok(document) => Ok(Some(document)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn store(&self, id: &str, document: &str) -> Result<(), StorageError> {
        tokio::fs::write(self.path_of(id)?, document).await?;
        Ok(())
    }

    pub async fn exists(&self, id: &str) -> Result<bool, StorageError> {
        Ok(tokio::fs::try_exists(self.path_of(id)?).await?)
    }
}

/// Keeps compiled documents in memory in front of a [`FileTransformationStorage`].
///
/// Every document is validated before it reaches the disk, and the memory copy
/// is replaced on each write.
pub struct CachedTransformationStorage {
    inner: FileTransformationStorage,
    cached: RwLock<HashMap<String, Arc<TransformedPlaylist>>>,
}

impl CachedTransformationStorage {
    pub fn new(inner: FileTransformationStorage) -> Self {
        Self {
            inner,
            cached: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, id: &str) -> Result<Arc<TransformedPlaylist>, StorageError> {
        validate_id(id)?;
        if let Some(document) = self.cached.read().await.get(id) {
            return Ok(document.clone());
        }

        // held across the disk read so a concurrent write cannot be overwritten
        // by the older document
        let mut cached = self.cached.write().await;
        if let Some(document) = cached.get(id) {
            return Ok(document.clone());
        }

        let Some(source) = self.inner.load(id).await? else {
            return Err(StorageError::NotFound(id.to_owned()));
        };
        let document = source.parse::<TransformedPlaylist>()?;
        debug!("Playlist {} loaded from disk", id);

        Ok(cached
            .entry(id.to_owned())
            .or_insert_with(|| Arc::new(document))
            .clone())
    }

    /// Stores a new document, returning its id
    pub async fn create(&self, source: &str) -> Result<String, StorageError> {
        let document = source.parse::<TransformedPlaylist>()?;
        let id = Uuid::new_v4().simple().to_string();

        self.write(&id, source, document).await?;
        info!("Playlist {} created", id);
        Ok(id)
    }

    pub async fn update(&self, id: &str, source: &str) -> Result<(), StorageError> {
        if !self.inner.exists(id).await? {
            return Err(StorageError::NotFound(id.to_owned()));
        }
        let document = source.parse::<TransformedPlaylist>()?;

        self.write(id, source, document).await?;
        info!("Playlist {} updated", id);
        Ok(())
    }

    async fn write(
        &self,
        id: &str,
        source: &str,
        document: TransformedPlaylist,
    ) -> Result<(), StorageError> {
        let mut cached = self.cached.write().await;
        self.inner.store(id, source).await?;
        cached.insert(id.to_owned(), Arc::new(document));
        Ok(())
    }
}
