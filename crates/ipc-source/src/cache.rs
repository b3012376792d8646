use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};

use chrono::{DateTime, Utc};

use crate::{dto::CacheMeta, error::SourceError};

const DATASET_FILE: &str = "ipc.csv";
const META_FILE: &str = "ipc.meta.json";

/// On-disk copy of the last downloaded dataset.
#[derive(Debug, Clone)]
pub struct DatasetCache {
    dataset_path: PathBuf,
    meta_path: PathBuf,
}

impl DatasetCache {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            dataset_path: dir.join(DATASET_FILE),
            meta_path: dir.join(META_FILE),
        }
    }

    pub fn dataset_path(&self) -> &Path {
        &self.dataset_path
    }

    async fn modified(&self) -> Option<SystemTime> {
        tokio::fs::metadata(&self.dataset_path)
            .await
            .ok()
            .and_then(|m| m.modified().ok())
    }

    /// Age of the cached copy, `None` when there is none.
    pub async fn age(&self) -> Option<Duration> {
        let modified = self.modified().await?;
        Some(SystemTime::now().duration_since(modified).unwrap_or_default())
    }

    pub async fn last_cached_at(&self) -> Option<DateTime<Utc>> {
        self.modified().await.map(DateTime::<Utc>::from)
    }

    pub async fn read(&self) -> Result<String, SourceError> {
        let text = tokio::fs::read_to_string(&self.dataset_path).await?;
        if text.trim().is_empty() {
            return Err(SourceError::Cache(std::io::Error::new(
                ErrorKind::InvalidData,
                "cached dataset is empty",
            )));
        }
        Ok(text)
    }

    /// Missing or unreadable metadata is treated as absent.
    pub async fn read_meta(&self) -> CacheMeta {
        match tokio::fs::read(&self.meta_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_default(),
            Err(_) => CacheMeta::default(),
        }
    }

    pub async fn store(&self, text: &str, meta: &CacheMeta) -> Result<(), SourceError> {
        if let Some(dir) = self.dataset_path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        tokio::fs::write(&self.dataset_path, text).await?;
        let meta = serde_json::to_vec(meta).map_err(std::io::Error::other)?;
        tokio::fs::write(&self.meta_path, meta).await?;
        Ok(())
    }

    pub async fn clear(&self) -> Result<bool, SourceError> {
        let removed = remove_if_exists(&self.dataset_path).await?;
        remove_if_exists(&self.meta_path).await?;
        Ok(removed)
    }
}

async fn remove_if_exists(path: &Path) -> Result<bool, SourceError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}
