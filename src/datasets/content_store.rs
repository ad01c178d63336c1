use crate::datasets::error::DataError;
use crate::datasets::fetcher::Fetch;
use crate::types::dataset::DatasetKey;
use crate::utils::ensure_data_dir_exists;
use log::{info, warn};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::fs;

/// When a local copy is still good enough to be served without downloading again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Freshness {
    /// Once downloaded, a file is used forever.
    #[default]
    Permanent,
    /// Files older than the given age (by modification time) are downloaded again.
    MaxAge(Duration),
}

/// Download-if-absent store of raw dataset files.
///
/// Each [`DatasetKey`] maps to one file in `root` (see [`DatasetKey::file_name`]). The
/// content is written exactly as the [`Fetch`] implementation produced it and is never
/// validated afterwards.
pub struct ContentStore<F> {
    root: PathBuf,
    fetcher: F,
    freshness: Freshness,
}

impl<F: Fetch> ContentStore<F> {
    pub fn new(root: impl Into<PathBuf>, fetcher: F) -> Self {
        Self {
            root: root.into(),
            fetcher,
            freshness: Freshness::default(),
        }
    }

    pub fn with_freshness(mut self, freshness: Freshness) -> Self {
        self.freshness = freshness;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn freshness(&self) -> Freshness {
        self.freshness
    }

    /// Local path of `key`, whether or not it exists yet.
    pub fn path_for(&self, key: &DatasetKey) -> PathBuf {
        self.root.join(key.file_name())
    }

    /// Makes sure the file for `key` exists locally and returns its path.
    ///
    /// A fresh existing file is returned as is. Otherwise the fetcher downloads into a
    /// `.part` sibling which is renamed into place once complete, so an interrupted
    /// download never masquerades as a cached file.
    ///
    /// # Errors
    ///
    /// Propagates download failures unchanged; nothing is retried.
    pub async fn ensure_local_copy(&self, key: &DatasetKey) -> Result<PathBuf, DataError> {
        let path = self.path_for(key);

        if self.is_fresh(&path).await? {
            info!("Cache hit for {} at {:?}", key, path);
            return Ok(path);
        }
        warn!("Cache miss for {}. Downloading.", key);

        ensure_data_dir_exists(&self.root).await?;
        let partial = self.root.join(format!("{}.part", key.file_name()));
        if let Err(e) = self.fetcher.download(key, &partial).await {
            if let Err(cleanup) = fs::remove_file(&partial).await {
                if cleanup.kind() != io::ErrorKind::NotFound {
                    warn!("Could not remove partial download {:?}: {}", partial, cleanup);
                }
            }
            return Err(e);
        }
        fs::rename(&partial, &path)
            .await
            .map_err(|e| DataError::FileWrite(path.clone(), e))?;

        info!("Stored {} at {:?}", key, path);
        Ok(path)
    }

    /// Returns the raw bytes of `key`, downloading them first if needed.
    pub async fn get_or_fetch(&self, key: &DatasetKey) -> Result<Vec<u8>, DataError> {
        let path = self.ensure_local_copy(key).await?;
        fs::read(&path)
            .await
            .map_err(|e| DataError::FileRead(path, e))
    }

    /// Deletes the local copy of `key`. Returns whether a file was removed.
    pub async fn invalidate(&self, key: &DatasetKey) -> Result<bool, DataError> {
        let path = self.path_for(key);
        match fs::remove_file(&path).await {
            Ok(()) => {
                info!("Removed {} at {:?}", key, path);
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(DataError::FileDeletion(path, e)),
        }
    }

    async fn is_fresh(&self, path: &Path) -> Result<bool, DataError> {
        let metadata = match fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(DataError::FileMetadataRead(path.to_path_buf(), e)),
        };

        match self.freshness {
            Freshness::Permanent => Ok(true),
            Freshness::MaxAge(max_age) => {
                let modified = metadata
                    .modified()
                    .map_err(|e| DataError::FileMetadataRead(path.to_path_buf(), e))?;
                // An mtime ahead of the clock counts as just written.
                let age = SystemTime::now()
                    .duration_since(modified)
                    .unwrap_or(Duration::ZERO);
                Ok(age <= max_age)
            }
        }
    }
}
