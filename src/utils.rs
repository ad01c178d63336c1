use crate::datasets::error::DataError;
use log::info;
use std::io;
use std::path::{Path, PathBuf};

const CACHE_DIR_NAME: &str = "zurich_bikes";

/// Platform cache directory for downloaded files, e.g. `~/.cache/zurich_bikes` on Linux.
pub fn user_cache_dir() -> Result<PathBuf, DataError> {
    dirs::cache_dir()
        .map(|p| p.join(CACHE_DIR_NAME))
        .ok_or(DataError::DataDirResolution)
}

pub(crate) async fn ensure_data_dir_exists(path: &Path) -> Result<(), DataError> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => {
            if !metadata.is_dir() {
                return Err(DataError::DataDirCreation(
                    path.to_path_buf(),
                    io::Error::new(io::ErrorKind::AlreadyExists, "path exists but is not a directory"),
                ));
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("Creating data directory: {}", path.display());
            tokio::fs::create_dir_all(path)
                .await
                .map_err(|e| DataError::DataDirCreation(path.to_path_buf(), e))
        }
        Err(e) => Err(DataError::DataDirCreation(path.to_path_buf(), e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_file_as_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("occupied");
        std::fs::write(&file, "").unwrap();

        let err = ensure_data_dir_exists(&file).await.unwrap_err();
        assert!(matches!(err, DataError::DataDirCreation(path, _) if path == file));
    }

    #[test]
    fn test_user_cache_dir_is_namespaced() {
        if let Ok(dir) = user_cache_dir() {
            assert!(dir.ends_with(CACHE_DIR_NAME));
        }
    }
}
