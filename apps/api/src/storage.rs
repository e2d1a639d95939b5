//! File storage — the collaborator owning uploaded resume artifacts.
//!
//! Reviews reference files only through opaque refs; deleting a review
//! signals `delete` here so the artifact goes away with the record.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;

#[async_trait]
pub trait FileStore: Send + Sync {
    /// Persists the bytes and returns an opaque file ref.
    async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, AppError>;

    /// Deletes the artifact behind a ref. Deleting a ref that no longer
    /// exists is not an error.
    async fn delete(&self, file_ref: &str) -> Result<(), AppError>;
}

/// Disk-backed store: files land in a flat upload directory under
/// uuid-based names that keep the original extension. Refs are bare file
/// names, never paths.
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates the upload directory if needed.
    pub async fn ensure_root(&self) -> Result<(), AppError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| AppError::Storage(format!("creating upload dir: {e}")))
    }

    fn path_for(&self, file_ref: &str) -> Result<PathBuf, AppError> {
        // Refs must be bare names; anything path-like is rejected.
        let name = Path::new(file_ref)
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| *n == file_ref)
            .ok_or_else(|| AppError::Storage(format!("invalid file ref: {file_ref}")))?;
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, AppError> {
        let extension = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()))
            .unwrap_or_default();
        let file_ref = format!("{}{extension}", Uuid::new_v4());

        let path = self.path_for(&file_ref)?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::Storage(format!("writing {file_ref}: {e}")))?;
        info!("Stored upload as {file_ref} ({} bytes)", bytes.len());
        Ok(file_ref)
    }

    async fn delete(&self, file_ref: &str) -> Result<(), AppError> {
        let path = self.path_for(file_ref)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                info!("Deleted stored file {file_ref}");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!("deleting {file_ref}: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_delete_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());

        let file_ref = store.save("resume.PDF", b"%PDF- fake bytes").await.unwrap();
        assert!(file_ref.ends_with(".pdf"));
        assert!(dir.path().join(&file_ref).exists());

        store.delete(&file_ref).await.unwrap();
        assert!(!dir.path().join(&file_ref).exists());
    }

    #[tokio::test]
    async fn test_delete_missing_file_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());
        store.delete("never-existed.pdf").await.unwrap();
    }

    #[tokio::test]
    async fn test_path_like_refs_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());
        assert!(store.delete("../etc/passwd").await.is_err());
        assert!(store.delete("nested/name.pdf").await.is_err());
    }

    #[tokio::test]
    async fn test_save_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());
        let file_ref = store.save("resume", b"data").await.unwrap();
        assert!(!file_ref.contains('.'));
        assert!(dir.path().join(&file_ref).exists());
    }
}
