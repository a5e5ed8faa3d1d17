//! Local scratch files uploaded by the walkthrough

use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

use crate::domain::errors::{StorageError, StorageResult};

/// A file written to local disk for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TempFile {
    pub path: PathBuf,
    /// File name including the random prefix
    pub name: String,
    /// Length in bytes
    pub size: u64,
    /// The unit repeated to build the file
    pub content: String,
}

impl TempFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file from disk
    pub async fn remove(&self) -> StorageResult<()> {
        tokio::fs::remove_file(&self.path)
            .await
            .map_err(|e| StorageError::local_file(&self.path, e))
    }
}

/// Write `content` repeated `size` times into `<6 random hex chars><file_name>` under `dir`
pub async fn create_temp_file(
    dir: &Path,
    size: usize,
    file_name: &str,
    content: &str,
) -> StorageResult<TempFile> {
    let random_prefix = &Uuid::new_v4().simple().to_string()[..6];
    let name = format!("{}{}", random_prefix, file_name);
    let path = dir.join(&name);

    let body = content.repeat(size);
    tokio::fs::write(&path, body.as_bytes())
        .await
        .map_err(|e| StorageError::local_file(&path, e))?;

    debug!(path = %path.display(), bytes = body.len(), "Wrote temporary file");

    Ok(TempFile {
        path,
        name,
        size: body.len() as u64,
        content: content.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_length_is_size_times_content() {
        let dir = tempfile::tempdir().unwrap();

        let file = create_temp_file(dir.path(), 300, "firstfile.txt", "f")
            .await
            .unwrap();
        assert_eq!(file.size, 300);
        assert_eq!(std::fs::metadata(&file.path).unwrap().len(), 300);

        let multi = create_temp_file(dir.path(), 4, "multi.txt", "ab").await.unwrap();
        assert_eq!(std::fs::read_to_string(&multi.path).unwrap(), "abababab");
    }

    #[tokio::test]
    async fn test_random_prefix_and_remove() {
        let dir = tempfile::tempdir().unwrap();

        let a = create_temp_file(dir.path(), 1, "same.txt", "x").await.unwrap();
        let b = create_temp_file(dir.path(), 1, "same.txt", "x").await.unwrap();
        assert_ne!(a.name, b.name);
        assert_eq!(a.name.len(), 6 + "same.txt".len());
        assert!(a.name.ends_with("same.txt"));
        assert!(a.name[..6].chars().all(|c| c.is_ascii_hexdigit()));

        a.remove().await.unwrap();
        assert!(!a.path.exists());
        assert!(matches!(a.remove().await, Err(StorageError::LocalFile { .. })));
    }

    #[tokio::test]
    async fn test_missing_directory_is_local_file_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        let err = create_temp_file(&missing, 1, "a.txt", "a").await.unwrap_err();
        assert!(matches!(err, StorageError::LocalFile { .. }));
    }
}
