use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::fs;

use super::durable_store::{Result, StoreError};
use super::object_store::ObjectStore;

/// Counter for generating unique temp file names.
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A filesystem-based implementation of `ObjectStore`.
///
/// All keys are relative to a configured base directory.
/// Writes are atomic: data is written to a temp file in `.svcdata/` then renamed.
pub struct FsObjectStore {
    base_path: PathBuf,
}

impl FsObjectStore {
    /// Create a new filesystem store rooted at the given path.
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    fn full_path(&self, key: &str) -> PathBuf {
        self.base_path.join(key)
    }

    fn temp_dir(&self) -> PathBuf {
        self.base_path.join(".svcdata")
    }

    fn temp_file_path(&self) -> PathBuf {
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let pid = std::process::id();
        self.temp_dir().join(format!("tmp.{}.{}", pid, counter))
    }
}

impl ObjectStore for FsObjectStore {
    async fn object_exists(&self, key: &str) -> Result<bool> {
        Ok(fs::try_exists(self.full_path(key)).await?)
    }

    async fn read_object(&self, key: &str) -> Result<Vec<u8>> {
        let full_path = self.full_path(key);
        fs::read(&full_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound
            } else {
                StoreError::Io(e)
            }
        })
    }

    async fn write_object(&self, key: &str, data: &[u8]) -> Result<()> {
        let full_path = self.full_path(key);
        let temp_path = self.temp_file_path();

        fs::create_dir_all(self.temp_dir()).await?;

        let result = place_object(&temp_path, &full_path, data).await;
        if result.is_err() {
            let _ = fs::remove_file(&temp_path).await;
        }
        result.map_err(StoreError::from)
    }

    fn location(&self, key: &str) -> String {
        format!("file://{}", self.full_path(key).display())
    }
}

/// Write `data` to `temp_path`, then move it over `full_path`.
async fn place_object(temp_path: &Path, full_path: &Path, data: &[u8]) -> std::io::Result<()> {
    fs::write(temp_path, data).await?;
    if let Some(parent) = full_path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::rename(temp_path, full_path).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_object_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsObjectStore::new(temp_dir.path());

        let key = "nested/service_data.json";
        assert!(!store.object_exists(key).await.unwrap());

        store.write_object(key, b"{}").await.unwrap();

        assert!(store.object_exists(key).await.unwrap());
        assert_eq!(store.read_object(key).await.unwrap(), b"{}");
    }

    #[tokio::test]
    async fn test_read_nonexistent_object() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsObjectStore::new(temp_dir.path());

        let result = store.read_object("missing.json").await;
        assert!(matches!(result, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn test_overwrite_object() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsObjectStore::new(temp_dir.path());

        store.write_object("doc.json", b"first").await.unwrap();
        store.write_object("doc.json", b"second").await.unwrap();
        assert_eq!(store.read_object("doc.json").await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_failed_write_removes_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsObjectStore::new(temp_dir.path());
        std::fs::create_dir_all(temp_dir.path().join("doc.json/occupied")).unwrap();

        let result = store.write_object("doc.json", b"{}").await;
        assert!(matches!(result, Err(StoreError::Io(_))));

        let leftovers: Vec<_> = std::fs::read_dir(temp_dir.path().join(".svcdata"))
            .unwrap()
            .collect();
        assert!(leftovers.is_empty());
    }
}
