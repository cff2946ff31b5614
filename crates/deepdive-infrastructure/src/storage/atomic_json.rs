//! Atomic file-backed key-value store.
//!
//! Each key maps to one JSON file. Writes go to a temporary file in the same
//! directory, are fsynced, then renamed over the target, so a crash never
//! leaves a half-written value behind.

use async_trait::async_trait;
use deepdive_core::error::Result;
use deepdive_core::store::KeyValueStore;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// A [`KeyValueStore`] that keeps one file per key under a root directory.
#[derive(Debug, Clone)]
pub struct AtomicJsonFileStore {
    root: PathBuf,
}

impl AtomicJsonFileStore {
    /// Creates a store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing `key`. Characters outside `[A-Za-z0-9_-]` become `_`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let file_stem: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.root.join(format!("{}.json", file_stem))
    }

    fn temp_path(&self, target: &Path) -> PathBuf {
        let mut name = target
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(format!(".{}.tmp", std::process::id()));
        target.with_file_name(name)
    }
}

#[async_trait]
impl KeyValueStore for AtomicJsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => Ok(None),
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        // Ensure parent directory exists
        fs::create_dir_all(&self.root).await?;

        let target = self.path_for(key);
        let tmp_path = self.temp_path(&target);

        let mut tmp_file = fs::File::create(&tmp_path).await?;
        tmp_file.write_all(value.as_bytes()).await?;
        tmp_file.sync_all().await?;
        drop(tmp_file);

        if let Err(err) = fs::rename(&tmp_path, &target).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(err.into());
        }

        tracing::trace!("Wrote {} bytes to {}", value.len(), target.display());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_set_get_remove() {
        let temp_dir = TempDir::new().unwrap();
        let store = AtomicJsonFileStore::new(temp_dir.path().join("store"));

        assert_eq!(store.get("deep_dive:active_session").await.unwrap(), None);

        store.set("deep_dive:active_session", r#"{"a":1}"#).await.unwrap();
        assert_eq!(
            store.get("deep_dive:active_session").await.unwrap().as_deref(),
            Some(r#"{"a":1}"#)
        );

        store.remove("deep_dive:active_session").await.unwrap();
        store.remove("deep_dive:active_session").await.unwrap();
        assert_eq!(store.get("deep_dive:active_session").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_overwrites_fully() {
        let temp_dir = TempDir::new().unwrap();
        let store = AtomicJsonFileStore::new(temp_dir.path());

        store.set("k", "a much longer first value").await.unwrap();
        store.set("k", "short").await.unwrap();

        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("short"));
    }

    #[tokio::test]
    async fn test_no_temp_files_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let store = AtomicJsonFileStore::new(temp_dir.path());
        store.set("deep_dive:history", "[]").await.unwrap();

        let names: Vec<String> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["deep_dive_history.json".to_string()]);
    }
}
