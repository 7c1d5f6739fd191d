//! Media File Store Implementation using Tokio

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::MediaFileStore,
};
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Tokio-based media file store rooted at a single directory.
///
/// Blobs are addressed by relative path; intermediate directories are
/// created on write and pruned (best-effort) on delete so the tree never
/// accumulates empty album/artist folders.
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    /// Create a store rooted at the platform data directory
    pub fn in_default_location() -> Self {
        let root = dirs::data_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("wearable-media-core")
            .join("library");
        Self { root }
    }

    /// Create a store rooted at a custom directory
    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    fn absolute(&self, relative_path: &str) -> PathBuf {
        self.root.join(relative_path)
    }

    /// Remove now-empty parent directories up to (not including) the root.
    async fn prune_empty_parents(&self, mut path: PathBuf) {
        while let Some(parent) = path.parent().map(Path::to_path_buf) {
            if parent == self.root || !parent.starts_with(&self.root) {
                break;
            }
            // remove_dir fails on non-empty directories, which ends the walk
            if fs::remove_dir(&parent).await.is_err() {
                break;
            }
            debug!(path = ?parent, "Pruned empty directory");
            path = parent;
        }
    }
}

#[async_trait]
impl MediaFileStore for LocalFileStore {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn exists(&self, relative_path: &str) -> Result<bool> {
        Ok(fs::try_exists(self.absolute(relative_path))
            .await
            .map_err(BridgeError::Io)?)
    }

    async fn read(&self, relative_path: &str) -> Result<Bytes> {
        let data = fs::read(self.absolute(relative_path))
            .await
            .map_err(BridgeError::Io)?;
        Ok(Bytes::from(data))
    }

    async fn write(&self, relative_path: &str, data: Bytes) -> Result<()> {
        let path = self.absolute(relative_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(BridgeError::Io)?;
        }
        fs::write(&path, data.as_ref())
            .await
            .map_err(BridgeError::Io)?;
        debug!(path = ?path, "Wrote media file");
        Ok(())
    }

    async fn delete(&self, relative_path: &str) -> Result<()> {
        let path = self.absolute(relative_path);
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = ?path, "Deleted media file");
                self.prune_empty_parents(path).await;
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BridgeError::Io(e)),
        }
    }

    async fn clear_all(&self) -> Result<()> {
        match fs::remove_dir_all(&self.root).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(BridgeError::Io(e)),
        }
        fs::create_dir_all(&self.root)
            .await
            .map_err(BridgeError::Io)?;
        debug!(root = ?self.root, "Cleared media store");
        Ok(())
    }
}
