//! Storage Abstractions
//!
//! Provides platform-agnostic traits for durable key-value settings and the
//! on-device media file store.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::error::{BridgeError, Result};

/// Key-value settings storage trait
///
/// Abstracts the host's persistent preferences store. Values survive process
/// restarts; the sync engine relies on this for its durability boundary.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::SettingsStore;
///
/// async fn remember_sync(store: &dyn SettingsStore) -> Result<()> {
///     store.set_bool("sync.download_in_progress", true).await?;
///     store.set_i64("sync.expected_file_count", 42).await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Store a string value
    async fn set_string(&self, key: &str, value: &str) -> Result<()>;

    /// Retrieve a string value
    async fn get_string(&self, key: &str) -> Result<Option<String>>;

    /// Store a boolean value
    async fn set_bool(&self, key: &str, value: bool) -> Result<()>;

    /// Retrieve a boolean value
    async fn get_bool(&self, key: &str) -> Result<Option<bool>>;

    /// Store an integer value
    async fn set_i64(&self, key: &str, value: i64) -> Result<()>;

    /// Retrieve an integer value
    async fn get_i64(&self, key: &str) -> Result<Option<i64>>;

    /// Store a floating-point value
    async fn set_f64(&self, key: &str, value: f64) -> Result<()>;

    /// Retrieve a floating-point value
    async fn get_f64(&self, key: &str) -> Result<Option<f64>>;

    /// Delete a setting
    async fn delete(&self, key: &str) -> Result<()>;

    /// Check if a setting exists
    async fn has_key(&self, key: &str) -> Result<bool>;

    /// Clear all settings
    async fn clear_all(&self) -> Result<()>;
}

/// Store any JSON-serializable value under a key.
///
/// Layered over [`SettingsStore::set_string`] so every implementation gets
/// blob storage for free. This is how the catalog and playlist collections
/// are persisted.
pub async fn set_json<T: Serialize>(
    store: &dyn SettingsStore,
    key: &str,
    value: &T,
) -> Result<()> {
    let json = serde_json::to_string(value)
        .map_err(|e| BridgeError::OperationFailed(format!("JSON encoding failed: {}", e)))?;
    store.set_string(key, &json).await
}

/// Retrieve a JSON-serializable value stored with [`set_json`].
///
/// Returns `Ok(None)` if the key doesn't exist.
pub async fn get_json<T: DeserializeOwned>(
    store: &dyn SettingsStore,
    key: &str,
) -> Result<Option<T>> {
    match store.get_string(key).await? {
        Some(json) => {
            let value = serde_json::from_str(&json).map_err(|e| {
                BridgeError::OperationFailed(format!("JSON decoding failed: {}", e))
            })?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

/// Media file store trait
///
/// Hierarchical binary blobs addressed by relative path under a single root.
/// Song files land at `root/{relative_path}`, where the relative path mirrors
/// the remote manifest's structure (typically `Artist/Album/Song.ext`).
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::MediaFileStore;
///
/// async fn stash(files: &dyn MediaFileStore, data: Bytes) -> Result<()> {
///     files.write("Muse/Absolution/Hysteria.mp3", data).await
/// }
/// ```
#[async_trait]
pub trait MediaFileStore: Send + Sync {
    /// Root directory of the store
    fn root(&self) -> &Path;

    /// Check whether a blob exists at the given relative path
    async fn exists(&self, relative_path: &str) -> Result<bool>;

    /// Read an entire blob into memory
    async fn read(&self, relative_path: &str) -> Result<Bytes>;

    /// Write a blob, creating intermediate directories and overwriting any
    /// stale partial at the same path
    async fn write(&self, relative_path: &str, data: Bytes) -> Result<()>;

    /// Delete a blob. Deleting an absent path is not an error.
    async fn delete(&self, relative_path: &str) -> Result<()>;

    /// Delete every blob in the store
    async fn clear_all(&self) -> Result<()>;

    /// Absolute path a relative path resolves to
    fn resolve(&self, relative_path: &str) -> PathBuf {
        self.root().join(relative_path)
    }
}

/// In-memory settings store for tests and development
#[derive(Default)]
pub struct MemorySettingsStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn set_raw(&self, key: &str, value: String) -> Result<()> {
        self.values.lock().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn get_parsed<T: std::str::FromStr>(&self, key: &str) -> Result<Option<T>> {
        match self.values.lock().await.get(key) {
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| BridgeError::OperationFailed(format!("Parse error for key {}", key))),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn set_string(&self, key: &str, value: &str) -> Result<()> {
        self.set_raw(key, value.to_string()).await
    }

    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set_bool(&self, key: &str, value: bool) -> Result<()> {
        self.set_raw(key, value.to_string()).await
    }

    async fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        self.get_parsed(key).await
    }

    async fn set_i64(&self, key: &str, value: i64) -> Result<()> {
        self.set_raw(key, value.to_string()).await
    }

    async fn get_i64(&self, key: &str) -> Result<Option<i64>> {
        self.get_parsed(key).await
    }

    async fn set_f64(&self, key: &str, value: f64) -> Result<()> {
        self.set_raw(key, value.to_string()).await
    }

    async fn get_f64(&self, key: &str) -> Result<Option<f64>> {
        self.get_parsed(key).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.values.lock().await.remove(key);
        Ok(())
    }

    async fn has_key(&self, key: &str) -> Result<bool> {
        Ok(self.values.lock().await.contains_key(key))
    }

    async fn clear_all(&self) -> Result<()> {
        self.values.lock().await.clear();
        Ok(())
    }
}

/// In-memory media file store for tests and development
pub struct MemoryFileStore {
    root: PathBuf,
    blobs: Mutex<HashMap<String, Bytes>>,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self {
            root: PathBuf::from("/memory"),
            blobs: Mutex::new(HashMap::new()),
        }
    }

    /// Number of blobs currently stored
    pub async fn len(&self) -> usize {
        self.blobs.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.lock().await.is_empty()
    }
}

impl Default for MemoryFileStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaFileStore for MemoryFileStore {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn exists(&self, relative_path: &str) -> Result<bool> {
        Ok(self.blobs.lock().await.contains_key(relative_path))
    }

    async fn read(&self, relative_path: &str) -> Result<Bytes> {
        self.blobs
            .lock()
            .await
            .get(relative_path)
            .cloned()
            .ok_or_else(|| BridgeError::NotAvailable(format!("No blob at {}", relative_path)))
    }

    async fn write(&self, relative_path: &str, data: Bytes) -> Result<()> {
        self.blobs
            .lock()
            .await
            .insert(relative_path.to_string(), data);
        Ok(())
    }

    async fn delete(&self, relative_path: &str) -> Result<()> {
        self.blobs.lock().await.remove(relative_path);
        Ok(())
    }

    async fn clear_all(&self) -> Result<()> {
        self.blobs.lock().await.clear();
        Ok(())
    }
}
