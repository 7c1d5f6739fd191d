//! Settings Storage using SQLite

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::SettingsStore,
};
use sqlx::{sqlite::SqlitePool, Row};
use std::path::PathBuf;
use tracing::debug;

/// SQLite-backed settings store.
///
/// A single `settings` key-value table; values are stored as text and parsed
/// on read. Good enough for the handful of keys the core persists (catalog
/// blob, playlists blob, download-session record, volume).
pub struct SqliteSettingsStore {
    pool: SqlitePool,
}

impl SqliteSettingsStore {
    /// Open (or create) a settings database at the given path
    pub async fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(BridgeError::Io)?;
        }

        let path_str = db_path.to_string_lossy().replace('\\', "/");
        let store = Self::connect(&format!("sqlite://{}?mode=rwc", path_str)).await?;
        debug!(path = ?db_path, "Initialized settings store");
        Ok(store)
    }

    /// Create an in-memory settings store (for testing)
    pub async fn in_memory() -> Result<Self> {
        Self::connect("sqlite::memory:").await
    }

    async fn connect(db_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(db_url)
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("Failed to connect to DB: {}", e)))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| BridgeError::OperationFailed(format!("Failed to create table: {}", e)))?;

        Ok(Self { pool })
    }

    fn now() -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }

    async fn set_raw(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Self::now())
        .execute(&self.pool)
        .await
        .map_err(|e| BridgeError::OperationFailed(format!("Failed to set setting: {}", e)))?;

        Ok(())
    }

    async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("Failed to get setting: {}", e)))?;

        Ok(row.map(|r| r.get(0)))
    }

    async fn get_parsed<T: std::str::FromStr>(&self, key: &str) -> Result<Option<T>> {
        match self.get_raw(key).await? {
            Some(raw) => raw.parse().map(Some).map_err(|_| {
                BridgeError::OperationFailed(format!("Malformed value for key {}", key))
            }),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl SettingsStore for SqliteSettingsStore {
    async fn set_string(&self, key: &str, value: &str) -> Result<()> {
        self.set_raw(key, value).await
    }

    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        self.get_raw(key).await
    }

    async fn set_bool(&self, key: &str, value: bool) -> Result<()> {
        self.set_raw(key, &value.to_string()).await
    }

    async fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        self.get_parsed(key).await
    }

    async fn set_i64(&self, key: &str, value: i64) -> Result<()> {
        self.set_raw(key, &value.to_string()).await
    }

    async fn get_i64(&self, key: &str) -> Result<Option<i64>> {
        self.get_parsed(key).await
    }

    async fn set_f64(&self, key: &str, value: f64) -> Result<()> {
        self.set_raw(key, &value.to_string()).await
    }

    async fn get_f64(&self, key: &str) -> Result<Option<f64>> {
        self.get_parsed(key).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM settings WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                BridgeError::OperationFailed(format!("Failed to delete setting: {}", e))
            })?;
        Ok(())
    }

    async fn has_key(&self, key: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("Failed to check key: {}", e)))?;
        Ok(row.is_some())
    }

    async fn clear_all(&self) -> Result<()> {
        sqlx::query("DELETE FROM settings")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                BridgeError::OperationFailed(format!("Failed to clear settings: {}", e))
            })?;
        debug!("Cleared all settings");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::storage::{get_json, set_json};

    #[tokio::test]
    async fn typed_round_trip() {
        let store = SqliteSettingsStore::in_memory().await.unwrap();

        store.set_string("s", "hello").await.unwrap();
        store.set_bool("b", true).await.unwrap();
        store.set_i64("i", -3).await.unwrap();
        store.set_f64("f", 0.5).await.unwrap();

        assert_eq!(store.get_string("s").await.unwrap().as_deref(), Some("hello"));
        assert_eq!(store.get_bool("b").await.unwrap(), Some(true));
        assert_eq!(store.get_i64("i").await.unwrap(), Some(-3));
        assert_eq!(store.get_f64("f").await.unwrap(), Some(0.5));
    }

    #[tokio::test]
    async fn overwrite_and_delete() {
        let store = SqliteSettingsStore::in_memory().await.unwrap();

        store.set_i64("count", 1).await.unwrap();
        store.set_i64("count", 2).await.unwrap();
        assert_eq!(store.get_i64("count").await.unwrap(), Some(2));

        store.delete("count").await.unwrap();
        assert_eq!(store.get_i64("count").await.unwrap(), None);
        assert!(!store.has_key("count").await.unwrap());
    }

    #[tokio::test]
    async fn json_blob_round_trip() {
        let store = SqliteSettingsStore::in_memory().await.unwrap();
        let blob = vec![1u32, 2, 3];

        set_json(&store, "blob", &blob).await.unwrap();
        let loaded: Option<Vec<u32>> = get_json(&store, "blob").await.unwrap();
        assert_eq!(loaded, Some(blob));
    }
}
