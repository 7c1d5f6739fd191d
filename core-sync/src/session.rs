//! The persisted download-session record.
//!
//! This is the durable flag that lets the engine survive a process restart
//! mid-download: it is written before any network I/O starts and cleared
//! only when the transfer session drains (or the sync fails / the library
//! is deleted).

use crate::error::Result;
use bridge_traits::storage::SettingsStore;

/// Settings key: whether background downloads are outstanding.
pub const DOWNLOAD_IN_PROGRESS_KEY: &str = "sync.download_in_progress";
/// Settings key: how many song files the running sync expects.
pub const EXPECTED_FILE_COUNT_KEY: &str = "sync.expected_file_count";

/// Durable record of an in-flight download session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DownloadSession {
    pub in_progress: bool,
    pub total_expected: u64,
}

impl DownloadSession {
    /// Read the persisted record. Absent keys mean "no session".
    pub async fn load(settings: &dyn SettingsStore) -> Result<Self> {
        let in_progress = settings
            .get_bool(DOWNLOAD_IN_PROGRESS_KEY)
            .await?
            .unwrap_or(false);
        let total_expected = settings
            .get_i64(EXPECTED_FILE_COUNT_KEY)
            .await?
            .unwrap_or(0)
            .max(0) as u64;

        Ok(Self {
            in_progress,
            total_expected,
        })
    }

    /// Persist this record.
    pub async fn store(&self, settings: &dyn SettingsStore) -> Result<()> {
        settings
            .set_bool(DOWNLOAD_IN_PROGRESS_KEY, self.in_progress)
            .await?;
        settings
            .set_i64(EXPECTED_FILE_COUNT_KEY, self.total_expected as i64)
            .await?;
        Ok(())
    }

    /// Clear the persisted record back to "no session".
    pub async fn clear(settings: &dyn SettingsStore) -> Result<()> {
        settings.set_bool(DOWNLOAD_IN_PROGRESS_KEY, false).await?;
        settings.set_i64(EXPECTED_FILE_COUNT_KEY, 0).await?;
        Ok(())
    }
}
