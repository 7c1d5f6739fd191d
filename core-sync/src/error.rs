use thiserror::Error;

/// Sync failures, each rendering to a single human-readable message for the
/// UI layer. None are fatal to the process.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Invalid library address: {0}")]
    InvalidUrl(String),

    #[error("Library download failed with HTTP status {status}")]
    DownloadFailed { status: u16 },

    #[error("Could not decode the library manifest: {0}")]
    DecodingFailed(String),

    #[error("Library request failed: {0}")]
    RequestFailed(String),

    #[error("A library sync is already running")]
    SyncInProgress,

    #[error("Library error: {0}")]
    Library(#[from] core_library::LibraryError),

    #[error("Storage error: {0}")]
    Storage(#[from] bridge_traits::BridgeError),
}

pub type Result<T> = std::result::Result<T, SyncError>;
