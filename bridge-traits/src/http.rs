//! HTTP and Background Transfer Abstractions
//!
//! One-shot requests plus OS-managed background downloads that survive the
//! requesting component's lifetime.

use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::path::PathBuf;

use crate::error::{BridgeError, Result};

/// HTTP response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

impl HttpResponse {
    /// Parse response body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            BridgeError::OperationFailed(format!("JSON deserialization failed: {}", e))
        })
    }

    /// Check if response status is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Async HTTP client trait for one-shot requests
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Execute a GET request and buffer the full response
    ///
    /// # Errors
    ///
    /// Returns an error if the connection fails or times out. Non-2xx
    /// statuses are NOT errors at this layer; callers inspect
    /// [`HttpResponse::status`].
    async fn get(&self, url: &str) -> Result<HttpResponse>;
}

/// Update emitted by the host's background transfer machinery.
///
/// Every update carries the opaque correlation tag the download was submitted
/// with; tags are the only way a consumer learns which file an event belongs
/// to, since task handles are never retained.
#[derive(Debug, Clone)]
pub enum TransferUpdate {
    /// A single download finished; its bytes are staged at `staged_at`, a
    /// temporary location the consumer must move the data out of.
    Delivered { tag: String, staged_at: PathBuf },
    /// A single download failed.
    Failed { tag: String, message: String },
    /// All outstanding transfers for the session have been delivered. Emitted
    /// once per drained session, after the last per-file update.
    SessionDrained,
}

/// Stream of background transfer updates
#[async_trait]
pub trait TransferUpdateStream: Send {
    /// Get the next update.
    ///
    /// Returns `None` when the stream is closed.
    async fn next(&mut self) -> Option<TransferUpdate>;
}

/// Background transfer client trait
///
/// Abstracts OS-managed file transfers that continue independent of the
/// requesting component's running/suspended state:
/// - **iOS/watchOS**: background `URLSession`
/// - **Android**: `DownloadManager` / WorkManager
/// - **Desktop**: detached runtime tasks (see `bridge-desktop`)
///
/// Submission is fire-and-forget: no per-task handle is returned, and
/// submitted transfers cannot be recalled. Coordination happens exclusively
/// through the [`TransferUpdate`] stream plus whatever durable record the
/// consumer keeps.
#[async_trait]
pub trait BackgroundTransferClient: Send + Sync {
    /// Submit a download for `url`, correlated by the opaque `tag`.
    ///
    /// The tag is echoed back in every [`TransferUpdate`] for this transfer.
    async fn submit(&self, url: &str, tag: &str) -> Result<()>;

    /// Subscribe to transfer updates.
    ///
    /// Updates for transfers submitted before the subscription (including by
    /// a previous incarnation of the consumer) are delivered too — the
    /// transfer session outlives its submitters.
    async fn subscribe_updates(&self) -> Result<Box<dyn TransferUpdateStream>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_status_checks() {
        let ok = HttpResponse {
            status: 200,
            body: Bytes::from_static(b"{}"),
        };
        let missing = HttpResponse {
            status: 404,
            body: Bytes::new(),
        };

        assert!(ok.is_success());
        assert!(!missing.is_success());
    }

    #[test]
    fn response_json_decoding() {
        let response = HttpResponse {
            status: 200,
            body: Bytes::from_static(b"[1, 2, 3]"),
        };

        let decoded: Vec<u32> = response.json().unwrap();
        assert_eq!(decoded, vec![1, 2, 3]);

        let garbled = HttpResponse {
            status: 200,
            body: Bytes::from_static(b"not json"),
        };
        assert!(garbled.json::<Vec<u32>>().is_err());
    }
}
