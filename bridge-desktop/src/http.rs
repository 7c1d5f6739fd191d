//! HTTP Client and Background Transfers using Reqwest + Tokio

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{
        BackgroundTransferClient, HttpClient, HttpResponse, TransferUpdate, TransferUpdateStream,
    },
};
use reqwest::Client;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, warn};

/// Reqwest-based HTTP client for one-shot requests
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Create a new HTTP client with custom timeout
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent("wearable-media-core/0.1.0")
            .build()
            .unwrap_or_default();

        Self { client }
    }

    /// Wrap an existing reqwest client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        debug!(url = %url, "Executing GET request");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("Request failed: {}", e)))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("Body read failed: {}", e)))?;

        Ok(HttpResponse { status, body })
    }
}

/// Background transfer manager built on detached Tokio tasks.
///
/// The desktop analog of an OS-managed background URL session: each submitted
/// download runs in a spawned task that holds no reference back to the
/// submitter, writes its bytes to a staging file, and reports through a
/// broadcast channel. Subscribers that appear later still drain updates for
/// transfers submitted before they existed, as long as this manager is alive.
///
/// `SessionDrained` is emitted exactly once each time the in-flight count
/// returns to zero, after the final per-file update of that batch.
pub struct TokioTransferManager {
    client: Client,
    staging_dir: PathBuf,
    updates: broadcast::Sender<TransferUpdate>,
    outstanding: Arc<Mutex<usize>>,
    sequence: AtomicU64,
}

impl TokioTransferManager {
    /// Create a manager staging downloads under the platform cache directory
    pub fn new() -> Self {
        let staging_dir = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("wearable-media-core")
            .join("staging");
        Self::with_staging_dir(staging_dir)
    }

    /// Create a manager with a custom staging directory
    pub fn with_staging_dir(staging_dir: PathBuf) -> Self {
        let (updates, _) = broadcast::channel(256);
        Self {
            client: Client::new(),
            staging_dir,
            updates,
            outstanding: Arc::new(Mutex::new(0)),
            sequence: AtomicU64::new(0),
        }
    }
}

impl Default for TokioTransferManager {
    fn default() -> Self {
        Self::new()
    }
}

async fn run_transfer(
    client: Client,
    url: String,
    tag: String,
    staged_at: PathBuf,
) -> std::result::Result<(), String> {
    let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| format!("Request failed: {}", e))?;

    if !response.status().is_success() {
        return Err(format!("HTTP {} for {}", response.status().as_u16(), tag));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| format!("Body read failed: {}", e))?;

    if let Some(parent) = staged_at.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| format!("Staging dir creation failed: {}", e))?;
    }
    tokio::fs::write(&staged_at, &body)
        .await
        .map_err(|e| format!("Staging write failed: {}", e))?;

    Ok(())
}

#[async_trait]
impl BackgroundTransferClient for TokioTransferManager {
    async fn submit(&self, url: &str, tag: &str) -> Result<()> {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        let staged_at = self.staging_dir.join(format!("transfer-{}.part", seq));

        {
            let mut count = self.outstanding.lock().await;
            *count += 1;
        }

        let client = self.client.clone();
        let url = url.to_string();
        let tag = tag.to_string();
        let updates = self.updates.clone();
        let outstanding = Arc::clone(&self.outstanding);

        // Detached on purpose: the transfer must outlive the submitter.
        tokio::spawn(async move {
            let update = match run_transfer(client, url, tag.clone(), staged_at.clone()).await {
                Ok(()) => TransferUpdate::Delivered { tag, staged_at },
                Err(message) => {
                    warn!(tag = %tag, message = %message, "Background transfer failed");
                    TransferUpdate::Failed { tag, message }
                }
            };

            // Hold the count lock across both sends so the drained event
            // cannot interleave ahead of another transfer's final update.
            let mut count = outstanding.lock().await;
            updates.send(update).ok();
            *count -= 1;
            if *count == 0 {
                updates.send(TransferUpdate::SessionDrained).ok();
            }
        });

        debug!(seq = seq, "Submitted background transfer");
        Ok(())
    }

    async fn subscribe_updates(&self) -> Result<Box<dyn TransferUpdateStream>> {
        Ok(Box::new(BroadcastUpdateStream {
            rx: self.updates.subscribe(),
        }))
    }
}

struct BroadcastUpdateStream {
    rx: broadcast::Receiver<TransferUpdate>,
}

#[async_trait]
impl TransferUpdateStream for BroadcastUpdateStream {
    async fn next(&mut self) -> Option<TransferUpdate> {
        loop {
            match self.rx.recv().await {
                Ok(update) => return Some(update),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(missed = n, "Transfer update stream lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn http_client_constructs() {
        let _client = ReqwestHttpClient::new();
    }

    #[tokio::test]
    async fn failed_transfer_reports_and_drains() {
        let manager =
            TokioTransferManager::with_staging_dir(std::env::temp_dir().join("ttm-tests"));
        let mut stream = manager.subscribe_updates().await.unwrap();

        // Unroutable address: the transfer fails fast without a server.
        manager
            .submit("http://127.0.0.1:1/missing.mp3", "a/b.mp3")
            .await
            .unwrap();

        match stream.next().await {
            Some(TransferUpdate::Failed { tag, .. }) => assert_eq!(tag, "a/b.mp3"),
            other => panic!("expected Failed update, got {:?}", other),
        }
        assert!(matches!(
            stream.next().await,
            Some(TransferUpdate::SessionDrained)
        ));
    }
}
