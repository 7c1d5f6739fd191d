//! # Sync Engine
//!
//! Orchestrates a full library sync against a remote manifest endpoint.
//!
//! ## Workflow
//!
//! 1. Reset: clear the catalog and wipe the media store, then persist
//!    `DownloadSession { in_progress: true, total: 0 }` *before* any network
//!    I/O — the durability boundary. If the process dies right after this
//!    write, restart reconciliation concludes a sync was in flight.
//! 2. Fetch and decode the manifest.
//! 3. Materialize and persist the new catalog (atomic from the callers'
//!    point of view: the old cleared state or the whole new tree).
//! 4. Submit one fire-and-forget background download per song, correlated
//!    by the song's relative path. Persist the expected file count.
//! 5. Consume [`TransferUpdate`]s: move delivered bytes into the media
//!    store, count completions, and clear the session when the transfer
//!    layer signals that everything drained.
//!
//! After step 4 the engine holds no per-task state; all coordination runs
//! through the persisted session record plus file-system inspection. That is
//! what makes [`SyncEngine::reconcile_on_launch`] possible: after an
//! arbitrary-length suspension the only reliable signal is which files
//! actually exist.

use crate::error::{Result, SyncError};
use crate::manifest::{self, ManifestAlbum};
use crate::session::DownloadSession;
use bridge_traits::http::{BackgroundTransferClient, HttpClient, TransferUpdate};
use bridge_traits::storage::{MediaFileStore, SettingsStore};
use bytes::Bytes;
use core_library::CatalogStore;
use core_runtime::events::{CoreEvent, EventBus, SyncEvent};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, instrument, warn};

/// Snapshot of download progress for UI consumption.
///
/// Purely informational: correctness never depends on these counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DownloadProgress {
    pub in_progress: bool,
    pub total: u64,
    pub completed: u64,
    pub failed: u64,
}

/// The library synchronization engine.
pub struct SyncEngine {
    http: Arc<dyn HttpClient>,
    transfers: Arc<dyn BackgroundTransferClient>,
    catalog: Arc<CatalogStore>,
    files: Arc<dyn MediaFileStore>,
    settings: Arc<dyn SettingsStore>,
    event_bus: Arc<EventBus>,
    progress: Mutex<DownloadProgress>,
    /// Held for the duration of a `start_sync` call; a second concurrent
    /// call fails with `SyncInProgress` instead of interleaving resets.
    sync_guard: Mutex<()>,
}

impl SyncEngine {
    pub fn new(
        http: Arc<dyn HttpClient>,
        transfers: Arc<dyn BackgroundTransferClient>,
        catalog: Arc<CatalogStore>,
        files: Arc<dyn MediaFileStore>,
        settings: Arc<dyn SettingsStore>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            http,
            transfers,
            catalog,
            files,
            settings,
            event_bus,
            progress: Mutex::new(DownloadProgress::default()),
            sync_guard: Mutex::new(()),
        }
    }

    /// Current progress snapshot.
    pub async fn progress(&self) -> DownloadProgress {
        *self.progress.lock().await
    }

    /// Run a full sync against `manifest_address`.
    ///
    /// On failure the persisted session record is cleared so the user can
    /// retry without manual cleanup; the catalog is left in whatever state
    /// the failing step produced (the reset already destroyed the old one).
    #[instrument(skip(self))]
    pub async fn start_sync(&self, manifest_address: &str) -> Result<()> {
        let _guard = self
            .sync_guard
            .try_lock()
            .map_err(|_| SyncError::SyncInProgress)?;

        info!(address = %manifest_address, "Starting library sync");

        // Reset phase: no stale song can be served from here on. The
        // session record goes down before the first network call.
        self.catalog.clear().await?;
        DownloadSession {
            in_progress: true,
            total_expected: 0,
        }
        .store(self.settings.as_ref())
        .await?;
        *self.progress.lock().await = DownloadProgress {
            in_progress: true,
            ..Default::default()
        };

        match self.fetch_and_fan_out(manifest_address).await {
            Ok(total) => {
                self.progress.lock().await.total = total;
                self.event_bus
                    .emit(CoreEvent::Sync(SyncEvent::Started {
                        expected_files: total,
                    }))
                    .ok();
                info!(expected_files = total, "Sync fan-out complete");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Sync failed");
                DownloadSession::clear(self.settings.as_ref()).await?;
                *self.progress.lock().await = DownloadProgress::default();
                self.event_bus
                    .emit(CoreEvent::Sync(SyncEvent::Failed {
                        message: e.to_string(),
                    }))
                    .ok();
                Err(e)
            }
        }
    }

    /// Steps 2-4: manifest fetch, catalog materialization, download fan-out.
    async fn fetch_and_fan_out(&self, manifest_address: &str) -> Result<u64> {
        let manifest_url = manifest::parse_manifest_url(manifest_address)?;
        let entries: Vec<ManifestAlbum> =
            manifest::fetch_manifest(self.http.as_ref(), &manifest_url).await?;

        let artists = manifest::materialize(entries);
        self.catalog.replace(artists).await?;

        let base = manifest::base_url(&manifest_url);
        let songs = self.catalog.songs().await;
        for song in &songs {
            let url = manifest::download_url(&base, &song.relative_path);
            // The relative path doubles as the correlation tag: it is the
            // only way the completion handler learns where the bytes go.
            self.transfers
                .submit(&url, &song.relative_path)
                .await
                .map_err(|e| SyncError::RequestFailed(e.to_string()))?;
        }

        let total = songs.len() as u64;
        DownloadSession {
            in_progress: true,
            total_expected: total,
        }
        .store(self.settings.as_ref())
        .await?;

        Ok(total)
    }

    /// Consume one transfer update.
    ///
    /// This is the engine's end of the completion event channel; the
    /// listener spawned by [`spawn_transfer_listener`](Self::spawn_transfer_listener)
    /// feeds it, and completions may arrive for transfers submitted by a
    /// previous incarnation of the engine.
    pub async fn handle_update(&self, update: TransferUpdate) {
        match update {
            TransferUpdate::Delivered { tag, staged_at } => {
                match tokio::fs::read(&staged_at).await {
                    Ok(data) => {
                        self.store_delivered(&tag, Bytes::from(data)).await;
                        if let Err(e) = tokio::fs::remove_file(&staged_at).await {
                            warn!(staged = ?staged_at, error = %e, "Failed to remove staged file");
                        }
                    }
                    Err(e) => {
                        warn!(tag = %tag, error = %e, "Failed to read staged download");
                        self.record_failure(&tag, e.to_string()).await;
                    }
                }
            }
            TransferUpdate::Failed { tag, message } => {
                warn!(tag = %tag, message = %message, "Song download failed");
                self.record_failure(&tag, message).await;
            }
            TransferUpdate::SessionDrained => {
                info!("Background transfer session drained");
                if let Err(e) = DownloadSession::clear(self.settings.as_ref()).await {
                    warn!(error = %e, "Failed to clear download session record");
                }
                *self.progress.lock().await = DownloadProgress::default();
                self.event_bus.emit(CoreEvent::Sync(SyncEvent::Completed)).ok();
            }
        }
    }

    async fn store_delivered(&self, tag: &str, data: Bytes) {
        if let Err(e) = self.files.write(tag, data).await {
            warn!(tag = %tag, error = %e, "Failed to store downloaded song");
            self.record_failure(tag, e.to_string()).await;
            return;
        }

        let snapshot = {
            let mut progress = self.progress.lock().await;
            progress.completed += 1;
            *progress
        };
        self.event_bus
            .emit(CoreEvent::Sync(SyncEvent::FileDownloaded {
                completed: snapshot.completed,
                total: snapshot.total,
            }))
            .ok();
    }

    async fn record_failure(&self, tag: &str, message: String) {
        self.progress.lock().await.failed += 1;
        self.event_bus
            .emit(CoreEvent::Sync(SyncEvent::FileFailed {
                tag: tag.to_string(),
                message,
            }))
            .ok();
    }

    /// Spawn the background task that drains the transfer update stream
    /// into [`handle_update`](Self::handle_update).
    pub fn spawn_transfer_listener(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        let engine = self;
        tokio::spawn(async move {
            match engine.transfers.subscribe_updates().await {
                Ok(mut stream) => {
                    while let Some(update) = stream.next().await {
                        engine.handle_update(update).await;
                    }
                }
                Err(e) => error!(error = %e, "Failed to subscribe to transfer updates"),
            }
        })
    }

    /// Restart reconciliation. Runs once at process start, before anything
    /// else touches download state.
    ///
    /// If the persisted session says a sync was in flight, the expected
    /// total is restored and the completed count is *re-derived* by counting
    /// which catalog songs already resolve to a file on disk — a persisted
    /// counter would be stale after an arbitrary-length suspension. No
    /// downloads are re-issued; the OS-level session is assumed to still be
    /// draining.
    #[instrument(skip(self))]
    pub async fn reconcile_on_launch(&self) -> Result<()> {
        let session = DownloadSession::load(self.settings.as_ref()).await?;
        if !session.in_progress {
            return Ok(());
        }

        let mut completed = 0u64;
        for song in self.catalog.songs().await {
            match self.files.exists(&song.relative_path).await {
                Ok(true) => completed += 1,
                Ok(false) => {}
                Err(e) => warn!(path = %song.relative_path, error = %e, "Existence check failed"),
            }
        }

        info!(
            completed = completed,
            total = session.total_expected,
            "Reconciled download session from disk"
        );
        *self.progress.lock().await = DownloadProgress {
            in_progress: true,
            total: session.total_expected,
            completed,
            failed: 0,
        };
        self.event_bus
            .emit(CoreEvent::Sync(SyncEvent::Reconciled {
                completed,
                total: session.total_expected,
            }))
            .ok();
        Ok(())
    }

    /// Explicitly delete the whole library: catalog, files and the download
    /// session record.
    #[instrument(skip(self))]
    pub async fn delete_library(&self) -> Result<()> {
        self.catalog.clear().await?;
        DownloadSession::clear(self.settings.as_ref()).await?;
        *self.progress.lock().await = DownloadProgress::default();
        info!("Deleted library");
        Ok(())
    }
}
