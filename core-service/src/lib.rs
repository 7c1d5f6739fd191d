//! Core service façade and bootstrap helpers.
//!
//! Wires host-provided bridge implementations into the media core's service
//! objects — one explicit construction at process start, no ambient global
//! lookup anywhere. Hosts build a
//! [`CoreConfig`](core_runtime::config::CoreConfig) from their platform
//! adapters and call [`MediaCore::bootstrap`].

pub mod error;

pub use error::{CoreServiceError, Result};

use core_library::{CatalogStore, LibraryIndex, PlaylistStore};
use core_playback::PlaybackSession;
use core_runtime::config::CoreConfig;
use core_runtime::events::EventBus;
use core_sync::SyncEngine;
use std::sync::Arc;
use tracing::info;

/// Primary façade exposed to host applications: the fully wired service set.
#[derive(Clone)]
pub struct MediaCore {
    pub catalog: Arc<CatalogStore>,
    pub playlists: Arc<PlaylistStore>,
    pub sync: Arc<SyncEngine>,
    pub playback: PlaybackSession,
    pub event_bus: Arc<EventBus>,
}

impl MediaCore {
    /// Construct and start every service.
    ///
    /// Startup order matters: durable state is restored first, then the
    /// download session is reconciled against the file store — before
    /// anything else can touch download state — and only then do the
    /// transfer and end-of-track listeners start.
    pub async fn bootstrap(config: CoreConfig) -> Result<Self> {
        let event_bus = config.event_bus.clone();

        let catalog = Arc::new(CatalogStore::new(
            config.settings.clone(),
            config.media_files.clone(),
            event_bus.clone(),
        ));
        let playlists = Arc::new(PlaylistStore::new(
            config.settings.clone(),
            event_bus.clone(),
        ));
        catalog.load().await?;
        playlists.load().await?;

        let sync = Arc::new(SyncEngine::new(
            config.http_client.clone(),
            config.transfers.clone(),
            catalog.clone(),
            config.media_files.clone(),
            config.settings.clone(),
            event_bus.clone(),
        ));
        sync.reconcile_on_launch().await?;
        sync.clone().spawn_transfer_listener();

        let playback = PlaybackSession::new(
            config.audio_engine.clone(),
            config.media_files.clone(),
            config.settings.clone(),
            event_bus.clone(),
        )
        .await;
        playback.spawn_finished_listener();

        info!("Media core bootstrapped");
        Ok(Self {
            catalog,
            playlists,
            sync,
            playback,
            event_bus,
        })
    }

    /// Build a fresh read-only index over the current catalog snapshot.
    pub async fn library_index(&self) -> LibraryIndex {
        LibraryIndex::build(self.catalog.artists().await)
    }
}
