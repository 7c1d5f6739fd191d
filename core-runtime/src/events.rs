//! # Event Bus
//!
//! Decoupled communication between core modules and the UI layer through a
//! `tokio::sync::broadcast` channel of typed events.
//!
//! The sync engine, library stores and playback session all publish here;
//! the (out-of-scope) UI subscribes to drive its counters and now-playing
//! state. Emission never blocks and never fails the emitting operation —
//! call sites use `event_bus.emit(...).ok()`.
//!
//! ## Usage
//!
//! ```
//! use core_runtime::events::{CoreEvent, EventBus, SyncEvent};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let bus = EventBus::new(100);
//! let mut stream = bus.subscribe();
//!
//! bus.emit(CoreEvent::Sync(SyncEvent::Started { expected_files: 3 })).ok();
//! assert!(matches!(
//!     stream.recv().await,
//!     Ok(CoreEvent::Sync(SyncEvent::Started { expected_files: 3 }))
//! ));
//! # }
//! ```
//!
//! Subscribers that fall behind receive `RecvError::Lagged(n)` and should
//! carry on; `RecvError::Closed` signals shutdown.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Library sync and download events
    Sync(SyncEvent),
    /// Catalog and playlist events
    Library(LibraryEvent),
    /// Playback session events
    Playback(PlaybackEvent),
}

/// Events emitted by the sync engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum SyncEvent {
    /// A sync started; downloads for `expected_files` songs were submitted.
    Started { expected_files: u64 },
    /// One song file landed in the media store.
    FileDownloaded { completed: u64, total: u64 },
    /// One song download failed; the sync continues.
    FileFailed { tag: String, message: String },
    /// All outstanding downloads drained; the session record was cleared.
    Completed,
    /// The sync aborted before fan-out finished.
    Failed { message: String },
    /// Restart reconciliation recomputed progress from disk.
    Reconciled { completed: u64, total: u64 },
}

/// Events emitted by the catalog and playlist stores.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum LibraryEvent {
    /// The whole catalog was replaced (sync step) or cleared.
    CatalogReplaced { artists: u64 },
    /// A song was removed, with empty album/artist nodes pruned.
    SongDeleted { song_id: String },
    /// An album and all its songs were removed.
    AlbumDeleted { album_id: String },
    /// An artist and all their albums were removed.
    ArtistDeleted { artist_id: String },
    PlaylistCreated { playlist_id: String },
    PlaylistUpdated { playlist_id: String },
    PlaylistDeleted { playlist_id: String },
}

/// Events emitted by the playback session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// A song started (or resumed) playing.
    Started { song_id: String },
    Paused,
    /// Playback was fully torn down (explicitly or by the inactivity timer).
    Stopped,
    /// The current track finished naturally.
    TrackCompleted { song_id: String },
    /// Periodic progress sample, `0.0..=1.0`.
    PositionChanged { progress: f32 },
    /// Soft playback error (e.g. missing file); the session stays usable.
    Error { message: String },
}

/// Central broadcast bus for [`CoreEvent`]s.
///
/// Cloning is cheap; clones share the same channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Create a bus with the given channel capacity.
    pub fn new(buffer_size: usize) -> Self {
        let (sender, _) = broadcast::channel(buffer_size);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Returns `Err` only when there are no subscribers, which emitters
    /// treat as a non-event (`.ok()`).
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Subscribe to all events from this point on.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}
