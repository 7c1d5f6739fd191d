//! Playlist store: user-created named orderings of songs.
//!
//! Same durable-collection pattern as the catalog: mutate in memory behind
//! one lock, persist the whole list on every change. Playlists copy songs by
//! value and are deliberately independent of the catalog tree — removing a
//! song from the library leaves playlist entries in place.

use crate::error::{LibraryError, Result};
use crate::models::{Playlist, PlaylistId, Song, SongId};
use bridge_traits::storage::{get_json, set_json, SettingsStore};
use core_runtime::events::{CoreEvent, EventBus, LibraryEvent};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// Settings key holding the JSON-encoded playlist list.
pub const PLAYLISTS_KEY: &str = "library.playlists";

pub struct PlaylistStore {
    settings: Arc<dyn SettingsStore>,
    event_bus: Arc<EventBus>,
    playlists: Mutex<Vec<Playlist>>,
}

impl PlaylistStore {
    pub fn new(settings: Arc<dyn SettingsStore>, event_bus: Arc<EventBus>) -> Self {
        Self {
            settings,
            event_bus,
            playlists: Mutex::new(Vec::new()),
        }
    }

    /// Restore playlists from the settings store.
    pub async fn load(&self) -> Result<()> {
        let stored: Option<Vec<Playlist>> =
            get_json(self.settings.as_ref(), PLAYLISTS_KEY).await?;
        let playlists = stored.unwrap_or_default();
        info!(playlists = playlists.len(), "Loaded playlists");
        *self.playlists.lock().await = playlists;
        Ok(())
    }

    /// Cloned snapshot of all playlists.
    pub async fn playlists(&self) -> Vec<Playlist> {
        self.playlists.lock().await.clone()
    }

    /// Find a playlist by id.
    pub async fn find(&self, id: &PlaylistId) -> Option<Playlist> {
        self.playlists
            .lock()
            .await
            .iter()
            .find(|p| &p.id == id)
            .cloned()
    }

    /// Create a new empty playlist.
    pub async fn create(&self, name: impl Into<String>) -> Result<Playlist> {
        let playlist = Playlist::new(name);
        playlist
            .validate()
            .map_err(|message| LibraryError::InvalidInput {
                field: "Playlist".to_string(),
                message,
            })?;

        {
            let mut guard = self.playlists.lock().await;
            guard.push(playlist.clone());
            set_json(self.settings.as_ref(), PLAYLISTS_KEY, &*guard).await?;
        }

        self.event_bus
            .emit(CoreEvent::Library(LibraryEvent::PlaylistCreated {
                playlist_id: playlist.id.to_string(),
            }))
            .ok();
        Ok(playlist)
    }

    /// Rename an existing playlist.
    pub async fn rename(&self, id: &PlaylistId, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(LibraryError::InvalidInput {
                field: "Playlist".to_string(),
                message: "Playlist name cannot be empty".to_string(),
            });
        }

        {
            let mut guard = self.playlists.lock().await;
            let playlist = guard
                .iter_mut()
                .find(|p| &p.id == id)
                .ok_or_else(|| LibraryError::NotFound {
                    entity: "Playlist",
                    id: id.to_string(),
                })?;
            playlist.name = name;
            set_json(self.settings.as_ref(), PLAYLISTS_KEY, &*guard).await?;
        }

        self.emit_updated(id);
        Ok(())
    }

    /// Delete a playlist. Returns `Ok(false)` when it doesn't exist.
    pub async fn delete(&self, id: &PlaylistId) -> Result<bool> {
        let removed = {
            let mut guard = self.playlists.lock().await;
            match guard.iter().position(|p| &p.id == id) {
                Some(idx) => {
                    guard.remove(idx);
                    set_json(self.settings.as_ref(), PLAYLISTS_KEY, &*guard).await?;
                    true
                }
                None => false,
            }
        };

        if removed {
            self.event_bus
                .emit(CoreEvent::Library(LibraryEvent::PlaylistDeleted {
                    playlist_id: id.to_string(),
                }))
                .ok();
        }
        Ok(removed)
    }

    /// Append a song copy to a playlist. Adding a song whose id is already
    /// present is a no-op.
    pub async fn add_song(&self, id: &PlaylistId, song: Song) -> Result<()> {
        let changed = {
            let mut guard = self.playlists.lock().await;
            let playlist = guard
                .iter_mut()
                .find(|p| &p.id == id)
                .ok_or_else(|| LibraryError::NotFound {
                    entity: "Playlist",
                    id: id.to_string(),
                })?;

            if playlist.contains(&song.id) {
                false
            } else {
                playlist.songs.push(song);
                set_json(self.settings.as_ref(), PLAYLISTS_KEY, &*guard).await?;
                true
            }
        };

        if changed {
            self.emit_updated(id);
        }
        Ok(())
    }

    /// Remove a song by id. Removing an absent song is a no-op.
    pub async fn remove_song(&self, id: &PlaylistId, song_id: &SongId) -> Result<()> {
        let changed = {
            let mut guard = self.playlists.lock().await;
            let playlist = guard
                .iter_mut()
                .find(|p| &p.id == id)
                .ok_or_else(|| LibraryError::NotFound {
                    entity: "Playlist",
                    id: id.to_string(),
                })?;

            match playlist.songs.iter().position(|s| &s.id == song_id) {
                Some(idx) => {
                    playlist.songs.remove(idx);
                    set_json(self.settings.as_ref(), PLAYLISTS_KEY, &*guard).await?;
                    true
                }
                None => false,
            }
        };

        if changed {
            self.emit_updated(id);
        }
        Ok(())
    }

    fn emit_updated(&self, id: &PlaylistId) {
        self.event_bus
            .emit(CoreEvent::Library(LibraryEvent::PlaylistUpdated {
                playlist_id: id.to_string(),
            }))
            .ok();
    }
}
