//! Catalog store: the canonical Artist → Album → Song tree.
//!
//! All mutation happens behind one async lock, and every mutation persists
//! the whole tree to the settings store before returning — there is no
//! delta persistence. Deleting the last song of an album prunes the album;
//! deleting the last album of an artist prunes the artist; the tree never
//! holds empty interior nodes. Removing a song also removes its file from
//! the media store (soft failure: logged, never propagated).

use crate::error::Result;
use crate::models::{AlbumId, Artist, ArtistId, Song, SongId};
use bridge_traits::storage::{get_json, set_json, MediaFileStore, SettingsStore};
use core_runtime::events::{CoreEvent, EventBus, LibraryEvent};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Settings key holding the JSON-encoded artist tree.
pub const CATALOG_KEY: &str = "library.catalog";

/// Durable owner of the catalog tree.
pub struct CatalogStore {
    settings: Arc<dyn SettingsStore>,
    files: Arc<dyn MediaFileStore>,
    event_bus: Arc<EventBus>,
    artists: Mutex<Vec<Artist>>,
}

impl CatalogStore {
    pub fn new(
        settings: Arc<dyn SettingsStore>,
        files: Arc<dyn MediaFileStore>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            settings,
            files,
            event_bus,
            artists: Mutex::new(Vec::new()),
        }
    }

    /// Restore the tree from the settings store. An absent key is an empty
    /// library, not an error.
    pub async fn load(&self) -> Result<()> {
        let stored: Option<Vec<Artist>> = get_json(self.settings.as_ref(), CATALOG_KEY).await?;
        let artists = stored.unwrap_or_default();
        info!(artists = artists.len(), "Loaded catalog");
        *self.artists.lock().await = artists;
        Ok(())
    }

    /// Cloned snapshot of the whole tree.
    pub async fn artists(&self) -> Vec<Artist> {
        self.artists.lock().await.clone()
    }

    /// All songs in tree order.
    pub async fn songs(&self) -> Vec<Song> {
        self.artists
            .lock()
            .await
            .iter()
            .flat_map(|artist| artist.songs().cloned())
            .collect()
    }

    /// Replace the whole tree (sync materialization) and persist.
    pub async fn replace(&self, artists: Vec<Artist>) -> Result<()> {
        let count = artists.len() as u64;
        {
            let mut guard = self.artists.lock().await;
            set_json(self.settings.as_ref(), CATALOG_KEY, &artists).await?;
            *guard = artists;
        }
        self.event_bus
            .emit(CoreEvent::Library(LibraryEvent::CatalogReplaced {
                artists: count,
            }))
            .ok();
        Ok(())
    }

    /// Empty the tree, persist, and wipe every file from the media store.
    ///
    /// Used by the sync reset phase and by explicit library deletion, so no
    /// stale song can be served afterwards.
    pub async fn clear(&self) -> Result<()> {
        {
            let mut guard = self.artists.lock().await;
            set_json(self.settings.as_ref(), CATALOG_KEY, &Vec::<Artist>::new()).await?;
            guard.clear();
        }
        if let Err(e) = self.files.clear_all().await {
            warn!(error = %e, "Failed to clear media store");
        }
        self.event_bus
            .emit(CoreEvent::Library(LibraryEvent::CatalogReplaced {
                artists: 0,
            }))
            .ok();
        Ok(())
    }

    /// Delete a song, pruning its album and artist if they become empty.
    ///
    /// Returns `Ok(false)` when no song with this id exists.
    pub async fn delete_song(&self, song_id: &SongId) -> Result<bool> {
        let removed = {
            let mut guard = self.artists.lock().await;
            let removed = remove_song(&mut guard, song_id);
            if removed.is_some() {
                set_json(self.settings.as_ref(), CATALOG_KEY, &*guard).await?;
            }
            removed
        };

        match removed {
            Some(song) => {
                self.delete_file(&song).await;
                self.event_bus
                    .emit(CoreEvent::Library(LibraryEvent::SongDeleted {
                        song_id: song_id.to_string(),
                    }))
                    .ok();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Delete an album and every song in it, pruning the artist if empty.
    pub async fn delete_album(&self, album_id: &AlbumId) -> Result<bool> {
        let removed_songs = {
            let mut guard = self.artists.lock().await;
            let removed = remove_album(&mut guard, album_id);
            if removed.is_some() {
                set_json(self.settings.as_ref(), CATALOG_KEY, &*guard).await?;
            }
            removed
        };

        match removed_songs {
            Some(songs) => {
                for song in &songs {
                    self.delete_file(song).await;
                }
                self.event_bus
                    .emit(CoreEvent::Library(LibraryEvent::AlbumDeleted {
                        album_id: album_id.to_string(),
                    }))
                    .ok();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Delete an artist and everything under them.
    pub async fn delete_artist(&self, artist_id: &ArtistId) -> Result<bool> {
        let removed_songs = {
            let mut guard = self.artists.lock().await;
            let position = guard.iter().position(|a| &a.id == artist_id);
            match position {
                Some(idx) => {
                    let artist = guard.remove(idx);
                    set_json(self.settings.as_ref(), CATALOG_KEY, &*guard).await?;
                    Some(artist.songs().cloned().collect::<Vec<_>>())
                }
                None => None,
            }
        };

        match removed_songs {
            Some(songs) => {
                for song in &songs {
                    self.delete_file(song).await;
                }
                self.event_bus
                    .emit(CoreEvent::Library(LibraryEvent::ArtistDeleted {
                        artist_id: artist_id.to_string(),
                    }))
                    .ok();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_file(&self, song: &Song) {
        if let Err(e) = self.files.delete(&song.relative_path).await {
            warn!(path = %song.relative_path, error = %e, "Failed to delete song file");
        } else {
            debug!(path = %song.relative_path, "Deleted song file");
        }
    }
}

fn remove_song(artists: &mut Vec<Artist>, song_id: &SongId) -> Option<Song> {
    for artist_idx in 0..artists.len() {
        for album_idx in 0..artists[artist_idx].albums.len() {
            let album = &mut artists[artist_idx].albums[album_idx];
            if let Some(song_idx) = album.songs.iter().position(|s| &s.id == song_id) {
                let song = album.songs.remove(song_idx);
                if album.is_empty() {
                    artists[artist_idx].albums.remove(album_idx);
                }
                if artists[artist_idx].is_empty() {
                    artists.remove(artist_idx);
                }
                return Some(song);
            }
        }
    }
    None
}

fn remove_album(artists: &mut Vec<Artist>, album_id: &AlbumId) -> Option<Vec<Song>> {
    for artist_idx in 0..artists.len() {
        let artist = &mut artists[artist_idx];
        if let Some(album_idx) = artist.albums.iter().position(|a| &a.id == album_id) {
            let album = artist.albums.remove(album_idx);
            if artist.is_empty() {
                artists.remove(artist_idx);
            }
            return Some(album.songs);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Album;
    use bridge_traits::storage::{MemoryFileStore, MemorySettingsStore};
    use bytes::Bytes;

    fn song(id: &str, title: &str) -> Song {
        Song {
            id: SongId::new(id),
            title: title.to_string(),
            artist: "Artist".to_string(),
            album: "Album".to_string(),
            relative_path: format!("Artist/Album/{}.mp3", id),
        }
    }

    #[tokio::test]
    async fn cascade_deletes_empty_album_and_artist() {
        let settings = Arc::new(MemorySettingsStore::new());
        let files = Arc::new(MemoryFileStore::new());
        let catalog = CatalogStore::new(
            settings.clone(),
            files.clone(),
            Arc::new(EventBus::default()),
        );

        let only = song("s1", "Only Song");
        files
            .write(&only.relative_path, Bytes::from_static(b"x"))
            .await
            .unwrap();
        catalog
            .replace(vec![Artist::new(
                "Solo",
                vec![Album::new("Single", vec![only.clone()])],
            )])
            .await
            .unwrap();

        assert!(catalog.delete_song(&only.id).await.unwrap());

        // Song, album and artist are all gone, and so is the file.
        assert!(catalog.artists().await.is_empty());
        assert!(!files.exists(&only.relative_path).await.unwrap());
    }

    #[tokio::test]
    async fn deleting_one_of_two_songs_keeps_the_album() {
        let catalog = CatalogStore::new(
            Arc::new(MemorySettingsStore::new()),
            Arc::new(MemoryFileStore::new()),
            Arc::new(EventBus::default()),
        );

        let a = song("s1", "A");
        let b = song("s2", "B");
        catalog
            .replace(vec![Artist::new(
                "Duo",
                vec![Album::new("Pair", vec![a.clone(), b.clone()])],
            )])
            .await
            .unwrap();

        assert!(catalog.delete_song(&a.id).await.unwrap());

        let artists = catalog.artists().await;
        assert_eq!(artists.len(), 1);
        assert_eq!(artists[0].albums.len(), 1);
        assert_eq!(artists[0].albums[0].songs, vec![b]);
    }

    #[tokio::test]
    async fn delete_absent_song_is_reported() {
        let catalog = CatalogStore::new(
            Arc::new(MemorySettingsStore::new()),
            Arc::new(MemoryFileStore::new()),
            Arc::new(EventBus::default()),
        );
        assert!(!catalog.delete_song(&SongId::new("ghost")).await.unwrap());
    }

    #[tokio::test]
    async fn delete_album_prunes_artist_and_files() {
        let settings = Arc::new(MemorySettingsStore::new());
        let files = Arc::new(MemoryFileStore::new());
        let catalog =
            CatalogStore::new(settings, files.clone(), Arc::new(EventBus::default()));

        let a = song("s1", "A");
        let b = song("s2", "B");
        for s in [&a, &b] {
            files
                .write(&s.relative_path, Bytes::from_static(b"x"))
                .await
                .unwrap();
        }
        let album = Album::new("Pair", vec![a.clone(), b.clone()]);
        let album_id = album.id;
        catalog
            .replace(vec![Artist::new("Duo", vec![album])])
            .await
            .unwrap();

        assert!(catalog.delete_album(&album_id).await.unwrap());
        assert!(catalog.artists().await.is_empty());
        assert!(files.is_empty().await);
    }

    #[tokio::test]
    async fn persisted_tree_survives_reload() {
        let settings = Arc::new(MemorySettingsStore::new());
        let files = Arc::new(MemoryFileStore::new());
        let catalog = CatalogStore::new(
            settings.clone(),
            files.clone(),
            Arc::new(EventBus::default()),
        );

        catalog
            .replace(vec![Artist::new(
                "Muse",
                vec![Album::new("Absolution", vec![song("s1", "Hysteria")])],
            )])
            .await
            .unwrap();
        let before = catalog.artists().await;

        // A second store over the same settings sees the same tree.
        let reloaded = CatalogStore::new(settings, files, Arc::new(EventBus::default()));
        reloaded.load().await.unwrap();
        assert_eq!(reloaded.artists().await, before);
    }

    #[tokio::test]
    async fn clear_wipes_tree_and_files() {
        let settings = Arc::new(MemorySettingsStore::new());
        let files = Arc::new(MemoryFileStore::new());
        let catalog = CatalogStore::new(
            settings.clone(),
            files.clone(),
            Arc::new(EventBus::default()),
        );

        let s = song("s1", "A");
        files
            .write(&s.relative_path, Bytes::from_static(b"x"))
            .await
            .unwrap();
        catalog
            .replace(vec![Artist::new(
                "Solo",
                vec![Album::new("Single", vec![s])],
            )])
            .await
            .unwrap();

        catalog.clear().await.unwrap();
        assert!(catalog.artists().await.is_empty());
        assert!(files.is_empty().await);

        let reloaded = CatalogStore::new(settings, files, Arc::new(EventBus::default()));
        reloaded.load().await.unwrap();
        assert!(reloaded.artists().await.is_empty());
    }
}
