//! Library index: a derived, read-only view over the catalog tree.
//!
//! Built wholesale from a catalog snapshot and replaced, never mutated.
//! Answers "which artist/album owns song X" without walking the tree.

use crate::models::{Album, AlbumId, Artist, ArtistId, Song, SongId};
use std::collections::HashMap;

/// Read-only lookup structure over one catalog snapshot.
pub struct LibraryIndex {
    artists: Vec<Artist>,
    /// song id → (artist position, album position within artist)
    song_locations: HashMap<SongId, (usize, usize)>,
    album_locations: HashMap<AlbumId, (usize, usize)>,
    artist_positions: HashMap<ArtistId, usize>,
}

impl LibraryIndex {
    /// Build an index from a catalog snapshot.
    pub fn build(artists: Vec<Artist>) -> Self {
        let mut song_locations = HashMap::new();
        let mut album_locations = HashMap::new();
        let mut artist_positions = HashMap::new();

        for (artist_idx, artist) in artists.iter().enumerate() {
            artist_positions.insert(artist.id, artist_idx);
            for (album_idx, album) in artist.albums.iter().enumerate() {
                album_locations.insert(album.id, (artist_idx, album_idx));
                for song in &album.songs {
                    song_locations.insert(song.id.clone(), (artist_idx, album_idx));
                }
            }
        }

        Self {
            artists,
            song_locations,
            album_locations,
            artist_positions,
        }
    }

    /// The tree this index was built from, in tree order.
    pub fn artists(&self) -> &[Artist] {
        &self.artists
    }

    /// Look up a song by id.
    pub fn song(&self, song_id: &SongId) -> Option<&Song> {
        let &(artist_idx, album_idx) = self.song_locations.get(song_id)?;
        self.artists[artist_idx].albums[album_idx]
            .songs
            .iter()
            .find(|s| &s.id == song_id)
    }

    /// The artist owning a song.
    pub fn artist_of(&self, song_id: &SongId) -> Option<&Artist> {
        let &(artist_idx, _) = self.song_locations.get(song_id)?;
        Some(&self.artists[artist_idx])
    }

    /// The album owning a song.
    pub fn album_of(&self, song_id: &SongId) -> Option<&Album> {
        let &(artist_idx, album_idx) = self.song_locations.get(song_id)?;
        Some(&self.artists[artist_idx].albums[album_idx])
    }

    /// Look up an album by id.
    pub fn album(&self, album_id: &AlbumId) -> Option<&Album> {
        let &(artist_idx, album_idx) = self.album_locations.get(album_id)?;
        Some(&self.artists[artist_idx].albums[album_idx])
    }

    /// Look up an artist by id.
    pub fn artist(&self, artist_id: &ArtistId) -> Option<&Artist> {
        let &idx = self.artist_positions.get(artist_id)?;
        Some(&self.artists[idx])
    }

    /// Total number of songs.
    pub fn song_count(&self) -> usize {
        self.song_locations.len()
    }
}
