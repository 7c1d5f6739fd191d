//! Domain models for the music library

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// =============================================================================
// ID Types
// =============================================================================

/// Unique identifier for a song.
///
/// Assigned by the remote manifest, so the inner representation is the
/// manifest's opaque string rather than a locally generated UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SongId(pub String);

impl SongId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an album
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlbumId(pub Uuid);

impl AlbumId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AlbumId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AlbumId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an artist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtistId(pub Uuid);

impl ArtistId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ArtistId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ArtistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a playlist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaylistId(pub Uuid);

impl PlaylistId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlaylistId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Domain Models
// =============================================================================

/// A single song. Immutable once created; identity is the id, and membership
/// checks everywhere compare by id, never by the full value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    /// Manifest-assigned identifier
    pub id: SongId,
    /// Display title
    pub title: String,
    /// Artist display name
    pub artist: String,
    /// Album display name
    pub album: String,
    /// Path into the media file store, mirroring the manifest layout
    pub relative_path: String,
}

impl Song {
    pub fn validate(&self) -> Result<(), String> {
        if self.id.as_str().trim().is_empty() {
            return Err("Song id cannot be empty".to_string());
        }
        if self.title.trim().is_empty() {
            return Err("Song title cannot be empty".to_string());
        }
        if self.relative_path.trim().is_empty() {
            return Err("Song relative path cannot be empty".to_string());
        }
        Ok(())
    }
}

/// An album and the songs it owns. Membership is structural: a song belongs
/// to exactly the album whose `songs` contains it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: AlbumId,
    pub name: String,
    pub songs: Vec<Song>,
}

impl Album {
    pub fn new(name: impl Into<String>, songs: Vec<Song>) -> Self {
        Self {
            id: AlbumId::new(),
            name: name.into(),
            songs,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }
}

/// An artist and their albums.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: ArtistId,
    pub name: String,
    pub albums: Vec<Album>,
}

impl Artist {
    pub fn new(name: impl Into<String>, albums: Vec<Album>) -> Self {
        Self {
            id: ArtistId::new(),
            name: name.into(),
            albums,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.albums.is_empty()
    }

    /// All songs under this artist, in tree order.
    pub fn songs(&self) -> impl Iterator<Item = &Song> {
        self.albums.iter().flat_map(|album| album.songs.iter())
    }
}

/// A user-created ordering of songs. Songs are stored by value: deleting a
/// song from the library does not reach into playlists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: PlaylistId,
    pub name: String,
    pub songs: Vec<Song>,
}

impl Playlist {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: PlaylistId::new(),
            name: name.into(),
            songs: Vec::new(),
        }
    }

    /// Whether a song with this id is already in the playlist
    pub fn contains(&self, song_id: &SongId) -> bool {
        self.songs.iter().any(|s| &s.id == song_id)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Playlist name cannot be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(id: &str, title: &str) -> Song {
        Song {
            id: SongId::new(id),
            title: title.to_string(),
            artist: "Artist".to_string(),
            album: "Album".to_string(),
            relative_path: format!("Artist/Album/{}.mp3", title),
        }
    }

    #[test]
    fn song_validation() {
        assert!(song("s1", "Track").validate().is_ok());

        let mut bad = song("s1", "Track");
        bad.title = "  ".to_string();
        assert!(bad.validate().is_err());

        let mut bad = song("s1", "Track");
        bad.relative_path = String::new();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn playlist_membership_is_by_id() {
        let mut playlist = Playlist::new("Mix");
        playlist.songs.push(song("s1", "One"));

        // Same id, different title: still a member.
        assert!(playlist.contains(&SongId::new("s1")));
        assert!(!playlist.contains(&SongId::new("s2")));
    }

    #[test]
    fn catalog_serde_round_trip() {
        let artist = Artist::new(
            "Muse",
            vec![
                Album::new("Absolution", vec![song("s1", "Hysteria")]),
                Album::new("Showbiz", vec![song("s2", "Muscle Museum")]),
            ],
        );

        let json = serde_json::to_string(&vec![artist.clone()]).unwrap();
        let decoded: Vec<Artist> = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, vec![artist]);
    }

    #[test]
    fn prune_predicates() {
        let empty_album = Album::new("Empty", Vec::new());
        assert!(empty_album.is_empty());

        let artist = Artist::new("Nobody", Vec::new());
        assert!(artist.is_empty());
    }
}
