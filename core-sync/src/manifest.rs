//! Remote manifest: wire format, URL derivation, fetch and catalog
//! materialization.
//!
//! The manifest endpoint serves a JSON array of album entries. Per-song
//! download URLs are derived from the manifest URL by stripping its last
//! path component and appending the song's percent-encoded relative path.

use crate::error::{Result, SyncError};
use bridge_traits::http::HttpClient;
use core_library::models::{Album, Artist, Song, SongId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;
use url::Url;

/// One song entry in the remote manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestSong {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub relative_path: String,
}

/// One album entry in the remote manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestAlbum {
    pub name: String,
    pub artist: String,
    pub songs: Vec<ManifestSong>,
}

/// Parse and validate the manifest address.
pub fn parse_manifest_url(address: &str) -> Result<Url> {
    Url::parse(address).map_err(|_| SyncError::InvalidUrl(address.to_string()))
}

/// The base all relative song paths resolve against: the manifest URL with
/// its last path component stripped.
pub fn base_url(manifest_url: &Url) -> Url {
    let mut base = manifest_url.clone();
    if let Ok(mut segments) = base.path_segments_mut() {
        segments.pop();
    }
    base
}

/// Build the download URL for a song: `base + "/" + encoded relative path`,
/// percent-encoding each path segment while preserving the separators.
pub fn download_url(base: &Url, relative_path: &str) -> String {
    let encoded: Vec<String> = relative_path
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();

    let mut base_str = base.as_str().trim_end_matches('/').to_string();
    base_str.push('/');
    base_str.push_str(&encoded.join("/"));
    base_str
}

/// Fetch and decode the manifest.
pub async fn fetch_manifest(
    http: &dyn HttpClient,
    manifest_url: &Url,
) -> Result<Vec<ManifestAlbum>> {
    let response = http
        .get(manifest_url.as_str())
        .await
        .map_err(|e| SyncError::RequestFailed(e.to_string()))?;

    if !response.is_success() {
        return Err(SyncError::DownloadFailed {
            status: response.status,
        });
    }

    let albums: Vec<ManifestAlbum> = serde_json::from_slice(&response.body)
        .map_err(|e| SyncError::DecodingFailed(e.to_string()))?;

    debug!(albums = albums.len(), "Decoded manifest");
    Ok(albums)
}

/// Materialize the catalog tree from manifest entries: group albums by
/// artist name, order artists and albums by name, songs by title.
pub fn materialize(entries: Vec<ManifestAlbum>) -> Vec<Artist> {
    let mut by_artist: BTreeMap<String, Vec<ManifestAlbum>> = BTreeMap::new();
    for entry in entries {
        by_artist.entry(entry.artist.clone()).or_default().push(entry);
    }

    by_artist
        .into_iter()
        .map(|(artist_name, mut albums)| {
            albums.sort_by(|a, b| a.name.cmp(&b.name));
            let albums = albums
                .into_iter()
                .map(|entry| {
                    let mut songs: Vec<Song> = entry
                        .songs
                        .into_iter()
                        .map(|s| Song {
                            id: SongId::new(s.id),
                            title: s.title,
                            artist: s.artist,
                            album: s.album,
                            relative_path: s.relative_path,
                        })
                        .collect();
                    songs.sort_by(|a, b| a.title.cmp(&b.title));
                    Album::new(entry.name, songs)
                })
                .collect();
            Artist::new(artist_name, albums)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest_song(id: &str, title: &str, artist: &str, album: &str) -> ManifestSong {
        ManifestSong {
            id: id.to_string(),
            title: title.to_string(),
            artist: artist.to_string(),
            album: album.to_string(),
            relative_path: format!("{}/{}/{}.mp3", artist, album, title),
        }
    }

    #[test]
    fn wire_field_names_are_camel_case() {
        let json = r#"[{
            "name": "Absolution",
            "artist": "Muse",
            "songs": [{
                "id": "s1",
                "title": "Hysteria",
                "artist": "Muse",
                "album": "Absolution",
                "relativePath": "Muse/Absolution/Hysteria.mp3"
            }]
        }]"#;

        let albums: Vec<ManifestAlbum> = serde_json::from_str(json).unwrap();
        assert_eq!(albums[0].songs[0].relative_path, "Muse/Absolution/Hysteria.mp3");
    }

    #[test]
    fn invalid_address_is_rejected() {
        assert!(matches!(
            parse_manifest_url("not a url"),
            Err(SyncError::InvalidUrl(_))
        ));
        assert!(parse_manifest_url("http://media.local/index.json").is_ok());
    }

    #[test]
    fn base_strips_last_path_component() {
        let manifest = Url::parse("http://media.local/library/index.json").unwrap();
        assert_eq!(base_url(&manifest).as_str(), "http://media.local/library");
    }

    #[test]
    fn download_url_percent_encodes_segments() {
        let manifest = Url::parse("http://media.local/index.json").unwrap();
        let base = base_url(&manifest);

        let url = download_url(&base, "Daft Punk/Discovery/One More Time.mp3");
        assert_eq!(
            url,
            "http://media.local/Daft%20Punk/Discovery/One%20More%20Time.mp3"
        );
    }

    #[test]
    fn materialize_groups_and_sorts() {
        let entries = vec![
            ManifestAlbum {
                name: "Showbiz".to_string(),
                artist: "Muse".to_string(),
                songs: vec![manifest_song("s2", "Muscle Museum", "Muse", "Showbiz")],
            },
            ManifestAlbum {
                name: "Absolution".to_string(),
                artist: "Muse".to_string(),
                songs: vec![
                    manifest_song("s3", "Hysteria", "Muse", "Absolution"),
                    manifest_song("s1", "Apocalypse Please", "Muse", "Absolution"),
                ],
            },
        ];

        let artists = materialize(entries);
        assert_eq!(artists.len(), 1);
        assert_eq!(artists[0].name, "Muse");
        assert_eq!(artists[0].albums.len(), 2);
        // Albums by name, songs by title
        assert_eq!(artists[0].albums[0].name, "Absolution");
        assert_eq!(artists[0].albums[0].songs[0].title, "Apocalypse Please");
        assert_eq!(artists[0].albums[1].name, "Showbiz");
    }
}
