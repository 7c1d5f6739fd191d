//! # Core Library
//!
//! The canonical on-device music catalog: domain models, the durable
//! catalog and playlist stores, and the derived library index.
//!
//! The catalog is an Artist → Album → Song tree with no cross-links; empty
//! interior nodes are pruned on every deletion. Playlists hold song copies
//! and live independently of the tree. Both stores follow the same pattern:
//! mutate in memory behind one lock, persist the whole collection to the
//! settings store on every change.

pub mod catalog;
pub mod error;
pub mod index;
pub mod models;
pub mod playlists;

pub use catalog::CatalogStore;
pub use error::{LibraryError, Result};
pub use index::LibraryIndex;
pub use models::{Album, AlbumId, Artist, ArtistId, Playlist, PlaylistId, Song, SongId};
pub use playlists::PlaylistStore;
