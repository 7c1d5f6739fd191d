//! # Core Sync
//!
//! The library synchronization engine: fetches the remote catalog manifest,
//! replaces the on-device catalog, fans out one OS-managed background
//! download per song, and reconstructs in-flight progress after a process
//! restart by reconciling the persisted download session against what
//! actually exists on disk.
//!
//! No in-memory state here is load-bearing for correctness — only for UI
//! responsiveness. Durability comes from the persisted
//! [`DownloadSession`](session::DownloadSession) record plus the media file
//! store itself.

pub mod engine;
pub mod error;
pub mod manifest;
pub mod session;

pub use engine::{DownloadProgress, SyncEngine};
pub use error::{Result, SyncError};
pub use manifest::{ManifestAlbum, ManifestSong};
pub use session::DownloadSession;
