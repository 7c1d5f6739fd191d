//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host device.
//!
//! ## Overview
//!
//! This crate defines the contract between the media core and the platform
//! services it consumes. Each trait represents a capability the core requires
//! but that must be implemented differently per host (wearable firmware,
//! desktop shell, simulator).
//!
//! ## Traits
//!
//! ### Storage
//! - [`SettingsStore`](storage::SettingsStore) - Durable key-value preferences
//!   and JSON blob storage, survives process restarts
//! - [`MediaFileStore`](storage::MediaFileStore) - Binary blobs addressed by
//!   relative path (the on-device song library)
//!
//! ### Networking
//! - [`HttpClient`](http::HttpClient) - One-shot async HTTP requests
//! - [`BackgroundTransferClient`](http::BackgroundTransferClient) - OS-managed
//!   downloads that outlive the requesting component, reporting completions
//!   through a [`TransferUpdate`](http::TransferUpdate) event stream
//!
//! ### Playback
//! - [`AudioEngine`](audio::AudioEngine) - Host audio engine controlling the
//!   single active stream
//!
//! ## Fail-Fast Strategy
//!
//! The core should fail fast with descriptive errors when a required
//! capability is missing:
//!
//! ```ignore
//! let settings = config.settings
//!     .ok_or_else(|| Error::CapabilityMissing {
//!         capability: "SettingsStore".to_string(),
//!         message: "No settings store provided. \
//!                  Desktop: construct SqliteSettingsStore. \
//!                  Device: inject the firmware adapter.".to_string()
//!     })?;
//! ```
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds to support safe concurrent
//! usage across async tasks. Implementations must ensure thread safety.

pub mod audio;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod storage;

pub use error::BridgeError;

// Re-export commonly used types
pub use audio::{AudioEngine, TrackFinishedStream};
pub use http::{BackgroundTransferClient, HttpClient, HttpResponse, TransferUpdate, TransferUpdateStream};
pub use lifecycle::LifecyclePhase;
pub use storage::{MediaFileStore, MemoryFileStore, MemorySettingsStore, SettingsStore};
