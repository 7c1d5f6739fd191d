//! # Core Configuration
//!
//! Builder for the capability set the media core needs from its host. The
//! core never reaches for ambient globals; everything it touches is injected
//! here once at process start and handed to the service constructors.
//!
//! ## Required capabilities
//!
//! - `SettingsStore` - durable key-value storage (catalog, playlists,
//!   download-session record, preferences)
//! - `MediaFileStore` - on-device song files
//! - `HttpClient` - manifest fetches
//! - `BackgroundTransferClient` - song downloads that survive suspension
//! - `AudioEngine` - the host's playback engine
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .settings(Arc::new(settings))
//!     .media_files(Arc::new(files))
//!     .http_client(Arc::new(http))
//!     .transfers(Arc::new(transfers))
//!     .audio_engine(Arc::new(engine))
//!     .build()?;
//! ```
//!
//! `build` fails fast with an actionable [`Error::CapabilityMissing`] when a
//! required bridge was not provided.

use crate::error::{Error, Result};
use crate::events::EventBus;
use bridge_traits::{
    audio::AudioEngine,
    http::{BackgroundTransferClient, HttpClient},
    storage::{MediaFileStore, SettingsStore},
};
use std::sync::Arc;

/// Validated capability set for the media core.
#[derive(Clone)]
pub struct CoreConfig {
    pub settings: Arc<dyn SettingsStore>,
    pub media_files: Arc<dyn MediaFileStore>,
    pub http_client: Arc<dyn HttpClient>,
    pub transfers: Arc<dyn BackgroundTransferClient>,
    pub audio_engine: Arc<dyn AudioEngine>,
    pub event_bus: Arc<EventBus>,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("settings", &"SettingsStore { ... }")
            .field("media_files", &"MediaFileStore { ... }")
            .field("http_client", &"HttpClient { ... }")
            .field("transfers", &"BackgroundTransferClient { ... }")
            .field("audio_engine", &"AudioEngine { ... }")
            .field("event_bus", &self.event_bus)
            .finish()
    }
}

impl CoreConfig {
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }
}

/// Builder for [`CoreConfig`].
#[derive(Default)]
pub struct CoreConfigBuilder {
    settings: Option<Arc<dyn SettingsStore>>,
    media_files: Option<Arc<dyn MediaFileStore>>,
    http_client: Option<Arc<dyn HttpClient>>,
    transfers: Option<Arc<dyn BackgroundTransferClient>>,
    audio_engine: Option<Arc<dyn AudioEngine>>,
    event_bus: Option<Arc<EventBus>>,
}

impl CoreConfigBuilder {
    pub fn settings(mut self, settings: Arc<dyn SettingsStore>) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn media_files(mut self, media_files: Arc<dyn MediaFileStore>) -> Self {
        self.media_files = Some(media_files);
        self
    }

    pub fn http_client(mut self, http_client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(http_client);
        self
    }

    pub fn transfers(mut self, transfers: Arc<dyn BackgroundTransferClient>) -> Self {
        self.transfers = Some(transfers);
        self
    }

    pub fn audio_engine(mut self, audio_engine: Arc<dyn AudioEngine>) -> Self {
        self.audio_engine = Some(audio_engine);
        self
    }

    /// Provide a shared event bus; a fresh one is created when omitted.
    pub fn event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn build(self) -> Result<CoreConfig> {
        fn require<T>(value: Option<T>, capability: &str, hint: &str) -> Result<T> {
            value.ok_or_else(|| Error::CapabilityMissing {
                capability: capability.to_string(),
                message: hint.to_string(),
            })
        }

        Ok(CoreConfig {
            settings: require(
                self.settings,
                "SettingsStore",
                "No settings store provided. Desktop: construct bridge_desktop::SqliteSettingsStore. Device: inject the firmware adapter.",
            )?,
            media_files: require(
                self.media_files,
                "MediaFileStore",
                "No media file store provided. Desktop: construct bridge_desktop::LocalFileStore.",
            )?,
            http_client: require(
                self.http_client,
                "HttpClient",
                "No HTTP client provided. Desktop: construct bridge_desktop::ReqwestHttpClient.",
            )?,
            transfers: require(
                self.transfers,
                "BackgroundTransferClient",
                "No background transfer client provided. Desktop: construct bridge_desktop::TokioTransferManager.",
            )?,
            audio_engine: require(
                self.audio_engine,
                "AudioEngine",
                "No audio engine provided. Inject the host playback adapter.",
            )?,
            event_bus: self.event_bus.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_without_capabilities_names_the_first_missing_one() {
        let err = CoreConfig::builder().build().unwrap_err();
        match err {
            Error::CapabilityMissing { capability, .. } => {
                assert_eq!(capability, "SettingsStore");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
