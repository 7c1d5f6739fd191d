//! Audio Engine Abstraction
//!
//! The host audio engine controlling the single active stream. Wearable
//! hosts expose one implicit playback session, so the trait carries no
//! session identifiers; loading a new source replaces the previous one.

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

use crate::error::Result;

/// Stream of natural end-of-track events
#[async_trait]
pub trait TrackFinishedStream: Send {
    /// Wait for the next track to finish playing naturally.
    ///
    /// Returns `None` when the stream is closed.
    async fn next(&mut self) -> Option<()>;
}

/// Host audio engine trait
///
/// Implementations own the platform audio session. `unload` must release
/// that session resource so the device can power down its audio route.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::audio::AudioEngine;
///
/// async fn start(engine: &dyn AudioEngine, path: &std::path::Path) -> Result<()> {
///     engine.load(path).await?;
///     engine.play().await
/// }
/// ```
#[async_trait]
pub trait AudioEngine: Send + Sync {
    /// Open the audio resource at `path`, replacing any loaded source.
    ///
    /// # Errors
    ///
    /// Fails if the file is missing or cannot be decoded.
    async fn load(&self, path: &Path) -> Result<()>;

    /// Begin or resume playback of the loaded source
    async fn play(&self) -> Result<()>;

    /// Pause playback, keeping the source loaded
    async fn pause(&self) -> Result<()>;

    /// Seek to an absolute position within the loaded source
    async fn seek(&self, position: Duration) -> Result<()>;

    /// Adjust volume. Callers clamp to `0.0..=1.0` before calling.
    async fn set_volume(&self, volume: f32) -> Result<()>;

    /// Current playback position
    async fn position(&self) -> Result<Duration>;

    /// Total duration of the loaded source, when known
    async fn duration(&self) -> Result<Option<Duration>>;

    /// Stop playback and release the underlying audio session resource
    async fn unload(&self) -> Result<()>;

    /// Subscribe to natural end-of-track events
    async fn subscribe_finished(&self) -> Result<Box<dyn TrackFinishedStream>>;
}
