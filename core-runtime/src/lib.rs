//! # Core Runtime
//!
//! Ambient infrastructure shared by the media core modules:
//! - [`events`] - typed event bus the out-of-process UI observes
//! - [`logging`] - tracing subscriber configuration
//! - [`config`] - capability wiring with fail-fast validation
//! - [`error`] - runtime-level error type

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::CoreConfig;
pub use error::{Error, Result};
pub use events::{CoreEvent, EventBus, LibraryEvent, PlaybackEvent, SyncEvent};
