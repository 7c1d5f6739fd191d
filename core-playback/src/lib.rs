//! # Core Playback
//!
//! The playback session: owns the current queue, drives the host audio
//! engine, and enforces the inactivity policy that tears playback down to
//! let the device power-save.
//!
//! Every failure in here is soft by design — a missing or corrupt song file
//! degrades to a loaded-but-silent session that ignores play requests, it
//! never propagates an error to the caller.

pub mod queue;
pub mod session;

pub use queue::{PlayQueue, RepeatMode};
pub use session::{PlaybackSession, PlaybackState};
