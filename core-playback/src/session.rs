//! # Playback Session
//!
//! State machine driving the host audio engine. Three states: `Idle` (no
//! song loaded), `Paused` and `Playing`, with a loaded queue in the latter
//! two.
//!
//! ## Inactivity policy
//!
//! While a song sits paused, one of two timers races toward a full
//! teardown: 120 s in the foreground, 60 s once the host backgrounds the
//! app. Only one timer is ever armed; every transition that invalidates it
//! cancels its token before arming a successor — a stale timer firing after
//! the user resumed playback is a correctness bug, prevented by
//! cancellation rather than by the callback inspecting state it no longer
//! owns. A foreground/background switch while paused restarts the new
//! phase's timer from its full duration.
//!
//! ## Progress sampling
//!
//! While playing, a ~100 ms interval task samples `position / duration` and
//! publishes it for the UI; pausing cancels the sampler immediately.
//!
//! All state mutation is serialized behind a single async lock: one logical
//! owner, no two transitions racing.

use crate::queue::{PlayQueue, RepeatMode};
use bridge_traits::audio::AudioEngine;
use bridge_traits::lifecycle::LifecyclePhase;
use bridge_traits::storage::{MediaFileStore, SettingsStore};
use core_library::Song;
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Settings key for the persisted volume preference.
pub const VOLUME_KEY: &str = "player.volume";

/// Paused-with-song timeout while the app is foregrounded.
pub const FOREGROUND_IDLE_TIMEOUT: Duration = Duration::from_secs(120);
/// Paused-with-song timeout once the app is backgrounded.
pub const BACKGROUND_IDLE_TIMEOUT: Duration = Duration::from_secs(60);
/// `previous()` restarts the current track past this elapsed time.
pub const PREVIOUS_RESTART_THRESHOLD: Duration = Duration::from_secs(3);
/// Cadence of progress samples while playing.
pub const PROGRESS_SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

/// Playback lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Paused,
    Playing,
}

struct State {
    queue: Option<PlayQueue>,
    playback: PlaybackState,
    /// False when the current song's file could not be opened; the session
    /// then ignores play requests until a valid song is loaded.
    engine_loaded: bool,
    repeat_mode: RepeatMode,
    phase: LifecyclePhase,
    volume: f32,
    progress: f32,
    idle_timer: Option<CancellationToken>,
    sampler: Option<CancellationToken>,
}

struct Inner {
    engine: Arc<dyn AudioEngine>,
    files: Arc<dyn MediaFileStore>,
    settings: Arc<dyn SettingsStore>,
    event_bus: Arc<EventBus>,
    state: Mutex<State>,
}

/// Handle to the playback session. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct PlaybackSession {
    inner: Arc<Inner>,
}

impl PlaybackSession {
    /// Construct the session, restoring the persisted volume preference.
    pub async fn new(
        engine: Arc<dyn AudioEngine>,
        files: Arc<dyn MediaFileStore>,
        settings: Arc<dyn SettingsStore>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        let volume = match settings.get_f64(VOLUME_KEY).await {
            Ok(Some(v)) => (v as f32).clamp(0.0, 1.0),
            Ok(None) => 1.0,
            Err(e) => {
                warn!(error = %e, "Failed to restore volume preference");
                1.0
            }
        };

        Self {
            inner: Arc::new(Inner {
                engine,
                files,
                settings,
                event_bus,
                state: Mutex::new(State {
                    queue: None,
                    playback: PlaybackState::Idle,
                    engine_loaded: false,
                    repeat_mode: RepeatMode::default(),
                    phase: LifecyclePhase::Foreground,
                    volume,
                    progress: 0.0,
                    idle_timer: None,
                    sampler: None,
                }),
            }),
        }
    }

    pub async fn state(&self) -> PlaybackState {
        self.inner.state.lock().await.playback
    }

    pub async fn current_song(&self) -> Option<Song> {
        self.inner
            .state
            .lock()
            .await
            .queue
            .as_ref()
            .map(|q| q.current().clone())
    }

    pub async fn queue_len(&self) -> usize {
        self.inner
            .state
            .lock()
            .await
            .queue
            .as_ref()
            .map_or(0, |q| q.len())
    }

    pub async fn repeat_mode(&self) -> RepeatMode {
        self.inner.state.lock().await.repeat_mode
    }

    pub async fn set_repeat_mode(&self, mode: RepeatMode) {
        self.inner.state.lock().await.repeat_mode = mode;
    }

    pub async fn volume(&self) -> f32 {
        self.inner.state.lock().await.volume
    }

    pub async fn progress(&self) -> f32 {
        self.inner.state.lock().await.progress
    }

    /// Replace the queue with a copy of `songs` and load the song at
    /// `start_index`. Silently ignores an empty list or an out-of-range
    /// index.
    pub async fn set_queue(&self, songs: Vec<Song>, start_index: usize, autoplay: bool) {
        if songs.is_empty() || start_index >= songs.len() {
            debug!(
                songs = songs.len(),
                start_index, "Ignoring queue with no playable entry"
            );
            return;
        }

        let mut state = self.inner.state.lock().await;
        state.queue = Some(PlayQueue::new(songs, start_index));
        Inner::load_current(&self.inner, &mut state).await;
        if autoplay {
            Inner::enter_playing(&self.inner, &mut state).await;
        } else {
            Inner::enter_paused(&self.inner, &mut state).await;
        }
    }

    /// Toggle Playing ↔ Paused. A no-op when idle, or while the current
    /// song has no open audio resource.
    pub async fn play_pause(&self) {
        let mut state = self.inner.state.lock().await;
        match state.playback {
            PlaybackState::Idle => {}
            PlaybackState::Playing => Inner::enter_paused(&self.inner, &mut state).await,
            PlaybackState::Paused => {
                if state.engine_loaded {
                    Inner::enter_playing(&self.inner, &mut state).await;
                } else {
                    debug!("Ignoring play: no audio resource open");
                }
            }
        }
    }

    /// Skip to the next song, wrapping at the end of the queue. Repeat mode
    /// does not apply to manual navigation.
    pub async fn next(&self) {
        let mut state = self.inner.state.lock().await;
        if let Some(queue) = state.queue.as_mut() {
            queue.advance();
        } else {
            return;
        }
        Inner::reload_at_cursor(&self.inner, &mut state).await;
    }

    /// Skip back. Past [`PREVIOUS_RESTART_THRESHOLD`] of elapsed time this
    /// restarts the current track instead of changing tracks; wrapping at
    /// index 0 goes to the last song.
    pub async fn previous(&self) {
        let mut state = self.inner.state.lock().await;
        if state.queue.is_none() {
            return;
        }

        let elapsed = if state.engine_loaded {
            self.inner.engine.position().await.unwrap_or_default()
        } else {
            Duration::ZERO
        };

        if elapsed > PREVIOUS_RESTART_THRESHOLD {
            if let Err(e) = self.inner.engine.seek(Duration::ZERO).await {
                warn!(error = %e, "Seek to start failed");
            }
            state.progress = 0.0;
            return;
        }

        if let Some(queue) = state.queue.as_mut() {
            queue.retreat();
        }
        Inner::reload_at_cursor(&self.inner, &mut state).await;
    }

    /// Clamp to `0.0..=1.0`, apply to the engine immediately, persist.
    pub async fn set_volume(&self, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        let mut state = self.inner.state.lock().await;
        state.volume = volume;
        if let Err(e) = self.inner.engine.set_volume(volume).await {
            warn!(error = %e, "Failed to apply volume");
        }
        if let Err(e) = self.inner.settings.set_f64(VOLUME_KEY, volume as f64).await {
            warn!(error = %e, "Failed to persist volume");
        }
    }

    /// Host notification that the app moved between foreground and
    /// background. While paused, the applicable timer restarts from its
    /// full duration — elapsed time does not carry across the switch.
    pub async fn set_lifecycle_phase(&self, phase: LifecyclePhase) {
        let mut state = self.inner.state.lock().await;
        if state.phase == phase {
            return;
        }
        state.phase = phase;
        if state.playback == PlaybackState::Paused && state.queue.is_some() {
            Inner::arm_idle_timer(&self.inner, &mut state);
        }
    }

    /// Consume one natural end-of-track event from the audio engine.
    ///
    /// The listener spawned by
    /// [`spawn_finished_listener`](Self::spawn_finished_listener) feeds
    /// this.
    pub async fn handle_track_finished(&self) {
        let mut state = self.inner.state.lock().await;
        let Some(queue) = state.queue.as_ref() else {
            return;
        };
        let finished = queue.current().id.to_string();
        let at_last = queue.is_last();
        self.inner
            .event_bus
            .emit(CoreEvent::Playback(PlaybackEvent::TrackCompleted {
                song_id: finished,
            }))
            .ok();

        match state.repeat_mode {
            RepeatMode::One => {
                if let Err(e) = self.inner.engine.seek(Duration::ZERO).await {
                    warn!(error = %e, "Restart seek failed");
                }
                if let Err(e) = self.inner.engine.play().await {
                    warn!(error = %e, "Restart play failed");
                }
                state.progress = 0.0;
            }
            RepeatMode::None if at_last => {
                if let Err(e) = self.inner.engine.seek(Duration::ZERO).await {
                    warn!(error = %e, "Rewind seek failed");
                }
                state.progress = 0.0;
                Inner::enter_paused(&self.inner, &mut state).await;
            }
            RepeatMode::All | RepeatMode::None => {
                if let Some(queue) = state.queue.as_mut() {
                    queue.advance();
                }
                Inner::load_current(&self.inner, &mut state).await;
                Inner::enter_playing(&self.inner, &mut state).await;
            }
        }
    }

    /// Spawn the background task draining the engine's finished events.
    pub fn spawn_finished_listener(&self) -> tokio::task::JoinHandle<()> {
        let session = self.clone();
        tokio::spawn(async move {
            match session.inner.engine.subscribe_finished().await {
                Ok(mut stream) => {
                    while stream.next().await.is_some() {
                        session.handle_track_finished().await;
                    }
                }
                Err(e) => warn!(error = %e, "Failed to subscribe to finished events"),
            }
        })
    }

    /// Tear playback down completely: stop, clear song and queue, release
    /// the audio session resource.
    pub async fn stop(&self) {
        let mut state = self.inner.state.lock().await;
        Inner::teardown(&self.inner, &mut state).await;
    }
}

impl Inner {
    /// Open the audio resource for the song at the queue cursor. A missing
    /// or corrupt file degrades to a loaded-song-without-engine session.
    async fn load_current(inner: &Arc<Inner>, state: &mut State) {
        let Some(queue) = state.queue.as_ref() else {
            return;
        };
        let song = queue.current().clone();
        let path = inner.files.resolve(&song.relative_path);

        state.progress = 0.0;
        match inner.engine.load(&path).await {
            Ok(()) => {
                state.engine_loaded = true;
                if let Err(e) = inner.engine.set_volume(state.volume).await {
                    warn!(error = %e, "Failed to apply volume after load");
                }
            }
            Err(e) => {
                warn!(song = %song.id, path = ?path, error = %e, "Failed to open audio resource");
                state.engine_loaded = false;
                inner
                    .event_bus
                    .emit(CoreEvent::Playback(PlaybackEvent::Error {
                        message: format!("Could not open {}: {}", song.title, e),
                    }))
                    .ok();
            }
        }
    }

    /// Load the song at the cursor and keep the previous Playing/Paused
    /// state (manual navigation does not change it).
    async fn reload_at_cursor(inner: &Arc<Inner>, state: &mut State) {
        let was_playing = state.playback == PlaybackState::Playing;
        Inner::load_current(inner, state).await;
        if was_playing {
            Inner::enter_playing(inner, state).await;
        } else {
            Inner::enter_paused(inner, state).await;
        }
    }

    async fn enter_playing(inner: &Arc<Inner>, state: &mut State) {
        if !state.engine_loaded {
            // Soft-failure mode: stay paused until a valid song is loaded.
            Inner::enter_paused(inner, state).await;
            return;
        }

        Inner::cancel_idle_timer(state);
        if let Err(e) = inner.engine.play().await {
            warn!(error = %e, "Engine play failed");
        }
        state.playback = PlaybackState::Playing;
        Inner::start_sampler(inner, state);

        if let Some(queue) = state.queue.as_ref() {
            inner
                .event_bus
                .emit(CoreEvent::Playback(PlaybackEvent::Started {
                    song_id: queue.current().id.to_string(),
                }))
                .ok();
        }
    }

    async fn enter_paused(inner: &Arc<Inner>, state: &mut State) {
        Inner::cancel_sampler(state);
        if state.engine_loaded && state.playback == PlaybackState::Playing {
            if let Err(e) = inner.engine.pause().await {
                warn!(error = %e, "Engine pause failed");
            }
        }
        state.playback = PlaybackState::Paused;
        Inner::arm_idle_timer(inner, state);
        inner
            .event_bus
            .emit(CoreEvent::Playback(PlaybackEvent::Paused))
            .ok();
    }

    async fn teardown(inner: &Arc<Inner>, state: &mut State) {
        Inner::cancel_idle_timer(state);
        Inner::cancel_sampler(state);
        if state.engine_loaded {
            if let Err(e) = inner.engine.unload().await {
                warn!(error = %e, "Failed to release audio session");
            }
        }
        state.queue = None;
        state.playback = PlaybackState::Idle;
        state.engine_loaded = false;
        state.progress = 0.0;
        inner
            .event_bus
            .emit(CoreEvent::Playback(PlaybackEvent::Stopped))
            .ok();
    }

    fn cancel_idle_timer(state: &mut State) {
        if let Some(token) = state.idle_timer.take() {
            token.cancel();
        }
    }

    fn cancel_sampler(state: &mut State) {
        if let Some(token) = state.sampler.take() {
            token.cancel();
        }
    }

    /// Arm the inactivity watchdog for the current lifecycle phase,
    /// cancelling any predecessor first so exactly one timer is live.
    fn arm_idle_timer(inner: &Arc<Inner>, state: &mut State) {
        Inner::cancel_idle_timer(state);

        let timeout = if state.phase.is_background() {
            BACKGROUND_IDLE_TIMEOUT
        } else {
            FOREGROUND_IDLE_TIMEOUT
        };
        let token = CancellationToken::new();
        state.idle_timer = Some(token.clone());

        let inner = Arc::clone(inner);
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(timeout) => {
                    Inner::idle_timeout(&inner, token).await;
                }
            }
        });
    }

    async fn idle_timeout(inner: &Arc<Inner>, token: CancellationToken) {
        let mut state = inner.state.lock().await;
        // A transition may have cancelled this timer while the firing task
        // was waiting for the state lock.
        if token.is_cancelled() {
            return;
        }
        info!("Inactivity timeout: tearing down playback");
        state.idle_timer = None;
        Inner::teardown(inner, &mut state).await;
    }

    /// Start the ~100 ms progress sampler, cancelling any predecessor.
    fn start_sampler(inner: &Arc<Inner>, state: &mut State) {
        Inner::cancel_sampler(state);

        let token = CancellationToken::new();
        state.sampler = Some(token.clone());

        let inner = Arc::clone(inner);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(PROGRESS_SAMPLE_INTERVAL);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => Inner::sample_progress(&inner).await,
                }
            }
        });
    }

    async fn sample_progress(inner: &Arc<Inner>) {
        let position = inner.engine.position().await.unwrap_or_default();
        let duration = inner.engine.duration().await.ok().flatten();

        let progress = match duration {
            Some(total) if !total.is_zero() => {
                (position.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0) as f32
            }
            _ => 0.0,
        };

        let mut state = inner.state.lock().await;
        if state.playback != PlaybackState::Playing {
            return;
        }
        state.progress = progress;
        inner
            .event_bus
            .emit(CoreEvent::Playback(PlaybackEvent::PositionChanged {
                progress,
            }))
            .ok();
    }
}
