//! The playback coordinator: single authority for "what audio is playing
//! anywhere in the app".
//!
//! UI components hold a cloneable [`PlayerHandle`] whose methods are
//! fire-and-forget: they enqueue a [`PlayerCommand`] and return immediately.
//! A single coordinator task owns all session state and processes commands,
//! backend events and the status-poll tick in one `select!` loop, so no
//! locking is needed around the session.
//!
//! State machine, per session: Idle -> Loading -> Ready(paused|playing) ->
//! Ended. "Loading" is a session whose backend handle has not arrived yet
//! (`handle: None`, `buffering: true`); "Ended" resets position to zero and
//! stops. Every session carries a monotonically increasing id; resource
//! acquisition runs in a spawned task and its outcome, like every backend
//! event, is stamped with that id. Outcomes and events for a session that has
//! since been replaced are discarded, and a superseded load's resource is
//! released on arrival, so stale callbacks can never overwrite newer state.

use crate::playback::backend::{AudioBackend, BackendEvent, BackendHandle};
use crate::playback::progress::{PlayerEvent, PlayerEvents};
use crate::playback::PlayerError;
use crate::quran::{surah_audio_url, ReciterId, SurahDirectory, SurahInfo, DEFAULT_BITRATE_KBPS};
use qari_common::{is_last_surah, next_surah, previous_surah, TrackMeta};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc as tokio_mpsc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Commands sent to the coordinator task
#[derive(Debug, Clone)]
pub enum PlayerCommand {
    PlayTrack(TrackMeta),
    Pause,
    Resume,
    Stop,
    SeekTo(Duration),
    SkipNext,
    SkipPrevious,
    ToggleAutoAdvance,
}

/// Read-only state observed by UI. Published on every visible mutation.
#[derive(Debug, Clone, Default)]
pub struct PlayerSnapshot {
    pub track: Option<TrackMeta>,
    pub playing: bool,
    pub buffering: bool,
    /// Zero while the duration is still unknown
    pub duration: Duration,
    pub position: Duration,
    pub last_error: Option<String>,
    pub auto_advance: bool,
}

impl PlayerSnapshot {
    pub fn is_first(&self) -> bool {
        self.track.as_ref().is_some_and(TrackMeta::is_first)
    }

    pub fn is_last(&self) -> bool {
        self.track.as_ref().is_some_and(TrackMeta::is_last)
    }

    /// Playback progress in `[0.0, 1.0]`; 0.0 while the duration is unknown,
    /// so UI never divides by zero.
    pub fn progress(&self) -> f64 {
        if self.duration.is_zero() {
            0.0
        } else {
            self.position.as_secs_f64() / self.duration.as_secs_f64()
        }
    }
}

/// Handle to the coordinator for sending commands and observing state
#[derive(Clone)]
pub struct PlayerHandle {
    command_tx: tokio_mpsc::UnboundedSender<PlayerCommand>,
    events: PlayerEvents,
    snapshot_rx: watch::Receiver<PlayerSnapshot>,
}

impl PlayerHandle {
    pub fn play_track(
        &self,
        url: impl Into<String>,
        title: impl Into<String>,
        subtitle: Option<String>,
        surah_number: Option<u16>,
    ) {
        let track = TrackMeta::new(url, title, subtitle, surah_number);
        let _ = self.command_tx.send(PlayerCommand::PlayTrack(track));
    }

    pub fn pause(&self) {
        let _ = self.command_tx.send(PlayerCommand::Pause);
    }

    pub fn resume(&self) {
        let _ = self.command_tx.send(PlayerCommand::Resume);
    }

    pub fn stop(&self) {
        let _ = self.command_tx.send(PlayerCommand::Stop);
    }

    pub fn seek_to(&self, position: Duration) {
        let _ = self.command_tx.send(PlayerCommand::SeekTo(position));
    }

    pub fn skip_next(&self) {
        let _ = self.command_tx.send(PlayerCommand::SkipNext);
    }

    pub fn skip_previous(&self) {
        let _ = self.command_tx.send(PlayerCommand::SkipPrevious);
    }

    pub fn toggle_auto_advance(&self) {
        let _ = self.command_tx.send(PlayerCommand::ToggleAutoAdvance);
    }

    /// Current state snapshot; cheap, never blocks.
    pub fn snapshot(&self) -> PlayerSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> tokio_mpsc::UnboundedReceiver<PlayerEvent> {
        self.events.subscribe()
    }
}

/// Outcome of a spawned resource acquisition
struct AcquireOutcome {
    session_id: u64,
    result: Result<Box<dyn BackendHandle>, PlayerError>,
}

/// The one live playback session. `handle: None` means the load is still in
/// flight.
struct Session {
    id: u64,
    track: TrackMeta,
    handle: Option<Box<dyn BackendHandle>>,
    /// Handle does not push updates; drive it from the status tick
    polled: bool,
    duration: Duration,
    position: Duration,
    playing: bool,
    buffering: bool,
}

/// Coordinator service that manages audio playback across the app
pub struct PlayerService {
    backend: Arc<dyn AudioBackend>,
    directory: Arc<dyn SurahDirectory>,
    reciter: ReciterId,
    poll_interval: Duration,
    command_rx: tokio_mpsc::UnboundedReceiver<PlayerCommand>,
    acquire_tx: tokio_mpsc::UnboundedSender<AcquireOutcome>,
    acquire_rx: tokio_mpsc::UnboundedReceiver<AcquireOutcome>,
    backend_tx: tokio_mpsc::UnboundedSender<BackendEvent>,
    backend_rx: tokio_mpsc::UnboundedReceiver<BackendEvent>,
    snapshot_tx: watch::Sender<PlayerSnapshot>,
    events: PlayerEvents,
    session: Option<Session>,
    next_session_id: u64,
    last_error: Option<String>,
    auto_advance: bool,
}

impl PlayerService {
    pub fn start(
        backend: Arc<dyn AudioBackend>,
        directory: Arc<dyn SurahDirectory>,
        runtime_handle: tokio::runtime::Handle,
    ) -> PlayerHandle {
        Self::start_with_poll(backend, directory, Duration::from_secs(1), runtime_handle)
    }

    /// `poll_interval` is how often polled backend handles are asked for
    /// status (1 s in production).
    pub fn start_with_poll(
        backend: Arc<dyn AudioBackend>,
        directory: Arc<dyn SurahDirectory>,
        poll_interval: Duration,
        runtime_handle: tokio::runtime::Handle,
    ) -> PlayerHandle {
        let (command_tx, command_rx) = tokio_mpsc::unbounded_channel();
        let (acquire_tx, acquire_rx) = tokio_mpsc::unbounded_channel();
        let (backend_tx, backend_rx) = tokio_mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(PlayerSnapshot::default());
        let events = PlayerEvents::new();
        let handle = PlayerHandle {
            command_tx,
            events: events.clone(),
            snapshot_rx,
        };
        let mut service = PlayerService {
            backend,
            directory,
            reciter: ReciterId::default(),
            poll_interval,
            command_rx,
            acquire_tx,
            acquire_rx,
            backend_tx,
            backend_rx,
            snapshot_tx,
            events,
            session: None,
            next_session_id: 0,
            last_error: None,
            auto_advance: false,
        };
        runtime_handle.spawn(async move {
            service.run().await;
        });
        handle
    }

    async fn run(&mut self) {
        info!("PlayerService started");
        let mut poll = tokio::time::interval(self.poll_interval);
        poll.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                command = self.command_rx.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    // All handles dropped; tear down the live resource
                    None => {
                        self.teardown_session().await;
                        break;
                    }
                },
                Some(outcome) = self.acquire_rx.recv() => {
                    self.handle_acquired(outcome).await;
                }
                Some(event) = self.backend_rx.recv() => {
                    self.handle_backend_event(event).await;
                }
                _ = poll.tick(), if self.wants_poll() => {
                    self.poll_status().await;
                }
            }
        }
        info!("PlayerService stopped");
    }

    fn wants_poll(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.polled && s.handle.is_some())
    }

    async fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::PlayTrack(track) => self.play_track(track).await,
            PlayerCommand::Pause => self.pause().await,
            PlayerCommand::Resume => self.resume().await,
            PlayerCommand::Stop => self.stop().await,
            PlayerCommand::SeekTo(position) => self.seek_to(position).await,
            PlayerCommand::SkipNext => self.skip_next().await,
            PlayerCommand::SkipPrevious => self.skip_previous().await,
            PlayerCommand::ToggleAutoAdvance => {
                self.auto_advance = !self.auto_advance;
                info!("Auto-advance {}", if self.auto_advance { "on" } else { "off" });
                self.publish_state();
            }
        }
    }

    async fn play_track(&mut self, track: TrackMeta) {
        info!("Playing track: {} ({})", track.title, track.url);
        // Previous resource is fully released before the new load starts
        self.teardown_session().await;
        self.last_error = None;
        self.next_session_id += 1;
        let session_id = self.next_session_id;
        let url = track.url.clone();
        self.session = Some(Session {
            id: session_id,
            track,
            handle: None,
            polled: false,
            duration: Duration::ZERO,
            position: Duration::ZERO,
            playing: false,
            buffering: true,
        });
        self.publish_state();
        let backend = self.backend.clone();
        let events = self.backend_tx.clone();
        let acquire_tx = self.acquire_tx.clone();
        tokio::spawn(async move {
            let result = backend.acquire(&url, session_id, events).await;
            let _ = acquire_tx.send(AcquireOutcome { session_id, result });
        });
    }

    async fn handle_acquired(&mut self, outcome: AcquireOutcome) {
        let current = self.session.as_ref().map(|s| s.id);
        if current != Some(outcome.session_id) {
            debug!(
                "Discarding load outcome for superseded session {}",
                outcome.session_id
            );
            if let Ok(mut handle) = outcome.result {
                handle.release().await;
            }
            return;
        }
        match outcome.result {
            Ok(mut handle) => {
                let status = match handle.status().await {
                    Ok(status) => status,
                    Err(e) => {
                        warn!("Status unavailable after load: {}", e);
                        Default::default()
                    }
                };
                let polled = !handle.pushes_updates();
                if let Some(session) = self.session.as_mut() {
                    session.handle = Some(handle);
                    session.polled = polled;
                    session.duration = status.duration;
                    session.position = clamp_position(status.position, status.duration);
                    session.playing = true;
                    session.buffering = false;
                    info!(
                        "Track loaded: {} ({}ms)",
                        session.track.title,
                        status.duration.as_millis()
                    );
                }
                self.publish_state();
            }
            Err(e) => {
                warn!("Failed to load audio: {}", e);
                // Loading -> Idle; only the error flag survives for the
                // retry UI
                self.last_error = Some(e.to_string());
                self.session = None;
                self.publish_state();
                self.events.emit(PlayerEvent::PlaybackError {
                    message: e.to_string(),
                });
            }
        }
    }

    async fn handle_backend_event(&mut self, event: BackendEvent) {
        let current = self.session.as_ref().map(|s| s.id);
        if current != Some(event.session_id()) {
            debug!(
                "Ignoring event for superseded session {}",
                event.session_id()
            );
            return;
        }
        match event {
            BackendEvent::Position { position, .. } => {
                if let Some(session) = self.session.as_mut() {
                    session.position = clamp_position(position, session.duration);
                    let position = session.position;
                    let track_url = session.track.url.clone();
                    self.publish_state();
                    self.events
                        .emit(PlayerEvent::PositionUpdate { position, track_url });
                }
            }
            BackendEvent::Duration { duration, .. } => {
                if let Some(session) = self.session.as_mut() {
                    session.duration = duration;
                    session.position = clamp_position(session.position, duration);
                    self.publish_state();
                }
            }
            BackendEvent::Buffering { buffering, .. } => {
                if let Some(session) = self.session.as_mut() {
                    session.buffering = buffering;
                    self.publish_state();
                }
            }
            BackendEvent::Completed { .. } => {
                self.handle_completed().await;
            }
            BackendEvent::Error { message, .. } => {
                warn!("Playback error: {}", message);
                // Session is kept so the UI can offer retry in place
                self.last_error = Some(message.clone());
                if let Some(session) = self.session.as_mut() {
                    session.playing = false;
                    session.buffering = false;
                }
                self.publish_state();
                self.events.emit(PlayerEvent::PlaybackError { message });
            }
        }
    }

    /// Natural completion: reset to the start, stopped; auto-advance to the
    /// next surah when enabled and not at the end of the sequence.
    async fn handle_completed(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.playing = false;
        session.position = Duration::ZERO;
        let track_url = session.track.url.clone();
        let surah_number = session.track.surah_number;
        info!("Track completed: {}", track_url);
        // Completion first, then the reset snapshot, so subscribers that
        // react to the completion still see the reset state arrive after it
        self.events.emit(PlayerEvent::TrackCompleted { track_url });
        self.publish_state();
        if self.auto_advance {
            if let Some(number) = surah_number {
                if !is_last_surah(number) {
                    info!("Auto-advancing from surah {}", number);
                    self.skip_next().await;
                }
            }
        }
    }

    async fn pause(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if !session.playing {
            return;
        }
        let Some(handle) = session.handle.as_mut() else {
            return;
        };
        match handle.pause().await {
            Ok(()) => {
                session.playing = false;
                self.last_error = None;
                self.publish_state();
            }
            Err(e) => warn!("Failed to pause: {}", e),
        }
    }

    async fn resume(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(handle) = session.handle.as_mut() else {
            return;
        };
        match handle.play().await {
            Ok(()) => {
                session.playing = true;
                self.last_error = None;
                self.publish_state();
            }
            Err(e) => {
                // Playing flag stays as it was before the attempt
                warn!("Failed to resume: {}", e);
                self.last_error = Some(e.to_string());
                self.publish_state();
            }
        }
    }

    async fn stop(&mut self) {
        info!("Stopping playback");
        self.teardown_session().await;
        self.last_error = None;
        self.publish_state();
    }

    async fn seek_to(&mut self, position: Duration) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.duration.is_zero() {
            debug!("Ignoring seek while duration is unknown");
            return;
        }
        let target = position.min(session.duration);
        // Optimistic update so the UI tracks the scrubber immediately
        session.position = target;
        let track_url = session.track.url.clone();
        if let Some(handle) = session.handle.as_mut() {
            match handle.seek(target).await {
                Ok(()) => self.last_error = None,
                Err(e) => {
                    warn!("Seek failed: {}", e);
                    self.last_error = Some(e.to_string());
                }
            }
        }
        self.publish_state();
        self.events.emit(PlayerEvent::Seeked {
            position: target,
            track_url,
        });
    }

    async fn skip_next(&mut self) {
        let Some(current) = self.session.as_ref().and_then(|s| s.track.surah_number) else {
            return;
        };
        let Some(target) = next_surah(current) else {
            debug!("Already at the last surah");
            return;
        };
        self.play_surah(target).await;
    }

    async fn skip_previous(&mut self) {
        let Some(current) = self.session.as_ref().and_then(|s| s.track.surah_number) else {
            return;
        };
        let Some(target) = previous_surah(current) else {
            debug!("Already at the first surah");
            return;
        };
        self.play_surah(target).await;
    }

    /// Resolve the chapter's display metadata and start it. Lookup failure
    /// degrades to the generic "Surah N" label; the transition always
    /// happens.
    async fn play_surah(&mut self, number: u16) {
        let info = match self.directory.surah(number).await {
            Ok(info) => info,
            Err(e) => {
                warn!("Surah lookup failed for {}: {}", number, e);
                SurahInfo::fallback(number)
            }
        };
        let url = surah_audio_url(&self.reciter, DEFAULT_BITRATE_KBPS, number);
        let track = TrackMeta::new(url, info.title(), Some(info.subtitle()), Some(number));
        self.play_track(track).await;
    }

    async fn poll_status(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(handle) = session.handle.as_mut() else {
            return;
        };
        match handle.status().await {
            Ok(status) => {
                session.duration = status.duration;
                session.position = clamp_position(status.position, status.duration);
                session.buffering = status.buffering;
                let position = session.position;
                let track_url = session.track.url.clone();
                self.publish_state();
                self.events
                    .emit(PlayerEvent::PositionUpdate { position, track_url });
            }
            Err(e) => warn!("Status poll failed: {}", e),
        }
    }

    async fn teardown_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            if let Some(mut handle) = session.handle.take() {
                handle.release().await;
            }
            // An in-flight load for this session resolves against a stale id
            // and is discarded in handle_acquired
        }
    }

    fn publish_state(&self) {
        let snapshot = self.snapshot();
        let _ = self.snapshot_tx.send(snapshot.clone());
        self.events.emit(PlayerEvent::StateChanged { snapshot });
    }

    fn snapshot(&self) -> PlayerSnapshot {
        match &self.session {
            Some(session) => PlayerSnapshot {
                track: Some(session.track.clone()),
                playing: session.playing,
                buffering: session.buffering,
                duration: session.duration,
                position: session.position,
                last_error: self.last_error.clone(),
                auto_advance: self.auto_advance,
            },
            None => PlayerSnapshot {
                last_error: self.last_error.clone(),
                auto_advance: self.auto_advance,
                ..Default::default()
            },
        }
    }
}

fn clamp_position(position: Duration, duration: Duration) -> Duration {
    if duration.is_zero() {
        position
    } else {
        position.min(duration)
    }
}
