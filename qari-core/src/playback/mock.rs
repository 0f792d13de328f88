//! Scripted mock audio backend for behavior tests.
//!
//! Covers both runtime shapes of the contract: `Pushed` handles report
//! nothing until the test pushes [`BackendEvent`]s through their control,
//! `Polled` handles expose whatever status the test last set. Loads can be
//! gated behind a semaphore so tests can overlap two `play_track` calls and
//! exercise the stale-acquisition guard.
//!
//! Release accounting is strict: every successful acquire must be released
//! exactly once, and a double release panics.

use crate::playback::backend::{AudioBackend, BackendEvent, BackendHandle, BackendStatus};
use crate::playback::PlayerError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Semaphore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockMode {
    /// Browser-style: pushes time updates, never polled
    Pushed,
    /// Native-style: silent between status polls
    Polled,
}

/// Scripted outcome for one acquire call
#[derive(Debug, Clone)]
enum LoadScript {
    Succeed { duration: Duration },
    Fail { message: String },
}

#[derive(Debug)]
struct MockHandleState {
    position: Duration,
    duration: Duration,
    buffering: bool,
    playing: bool,
    released: bool,
    fail_next_play: bool,
    fail_next_seek: bool,
}

/// Remote control for one successfully acquired handle. Lets tests push
/// backend events (pushed mode) or mutate the polled status.
#[derive(Clone)]
pub struct MockHandleControl {
    session_id: u64,
    state: Arc<Mutex<MockHandleState>>,
    events: UnboundedSender<BackendEvent>,
}

impl MockHandleControl {
    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    pub fn push_position(&self, position: Duration) {
        let _ = self.events.send(BackendEvent::Position {
            session_id: self.session_id,
            position,
        });
    }

    pub fn push_buffering(&self, buffering: bool) {
        let _ = self.events.send(BackendEvent::Buffering {
            session_id: self.session_id,
            buffering,
        });
    }

    pub fn push_duration(&self, duration: Duration) {
        let _ = self.events.send(BackendEvent::Duration {
            session_id: self.session_id,
            duration,
        });
    }

    pub fn push_completed(&self) {
        let _ = self.events.send(BackendEvent::Completed {
            session_id: self.session_id,
        });
    }

    pub fn push_error(&self, message: impl Into<String>) {
        let _ = self.events.send(BackendEvent::Error {
            session_id: self.session_id,
            message: message.into(),
        });
    }

    /// Status returned by the next poll (polled mode).
    pub fn set_status(&self, position: Duration, buffering: bool) {
        let mut state = self.state.lock().unwrap();
        state.position = position;
        state.buffering = buffering;
    }

    pub fn set_duration(&self, duration: Duration) {
        self.state.lock().unwrap().duration = duration;
    }

    /// Make the next `play()` on this handle fail (resume-failure tests).
    pub fn fail_next_play(&self) {
        self.state.lock().unwrap().fail_next_play = true;
    }

    /// Make the next `seek()` on this handle fail.
    pub fn fail_next_seek(&self) {
        self.state.lock().unwrap().fail_next_seek = true;
    }

    pub fn released(&self) -> bool {
        self.state.lock().unwrap().released
    }
}

/// Mock platform backend with scripted load outcomes.
pub struct MockBackend {
    mode: MockMode,
    scripts: Mutex<VecDeque<LoadScript>>,
    default_duration: Duration,
    gate: Option<Arc<Semaphore>>,
    acquires: AtomicUsize,
    loads: AtomicUsize,
    releases: Arc<AtomicUsize>,
    live: Mutex<Vec<MockHandleControl>>,
}

impl MockBackend {
    pub fn new(mode: MockMode) -> Arc<Self> {
        Arc::new(Self::build(mode, None))
    }

    /// Loads block until [`Self::release_one_load`] grants a permit.
    pub fn gated(mode: MockMode) -> Arc<Self> {
        Arc::new(Self::build(mode, Some(Arc::new(Semaphore::new(0)))))
    }

    fn build(mode: MockMode, gate: Option<Arc<Semaphore>>) -> Self {
        Self {
            mode,
            scripts: Mutex::new(VecDeque::new()),
            default_duration: Duration::from_secs(48),
            gate,
            acquires: AtomicUsize::new(0),
            loads: AtomicUsize::new(0),
            releases: Arc::new(AtomicUsize::new(0)),
            live: Mutex::new(Vec::new()),
        }
    }

    pub fn release_one_load(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    pub fn script_success(&self, duration: Duration) {
        self.scripts
            .lock()
            .unwrap()
            .push_back(LoadScript::Succeed { duration });
    }

    pub fn script_failure(&self, message: impl Into<String>) {
        self.scripts.lock().unwrap().push_back(LoadScript::Fail {
            message: message.into(),
        });
    }

    /// Total acquire calls, including ones that failed to load.
    pub fn acquire_count(&self) -> usize {
        self.acquires.load(Ordering::SeqCst)
    }

    /// Successful acquisitions (handles handed out).
    pub fn loaded_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn release_count(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    /// Controls for every handle handed out, in acquisition order.
    pub fn handles(&self) -> Vec<MockHandleControl> {
        self.live.lock().unwrap().clone()
    }

    pub fn last_handle(&self) -> Option<MockHandleControl> {
        self.live.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl AudioBackend for MockBackend {
    async fn acquire(
        &self,
        _url: &str,
        session_id: u64,
        events: UnboundedSender<BackendEvent>,
    ) -> Result<Box<dyn BackendHandle>, PlayerError> {
        self.acquires.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            let permit = gate.acquire().await.map_err(PlayerError::task)?;
            permit.forget();
        }
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(LoadScript::Succeed {
                duration: self.default_duration,
            });
        match script {
            LoadScript::Fail { message } => Err(PlayerError::Load(message)),
            LoadScript::Succeed { duration } => {
                let state = Arc::new(Mutex::new(MockHandleState {
                    position: Duration::ZERO,
                    duration,
                    buffering: false,
                    playing: true,
                    released: false,
                    fail_next_play: false,
                    fail_next_seek: false,
                }));
                self.loads.fetch_add(1, Ordering::SeqCst);
                self.live.lock().unwrap().push(MockHandleControl {
                    session_id,
                    state: state.clone(),
                    events,
                });
                Ok(Box::new(MockHandle {
                    mode: self.mode,
                    state,
                    releases: self.releases.clone(),
                }))
            }
        }
    }
}

struct MockHandle {
    mode: MockMode,
    state: Arc<Mutex<MockHandleState>>,
    releases: Arc<AtomicUsize>,
}

#[async_trait]
impl BackendHandle for MockHandle {
    async fn play(&mut self) -> Result<(), PlayerError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_next_play {
            state.fail_next_play = false;
            return Err(PlayerError::playback("scripted play failure"));
        }
        state.playing = true;
        Ok(())
    }

    async fn pause(&mut self) -> Result<(), PlayerError> {
        self.state.lock().unwrap().playing = false;
        Ok(())
    }

    async fn seek(&mut self, position: Duration) -> Result<(), PlayerError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_next_seek {
            state.fail_next_seek = false;
            return Err(PlayerError::seek("scripted seek failure"));
        }
        state.position = position;
        Ok(())
    }

    async fn status(&mut self) -> Result<BackendStatus, PlayerError> {
        let state = self.state.lock().unwrap();
        Ok(BackendStatus {
            position: state.position,
            duration: state.duration,
            buffering: state.buffering,
        })
    }

    fn pushes_updates(&self) -> bool {
        self.mode == MockMode::Pushed
    }

    async fn release(&mut self) {
        let mut state = self.state.lock().unwrap();
        assert!(!state.released, "Backend handle released twice");
        state.released = true;
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}
