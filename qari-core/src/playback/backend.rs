//! Platform audio backend contract.
//!
//! The coordinator is written once against these traits; the app wires in a
//! concrete backend per platform at startup. Two runtime shapes exist:
//!
//! - *pushing* backends (browser-style audio element) deliver continuous
//!   [`BackendEvent`]s through the sender given to [`AudioBackend::acquire`];
//! - *polled* backends (native sound session) deliver little or nothing on
//!   their own, and the coordinator calls [`BackendHandle::status`] on a
//!   fixed interval while a handle is live.
//!
//! Every event is stamped with the session id passed to `acquire`; the
//! coordinator drops events whose session has since been replaced.

use crate::playback::PlayerError;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// Point-in-time status reported by a backend handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BackendStatus {
    pub position: Duration,
    pub duration: Duration,
    pub buffering: bool,
}

/// Status updates pushed by a backend while a resource is loaded.
#[derive(Debug, Clone)]
pub enum BackendEvent {
    Position {
        session_id: u64,
        position: Duration,
    },
    Duration {
        session_id: u64,
        duration: Duration,
    },
    Buffering {
        session_id: u64,
        buffering: bool,
    },
    /// Natural completion: position reached duration
    Completed {
        session_id: u64,
    },
    /// Mid-stream failure (network drop, decode error)
    Error {
        session_id: u64,
        message: String,
    },
}

impl BackendEvent {
    pub fn session_id(&self) -> u64 {
        match self {
            BackendEvent::Position { session_id, .. }
            | BackendEvent::Duration { session_id, .. }
            | BackendEvent::Buffering { session_id, .. }
            | BackendEvent::Completed { session_id }
            | BackendEvent::Error { session_id, .. } => *session_id,
        }
    }
}

/// A loaded, playing audio resource. Exactly one handle is live at a time;
/// the coordinator owns it and releases it before acquiring another.
#[async_trait]
pub trait BackendHandle: Send {
    async fn play(&mut self) -> Result<(), PlayerError>;

    async fn pause(&mut self) -> Result<(), PlayerError>;

    async fn seek(&mut self, position: Duration) -> Result<(), PlayerError>;

    async fn status(&mut self) -> Result<BackendStatus, PlayerError>;

    /// Whether this handle pushes [`BackendEvent`]s on its own. When false,
    /// the coordinator polls [`Self::status`] instead.
    fn pushes_updates(&self) -> bool;

    /// Release the underlying resource. Called exactly once per handle.
    async fn release(&mut self);
}

/// Platform audio capability: loads a URL and starts playback.
///
/// `acquire` resolves once metadata is loaded and playback has started; the
/// returned handle's initial [`BackendHandle::status`] carries the duration.
#[async_trait]
pub trait AudioBackend: Send + Sync + 'static {
    async fn acquire(
        &self,
        url: &str,
        session_id: u64,
        events: UnboundedSender<BackendEvent>,
    ) -> Result<Box<dyn BackendHandle>, PlayerError>;
}
