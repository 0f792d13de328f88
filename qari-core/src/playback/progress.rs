//! Progress events emitted by the player, fanned out to every subscriber.

use crate::playback::service::PlayerSnapshot;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc as tokio_mpsc;

/// Updates published while the player runs. `StateChanged` carries the full
/// snapshot so subscribers never have to reassemble state from deltas.
#[derive(Debug, Clone)]
pub enum PlayerEvent {
    StateChanged {
        snapshot: PlayerSnapshot,
    },
    PositionUpdate {
        position: Duration,
        track_url: String,
    },
    /// Seek completed; `position` is the clamped target
    Seeked {
        position: Duration,
        track_url: String,
    },
    TrackCompleted {
        track_url: String,
    },
    PlaybackError {
        message: String,
    },
}

/// Multi-subscriber event fan-out. Subscriptions are removed automatically
/// when the receiver is dropped.
#[derive(Clone, Default)]
pub struct PlayerEvents {
    subscribers: Arc<Mutex<Vec<tokio_mpsc::UnboundedSender<PlayerEvent>>>>,
}

impl PlayerEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> tokio_mpsc::UnboundedReceiver<PlayerEvent> {
        let (tx, rx) = tokio_mpsc::unbounded_channel();
        self.subscribers.lock().unwrap().push(tx);
        rx
    }

    pub(crate) fn emit(&self, event: PlayerEvent) {
        let mut subs = self.subscribers.lock().unwrap();
        subs.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
