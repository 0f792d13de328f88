//! Playback error types
use thiserror::Error;

/// Errors that can occur during audio playback operations
#[derive(Error, Debug)]
pub enum PlayerError {
    /// Backend could not load the audio resource (unreachable URL,
    /// unsupported format)
    #[error("Failed to load audio: {0}")]
    Load(String),
    /// Backend failed mid-stream after a successful load
    #[error("Playback error: {0}")]
    Playback(String),
    /// Seek rejected by the backend
    #[error("Seek failed: {0}")]
    Seek(String),
    /// Async task panicked or was cancelled
    #[error("Task failed: {0}")]
    TaskFailed(String),
}

impl PlayerError {
    pub fn load(e: impl std::fmt::Display) -> Self {
        Self::Load(e.to_string())
    }

    pub fn playback(e: impl std::fmt::Display) -> Self {
        Self::Playback(e.to_string())
    }

    pub fn seek(e: impl std::fmt::Display) -> Self {
        Self::Seek(e.to_string())
    }

    pub fn task(e: impl std::fmt::Display) -> Self {
        Self::TaskFailed(e.to_string())
    }
}
