mod backend;
mod error;
pub mod progress;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use backend::{AudioBackend, BackendEvent, BackendHandle, BackendStatus};
pub use error::PlayerError;
pub use progress::{PlayerEvent, PlayerEvents};
pub use service::{PlayerCommand, PlayerHandle, PlayerService, PlayerSnapshot};

#[cfg(any(test, feature = "test-utils"))]
pub use mock::{MockBackend, MockHandleControl, MockMode};
