// Application layer - Clip store, playback controller and the session over them

pub mod clip_store;
pub mod container;
pub mod playback_controller;
pub mod review_session;
pub mod ticker;

// Re-export application services
pub use clip_store::{ClipStore, LoadReport, PersistReport};
pub use container::AppContainer;
pub use playback_controller::{PlaybackController, TickOutcome};
pub use review_session::{ReviewSession, SessionCommand, StatusLevel, StatusMessage};
pub use ticker::{TickSummary, Ticker};
