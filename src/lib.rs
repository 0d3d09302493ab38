//! ClipReview library
//!
//! Clip store and bounded playback controller for reviewing study videos:
//! mark sub-ranges of a video as clips, persist them per video as JSON and
//! replay them with looping and variable speed over an external media engine.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod error;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use app::{ClipStore, PlaybackController, ReviewSession, SessionCommand, StatusMessage};
pub use domain::errors::DomainError;
pub use domain::model::{Clip, ClipId, ClipRange, Millis, PlaybackState, VideoEntry};
pub use error::{ClipReviewError, ClipReviewResult};
pub use ports::MediaEngine;
