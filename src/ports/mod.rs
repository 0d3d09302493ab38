// Ports - Interface definitions (contracts)

use std::path::{Path, PathBuf};

use crate::domain::errors::*;
use crate::domain::model::*;

/// Port for the media engine that decodes and renders the video.
///
/// Times are in engine milliseconds. Commands are synchronous and are
/// expected to return quickly; the engine's own clock is the source of truth
/// for the playback position.
pub trait MediaEngine: Send {
    /// Attach media from a file
    fn load(&mut self, path: &Path) -> Result<(), DomainError>;

    /// Whether a media handle is currently attached.
    ///
    /// The handle may be torn down by the engine independently of the
    /// controller, so callers check this before issuing play or seek.
    fn has_media(&self) -> bool;

    /// Start or resume playback
    fn play(&mut self) -> Result<(), DomainError>;

    /// Pause playback
    fn pause(&mut self);

    /// Whether the engine is currently playing
    fn is_playing(&self) -> bool;

    /// Current position
    fn get_time(&self) -> Millis;

    /// Seek to a position
    fn set_time(&mut self, ms: Millis);

    /// Media length, 0 while unknown
    fn get_length(&self) -> Millis;

    /// Set the playback rate multiplier
    fn set_rate(&mut self, rate: f32);
}

/// Port for per-video clip persistence
pub trait ClipStoragePort: Send + Sync {
    /// Video names that have a clip file, ordered by file name
    fn list_video_names(&self) -> Result<Vec<String>, DomainError>;

    /// Read one video's clips; `Ok(None)` when no clip file exists
    fn read_clips(&self, video_name: &str) -> Result<Option<Vec<Clip>>, DomainError>;

    /// Overwrite one video's clip file, creating the storage directory if needed
    fn write_clips(&self, video_name: &str, clips: &[Clip]) -> Result<(), DomainError>;

    /// Storage directory
    fn location(&self) -> &Path;
}

/// Port for discovering videos on disk
pub trait VideoScanPort: Send + Sync {
    /// Recursively scan base directories into a name to path index.
    ///
    /// When two files share a base name the one found last wins.
    fn scan(&self, base_dirs: &[PathBuf]) -> VideoIndex;

    /// Whether a path has a known video extension
    fn is_video(&self, path: &Path) -> bool;
}

/// Port for probing media length without attaching it to an engine
pub trait LengthProbePort: Send + Sync {
    /// Media length, `None` when it cannot be determined
    fn probe_length(&self, path: &Path) -> Option<Millis>;
}
