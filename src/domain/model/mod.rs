// Domain models - Core types and data structures

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use uuid::Uuid;

use crate::domain::errors::DomainError;

/// Media engine time unit (milliseconds)
pub type Millis = i64;

/// Video name to absolute path, as produced by a directory scan
pub type VideoIndex = BTreeMap<String, PathBuf>;

/// Convert seconds to engine milliseconds (`round(seconds * 1000)`)
pub fn seconds_to_ms(seconds: f64) -> Millis {
    (seconds * 1000.0).round() as Millis
}

/// Convert engine milliseconds to seconds
pub fn ms_to_seconds(ms: Millis) -> f64 {
    ms as f64 / 1000.0
}

/// Opaque clip identity, assigned when a clip enters memory.
///
/// Never persisted: clip files only carry positions and comments, so ids are
/// regenerated on every load. External callers still address clips by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClipId(Uuid);

impl ClipId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClipId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Time range of a clip in seconds, `start < end`, both non-negative
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipRange {
    pub start: f64,
    pub end: f64,
}

impl ClipRange {
    /// Create a validated range
    pub fn new(start: f64, end: f64) -> Result<Self, DomainError> {
        if !start.is_finite() || !end.is_finite() {
            return Err(DomainError::BadArgs(format!(
                "Clip positions must be finite, got ({}, {})",
                start, end
            )));
        }
        if start < 0.0 {
            return Err(DomainError::BadArgs(format!(
                "Clip start cannot be negative: {}",
                start
            )));
        }
        if end <= start {
            return Err(DomainError::InvalidClipRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Range length in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn start_ms(&self) -> Millis {
        seconds_to_ms(self.start)
    }

    pub fn end_ms(&self) -> Millis {
        seconds_to_ms(self.end)
    }

    /// Check the range against a known media length.
    ///
    /// A length of zero means the engine has not reported one yet and is
    /// accepted as-is.
    pub fn validate_against_length(&self, length_ms: Millis) -> Result<(), DomainError> {
        if length_ms > 0 && self.end_ms() > length_ms {
            return Err(DomainError::BadArgs(format!(
                "Clip end {:.2}s exceeds media length {:.2}s",
                self.end,
                ms_to_seconds(length_ms)
            )));
        }
        Ok(())
    }
}

/// A sub-range of a video, optionally annotated
#[derive(Debug, Clone)]
pub struct Clip {
    id: ClipId,
    range: ClipRange,
    comment: String,
}

impl Clip {
    /// Create a clip with an empty comment
    pub fn new(range: ClipRange) -> Self {
        Self::with_comment(range, String::new())
    }

    /// Create a clip with a comment
    pub fn with_comment(range: ClipRange, comment: impl Into<String>) -> Self {
        Self {
            id: ClipId::new(),
            range,
            comment: comment.into(),
        }
    }

    /// Shorthand for building a clip from raw seconds
    pub fn from_positions(start: f64, end: f64) -> Result<Self, DomainError> {
        Ok(Self::new(ClipRange::new(start, end)?))
    }

    pub fn id(&self) -> ClipId {
        self.id
    }

    pub fn range(&self) -> ClipRange {
        self.range
    }

    pub fn start(&self) -> f64 {
        self.range.start
    }

    pub fn end(&self) -> f64 {
        self.range.end
    }

    /// `(start, end)` as stored in clip files
    pub fn positions(&self) -> (f64, f64) {
        (self.range.start, self.range.end)
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = comment.into();
    }

    /// Logical equality, ignoring identity
    pub fn same_content(&self, other: &Clip) -> bool {
        self.range == other.range && self.comment == other.comment
    }

    /// List label for the clip at `index`, e.g. `Clip 1: 10.00s - 20.00s`
    pub fn label(&self, index: usize) -> String {
        format!(
            "Clip {}: {:.2}s - {:.2}s",
            index + 1,
            self.range.start,
            self.range.end
        )
    }
}

/// A discovered video and its ordered clips
#[derive(Debug, Clone)]
pub struct VideoEntry {
    /// File base name, also the stem of the clip file
    pub name: String,
    pub path: PathBuf,
    /// Sorted ascending by start
    pub clips: Vec<Clip>,
}

impl VideoEntry {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            clips: Vec::new(),
        }
    }

    /// Stable sort by start; equal starts keep their current order
    pub fn sort_clips(&mut self) {
        self.clips.sort_by(|a, b| a.start().total_cmp(&b.start()));
    }

    /// Index of the clip with the given id
    pub fn position_of(&self, id: ClipId) -> Option<usize> {
        self.clips.iter().position(|c| c.id() == id)
    }
}

/// Controller playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// No media loaded
    Idle,
    /// Media set, not yet playing
    Loaded,
    /// Playing with no bound
    PlayingFree,
    /// Playing with a clip end enforced
    PlayingBounded,
    /// Paused from either playing state
    Paused,
}

impl PlaybackState {
    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackState::PlayingFree | PlaybackState::PlayingBounded)
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Loaded => "loaded",
            PlaybackState::PlayingFree => "playing",
            PlaybackState::PlayingBounded => "playing clip",
            PlaybackState::Paused => "paused",
        };
        write!(f, "{}", name)
    }
}

/// Timing knobs that differed between revisions of the reviewer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingSettings {
    /// Subtracted from the live position when marking a clip start
    pub start_preroll_ms: Millis,
    /// Subtracted from the clip start when a loop restarts
    pub loop_preroll_ms: Millis,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            start_preroll_ms: 500,
            loop_preroll_ms: 100,
        }
    }
}
