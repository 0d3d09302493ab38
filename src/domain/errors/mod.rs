// Domain errors - Error types for the domain layer

use std::fmt;

/// Domain-specific error types
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Invalid arguments provided
    BadArgs(String),
    /// Referenced video has no discoverable path
    NotFound(String),
    /// Clip index outside the video's clip list
    IndexOutOfRange { video: String, index: usize, len: usize },
    /// Clip file failed to parse or has the wrong shape
    MalformedClipFile(String),
    /// Writing clip data failed
    Persistence(String),
    /// Clip end is not after its start
    InvalidClipRange { start: f64, end: f64 },
    /// Media engine could not load or play the media
    EngineUnavailable(String),
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::BadArgs(msg) => write!(f, "Bad arguments: {}", msg),
            DomainError::NotFound(msg) => write!(f, "Not found: {}", msg),
            DomainError::IndexOutOfRange { video, index, len } => write!(
                f,
                "Clip index {} out of range for {} ({} clips)",
                index, video, len
            ),
            DomainError::MalformedClipFile(msg) => write!(f, "Malformed clip file: {}", msg),
            DomainError::Persistence(msg) => write!(f, "Persistence failed: {}", msg),
            DomainError::InvalidClipRange { start, end } => write!(
                f,
                "Invalid clip range: end ({:.2}s) must be after start ({:.2}s)",
                end, start
            ),
            DomainError::EngineUnavailable(msg) => write!(f, "Media engine unavailable: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}
