//! Error handling module for ClipReview

use thiserror::Error;

use crate::domain::errors::DomainError;

/// Main error type for ClipReview operations
#[derive(Error, Debug)]
pub enum ClipReviewError {
    /// Clip store or playback failure
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Logging could not be initialised
    #[error("Failed to initialize logging: {message}")]
    Logging { message: String },

    /// Config file parse error
    #[error("Invalid config file: {0}")]
    TomlError(#[from] toml::de::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for ClipReview operations
pub type ClipReviewResult<T> = std::result::Result<T, ClipReviewError>;
