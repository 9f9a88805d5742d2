//! Error types for Weft.

use thiserror::Error;

/// Library-level error type for Weft operations.
#[derive(Error, Debug)]
pub enum WeftError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Diarization failed: {0}")]
    Diarization(String),

    #[error("Audio extraction failed: {0}")]
    AudioExtract(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Session file error: {0}")]
    Session(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Result type alias for Weft operations.
pub type Result<T> = std::result::Result<T, WeftError>;
