//! Error type for the headless runner.

use thiserror::Error;

use skirmish_core::error::GameError;

/// Result alias for runner operations.
pub type Result<T> = std::result::Result<T, HeadlessError>;

/// Everything that can stop a headless run.
#[derive(Error, Debug)]
pub enum HeadlessError {
    /// Input file missing.
    #[error("File not found: {0}")]
    FileNotFound(String),
    /// Failed to read or write a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse RON: {0}")]
    RonParse(#[from] ron::error::SpannedError),
    /// Failed to write RON.
    #[error("Failed to write RON: {0}")]
    RonWrite(#[from] ron::Error),
    /// Failed to read or write JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// The simulation refused the scenario or config.
    #[error(transparent)]
    Game(#[from] GameError),
}
