//! Error types for the adapter library.

use thiserror::Error;

/// Result type alias for adapter operations
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A player was asked to bind a media element while already bound.
    /// Initializing twice would duplicate listener registrations.
    #[error("player is already bound to a media element")]
    AlreadyInitialized,

    #[error("audio output unavailable: {0}")]
    OutputUnavailable(String),

    #[error("unsupported media source: {0}")]
    UnsupportedSource(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
