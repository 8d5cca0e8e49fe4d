//! Error types for the tracker crate

use thiserror::Error;

/// Errors raised while setting up or persisting a translation session.
///
/// Conditions the tracker recovers from on its own (a progress mismatch on
/// restore, a section that vanished mid-edit, alignment that does not
/// converge) are logged instead and never surface here.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Two source sections were decomposed with the same number
    #[error("duplicate section number {0} in source document")]
    DuplicateSection(u32),

    #[error("unknown section {0}")]
    UnknownSection(u32),

    /// The persistence layer rejected a load or save
    #[error("store error: {0}")]
    Store(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type for tracker operations
pub type TrackerResult<T> = Result<T, TrackerError>;
