use std::fmt;

/// Unified error type for the fintent engine.
#[derive(Debug, Clone)]
pub enum EngineError {
    /// A confirm/cancel referenced a pending delete that does not exist
    /// for this user. Foreign-owned confirmation ids surface as this too.
    UnknownConfirmation(String),
    /// A collaborator lacks a requested capability.
    CapabilityUnavailable(String),
    /// Invalid input provided by the caller.
    InvalidInput(String),
    /// Internal error.
    Internal(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::UnknownConfirmation(id) => {
                write!(f, "no pending delete operation with id {id}")
            }
            EngineError::CapabilityUnavailable(msg) => {
                write!(f, "capability unavailable: {msg}")
            }
            EngineError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            EngineError::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}

/// Result type alias using [`EngineError`].
pub type EngineResult<T> = Result<T, EngineError>;
