//! Error types of the generation pipeline.

use thiserror::Error;

/// Prompt rejected before any generator runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Prompt cannot be empty")]
    Empty,

    #[error("Prompt too long ({len} characters, max {max})")]
    TooLong { len: usize, max: usize },
}

/// Failure of the single outbound call to the inference backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Connection or transport failure.
    #[error("Backend unreachable: {0}")]
    Unreachable(String),

    #[error("Backend request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Backend answered with a non-2xx status.
    #[error("Backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Backend response could not be decoded: {0}")]
    InvalidResponse(String),

    #[error("Backend returned an empty response")]
    EmptyResponse,
}

impl BackendError {
    /// True when the backend could not be reached at all (as opposed to
    /// answering badly).
    pub fn is_unavailable(&self) -> bool {
        matches!(self, BackendError::Unreachable(_) | BackendError::Timeout { .. })
    }
}

/// Failure to append to the interaction log. Never reaches API callers.
#[derive(Debug, Error)]
pub enum LogWriteError {
    #[error("interaction log I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("interaction record serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("interaction log is closed")]
    Closed,
}

/// Errors a caller of the dispatcher can observe.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}
