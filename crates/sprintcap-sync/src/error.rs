use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    #[error("Missing credentials")]
    MissingCredentials,

    #[error("Remote API error: {message} ({status})")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    Transport(String),

    #[error("{0}")]
    Metadata(String),

    #[error("Unexpected response: {0}")]
    Decode(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("{failed} of {total} task updates failed; first error: {first}")]
    Partial {
        failed: usize,
        total: usize,
        first: String,
    },

    #[error("A sync is already running")]
    AlreadyRunning,
}

pub type SyncResult<T> = Result<T, SyncError>;
