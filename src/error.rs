//! JARVIS Error Types
//!
//! Centralized error handling. Every adapter boundary has its own enum so
//! callers can decide which failures are recoverable.

use thiserror::Error;

/// Central error type for JARVIS
#[derive(Error, Debug)]
pub enum JarvisError {
    #[error("AI adapter error: {0}")]
    Ai(#[from] AiError),

    #[error("Speech adapter error: {0}")]
    Speech(#[from] SpeechError),

    #[error("Memory store error: {0}")]
    Memory(#[from] MemoryError),

    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    #[error("Launch error: {0}")]
    Launch(#[from] LaunchError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Lock poisoned: {0}")]
    Lock(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for JARVIS operations
pub type JarvisResult<T> = Result<T, JarvisError>;

/// Helper to convert Mutex poison errors
impl<T> From<std::sync::PoisonError<T>> for JarvisError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        JarvisError::Lock(err.to_string())
    }
}

/// Failure outcomes of a text completion call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AiError {
    /// Service not configured or not reachable
    #[error("AI service unavailable: {0}")]
    Unavailable(String),

    #[error("AI request timed out")]
    Timeout,

    /// Reachable, but returned an error or an unusable body
    #[error("AI service error: {0}")]
    ServiceError(String),
}

impl From<reqwest::Error> for AiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AiError::Timeout
        } else if err.is_connect() {
            AiError::Unavailable(err.to_string())
        } else {
            AiError::ServiceError(err.to_string())
        }
    }
}

/// Speech capture / synthesis failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpeechError {
    /// No microphone / speech daemon; voice control cannot run this session
    #[error("listening device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("speech service error: {0}")]
    ServiceError(String),
}

/// Memory store failures
#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("no {kind} named '{name}'")]
    NotFound { kind: &'static str, name: String },

    #[error("failed to persist memory: {0}")]
    Persist(#[from] std::io::Error),

    #[error("failed to encode memory: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Weather / knowledge lookup failures
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("nothing found for '{0}'")]
    NotFound(String),

    #[error("ambiguous topic '{0}'")]
    Ambiguous(String),

    #[error("lookup service error: {0}")]
    Service(String),
}

impl From<reqwest::Error> for LookupError {
    fn from(err: reqwest::Error) -> Self {
        LookupError::Service(err.to_string())
    }
}

/// Application launch failures
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("empty invocation for {0}")]
    EmptyInvocation(String),

    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}
