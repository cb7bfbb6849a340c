//! CAS error types.

use thiserror::Error;

pub type CasResult<T> = Result<T, CasError>;

#[derive(Debug, Error)]
pub enum CasError {
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("an AuthURL has not been set")]
    NoAuthUrl,

    #[error("Missing ticket parameter")]
    MissingTicket,

    #[error("HTTP request failed: {0}")]
    NetworkError(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Unexpected CAS response: {0}")]
    ProtocolError(String),

    /// CAS rejected the ticket. Displays as the bare CAS error code.
    #[error("{code}")]
    ValidationFailed { code: String, reason: String },

    #[error("no user information found in session")]
    NoIdentity,

    #[error("{0}")]
    Unsupported(String),

    #[error("Failed to deserialize session: {0}")]
    DeserializationError(#[source] serde_json::Error),

    #[error("Failed to serialize session: {0}")]
    SerializationError(#[source] serde_json::Error),
}

impl CasError {
    /// Error code supplied by the CAS server, if it rejected the ticket
    pub fn code(&self) -> Option<&str> {
        match self {
            CasError::ValidationFailed { code, .. } => Some(code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for CasError {
    fn from(err: reqwest::Error) -> Self {
        CasError::NetworkError(Box::new(err))
    }
}
