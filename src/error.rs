//! Error taxonomy for the remote user service.
//!
//! The client never recovers locally: every failure is returned to the
//! controller as one of these kinds, which then collapses it into a fixed
//! user-facing message and logs the detail.
//!
use reqwest::StatusCode;

/// Failure of a single call against the user service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (connection refused, DNS, reset...).
    #[error("network error: {0}")]
    Network(String),
    /// Non-2xx response without a recognized not-found/validation meaning,
    /// or a success response whose body could not be decoded.
    #[error("server error ({status}): {message}")]
    Server { status: StatusCode, message: String },
    /// The referenced id does not exist.
    #[error("user not found: {0}")]
    NotFound(String),
    /// The server rejected the payload.
    #[error("validation error: {0}")]
    Validation(String),
}

impl ApiError {
    /// Classify a non-success HTTP status together with the response text.
    pub fn from_status(status: StatusCode, message: impl Into<String>, subject: &str) -> Self {
        let message = message.into();
        match status {
            StatusCode::NOT_FOUND => Self::NotFound(subject.to_string()),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Self::Validation(message),
            _ => Self::Server { status, message },
        }
    }

    /// Short machine-friendly label, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Server { .. } => "server",
            Self::NotFound(_) => "not_found",
            Self::Validation(_) => "validation",
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Server {
                status: err.status().unwrap_or(StatusCode::OK),
                message: format!("undecodable response body: {err}"),
            }
        } else if let Some(status) = err.status() {
            Self::from_status(status, err.to_string(), "")
        } else {
            Self::Network(err.to_string())
        }
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
