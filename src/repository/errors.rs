use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{0}")]
    NotFound(String),

    /// The backend rejected the credentials or the session token.
    #[error("{0}")]
    Unauthorized(String),

    /// Non-success response carrying the backend's `detail` message.
    #[error("{detail}")]
    Api { status: u16, detail: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("{0}")]
    ConstraintViolation(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl RepositoryError {
    /// The session is gone and the user must sign in again.
    pub fn requires_reauth(&self) -> bool {
        matches!(self, RepositoryError::Unauthorized(_))
    }
}

#[cfg(feature = "client")]
impl From<reqwest::Error> for RepositoryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RepositoryError::ConnectionError(format!("Request timed out: {err}"))
        } else if err.is_connect() || err.is_request() {
            RepositoryError::ConnectionError(err.to_string())
        } else if err.is_decode() {
            RepositoryError::Unexpected(format!("Invalid response body: {err}"))
        } else if let Some(status) = err.status() {
            RepositoryError::Api {
                status: status.as_u16(),
                detail: err.to_string(),
            }
        } else {
            RepositoryError::Unexpected(err.to_string())
        }
    }
}
