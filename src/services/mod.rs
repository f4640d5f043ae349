//! Service layer composing forms, repositories and view models.

use thiserror::Error;

use crate::repository::errors::RepositoryError;

pub mod auth;
pub mod students;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found")]
    NotFound,

    #[error("{0}")]
    Form(String),

    #[error("{0}")]
    TypeConstraint(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// The caller should send the user back to the sign-in screen.
    pub fn requires_reauth(&self) -> bool {
        matches!(self, ServiceError::Repository(err) if err.requires_reauth())
    }
}
