//! Form definitions backing the student and account screens.

use thiserror::Error;
use validator::ValidationErrors;

pub mod auth;
pub mod students;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid email address")]
    InvalidEmail,

    #[error("invalid name")]
    InvalidName,

    #[error("age must be between 1 and 150")]
    InvalidAge,

    #[error("invalid course")]
    InvalidCourse,

    #[error("invalid city")]
    InvalidCity,

    #[error("invalid password")]
    InvalidPassword,
}
