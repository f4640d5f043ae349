//! Strongly-typed value objects used by domain entities.
//!
//! These wrappers enforce basic invariants (e.g., positive identifiers,
//! normalized/validated email, bounded text length) so that once a value
//! reaches the domain layer it can be treated as trusted.
use std::fmt::{Display, Formatter};
use std::ops::Deref;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::ValidateEmail;

/// Shortest accepted name, course or city.
pub const MIN_TEXT_LEN: usize = 2;
/// Longest accepted name, course or city.
pub const MAX_TEXT_LEN: usize = 100;
/// Youngest accepted student age.
pub const MIN_AGE: u8 = 1;
/// Oldest accepted student age.
pub const MAX_AGE: u8 = 150;

/// Errors produced when attempting to construct a constrained value object.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// Provided identifier is zero or negative.
    #[error("id must be greater than zero")]
    NonPositiveId,
    /// Provided email failed format validation.
    #[error("invalid email address")]
    InvalidEmail,
    /// Provided string contained no non-whitespace characters.
    #[error("value cannot be empty")]
    EmptyString,
    /// Provided string is shorter or longer than allowed.
    #[error("value must be between {min} and {max} characters")]
    InvalidLength { min: usize, max: usize },
    /// Provided age is outside the accepted range.
    #[error("age must be between 1 and 150")]
    InvalidAge,
    /// Provided value failed custom validation.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

/// Normalizes and validates an email string.
fn normalize_email<S: Into<String>>(email: S) -> Result<String, TypeConstraintError> {
    let normalized = email.into().trim().to_lowercase();
    if normalized.validate_email() {
        Ok(normalized)
    } else {
        Err(TypeConstraintError::InvalidEmail)
    }
}

/// Trims the value and checks its character count against the text bounds.
fn bounded_text<S: Into<String>>(value: S) -> Result<String, TypeConstraintError> {
    let trimmed = value.into().trim().to_string();
    if trimmed.is_empty() {
        return Err(TypeConstraintError::EmptyString);
    }
    let len = trimmed.chars().count();
    if !(MIN_TEXT_LEN..=MAX_TEXT_LEN).contains(&len) {
        return Err(TypeConstraintError::InvalidLength {
            min: MIN_TEXT_LEN,
            max: MAX_TEXT_LEN,
        });
    }
    Ok(trimmed)
}

/// Macro to generate lightweight newtypes for positive identifiers.
macro_rules! id_newtype {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(try_from = "i64", into = "i64")]
        pub struct $name(i64);

        impl $name {
            /// Creates a new identifier ensuring it is greater than zero.
            pub fn new(value: i64) -> Result<Self, TypeConstraintError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::NonPositiveId)
                }
            }

            /// Returns the raw `i64` backing this identifier.
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<i64> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

id_newtype!(StudentId, "Unique identifier for a student record.");
id_newtype!(UserId, "Unique identifier for an application user.");

/// Lower-cased and validated email address.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Validates and normalizes an email string.
    pub fn new<S: Into<String>>(email: S) -> Result<Self, TypeConstraintError> {
        let normalized = normalize_email(email)?;
        Ok(Self(normalized))
    }

    /// Borrow the email as a `&str`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert into the owned inner `String`.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for Email {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Email {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

macro_rules! bounded_text_newtype {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Constructs a trimmed value within the text length bounds.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                Ok(Self(bounded_text(value)?))
            }

            /// Borrow the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the owned string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Deref for $name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

bounded_text_newtype!(PersonName, "Student or user display name.");
bounded_text_newtype!(CourseName, "Course a student is enrolled in.");
bounded_text_newtype!(CityName, "City a student lives in.");

/// Student age in whole years.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "i64", into = "i64")]
pub struct Age(u8);

impl Age {
    /// Accepts ages within the configured bounds.
    pub fn new(value: i64) -> Result<Self, TypeConstraintError> {
        u8::try_from(value)
            .ok()
            .filter(|age| (MIN_AGE..=MAX_AGE).contains(age))
            .map(Self)
            .ok_or(TypeConstraintError::InvalidAge)
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl Display for Age {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Age {
    type Error = TypeConstraintError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Age> for i64 {
    fn from(value: Age) -> Self {
        i64::from(value.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_must_be_positive() {
        assert_eq!(StudentId::new(0), Err(TypeConstraintError::NonPositiveId));
        assert_eq!(UserId::new(-3), Err(TypeConstraintError::NonPositiveId));
        assert_eq!(StudentId::new(7).map(StudentId::get), Ok(7));
    }

    #[test]
    fn email_is_trimmed_and_lowercased() {
        let email = Email::new("  Alice@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "alice@example.com");
        assert_eq!(Email::new("not-an-email"), Err(TypeConstraintError::InvalidEmail));
    }

    #[test]
    fn text_bounds_are_enforced() {
        assert_eq!(CourseName::new("   "), Err(TypeConstraintError::EmptyString));
        assert!(matches!(
            CityName::new("X"),
            Err(TypeConstraintError::InvalidLength { min: 2, max: 100 })
        ));
        assert!(PersonName::new("a".repeat(101)).is_err());
        assert_eq!(PersonName::new("  Bo ").unwrap().as_str(), "Bo");
    }

    #[test]
    fn age_range_is_enforced() {
        assert_eq!(Age::new(0), Err(TypeConstraintError::InvalidAge));
        assert_eq!(Age::new(151), Err(TypeConstraintError::InvalidAge));
        assert_eq!(Age::new(300), Err(TypeConstraintError::InvalidAge));
        assert_eq!(Age::new(21).map(Age::get), Ok(21));
    }

    #[test]
    fn constrained_types_reject_invalid_json() {
        assert!(serde_json::from_str::<Age>("0").is_err());
        assert!(serde_json::from_str::<Email>("\"nope\"").is_err());
        let name: PersonName = serde_json::from_str("\" Ann \"").unwrap();
        assert_eq!(name.as_str(), "Ann");
    }
}
