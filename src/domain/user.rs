use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{Email, PersonName, UserId};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub created_at: NaiveDateTime,
}

/// Sign-in credentials.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Credentials {
    pub email: Email,
    pub password: String,
}

/// Account registration payload.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct NewUser {
    pub email: Email,
    pub name: PersonName,
    pub password: String,
}

/// Bearer token issued on sign-in.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Signed-in user together with the token that authenticates them.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub token: AccessToken,
    pub user: User,
}
