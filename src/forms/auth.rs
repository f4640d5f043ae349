//! Sign-in and registration forms.

use serde::Deserialize;
use validator::Validate;

use crate::domain::types::{Email, PersonName};
use crate::domain::user::{Credentials, NewUser};
use crate::forms::FormError;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterForm {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 2, max = 100))]
    pub name: String,
    #[validate(length(min = 6, max = 72))]
    pub password: String,
}

impl TryFrom<LoginForm> for Credentials {
    type Error = FormError;

    fn try_from(form: LoginForm) -> Result<Self, Self::Error> {
        form.validate()?;

        Ok(Self {
            email: Email::new(form.email).map_err(|_| FormError::InvalidEmail)?,
            password: form.password,
        })
    }
}

impl TryFrom<RegisterForm> for NewUser {
    type Error = FormError;

    fn try_from(form: RegisterForm) -> Result<Self, Self::Error> {
        form.validate()?;

        if form.password.trim().is_empty() {
            return Err(FormError::InvalidPassword);
        }

        Ok(Self {
            email: Email::new(form.email).map_err(|_| FormError::InvalidEmail)?,
            name: PersonName::new(form.name).map_err(|_| FormError::InvalidName)?,
            password: form.password,
        })
    }
}
