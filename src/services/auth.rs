//! Session workflows: sign-in, registration, restoring and ending a session.

use crate::domain::user::{AccessToken, Credentials, NewUser, Session, User};
use crate::forms::auth::{LoginForm, RegisterForm};
use crate::repository::AuthProvider;
use crate::services::ServiceResult;

/// Authenticates the user, installs the token and loads their profile.
///
/// A token whose profile cannot be loaded is discarded again.
pub async fn login<A>(auth: &A, form: LoginForm) -> ServiceResult<Session>
where
    A: AuthProvider + ?Sized,
{
    let credentials = Credentials::try_from(form)?;

    let token = auth.login(&credentials).await.map_err(|err| {
        log::error!("Failed to sign in: {err}");
        err
    })?;
    auth.set_token(Some(token.clone()));

    match auth.current_user().await {
        Ok(user) => Ok(Session { token, user }),
        Err(err) => {
            log::error!("Failed to get user profile: {err}");
            auth.set_token(None);
            Err(err.into())
        }
    }
}

/// Creates an account. The user still has to sign in afterwards.
pub async fn register<A>(auth: &A, form: RegisterForm) -> ServiceResult<User>
where
    A: AuthProvider + ?Sized,
{
    let new_user = NewUser::try_from(form)?;

    let user = auth.register(&new_user).await.map_err(|err| {
        log::error!("Failed to register: {err}");
        err
    })?;

    Ok(user)
}

/// Re-validates a previously issued token.
///
/// Returns `None` and leaves the provider signed out when the token is no
/// longer accepted or the profile cannot be loaded.
pub async fn restore_session<A>(auth: &A, token: AccessToken) -> Option<Session>
where
    A: AuthProvider + ?Sized,
{
    auth.set_token(Some(token.clone()));

    let verified = match auth.verify_token().await {
        Ok(verification) => verification.valid,
        Err(err) => {
            log::warn!("Token verification failed: {err}");
            false
        }
    };
    if !verified {
        logout(auth);
        return None;
    }

    match auth.current_user().await {
        Ok(user) => Some(Session { token, user }),
        Err(err) => {
            log::warn!("Failed to refresh user: {err}");
            logout(auth);
            None
        }
    }
}

pub fn logout<A>(auth: &A)
where
    A: AuthProvider + ?Sized,
{
    auth.set_token(None);
}
