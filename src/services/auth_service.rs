//! Domain service for authentication, onboarding and the user profile.
//!
//! The gate decides whether a caller may reach a view: public views are
//! always open, the setup view needs a login, and everything else also
//! needs onboarding to be complete.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{ProfilePatch, Session, SetupForm};
use crate::services::validation::ValidationError;
use crate::store::StoreError;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not logged in")]
    NotLoggedIn,

    #[error("Session expired, please log in again")]
    SessionExpired,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<ValidationError> for AuthError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// QR landing page and login form.
    Public,
    /// Onboarding form.
    Setup,
    /// Dashboard and everything behind it.
    Protected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    RedirectToLogin,
    RedirectToSetup,
}

#[must_use]
pub const fn check_access(session: Option<&Session>, setup_complete: bool, view: View) -> Access {
    match (view, session) {
        (View::Public, _) => Access::Granted,
        (_, None) => Access::RedirectToLogin,
        (View::Setup, Some(_)) => Access::Granted,
        (View::Protected, Some(_)) if setup_complete => Access::Granted,
        (View::Protected, Some(_)) => Access::RedirectToSetup,
    }
}

/// Domain service trait for authentication.
#[async_trait]
pub trait SessionGate: Send + Sync {
    /// The stored session, if someone is logged in.
    async fn current_session(&self) -> Result<Option<Session>, AuthError>;

    /// Verifies credentials and stores the new session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if login fails; any
    /// previously stored session is left as it was.
    async fn login(&self, username: &str, password: &str) -> Result<Session, AuthError>;

    async fn logout(&self) -> Result<(), AuthError>;

    async fn is_setup_complete(&self) -> Result<bool, AuthError>;

    async fn set_setup_complete(&self, complete: bool) -> Result<(), AuthError>;

    /// Applies `patch` to the session user and stores the result.
    async fn update_profile(
        &self,
        session: &Session,
        patch: ProfilePatch,
    ) -> Result<Session, AuthError>;

    /// Re-reads the session user from its source of truth. Local sessions
    /// are already current.
    async fn refresh(&self, session: &Session) -> Result<Session, AuthError> {
        Ok(session.clone())
    }

    /// Saves the onboarding form and marks setup complete.
    async fn complete_setup(&self, session: &Session, form: SetupForm) -> Result<Session, AuthError> {
        let updated = self.update_profile(session, form.into()).await?;
        self.set_setup_complete(true).await?;
        Ok(updated)
    }

    /// Session for a view that needs one (`Setup` or `Protected`).
    ///
    /// # Errors
    ///
    /// [`AuthError::NotLoggedIn`] without a session, [`AuthError::Validation`]
    /// when onboarding is still pending.
    async fn require(&self, view: View) -> Result<Session, AuthError> {
        let session = self.current_session().await?;
        let setup_complete = self.is_setup_complete().await?;

        match check_access(session.as_ref(), setup_complete, view) {
            Access::Granted => session.ok_or(AuthError::NotLoggedIn),
            Access::RedirectToLogin => Err(AuthError::NotLoggedIn),
            Access::RedirectToSetup => Err(AuthError::Validation(
                "setup is not complete, run `hivekeep setup` first".to_string(),
            )),
        }
    }
}
