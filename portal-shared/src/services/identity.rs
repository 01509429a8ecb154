use crate::{
    models::{Credentials, Session, errors::AuthError, errors::RemoteFailure},
    session::Subscription,
};
use async_trait::async_trait;
use std::rc::Rc;

/// Callback invoked with the provider's current session on every change.
pub type SessionListener = Rc<dyn Fn(Option<Session>)>;

/// Hosted identity service.
///
/// Implementations report the current state to a new listener once, shortly
/// after [`IdentityProvider::subscribe_session_changes`] returns, and again on
/// every login, logout, token refresh or provider-side invalidation.
#[async_trait(?Send)]
pub trait IdentityProvider {
    /// Exchange credentials for a session.
    ///
    /// # Errors
    /// [`AuthError::InvalidCredentials`], [`AuthError::TooManyAttempts`] or a
    /// remote failure.
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, AuthError>;

    /// # Errors
    /// Returns a [`RemoteFailure`] when the provider cannot be reached.
    async fn sign_out(&self) -> Result<(), RemoteFailure>;

    fn subscribe_session_changes(&self, listener: SessionListener) -> Subscription;

    /// # Errors
    /// [`AuthError::UserNotFound`] when no account uses `email`.
    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError>;

    /// # Errors
    /// Returns an [`AuthError`] when the provider rejects the request.
    async fn send_email_verification(&self, session: &Session) -> Result<(), AuthError>;

    /// Create an account and sign it in.
    ///
    /// # Errors
    /// [`AuthError::EmailAlreadyRegistered`] when the email is taken.
    async fn create_account(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    /// # Errors
    /// Returns an [`AuthError`] when the provider rejects the request.
    async fn update_display_name(&self, session: &Session, name: &str) -> Result<(), AuthError>;
}
