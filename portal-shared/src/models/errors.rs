use crate::validation::ValidationErrors;
use thiserror::Error;

/// Failure talking to a hosted collaborator.
///
/// Surfaced as a generic retry prompt; nothing retries automatically.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteFailure {
    /// The service could not be reached or answered with a server error.
    #[error("service unavailable: {message}")]
    Unavailable { message: String },

    /// The credentials attached to the request were rejected.
    #[error("request was not authorized")]
    Unauthorized,

    /// The service answered but the payload could not be understood.
    #[error("unexpected response: {message}")]
    Decode { message: String },

    /// The identity provider never reported the initial session state.
    #[error("session check timed out after {millis} ms")]
    Timeout { millis: u64 },
}

impl RemoteFailure {
    /// Create an unavailable error from anything displayable.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Create a decode error from anything displayable.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Authentication failures, always recovered locally with an inline message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("too many attempts")]
    TooManyAttempts,

    #[error("email address has not been verified")]
    EmailNotVerified,

    #[error("no account exists for this email")]
    UserNotFound,

    #[error("email is already registered")]
    EmailAlreadyRegistered,

    #[error(transparent)]
    Remote(#[from] RemoteFailure),
}

/// Authenticated, but not allowed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// The identity exists but has no `users` document; fatal for the session.
    #[error("no profile exists for account {uid}")]
    ProfileMissing { uid: String },

    #[error("administrator role required")]
    AdminRequired,

    /// Admins may not demote or delete their own account.
    #[error("operation not permitted on your own account")]
    SelfModification,
}

/// Every failure a portal operation can surface to a view.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PortalError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Remote(#[from] RemoteFailure),
}

/// Result alias for portal operations.
pub type PortalResult<T> = Result<T, PortalError>;

impl AuthError {
    /// Human readable message shown next to the login and registration forms.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "Incorrect email or password.",
            Self::TooManyAttempts => "Too many attempts. Please try again later.",
            Self::EmailNotVerified => "Please verify your email before logging in.",
            Self::UserNotFound => "No account found with this email.",
            Self::EmailAlreadyRegistered => "This email is already registered.",
            Self::Remote(failure) => failure.user_message(),
        }
    }
}

impl AccessError {
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::ProfileMissing { .. } => {
                "Access denied. Your account has no portal profile; contact an administrator."
            }
            Self::AdminRequired => "Only administrators can do that.",
            Self::SelfModification => "You cannot demote or delete your own account.",
        }
    }
}

impl RemoteFailure {
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => {
                "The sign-in service is not responding. Reload the page to try again."
            }
            Self::Unauthorized => "Your session has expired. Please sign in again.",
            Self::Unavailable { .. } | Self::Decode { .. } => {
                "Something went wrong. Please try again."
            }
        }
    }
}

impl PortalError {
    /// Message for an inline notice.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Auth(err) => err.user_message().to_string(),
            Self::Access(err) => err.user_message().to_string(),
            Self::Validation(errors) => errors.to_string(),
            Self::Remote(err) => err.user_message().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{FieldName, Rule, ValidationError};

    #[test]
    fn auth_error_wraps_remote_failure() {
        let err: AuthError = RemoteFailure::Unauthorized.into();
        assert_eq!(err, AuthError::Remote(RemoteFailure::Unauthorized));
        assert_eq!(
            err.user_message(),
            RemoteFailure::Unauthorized.user_message()
        );
    }

    #[test]
    fn portal_error_messages_are_human_readable() {
        let err = PortalError::from(AuthError::InvalidCredentials);
        assert_eq!(err.user_message(), "Incorrect email or password.");

        let err = PortalError::from(AccessError::ProfileMissing {
            uid: "u1".to_string(),
        });
        assert!(err.user_message().starts_with("Access denied"));

        let err = PortalError::from(RemoteFailure::unavailable("boom"));
        assert!(!err.user_message().contains("boom"));
    }

    #[test]
    fn validation_errors_display_lists_fields() {
        let errors = ValidationErrors::from(vec![ValidationError::new(
            FieldName::ConfirmPassword,
            Rule::Mismatch,
        )]);
        let err = PortalError::from(errors);
        assert!(err.user_message().contains("confirmPassword"));
    }

    #[test]
    fn remote_failure_display_includes_details() {
        let failure = RemoteFailure::Timeout { millis: 250 };
        assert_eq!(failure.to_string(), "session check timed out after 250 ms");
        assert_eq!(
            RemoteFailure::decode("missing field").to_string(),
            "unexpected response: missing field"
        );
    }
}
