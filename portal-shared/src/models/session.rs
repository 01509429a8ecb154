use serde::{Deserialize, Serialize};

/// Authenticated identity handle issued by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    /// Opaque handle generated when the credential exchange succeeded.
    pub session_id: String,
    /// Identity uid; also the key of the profile document.
    pub uid: String,
    pub email: String,
    pub email_verified: bool,
    /// Bearer credential for document store requests.
    #[serde(default)]
    pub id_token: String,
    #[serde(default)]
    pub refresh_token: String,
}

impl Session {
    /// Lifecycle stage implied by the session's own flags.
    #[must_use]
    pub fn lifecycle(&self) -> SessionLifecycle {
        if self.email_verified {
            SessionLifecycle::Active
        } else {
            SessionLifecycle::PendingVerification
        }
    }
}

/// Where a browser session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionLifecycle {
    #[default]
    Anonymous,
    PendingVerification,
    Active,
    Terminated,
}

impl SessionLifecycle {
    /// Next stage after the provider reported `session`.
    #[must_use]
    pub fn advance(self, session: Option<&Session>) -> Self {
        match (self, session) {
            (_, Some(session)) => session.lifecycle(),
            (Self::Anonymous, None) => Self::Anonymous,
            (_, None) => Self::Terminated,
        }
    }
}

/// Email and password as submitted by the login form.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}
