//! # Route guard
//!
//! Decides what the visitor may see from the session store's state. The
//! state only ever moves through the transitions below, and [`decide`] is the
//! single place a view's access level is checked.
//!
//! ```text
//! Checking --no session-----------------> Unauthenticated
//! Checking/Unauthenticated --unverified-> AuthenticatedUnverified
//! (verified, profile pending) ----------> Checking
//! (verified, profile absent) -----------> AuthenticatedNoProfile
//! (verified, profile present) ----------> AuthenticatedActive
//! Authenticated* --logout/invalidated---> Unauthenticated
//! Checking --timeout--------------------> Unavailable
//! ```

use crate::models::{Profile, Session, errors::RemoteFailure};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GuardState {
    /// Waiting for the provider's first report or for the profile fetch.
    #[default]
    Checking,
    Unauthenticated,
    AuthenticatedUnverified,
    /// Verified, but the `users` document is gone. The store signs the
    /// account out as soon as it enters this state.
    AuthenticatedNoProfile,
    AuthenticatedActive(Profile),
    /// The session check could not complete.
    Unavailable(RemoteFailure),
}

impl GuardState {
    /// State after the provider reported `session`.
    ///
    /// A verified session waits in `Checking` for its profile, except when
    /// the same account is already active (a token refresh).
    #[must_use]
    pub fn on_session(&self, session: Option<&Session>) -> Self {
        match session {
            None => Self::Unauthenticated,
            Some(session) if !session.email_verified => Self::AuthenticatedUnverified,
            Some(session) => match self {
                Self::AuthenticatedActive(profile) if profile.uid == session.uid => self.clone(),
                _ => Self::Checking,
            },
        }
    }

    #[must_use]
    pub fn on_profile(profile: Option<Profile>) -> Self {
        profile.map_or(Self::AuthenticatedNoProfile, Self::AuthenticatedActive)
    }

    /// Bounded wait: only `Checking` gives up.
    #[must_use]
    pub fn on_timeout(&self, millis: u64) -> Self {
        match self {
            Self::Checking => Self::Unavailable(RemoteFailure::Timeout { millis }),
            other => other.clone(),
        }
    }

    #[must_use]
    pub fn profile(&self) -> Option<&Profile> {
        match self {
            Self::AuthenticatedActive(profile) => Some(profile),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::AuthenticatedActive(_))
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.profile().is_some_and(|profile| profile.role.is_admin())
    }
}

/// Access level a route declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    Public,
    Protected,
    AdminOnly,
}

/// What the router does with a requested view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Render,
    /// Neutral placeholder. Never protected content, never a redirect.
    Loading,
    RedirectLogin,
    /// Admin-only view requested by a non-admin; go to the dashboard.
    RedirectHome,
    Unavailable(RemoteFailure),
}

#[must_use]
pub fn decide(state: &GuardState, access: Access) -> Decision {
    if access == Access::Public {
        return Decision::Render;
    }
    match state {
        GuardState::Checking => Decision::Loading,
        GuardState::Unavailable(failure) => Decision::Unavailable(failure.clone()),
        GuardState::AuthenticatedActive(profile) => match access {
            Access::AdminOnly if !profile.role.is_admin() => Decision::RedirectHome,
            _ => Decision::Render,
        },
        GuardState::Unauthenticated
        | GuardState::AuthenticatedUnverified
        | GuardState::AuthenticatedNoProfile => Decision::RedirectLogin,
    }
}
