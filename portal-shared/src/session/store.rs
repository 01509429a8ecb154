use super::{
    ListenerRegistry, PreferenceStore, Subscription,
    profile_cache::{ProfileCache, load_profile},
};
use crate::{
    guard::GuardState,
    models::{
        Credentials, Profile, Session, SessionLifecycle,
        errors::{AccessError, AuthError, RemoteFailure},
    },
    services::{DocumentStore, IdentityProvider, KeyValueStore},
};
use futures::{
    FutureExt, StreamExt,
    channel::mpsc::{self, UnboundedReceiver},
};
use std::{cell::RefCell, fmt, rc::Rc};
use tracing::{debug, info, warn};

/// Ordered provider reports, produced by [`SessionStore::mount`].
pub type SessionEvents = UnboundedReceiver<Option<Session>>;

#[derive(Debug, Default)]
struct StoreState {
    session: Option<Session>,
    lifecycle: SessionLifecycle,
    guard: GuardState,
    cache: ProfileCache,
    access_error: Option<AccessError>,
}

struct Inner {
    identity: Rc<dyn IdentityProvider>,
    documents: Rc<dyn DocumentStore>,
    preferences: PreferenceStore,
    state: RefCell<StoreState>,
    listeners: ListenerRegistry<GuardState>,
    provider_subscription: RefCell<Option<Subscription>>,
}

/// Outcome of handing a fetched profile to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Settled {
    Applied,
    Stale,
    Revoked,
}

/// The browser session, its profile and the guard state derived from them.
///
/// Cloning yields another handle to the same store. The provider subscription
/// is the single source of truth: reports are queued by [`SessionStore::mount`]
/// and applied one at a time by [`SessionStore::drive`].
#[derive(Clone)]
pub struct SessionStore {
    inner: Rc<Inner>,
}

impl SessionStore {
    #[must_use]
    pub fn new(
        identity: Rc<dyn IdentityProvider>,
        documents: Rc<dyn DocumentStore>,
        storage: Rc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            inner: Rc::new(Inner {
                identity,
                documents,
                preferences: PreferenceStore::new(storage),
                state: RefCell::new(StoreState::default()),
                listeners: ListenerRegistry::new(),
                provider_subscription: RefCell::new(None),
            }),
        }
    }

    /// Subscribe to the provider and return its reports in order.
    ///
    /// Mounting again drops the previous subscription and returns the guard
    /// to `Checking`, so every mount re-checks instead of trusting earlier
    /// results.
    #[must_use]
    pub fn mount(&self) -> SessionEvents {
        let (sender, receiver) = mpsc::unbounded();
        {
            let mut state = self.inner.state.borrow_mut();
            state.cache.advance();
        }
        self.set_guard(GuardState::Checking);

        let previous = self.inner.provider_subscription.borrow_mut().take();
        drop(previous);

        let subscription = self
            .inner
            .identity
            .subscribe_session_changes(Rc::new(move |session| {
                if sender.unbounded_send(session).is_err() {
                    debug!("session events receiver dropped");
                }
            }));
        *self.inner.provider_subscription.borrow_mut() = Some(subscription);
        debug!("session store mounted");
        receiver
    }

    /// Detach from the provider. Pending profile fetches are discarded.
    pub fn unmount(&self) {
        let subscription = self.inner.provider_subscription.borrow_mut().take();
        drop(subscription);
        self.inner.state.borrow_mut().cache.advance();
        debug!("session store unmounted");
    }

    /// Apply every report until the stream ends.
    pub async fn drive(&self, mut events: SessionEvents) {
        while let Some(session) = events.next().await {
            self.apply_session_change(session).await;
        }
        debug!("session events stream ended");
    }

    /// Apply reports that are already queued, without waiting for more.
    pub async fn process_pending(&self, events: &mut SessionEvents) -> usize {
        let mut processed = 0;
        while let Some(Some(session)) = events.next().now_or_never() {
            self.apply_session_change(session).await;
            processed += 1;
        }
        processed
    }

    /// Fold one provider report into the store.
    pub async fn apply_session_change(&self, session: Option<Session>) {
        let (epoch, next_guard, ended) = {
            let mut state = self.inner.state.borrow_mut();
            let same_account = matches!(
                (&state.session, &session),
                (Some(old), Some(new)) if old.uid == new.uid
            );
            let epoch = if same_account {
                state.cache.advance()
            } else {
                state.cache.clear()
            };
            let was_signed_in = state.session.is_some();
            state.lifecycle = state.lifecycle.advance(session.as_ref());
            state.session.clone_from(&session);
            let next_guard = state.guard.on_session(session.as_ref());
            (epoch, next_guard, was_signed_in && session.is_none())
        };

        info!(
            signed_in = session.is_some(),
            verified = session.as_ref().is_some_and(|s| s.email_verified),
            "session changed"
        );
        if ended {
            self.inner.preferences.clear_session_scoped();
        }
        self.set_guard(next_guard);

        let Some(session) = session.filter(|session| session.email_verified) else {
            return;
        };

        match load_profile(self.inner.documents.as_ref(), &session.uid).await {
            Ok(profile) => {
                if self.settle(epoch, &session.uid, profile) == Settled::Revoked {
                    self.revoke(&session.uid).await;
                }
            }
            Err(failure) => {
                if self.inner.state.borrow().cache.epoch() == epoch {
                    warn!(error = %failure, "profile fetch failed");
                    self.set_guard(GuardState::Unavailable(failure));
                }
            }
        }
    }

    #[must_use]
    pub fn current_session(&self) -> Option<Session> {
        self.inner.state.borrow().session.clone()
    }

    #[must_use]
    pub fn current_profile(&self) -> Option<Profile> {
        self.inner.state.borrow().cache.get().cloned()
    }

    #[must_use]
    pub fn guard_state(&self) -> GuardState {
        self.inner.state.borrow().guard.clone()
    }

    #[must_use]
    pub fn lifecycle(&self) -> SessionLifecycle {
        self.inner.state.borrow().lifecycle
    }

    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.inner.state.borrow().cache.epoch()
    }

    /// The access error raised by the last revocation, if not yet shown.
    #[must_use]
    pub fn take_access_error(&self) -> Option<AccessError> {
        self.inner.state.borrow_mut().access_error.take()
    }

    /// Invoke `listener` on every guard state change.
    pub fn subscribe(&self, listener: impl Fn(&GuardState) + 'static) -> Subscription {
        self.inner.listeners.subscribe(listener)
    }

    #[must_use]
    pub fn preferences(&self) -> &PreferenceStore {
        &self.inner.preferences
    }

    #[must_use]
    pub fn identity(&self) -> Rc<dyn IdentityProvider> {
        Rc::clone(&self.inner.identity)
    }

    #[must_use]
    pub fn documents(&self) -> Rc<dyn DocumentStore> {
        Rc::clone(&self.inner.documents)
    }

    /// Re-fetch the profile of the current session.
    ///
    /// Not-found resolves to `None` and revokes access like a session
    /// change would. A failure is returned to the caller and leaves the
    /// guard as it was.
    ///
    /// # Errors
    /// Returns a [`RemoteFailure`] when the document store fails.
    pub async fn refresh_profile(&self) -> Result<Option<Profile>, RemoteFailure> {
        let (uid, epoch) = {
            let state = self.inner.state.borrow();
            match &state.session {
                Some(session) => (session.uid.clone(), state.cache.epoch()),
                None => return Ok(None),
            }
        };

        let profile = load_profile(self.inner.documents.as_ref(), &uid).await?;
        if self.settle(epoch, &uid, profile.clone()) == Settled::Revoked {
            self.revoke(&uid).await;
        }
        Ok(profile)
    }

    /// Sign in through the provider.
    ///
    /// The new session reaches the store through the provider subscription.
    ///
    /// # Errors
    /// [`AuthError::EmailNotVerified`] when the account has not confirmed its
    /// email; the session stays open so a verification mail can be resent.
    /// Provider errors otherwise.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        let session = self.inner.identity.sign_in(credentials).await?;
        if session.email_verified {
            info!(uid = %session.uid, "signed in");
            Ok(session)
        } else {
            info!(uid = %session.uid, "signed in without verified email");
            Err(AuthError::EmailNotVerified)
        }
    }

    /// Resend the verification mail for the current session.
    ///
    /// # Errors
    /// [`AuthError::UserNotFound`] without a session; provider errors
    /// otherwise.
    pub async fn send_verification(&self) -> Result<(), AuthError> {
        let session = self.current_session().ok_or(AuthError::UserNotFound)?;
        self.inner.identity.send_email_verification(&session).await
    }

    /// End the session locally, then with the provider.
    ///
    /// Locally the guard is `Unauthenticated`, the profile cache and the
    /// session-scoped preferences are cleared before the provider is called,
    /// so nothing protected renders while sign-out is in flight.
    ///
    /// # Errors
    /// Returns a [`RemoteFailure`] when the provider could not be told.
    pub async fn logout(&self) -> Result<(), RemoteFailure> {
        self.end_locally();
        info!("logged out");
        self.inner.identity.sign_out().await
    }

    /// Give up on the initial check after `millis`.
    pub fn check_timed_out(&self, millis: u64) {
        let next = self.inner.state.borrow().guard.on_timeout(millis);
        if matches!(next, GuardState::Unavailable(_)) {
            warn!(millis, "session check timed out");
        }
        self.set_guard(next);
    }

    fn settle(&self, epoch: u64, uid: &str, profile: Option<Profile>) -> Settled {
        let next = {
            let mut state = self.inner.state.borrow_mut();
            if !state.cache.resolve(epoch, profile.clone()) {
                return Settled::Stale;
            }
            GuardState::on_profile(profile)
        };
        let revoked = next == GuardState::AuthenticatedNoProfile;
        if revoked {
            warn!(uid, "no profile for verified account, revoking access");
            self.inner.state.borrow_mut().access_error = Some(AccessError::ProfileMissing {
                uid: uid.to_string(),
            });
        } else {
            debug!(uid, "profile loaded");
        }
        self.set_guard(next);
        if revoked {
            Settled::Revoked
        } else {
            Settled::Applied
        }
    }

    async fn revoke(&self, uid: &str) {
        self.end_locally();
        if let Err(err) = self.inner.identity.sign_out().await {
            warn!(uid, error = %err, "sign-out after revocation failed");
        }
    }

    fn end_locally(&self) {
        {
            let mut state = self.inner.state.borrow_mut();
            state.session = None;
            state.lifecycle = state.lifecycle.advance(None);
            state.cache.clear();
        }
        self.inner.preferences.clear_session_scoped();
        self.set_guard(GuardState::Unauthenticated);
    }

    fn set_guard(&self, next: GuardState) {
        let changed = {
            let mut state = self.inner.state.borrow_mut();
            if state.guard == next {
                false
            } else {
                debug!(from = ?state.guard, to = ?next, "guard transition");
                state.guard = next.clone();
                true
            }
        };
        if changed {
            self.inner.listeners.notify(&next);
        }
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &self.inner.state.borrow())
            .field("listeners", &self.inner.listeners.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        guard::{Access, Decision, decide},
        models::{Role, UiPreferences, profile::USERS_COLLECTION},
        services::{
            Document, Fields, Query,
            memory::{MemoryDocumentStore, MemoryIdentityProvider, MemoryKeyValueStore},
        },
        session::preferences::THEME_KEY,
    };
    use async_trait::async_trait;
    use futures::channel::oneshot;
    use serde_json::json;

    struct Harness {
        identity: Rc<MemoryIdentityProvider>,
        documents: Rc<MemoryDocumentStore>,
        storage: Rc<MemoryKeyValueStore>,
        store: SessionStore,
    }

    fn harness(identity: MemoryIdentityProvider) -> Harness {
        let identity = Rc::new(identity);
        let documents = Rc::new(MemoryDocumentStore::new());
        let storage = Rc::new(MemoryKeyValueStore::new());
        let store = SessionStore::new(identity.clone(), documents.clone(), storage.clone());
        Harness {
            identity,
            documents,
            storage,
            store,
        }
    }

    fn seed_profile(documents: &MemoryDocumentStore, uid: &str, role: &str) {
        documents.seed(
            USERS_COLLECTION,
            uid,
            json!({
                "uid": uid,
                "name": format!("Person {uid}"),
                "email": format!("{uid}@example.com"),
                "role": role,
                "wireSign": "AB",
                "contact": "09171234567"
            }),
        );
    }

    fn credentials(email: &str) -> Credentials {
        Credentials {
            email: email.to_string(),
            password: "password123".to_string(),
        }
    }

    #[tokio::test]
    async fn starts_checking_then_unauthenticated() {
        let h = harness(MemoryIdentityProvider::new());
        assert_eq!(h.store.guard_state(), GuardState::Checking);

        let mut events = h.store.mount();
        assert_eq!(
            decide(&h.store.guard_state(), Access::Protected),
            Decision::Loading
        );
        h.store.process_pending(&mut events).await;

        assert_eq!(h.store.guard_state(), GuardState::Unauthenticated);
        assert_eq!(
            decide(&h.store.guard_state(), Access::Protected),
            Decision::RedirectLogin
        );
    }

    #[tokio::test]
    async fn verified_sign_in_with_profile_becomes_active() {
        let h = harness(MemoryIdentityProvider::new());
        h.identity
            .add_account("u1", "u1@example.com", "password123", true);
        seed_profile(&h.documents, "u1", "Employee");
        let mut events = h.store.mount();
        h.store.process_pending(&mut events).await;

        let session = h.store.sign_in(&credentials("u1@example.com")).await.unwrap();
        h.store.process_pending(&mut events).await;

        assert_eq!(h.store.current_session(), Some(session));
        assert_eq!(h.store.lifecycle(), SessionLifecycle::Active);
        let profile = h.store.current_profile().unwrap();
        assert_eq!(profile.role, Role::Employee);
        assert_eq!(h.store.guard_state(), GuardState::AuthenticatedActive(profile));
    }

    #[tokio::test]
    async fn unverified_sign_in_is_reported_and_can_resend() {
        let h = harness(MemoryIdentityProvider::new());
        h.identity
            .add_account("u1", "u1@example.com", "password123", false);
        let mut events = h.store.mount();

        let err = h
            .store
            .sign_in(&credentials("u1@example.com"))
            .await
            .unwrap_err();
        h.store.process_pending(&mut events).await;

        assert_eq!(err, AuthError::EmailNotVerified);
        assert_eq!(h.store.guard_state(), GuardState::AuthenticatedUnverified);
        assert_eq!(h.documents.reads(), 0);

        h.store.send_verification().await.unwrap();
        assert_eq!(h.identity.verifications_sent(), vec!["u1@example.com"]);
    }

    #[tokio::test]
    async fn missing_profile_signs_out_and_surfaces_access_error() {
        let h = harness(MemoryIdentityProvider::new());
        h.identity
            .add_account("u1", "u1@example.com", "password123", true);
        let mut events = h.store.mount();

        h.store.sign_in(&credentials("u1@example.com")).await.unwrap();
        h.store.process_pending(&mut events).await;

        assert_eq!(h.store.guard_state(), GuardState::Unauthenticated);
        assert_eq!(h.identity.current(), None);
        assert_eq!(
            h.store.take_access_error(),
            Some(AccessError::ProfileMissing {
                uid: "u1".to_string()
            })
        );
        assert_eq!(h.store.take_access_error(), None);
    }

    #[tokio::test]
    async fn profile_fetch_failure_makes_guard_unavailable() {
        let h = harness(MemoryIdentityProvider::new());
        h.identity
            .add_account("u1", "u1@example.com", "password123", true);
        h.documents
            .fail_with(Some(RemoteFailure::unavailable("offline")));
        let mut events = h.store.mount();

        h.store.sign_in(&credentials("u1@example.com")).await.unwrap();
        h.store.process_pending(&mut events).await;

        assert_eq!(
            h.store.guard_state(),
            GuardState::Unavailable(RemoteFailure::unavailable("offline"))
        );
        assert_eq!(h.documents.reads(), 1);
    }

    #[tokio::test]
    async fn logout_clears_session_scoped_state_but_keeps_theme() {
        let h = harness(MemoryIdentityProvider::new());
        h.identity
            .add_account("u1", "u1@example.com", "password123", true);
        h.identity
            .add_account("u2", "u2@example.com", "password123", true);
        seed_profile(&h.documents, "u1", "User");
        seed_profile(&h.documents, "u2", "User");
        let mut events = h.store.mount();

        h.store.sign_in(&credentials("u1@example.com")).await.unwrap();
        h.store.process_pending(&mut events).await;
        h.store.preferences().save(&UiPreferences {
            sidebar_collapsed: true,
            directory_search_term: "zz".to_string(),
            ..UiPreferences::default()
        });
        h.store.preferences().set_theme(crate::models::Theme::Dark);

        h.store.logout().await.unwrap();
        assert_eq!(h.store.guard_state(), GuardState::Unauthenticated);
        assert_eq!(h.store.current_profile(), None);
        h.store.process_pending(&mut events).await;

        h.store.sign_in(&credentials("u2@example.com")).await.unwrap();
        h.store.process_pending(&mut events).await;

        assert_eq!(h.store.current_profile().unwrap().uid, "u2");
        assert_eq!(h.store.preferences().load(), UiPreferences::default());
        assert_eq!(h.storage.keys(), vec![THEME_KEY.to_string()]);
    }

    /// Holds the first profile read until released.
    struct GatedDocuments {
        inner: MemoryDocumentStore,
        gate: RefCell<Option<oneshot::Receiver<()>>>,
    }

    #[async_trait(?Send)]
    impl DocumentStore for GatedDocuments {
        async fn get_document(
            &self,
            collection: &str,
            id: &str,
        ) -> Result<Option<Document>, RemoteFailure> {
            let gate = self.gate.borrow_mut().take();
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            self.inner.get_document(collection, id).await
        }

        async fn set_document(
            &self,
            collection: &str,
            id: &str,
            fields: Fields,
        ) -> Result<(), RemoteFailure> {
            self.inner.set_document(collection, id, fields).await
        }

        async fn update_document(
            &self,
            collection: &str,
            id: &str,
            fields: Fields,
        ) -> Result<(), RemoteFailure> {
            self.inner.update_document(collection, id, fields).await
        }

        async fn add_document(
            &self,
            collection: &str,
            fields: Fields,
        ) -> Result<String, RemoteFailure> {
            self.inner.add_document(collection, fields).await
        }

        async fn delete_document(&self, collection: &str, id: &str) -> Result<(), RemoteFailure> {
            self.inner.delete_document(collection, id).await
        }

        async fn query_collection(
            &self,
            collection: &str,
            query: &Query,
        ) -> Result<Vec<Document>, RemoteFailure> {
            self.inner.query_collection(collection, query).await
        }
    }

    #[tokio::test]
    async fn logout_discards_profile_fetch_started_before_it() {
        let identity = Rc::new(MemoryIdentityProvider::new());
        identity.add_account("u1", "u1@example.com", "password123", true);
        let (release, gate) = oneshot::channel();
        let documents = Rc::new(GatedDocuments {
            inner: MemoryDocumentStore::new(),
            gate: RefCell::new(Some(gate)),
        });
        seed_profile(&documents.inner, "u1", "Admin");
        let store = SessionStore::new(
            identity.clone(),
            documents.clone(),
            Rc::new(MemoryKeyValueStore::new()),
        );
        let mut events = store.mount();
        store.sign_in(&credentials("u1@example.com")).await.unwrap();

        let processing = store.process_pending(&mut events);
        futures::pin_mut!(processing);
        assert!(processing.as_mut().now_or_never().is_none());
        assert_eq!(store.guard_state(), GuardState::Checking);

        store.logout().await.unwrap();
        release.send(()).unwrap();
        processing.await;

        assert_eq!(store.guard_state(), GuardState::Unauthenticated);
        assert_eq!(store.current_profile(), None);
        assert!(!store.guard_state().is_admin());
    }

    #[tokio::test]
    async fn stale_fetch_does_not_update_shared_state() {
        let h = harness(MemoryIdentityProvider::new());
        h.identity
            .add_account("u1", "u1@example.com", "password123", true);
        seed_profile(&h.documents, "u1", "User");
        let mut events = h.store.mount();
        h.store.sign_in(&credentials("u1@example.com")).await.unwrap();
        h.store.process_pending(&mut events).await;

        let epoch = h.store.epoch();
        h.store.logout().await.unwrap();
        assert!(h.store.epoch() > epoch);

        let outcome = h.store.settle(epoch, "u1", h.store.current_profile());
        assert_eq!(outcome, Settled::Stale);
        assert_eq!(h.store.guard_state(), GuardState::Unauthenticated);
    }

    #[tokio::test]
    async fn provider_invalidation_clears_preferences() {
        let h = harness(MemoryIdentityProvider::new());
        h.identity
            .add_account("u1", "u1@example.com", "password123", true);
        seed_profile(&h.documents, "u1", "User");
        let mut events = h.store.mount();
        h.store.sign_in(&credentials("u1@example.com")).await.unwrap();
        h.store.process_pending(&mut events).await;
        h.store.preferences().save(&UiPreferences {
            directory_search_term: "ab".to_string(),
            ..UiPreferences::default()
        });

        h.identity.invalidate();
        h.store.process_pending(&mut events).await;

        assert_eq!(h.store.guard_state(), GuardState::Unauthenticated);
        assert_eq!(h.store.lifecycle(), SessionLifecycle::Terminated);
        assert!(h.storage.keys().is_empty());
    }

    #[tokio::test]
    async fn token_refresh_keeps_active_state_without_flicker() {
        let h = harness(MemoryIdentityProvider::new());
        h.identity
            .add_account("u1", "u1@example.com", "password123", true);
        seed_profile(&h.documents, "u1", "User");
        let mut events = h.store.mount();
        h.store.sign_in(&credentials("u1@example.com")).await.unwrap();
        h.store.process_pending(&mut events).await;

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _subscription = h
            .store
            .subscribe(move |state| sink.borrow_mut().push(state.clone()));

        h.identity.refresh_token();
        h.store.process_pending(&mut events).await;

        assert!(h.store.guard_state().is_active());
        assert!(seen.borrow().is_empty());
    }

    #[tokio::test]
    async fn refresh_profile_picks_up_remote_changes() {
        let h = harness(MemoryIdentityProvider::new());
        h.identity
            .add_account("u1", "u1@example.com", "password123", true);
        seed_profile(&h.documents, "u1", "User");
        let mut events = h.store.mount();
        h.store.sign_in(&credentials("u1@example.com")).await.unwrap();
        h.store.process_pending(&mut events).await;

        seed_profile(&h.documents, "u1", "Admin");
        let refreshed = h.store.refresh_profile().await.unwrap().unwrap();

        assert_eq!(refreshed.role, Role::Admin);
        assert!(h.store.guard_state().is_admin());
    }

    #[tokio::test]
    async fn refresh_profile_propagates_failure_and_keeps_guard() {
        let h = harness(MemoryIdentityProvider::new());
        h.identity
            .add_account("u1", "u1@example.com", "password123", true);
        seed_profile(&h.documents, "u1", "User");
        let mut events = h.store.mount();
        h.store.sign_in(&credentials("u1@example.com")).await.unwrap();
        h.store.process_pending(&mut events).await;

        h.documents
            .fail_with(Some(RemoteFailure::unavailable("offline")));
        let err = h.store.refresh_profile().await.unwrap_err();

        assert_eq!(err, RemoteFailure::unavailable("offline"));
        assert!(h.store.guard_state().is_active());
    }

    #[tokio::test]
    async fn unresponsive_provider_times_out() {
        let h = harness(MemoryIdentityProvider::unresponsive());
        let mut events = h.store.mount();
        assert_eq!(h.store.process_pending(&mut events).await, 0);

        h.store.check_timed_out(10_000);
        assert_eq!(
            h.store.guard_state(),
            GuardState::Unavailable(RemoteFailure::Timeout { millis: 10_000 })
        );
    }

    #[tokio::test]
    async fn timeout_after_first_report_is_ignored() {
        let h = harness(MemoryIdentityProvider::new());
        let mut events = h.store.mount();
        h.store.process_pending(&mut events).await;
        h.store.check_timed_out(10_000);
        assert_eq!(h.store.guard_state(), GuardState::Unauthenticated);
    }

    #[tokio::test]
    async fn remount_rechecks_and_unmount_detaches() {
        let h = harness(MemoryIdentityProvider::new());
        let mut events = h.store.mount();
        h.store.process_pending(&mut events).await;
        assert_eq!(h.store.guard_state(), GuardState::Unauthenticated);

        let mut events = h.store.mount();
        assert_eq!(h.store.guard_state(), GuardState::Checking);
        h.store.process_pending(&mut events).await;
        assert_eq!(h.store.guard_state(), GuardState::Unauthenticated);

        h.store.unmount();
        h.identity.invalidate();
        assert_eq!(h.store.process_pending(&mut events).await, 0);
    }
}
