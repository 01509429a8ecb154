//! In-memory collaborators.
//!
//! Behave like the hosted services closely enough to drive the session
//! store and the account services in tests, and count the calls they see so
//! tests can assert that nothing remote happened.

use super::{
    DocumentStore, Fields, IdentityProvider, KeyValueStore, Query, SessionListener,
    documents::Document,
};
use crate::{
    models::{
        Credentials, Session,
        errors::{AuthError, RemoteFailure},
    },
    session::{ListenerRegistry, Subscription},
};
use async_trait::async_trait;
use serde_json::Value;
use std::{
    cell::{Cell, RefCell},
    collections::{BTreeMap, HashMap},
};
use tracing::debug;
use uuid::Uuid;

/// Failed sign-ins allowed before the provider starts rate limiting.
pub const MAX_FAILED_SIGN_INS: u32 = 5;

#[derive(Debug, Clone)]
struct Account {
    uid: String,
    password: String,
    email_verified: bool,
    display_name: String,
}

/// Identity provider holding accounts in memory.
#[derive(Debug, Default)]
pub struct MemoryIdentityProvider {
    accounts: RefCell<HashMap<String, Account>>,
    current: RefCell<Option<Session>>,
    listeners: ListenerRegistry<Option<Session>>,
    failed_sign_ins: Cell<u32>,
    unresponsive: Cell<bool>,
    failure: RefCell<Option<RemoteFailure>>,
    calls: Cell<usize>,
    next_uid: Cell<u64>,
    password_resets: RefCell<Vec<String>>,
    verifications: RefCell<Vec<String>>,
}

impl MemoryIdentityProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider that never reports the initial session state.
    #[must_use]
    pub fn unresponsive() -> Self {
        let provider = Self::default();
        provider.unresponsive.set(true);
        provider
    }

    pub fn add_account(&self, uid: &str, email: &str, password: &str, email_verified: bool) {
        self.accounts.borrow_mut().insert(
            normalize(email),
            Account {
                uid: uid.to_string(),
                password: password.to_string(),
                email_verified,
                display_name: String::new(),
            },
        );
    }

    /// Fail every subsequent call with `failure`, or stop failing with `None`.
    pub fn fail_with(&self, failure: Option<RemoteFailure>) {
        *self.failure.borrow_mut() = failure;
    }

    /// Mark an account verified and report the refreshed session if it is
    /// the signed-in one.
    pub fn verify_email(&self, email: &str) {
        if let Some(account) = self.accounts.borrow_mut().get_mut(&normalize(email)) {
            account.email_verified = true;
        }
        let refreshed = self.current.borrow_mut().as_mut().and_then(|session| {
            (normalize(&session.email) == normalize(email)).then(|| {
                session.email_verified = true;
                session.clone()
            })
        });
        if let Some(session) = refreshed {
            self.report(Some(session));
        }
    }

    /// Provider-side invalidation, such as a revoked refresh token.
    pub fn invalidate(&self) {
        self.current.borrow_mut().take();
        self.report(None);
    }

    /// Report the current session again, as a token refresh does.
    pub fn refresh_token(&self) {
        let current = self.current.borrow().clone();
        self.report(current);
    }

    #[must_use]
    pub fn current(&self) -> Option<Session> {
        self.current.borrow().clone()
    }

    /// Number of provider calls made so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    #[must_use]
    pub fn password_resets(&self) -> Vec<String> {
        self.password_resets.borrow().clone()
    }

    #[must_use]
    pub fn verifications_sent(&self) -> Vec<String> {
        self.verifications.borrow().clone()
    }

    #[must_use]
    pub fn display_name(&self, email: &str) -> Option<String> {
        self.accounts
            .borrow()
            .get(&normalize(email))
            .map(|account| account.display_name.clone())
    }

    fn begin_call(&self) -> Result<(), RemoteFailure> {
        self.calls.set(self.calls.get() + 1);
        match self.failure.borrow().as_ref() {
            Some(failure) => Err(failure.clone()),
            None => Ok(()),
        }
    }

    fn report(&self, session: Option<Session>) {
        debug!(signed_in = session.is_some(), "memory provider reporting session");
        self.listeners.notify(&session);
    }

    fn open_session(&self, email: &str, account: &Account) -> Session {
        let session = Session {
            session_id: Uuid::new_v4().to_string(),
            uid: account.uid.clone(),
            email: email.to_string(),
            email_verified: account.email_verified,
            id_token: format!("token-{}", account.uid),
            refresh_token: format!("refresh-{}", account.uid),
        };
        *self.current.borrow_mut() = Some(session.clone());
        self.report(Some(session.clone()));
        session
    }
}

#[async_trait(?Send)]
impl IdentityProvider for MemoryIdentityProvider {
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        self.begin_call()?;
        if self.failed_sign_ins.get() >= MAX_FAILED_SIGN_INS {
            return Err(AuthError::TooManyAttempts);
        }

        let email = normalize(&credentials.email);
        let account = self.accounts.borrow().get(&email).cloned();
        match account {
            Some(account) if account.password == credentials.password => {
                self.failed_sign_ins.set(0);
                Ok(self.open_session(&email, &account))
            }
            _ => {
                self.failed_sign_ins.set(self.failed_sign_ins.get() + 1);
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    async fn sign_out(&self) -> Result<(), RemoteFailure> {
        self.begin_call()?;
        let had_session = self.current.borrow_mut().take().is_some();
        if had_session {
            self.report(None);
        }
        Ok(())
    }

    fn subscribe_session_changes(&self, listener: SessionListener) -> Subscription {
        let subscription = self
            .listeners
            .subscribe(move |session: &Option<Session>| listener(session.clone()));
        if !self.unresponsive.get() {
            let current = self.current.borrow().clone();
            self.report(current);
        }
        subscription
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        self.begin_call()?;
        let email = normalize(email);
        if !self.accounts.borrow().contains_key(&email) {
            return Err(AuthError::UserNotFound);
        }
        self.password_resets.borrow_mut().push(email);
        Ok(())
    }

    async fn send_email_verification(&self, session: &Session) -> Result<(), AuthError> {
        self.begin_call()?;
        self.verifications
            .borrow_mut()
            .push(normalize(&session.email));
        Ok(())
    }

    async fn create_account(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        self.begin_call()?;
        let email = normalize(email);
        if self.accounts.borrow().contains_key(&email) {
            return Err(AuthError::EmailAlreadyRegistered);
        }

        let id = self.next_uid.get() + 1;
        self.next_uid.set(id);
        let account = Account {
            uid: format!("uid-{id}"),
            password: password.to_string(),
            email_verified: false,
            display_name: String::new(),
        };
        self.accounts.borrow_mut().insert(email.clone(), account.clone());
        Ok(self.open_session(&email, &account))
    }

    async fn update_display_name(&self, session: &Session, name: &str) -> Result<(), AuthError> {
        self.begin_call()?;
        let mut accounts = self.accounts.borrow_mut();
        let account = accounts
            .get_mut(&normalize(&session.email))
            .ok_or(AuthError::UserNotFound)?;
        account.display_name = name.to_string();
        Ok(())
    }
}

fn normalize(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// Document store holding collections in memory.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RefCell<BTreeMap<String, BTreeMap<String, Fields>>>,
    failure: RefCell<Option<RemoteFailure>>,
    reads: Cell<usize>,
    writes: Cell<usize>,
    next_id: Cell<u64>,
}

impl MemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a document directly, without counting a write.
    ///
    /// Non-object values are ignored.
    pub fn seed(&self, collection: &str, id: &str, value: Value) {
        if let Value::Object(fields) = value {
            self.collections
                .borrow_mut()
                .entry(collection.to_string())
                .or_default()
                .insert(id.to_string(), fields);
        }
    }

    #[must_use]
    pub fn fields(&self, collection: &str, id: &str) -> Option<Fields> {
        self.collections
            .borrow()
            .get(collection)
            .and_then(|documents| documents.get(id))
            .cloned()
    }

    #[must_use]
    pub fn count(&self, collection: &str) -> usize {
        self.collections
            .borrow()
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    /// Fail every subsequent call with `failure`, or stop failing with `None`.
    pub fn fail_with(&self, failure: Option<RemoteFailure>) {
        *self.failure.borrow_mut() = failure;
    }

    #[must_use]
    pub fn reads(&self) -> usize {
        self.reads.get()
    }

    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    #[must_use]
    pub fn remote_calls(&self) -> usize {
        self.reads.get() + self.writes.get()
    }

    fn read(&self) -> Result<(), RemoteFailure> {
        self.reads.set(self.reads.get() + 1);
        self.check()
    }

    fn write(&self) -> Result<(), RemoteFailure> {
        self.writes.set(self.writes.get() + 1);
        self.check()
    }

    fn check(&self) -> Result<(), RemoteFailure> {
        match self.failure.borrow().as_ref() {
            Some(failure) => Err(failure.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait(?Send)]
impl DocumentStore for MemoryDocumentStore {
    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<Document>, RemoteFailure> {
        self.read()?;
        Ok(self
            .fields(collection, id)
            .map(|fields| Document::new(id, fields)))
    }

    async fn set_document(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), RemoteFailure> {
        self.write()?;
        self.collections
            .borrow_mut()
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
        Ok(())
    }

    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<(), RemoteFailure> {
        self.write()?;
        let mut collections = self.collections.borrow_mut();
        let existing = collections
            .get_mut(collection)
            .and_then(|documents| documents.get_mut(id))
            .ok_or_else(|| RemoteFailure::unavailable(format!("{collection}/{id} not found")))?;
        existing.extend(fields);
        Ok(())
    }

    async fn add_document(
        &self,
        collection: &str,
        fields: Fields,
    ) -> Result<String, RemoteFailure> {
        self.write()?;
        let next = self.next_id.get() + 1;
        self.next_id.set(next);
        let id = format!("doc-{next}");
        self.collections
            .borrow_mut()
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), fields);
        Ok(id)
    }

    async fn delete_document(&self, collection: &str, id: &str) -> Result<(), RemoteFailure> {
        self.write()?;
        if let Some(documents) = self.collections.borrow_mut().get_mut(collection) {
            documents.remove(id);
        }
        Ok(())
    }

    async fn query_collection(
        &self,
        collection: &str,
        query: &Query,
    ) -> Result<Vec<Document>, RemoteFailure> {
        self.read()?;
        let documents: Vec<Document> = self
            .collections
            .borrow()
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default();
        Ok(query.apply(documents))
    }
}

/// Local storage stand-in.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    values: RefCell<BTreeMap<String, String>>,
}

impl MemoryKeyValueStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.values.borrow().keys().cloned().collect()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.values.borrow_mut().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::rc::Rc;

    fn credentials(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn sign_in_rate_limits_after_repeated_failures() {
        let provider = MemoryIdentityProvider::new();
        provider.add_account("u1", "a@b.co", "correct-horse", true);

        for _ in 0..MAX_FAILED_SIGN_INS {
            let err = provider
                .sign_in(&credentials("a@b.co", "wrong"))
                .await
                .unwrap_err();
            assert_eq!(err, AuthError::InvalidCredentials);
        }
        let err = provider
            .sign_in(&credentials("a@b.co", "correct-horse"))
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::TooManyAttempts);
    }

    #[tokio::test]
    async fn subscribers_see_initial_state_and_changes() {
        let provider = MemoryIdentityProvider::new();
        provider.add_account("u1", "a@b.co", "correct-horse", true);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        let _subscription = provider.subscribe_session_changes(Rc::new(move |session| {
            sink.borrow_mut()
                .push(session.map(|session: Session| session.uid));
        }));
        provider
            .sign_in(&credentials("A@B.co", "correct-horse"))
            .await
            .unwrap();
        provider.sign_out().await.unwrap();

        assert_eq!(
            *seen.borrow(),
            vec![None, Some("u1".to_string()), None]
        );
    }

    #[tokio::test]
    async fn update_requires_existing_document() {
        let store = MemoryDocumentStore::new();
        store.seed("users", "u1", json!({ "name": "a" }));

        let mut fields = Fields::new();
        fields.insert("name".to_string(), json!("b"));
        store
            .update_document("users", "u1", fields.clone())
            .await
            .unwrap();
        assert!(store.update_document("users", "u2", fields).await.is_err());
        assert_eq!(store.fields("users", "u1").unwrap()["name"], "b");
        assert_eq!(store.writes(), 2);
    }

    #[tokio::test]
    async fn injected_failure_applies_to_reads() {
        let store = MemoryDocumentStore::new();
        store.fail_with(Some(RemoteFailure::unavailable("offline")));
        let err = store.get_document("users", "u1").await.unwrap_err();
        assert_eq!(err, RemoteFailure::unavailable("offline"));
        store.fail_with(None);
        assert_eq!(store.get_document("users", "u1").await.unwrap(), None);
    }
}
