use super::{failure_for_status, transport_failure};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, de::DeserializeOwned, de::IgnoredAny};
use serde_json::json;
use shared::{
    AuthError, RemoteFailure,
    config::PortalConfig,
    models::{Credentials, Session},
    services::{IdentityProvider, KeyValueStore, SessionListener},
    session::{ListenerRegistry, Liveness, Subscription},
};
use std::{cell::RefCell, fmt, rc::Rc};
use tracing::{debug, info, warn};
use uuid::Uuid;
use wasm_bindgen_futures::spawn_local;

/// Local storage key holding the signed-in session between page loads.
pub const SESSION_STORAGE_KEY: &str = "portalSession";

/// Identity toolkit client speaking the `accounts:*` REST methods.
///
/// The session survives reloads through local storage and is re-validated
/// with `accounts:lookup` the first time a listener subscribes.
#[derive(Clone)]
pub struct RestIdentityProvider {
    inner: Rc<Inner>,
}

struct Inner {
    client: Client,
    config: Rc<PortalConfig>,
    storage: Rc<dyn KeyValueStore>,
    current: RefCell<Option<Session>>,
    listeners: ListenerRegistry<Option<Session>>,
}

/// Why a provider call did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
enum CallError {
    /// The provider answered with an error code such as `EMAIL_EXISTS`.
    Rejected(String),
    Remote(RemoteFailure),
}

impl CallError {
    fn into_auth(self) -> AuthError {
        match self {
            Self::Rejected(code) => auth_error_for(&code),
            Self::Remote(failure) => AuthError::Remote(failure),
        }
    }

    fn into_remote(self) -> RemoteFailure {
        match self.into_auth() {
            AuthError::Remote(failure) => failure,
            _ => RemoteFailure::Unauthorized,
        }
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Answer of `signInWithPassword` and `signUp`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenGrant {
    local_id: String,
    #[serde(default)]
    email: String,
    id_token: String,
    refresh_token: String,
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<AccountInfo>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountInfo {
    #[serde(default)]
    email: String,
    #[serde(default)]
    email_verified: bool,
}

/// Answer of the secure-token endpoint, in snake case.
#[derive(Deserialize)]
struct RefreshGrant {
    id_token: String,
    refresh_token: String,
    user_id: String,
}

/// Leading error code of a provider message, e.g.
/// `TOO_MANY_ATTEMPTS_TRY_LATER : Access disabled` gives the first word.
fn error_code(message: &str) -> &str {
    message
        .split([' ', ':'])
        .find(|part| !part.is_empty())
        .unwrap_or(message)
}

fn auth_error_for(code: &str) -> AuthError {
    match code {
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "INVALID_EMAIL"
        | "USER_DISABLED" | "MISSING_PASSWORD" => AuthError::InvalidCredentials,
        "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthError::TooManyAttempts,
        "EMAIL_EXISTS" => AuthError::EmailAlreadyRegistered,
        "INVALID_ID_TOKEN" | "TOKEN_EXPIRED" | "USER_NOT_FOUND" | "INVALID_REFRESH_TOKEN"
        | "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" => AuthError::Remote(RemoteFailure::Unauthorized),
        other => AuthError::Remote(RemoteFailure::unavailable(other.to_string())),
    }
}

impl RestIdentityProvider {
    pub fn new(config: Rc<PortalConfig>, storage: Rc<dyn KeyValueStore>) -> Self {
        Self {
            inner: Rc::new(Inner {
                client: Client::new(),
                config,
                storage,
                current: RefCell::new(None),
                listeners: ListenerRegistry::new(),
            }),
        }
    }

    /// Bearer credential of the signed-in session.
    pub fn id_token(&self) -> Option<String> {
        self.inner
            .current
            .borrow()
            .as_ref()
            .map(|session| session.id_token.clone())
    }

    /// Exchange the refresh token for a new id token and report the renewed
    /// session to subscribers.
    ///
    /// # Errors
    /// [`RemoteFailure::Unauthorized`] without a session or when the refresh
    /// token was revoked; the session is ended in that case.
    pub async fn refresh(&self) -> Result<Session, RemoteFailure> {
        let Some(session) = self.inner.current.borrow().clone() else {
            return Err(RemoteFailure::Unauthorized);
        };
        match self.inner.refresh_session(&session).await {
            Ok(renewed) => {
                debug!(uid = %renewed.uid, "id token refreshed");
                self.inner.establish(renewed.clone());
                Ok(renewed)
            }
            Err(RemoteFailure::Unauthorized) => {
                warn!(uid = %session.uid, "refresh token rejected, ending session");
                self.inner.clear();
                Err(RemoteFailure::Unauthorized)
            }
            Err(failure) => Err(failure),
        }
    }
}

impl Inner {
    async fn send<R: DeserializeOwned>(&self, request: RequestBuilder) -> Result<R, CallError> {
        let response = request
            .send()
            .await
            .map_err(|err| CallError::Remote(transport_failure(&err)))?;
        let status = response.status();
        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|err| CallError::Remote(RemoteFailure::decode(err.to_string())));
        }

        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) => Err(CallError::Rejected(
                error_code(&envelope.error.message).to_string(),
            )),
            Err(_) => Err(CallError::Remote(failure_for_status(status, &body))),
        }
    }

    async fn call<R: DeserializeOwned>(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<R, CallError> {
        let url = self.config.identity_url(method);
        self.send(self.client.post(url).json(&body)).await
    }

    async fn lookup(&self, id_token: &str) -> Result<AccountInfo, CallError> {
        let response: LookupResponse = self.call("lookup", json!({ "idToken": id_token })).await?;
        response
            .users
            .into_iter()
            .next()
            .ok_or_else(|| CallError::Rejected("USER_NOT_FOUND".to_string()))
    }

    async fn session_from_grant(&self, grant: TokenGrant) -> Result<Session, CallError> {
        let account = self.lookup(&grant.id_token).await?;
        Ok(Session {
            session_id: Uuid::new_v4().to_string(),
            uid: grant.local_id,
            email: if account.email.is_empty() {
                grant.email
            } else {
                account.email
            },
            email_verified: account.email_verified,
            id_token: grant.id_token,
            refresh_token: grant.refresh_token,
        })
    }

    async fn refresh_session(&self, session: &Session) -> Result<Session, RemoteFailure> {
        let request = self.client.post(self.config.token_url()).form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", session.refresh_token.as_str()),
        ]);
        let grant: RefreshGrant = self.send(request).await.map_err(CallError::into_remote)?;
        if grant.user_id != session.uid {
            return Err(RemoteFailure::Unauthorized);
        }
        Ok(Session {
            id_token: grant.id_token,
            refresh_token: grant.refresh_token,
            ..session.clone()
        })
    }

    /// Current state for a new subscriber, re-validating a stored session.
    ///
    /// An unreachable provider is an error: no state is reported and the
    /// caller's own timeout decides. A sign-in or sign-out that lands while
    /// the stored session is being checked wins over it.
    async fn restore(&self) -> Result<Option<Session>, RemoteFailure> {
        if let Some(session) = self.current.borrow().clone() {
            return Ok(Some(session));
        }
        let Some(raw) = self.storage.get(SESSION_STORAGE_KEY) else {
            return Ok(None);
        };
        let Some(saved) = self.decode_saved(&raw) else {
            return Ok(None);
        };

        let restored = match self.lookup(&saved.id_token).await {
            Ok(account) => Session {
                email_verified: account.email_verified,
                ..saved
            },
            Err(err) => match err.into_remote() {
                RemoteFailure::Unauthorized => match self.refresh_session(&saved).await {
                    Ok(renewed) => {
                        let account = self
                            .lookup(&renewed.id_token)
                            .await
                            .map_err(CallError::into_remote)?;
                        Session {
                            email_verified: account.email_verified,
                            ..renewed
                        }
                    }
                    Err(RemoteFailure::Unauthorized) => {
                        info!(uid = %saved.uid, "stored session expired");
                        return Ok(self.settle_restored(&raw, None));
                    }
                    Err(failure) => return Err(failure),
                },
                failure => return Err(failure),
            },
        };

        Ok(self.settle_restored(&raw, Some(restored)))
    }

    /// Adopt the outcome of checking the stored entry `raw`, unless the
    /// session changed in the meantime; then the newer state is reported.
    fn settle_restored(&self, raw: &str, restored: Option<Session>) -> Option<Session> {
        let untouched = self.current.borrow().is_none()
            && self.storage.get(SESSION_STORAGE_KEY).as_deref() == Some(raw);
        if !untouched {
            debug!("session changed while the stored one was checked");
            return self.current.borrow().clone();
        }

        match restored {
            Some(session) => {
                self.persist(&session);
                *self.current.borrow_mut() = Some(session.clone());
                debug!(uid = %session.uid, "stored session restored");
                Some(session)
            }
            None => {
                self.storage.remove(SESSION_STORAGE_KEY);
                None
            }
        }
    }

    fn decode_saved(&self, raw: &str) -> Option<Session> {
        match serde_json::from_str(raw) {
            Ok(session) => Some(session),
            Err(err) => {
                warn!(error = %err, "discarding unreadable stored session");
                self.storage.remove(SESSION_STORAGE_KEY);
                None
            }
        }
    }

    fn persist(&self, session: &Session) {
        match serde_json::to_string(session) {
            Ok(raw) => self.storage.set(SESSION_STORAGE_KEY, &raw),
            Err(err) => warn!(error = %err, "session not persisted"),
        }
    }

    fn establish(&self, session: Session) {
        self.persist(&session);
        *self.current.borrow_mut() = Some(session.clone());
        self.listeners.notify(&Some(session));
    }

    fn clear(&self) {
        self.storage.remove(SESSION_STORAGE_KEY);
        self.current.borrow_mut().take();
        self.listeners.notify(&None);
    }
}

#[async_trait(?Send)]
impl IdentityProvider for RestIdentityProvider {
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, AuthError> {
        let grant: TokenGrant = self
            .inner
            .call(
                "signInWithPassword",
                json!({
                    "email": credentials.email,
                    "password": credentials.password,
                    "returnSecureToken": true,
                }),
            )
            .await
            .map_err(CallError::into_auth)?;
        let session = self
            .inner
            .session_from_grant(grant)
            .await
            .map_err(CallError::into_auth)?;
        self.inner.establish(session.clone());
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), RemoteFailure> {
        self.inner.clear();
        Ok(())
    }

    fn subscribe_session_changes(&self, listener: SessionListener) -> Subscription {
        let registered = {
            let listener = Rc::clone(&listener);
            self.inner
                .listeners
                .subscribe(move |session: &Option<Session>| listener(session.clone()))
        };

        let alive = Liveness::new();
        let reporting = alive.clone();
        let inner = Rc::clone(&self.inner);
        spawn_local(async move {
            match inner.restore().await {
                Ok(session) if reporting.is_alive() => listener(session),
                Ok(_) => debug!("subscriber left before the first report"),
                Err(err) => warn!(error = %err, "session state unknown, provider unreachable"),
            }
        });

        Subscription::new(move || {
            alive.end();
            registered.unsubscribe();
        })
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let sent: Result<IgnoredAny, CallError> = self
            .inner
            .call(
                "sendOobCode",
                json!({ "requestType": "PASSWORD_RESET", "email": email }),
            )
            .await;
        match sent {
            Ok(_) => Ok(()),
            Err(CallError::Rejected(code)) if code == "EMAIL_NOT_FOUND" => {
                Err(AuthError::UserNotFound)
            }
            Err(err) => Err(err.into_auth()),
        }
    }

    async fn send_email_verification(&self, session: &Session) -> Result<(), AuthError> {
        let _: IgnoredAny = self
            .inner
            .call(
                "sendOobCode",
                json!({ "requestType": "VERIFY_EMAIL", "idToken": session.id_token }),
            )
            .await
            .map_err(CallError::into_auth)?;
        debug!(uid = %session.uid, "verification email sent");
        Ok(())
    }

    async fn create_account(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let grant: TokenGrant = self
            .inner
            .call(
                "signUp",
                json!({ "email": email, "password": password, "returnSecureToken": true }),
            )
            .await
            .map_err(CallError::into_auth)?;
        let session = Session {
            session_id: Uuid::new_v4().to_string(),
            uid: grant.local_id,
            email: if grant.email.is_empty() {
                email.to_string()
            } else {
                grant.email
            },
            email_verified: false,
            id_token: grant.id_token,
            refresh_token: grant.refresh_token,
        };
        self.inner.establish(session.clone());
        Ok(session)
    }

    async fn update_display_name(&self, session: &Session, name: &str) -> Result<(), AuthError> {
        let _: IgnoredAny = self
            .inner
            .call(
                "update",
                json!({
                    "idToken": session.id_token,
                    "displayName": name,
                    "returnSecureToken": false,
                }),
            )
            .await
            .map_err(CallError::into_auth)?;
        Ok(())
    }
}

impl fmt::Debug for RestIdentityProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let uid = self
            .inner
            .current
            .borrow()
            .as_ref()
            .map(|session| session.uid.clone());
        f.debug_struct("RestIdentityProvider")
            .field("uid", &uid)
            .field("listeners", &self.inner.listeners.len())
            .finish_non_exhaustive()
    }
}
