//! # Accounts
//!
//! Registration, settings and password reset. Each operation validates its
//! form first and issues no remote call when validation fails.

use crate::{
    models::{
        Profile, Role,
        errors::{AccessError, AuthError, PortalError, RemoteFailure},
        profile::USERS_COLLECTION,
    },
    services::{DocumentStore, Fields, IdentityProvider, documents::to_fields},
    session::SessionStore,
    validation::{PasswordResetForm, RegistrationForm, SettingsForm},
};
use serde_json::Value;
use std::{fmt, rc::Rc};
use tracing::{info, warn};

/// Collection mapping a registered email to its uid.
pub const EMAIL_INDEX_COLLECTION: &str = "email_index";

/// Result of a successful registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredAccount {
    pub uid: String,
    pub email: String,
}

#[derive(Clone)]
pub struct AccountService {
    store: SessionStore,
    identity: Rc<dyn IdentityProvider>,
    documents: Rc<dyn DocumentStore>,
}

impl AccountService {
    #[must_use]
    pub fn new(store: SessionStore) -> Self {
        Self {
            identity: store.identity(),
            documents: store.documents(),
            store,
        }
    }

    /// Create an identity account and its profile.
    ///
    /// Steps: validate, reject emails already in the index, create the
    /// account, set its display name, send the verification mail, write the
    /// `User` profile and the index entry, then sign out so the next login
    /// happens after verification.
    ///
    /// # Errors
    /// Validation errors (nothing remote is called),
    /// [`AuthError::EmailAlreadyRegistered`], or provider/store failures.
    pub async fn register(
        &self,
        form: &RegistrationForm,
    ) -> Result<RegisteredAccount, PortalError> {
        let account = form.validate()?;
        let index_key = account.email.to_lowercase();

        if self
            .documents
            .get_document(EMAIL_INDEX_COLLECTION, &index_key)
            .await?
            .is_some()
        {
            info!("registration rejected: email already indexed");
            return Err(AuthError::EmailAlreadyRegistered.into());
        }

        let session = self
            .identity
            .create_account(&account.email, &account.password)
            .await?;
        self.identity
            .update_display_name(&session, &account.name)
            .await?;
        self.identity.send_email_verification(&session).await?;

        let profile = Profile {
            uid: session.uid.clone(),
            name: account.name,
            email: account.email.clone(),
            role: Role::User,
            wire_sign: account.wire_sign,
            contact: account.contact,
            photo_url: None,
        };
        self.documents
            .set_document(USERS_COLLECTION, &session.uid, to_fields(&profile)?)
            .await?;

        let mut index = Fields::new();
        index.insert("uid".to_string(), Value::String(session.uid.clone()));
        self.documents
            .set_document(EMAIL_INDEX_COLLECTION, &index_key, index)
            .await?;

        info!(uid = %session.uid, "account registered");
        if let Err(err) = self.identity.sign_out().await {
            warn!(error = %err, "sign-out after registration failed");
        }

        Ok(RegisteredAccount {
            uid: session.uid,
            email: account.email,
        })
    }

    /// Save the settings form and return the re-fetched profile.
    ///
    /// # Errors
    /// Validation errors (nothing remote is called),
    /// [`RemoteFailure::Unauthorized`] without a session,
    /// [`AccessError::ProfileMissing`] when the profile vanished, or store
    /// failures.
    pub async fn save_settings(&self, form: &SettingsForm) -> Result<Profile, PortalError> {
        let update = form.validate()?;
        let session = self
            .store
            .current_session()
            .ok_or(RemoteFailure::Unauthorized)?;

        self.documents
            .update_document(USERS_COLLECTION, &session.uid, to_fields(&update)?)
            .await?;
        info!(uid = %session.uid, "settings saved");

        self.store
            .refresh_profile()
            .await?
            .ok_or_else(|| AccessError::ProfileMissing { uid: session.uid }.into())
    }

    /// # Errors
    /// A validation error for an empty email, or [`AuthError::UserNotFound`].
    pub async fn request_password_reset(
        &self,
        form: &PasswordResetForm,
    ) -> Result<(), PortalError> {
        let email = form.validate()?;
        self.identity.send_password_reset(&email).await?;
        info!("password reset requested");
        Ok(())
    }
}

impl fmt::Debug for AccountService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountService")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::Credentials,
        services::memory::{MemoryDocumentStore, MemoryIdentityProvider, MemoryKeyValueStore},
        validation::{FieldName, Rule, ValidationError},
    };
    use serde_json::json;

    struct Harness {
        identity: Rc<MemoryIdentityProvider>,
        documents: Rc<MemoryDocumentStore>,
        store: SessionStore,
        accounts: AccountService,
    }

    fn harness() -> Harness {
        let identity = Rc::new(MemoryIdentityProvider::new());
        let documents = Rc::new(MemoryDocumentStore::new());
        let store = SessionStore::new(
            identity.clone(),
            documents.clone(),
            Rc::new(MemoryKeyValueStore::new()),
        );
        let accounts = AccountService::new(store.clone());
        Harness {
            identity,
            documents,
            store,
            accounts,
        }
    }

    fn registration() -> RegistrationForm {
        RegistrationForm {
            name: " Dana Cruz ".to_string(),
            email: "dana@example.com".to_string(),
            contact: "0917 123 4567".to_string(),
            wire_sign: "dc".to_string(),
            password: "abcdefgh".to_string(),
            confirm_password: "abcdefgh".to_string(),
        }
    }

    #[tokio::test]
    async fn mismatched_confirmation_makes_no_remote_call() {
        let h = harness();
        let form = RegistrationForm {
            confirm_password: "abcdefghx".to_string(),
            ..registration()
        };

        let err = h.accounts.register(&form).await.unwrap_err();

        let PortalError::Validation(errors) = err else {
            panic!("expected validation errors");
        };
        assert_eq!(
            errors.iter().copied().collect::<Vec<_>>(),
            vec![ValidationError::new(FieldName::ConfirmPassword, Rule::Mismatch)]
        );
        assert_eq!(h.documents.remote_calls(), 0);
        assert_eq!(h.identity.calls(), 0);
    }

    #[tokio::test]
    async fn registration_writes_profile_and_index() {
        let h = harness();
        let registered = h.accounts.register(&registration()).await.unwrap();

        let profile = h.documents.fields(USERS_COLLECTION, &registered.uid).unwrap();
        assert_eq!(profile["name"], "Dana Cruz");
        assert_eq!(profile["wireSign"], "DC");
        assert_eq!(profile["role"], "User");
        assert_eq!(
            h.documents
                .fields(EMAIL_INDEX_COLLECTION, "dana@example.com")
                .unwrap()["uid"],
            json!(registered.uid)
        );
        assert_eq!(h.identity.verifications_sent(), vec!["dana@example.com"]);
        assert_eq!(
            h.identity.display_name("dana@example.com").as_deref(),
            Some("Dana Cruz")
        );
        assert_eq!(h.identity.current(), None);
    }

    #[tokio::test]
    async fn indexed_email_is_rejected_before_account_creation() {
        let h = harness();
        h.documents
            .seed(EMAIL_INDEX_COLLECTION, "dana@example.com", json!({ "uid": "old" }));

        let err = h.accounts.register(&registration()).await.unwrap_err();

        assert_eq!(err, PortalError::Auth(AuthError::EmailAlreadyRegistered));
        assert_eq!(h.identity.calls(), 0);
    }

    #[tokio::test]
    async fn provider_duplicate_is_reported() {
        let h = harness();
        h.identity
            .add_account("u0", "dana@example.com", "whatever1", true);

        let err = h.accounts.register(&registration()).await.unwrap_err();
        assert_eq!(err, PortalError::Auth(AuthError::EmailAlreadyRegistered));
        assert_eq!(h.documents.writes(), 0);
    }

    #[tokio::test]
    async fn saved_settings_come_back_normalized() {
        let h = harness();
        h.identity
            .add_account("u1", "dana@example.com", "abcdefgh", true);
        h.documents.seed(
            USERS_COLLECTION,
            "u1",
            json!({
                "uid": "u1",
                "name": "Dana",
                "email": "dana@example.com",
                "role": "Employee",
                "wireSign": "DC",
                "contact": "09171234567"
            }),
        );
        let mut events = h.store.mount();
        h.store
            .sign_in(&Credentials {
                email: "dana@example.com".to_string(),
                password: "abcdefgh".to_string(),
            })
            .await
            .unwrap();
        h.store.process_pending(&mut events).await;

        let saved = h
            .accounts
            .save_settings(&SettingsForm {
                name: "  Dana C.  ".to_string(),
                wire_sign: " xy ".to_string(),
                contact: " +63 917-123-4567 ".to_string(),
                photo_url: "   ".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(saved.name, "Dana C.");
        assert_eq!(saved.wire_sign, "XY");
        assert_eq!(saved.contact, "+63 917-123-4567");
        assert_eq!(saved.photo_url, None);
        assert_eq!(saved.role, Role::Employee);
        assert_eq!(h.store.current_profile(), Some(saved.clone()));
        assert_eq!(h.store.refresh_profile().await.unwrap(), Some(saved));
    }

    #[tokio::test]
    async fn invalid_settings_are_not_written() {
        let h = harness();
        let err = h
            .accounts
            .save_settings(&SettingsForm {
                name: "Dana".to_string(),
                wire_sign: "A1".to_string(),
                contact: "555-1234".to_string(),
                photo_url: String::new(),
            })
            .await
            .unwrap_err();

        let PortalError::Validation(errors) = err else {
            panic!("expected validation errors");
        };
        assert_eq!(errors.len(), 2);
        assert_eq!(h.documents.remote_calls(), 0);
    }

    #[tokio::test]
    async fn settings_require_a_session() {
        let h = harness();
        let err = h
            .accounts
            .save_settings(&SettingsForm {
                name: "Dana".to_string(),
                wire_sign: "DC".to_string(),
                contact: "09171234567".to_string(),
                photo_url: String::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(err, PortalError::Remote(RemoteFailure::Unauthorized));
    }

    #[tokio::test]
    async fn password_reset_reports_unknown_email() {
        let h = harness();
        h.identity
            .add_account("u1", "dana@example.com", "abcdefgh", true);

        h.accounts
            .request_password_reset(&PasswordResetForm {
                email: " dana@example.com ".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(h.identity.password_resets(), vec!["dana@example.com"]);

        let err = h
            .accounts
            .request_password_reset(&PasswordResetForm {
                email: "nobody@example.com".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "No account found with this email.");
    }
}
