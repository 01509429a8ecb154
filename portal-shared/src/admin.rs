use crate::{
    accounts::EMAIL_INDEX_COLLECTION,
    models::{
        Profile, Role,
        errors::{AccessError, PortalError, RemoteFailure},
        profile::USERS_COLLECTION,
    },
    services::{Fields, Query},
    session::SessionStore,
};
use serde_json::Value;
use std::fmt;
use tracing::{info, warn};

/// User management for the admin panel.
///
/// Every operation re-checks that the signed-in profile is an admin, and
/// refuses to demote or delete the caller's own account.
#[derive(Clone)]
pub struct AdminService {
    store: SessionStore,
}

impl AdminService {
    #[must_use]
    pub fn new(store: SessionStore) -> Self {
        Self { store }
    }

    /// All profiles, ordered by name.
    ///
    /// # Errors
    /// [`AccessError::AdminRequired`] for non-admins; store failures.
    pub async fn list_users(&self) -> Result<Vec<Profile>, PortalError> {
        self.require_admin()?;
        let documents = self
            .store
            .documents()
            .query_collection(USERS_COLLECTION, &Query::all())
            .await?;

        let mut users: Vec<Profile> = documents
            .iter()
            .filter_map(|document| match document.decode::<Profile>() {
                Ok(mut profile) => {
                    profile.uid.clone_from(&document.id);
                    Some(profile)
                }
                Err(err) => {
                    warn!(error = %err, "skipping unreadable profile");
                    None
                }
            })
            .collect();
        users.sort_by_key(|profile| profile.name.to_lowercase());
        Ok(users)
    }

    /// # Errors
    /// [`AccessError::AdminRequired`], [`AccessError::SelfModification`] when
    /// an admin demotes themself, or store failures.
    pub async fn set_role(&self, uid: &str, role: Role) -> Result<(), PortalError> {
        let admin = self.require_admin()?;
        if admin.uid == uid && role != Role::Admin {
            return Err(AccessError::SelfModification.into());
        }

        let mut fields = Fields::new();
        fields.insert("role".to_string(), Value::String(role.as_str().to_string()));
        self.store
            .documents()
            .update_document(USERS_COLLECTION, uid, fields)
            .await?;
        info!(uid, role = %role, "role changed");
        Ok(())
    }

    /// Delete a profile and its email index entry.
    ///
    /// The identity account itself is left to the provider's console.
    ///
    /// # Errors
    /// [`AccessError::AdminRequired`], [`AccessError::SelfModification`] for
    /// the caller's own account, or store failures.
    pub async fn remove_user(&self, user: &Profile) -> Result<(), PortalError> {
        let admin = self.require_admin()?;
        if admin.uid == user.uid {
            return Err(AccessError::SelfModification.into());
        }

        let documents = self.store.documents();
        documents
            .delete_document(USERS_COLLECTION, &user.uid)
            .await?;
        if !user.email.is_empty() {
            let removed: Result<(), RemoteFailure> = documents
                .delete_document(EMAIL_INDEX_COLLECTION, &user.email.to_lowercase())
                .await;
            if let Err(err) = removed {
                warn!(uid = %user.uid, error = %err, "email index entry not removed");
            }
        }
        info!(uid = %user.uid, "user removed");
        Ok(())
    }

    fn require_admin(&self) -> Result<Profile, AccessError> {
        self.store
            .guard_state()
            .profile()
            .filter(|profile| profile.role.is_admin())
            .cloned()
            .ok_or(AccessError::AdminRequired)
    }
}

impl fmt::Debug for AdminService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminService")
            .field("store", &self.store)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::Credentials,
        services::memory::{MemoryDocumentStore, MemoryIdentityProvider, MemoryKeyValueStore},
    };
    use serde_json::json;
    use std::rc::Rc;

    async fn signed_in(role: &str) -> (Rc<MemoryDocumentStore>, AdminService) {
        let identity = Rc::new(MemoryIdentityProvider::new());
        let documents = Rc::new(MemoryDocumentStore::new());
        identity.add_account("me", "me@example.com", "abcdefgh", true);
        let users = [("me", "Mia", role), ("u2", "bob", "Employee"), ("u3", "Al", "User")];
        for (uid, name, user_role) in users {
            documents.seed(
                USERS_COLLECTION,
                uid,
                json!({ "name": name, "email": format!("{uid}@example.com"), "role": user_role }),
            );
        }
        documents.seed(EMAIL_INDEX_COLLECTION, "u2@example.com", json!({ "uid": "u2" }));

        let store = SessionStore::new(
            identity.clone(),
            documents.clone(),
            Rc::new(MemoryKeyValueStore::new()),
        );
        let mut events = store.mount();
        store
            .sign_in(&Credentials {
                email: "me@example.com".to_string(),
                password: "abcdefgh".to_string(),
            })
            .await
            .unwrap();
        store.process_pending(&mut events).await;
        (documents, AdminService::new(store))
    }

    #[tokio::test]
    async fn non_admin_is_refused() {
        let (documents, admin) = signed_in("Employee").await;
        let reads = documents.reads();
        assert_eq!(
            admin.list_users().await.unwrap_err(),
            PortalError::Access(AccessError::AdminRequired)
        );
        assert_eq!(documents.reads(), reads);
    }

    #[tokio::test]
    async fn admin_lists_users_by_name() {
        let (_, admin) = signed_in("admin").await;
        let names: Vec<String> = admin
            .list_users()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Al", "bob", "Mia"]);
    }

    #[tokio::test]
    async fn admin_promotes_others_but_not_demotes_self() {
        let (documents, admin) = signed_in("Admin").await;

        admin.set_role("u2", Role::Admin).await.unwrap();
        assert_eq!(documents.fields(USERS_COLLECTION, "u2").unwrap()["role"], "Admin");

        assert_eq!(
            admin.set_role("me", Role::Employee).await.unwrap_err(),
            PortalError::Access(AccessError::SelfModification)
        );
        assert_eq!(documents.fields(USERS_COLLECTION, "me").unwrap()["role"], "Admin");
    }

    #[tokio::test]
    async fn admin_removes_others_but_not_self() {
        let (documents, admin) = signed_in("Admin").await;
        let users = admin.list_users().await.unwrap();
        let bob = users.iter().find(|p| p.uid == "u2").unwrap();
        let me = users.iter().find(|p| p.uid == "me").unwrap();

        admin.remove_user(bob).await.unwrap();
        assert!(documents.fields(USERS_COLLECTION, "u2").is_none());
        assert!(documents.fields(EMAIL_INDEX_COLLECTION, "u2@example.com").is_none());

        assert_eq!(
            admin.remove_user(me).await.unwrap_err(),
            PortalError::Access(AccessError::SelfModification)
        );
        assert_eq!(documents.count(USERS_COLLECTION), 2);
    }
}
