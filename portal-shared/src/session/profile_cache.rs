use crate::{
    models::{Profile, errors::RemoteFailure, profile::USERS_COLLECTION},
    services::DocumentStore,
};
use tracing::debug;

/// The signed-in user's profile, tagged with the epoch it was fetched in.
///
/// Every session change and every logout starts a new epoch. A fetch that
/// resolves after its epoch ended is rejected by [`ProfileCache::resolve`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProfileCache {
    profile: Option<Profile>,
    epoch: u64,
}

impl ProfileCache {
    #[must_use]
    pub fn get(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Start a new epoch and keep the cached profile.
    pub fn advance(&mut self) -> u64 {
        self.epoch += 1;
        self.epoch
    }

    /// Start a new epoch and forget the cached profile.
    pub fn clear(&mut self) -> u64 {
        self.profile = None;
        self.advance()
    }

    /// Store the outcome of a fetch begun in `epoch`.
    ///
    /// Returns `false`, leaving the cache untouched, when the epoch is stale.
    pub fn resolve(&mut self, epoch: u64, profile: Option<Profile>) -> bool {
        if epoch != self.epoch {
            debug!(epoch, current = self.epoch, "discarding stale profile fetch");
            return false;
        }
        self.profile = profile;
        true
    }
}

/// Fetch the profile document for `uid`.
///
/// A missing document resolves to `Ok(None)`. The uid is taken from the
/// document id when the stored fields omit it.
///
/// # Errors
/// Returns a [`RemoteFailure`] when the store fails or the document cannot
/// be decoded.
pub async fn load_profile(
    documents: &dyn DocumentStore,
    uid: &str,
) -> Result<Option<Profile>, RemoteFailure> {
    let Some(document) = documents.get_document(USERS_COLLECTION, uid).await? else {
        debug!(uid, "no profile document");
        return Ok(None);
    };
    let mut profile: Profile = document.decode()?;
    if profile.uid.is_empty() {
        profile.uid = document.id;
    }
    Ok(Some(profile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::Role, services::memory::MemoryDocumentStore};
    use serde_json::json;

    fn profile(uid: &str) -> Profile {
        Profile {
            uid: uid.to_string(),
            name: "Dana".to_string(),
            email: "dana@example.com".to_string(),
            role: Role::Employee,
            wire_sign: "DC".to_string(),
            contact: "09171234567".to_string(),
            photo_url: None,
        }
    }

    #[test]
    fn stale_epoch_is_rejected() {
        let mut cache = ProfileCache::default();
        let started = cache.advance();
        cache.clear();

        assert!(!cache.resolve(started, Some(profile("u1"))));
        assert_eq!(cache.get(), None);

        let current = cache.epoch();
        assert!(cache.resolve(current, Some(profile("u2"))));
        assert_eq!(cache.get().map(|p| p.uid.as_str()), Some("u2"));
    }

    #[test]
    fn advance_keeps_profile_clear_drops_it() {
        let mut cache = ProfileCache::default();
        let epoch = cache.epoch();
        cache.resolve(epoch, Some(profile("u1")));
        cache.advance();
        assert!(cache.get().is_some());
        cache.clear();
        assert!(cache.get().is_none());
    }

    #[tokio::test]
    async fn load_fills_uid_from_document_id() {
        let store = MemoryDocumentStore::new();
        store.seed(USERS_COLLECTION, "u9", json!({ "name": "Nine", "role": "Admin" }));

        let loaded = load_profile(&store, "u9").await.unwrap().unwrap();
        assert_eq!(loaded.uid, "u9");
        assert_eq!(loaded.role, Role::Admin);
        assert_eq!(load_profile(&store, "missing").await.unwrap(), None);
    }
}
