//! # Directory
//!
//! Employee listing with the same search/sort state the sidebar persists.
//! Records that would fail the registration rules are left out.

use crate::{
    models::{
        Profile, SortKey, SortOrder, UiPreferences, errors::RemoteFailure,
        profile::USERS_COLLECTION,
    },
    services::{Document, DocumentStore, Query},
    session::load_profile,
    validation::{validate_contact, validate_email, validate_name, validate_wire_sign},
};
use std::{cmp::Ordering, rc::Rc};
use tracing::{debug, warn};

/// A listed employee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub uid: String,
    pub name: String,
    pub wire_sign: String,
    pub email: String,
    pub contact: String,
}

impl DirectoryEntry {
    /// Build an entry when the document holds a complete, valid record.
    #[must_use]
    pub fn from_document(document: &Document) -> Option<Self> {
        let profile: Profile = document.decode().ok()?;
        Some(Self {
            uid: document.id.clone(),
            name: validate_name(&profile.name).ok()?,
            wire_sign: validate_wire_sign(&profile.wire_sign).ok()?,
            email: validate_email(&profile.email).ok()?,
            contact: validate_contact(&profile.contact).ok()?,
        })
    }

    fn sort_value(&self, key: SortKey) -> String {
        match key {
            SortKey::Name => &self.name,
            SortKey::WireSign => &self.wire_sign,
            SortKey::Email => &self.email,
            SortKey::Contact => &self.contact,
        }
        .to_lowercase()
    }
}

/// Entries whose wire sign contains the search term, in the chosen order.
///
/// Matching and ordering ignore case; ties keep their listing order.
#[must_use]
pub fn filter_and_sort(
    entries: &[DirectoryEntry],
    preferences: &UiPreferences,
) -> Vec<DirectoryEntry> {
    let needle = preferences.directory_search_term.trim().to_lowercase();
    let mut visible: Vec<DirectoryEntry> = entries
        .iter()
        .filter(|entry| entry.wire_sign.to_lowercase().contains(&needle))
        .cloned()
        .collect();

    let key = preferences.directory_sort_key;
    visible.sort_by(|a, b| {
        let ordering = a.sort_value(key).cmp(&b.sort_value(key));
        match preferences.directory_sort_order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
    visible
}

/// What the profile view shows for a uid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileView {
    Show(Profile),
    /// Unknown uid or the lookup failed; show the directory instead.
    RedirectDirectory,
}

/// Reads the `users` collection for the directory and profile views.
#[derive(Clone)]
pub struct DirectoryService {
    documents: Rc<dyn DocumentStore>,
}

impl DirectoryService {
    #[must_use]
    pub fn new(documents: Rc<dyn DocumentStore>) -> Self {
        Self { documents }
    }

    /// Every valid employee record, ordered by name.
    ///
    /// # Errors
    /// Returns a [`RemoteFailure`] when the query fails.
    pub async fn list(&self) -> Result<Vec<DirectoryEntry>, RemoteFailure> {
        let documents = self
            .documents
            .query_collection(USERS_COLLECTION, &Query::all())
            .await?;
        let total = documents.len();
        let mut entries: Vec<DirectoryEntry> =
            documents.iter().filter_map(DirectoryEntry::from_document).collect();
        entries.sort_by(|a, b| match a.name.to_lowercase().cmp(&b.name.to_lowercase()) {
            Ordering::Equal => a.uid.cmp(&b.uid),
            other => other,
        });
        debug!(total, listed = entries.len(), "directory loaded");
        Ok(entries)
    }

    pub async fn profile_view(&self, uid: &str) -> ProfileView {
        match load_profile(self.documents.as_ref(), uid).await {
            Ok(Some(profile)) => ProfileView::Show(profile),
            Ok(None) => {
                debug!(uid, "profile not found, redirecting to directory");
                ProfileView::RedirectDirectory
            }
            Err(err) => {
                warn!(uid, error = %err, "profile lookup failed, redirecting to directory");
                ProfileView::RedirectDirectory
            }
        }
    }
}

impl std::fmt::Debug for DirectoryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryService").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::memory::MemoryDocumentStore;
    use serde_json::json;

    fn entry(uid: &str, name: &str, wire_sign: &str) -> DirectoryEntry {
        DirectoryEntry {
            uid: uid.to_string(),
            name: name.to_string(),
            wire_sign: wire_sign.to_string(),
            email: format!("{uid}@example.com"),
            contact: "09171234567".to_string(),
        }
    }

    fn seeded() -> Rc<MemoryDocumentStore> {
        let store = Rc::new(MemoryDocumentStore::new());
        store.seed(
            USERS_COLLECTION,
            "u1",
            json!({
                "name": "zed",
                "email": "z@example.com",
                "wireSign": "zd",
                "contact": "0917-123-4567",
                "role": "User"
            }),
        );
        store.seed(
            USERS_COLLECTION,
            "u2",
            json!({
                "name": "Amy",
                "email": "a@example.com",
                "wireSign": "AM",
                "contact": "+1 (555) 123-4567x1",
                "role": "Employee"
            }),
        );
        store.seed(
            USERS_COLLECTION,
            "bad-sign",
            json!({
                "name": "Bo",
                "email": "b@example.com",
                "wireSign": "B1",
                "contact": "09171234567"
            }),
        );
        store.seed(
            USERS_COLLECTION,
            "short-contact",
            json!({
                "name": "Cy",
                "email": "c@example.com",
                "wireSign": "CY",
                "contact": "555-1234"
            }),
        );
        store.seed(USERS_COLLECTION, "empty", json!({ "role": "Admin" }));
        store
    }

    #[tokio::test]
    async fn list_excludes_invalid_records() {
        let service = DirectoryService::new(seeded());
        let entries = service.list().await.unwrap();

        let uids: Vec<&str> = entries.iter().map(|e| e.uid.as_str()).collect();
        assert_eq!(uids, vec!["u2", "u1"]);
        assert_eq!(entries[1].wire_sign, "ZD");
    }

    #[tokio::test]
    async fn list_propagates_remote_failure() {
        let store = seeded();
        store.fail_with(Some(RemoteFailure::Unauthorized));
        let service = DirectoryService::new(store);
        assert_eq!(service.list().await.unwrap_err(), RemoteFailure::Unauthorized);
    }

    #[test]
    fn filter_matches_wire_sign_ignoring_case() {
        let entries = vec![
            entry("1", "Amy", "AM"),
            entry("2", "Ben", "BN"),
            entry("3", "Cam", "CA"),
        ];
        let preferences = UiPreferences {
            directory_search_term: "a".to_string(),
            ..UiPreferences::default()
        };
        let names: Vec<String> = filter_and_sort(&entries, &preferences)
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Amy", "Cam"]);
    }

    #[test]
    fn sort_ignores_case_and_honours_order() {
        let entries = vec![
            entry("1", "bob", "BB"),
            entry("2", "Alice", "ZZ"),
            entry("3", "carl", "AA"),
        ];
        let mut preferences = UiPreferences::default();

        let names = |prefs: &UiPreferences| -> Vec<String> {
            filter_and_sort(&entries, prefs).into_iter().map(|e| e.name).collect()
        };
        assert_eq!(names(&preferences), vec!["Alice", "bob", "carl"]);

        preferences.toggle_sort(SortKey::Name);
        assert_eq!(names(&preferences), vec!["carl", "bob", "Alice"]);

        preferences.toggle_sort(SortKey::WireSign);
        assert_eq!(names(&preferences), vec!["carl", "bob", "Alice"]);
        assert_eq!(preferences.directory_sort_order, SortOrder::Asc);
    }

    #[tokio::test]
    async fn unknown_uid_redirects_to_directory() {
        let service = DirectoryService::new(seeded());
        assert_eq!(service.profile_view("123").await, ProfileView::RedirectDirectory);

        match service.profile_view("u2").await {
            ProfileView::Show(profile) => assert_eq!(profile.name, "Amy"),
            ProfileView::RedirectDirectory => panic!("u2 exists"),
        }
    }

    #[tokio::test]
    async fn failed_lookup_redirects_to_directory() {
        let store = seeded();
        store.fail_with(Some(RemoteFailure::unavailable("offline")));
        let service = DirectoryService::new(store);
        assert_eq!(service.profile_view("u2").await, ProfileView::RedirectDirectory);
    }
}
