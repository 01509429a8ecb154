use crate::{
    models::{ActivityEntry, activity::ACTIVITY_COLLECTION, errors::RemoteFailure},
    services::{Direction, DocumentStore, Query},
};
use std::{fmt, rc::Rc};
use tracing::warn;

/// Entries shown by the dashboard's activity card.
pub const RECENT_ACTIVITY_LIMIT: usize = 20;

/// Read side of the activity log.
#[derive(Clone)]
pub struct ActivityFeed {
    documents: Rc<dyn DocumentStore>,
}

impl ActivityFeed {
    #[must_use]
    pub fn new(documents: Rc<dyn DocumentStore>) -> Self {
        Self { documents }
    }

    /// Newest entries first.
    ///
    /// # Errors
    /// Returns a [`RemoteFailure`] when the query fails.
    pub async fn recent(&self, limit: usize) -> Result<Vec<ActivityEntry>, RemoteFailure> {
        let query = Query::all()
            .order_by("timestamp", Direction::Descending)
            .limit(limit);
        let documents = self
            .documents
            .query_collection(ACTIVITY_COLLECTION, &query)
            .await?;

        Ok(documents
            .iter()
            .filter_map(|document| match document.decode::<ActivityEntry>() {
                Ok(entry) => Some(ActivityEntry {
                    id: document.id.clone(),
                    ..entry
                }),
                Err(err) => {
                    warn!(error = %err, "skipping activity entry");
                    None
                }
            })
            .collect())
    }
}

impl fmt::Debug for ActivityFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivityFeed").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::memory::MemoryDocumentStore;
    use serde_json::json;

    #[tokio::test]
    async fn newest_first_with_limit() {
        let store = Rc::new(MemoryDocumentStore::new());
        for (id, description, timestamp) in [
            ("a", "old", "2025-01-01T08:00:00Z"),
            ("b", "new", "2025-03-01T08:00:00Z"),
            ("c", "mid", "2025-02-01T08:00:00Z"),
        ] {
            store.seed(
                ACTIVITY_COLLECTION,
                id,
                json!({ "description": description, "timestamp": timestamp }),
            );
        }
        let feed = ActivityFeed::new(store);

        let entries = feed.recent(2).await.unwrap();
        let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
        assert_eq!(entries[0].formatted_timestamp(), "2025-03-01 08:00");
    }

    #[tokio::test]
    async fn entries_without_details_get_placeholders() {
        let store = Rc::new(MemoryDocumentStore::new());
        store.seed(ACTIVITY_COLLECTION, "x", json!({}));
        let entries = ActivityFeed::new(store).recent(RECENT_ACTIVITY_LIMIT).await.unwrap();
        assert_eq!(entries[0].description_or_placeholder(), "No description");
        assert_eq!(entries[0].formatted_timestamp(), "");
    }
}
