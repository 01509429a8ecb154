//! # Calendar
//!
//! Personal notes pinned to days. Each user only ever sees their own notes.

use crate::{
    models::{
        CalendarEvent, EventDraft,
        calendar::CALENDAR_COLLECTION,
        errors::{PortalError, RemoteFailure},
    },
    services::{DocumentStore, Fields, Filter, Query, documents::to_fields},
    validation::{ValidationErrors, validate_title},
};
use chrono::NaiveDate;
use serde_json::Value;
use std::{collections::BTreeMap, fmt, rc::Rc};
use tracing::{debug, info, warn};

/// Notes keyed by day, each day in listing order.
#[must_use]
pub fn group_by_date(events: &[CalendarEvent]) -> BTreeMap<NaiveDate, Vec<CalendarEvent>> {
    let mut grouped: BTreeMap<NaiveDate, Vec<CalendarEvent>> = BTreeMap::new();
    for event in events {
        grouped.entry(event.date).or_default().push(event.clone());
    }
    grouped
}

#[must_use]
pub fn events_on(events: &[CalendarEvent], date: NaiveDate) -> Vec<&CalendarEvent> {
    events.iter().filter(|event| event.date == date).collect()
}

#[derive(Clone)]
pub struct CalendarService {
    documents: Rc<dyn DocumentStore>,
}

impl CalendarService {
    #[must_use]
    pub fn new(documents: Rc<dyn DocumentStore>) -> Self {
        Self { documents }
    }

    /// Notes owned by `user_id`, ordered by day. Unreadable documents are
    /// skipped.
    ///
    /// # Errors
    /// Returns a [`RemoteFailure`] when the query fails.
    pub async fn list(&self, user_id: &str) -> Result<Vec<CalendarEvent>, RemoteFailure> {
        let query = Query::all().filter(Filter::equals("userId", user_id));
        let documents = self
            .documents
            .query_collection(CALENDAR_COLLECTION, &query)
            .await?;

        let mut events: Vec<CalendarEvent> = documents
            .iter()
            .filter_map(|document| match document.decode::<CalendarEvent>() {
                Ok(mut event) => {
                    event.id.clone_from(&document.id);
                    Some(event)
                }
                Err(err) => {
                    warn!(error = %err, "skipping calendar document");
                    None
                }
            })
            .filter(|event| !event.title.trim().is_empty())
            .collect();
        events.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        debug!(user_id, count = events.len(), "calendar loaded");
        Ok(events)
    }

    /// Add a note on `date`, or update `editing` when given.
    ///
    /// # Errors
    /// A validation error for an empty title, before anything is written;
    /// otherwise the store's failure.
    pub async fn save(
        &self,
        user_id: &str,
        date: NaiveDate,
        editing: Option<&str>,
        draft: &EventDraft,
    ) -> Result<CalendarEvent, PortalError> {
        let title = validate_title(&draft.title).map_err(ValidationErrors::from)?;
        let event = CalendarEvent {
            id: editing.unwrap_or_default().to_string(),
            user_id: user_id.to_string(),
            date,
            title,
            description: draft.description.trim().to_string(),
        };

        if let Some(id) = editing {
            let mut fields = Fields::new();
            fields.insert("title".to_string(), Value::String(event.title.clone()));
            fields.insert(
                "description".to_string(),
                Value::String(event.description.clone()),
            );
            fields.insert("date".to_string(), Value::String(date.to_string()));
            self.documents
                .update_document(CALENDAR_COLLECTION, id, fields)
                .await?;
            info!(id, "calendar note updated");
            Ok(event)
        } else {
            let id = self
                .documents
                .add_document(CALENDAR_COLLECTION, to_fields(&event)?)
                .await?;
            info!(id, "calendar note added");
            Ok(CalendarEvent { id, ..event })
        }
    }

    /// # Errors
    /// Returns a [`RemoteFailure`] when the delete fails.
    pub async fn delete(&self, id: &str) -> Result<(), RemoteFailure> {
        self.documents
            .delete_document(CALENDAR_COLLECTION, id)
            .await?;
        info!(id, "calendar note deleted");
        Ok(())
    }
}

impl fmt::Debug for CalendarService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalendarService").finish_non_exhaustive()
    }
}
