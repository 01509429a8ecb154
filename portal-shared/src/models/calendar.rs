use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Collection holding calendar notes for all users.
pub const CALENDAR_COLLECTION: &str = "calendarEvents";

/// A note pinned to a calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    #[serde(default, skip_serializing)]
    pub id: String,
    pub user_id: String,
    /// Stored as `YYYY-MM-DD`.
    pub date: NaiveDate,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Add/edit form for a calendar note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
}

impl EventDraft {
    /// Load an existing event into the form.
    #[must_use]
    pub fn from_event(event: &CalendarEvent) -> Self {
        Self {
            title: event.title.clone(),
            description: event.description.clone(),
        }
    }
}
