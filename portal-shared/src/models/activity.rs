use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Collection of activity log entries shown on the dashboard.
pub const ACTIVITY_COLLECTION: &str = "activityLogs";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivityEntry {
    #[serde(default, skip_serializing)]
    pub id: String,
    #[serde(default)]
    pub description: String,
    pub timestamp: Option<DateTime<Utc>>,
}

impl ActivityEntry {
    #[must_use]
    pub fn description_or_placeholder(&self) -> &str {
        if self.description.is_empty() {
            "No description"
        } else {
            &self.description
        }
    }

    /// Timestamp rendered for the activity list, empty when unknown.
    #[must_use]
    pub fn formatted_timestamp(&self) -> String {
        self.timestamp
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default()
    }
}
