pub mod activity;
pub mod calendar;
pub mod errors;
pub mod preferences;
pub mod profile;
pub mod session;

pub use activity::ActivityEntry;
pub use calendar::{CalendarEvent, EventDraft};
pub use errors::{AccessError, AuthError, PortalError, PortalResult, RemoteFailure};
pub use preferences::{SortKey, SortOrder, Theme, UiPreferences};
pub use profile::{Profile, ProfileUpdate, Role};
pub use session::{Credentials, Session, SessionLifecycle};
