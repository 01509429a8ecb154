pub(crate) mod form_field;
pub(crate) mod loading;
pub(crate) mod notice;
pub(crate) mod sidebar;
pub(crate) mod theme_switcher;
pub(crate) mod user_dropdown;

pub use form_field::{FormField, field_error, update_field};
pub use notice::{InlineNotice, Notice};
