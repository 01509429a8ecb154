//! # Navigation
//!
//! The dashboard route hosts several sub-views selected by the query string.
//! [`PrimaryView::select`] turns the location into exactly one of them; the
//! breadcrumb and the highlighted sidebar link are derived from that value
//! and nothing else.

use std::fmt;
use strum::{EnumIter, IntoEnumIterator};
use url::form_urlencoded;

pub const SETTINGS_PARAM: &str = "settings";
pub const DIRECTORY_PARAM: &str = "directory";
pub const CALENDAR_PARAM: &str = "calendar";
pub const UID_PARAM: &str = "uid";

const PROFILE_PATH_PREFIX: &str = "/profile/";

/// Sub-view switches read from the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryFlags {
    pub settings: bool,
    pub directory: bool,
    pub calendar: bool,
    pub uid: Option<String>,
}

impl QueryFlags {
    /// Parse `search`, with or without its leading `?`.
    ///
    /// A flag is set only by the exact value `true`; an empty `uid` counts
    /// as absent. Later duplicates win.
    #[must_use]
    pub fn parse(search: &str) -> Self {
        let search = search.strip_prefix('?').unwrap_or(search);
        let mut flags = Self::default();
        for (key, value) in form_urlencoded::parse(search.as_bytes()) {
            match key.as_ref() {
                SETTINGS_PARAM => flags.settings = value == "true",
                DIRECTORY_PARAM => flags.directory = value == "true",
                CALENDAR_PARAM => flags.calendar = value == "true",
                UID_PARAM => {
                    let uid = value.trim();
                    flags.uid = (!uid.is_empty()).then(|| uid.to_string());
                }
                _ => {}
            }
        }
        flags
    }
}

/// Structured location: path plus parsed flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationState {
    pub pathname: String,
    pub query: QueryFlags,
}

impl NavigationState {
    #[must_use]
    pub fn new(pathname: &str, search: &str) -> Self {
        Self {
            pathname: pathname.to_string(),
            query: QueryFlags::parse(search),
        }
    }

    #[must_use]
    pub fn view(&self) -> PrimaryView {
        PrimaryView::select(&self.pathname, &self.query)
    }
}

/// The one sub-view a location shows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PrimaryView {
    Dashboard,
    Settings,
    Directory,
    Calendar,
    Profile(String),
}

impl PrimaryView {
    /// Precedence: profile by uid, settings, directory, calendar, dashboard.
    ///
    /// `/profile/:uid` selects the profile view regardless of the query.
    #[must_use]
    pub fn select(pathname: &str, query: &QueryFlags) -> Self {
        if let Some(uid) = pathname
            .strip_prefix(PROFILE_PATH_PREFIX)
            .map(|rest| rest.trim_end_matches('/'))
            .filter(|uid| !uid.is_empty())
        {
            return Self::Profile(uid.to_string());
        }
        if let Some(uid) = &query.uid {
            Self::Profile(uid.clone())
        } else if query.settings {
            Self::Settings
        } else if query.directory {
            Self::Directory
        } else if query.calendar {
            Self::Calendar
        } else {
            Self::Dashboard
        }
    }

    #[must_use]
    pub fn breadcrumb(&self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Settings => "Settings",
            Self::Directory => "Directory",
            Self::Calendar => "Calendar",
            Self::Profile(_) => "Profile",
        }
    }

    /// Dashboard location that selects this view.
    #[must_use]
    pub fn href(&self) -> String {
        match self {
            Self::Dashboard => "/".to_string(),
            Self::Settings => format!("/?{SETTINGS_PARAM}=true"),
            Self::Directory => format!("/?{DIRECTORY_PARAM}=true"),
            Self::Calendar => format!("/?{CALENDAR_PARAM}=true"),
            Self::Profile(uid) => {
                let query: String = form_urlencoded::Serializer::new(String::new())
                    .append_pair(UID_PARAM, uid)
                    .finish();
                format!("/?{query}")
            }
        }
    }

    /// Sidebar entry highlighted while this view is shown.
    ///
    /// A profile is reached from the directory, so it highlights that link.
    #[must_use]
    pub fn nav_link(&self) -> NavLink {
        match self {
            Self::Dashboard => NavLink::Dashboard,
            Self::Settings => NavLink::Settings,
            Self::Directory | Self::Profile(_) => NavLink::Directory,
            Self::Calendar => NavLink::Calendar,
        }
    }
}

impl fmt::Display for PrimaryView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.breadcrumb())
    }
}

/// Sidebar entries, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum NavLink {
    Dashboard,
    Directory,
    Calendar,
    Settings,
}

impl NavLink {
    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        self.view().breadcrumb()
    }

    #[must_use]
    pub fn view(self) -> PrimaryView {
        match self {
            Self::Dashboard => PrimaryView::Dashboard,
            Self::Directory => PrimaryView::Directory,
            Self::Calendar => PrimaryView::Calendar,
            Self::Settings => PrimaryView::Settings,
        }
    }

    #[must_use]
    pub fn is_active(self, current: &PrimaryView) -> bool {
        current.nav_link() == self
    }
}

/// Response to the browser's `pageshow` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageShowAction {
    /// Restored from the back/forward cache: in-memory session state may be
    /// stale, reload the page.
    Reload,
    Ignore,
}

impl PageShowAction {
    #[must_use]
    pub fn for_event(persisted: bool) -> Self {
        if persisted { Self::Reload } else { Self::Ignore }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("", PrimaryView::Dashboard ; "empty query")]
    #[test_case("?settings=true", PrimaryView::Settings ; "settings")]
    #[test_case("?directory=true", PrimaryView::Directory ; "directory")]
    #[test_case("?calendar=true", PrimaryView::Calendar ; "calendar")]
    #[test_case("?uid=123", PrimaryView::Profile("123".to_string()) ; "uid")]
    #[test_case("?directory=true&settings=true", PrimaryView::Settings ; "settings wins")]
    #[test_case("?calendar=true&directory=true", PrimaryView::Directory ; "directory wins")]
    #[test_case("?settings=true&uid=abc", PrimaryView::Profile("abc".to_string()) ; "uid first")]
    #[test_case("?settings=1", PrimaryView::Dashboard ; "only exact true counts")]
    #[test_case("?settings=TRUE", PrimaryView::Dashboard ; "case sensitive")]
    #[test_case("?uid=", PrimaryView::Dashboard ; "empty uid ignored")]
    fn dashboard_query_selects_one_view(search: &str, expected: PrimaryView) {
        assert_eq!(NavigationState::new("/", search).view(), expected);
    }

    #[test]
    fn profile_path_selects_profile() {
        assert_eq!(
            NavigationState::new("/profile/u7", "?settings=true").view(),
            PrimaryView::Profile("u7".to_string())
        );
        assert_eq!(
            NavigationState::new("/profile/", "").view(),
            PrimaryView::Dashboard
        );
    }

    #[test]
    fn href_round_trips_through_selection() {
        for view in [
            PrimaryView::Dashboard,
            PrimaryView::Settings,
            PrimaryView::Directory,
            PrimaryView::Calendar,
            PrimaryView::Profile("a b&c".to_string()),
        ] {
            let href = view.href();
            let (path, search) = href.split_once('?').unwrap_or((href.as_str(), ""));
            assert_eq!(NavigationState::new(path, search).view(), view);
        }
    }

    #[test]
    fn profile_highlights_directory_link() {
        let view = PrimaryView::Profile("u1".to_string());
        assert_eq!(view.breadcrumb(), "Profile");
        let active: Vec<NavLink> = NavLink::all().filter(|link| link.is_active(&view)).collect();
        assert_eq!(active, vec![NavLink::Directory]);
    }

    #[test]
    fn exactly_one_link_is_active_for_every_view() {
        for link in NavLink::all() {
            let view = link.view();
            assert_eq!(NavLink::all().filter(|l| l.is_active(&view)).count(), 1);
            assert_eq!(link.label(), view.breadcrumb());
        }
    }

    #[test]
    fn restored_pages_reload() {
        assert_eq!(PageShowAction::for_event(true), PageShowAction::Reload);
        assert_eq!(PageShowAction::for_event(false), PageShowAction::Ignore);
    }
}
