use crate::{
    models::{SortKey, SortOrder, Theme, UiPreferences},
    services::KeyValueStore,
};
use std::{fmt, rc::Rc};
use tracing::debug;

pub const SIDEBAR_COLLAPSED_KEY: &str = "sidebarCollapsed";
pub const DIRECTORY_SEARCH_KEY: &str = "directorySearch";
pub const DIRECTORY_SORT_KEY_KEY: &str = "directorySortKey";
pub const DIRECTORY_SORT_ORDER_KEY: &str = "directorySortOrder";
/// Global; kept across logouts.
pub const THEME_KEY: &str = "theme";

/// Keys removed on logout.
pub const SESSION_SCOPED_KEYS: [&str; 4] = [
    SIDEBAR_COLLAPSED_KEY,
    DIRECTORY_SEARCH_KEY,
    DIRECTORY_SORT_KEY_KEY,
    DIRECTORY_SORT_ORDER_KEY,
];

/// Reads and writes [`UiPreferences`] and the theme in local storage.
#[derive(Clone)]
pub struct PreferenceStore {
    storage: Rc<dyn KeyValueStore>,
}

impl PreferenceStore {
    #[must_use]
    pub fn new(storage: Rc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Rehydrate preferences; unreadable values fall back to defaults.
    #[must_use]
    pub fn load(&self) -> UiPreferences {
        let defaults = UiPreferences::default();
        UiPreferences {
            sidebar_collapsed: self
                .storage
                .get(SIDEBAR_COLLAPSED_KEY)
                .map_or(defaults.sidebar_collapsed, |value| value == "true"),
            directory_search_term: self
                .storage
                .get(DIRECTORY_SEARCH_KEY)
                .unwrap_or(defaults.directory_search_term),
            directory_sort_key: self
                .storage
                .get(DIRECTORY_SORT_KEY_KEY)
                .and_then(|value| value.parse::<SortKey>().ok())
                .unwrap_or(defaults.directory_sort_key),
            directory_sort_order: self
                .storage
                .get(DIRECTORY_SORT_ORDER_KEY)
                .and_then(|value| value.parse::<SortOrder>().ok())
                .unwrap_or(defaults.directory_sort_order),
        }
    }

    pub fn save(&self, preferences: &UiPreferences) {
        self.storage.set(
            SIDEBAR_COLLAPSED_KEY,
            if preferences.sidebar_collapsed {
                "true"
            } else {
                "false"
            },
        );
        self.storage
            .set(DIRECTORY_SEARCH_KEY, &preferences.directory_search_term);
        self.storage
            .set(DIRECTORY_SORT_KEY_KEY, preferences.directory_sort_key.as_str());
        self.storage.set(
            DIRECTORY_SORT_ORDER_KEY,
            preferences.directory_sort_order.as_str(),
        );
    }

    pub fn clear_session_scoped(&self) {
        debug!("clearing session-scoped preferences");
        for key in SESSION_SCOPED_KEYS {
            self.storage.remove(key);
        }
    }

    #[must_use]
    pub fn theme(&self) -> Option<Theme> {
        self.storage
            .get(THEME_KEY)
            .and_then(|value| value.parse().ok())
    }

    pub fn set_theme(&self, theme: Theme) {
        self.storage.set(THEME_KEY, theme.as_str());
    }
}

impl fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreferenceStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::memory::MemoryKeyValueStore;

    fn store() -> (Rc<MemoryKeyValueStore>, PreferenceStore) {
        let storage = Rc::new(MemoryKeyValueStore::new());
        let preferences = PreferenceStore::new(storage.clone());
        (storage, preferences)
    }

    #[test]
    fn saved_preferences_rehydrate() {
        let (_, preferences) = store();
        let mut prefs = UiPreferences {
            sidebar_collapsed: true,
            directory_search_term: "dc".to_string(),
            ..UiPreferences::default()
        };
        prefs.toggle_sort(SortKey::WireSign);
        prefs.toggle_sort(SortKey::WireSign);
        preferences.save(&prefs);

        assert_eq!(preferences.load(), prefs);
        assert_eq!(preferences.load().directory_sort_order, SortOrder::Desc);
    }

    #[test]
    fn garbage_values_fall_back_to_defaults() {
        let (storage, preferences) = store();
        storage.set(DIRECTORY_SORT_KEY_KEY, "salary");
        storage.set(DIRECTORY_SORT_ORDER_KEY, "sideways");
        storage.set(SIDEBAR_COLLAPSED_KEY, "yes");
        assert_eq!(preferences.load(), UiPreferences::default());
    }

    #[test]
    fn clearing_keeps_theme() {
        let (storage, preferences) = store();
        preferences.save(&UiPreferences {
            sidebar_collapsed: true,
            directory_search_term: "ab".to_string(),
            ..UiPreferences::default()
        });
        preferences.set_theme(Theme::Dark);

        preferences.clear_session_scoped();

        assert_eq!(storage.keys(), vec![THEME_KEY.to_string()]);
        assert_eq!(preferences.theme(), Some(Theme::Dark));
        assert_eq!(preferences.load(), UiPreferences::default());
    }
}
