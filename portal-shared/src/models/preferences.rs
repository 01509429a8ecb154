use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use strum::{EnumIter, IntoEnumIterator};

/// Column the directory table is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    #[default]
    Name,
    WireSign,
    Email,
    Contact,
}

impl SortKey {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::WireSign => "wireSign",
            Self::Email => "email",
            Self::Contact => "contact",
        }
    }

    /// Column heading.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::WireSign => "Wire Sign",
            Self::Email => "Email",
            Self::Contact => "Contact",
        }
    }

    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }
}

impl FromStr for SortKey {
    type Err = &'static str;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::iter()
            .find(|key| key.as_str() == value)
            .ok_or("unknown sort key")
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    /// Arrow shown next to the active column.
    #[must_use]
    pub fn indicator(self) -> &'static str {
        match self {
            Self::Asc => "▲",
            Self::Desc => "▼",
        }
    }
}

impl FromStr for SortOrder {
    type Err = &'static str;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err("unknown sort order"),
        }
    }
}

/// Session-scoped UI state persisted in local storage.
///
/// Cleared on logout so the next account starts from defaults.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UiPreferences {
    pub sidebar_collapsed: bool,
    pub directory_search_term: String,
    pub directory_sort_key: SortKey,
    pub directory_sort_order: SortOrder,
}

impl UiPreferences {
    /// Select a directory column: the same column flips the order, a new
    /// column starts ascending.
    pub fn toggle_sort(&mut self, key: SortKey) {
        if self.directory_sort_key == key {
            self.directory_sort_order = self.directory_sort_order.flipped();
        } else {
            self.directory_sort_key = key;
            self.directory_sort_order = SortOrder::Asc;
        }
    }
}

/// Colour scheme. Global; survives logout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Saved choice wins; otherwise follow the system preference.
    #[must_use]
    pub fn resolve(saved: Option<Self>, system_prefers_dark: bool) -> Self {
        saved.unwrap_or(if system_prefers_dark {
            Self::Dark
        } else {
            Self::Light
        })
    }
}

impl FromStr for Theme {
    type Err = &'static str;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            _ => Err("unknown theme"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_sort_flips_then_resets() {
        let mut prefs = UiPreferences::default();
        assert_eq!(prefs.directory_sort_key, SortKey::Name);

        prefs.toggle_sort(SortKey::Name);
        assert_eq!(prefs.directory_sort_order, SortOrder::Desc);

        prefs.toggle_sort(SortKey::Email);
        assert_eq!(prefs.directory_sort_key, SortKey::Email);
        assert_eq!(prefs.directory_sort_order, SortOrder::Asc);
    }

    #[test]
    fn sort_key_round_trips_through_storage_text() {
        for key in SortKey::all() {
            assert_eq!(key.as_str().parse::<SortKey>().unwrap(), key);
        }
        assert!("phone".parse::<SortKey>().is_err());
    }

    #[test]
    fn theme_resolution() {
        assert_eq!(Theme::resolve(None, true), Theme::Dark);
        assert_eq!(Theme::resolve(None, false), Theme::Light);
        assert_eq!(Theme::resolve(Some(Theme::Light), true), Theme::Light);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
    }
}
