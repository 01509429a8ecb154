use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use strum::{EnumIter, IntoEnumIterator};

/// Collection holding one profile document per identity uid.
pub const USERS_COLLECTION: &str = "users";

/// Application role stored on the profile document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter)]
pub enum Role {
    #[default]
    User,
    Employee,
    Admin,
}

impl Role {
    /// Return the canonical string representation expected by the document store.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Employee => "Employee",
            Self::Admin => "Admin",
        }
    }

    #[must_use]
    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    pub fn all() -> impl Iterator<Item = Self> {
        Self::iter()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = &'static str;

    /// Stored documents mix `"admin"` and `"Admin"`, so matching ignores case.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "employee" => Ok(Self::Employee),
            "admin" => Ok(Self::Admin),
            _ => Err("unknown role"),
        }
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// The portal's record of a person, keyed by identity uid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Filled from the document id when the stored fields omit it.
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub wire_sign: String,
    #[serde(default)]
    pub contact: String,
    #[serde(
        rename = "photoURL",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "empty_as_none"
    )]
    pub photo_url: Option<String>,
}

impl Profile {
    /// Greeting name, falling back to the role like the dashboard banner does.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            self.role.as_str()
        } else {
            &self.name
        }
    }

    /// Single uppercase letter used by the avatar placeholder.
    #[must_use]
    pub fn initial(&self) -> char {
        self.name
            .trim()
            .chars()
            .next()
            .map_or('U', |c| c.to_ascii_uppercase())
    }
}

/// Normalized fields the settings page may change.
///
/// Only produced by [`crate::validation::SettingsForm::validate`].
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: String,
    pub wire_sign: String,
    pub contact: String,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
}

fn empty_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|value| !value.trim().is_empty()))
}
