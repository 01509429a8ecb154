use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub const ENV_API_KEY: &str = "PORTAL_API_KEY";
pub const ENV_PROJECT_ID: &str = "PORTAL_PROJECT_ID";
pub const ENV_LOG_LEVEL: &str = "PORTAL_LOG_LEVEL";
pub const ENV_SESSION_CHECK_TIMEOUT_MS: &str = "PORTAL_SESSION_CHECK_TIMEOUT_MS";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid configuration document: {0}")]
    Parse(String),

    #[error("invalid {key} value: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Client configuration.
///
/// Fields missing from a JSON document keep their defaults.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct PortalConfig {
    /// Web API key of the hosted project.
    pub api_key: String,
    pub project_id: String,
    pub identity_base_url: String,
    pub token_base_url: String,
    pub documents_base_url: String,
    /// How long the guard may stay in `Checking` before giving up.
    pub session_check_timeout_ms: u64,
    /// Lifetime of success notices.
    pub notice_dismiss_ms: u64,
    pub log_level: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl PortalConfig {
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            api_key: String::new(),
            project_id: String::new(),
            identity_base_url: "https://identitytoolkit.googleapis.com/v1".to_string(),
            token_base_url: "https://securetoken.googleapis.com/v1".to_string(),
            documents_base_url: "https://firestore.googleapis.com/v1".to_string(),
            session_check_timeout_ms: 10_000,
            notice_dismiss_ms: 3_000,
            log_level: "info".to_string(),
        }
    }

    /// Parse a JSON document over the defaults.
    ///
    /// # Errors
    /// [`ConfigError::Parse`] when the document is not valid.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Apply overrides found through `lookup`, keyed by the `PORTAL_*` names.
    ///
    /// Empty values are ignored.
    ///
    /// # Errors
    /// [`ConfigError::InvalidValue`] when the timeout is not a number.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(api_key) = lookup(ENV_API_KEY) {
            self.api_key = api_key;
        }
        if let Some(project_id) = lookup(ENV_PROJECT_ID) {
            self.project_id = project_id;
        }
        if let Some(log_level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = log_level.to_ascii_lowercase();
        }
        if let Some(timeout) = lookup(ENV_SESSION_CHECK_TIMEOUT_MS) {
            self.session_check_timeout_ms =
                timeout
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        key: ENV_SESSION_CHECK_TIMEOUT_MS,
                        value: timeout.clone(),
                    })?;
        }
        Ok(())
    }

    /// Defaults overridden by the process environment.
    ///
    /// # Errors
    /// See [`PortalConfig::apply_overrides`].
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::with_defaults();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Report every problem at once.
    ///
    /// # Errors
    /// One message per invalid field.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.api_key.trim().is_empty() {
            errors.push(format!("api_key is empty; set {ENV_API_KEY}"));
        }
        if self.project_id.trim().is_empty() {
            errors.push(format!("project_id is empty; set {ENV_PROJECT_ID}"));
        }
        for (name, value) in [
            ("identity_base_url", &self.identity_base_url),
            ("token_base_url", &self.token_base_url),
            ("documents_base_url", &self.documents_base_url),
        ] {
            match Url::parse(value) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => {}
                Ok(url) => errors.push(format!("{name} must be http(s), got {}", url.scheme())),
                Err(err) => errors.push(format!("{name} is not a valid URL: {err}")),
            }
        }
        if self.session_check_timeout_ms == 0 {
            errors.push("session_check_timeout_ms must be greater than 0".to_string());
        }
        if self.notice_dismiss_ms == 0 {
            errors.push("notice_dismiss_ms must be greater than 0".to_string());
        }
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            errors.push(format!(
                "log_level must be one of {}, got {}",
                LOG_LEVELS.join(", "),
                self.log_level
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Identity toolkit endpoint for `method`, e.g. `signInWithPassword`.
    #[must_use]
    pub fn identity_url(&self, method: &str) -> String {
        format!(
            "{}/accounts:{method}?key={}",
            self.identity_base_url.trim_end_matches('/'),
            self.api_key
        )
    }

    #[must_use]
    pub fn token_url(&self) -> String {
        format!(
            "{}/token?key={}",
            self.token_base_url.trim_end_matches('/'),
            self.api_key
        )
    }

    /// Root of the project's document tree.
    #[must_use]
    pub fn documents_root(&self) -> String {
        format!(
            "{}/projects/{}/databases/(default)/documents",
            self.documents_base_url.trim_end_matches('/'),
            self.project_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    fn configured() -> PortalConfig {
        PortalConfig {
            api_key: "key".to_string(),
            project_id: "portal".to_string(),
            ..PortalConfig::with_defaults()
        }
    }

    fn cleanup_env_vars() {
        unsafe {
            std::env::remove_var(ENV_API_KEY);
            std::env::remove_var(ENV_PROJECT_ID);
            std::env::remove_var(ENV_LOG_LEVEL);
            std::env::remove_var(ENV_SESSION_CHECK_TIMEOUT_MS);
        }
    }

    #[test]
    fn test_config_with_defaults() {
        let config = PortalConfig::with_defaults();
        assert_eq!(config.session_check_timeout_ms, 10_000);
        assert_eq!(config.log_level, "info");
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            PortalConfig::from_json(r#"{ "api_key": "abc", "project_id": "p1" }"#).unwrap();
        assert_eq!(config.api_key, "abc");
        assert_eq!(config.notice_dismiss_ms, 3_000);
        assert!(config.validate().is_ok());

        assert!(matches!(
            PortalConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_overrides_from_lookup() {
        let values: HashMap<&str, &str> = HashMap::from([
            (ENV_API_KEY, "from-env"),
            (ENV_LOG_LEVEL, "DEBUG"),
            (ENV_SESSION_CHECK_TIMEOUT_MS, "2500"),
            (ENV_PROJECT_ID, "  "),
        ]);
        let mut config = configured();
        config
            .apply_overrides(|key| values.get(key).map(ToString::to_string))
            .unwrap();

        assert_eq!(config.api_key, "from-env");
        assert_eq!(config.project_id, "portal");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.session_check_timeout_ms, 2_500);
    }

    #[test]
    fn test_invalid_timeout_override() {
        let mut config = configured();
        let err = config
            .apply_overrides(|key| {
                (key == ENV_SESSION_CHECK_TIMEOUT_MS).then(|| "soon".to_string())
            })
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: ENV_SESSION_CHECK_TIMEOUT_MS,
                value: "soon".to_string()
            }
        );
    }

    #[test]
    #[serial]
    fn test_from_env() {
        cleanup_env_vars();
        unsafe {
            std::env::set_var(ENV_API_KEY, "env-key");
            std::env::set_var(ENV_PROJECT_ID, "env-project");
        }

        let config = PortalConfig::from_env().unwrap();
        assert_eq!(config.api_key, "env-key");
        assert_eq!(config.project_id, "env-project");
        assert_eq!(config.session_check_timeout_ms, 10_000);

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_without_variables() {
        cleanup_env_vars();
        let config = PortalConfig::from_env().unwrap();
        assert_eq!(config, PortalConfig::with_defaults());
    }

    #[test]
    fn test_validate_collects_every_problem() {
        let config = PortalConfig {
            identity_base_url: "not a url".to_string(),
            documents_base_url: "ftp://files".to_string(),
            session_check_timeout_ms: 0,
            log_level: "loud".to_string(),
            ..PortalConfig::with_defaults()
        };
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 6);
        assert!(errors.iter().any(|e| e.contains("api_key")));
        assert!(errors.iter().any(|e| e.contains("documents_base_url must be http(s)")));
        assert!(errors.iter().any(|e| e.contains("log_level")));
    }

    #[test]
    fn test_endpoint_builders() {
        let config = configured();
        assert_eq!(
            config.identity_url("signInWithPassword"),
            "https://identitytoolkit.googleapis.com/v1/accounts:signInWithPassword?key=key"
        );
        assert_eq!(
            config.token_url(),
            "https://securetoken.googleapis.com/v1/token?key=key"
        );
        assert_eq!(
            config.documents_root(),
            "https://firestore.googleapis.com/v1/projects/portal/databases/(default)/documents"
        );
    }
}
