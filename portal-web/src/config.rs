//! Client configuration
//!
//! The bundle has no process environment at runtime, so `PORTAL_*` values are
//! captured when the crate is compiled and layered over the defaults.

use shared::config::{ConfigError, PortalConfig, portal};

/// Value of a `PORTAL_*` variable as seen at compile time.
fn compiled_value(key: &str) -> Option<String> {
    let value = match key {
        portal::ENV_API_KEY => option_env!("PORTAL_API_KEY"),
        portal::ENV_PROJECT_ID => option_env!("PORTAL_PROJECT_ID"),
        portal::ENV_LOG_LEVEL => option_env!("PORTAL_LOG_LEVEL"),
        portal::ENV_SESSION_CHECK_TIMEOUT_MS => option_env!("PORTAL_SESSION_CHECK_TIMEOUT_MS"),
        _ => None,
    };
    value.map(str::to_string)
}

/// Defaults overridden by the compiled-in environment.
///
/// # Errors
/// [`ConfigError::InvalidValue`] when a compiled-in value does not parse.
pub fn load() -> Result<PortalConfig, ConfigError> {
    let mut config = PortalConfig::with_defaults();
    config.apply_overrides(compiled_value)?;
    Ok(config)
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn loaded_config_keeps_hosted_endpoints() {
        let config = load().unwrap();
        assert!(config.identity_base_url.starts_with("https://"));
        assert!(config.documents_root().ends_with("/documents"));
        assert!(config.session_check_timeout_ms > 0);
    }

    #[wasm_bindgen_test]
    fn unknown_keys_have_no_value() {
        assert_eq!(compiled_value("PORTAL_NOT_A_SETTING"), None);
    }
}
