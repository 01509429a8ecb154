use gloo_storage::{LocalStorage, Storage};
use shared::services::KeyValueStore;
use tracing::warn;

/// [`KeyValueStore`] over `window.localStorage`, values stored as raw strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStorage;

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        match LocalStorage::raw().get_item(key) {
            Ok(value) => value,
            Err(err) => {
                warn!(key, error = ?err, "local storage read failed");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(err) = LocalStorage::raw().set_item(key, value) {
            warn!(key, error = ?err, "local storage write failed");
        }
    }

    fn remove(&self, key: &str) {
        LocalStorage::delete(key);
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn values_are_stored_verbatim() {
        let storage = BrowserStorage;
        storage.set("portal.test.flag", "true");
        assert_eq!(storage.get("portal.test.flag").as_deref(), Some("true"));
        storage.remove("portal.test.flag");
        assert_eq!(storage.get("portal.test.flag"), None);
    }
}
