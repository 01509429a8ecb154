/// Synchronous string storage scoped to the browser profile.
///
/// Writes are best effort: an implementation that cannot persist a value
/// logs and carries on.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}
