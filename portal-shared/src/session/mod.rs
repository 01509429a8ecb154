//! # Session
//!
//! [`SessionStore`] owns the provider session, the profile cache and the
//! guard state. It is created once by the application shell and handed to
//! views through context; tests build one over the in-memory collaborators.

pub mod preferences;
pub mod profile_cache;
pub mod store;
pub mod subscription;

pub use preferences::PreferenceStore;
pub use profile_cache::{ProfileCache, load_profile};
pub use store::{SessionEvents, SessionStore};
pub use subscription::{ListenerRegistry, Liveness, Subscription};
