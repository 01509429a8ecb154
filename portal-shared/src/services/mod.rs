//! # Collaborators
//!
//! Interfaces to the hosted identity provider, the hosted document store and
//! the browser's local storage. The core never talks to a backend directly;
//! the browser client supplies REST implementations and tests use the
//! in-memory ones from [`memory`].

pub mod documents;
pub mod identity;
pub mod memory;
pub mod storage;

pub use documents::{Direction, Document, DocumentStore, Fields, Filter, OrderBy, Query};
pub use identity::{IdentityProvider, SessionListener};
pub use storage::KeyValueStore;
