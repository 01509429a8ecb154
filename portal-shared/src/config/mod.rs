//! # Configuration
//!
//! Endpoints, credentials and timings for the portal client.

pub mod portal;

pub use portal::{ConfigError, PortalConfig};
