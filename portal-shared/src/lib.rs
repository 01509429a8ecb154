#![cfg_attr(not(test), forbid(unsafe_code))]
#![deny(warnings, clippy::pedantic)]

//! Domain core of the employee portal.
//!
//! Everything that decides what a visitor may see lives here: the session
//! store wrapping the identity provider, the profile cache, the route guard
//! state machine, the query-string navigation controller and the shared form
//! validation rules. The browser client in `portal-web` only renders what these
//! types decide.

pub mod accounts;
pub mod activity;
pub mod admin;
pub mod calendar;
pub mod config;
pub mod directory;
pub mod guard;
pub mod models;
pub mod navigation;
pub mod services;
pub mod session;
pub mod validation;

pub use models::errors::{self, AccessError, AuthError, PortalError, RemoteFailure};
pub use validation::{ValidationError, ValidationErrors};
