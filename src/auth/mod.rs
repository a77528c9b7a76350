//! OAuth2 login against an external identity provider.
//!
//! [`LoginService`] issues a one-time `state` value with every authorization
//! URL, checks it on the callback, exchanges the code for an access token,
//! fetches the account and upserts it as a user.

pub mod discord;
pub mod ports;
mod service;

pub use service::{LOGIN_STATE_TTL_SECS, LoginError, LoginResult, LoginService};
