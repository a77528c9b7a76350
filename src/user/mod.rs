//! Users who signed in through the OAuth login flow.
//!
//! A user is identified by the external account id issued by the identity
//! provider. Logging in upserts the profile, so repeated logins keep exactly
//! one record holding the latest values.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
