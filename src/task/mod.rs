//! Guild-scoped task management.
//!
//! Tasks belong to a guild and are addressed by a guild-local number that is
//! allocated sequentially when the task is stored. Authors and executors may
//! update a task; only the author may delete it. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
