//! Step definitions for task numbering scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
