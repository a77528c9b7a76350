//! TaskChord: guild-scoped task tracking over Discord and HTTP.
//!
//! Members of a Discord guild create, list, update and delete tasks through
//! slash commands or a REST API. Tasks are numbered per guild starting at 1,
//! and numbers are never reused.
//!
//! # Architecture
//!
//! Each bounded context follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, APIs, etc.)
//! - **Services**: Orchestration of domain rules over ports
//!
//! # Modules
//!
//! - [`task`]: Task numbering, ownership and lifecycle
//! - [`user`]: Accounts created through OAuth login
//! - [`auth`]: OAuth2 login against Discord
//! - [`controller`]: Logging and error taxonomy shared by all surfaces
//! - [`discord`]: Slash-command definitions, parsing, handling and registration
//! - [`http`]: REST API routes
//! - [`app`]: Composition root

pub mod app;
pub mod auth;
pub mod cache;
pub mod config;
pub mod controller;
pub mod discord;
pub mod http;
pub mod postgres;
pub mod task;
pub mod telemetry;
pub mod user;
