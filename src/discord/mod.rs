//! Discord chat-command adapter.
//!
//! Invocations arrive either from a gateway integration, built with
//! [`CommandInvocation`]'s builder, or as `/command key=value` text. The
//! [`CommandHandler`] validates them against the registered definitions,
//! calls the task controller and renders a [`CommandReply`].

pub mod commands;
mod error;
mod handler;
mod invocation;
mod names;
mod parser;
pub mod registration;
mod render;

pub use error::CommandError;
pub use handler::CommandHandler;
pub use invocation::{CommandInvocation, user_id_from_mention};
pub use names::DisplayNameCache;
pub use parser::ParsedCommand;
pub use render::{CommandReply, Embed, EmbedField, ReplyRenderer, TaskPeople};
