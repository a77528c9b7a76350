//! Errors for chat command parsing and validation.

use thiserror::Error;

/// Errors raised before a chat command reaches the controller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandError {
    /// Input was empty.
    #[error("command input cannot be empty")]
    EmptyInput,

    /// Input does not start with `/`.
    #[error("commands must start with '/'")]
    MissingLeadingSlash,

    /// A token does not match `key=value`.
    #[error("invalid option '{token}': expected key=value")]
    InvalidOptionToken {
        /// The malformed token text.
        token: String,
    },

    /// A quoted value was not terminated.
    #[error("unterminated quoted value")]
    UnterminatedQuotedValue,

    /// The same option was given twice.
    #[error("duplicate option '{0}'")]
    DuplicateOption(String),

    /// The command is not one of the registered commands.
    #[error("unknown command '/{0}'")]
    UnknownCommand(String),

    /// The option does not exist on the command.
    #[error("unknown option '{option}' for '/{command}'")]
    UnknownOption {
        /// Command name.
        command: String,
        /// Unknown option name.
        option: String,
    },

    /// A required option is absent.
    #[error("missing required option '{option}' for '/{command}'")]
    MissingOption {
        /// Command name.
        command: String,
        /// Missing option name.
        option: String,
    },

    /// The option value is not one of the declared choices.
    #[error("'{value}' is not a valid {option}; expected one of {choices}")]
    InvalidChoice {
        /// Option name.
        option: String,
        /// Supplied value.
        value: String,
        /// Allowed values, comma separated.
        choices: String,
    },
}
