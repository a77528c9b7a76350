//! Error types for task domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The guild identifier is empty or malformed.
    #[error("invalid guild id '{0}'")]
    InvalidGuildId(String),

    /// The user identifier is empty or malformed.
    #[error("invalid user id '{0}'")]
    InvalidUserId(String),

    /// The task number is not a positive integer.
    #[error("invalid task number '{0}', expected a positive integer")]
    InvalidTaskNumber(String),

    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The task title exceeds the maximum length.
    #[error("task title is {actual} characters long, limit is {max}")]
    TitleTooLong {
        /// Maximum permitted length in characters.
        max: usize,
        /// Actual length in characters.
        actual: usize,
    },

    /// The task description exceeds the maximum length.
    #[error("task description is {actual} characters long, limit is {max}")]
    DescriptionTooLong {
        /// Maximum permitted length in characters.
        max: usize,
        /// Actual length in characters.
        actual: usize,
    },

    /// The priority value is not one of `High`, `Medium`, `Low`.
    #[error(transparent)]
    InvalidPriority(#[from] ParsePriorityError),
}

/// Error returned while parsing task priorities.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid priority '{0}', expected one of High, Medium, Low")]
pub struct ParsePriorityError(pub String);
