//! Parser for `/<command> key=value key2="quoted value"` text.

use super::CommandError;
use std::collections::BTreeMap;

/// Raw command text split into a command name and its options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    command: String,
    options: BTreeMap<String, String>,
}

impl ParsedCommand {
    /// Parses command text.
    ///
    /// Keys and the command name are lower-cased; values keep their case.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] when the input is empty or malformed.
    pub fn parse(raw_input: &str) -> Result<Self, CommandError> {
        let trimmed = raw_input.trim();
        if trimmed.is_empty() {
            return Err(CommandError::EmptyInput);
        }

        let tokens = tokenize(trimmed)?;
        let (command_token, option_tokens) =
            tokens.split_first().ok_or(CommandError::EmptyInput)?;
        let command = parse_command_token(command_token)?;

        let mut options = BTreeMap::new();
        for token in option_tokens {
            let (key, value) =
                token
                    .split_once('=')
                    .ok_or_else(|| CommandError::InvalidOptionToken {
                        token: token.to_owned(),
                    })?;

            if key.is_empty() || !is_valid_identifier(key) {
                return Err(CommandError::InvalidOptionToken {
                    token: token.to_owned(),
                });
            }

            let normalized_key = key.to_ascii_lowercase();
            if options
                .insert(normalized_key.clone(), value.to_owned())
                .is_some()
            {
                return Err(CommandError::DuplicateOption(normalized_key));
            }
        }

        Ok(Self { command, options })
    }

    /// Returns the command name without the leading slash.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Returns option values as raw strings.
    #[must_use]
    pub const fn options(&self) -> &BTreeMap<String, String> {
        &self.options
    }

    /// Splits into command name and options.
    #[must_use]
    pub fn into_parts(self) -> (String, BTreeMap<String, String>) {
        (self.command, self.options)
    }
}

fn parse_command_token(token: &str) -> Result<String, CommandError> {
    let command = token
        .strip_prefix('/')
        .ok_or(CommandError::MissingLeadingSlash)?;
    if command.is_empty() || !is_valid_identifier(command) {
        return Err(CommandError::UnknownCommand(command.to_owned()));
    }
    Ok(command.to_ascii_lowercase())
}

fn tokenize(input: &str) -> Result<Vec<String>, CommandError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes: Option<char> = None;
    let mut escaped = false;

    for character in input.chars() {
        if let Some(quote_char) = in_quotes {
            if escaped {
                current.push(character);
                escaped = false;
                continue;
            }

            match character {
                '\\' => escaped = true,
                _ if character == quote_char => in_quotes = None,
                _ => current.push(character),
            }
            continue;
        }

        match character {
            '"' | '\'' => in_quotes = Some(character),
            _ if character.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(character),
        }
    }

    if in_quotes.is_some() || escaped {
        return Err(CommandError::UnterminatedQuotedValue);
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    Ok(tokens)
}

fn is_valid_identifier(value: &str) -> bool {
    value
        .chars()
        .all(|character| character.is_ascii_alphanumeric() || matches!(character, '-' | '_'))
}
