//! Query parser
//!
//! Turns one raw text line into a [`Query`].
//!
//! ## Grammar
//! ```text
//! get <key>
//! delete <key>
//! set <key> <value>
//! set <key> "<value with spaces>"
//! ```
//!
//! Tokens are separated by single spaces. Keys may not be empty or contain
//! whitespace. A `set` value spanning several tokens must be wrapped in
//! double quotes; the quotes are stripped.

use thiserror::Error;

use super::{CommandName, Query};

const QUOTE: char = '"';

/// Reasons a raw line is not a valid query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("No command was provided.")]
    NoCommand,

    #[error("Invalid command. Must be one of get, delete, set.")]
    InvalidCommand,

    #[error("Invalid number of arguments. Maybe you forgot to add the second double quote?")]
    InvalidArgumentCount,
}

/// Parse a raw command line
pub fn parse(raw: &str) -> Result<Query, ParseError> {
    if raw.is_empty() {
        return Err(ParseError::NoCommand);
    }

    let tokens: Vec<&str> = raw.split(' ').collect();
    let [name, args @ ..] = tokens.as_slice() else {
        return Err(ParseError::NoCommand);
    };

    let command = CommandName::from_token(name).ok_or(ParseError::InvalidCommand)?;

    match (command, args) {
        (CommandName::Get, [key]) => Ok(Query::Get {
            key: parse_key(key)?,
        }),
        (CommandName::Delete, [key]) => Ok(Query::Delete {
            key: parse_key(key)?,
        }),
        (CommandName::Set, [key, value @ ..]) if !value.is_empty() => Ok(Query::Set {
            key: parse_key(key)?,
            value: parse_value(value)?,
        }),
        _ => Err(ParseError::InvalidArgumentCount),
    }
}

fn parse_key(token: &str) -> Result<String, ParseError> {
    if token.is_empty() || token.chars().any(char::is_whitespace) {
        return Err(ParseError::InvalidArgumentCount);
    }
    Ok(token.to_string())
}

/// Build a value from the tokens following the key
fn parse_value(tokens: &[&str]) -> Result<String, ParseError> {
    match tokens {
        [single] => strip_quotes(single),
        [first, .., last] if first.starts_with(QUOTE) && last.ends_with(QUOTE) => {
            strip_quotes(&tokens.join(" "))
        }
        _ => Err(ParseError::InvalidArgumentCount),
    }
}

/// Strip a surrounding pair of quotes; an opening quote with no closing one is rejected
fn strip_quotes(value: &str) -> Result<String, ParseError> {
    if !value.starts_with(QUOTE) {
        return Ok(value.to_string());
    }

    value
        .strip_prefix(QUOTE)
        .and_then(|rest| rest.strip_suffix(QUOTE))
        .map(str::to_string)
        .ok_or(ParseError::InvalidArgumentCount)
}
