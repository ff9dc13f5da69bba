//! Response definitions
//!
//! Represents responses to clients and their text encoding.

use std::fmt;

/// A response to send to a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Get hit: `OK <value>`
    Value(String),

    /// Get miss: `-OK`
    NotFound,

    /// Set/Delete result: `OK 1` or `OK 0`
    Changed(bool),

    /// Any failure: `ERR <message>`
    Error(String),
}

impl Response {
    /// Create an ERROR response
    pub fn error(message: impl fmt::Display) -> Self {
        Response::Error(message.to_string())
    }

    /// Whether this is an `ERR` response
    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error(_))
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Value(value) => write!(f, "OK {}", value),
            Response::NotFound => f.write_str("-OK"),
            Response::Changed(changed) => write!(f, "OK {}", u8::from(*changed)),
            Response::Error(message) => write!(f, "ERR {}", message),
        }
    }
}
