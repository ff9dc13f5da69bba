//! Query definitions
//!
//! Represents commands from clients once parsed.

/// Recognized command names (case-sensitive)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandName {
    Get,
    Delete,
    Set,
}

impl CommandName {
    /// All names in the order they are advertised to clients
    pub const ALL: [CommandName; 3] = [CommandName::Get, CommandName::Delete, CommandName::Set];

    /// Match a raw token against the command set
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|name| name.as_str() == token)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CommandName::Get => "get",
            CommandName::Delete => "delete",
            CommandName::Set => "set",
        }
    }
}

/// A parsed query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Read a value by key
    Get { key: String },

    /// Remove a key if present
    Delete { key: String },

    /// Insert or replace a key
    Set { key: String, value: String },
}

impl Query {
    /// Get the command name
    pub fn name(&self) -> CommandName {
        match self {
            Query::Get { .. } => CommandName::Get,
            Query::Delete { .. } => CommandName::Delete,
            Query::Set { .. } => CommandName::Set,
        }
    }

    /// The key this query targets
    pub fn key(&self) -> &str {
        match self {
            Query::Get { key } | Query::Delete { key } | Query::Set { key, .. } => key,
        }
    }

    /// Whether applying this query counts as a mutation
    ///
    /// `Delete` counts even when the key is absent.
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Query::Get { .. })
    }
}
