//! StateStore implementation

use std::collections::BTreeMap;

use crate::protocol::{Query, Response};

use super::Outcome;

/// In-memory key-value state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateStore {
    data: BTreeMap<String, String>,
}

impl StateStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a parsed query
    ///
    /// Every well-formed query is applicable, so this never fails.
    pub fn apply(&mut self, query: Query) -> Outcome {
        match query {
            Query::Get { key } => Outcome {
                response: match self.data.get(&key) {
                    Some(value) => Response::Value(value.clone()),
                    None => Response::NotFound,
                },
                mutated: false,
            },
            Query::Delete { key } => Outcome {
                response: Response::Changed(self.data.remove(&key).is_some()),
                mutated: true,
            },
            Query::Set { key, value } => Outcome {
                response: Response::Changed(self.data.insert(key, value).is_none()),
                mutated: true,
            },
        }
    }

    /// Get a value by key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate over all pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.data.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for StateStore {
    /// Later pairs win when a key repeats
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().collect(),
        }
    }
}
