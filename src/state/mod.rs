//! State Module
//!
//! The in-memory key-value mapping and the rules for applying queries to it.
//!
//! ## Data Structure Choice
//! A `BTreeMap<String, String>`:
//! - Keys unique, values replaced in place
//! - Ordered iteration, so snapshots of equal states are byte-identical
//! - Owned exclusively by the engine; no locking

mod store;

pub use store::StateStore;

use crate::protocol::Response;

/// Result of applying one query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Response to hand back to the client
    pub response: Response,

    /// Whether the query counts as a mutation (logging and snapshot triggers).
    /// A mutation does not imply the state actually changed.
    pub mutated: bool,
}
