//! Tests for StateStore
//!
//! These tests verify:
//! - Response and mutation flag for each query kind
//! - Delete idempotence
//! - Ordered iteration

use relaykv::protocol::{parse, Query, Response};
use relaykv::state::{Outcome, StateStore};

// =============================================================================
// Helper Functions
// =============================================================================

fn get(key: &str) -> Query {
    Query::Get {
        key: key.to_string(),
    }
}

fn delete(key: &str) -> Query {
    Query::Delete {
        key: key.to_string(),
    }
}

fn set(key: &str, value: &str) -> Query {
    Query::Set {
        key: key.to_string(),
        value: value.to_string(),
    }
}

// =============================================================================
// Get
// =============================================================================

#[test]
fn test_get_missing_key() {
    let mut store = StateStore::new();

    let outcome = store.apply(get("nope"));

    assert_eq!(
        outcome,
        Outcome {
            response: Response::NotFound,
            mutated: false
        }
    );
}

#[test]
fn test_get_present_key() {
    let mut store = StateStore::new();
    store.apply(set("user:1", "Violet"));

    let outcome = store.apply(get("user:1"));

    assert_eq!(outcome.response, Response::Value("Violet".to_string()));
    assert!(!outcome.mutated);
}

// =============================================================================
// Set
// =============================================================================

#[test]
fn test_set_new_then_overwrite() {
    let mut store = StateStore::new();

    let first = store.apply(set("a", "1"));
    let second = store.apply(set("a", "2"));

    assert_eq!(first.response, Response::Changed(true));
    assert_eq!(second.response, Response::Changed(false));
    assert!(first.mutated && second.mutated);
    assert_eq!(store.get("a"), Some("2"));
    assert_eq!(store.len(), 1);
}

// =============================================================================
// Delete
// =============================================================================

#[test]
fn test_delete_present_twice() {
    let mut store = StateStore::new();
    store.apply(set("k", "v"));

    assert_eq!(store.apply(delete("k")).response, Response::Changed(true));
    assert_eq!(store.apply(delete("k")).response, Response::Changed(false));
    assert!(store.is_empty());
}

#[test]
fn test_delete_absent_twice() {
    let mut store = StateStore::new();

    assert_eq!(store.apply(delete("k")).response, Response::Changed(false));
    assert_eq!(store.apply(delete("k")).response, Response::Changed(false));
}

#[test]
fn test_delete_absent_still_counts_as_mutation() {
    // Spurious mutation on a missing key is kept: it drives log rotation
    // and snapshot timing
    let mut store = StateStore::new();

    let outcome = store.apply(delete("missing"));

    assert!(outcome.mutated);
    assert!(store.is_empty());
}

// =============================================================================
// Scenario
// =============================================================================

#[test]
fn test_set_set_get_delete_get_sequence() {
    let mut store = StateStore::new();
    let responses: Vec<String> = ["set a 1", "set a 2", "get a", "delete a", "get a"]
        .iter()
        .map(|raw| store.apply(parse(raw).unwrap()).response.to_string())
        .collect();

    assert_eq!(responses, vec!["OK 1", "OK 0", "OK 2", "OK 1", "-OK"]);
}

// =============================================================================
// Iteration
// =============================================================================

#[test]
fn test_iter_is_key_ordered() {
    let mut store = StateStore::new();
    store.apply(set("c", "3"));
    store.apply(set("a", "1"));
    store.apply(set("b", "2"));

    let pairs: Vec<(&str, &str)> = store.iter().collect();

    assert_eq!(pairs, vec![("a", "1"), ("b", "2"), ("c", "3")]);
}

#[test]
fn test_from_iter_last_pair_wins() {
    let store: StateStore = vec![
        ("k".to_string(), "old".to_string()),
        ("k".to_string(), "new".to_string()),
    ]
    .into_iter()
    .collect();

    assert_eq!(store.get("k"), Some("new"));
    assert_eq!(store.len(), 1);
}
