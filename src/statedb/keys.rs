//! Composite key scheme
//!
//! Flattens (store, namespace, key) into one backend key. The separator sorts
//! below every other character, so backend order over composite keys equals
//! per-namespace order over user keys.

use crate::error::{Result, StateError};

/// Separator between store, namespace and user key
pub const COMPOSITE_KEY_SEP: char = '\u{0}';

/// Terminator one past every key of a namespace, used for open-ended scans
pub const NAMESPACE_END: char = '\u{1}';

/// Reserved namespace holding per-store bookkeeping
pub const SAVEPOINT_NAMESPACE: &str = "_";

const SAVEPOINT_KEY: &str = "last_save_point";

pub fn composite_key(store: &str, namespace: &str, key: &str) -> String {
    let mut composite = String::with_capacity(store.len() + namespace.len() + key.len() + 2);
    composite.push_str(store);
    composite.push(COMPOSITE_KEY_SEP);
    composite.push_str(namespace);
    composite.push(COMPOSITE_KEY_SEP);
    composite.push_str(key);
    composite
}

pub fn savepoint_key(store: &str) -> String {
    composite_key(store, SAVEPOINT_NAMESPACE, SAVEPOINT_KEY)
}

/// Exclusive upper bound covering every key in `namespace`
pub fn namespace_end_key(store: &str, namespace: &str) -> String {
    let mut end = composite_key(store, namespace, "");
    end.pop();
    end.push(NAMESPACE_END);
    end
}

/// Recover `(namespace, key)` from a composite key.
///
/// Splits on the first two separators only, so the user key may itself
/// contain the separator. Store and namespace names never do; see
/// [`validate_store_name`] and [`validate_namespace`].
pub fn split_composite_key(composite: &str) -> Result<(&str, &str)> {
    let mut parts = composite.splitn(3, COMPOSITE_KEY_SEP);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(_store), Some(namespace), Some(key)) => Ok((namespace, key)),
        _ => Err(StateError::Decoding(format!(
            "malformed composite key: {:?}",
            composite
        ))),
    }
}

pub(crate) fn validate_store_name(store: &str) -> Result<()> {
    if store.is_empty() {
        return Err(StateError::InvalidKey("store name is empty".to_string()));
    }
    if store.contains(COMPOSITE_KEY_SEP) {
        return Err(StateError::InvalidKey(format!(
            "store name {:?} contains the key separator",
            store
        )));
    }
    Ok(())
}

pub(crate) fn validate_namespace(namespace: &str) -> Result<()> {
    if namespace.is_empty() {
        return Err(StateError::InvalidKey("namespace is empty".to_string()));
    }
    if namespace == SAVEPOINT_NAMESPACE {
        return Err(StateError::InvalidKey(format!(
            "namespace {:?} is reserved",
            namespace
        )));
    }
    if namespace.contains(COMPOSITE_KEY_SEP) {
        return Err(StateError::InvalidKey(format!(
            "namespace {:?} contains the key separator",
            namespace
        )));
    }
    Ok(())
}
