//! Tests for UpdateBatch

use statekv::statedb::Update;
use statekv::{Height, UpdateBatch, VersionedValue};

#[test]
fn test_new_batch_is_empty() {
    let batch = UpdateBatch::new();
    assert!(batch.is_empty());
    assert_eq!(batch.len(), 0);
    assert!(batch.updated_namespaces().is_empty());
}

#[test]
fn test_put_and_get() {
    let mut batch = UpdateBatch::new();
    batch.put("ns1", "key1", b"value1".to_vec(), Height::new(1, 1));

    assert!(batch.exists("ns1", "key1"));
    assert!(!batch.exists("ns1", "key2"));
    assert!(!batch.exists("ns2", "key1"));
    assert_eq!(
        batch.get("ns1", "key1"),
        Some(&Update::Put(VersionedValue::new(b"value1".to_vec(), Height::new(1, 1))))
    );
}

#[test]
fn test_delete_is_tombstone() {
    let mut batch = UpdateBatch::new();
    batch.delete("ns1", "key1", Height::new(2, 0));

    let update = batch.get("ns1", "key1").unwrap();
    assert!(update.is_delete());
    assert_eq!(update.version(), Height::new(2, 0));
}

#[test]
fn test_later_update_replaces_earlier() {
    let mut batch = UpdateBatch::new();
    batch.put("ns1", "key1", b"v1".to_vec(), Height::new(1, 0));
    batch.delete("ns1", "key1", Height::new(1, 1));

    assert_eq!(batch.len(), 1);
    assert!(batch.get("ns1", "key1").unwrap().is_delete());
}

#[test]
fn test_put_with_metadata() {
    let mut batch = UpdateBatch::new();
    batch.put_with_metadata("ns1", "key1", b"v".to_vec(), b"meta".to_vec(), Height::new(1, 0));

    match batch.get("ns1", "key1") {
        Some(Update::Put(vv)) => assert_eq!(vv.metadata.as_deref(), Some(&b"meta"[..])),
        other => panic!("Expected put, got {:?}", other),
    }
}

#[test]
fn test_namespaces_and_updates_are_sorted() {
    let mut batch = UpdateBatch::new();
    batch.put("ns2", "b", b"1".to_vec(), Height::new(1, 0));
    batch.put("ns1", "z", b"2".to_vec(), Height::new(1, 1));
    batch.put("ns1", "a", b"3".to_vec(), Height::new(1, 2));

    assert_eq!(batch.updated_namespaces(), vec!["ns1", "ns2"]);

    let keys: Vec<&str> = batch.updates("ns1").map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["a", "z"]);
    assert_eq!(batch.updates("missing").count(), 0);
    assert_eq!(batch.len(), 3);
}
