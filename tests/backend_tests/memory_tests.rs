//! Tests for MemoryBackend and its paged cursor

use statekv::backend::{KvBackend, KvCursor, MemoryBackend, CURSOR_PAGE_SIZE};

// =============================================================================
// Helper Functions
// =============================================================================

fn populate(backend: &MemoryBackend, n: usize) {
    for i in 0..n {
        backend.set(&format!("key_{:05}", i), &[(i % 256) as u8]).unwrap();
    }
}

fn drain(cursor: &mut dyn KvCursor) -> Vec<String> {
    let mut keys = Vec::new();
    while let Some((key, _)) = cursor.next_entry().unwrap() {
        keys.push(key);
    }
    keys
}

// =============================================================================
// Cursor Tests
// =============================================================================

#[test]
fn test_cursor_copies_one_page_at_a_time() {
    let backend = MemoryBackend::new();
    populate(&backend, CURSOR_PAGE_SIZE * 4);

    let mut cursor = backend.cursor("key_", "key_\u{10FFFF}");
    assert_eq!(cursor.buffered_len(), 0);

    let (first, _) = cursor.next_entry().unwrap().unwrap();
    assert_eq!(first, "key_00000");
    assert_eq!(cursor.buffered_len(), CURSOR_PAGE_SIZE - 1);

    cursor.close();
    assert_eq!(cursor.buffered_len(), 0);
    assert!(cursor.next_entry().unwrap().is_none());
}

#[test]
fn test_cursor_walks_every_page_in_order() {
    let backend = MemoryBackend::new();
    let n = CURSOR_PAGE_SIZE * 2 + 7;
    populate(&backend, n);
    backend.set("other", b"x").unwrap();

    let mut cursor = backend.range("key_", "key_\u{10FFFF}").unwrap();
    let keys = drain(cursor.as_mut());

    let expected: Vec<String> = (0..n).map(|i| format!("key_{:05}", i)).collect();
    assert_eq!(keys, expected);
}

#[test]
fn test_cursor_page_boundary_keys_with_separator() {
    let backend = MemoryBackend::new();
    populate(&backend, CURSOR_PAGE_SIZE);
    // Sorts directly after the last key of the first page
    let boundary = format!("key_{:05}\u{0}tail", CURSOR_PAGE_SIZE - 1);
    backend.set(&boundary, b"b").unwrap();

    let mut cursor = backend.range("key_", "key_\u{10FFFF}").unwrap();
    let keys = drain(cursor.as_mut());

    assert_eq!(keys.len(), CURSOR_PAGE_SIZE + 1);
    assert_eq!(keys.last().unwrap(), &boundary);
}

#[test]
fn test_empty_and_inverted_ranges() {
    let backend = MemoryBackend::new();
    populate(&backend, 10);

    assert!(drain(backend.range("z", "zz").unwrap().as_mut()).is_empty());
    assert!(drain(backend.range("key_00005", "key_00001").unwrap().as_mut()).is_empty());
    assert!(drain(backend.range("key_00003", "key_00003").unwrap().as_mut()).is_empty());
}

// =============================================================================
// Primitive Tests
// =============================================================================

#[test]
fn test_get_set_delete_drop_all() {
    let backend = MemoryBackend::new();

    assert_eq!(backend.get("k").unwrap(), None);
    backend.set("k", b"").unwrap();
    assert_eq!(backend.get("k").unwrap(), Some(Vec::new()));

    backend.delete("k").unwrap();
    backend.delete("k").unwrap();
    assert_eq!(backend.get("k").unwrap(), None);

    populate(&backend, 5);
    backend.drop_all().unwrap();
    assert!(backend.is_empty());
}
