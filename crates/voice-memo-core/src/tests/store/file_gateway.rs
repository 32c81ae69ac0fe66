use crate::{FileGateway, MemoError, PersistenceGateway};

use tempfile::TempDir;

/// WHAT: Values round-trip through one JSON file per key
/// WHY: The data directory is the durable store across restarts
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_stored_value_when_reading_back_then_same_bytes_in_key_file() {
    // Given: A gateway over a temp directory
    let dir = TempDir::new().unwrap();
    let gateway = FileGateway::open(dir.path().join("store")).unwrap();

    // When: A value is written
    gateway.set("voice_notes_v2", b"[]".to_vec()).await.unwrap();

    // Then: It reads back and lives in <key>.json with no temp file left
    assert_eq!(gateway.get("voice_notes_v2").await.unwrap(), Some(b"[]".to_vec()));
    assert!(gateway.root().join("voice_notes_v2.json").exists());
    assert!(!gateway.root().join("voice_notes_v2.json.tmp").exists());
}

/// WHAT: Reading an absent key yields None
/// WHY: First launch has no files yet
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_absent_key_when_reading_then_none() {
    let dir = TempDir::new().unwrap();
    let gateway = FileGateway::open(dir.path()).unwrap();

    assert!(gateway.get("voice_notes_feedbacks").await.unwrap().is_none());
}

/// WHAT: Keys that could escape the directory are refused
/// WHY: A key must always map inside the data directory
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_path_like_key_when_writing_then_persistence_error() {
    let dir = TempDir::new().unwrap();
    let gateway = FileGateway::open(dir.path()).unwrap();

    let traversal = gateway.set("../escape", b"x".to_vec()).await;
    let empty = gateway.get("").await;

    assert!(matches!(traversal, Err(MemoError::Persistence { .. })));
    assert!(matches!(empty, Err(MemoError::Persistence { .. })));
}

/// WHAT: A second write replaces the first
/// WHY: Writes replace the whole value, last write wins
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_existing_value_when_overwriting_then_latest_value_read() {
    let dir = TempDir::new().unwrap();
    let gateway = FileGateway::open(dir.path()).unwrap();

    gateway.set("k", b"1".to_vec()).await.unwrap();
    gateway.set("k", b"2".to_vec()).await.unwrap();

    assert_eq!(gateway.get("k").await.unwrap(), Some(b"2".to_vec()));
}
