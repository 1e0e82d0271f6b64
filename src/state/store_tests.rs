//! Tests for the state store

use super::*;
use crate::pagination::PageToken;

#[tokio::test]
async fn test_in_memory_round_trip() {
    let store = StateStore::in_memory();
    assert!(store.get_token("runs").await.is_none());

    store
        .set_token("runs", Some(PageToken::Offset(100)))
        .await
        .unwrap();
    assert_eq!(store.get_token("runs").await, Some(PageToken::Offset(100)));

    store.set_token("runs", None).await.unwrap();
    assert!(store.get_token("runs").await.is_none());
}

#[tokio::test]
async fn test_checkpoint_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    {
        let store = StateStore::from_file(&path).unwrap();
        store
            .set_token("runs", Some(PageToken::Offset(200)))
            .await
            .unwrap();
        store
            .set_token("jobs", Some(PageToken::Cursor("cur_5".to_string())))
            .await
            .unwrap();
    }

    // Simulated restart: a fresh store sees the last checkpoints
    let store = StateStore::from_file(&path).unwrap();
    assert_eq!(store.get_token("runs").await, Some(PageToken::Offset(200)));
    assert_eq!(
        store.get_token("jobs").await,
        Some(PageToken::Cursor("cur_5".to_string()))
    );
}

#[tokio::test]
async fn test_checkpoint_idempotence() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let store = StateStore::from_file(&path).unwrap();

    store
        .set_token("runs", Some(PageToken::Offset(100)))
        .await
        .unwrap();
    store
        .set_token("runs", Some(PageToken::Offset(100)))
        .await
        .unwrap();

    assert_eq!(store.get_token("runs").await, Some(PageToken::Offset(100)));
}

#[tokio::test]
async fn test_keys_are_independent() {
    let store = StateStore::in_memory();

    // Interleaved writes from concurrently extracting entities
    let mut handles = Vec::new();
    for (entity, offset) in [("runs", 100u64), ("jobs", 50), ("projects", 25)] {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            for page in 1..=10u64 {
                store
                    .set_token(entity, Some(PageToken::Offset(offset * page)))
                    .await
                    .unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(store.get_token("runs").await, Some(PageToken::Offset(1000)));
    assert_eq!(store.get_token("jobs").await, Some(PageToken::Offset(500)));
    assert_eq!(
        store.get_token("projects").await,
        Some(PageToken::Offset(250))
    );
}

#[tokio::test]
async fn test_from_json() {
    let store =
        StateStore::from_json(r#"{"entities":{"runs":{"token":{"type":"offset","value":300}}}}"#)
            .unwrap();
    assert_eq!(store.get_token("runs").await, Some(PageToken::Offset(300)));
    assert!(store.is_in_memory());
}

#[tokio::test]
async fn test_clear_entity() {
    let store = StateStore::in_memory();
    store
        .set_token("runs", Some(PageToken::Offset(100)))
        .await
        .unwrap();
    store.clear_entity("runs").await.unwrap();
    assert!(store.get_token("runs").await.is_none());
}

#[tokio::test]
async fn test_corrupt_state_file_is_persistence_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, "not json").unwrap();

    let err = StateStore::from_file(&path).unwrap_err();
    assert!(matches!(err, crate::error::Error::Persistence { .. }));
}
