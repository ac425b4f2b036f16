//! Dispatch and lifecycle tests that need no running server
//!
//! Validation failures must come back before the driver is touched, so
//! they are exercised against a handle whose server does not exist.


use docmongo_core::bson::doc;
use docmongo_core::options::{ReplaceOptions, UpdateOptions};
use docmongo_core::{DocMongoError, DocStore, DriverOption, UpdateKind, UpdateMode};
use serde::Serialize;
use std::time::{Duration, Instant};
use test_helpers::offline_store;

// ========== UPDATE VALIDATION ==========

#[tokio::test]
async fn test_mismatched_option_rejected_before_network() {
    let store = offline_store(30).await;
    let started = Instant::now();

    let err = store
        .update_by_name(
            "users",
            "ReplaceOne",
            doc! { "name": "Alice" },
            doc! { "name": "Alice", "age": 31 },
            vec![DriverOption::Update(UpdateOptions::default())],
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DocMongoError::InvalidOptionType {
            mode: "ReplaceOne",
            expected: "ReplaceOptions"
        }
    ));
    // server selection alone would take 2s
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn test_unknown_mode_rejected_before_network() {
    let store = offline_store(30).await;
    let started = Instant::now();

    let err = store
        .update_by_name(
            "users",
            "DeleteEverything",
            doc! {},
            doc! { "deleted": true },
            vec![],
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DocMongoError::InvalidUpdateMode(ref m) if m == "DeleteEverything"));
    assert!(err.is_validation());
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn test_validation_precedes_connection_check() {
    let store = DocStore::new();

    let err = store
        .update_by_name(
            "users",
            "UpdateMany",
            doc! {},
            doc! { "x": 1 },
            vec![ReplaceOptions::default().into()],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DocMongoError::InvalidOptionType { .. }));

    let err = store
        .update_by_name("users", "UpdateMany", doc! {}, doc! { "x": 1 }, vec![])
        .await
        .unwrap_err();
    assert!(matches!(err, DocMongoError::NotConnected));
}

// ========== LIFECYCLE ==========

#[tokio::test]
async fn test_every_operation_requires_connect() {
    let store = DocStore::new();

    assert!(matches!(
        store.find_one("users", doc! {}, None).await,
        Err(DocMongoError::NotConnected)
    ));
    assert!(matches!(
        store.find_many("users", doc! {}, None).await,
        Err(DocMongoError::NotConnected)
    ));
    assert!(matches!(
        store.count("users", doc! {}, None).await,
        Err(DocMongoError::NotConnected)
    ));
    assert!(matches!(
        store.insert_one("users", &doc! { "a": 1 }, None).await,
        Err(DocMongoError::NotConnected)
    ));
    assert!(matches!(
        store
            .update("users", UpdateMode::plain(UpdateKind::UpdateOne), doc! {}, doc! { "a": 1 })
            .await,
        Err(DocMongoError::NotConnected)
    ));
}

#[tokio::test]
async fn test_operations_fail_after_disconnect() {
    let store = offline_store(5).await;
    let _ = store.disconnect().await;

    assert!(matches!(
        store.count("users", doc! {}, None).await,
        Err(DocMongoError::NotConnected)
    ));
}

// ========== DRIVER FAILURES ==========

#[tokio::test]
async fn test_unreachable_server_is_infrastructure_error() {
    let store = offline_store(30).await;

    let err = store.find_one("users", doc! {}, None).await.unwrap_err();
    assert!(!err.is_not_found());
    assert!(matches!(err, DocMongoError::Driver(_)));
}

#[tokio::test]
async fn test_deadline_shorter_than_server_selection() {
    let store = DocStore::new();
    store
        .connect("mongodb://127.0.0.1:1/offline?serverSelectionTimeoutMS=30000", 1)
        .await
        .unwrap();

    let started = Instant::now();
    let err = store.count("users", doc! {}, None).await.unwrap_err();

    assert!(matches!(err, DocMongoError::Timeout { operation: "count", .. }));
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn test_concurrent_callers_fail_independently() {
    let store = offline_store(30).await;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.count("users", doc! {}, None).await })
        })
        .collect();

    for handle in handles {
        let result = handle.await.unwrap();
        assert!(matches!(result, Err(DocMongoError::Driver(_))));
    }
}

// ========== TIMESTAMP VARIANTS ==========

#[tokio::test]
async fn test_non_document_record_rejected_before_insert() {
    let store = offline_store(30).await;
    let started = Instant::now();

    let err = store
        .insert_with_create_time("users", &42, None)
        .await
        .unwrap_err();

    assert!(matches!(err, DocMongoError::Serialization(_)));
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[derive(Serialize)]
struct Tags(Vec<String>);

#[tokio::test]
async fn test_non_document_record_rejected_before_update() {
    let store = offline_store(30).await;

    let err = store
        .update_with_update_time(
            "users",
            UpdateMode::UpdateOne(None),
            doc! {},
            &Tags(vec!["a".into()]),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DocMongoError::Serialization(_)));
}
