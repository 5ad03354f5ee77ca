// tests/integration/identity_tests.rs
use std::sync::Arc;

use faceid_node::core::{
    identity::{error::IdentityError, types::FaceId},
    services::identity::{CreateOutcome, DeleteOutcome},
};

use crate::common::{blank_image, face_image, TestContext};

fn created(outcome: CreateOutcome) -> FaceId {
    match outcome {
        CreateOutcome::Created(face_id) => face_id,
        CreateOutcome::NoFaceDetected => panic!("expected a face to be enrolled"),
    }
}

#[tokio::test]
async fn test_create_update_delete_lifecycle() {
    let ctx = TestContext::new();

    let f1 = created(
        ctx.identity_service
            .create_identity(7, "u1", &face_image("one"))
            .await
            .expect("Failed to create identity"),
    );
    assert_eq!(f1.as_str(), "f1");
    let record = ctx.storage.record("f1").expect("record for f1");
    assert_eq!((record.developer_id, record.client_user_id.as_str()), (7, "u1"));
    assert_eq!(ctx.recognition.external_ref("f1").as_deref(), Some("7-u1"));
    ctx.assert_consistent();

    let f2 = ctx
        .identity_service
        .update_identity(&f1, &face_image("two"))
        .await
        .expect("Failed to update identity");
    assert_eq!(f2.as_str(), "f2");
    assert!(ctx.storage.record("f1").is_none());
    assert!(!ctx.recognition.contains("f1"));
    let record = ctx.storage.record("f2").expect("record for f2");
    assert_eq!((record.developer_id, record.client_user_id.as_str()), (7, "u1"));
    assert_eq!(ctx.recognition.external_ref("f2").as_deref(), Some("f1"));
    ctx.assert_consistent();

    let first = ctx.identity_service.delete_identity(&f2).await.unwrap();
    let second = ctx.identity_service.delete_identity(&f2).await.unwrap();
    assert_eq!(first, DeleteOutcome::Deleted);
    assert_eq!(second, DeleteOutcome::NotFound);
    assert!(ctx.storage.records().is_empty());
    ctx.assert_consistent();
}

#[tokio::test]
async fn test_create_without_face_leaves_no_trace() {
    let ctx = TestContext::new();

    let outcome = ctx
        .identity_service
        .create_identity(7, "u1", &blank_image())
        .await
        .unwrap();

    assert_eq!(outcome, CreateOutcome::NoFaceDetected);
    assert_eq!(ctx.recognition.index_calls(), 0);
    assert!(ctx.storage.records().is_empty());
}

#[tokio::test]
async fn test_update_of_unknown_face_mutates_nothing() {
    let ctx = TestContext::new();
    created(
        ctx.identity_service
            .create_identity(7, "u1", &face_image("one"))
            .await
            .unwrap(),
    );
    let before = ctx.storage.records();

    let err = ctx
        .identity_service
        .update_identity(&FaceId::from("nobody"), &face_image("two"))
        .await
        .unwrap_err();

    assert!(matches!(err, IdentityError::NotFound { .. }));
    assert_eq!(ctx.recognition.index_calls(), 1);
    assert_eq!(ctx.storage.records(), before);
    ctx.assert_consistent();
}

#[tokio::test]
async fn test_update_with_blank_image_keeps_identity() {
    let ctx = TestContext::new();
    let f1 = created(
        ctx.identity_service
            .create_identity(7, "u1", &face_image("one"))
            .await
            .unwrap(),
    );

    let err = ctx
        .identity_service
        .update_identity(&f1, &blank_image())
        .await
        .unwrap_err();

    assert!(matches!(err, IdentityError::NoFaceDetected));
    assert!(ctx.storage.record("f1").is_some());
    assert!(ctx.recognition.contains("f1"));
}

#[tokio::test]
async fn test_create_store_failure_removes_indexed_face() {
    let ctx = TestContext::new();
    ctx.storage.fail_next_puts(1);

    let err = ctx
        .identity_service
        .create_identity(7, "u1", &face_image("one"))
        .await
        .unwrap_err();

    assert!(err.is_service_failure());
    assert_eq!(ctx.recognition.index_calls(), 1);
    assert_eq!(ctx.recognition.len(), 0);
    ctx.assert_consistent();
}

#[tokio::test]
async fn test_update_record_delete_failure_rolls_back() {
    let ctx = TestContext::new();
    let f1 = created(
        ctx.identity_service
            .create_identity(7, "u1", &face_image("one"))
            .await
            .unwrap(),
    );
    ctx.storage.fail_next_deletes(1);

    let err = ctx
        .identity_service
        .update_identity(&f1, &face_image("two"))
        .await
        .unwrap_err();

    assert!(matches!(err, IdentityError::Store { operation: "delete_record", .. }));
    assert!(ctx.storage.record("f1").is_some());
    assert!(ctx.recognition.contains("f1"));
    assert!(!ctx.recognition.contains("f2"));
    ctx.assert_consistent();
}

#[tokio::test]
async fn test_update_face_delete_failure_restores_old_record() {
    let ctx = TestContext::new();
    let f1 = created(
        ctx.identity_service
            .create_identity(7, "u1", &face_image("one"))
            .await
            .unwrap(),
    );
    ctx.recognition.fail_next_deletes(1);

    let err = ctx
        .identity_service
        .update_identity(&f1, &face_image("two"))
        .await
        .unwrap_err();

    assert!(matches!(err, IdentityError::Recognition { operation: "delete_face", .. }));
    let restored = ctx.storage.record("f1").expect("old record restored");
    assert_eq!(restored.client_user_id, "u1");
    assert!(!ctx.recognition.contains("f2"));
    ctx.assert_consistent();
}

#[tokio::test]
async fn test_update_recovers_from_transient_write_failure() {
    let ctx = TestContext::with_retries(2);
    let f1 = created(
        ctx.identity_service
            .create_identity(7, "u1", &face_image("one"))
            .await
            .unwrap(),
    );
    ctx.storage.fail_next_puts(2);

    let f2 = ctx
        .identity_service
        .update_identity(&f1, &face_image("two"))
        .await
        .unwrap();

    assert_eq!(ctx.recognition.index_calls(), 2);
    assert!(ctx.storage.record(f2.as_str()).is_some());
    ctx.assert_consistent();
}

#[tokio::test]
async fn test_update_reports_orphan_when_write_keeps_failing() {
    let ctx = TestContext::with_retries(0);
    let f1 = created(
        ctx.identity_service
            .create_identity(7, "u1", &face_image("one"))
            .await
            .unwrap(),
    );
    ctx.storage.fail_next_puts(1);

    let err = ctx
        .identity_service
        .update_identity(&f1, &face_image("two"))
        .await
        .unwrap_err();

    match err {
        IdentityError::Inconsistent { face_id, .. } => assert_eq!(face_id.as_str(), "f2"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(ctx.recognition.contains("f2"));
    assert!(ctx.storage.records().is_empty());
}

#[tokio::test]
async fn test_concurrent_creates_are_independent() {
    let ctx = Arc::new(TestContext::new());

    let mut handles = Vec::new();
    for i in 0..10 {
        let ctx = ctx.clone();
        handles.push(tokio::spawn(async move {
            ctx.identity_service
                .create_identity(i, &format!("user-{}", i), &face_image("x"))
                .await
        }));
    }

    for handle in handles {
        let outcome = handle.await.unwrap().unwrap();
        assert!(matches!(outcome, CreateOutcome::Created(_)));
    }

    assert_eq!(ctx.storage.records().len(), 10);
    ctx.assert_consistent();
}
