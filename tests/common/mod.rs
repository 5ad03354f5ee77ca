// tests/common/mod.rs
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use faceid_node::{
    core::{
        identity::types::{ExternalRef, FaceAttributes, FaceId, IdentityRecord},
        recognition::{self, RecognitionError, RecognitionGateway},
        services::identity::IdentityService,
    },
    storage::{self, MemoryRecordStore, RecordStore, StoreError},
    utils::config::{Config, WorkflowConfig},
};

/// Images starting with this marker contain a face.
pub const FACE: &[u8] = b"face";

pub fn face_image(tag: &str) -> Vec<u8> {
    [FACE, tag.as_bytes()].concat()
}

pub fn blank_image() -> Vec<u8> {
    b"landscape".to_vec()
}

/// Collection that hands out `f1`, `f2`, ... in indexing order.
#[derive(Default)]
pub struct FakeRecognition {
    faces: Mutex<HashMap<FaceId, String>>,
    next_id: AtomicU64,
    index_calls: AtomicU64,
    fail_deletes: AtomicU32,
}

impl FakeRecognition {
    pub fn contains(&self, face_id: &str) -> bool {
        self.faces.lock().contains_key(&FaceId::from(face_id))
    }

    pub fn external_ref(&self, face_id: &str) -> Option<String> {
        self.faces.lock().get(&FaceId::from(face_id)).cloned()
    }

    pub fn len(&self) -> usize {
        self.faces.lock().len()
    }

    pub fn index_calls(&self) -> u64 {
        self.index_calls.load(Ordering::SeqCst)
    }

    pub fn fail_next_deletes(&self, count: u32) {
        self.fail_deletes.store(count, Ordering::SeqCst);
    }
}

#[async_trait]
impl RecognitionGateway for FakeRecognition {
    async fn detect_faces(&self, image: &[u8]) -> recognition::Result<Vec<FaceAttributes>> {
        if image.starts_with(FACE) {
            Ok(vec![FaceAttributes {
                confidence: 99.9,
                bounding_box: None,
            }])
        } else {
            Ok(vec![])
        }
    }

    async fn index_face(
        &self,
        image: &[u8],
        external_ref: &ExternalRef,
    ) -> recognition::Result<FaceId> {
        self.index_calls.fetch_add(1, Ordering::SeqCst);
        if !image.starts_with(FACE) {
            return Err(RecognitionError::NoFaceIndexed);
        }

        let id = FaceId::new(format!("f{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1));
        self.faces
            .lock()
            .insert(id.clone(), external_ref.as_str().to_string());
        Ok(id)
    }

    async fn delete_face(&self, face_id: &FaceId) -> recognition::Result<bool> {
        let pending = self.fail_deletes.load(Ordering::SeqCst);
        if pending > 0 {
            self.fail_deletes.store(pending - 1, Ordering::SeqCst);
            return Err(RecognitionError::Transport("connection reset".into()));
        }
        Ok(self.faces.lock().remove(face_id).is_some())
    }
}

/// Memory store whose next `n` writes fail.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryRecordStore,
    fail_puts: AtomicU32,
    fail_deletes: AtomicU32,
}

impl FlakyStore {
    pub fn fail_next_puts(&self, count: u32) {
        self.fail_puts.store(count, Ordering::SeqCst);
    }

    pub fn fail_next_deletes(&self, count: u32) {
        self.fail_deletes.store(count, Ordering::SeqCst);
    }

    pub fn records(&self) -> Vec<IdentityRecord> {
        self.inner.snapshot()
    }

    pub fn record(&self, face_id: &str) -> Option<IdentityRecord> {
        self.records()
            .into_iter()
            .find(|record| record.face_id.as_str() == face_id)
    }

    fn take_failure(counter: &AtomicU32) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl RecordStore for FlakyStore {
    async fn get(&self, face_id: &FaceId) -> storage::Result<Option<IdentityRecord>> {
        self.inner.get(face_id).await
    }

    async fn put(&self, record: &IdentityRecord) -> storage::Result<()> {
        if Self::take_failure(&self.fail_puts) {
            return Err(StoreError::DatabaseError("write throttled".into()));
        }
        self.inner.put(record).await
    }

    async fn delete(&self, face_id: &FaceId) -> storage::Result<()> {
        if Self::take_failure(&self.fail_deletes) {
            return Err(StoreError::DatabaseError("delete throttled".into()));
        }
        self.inner.delete(face_id).await
    }
}

pub struct TestContext {
    pub identity_service: IdentityService,
    pub recognition: Arc<FakeRecognition>,
    pub storage: Arc<FlakyStore>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_retries(1)
    }

    pub fn with_retries(persist_retry_attempts: u32) -> Self {
        let recognition = Arc::new(FakeRecognition::default());
        let storage = Arc::new(FlakyStore::default());
        let identity_service = IdentityService::new(
            recognition.clone(),
            storage.clone(),
            &WorkflowConfig {
                persist_retry_attempts,
            },
        );

        Self {
            identity_service,
            recognition,
            storage,
        }
    }

    /// Both systems agree: every record has a face and vice versa.
    pub fn assert_consistent(&self) {
        let records = self.storage.records();
        assert_eq!(records.len(), self.recognition.len(), "records: {records:?}");
        for record in records {
            assert!(
                self.recognition.contains(record.face_id.as_str()),
                "record {} has no indexed face",
                record.face_id
            );
        }
    }
}

pub fn test_config() -> Config {
    Config::from_toml(
        r#"
        [recognition]
        endpoint = "http://127.0.0.1:9"
        collection_id = "test-faces"

        [storage]
        backend = "memory"
        "#,
    )
    .expect("test config")
}
