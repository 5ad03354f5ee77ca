// src/storage/memory.rs
use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{RecordStore, Result};
use crate::core::identity::types::{FaceId, IdentityRecord};

/// Process-local store. Contents are lost on exit.
#[derive(Default)]
pub struct MemoryRecordStore {
    records: RwLock<HashMap<FaceId, IdentityRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    pub fn snapshot(&self) -> Vec<IdentityRecord> {
        let mut records: Vec<_> = self.records.read().values().cloned().collect();
        records.sort_by(|a, b| a.face_id.cmp(&b.face_id));
        records
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get(&self, face_id: &FaceId) -> Result<Option<IdentityRecord>> {
        Ok(self.records.read().get(face_id).cloned())
    }

    async fn put(&self, record: &IdentityRecord) -> Result<()> {
        self.records
            .write()
            .insert(record.face_id.clone(), record.clone());
        Ok(())
    }

    async fn delete(&self, face_id: &FaceId) -> Result<()> {
        self.records.write().remove(face_id);
        Ok(())
    }
}
