// src/storage/rocks.rs
use std::path::Path;

use async_trait::async_trait;
use rocksdb::{Options, DB};
use tracing::info;

use super::{RecordStore, Result, StoreError};
use crate::{
    core::identity::types::{FaceId, IdentityRecord},
    utils::config::StorageConfig,
};

/// One JSON row per face id under `{table}:{faceId}`.
pub struct RocksRecordStore {
    db: DB,
    table: String,
}

impl RocksRecordStore {
    pub fn new(config: &StorageConfig) -> Result<Self> {
        Self::open(&config.path, &config.table)
    }

    pub fn open<P: AsRef<Path>>(path: P, table: &str) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            std::fs::create_dir_all(path)?;
        }

        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_keep_log_file_num(10);
        opts.set_max_open_files(1000);
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);

        let db = DB::open(&opts, path)
            .map_err(|e| StoreError::DatabaseError(format!("Failed to open database: {}", e)))?;

        info!(path = %path.display(), table, "opened identity record store");
        Ok(Self {
            db,
            table: table.to_string(),
        })
    }

    fn key(&self, face_id: &FaceId) -> String {
        format!("{}:{}", self.table, face_id)
    }
}

#[async_trait]
impl RecordStore for RocksRecordStore {
    async fn get(&self, face_id: &FaceId) -> Result<Option<IdentityRecord>> {
        let raw = match self
            .db
            .get(self.key(face_id).as_bytes())
            .map_err(|e| StoreError::DatabaseError(format!("Database read failed: {}", e)))?
        {
            Some(data) => data,
            None => return Ok(None),
        };

        let record = serde_json::from_slice(&raw)
            .map_err(|e| StoreError::InvalidFormat(format!("Deserialization failed: {}", e)))?;
        Ok(Some(record))
    }

    async fn put(&self, record: &IdentityRecord) -> Result<()> {
        let serialized = serde_json::to_vec(record)
            .map_err(|e| StoreError::InvalidFormat(format!("Serialization failed: {}", e)))?;

        self.db
            .put(self.key(&record.face_id).as_bytes(), serialized)
            .map_err(|e| StoreError::DatabaseError(format!("Database write failed: {}", e)))?;
        Ok(())
    }

    async fn delete(&self, face_id: &FaceId) -> Result<()> {
        self.db
            .delete(self.key(face_id).as_bytes())
            .map_err(|e| StoreError::DatabaseError(format!("Database delete failed: {}", e)))?;
        Ok(())
    }
}
