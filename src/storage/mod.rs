// src/storage/mod.rs
pub mod memory;
pub mod rocks;

pub use memory::MemoryRecordStore;
pub use rocks::RocksRecordStore;

use async_trait::async_trait;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

use crate::core::identity::types::{FaceId, IdentityRecord};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Identity records keyed by face id.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get(&self, face_id: &FaceId) -> Result<Option<IdentityRecord>>;

    /// Inserts or replaces the record stored under `record.face_id`.
    async fn put(&self, record: &IdentityRecord) -> Result<()>;

    /// Succeeds whether or not the record existed.
    async fn delete(&self, face_id: &FaceId) -> Result<()>;
}
