// src/core/recognition/mod.rs
mod http;

pub use http::HttpRecognitionGateway;

use async_trait::async_trait;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

use crate::core::identity::types::{ExternalRef, FaceAttributes, FaceId};

#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Authentication rejected: {0}")]
    Auth(String),

    #[error("Request throttled: {0}")]
    Throttled(String),

    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Service returned no indexed face")]
    NoFaceIndexed,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

pub type Result<T> = std::result::Result<T, RecognitionError>;

/// Detection, enrollment and removal against one face collection.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RecognitionGateway: Send + Sync {
    /// Detection only; nothing is persisted.
    async fn detect_faces(&self, image: &[u8]) -> Result<Vec<FaceAttributes>>;

    /// Enrolls the image's face under `external_ref`. Callers detect first:
    /// with several faces present only the first indexed one is returned.
    async fn index_face(&self, image: &[u8], external_ref: &ExternalRef) -> Result<FaceId>;

    /// `Ok(false)` when the collection had no such face.
    async fn delete_face(&self, face_id: &FaceId) -> Result<bool>;
}
