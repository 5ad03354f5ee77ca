// src/core/identity/error.rs
use thiserror::Error;

use crate::{
    core::{identity::types::FaceId, image::DecodeError, recognition::RecognitionError},
    storage::StoreError,
};

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("No faces detected in the image")]
    NoFaceDetected,

    #[error("User {face_id} does not exist")]
    NotFound { face_id: FaceId },

    #[error("Recognition service failed during {operation} ({subject}): {source}")]
    Recognition {
        operation: &'static str,
        subject: String,
        source: RecognitionError,
    },

    #[error("Record store failed during {operation} ({subject}): {source}")]
    Store {
        operation: &'static str,
        subject: String,
        source: StoreError,
    },

    /// A compensation failed. `face_id` needs manual repair.
    #[error("Inconsistent state after {operation} for face {face_id}: {detail}")]
    Inconsistent {
        operation: &'static str,
        face_id: FaceId,
        detail: String,
    },
}

impl IdentityError {
    pub fn recognition(
        operation: &'static str,
        subject: impl ToString,
        source: RecognitionError,
    ) -> Self {
        Self::Recognition {
            operation,
            subject: subject.to_string(),
            source,
        }
    }

    pub fn store(operation: &'static str, subject: impl ToString, source: StoreError) -> Self {
        Self::Store {
            operation,
            subject: subject.to_string(),
            source,
        }
    }

    /// Faults of the external systems, reported as server-side failures.
    pub fn is_service_failure(&self) -> bool {
        matches!(
            self,
            Self::Recognition { .. } | Self::Store { .. } | Self::Inconsistent { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, IdentityError>;
