// src/api/types.rs
use serde::{Deserialize, Serialize};

use crate::core::identity::types::FaceId;

pub const NO_FACE_MESSAGE: &str = "No faces detected in the image.";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFaceRequest {
    pub base64: String,
    pub developer_id: i64,
    pub client_user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFaceRequest {
    pub base64: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceIdResponse {
    pub face_id: FaceId,
}

#[derive(Debug, Serialize)]
pub struct StatusBody<T> {
    pub status: &'static str,
    #[serde(flatten)]
    pub payload: T,
}

#[derive(Debug, Serialize)]
pub struct FailurePayload {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessPayload {
    pub body: &'static str,
}

/// `{"detail": {"status": "Failure", "error": ...}}`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: StatusBody<FailurePayload>,
}

impl ErrorResponse {
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            detail: StatusBody {
                status: "Failure",
                payload: FailurePayload {
                    error: error.into(),
                },
            },
        }
    }
}

/// `{"details": {"status": "Success", "body": "User deleted"}}`
#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub details: StatusBody<SuccessPayload>,
}

impl Default for DeletedResponse {
    fn default() -> Self {
        Self {
            details: StatusBody {
                status: "Success",
                payload: SuccessPayload {
                    body: "User deleted",
                },
            },
        }
    }
}
