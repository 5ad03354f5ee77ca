// src/core/identity/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier the recognition service assigns to an indexed face.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaceId(String);

impl FaceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FaceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for FaceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Durable link between an indexed face and the tenant user owning it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRecord {
    pub face_id: FaceId,
    pub developer_id: i64,
    pub client_user_id: String,
}

impl IdentityRecord {
    pub fn new(face_id: FaceId, developer_id: i64, client_user_id: impl Into<String>) -> Self {
        Self {
            face_id,
            developer_id,
            client_user_id: client_user_id.into(),
        }
    }

    /// Same owner, new face. Records are never edited in place.
    pub fn reassigned(&self, face_id: FaceId) -> Self {
        Self {
            face_id,
            developer_id: self.developer_id,
            client_user_id: self.client_user_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

/// One face reported by detection. Only presence matters to the workflows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceAttributes {
    #[serde(default)]
    pub confidence: f32,
    #[serde(default)]
    pub bounding_box: Option<BoundingBox>,
}

/// Label attached to an indexed face.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalRef(String);

impl ExternalRef {
    /// `{developerId}-{clientUserId}`, used when a user enrolls.
    pub fn owner(developer_id: i64, client_user_id: &str) -> Self {
        Self(format!("{}-{}", developer_id, client_user_id))
    }

    /// The face being replaced, used when a user re-enrolls.
    pub fn replacing(face_id: &FaceId) -> Self {
        Self(face_id.as_str().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExternalRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
