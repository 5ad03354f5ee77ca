// src/core/recognition/http.rs
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use super::{RecognitionError, RecognitionGateway, Result};
use crate::{
    core::identity::types::{ExternalRef, FaceAttributes, FaceId},
    utils::config::RecognitionConfig,
};

#[derive(Debug, Serialize)]
struct DetectRequest<'a> {
    image: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetectResponse {
    #[serde(default)]
    face_details: Vec<FaceAttributes>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IndexRequest<'a> {
    image: &'a str,
    external_image_id: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexResponse {
    #[serde(default)]
    face_records: Vec<FaceRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FaceRecord {
    face_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteRequest<'a> {
    face_ids: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteResponse {
    #[serde(default)]
    deleted_faces: Vec<String>,
}

/// JSON client for a recognition service exposing one collection per path.
#[derive(Clone)]
pub struct HttpRecognitionGateway {
    http: Client,
    collection_url: String,
    api_key: Option<String>,
}

impl HttpRecognitionGateway {
    pub fn new(config: &RecognitionConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| RecognitionError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            collection_url: format!(
                "{}/collections/{}",
                config.endpoint.trim_end_matches('/'),
                config.collection_id
            ),
            api_key: config.api_key.clone(),
        })
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.collection_url, path);
        let mut request = self.http.post(&url).json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RecognitionError::Transport(e.to_string()))?;

        let status = response.status();
        debug!(%url, status = status.as_u16(), "recognition service responded");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, body));
        }

        response
            .json::<R>()
            .await
            .map_err(|e| RecognitionError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl RecognitionGateway for HttpRecognitionGateway {
    async fn detect_faces(&self, image: &[u8]) -> Result<Vec<FaceAttributes>> {
        let encoded = BASE64_STANDARD.encode(image);
        let response: DetectResponse = self
            .post("/detect", &DetectRequest { image: &encoded })
            .await?;
        Ok(response.face_details)
    }

    async fn index_face(&self, image: &[u8], external_ref: &ExternalRef) -> Result<FaceId> {
        let encoded = BASE64_STANDARD.encode(image);
        let response: IndexResponse = self
            .post(
                "/faces",
                &IndexRequest {
                    image: &encoded,
                    external_image_id: external_ref.as_str(),
                },
            )
            .await?;
        indexed_face(response)
    }

    async fn delete_face(&self, face_id: &FaceId) -> Result<bool> {
        let response: DeleteResponse = self
            .post(
                "/faces/delete",
                &DeleteRequest {
                    face_ids: [face_id.as_str()],
                },
            )
            .await?;
        Ok(was_deleted(&response, face_id))
    }
}

fn status_error(status: StatusCode, body: String) -> RecognitionError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RecognitionError::Auth(body),
        StatusCode::TOO_MANY_REQUESTS => RecognitionError::Throttled(body),
        _ => RecognitionError::Status {
            status: status.as_u16(),
            body,
        },
    }
}

// The service may index several faces; the first one is the enrollment.
fn indexed_face(response: IndexResponse) -> Result<FaceId> {
    response
        .face_records
        .into_iter()
        .next()
        .map(|record| FaceId::new(record.face_id))
        .ok_or(RecognitionError::NoFaceIndexed)
}

fn was_deleted(response: &DeleteResponse, face_id: &FaceId) -> bool {
    response.deleted_faces.iter().any(|id| id == face_id.as_str())
}
