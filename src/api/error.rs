// src/api/error.rs
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;
use tracing::error;

use crate::{
    api::types::{ErrorResponse, NO_FACE_MESSAGE},
    core::identity::{error::IdentityError, types::FaceId},
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    /// A normal negative outcome; answered with 200 and the plain message.
    #[error("{}", NO_FACE_MESSAGE)]
    NoFaceDetected,

    #[error("User {0} does not exist")]
    NotFound(FaceId),

    #[error("{0}")]
    Internal(&'static str),
}

impl ApiError {
    /// Maps a workflow failure; service faults are logged and replaced by
    /// `failure_message`.
    pub fn from_identity(err: IdentityError, failure_message: &'static str) -> Self {
        match err {
            IdentityError::Decode(e) => ApiError::BadRequest(e.to_string()),
            IdentityError::NoFaceDetected => ApiError::NoFaceDetected,
            IdentityError::NotFound { face_id } => ApiError::NotFound(face_id),
            other => {
                error!(error = %other, "{}", failure_message);
                ApiError::Internal(failure_message)
            }
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NoFaceDetected => StatusCode::OK,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::NoFaceDetected => HttpResponse::Ok().json(NO_FACE_MESSAGE),
            _ => HttpResponse::build(self.status_code())
                .json(ErrorResponse::failure(self.to_string())),
        }
    }
}
