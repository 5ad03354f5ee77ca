use actix_web::{
    web::{self, Data, Json, Path},
    HttpResponse, Scope,
};
use tracing::{info, warn};

use crate::{
    api::{
        error::ApiError,
        types::{
            CreateFaceRequest, DeletedResponse, FaceIdResponse, UpdateFaceRequest, NO_FACE_MESSAGE,
        },
    },
    core::{
        identity::types::FaceId,
        image::ImageDecoder,
        services::identity::{CreateOutcome, DeleteOutcome, IdentityService},
    },
};

pub fn scope() -> Scope {
    web::scope("")
        .service(
            web::resource("/create")
                .route(web::post().to(create_face))
        )
        .service(
            web::resource("/update/{face_id}")
                .route(web::put().to(update_face))
        )
        .service(
            web::resource("/delete/{face_id}")
                .route(web::delete().to(delete_face))
        )
}

fn decode(decoder: &dyn ImageDecoder, encoded: &str) -> Result<Vec<u8>, ApiError> {
    decoder.decode(encoded).map_err(|e| {
        warn!("Rejected image payload: {}", e);
        ApiError::BadRequest(e.to_string())
    })
}

async fn create_face(
    service: Data<IdentityService>,
    decoder: Data<dyn ImageDecoder>,
    request: Json<CreateFaceRequest>,
) -> Result<HttpResponse, ApiError> {
    info!(
        developer_id = request.developer_id,
        client_user_id = %request.client_user_id,
        "Received face registration request"
    );

    let image = decode(decoder.get_ref(), &request.base64)?;

    let outcome = service
        .create_identity(request.developer_id, &request.client_user_id, &image)
        .await
        .map_err(|e| ApiError::from_identity(e, "Could not register the user"))?;

    Ok(match outcome {
        CreateOutcome::Created(face_id) => HttpResponse::Created().json(FaceIdResponse { face_id }),
        CreateOutcome::NoFaceDetected => HttpResponse::Ok().json(NO_FACE_MESSAGE),
    })
}

async fn update_face(
    service: Data<IdentityService>,
    decoder: Data<dyn ImageDecoder>,
    face_id: Path<String>,
    request: Json<UpdateFaceRequest>,
) -> Result<HttpResponse, ApiError> {
    let face_id = FaceId::new(face_id.into_inner());
    info!(%face_id, "Received face update request");

    let image = decode(decoder.get_ref(), &request.base64)?;

    let new_face_id = service
        .update_identity(&face_id, &image)
        .await
        .map_err(|e| ApiError::from_identity(e, "Could not update the user"))?;

    Ok(HttpResponse::Ok().json(FaceIdResponse {
        face_id: new_face_id,
    }))
}

async fn delete_face(
    service: Data<IdentityService>,
    face_id: Path<String>,
) -> Result<HttpResponse, ApiError> {
    let face_id = FaceId::new(face_id.into_inner());
    info!(%face_id, "Received face deletion request");

    let outcome = service
        .delete_identity(&face_id)
        .await
        .map_err(|e| ApiError::from_identity(e, "Could not delete the user, try again later"))?;

    match outcome {
        DeleteOutcome::Deleted => Ok(HttpResponse::Ok().json(DeletedResponse::default())),
        DeleteOutcome::NotFound => Err(ApiError::NotFound(face_id)),
    }
}
