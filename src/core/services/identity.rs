use std::sync::Arc;
use tracing::{info, warn, error};

use crate::{
    core::{
        identity::{
            error::{IdentityError, Result},
            types::{ExternalRef, FaceId, IdentityRecord},
        },
        recognition::RecognitionGateway,
        services::saga::{RollbackReport, Saga},
    },
    storage::RecordStore,
    utils::config::WorkflowConfig,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(FaceId),
    NoFaceDetected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// Keeps the recognition collection and the record store in step.
///
/// Holds no per-request state; one instance serves every request.
pub struct IdentityService {
    recognition: Arc<dyn RecognitionGateway>,
    store: Arc<dyn RecordStore>,
    persist_retry_attempts: u32,
}

impl IdentityService {
    pub fn new(
        recognition: Arc<dyn RecognitionGateway>,
        store: Arc<dyn RecordStore>,
        workflow: &WorkflowConfig,
    ) -> Self {
        Self {
            recognition,
            store,
            persist_retry_attempts: workflow.persist_retry_attempts,
        }
    }

    /// Enrolls the face in `image` for `client_user_id` of `developer_id`.
    ///
    /// If the record cannot be written the freshly indexed face is removed
    /// again before the error is returned.
    pub async fn create_identity(
        &self,
        developer_id: i64,
        client_user_id: &str,
        image: &[u8],
    ) -> Result<CreateOutcome> {
        let external_ref = ExternalRef::owner(developer_id, client_user_id);

        let faces = self
            .recognition
            .detect_faces(image)
            .await
            .map_err(|e| IdentityError::recognition("detect_faces", &external_ref, e))?;
        if faces.is_empty() {
            warn!(%external_ref, "No faces detected, nothing enrolled");
            return Ok(CreateOutcome::NoFaceDetected);
        }

        let mut saga = Saga::new("create_identity");

        let face_id = self
            .recognition
            .index_face(image, &external_ref)
            .await
            .map_err(|e| IdentityError::recognition("index_face", &external_ref, e))?;
        saga.on_rollback("index_face", face_id.clone(), {
            let face_id = face_id.clone();
            move || async move { self.recognition.delete_face(&face_id).await.map(|_| ()) }
        });

        let record = IdentityRecord::new(face_id.clone(), developer_id, client_user_id);
        if let Err(e) = self.store.put(&record).await {
            let cause = IdentityError::store("put_record", &face_id, e);
            return Err(settle(saga.rollback().await, "create_identity", cause));
        }
        saga.commit();

        info!(%face_id, developer_id, client_user_id, "Created identity");
        Ok(CreateOutcome::Created(face_id))
    }

    /// Replaces the face behind `face_id` and returns the new face id.
    ///
    /// The replacement is indexed before anything is removed. Up to the
    /// removal of the old face every step is rolled back on failure; after
    /// it the new record is written with bounded re-attempts.
    pub async fn update_identity(&self, face_id: &FaceId, image: &[u8]) -> Result<FaceId> {
        let existing = self
            .store
            .get(face_id)
            .await
            .map_err(|e| IdentityError::store("get_record", face_id, e))?
            .ok_or_else(|| {
                warn!(%face_id, "Update requested for unknown face");
                IdentityError::NotFound {
                    face_id: face_id.clone(),
                }
            })?;

        let faces = self
            .recognition
            .detect_faces(image)
            .await
            .map_err(|e| IdentityError::recognition("detect_faces", face_id, e))?;
        if faces.is_empty() {
            warn!(%face_id, "No faces detected, identity left unchanged");
            return Err(IdentityError::NoFaceDetected);
        }

        let mut saga = Saga::new("update_identity");

        let new_face_id = self
            .recognition
            .index_face(image, &ExternalRef::replacing(face_id))
            .await
            .map_err(|e| IdentityError::recognition("index_face", face_id, e))?;
        saga.on_rollback("index_face", new_face_id.clone(), {
            let new_face_id = new_face_id.clone();
            move || async move { self.recognition.delete_face(&new_face_id).await.map(|_| ()) }
        });

        if let Err(e) = self.store.delete(face_id).await {
            let cause = IdentityError::store("delete_record", face_id, e);
            return Err(settle(saga.rollback().await, "update_identity", cause));
        }
        // The old face stays indexed until the next step, so a failed
        // restore leaves it without a record.
        saga.on_rollback("delete_record", face_id.clone(), {
            let existing = existing.clone();
            move || async move { self.store.put(&existing).await }
        });

        match self.recognition.delete_face(face_id).await {
            Ok(true) => {}
            Ok(false) => warn!(%face_id, "Replaced face was already absent from the collection"),
            Err(e) => {
                let cause = IdentityError::recognition("delete_face", face_id, e);
                return Err(settle(saga.rollback().await, "update_identity", cause));
            }
        }
        saga.pivot("delete_face");

        self.persist_replacement(&existing.reassigned(new_face_id.clone()))
            .await?;
        saga.commit();

        info!(old_face_id = %face_id, %new_face_id, "Updated identity");
        Ok(new_face_id)
    }

    /// Removes the record and the indexed face. Existence is decided by the
    /// recognition service.
    pub async fn delete_identity(&self, face_id: &FaceId) -> Result<DeleteOutcome> {
        self.store
            .delete(face_id)
            .await
            .map_err(|e| IdentityError::store("delete_record", face_id, e))?;

        let removed = self
            .recognition
            .delete_face(face_id)
            .await
            .map_err(|e| IdentityError::recognition("delete_face", face_id, e))?;

        if !removed {
            warn!(%face_id, "Delete requested for face not in the collection");
            return Ok(DeleteOutcome::NotFound);
        }

        info!(%face_id, "Deleted identity");
        Ok(DeleteOutcome::Deleted)
    }

    // Indexing cannot be repeated without a duplicate enrollment, so only
    // the write is re-attempted.
    async fn persist_replacement(&self, record: &IdentityRecord) -> Result<()> {
        let mut attempt = 0;
        loop {
            match self.store.put(record).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < self.persist_retry_attempts => {
                    attempt += 1;
                    warn!(
                        face_id = %record.face_id,
                        attempt,
                        error = %e,
                        "Writing replacement record failed, retrying"
                    );
                }
                Err(e) => {
                    error!(
                        face_id = %record.face_id,
                        developer_id = record.developer_id,
                        client_user_id = %record.client_user_id,
                        error = %e,
                        "Indexed face has no identity record"
                    );
                    return Err(IdentityError::Inconsistent {
                        operation: "update_identity",
                        face_id: record.face_id.clone(),
                        detail: format!(
                            "record write failed after {} attempt(s): {}",
                            attempt + 1,
                            e
                        ),
                    });
                }
            }
        }
    }
}

/// Returns `cause` after a clean rollback. Otherwise names the face left
/// behind by the first undo action that failed; the detail lists all of them.
fn settle(
    report: RollbackReport<FaceId>,
    operation: &'static str,
    cause: IdentityError,
) -> IdentityError {
    let Some(first) = report.failed.first() else {
        return cause;
    };

    let face_id = first.subject.clone();
    error!(%face_id, operation, failures = %report.failures(), "Rollback incomplete");
    IdentityError::Inconsistent {
        operation,
        face_id,
        detail: format!("{}; rollback failed: {}", cause, report.failures()),
    }
}
