pub mod api;
pub mod core;
pub mod storage;
pub mod utils;

use std::sync::Arc;
use actix_web::web::Data;
use tracing::{info, warn};

use crate::{
    api::rest::{AppState, RestApi},
    core::{
        image::{Base64Decoder, ImageDecoder},
        recognition::{HttpRecognitionGateway, RecognitionGateway},
        services::{health::HealthService, identity::IdentityService},
    },
    storage::{MemoryRecordStore, RecordStore, RocksRecordStore},
    utils::{
        config::{Config, StorageBackend},
        error::{NodeError, Result},
    },
};

pub struct Application {
    config: Arc<Config>,
    state: AppState,
}

impl Application {
    /// Opens the record store and the recognition client once; both live
    /// for the rest of the process.
    pub fn new(config: Config) -> Result<Self> {
        info!("Initializing record store...");
        let store: Arc<dyn RecordStore> = match config.storage.backend {
            StorageBackend::Rocksdb => Arc::new(
                RocksRecordStore::new(&config.storage)
                    .map_err(|e| NodeError::Storage(e.to_string()))?,
            ),
            StorageBackend::Memory => {
                warn!("Using in-memory record store, identities are lost on exit");
                Arc::new(MemoryRecordStore::new())
            }
        };

        info!(
            collection = %config.recognition.collection_id,
            endpoint = %config.recognition.endpoint,
            "Initializing recognition gateway..."
        );
        let recognition: Arc<dyn RecognitionGateway> = Arc::new(
            HttpRecognitionGateway::new(&config.recognition)
                .map_err(|e| NodeError::Recognition(e.to_string()))?,
        );

        Ok(Self::with_components(config, recognition, store))
    }

    pub fn with_components(
        config: Config,
        recognition: Arc<dyn RecognitionGateway>,
        store: Arc<dyn RecordStore>,
    ) -> Self {
        let identity = IdentityService::new(recognition, store, &config.workflow);
        let decoder: Arc<dyn ImageDecoder> = Arc::new(Base64Decoder);

        Self {
            config: Arc::new(config),
            state: AppState {
                identity: Data::new(identity),
                decoder: Data::from(decoder),
                health: Data::new(HealthService::new()),
            },
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Serves requests until the server is stopped.
    pub async fn run(&self) -> Result<()> {
        info!("Starting API server...");
        let server = RestApi::new(self.config.server.clone(), self.state.clone()).start()?;

        server
            .await
            .map_err(|e| NodeError::Init(format!("API server failed: {}", e)))?;

        info!("API server stopped");
        Ok(())
    }
}
