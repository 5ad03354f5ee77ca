// src/api/rest.rs
use actix_web::{
    body::MessageBody,
    dev::{Server, Service, ServiceFactory, ServiceRequest, ServiceResponse},
    middleware::{Logger, NormalizePath},
    web::{self, Data},
    App, Error, HttpServer,
};
use tracing::{info, warn};

use crate::{
    api::{error::ApiError, handlers},
    core::{
        image::ImageDecoder,
        services::{health::HealthService, identity::IdentityService},
    },
    utils::{
        config::ServerConfig,
        error::{NodeError, Result},
    },
};

/// Handles shared by every worker.
#[derive(Clone)]
pub struct AppState {
    pub identity: Data<IdentityService>,
    pub decoder: Data<dyn ImageDecoder>,
    pub health: Data<HealthService>,
}

/// Registers app data, the JSON body limit and all routes.
pub fn configure(cfg: &mut web::ServiceConfig, state: &AppState, max_payload_bytes: usize) {
    cfg.app_data(state.identity.clone())
        .app_data(state.decoder.clone())
        .app_data(state.health.clone())
        .app_data(
            web::JsonConfig::default()
                .limit(max_payload_bytes)
                .error_handler(|err, _req| {
                    warn!("Rejected request body: {}", err);
                    ApiError::BadRequest(err.to_string()).into()
                }),
        )
        // Must precede the root scope, which would otherwise claim the path.
        .service(handlers::health::resource())
        .service(handlers::identity::scope());
}

/// The full application one worker serves: request counter, access log,
/// path normalization and every route.
pub fn build_app(
    state: AppState,
    max_payload_bytes: usize,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    let health = state.health.clone();
    App::new()
        .wrap_fn(move |req, srv| {
            health.record_request();
            srv.call(req)
        })
        .wrap(Logger::default())
        .wrap(NormalizePath::trim())
        .configure(move |cfg| configure(cfg, &state, max_payload_bytes))
}

pub struct RestApi {
    config: ServerConfig,
    state: AppState,
}

impl RestApi {
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Binds the listener. The returned server stops gracefully on SIGINT.
    pub fn start(&self) -> Result<Server> {
        let state = self.state.clone();
        let max_payload_bytes = self.config.max_payload_bytes;

        let mut server = HttpServer::new(move || build_app(state.clone(), max_payload_bytes));
        if let Some(workers) = self.config.workers {
            server = server.workers(workers);
        }

        let server = server
            .bind((self.config.host.as_str(), self.config.port))
            .map_err(|e| NodeError::Init(format!("Failed to bind API server: {}", e)))?
            .run();

        info!(host = %self.config.host, port = self.config.port, "API server listening");
        Ok(server)
    }
}
