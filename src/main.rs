use anyhow::Context;
use faceid_node::{
    utils::{config::Config, logging},
    Application,
};
use tracing::{error, info};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::new().context("Failed to load configuration")?;

    // Keep the guard alive so buffered file logs are flushed on exit.
    let _log_guard = logging::init(&config.logging)?;

    info!("Starting faceid-node v{}", env!("CARGO_PKG_VERSION"));

    let app = Application::new(config).map_err(|e| {
        error!("Failed to initialize application: {}", e);
        e
    })?;

    app.run().await.map_err(|e| {
        error!("Application stopped with error: {}", e);
        e
    })?;

    info!("Application shutdown complete");
    Ok(())
}
