use serde::Deserialize;
use std::time::Duration;
use config::{Config as ConfigLib, ConfigError, Environment, File};
use crate::utils::error::{Result, NodeError};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub recognition: RecognitionConfig,
    pub storage: StorageConfig,
    pub workflow: WorkflowConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    pub max_payload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecognitionConfig {
    pub endpoint: String,
    pub collection_id: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Rocksdb,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub path: String,
    pub table: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowConfig {
    /// Extra attempts at writing the replacement record once the old face is gone.
    pub persist_retry_attempts: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    pub directory: Option<String>,
}

impl Config {
    /// Loads defaults, then `config/default` and `config/local`, then
    /// `FACEID_*` environment variables (`FACEID_RECOGNITION__COLLECTION_ID`).
    pub fn new() -> Result<Self> {
        dotenv::dotenv().ok();

        let config = Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("FACEID")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Builds a configuration from defaults plus the given TOML document.
    pub fn from_toml(source: &str) -> Result<Self> {
        let config = Self::builder()?
            .add_source(File::from_str(source, config::FileFormat::Toml))
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(ConfigLib::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("server.max_payload_bytes", 10_485_760)? // 10MB
            .set_default("recognition.endpoint", "")?
            .set_default("recognition.collection_id", "")?
            .set_default("recognition.timeout_secs", 30)?
            .set_default("storage.backend", "rocksdb")?
            .set_default("storage.path", "data/identities")?
            .set_default("storage.table", "faceid")?
            .set_default("workflow.persist_retry_attempts", 1)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?)
    }

    fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(NodeError::Config("Invalid port number".into()));
        }
        if self.server.max_payload_bytes == 0 {
            return Err(NodeError::Config("max_payload_bytes must be greater than 0".into()));
        }

        if self.recognition.endpoint.trim().is_empty() {
            return Err(NodeError::Config("recognition.endpoint must be set".into()));
        }
        if self.recognition.collection_id.trim().is_empty() {
            return Err(NodeError::Config("recognition.collection_id must be set".into()));
        }
        if self.recognition.timeout_secs == 0 {
            return Err(NodeError::Config("timeout_secs must be greater than 0".into()));
        }

        if self.storage.backend == StorageBackend::Rocksdb && self.storage.path.trim().is_empty() {
            return Err(NodeError::Config("storage.path must be set for the rocksdb backend".into()));
        }
        if self.storage.table.trim().is_empty() {
            return Err(NodeError::Config("storage.table must be set".into()));
        }

        Ok(())
    }
}

impl RecognitionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl From<ConfigError> for NodeError {
    fn from(error: ConfigError) -> Self {
        NodeError::Config(error.to_string())
    }
}
