use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level API configuration shared across services.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfigInner {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub store: StoreConfig,
    pub workflow: WorkflowConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(flatten, default)]
    inner: Arc<ApiConfigInner>,
}

impl Deref for ApiConfig {
    type Target = ApiConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for ApiConfig {
    fn deref_mut(&mut self) -> &mut ApiConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub ssl: Option<SslConfig>,
}

/// TLS certificate/key paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Log file rotation period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogRotation {
    Minutely,
    Hourly,
    #[default]
    Daily,
    Never,
}

/// Logging output configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Identifier of the process; also the log file prefix.
    pub name: String,
    pub console: bool,
    /// Default level directive (`RUST_LOG` still wins).
    pub level: String,
    /// Extra module directives, e.g. `fhub_packages=debug`.
    pub filter: Option<String>,
    /// Enables rolling file output when set.
    pub directory: Option<PathBuf>,
    pub rotation: LogRotation,
    pub max_files: usize,
    pub json: bool,
}

/// `SurrealDB` connection of the record store.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// `mem://` keeps everything in memory; `rocksdb://path` persists locally.
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub credentials: Option<StoreCredentials>,
}

/// Root credentials, for engines that require them.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreCredentials {
    pub username: String,
    pub password: String,
}

/// Behaviour when no active rate band covers a shipment's weight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingRatePolicy {
    /// Fail shipment creation with a business-rule error.
    #[default]
    Reject,
    /// Create the shipment with a zero shipping cost.
    ZeroCost,
}

/// Workflow knobs that are deployment decisions rather than business settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub missing_rate: MissingRatePolicy,
    /// Attempts at drawing an unused human-readable code before giving up.
    pub code_attempts: u32,
}

// --- Default ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: IpAddr::V4(Ipv4Addr::UNSPECIFIED), port: 4583, ssl: None }
    }
}

impl Default for SslConfig {
    fn default() -> Self {
        Self { cert: PathBuf::from("cert.pem"), key: PathBuf::from("key.pem") }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: "mem://".to_owned(),
            namespace: "fhub".to_owned(),
            database: "main".to_owned(),
            credentials: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            name: "fhub".to_owned(),
            console: true,
            level: "info".to_owned(),
            filter: None,
            directory: None,
            rotation: LogRotation::Daily,
            max_files: 10,
            json: false,
        }
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self { missing_rate: MissingRatePolicy::Reject, code_attempts: 16 }
    }
}
