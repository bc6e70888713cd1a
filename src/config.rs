use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading the YAML configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config yaml: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    #[serde(default)]
    pub use_json: bool,
    #[serde(default = "default_rotation")]
    pub rotation: String,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    /// Verb mounted on `/v1/transactions`
    #[serde(default)]
    pub method: RouteMethod,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            method: RouteMethod::default(),
        }
    }
}

/// HTTP verb accepted by the transaction endpoint
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum RouteMethod {
    #[default]
    Put,
    Post,
}

/// How the single insert is wrapped at the datastore
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionMode {
    /// BEGIN / INSERT / COMMIT, rollback on any failure
    #[default]
    Explicit,
    /// Single auto-committed statement
    Implicit,
}

/// Request pipeline collaborators (schema, template, transaction policy)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PipelineConfig {
    pub schema_path: PathBuf,
    /// Falls back to the built-in `{"status", "message"}` template when unset
    #[serde(default)]
    pub template_path: Option<PathBuf>,
    #[serde(default)]
    pub transaction_mode: TransactionMode,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            schema_path: PathBuf::from("config/schema/transaction.schema.json"),
            template_path: Some(PathBuf::from("config/templates/response.json")),
            transaction_mode: TransactionMode::default(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
    /// Create the `transactions` table on startup when missing
    #[serde(default = "default_init_schema")]
    pub init_schema: bool,
}

fn default_rotation() -> String {
    "daily".to_string()
}

fn default_max_connections() -> u32 {
    20
}

fn default_acquire_timeout_secs() -> u64 {
    5
}

fn default_init_schema() -> bool {
    true
}

impl AppConfig {
    /// Load `config/<env>.yaml`
    pub fn load(env: &str) -> Result<Self, ConfigError> {
        Self::load_from(Path::new(&format!("config/{}.yaml", env)))
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }
}
