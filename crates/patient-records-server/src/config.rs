//! Server configuration.
//!
//! Sources, lowest to highest precedence: built-in defaults, an optional JSON
//! config file, then command-line flags and `PATIENT_RECORDS_*` environment
//! variables.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use patient_records_core::{PatientRegistry, RecordResult};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Where the patient and credential documents live.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// `patient.json` and `users.json` in the data directory
    #[default]
    Json,
    /// `records.db` in the data directory
    Sqlite,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 8000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the stored documents (default: ".")
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub backend: Backend,

    /// CORS allowed origins; empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_dir: default_data_dir(),
            backend: Backend::default(),
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Load from a JSON file. Missing keys take their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Open the registry for the configured backend.
    pub fn open_registry(&self) -> RecordResult<PatientRegistry> {
        match self.backend {
            Backend::Json => Ok(PatientRegistry::open_json_dir(&self.data_dir)),
            Backend::Sqlite => PatientRegistry::open_sqlite(
                self.data_dir.join(patient_records_core::registry::SQLITE_FILE),
            ),
        }
    }
}

/// Command-line and environment overrides.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// JSON config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long, env = "PATIENT_RECORDS_HOST")]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(long, env = "PATIENT_RECORDS_PORT")]
    pub port: Option<u16>,

    /// Directory holding the stored documents
    #[arg(long, env = "PATIENT_RECORDS_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Storage backend
    #[arg(long, value_enum, env = "PATIENT_RECORDS_BACKEND")]
    pub backend: Option<Backend>,

    /// Allowed CORS origin (repeatable)
    #[arg(long = "cors-origin")]
    pub cors_origins: Vec<String>,
}

impl ConfigArgs {
    /// Defaults, then the config file if given, then these overrides.
    pub fn resolve(self) -> ConfigResult<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::from_file(path)?,
            None => ServerConfig::default(),
        };

        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(data_dir) = self.data_dir {
            config.data_dir = data_dir;
        }
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if !self.cors_origins.is_empty() {
            config.cors_origins = self.cors_origins;
        }
        Ok(config)
    }
}
