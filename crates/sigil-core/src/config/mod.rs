//! Configuration types for Sigil.
//!
//! Everything is read from one YAML file, `sigil.yaml` by default or the path in
//! the `SIGIL_CONFIG` environment variable. Every section and field has a default,
//! so an empty file is a valid configuration (apart from the signing key).
//!
//! ```yaml
//! token:
//!   algo_key_env: SIGIL_KEY
//!   timeout: 10m
//!   max_ttl: 12h
//! access:
//!   base_url: https://example.com/
//!   plans: [FreePlan, 1, PremiumPlan, 100]
//! server:
//!   bind: 0.0.0.0:8080
//! ```

pub mod access;
pub mod server;
pub mod token;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub use access::{AccessConfig, PlanItem};
pub use server::ServerConfig;
pub use token::TokenConfig;

/// Environment variable holding the configuration file path.
pub const CONFIG_PATH_ENV: &str = "SIGIL_CONFIG";

/// Configuration file used when `SIGIL_CONFIG` is not set.
pub const DEFAULT_CONFIG_PATH: &str = "sigil.yaml";

/// Complete Sigil configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SigilConfig {
    /// Signing/verification key and token lifetimes.
    #[serde(default)]
    pub token: TokenConfig,

    /// Cookie access controller.
    #[serde(default)]
    pub access: AccessConfig,

    /// HTTP server.
    #[serde(default)]
    pub server: ServerConfig,
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("no signing key configured (set token.algo_key, token.algo_key_env or token.algo_key_file)")]
    MissingKey,
}

impl SigilConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        // serde_yaml rejects an empty document
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    /// Load from `SIGIL_CONFIG` if set, else from `sigil.yaml` when it exists,
    /// else the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::from_file(PathBuf::from(path)),
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::from_file(DEFAULT_CONFIG_PATH),
            None => Ok(Self::default()),
        }
    }
}
