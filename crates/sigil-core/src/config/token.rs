//! Token key and lifetime configuration.

use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration of the signing key and of issued token lifetimes.
///
/// The key is a descriptor: a bare HMAC secret, `ALGO:<key>`, or a URL.
/// For a tokenizer it holds the private key (or the HMAC secret).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Inline key descriptor.
    #[serde(default)]
    pub algo_key: Option<String>,

    /// Environment variable containing the key descriptor.
    #[serde(default)]
    pub algo_key_env: Option<String>,

    /// Path to a file containing the key descriptor.
    #[serde(default)]
    pub algo_key_file: Option<PathBuf>,

    /// Prefer decoding tokens in place over allocating.
    #[serde(default = "default_true")]
    pub reuse: bool,

    /// Lifetime of issued tokens (e.g. "10m").
    #[serde(default = "default_timeout")]
    pub timeout: String,

    /// Upper bound for `timeout` (e.g. "12h").
    #[serde(default = "default_max_ttl")]
    pub max_ttl: String,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            algo_key: None,
            algo_key_env: None,
            algo_key_file: None,
            reuse: true,
            timeout: default_timeout(),
            max_ttl: default_max_ttl(),
        }
    }
}

impl TokenConfig {
    /// Resolve the key descriptor: inline value, then environment, then file.
    pub fn resolve_key(&self) -> Result<String, ConfigError> {
        if let Some(key) = &self.algo_key {
            return Ok(key.clone());
        }

        if let Some(env_var) = &self.algo_key_env {
            if let Ok(key) = std::env::var(env_var) {
                return Ok(key);
            }
        }

        if let Some(path) = &self.algo_key_file {
            let key = std::fs::read_to_string(path)?;
            return Ok(key.trim().to_string());
        }

        Err(ConfigError::MissingKey)
    }
}

fn default_true() -> bool {
    true
}

fn default_timeout() -> String {
    "10m".to_string()
}

fn default_max_ttl() -> String {
    "12h".to_string()
}
