// Configuration types shared across all Sigil crates
pub mod config;

pub use config::{AccessConfig, ConfigError, PlanItem, ServerConfig, SigilConfig, TokenConfig};
