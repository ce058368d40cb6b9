use crate::access::AccessController;
use anyhow::Context;
use sigil_core::SigilConfig;
use sigil_token::Tokenizer;
use std::sync::Arc;

/// Shared application state, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub tokenizer: Arc<Tokenizer>,
    pub access: Arc<AccessController>,
}

impl AppState {
    pub fn init(cfg: &SigilConfig) -> anyhow::Result<Self> {
        let descriptor = cfg.token.resolve_key()?;
        let tokenizer = Arc::new(
            Tokenizer::new(&descriptor, cfg.token.reuse).context("Failed to load signing key")?,
        );
        let access = Arc::new(
            AccessController::new(tokenizer.clone(), &cfg.access, &cfg.token)
                .context("Invalid access configuration")?,
        );
        Ok(Self { tokenizer, access })
    }
}
