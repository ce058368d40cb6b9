//! Token commands.
//!
//! `sigil token mint` - Sign a new access (or refresh) token.
//! `sigil token verify` - Verify a token and print its claims.
//! `sigil token inspect` - Print a token's payload without verifying it.

use anyhow::Context;
use sigil_token::{Tokenizer, Verifier, inspect_unverified};
use std::fs;
use std::path::{Path, PathBuf};

/// Options of `sigil token mint`.
#[derive(Debug, Clone)]
pub struct MintOptions {
    pub user: String,
    pub groups: Vec<String>,
    pub orgs: Vec<String>,
    /// Issue a refresh token for this namespace instead of an access token.
    pub refresh_namespace: Option<String>,
    pub timeout: String,
    pub max_ttl: String,
    pub output: Option<PathBuf>,
}

/// Resolve a key descriptor from either a file path or the descriptor itself.
///
/// The key string can be:
/// - A path to a file containing the descriptor
/// - The descriptor directly (e.g., from the SIGIL_KEY env var)
fn resolve_descriptor(key: Option<String>) -> anyhow::Result<String> {
    let key_str = key.context("Key not provided. Either pass --key <descriptor|path> or set SIGIL_KEY env var")?;

    let path = Path::new(&key_str);
    if path.is_file() {
        let descriptor = fs::read_to_string(path)
            .with_context(|| format!("Failed to read key from file: {}", path.display()))?;
        return Ok(descriptor.trim().to_string());
    }

    Ok(key_str.trim().to_string())
}

/// Read a token given inline or as a file path.
fn resolve_token(token: String) -> anyhow::Result<String> {
    if Path::new(&token).is_file() {
        let content = fs::read_to_string(&token).with_context(|| format!("Failed to read token file: {token}"))?;
        return Ok(content.trim().to_string());
    }
    Ok(token.trim().to_string())
}

/// Mint a new token signed with the private key (or HMAC secret).
pub fn mint(key: Option<String>, opts: MintOptions) -> anyhow::Result<()> {
    let descriptor = resolve_descriptor(key)?;
    let tokenizer = Tokenizer::new(&descriptor, false).context("Failed to load signing key")?;

    let token = match &opts.refresh_namespace {
        Some(namespace) => tokenizer.gen_refresh_token(&opts.timeout, &opts.max_ttl, namespace, &opts.user)?,
        None => tokenizer.gen_access_token(
            &opts.timeout,
            &opts.max_ttl,
            &opts.user,
            opts.groups.clone(),
            opts.orgs.clone(),
        )?,
    };
    tracing::debug!(algorithm = %tokenizer.algorithm(), "Token minted");

    if let Some(output_path) = &opts.output {
        fs::write(output_path, &token)
            .with_context(|| format!("Failed to write token to {}", output_path.display()))?;
        println!("✔ Token written to: {}", output_path.display());
        println!("  Algorithm: {}", tokenizer.algorithm());
        if let Some(namespace) = &opts.refresh_namespace {
            println!("  Type: Refresh token (namespace {namespace})");
        } else {
            println!("  Type: Access token");
        }
        println!("  Expires in: {}", opts.timeout);
    } else {
        println!("{token}");
    }

    Ok(())
}

/// Verify a token with the verification key and print its claims.
pub fn verify(key: Option<String>, token: String, refresh: bool) -> anyhow::Result<()> {
    let descriptor = resolve_descriptor(key)?;
    let verifier = Verifier::new(&descriptor, false).context("Failed to load verification key")?;
    let token = resolve_token(token)?;

    let claims = if refresh {
        serde_json::to_value(verifier.refresh_claims(token.as_bytes()).context("Token verification failed")?)?
    } else {
        serde_json::to_value(verifier.claims(token.as_bytes()).context("Token verification failed")?)?
    };

    println!("✔ Token is valid ({})", verifier.algorithm());
    println!();
    println!("{}", serde_json::to_string_pretty(&claims)?);

    Ok(())
}

/// Inspect a token without verification.
pub fn inspect(token: String) -> anyhow::Result<()> {
    let token = resolve_token(token)?;
    let payload = inspect_unverified(&token).context("Failed to decode token payload")?;

    println!("Token payload (NOT verified):");
    println!("{}", serde_json::to_string_pretty(&payload)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigil_token::Algorithm;
    use sigil_token::testing::TestKeys;
    use tempfile::tempdir;

    const SECRET: &str = "HS256:9d2e0a02121179a3c3de1b035ae1355b1548781c8ce8538a1dc0853a12dfb13d";

    fn opts(output: PathBuf) -> MintOptions {
        MintOptions {
            user: "jane".to_string(),
            groups: vec!["FreePlan".to_string()],
            orgs: vec![],
            refresh_namespace: None,
            timeout: "10m".to_string(),
            max_ttl: "12h".to_string(),
            output: Some(output),
        }
    }

    #[test]
    fn test_mint_then_verify_with_inline_key() {
        let dir = tempdir().unwrap();
        let token_path = dir.path().join("token.jwt");

        mint(Some(SECRET.to_string()), opts(token_path.clone())).unwrap();

        let token = fs::read_to_string(&token_path).unwrap();
        assert_eq!(token.matches('.').count(), 2);
        verify(Some(SECRET.to_string()), token_path.to_string_lossy().to_string(), false).unwrap();
        inspect(token).unwrap();
    }

    #[test]
    fn test_mint_with_key_file() {
        let dir = tempdir().unwrap();
        let key_path = dir.path().join("private.key");
        let token_path = dir.path().join("token.jwt");

        let keys = TestKeys::generate(Algorithm::ES256);
        fs::write(&key_path, format!("{}\n", keys.private_descriptor())).unwrap();

        mint(Some(key_path.to_string_lossy().to_string()), opts(token_path.clone())).unwrap();

        let token = fs::read_to_string(&token_path).unwrap();
        verify(Some(keys.public_descriptor()), token.clone(), false).unwrap();

        let other = TestKeys::generate(Algorithm::ES256);
        assert!(verify(Some(other.public_descriptor()), token, false).is_err());
    }

    #[test]
    fn test_refresh_token() {
        let dir = tempdir().unwrap();
        let token_path = dir.path().join("refresh.jwt");

        let mut options = opts(token_path.clone());
        options.refresh_namespace = Some("ns".to_string());
        mint(Some(SECRET.to_string()), options).unwrap();

        let token = fs::read_to_string(&token_path).unwrap();
        verify(Some(SECRET.to_string()), token, true).unwrap();
    }

    #[test]
    fn test_errors() {
        let dir = tempdir().unwrap();

        assert!(mint(None, opts(dir.path().join("a"))).is_err());

        let mut options = opts(dir.path().join("b"));
        options.timeout = "1d".to_string();
        assert!(mint(Some(SECRET.to_string()), options).is_err());

        assert!(verify(Some(SECRET.to_string()), "a.b.c".to_string(), false).is_err());
        assert!(inspect("not-a-token".to_string()).is_err());
    }
}
