use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::token::{self, MintOptions};

#[derive(Parser, Debug)]
#[command(name = "sigil", version, about = "Sigil token CLI")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Token operations (mint/verify/inspect)
    Token {
        #[command(subcommand)]
        cmd: TokenCommand,
    },
}

#[derive(Subcommand, Debug)]
enum TokenCommand {
    /// Mint a new token
    Mint {
        /// Key descriptor ("<secret>" or "ALGO:<private key>") or a file containing it
        #[arg(long, env = "SIGIL_KEY", hide_env_values = true)]
        key: Option<String>,

        /// Username claim
        #[arg(long, default_value = "")]
        user: String,

        /// Group claim (repeatable); the first group is the access plan
        #[arg(long = "group")]
        groups: Vec<String>,

        /// Organization claim (repeatable)
        #[arg(long = "org")]
        orgs: Vec<String>,

        /// Issue a refresh token for this namespace instead of an access token
        #[arg(long = "refresh")]
        refresh_namespace: Option<String>,

        /// Token lifetime, e.g. "10m"
        #[arg(long, default_value = "10m")]
        timeout: String,

        /// Longest lifetime allowed, e.g. "12h"
        #[arg(long, default_value = "12h")]
        max_ttl: String,

        /// Write the token to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Verify a token and print its claims
    Verify {
        /// Key descriptor ("<secret>" or "ALGO:<public key>") or a file containing it
        #[arg(long, env = "SIGIL_KEY", hide_env_values = true)]
        key: Option<String>,

        /// Expect refresh claims instead of access claims
        #[arg(long, default_value_t = false)]
        refresh: bool,

        /// Token, or a file containing it
        token: String,
    },

    /// Print a token's payload without verifying it
    Inspect {
        /// Token, or a file containing it
        token: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Token { cmd } => match cmd {
            TokenCommand::Mint {
                key,
                user,
                groups,
                orgs,
                refresh_namespace,
                timeout,
                max_ttl,
                output,
            } => token::mint(
                key,
                MintOptions {
                    user,
                    groups,
                    orgs,
                    refresh_namespace,
                    timeout,
                    max_ttl,
                    output,
                },
            )?,
            TokenCommand::Verify {
                key,
                refresh,
                token,
            } => token::verify(key, token, refresh)?,
            TokenCommand::Inspect { token } => token::inspect(token)?,
        },
    }

    Ok(())
}
