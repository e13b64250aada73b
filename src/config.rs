//! Runtime settings come from the environment once, at startup; the few
//! values that never change between deployments are hard-coded below.

use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::{env, net::SocketAddr, path::PathBuf};

/// Uploads (and therefore whole multipart bodies) larger than this are
/// rejected before a listing is touched.
pub const UPLOAD_MAX_BYTES: usize = 8 * 1024 * 1024;

/// How many listings the home page shows.
pub const LATEST_LISTINGS: i64 = 6;

/// PBKDF2 rounds for new password hashes. Existing hashes carry their own
/// count, so this can be raised without a migration.
pub const PW_ITERATIONS: u32 = if cfg!(test) { 1_000 } else { 260_000 };

const DEFAULT_SESSION_TTL_SECS: i64 = 60 * 60 * 24 * 7;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub upload_dir: PathBuf,
    pub session_secret: Vec<u8>,
    pub bind_addr: SocketAddr,
    pub session_ttl_secs: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://listings.db".to_string()),
            upload_dir: env::var("UPLOAD_DIR")
                .unwrap_or_else(|_| "static/uploads".to_string())
                .into(),
            session_secret: env::var("SESSION_SECRET")
                .context("SESSION_SECRET must be set")?
                .into_bytes(),
            bind_addr: env::var("BIND_ADDR")
                .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
                .parse()
                .context("BIND_ADDR must be a socket address")?,
            session_ttl_secs: match env::var("SESSION_TTL_SECS") {
                Ok(v) => v
                    .parse()
                    .context("SESSION_TTL_SECS must be a whole number")?,
                Err(_) => DEFAULT_SESSION_TTL_SECS,
            },
        })
    }
}
