//! Process configuration, read from the environment at startup.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;

use mentara_rls::RlsConfig;

pub const BIND_ADDR_VAR: &str = "MENTARA_BIND_ADDR";
pub const JWT_SECRET_VAR: &str = "JWT_SECRET";
pub const SEED_FILE_VAR: &str = "MENTARA_SEED_FILE";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub rls: RlsConfig,
    /// JSON fixtures loaded into the in-memory store at startup.
    pub seed_file: Option<PathBuf>,
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = lookup(BIND_ADDR_VAR)
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .with_context(|| format!("{BIND_ADDR_VAR} is not a socket address"))?;

        let jwt_secret = lookup(JWT_SECRET_VAR).unwrap_or_else(|| {
            tracing::warn!("{JWT_SECRET_VAR} not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        let rls = RlsConfig::from_lookup(&lookup).context("invalid RLS configuration")?;

        Ok(Self {
            bind_addr,
            jwt_secret,
            rls,
            seed_file: lookup(SEED_FILE_VAR).map(PathBuf::from),
        })
    }
}
