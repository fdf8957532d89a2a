use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::storage::{SeedData, StoreConfig};

pub const DEFAULT_DATABASE: &str = "roster.db";
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct RosterConfig {
    pub database: Option<String>,
    pub bind: Option<String>,
    pub server_url: Option<String>,
    pub busy_timeout_ms: Option<u64>,
    pub expose_error_detail: Option<bool>,
    pub seed: Option<SeedData>,
}

impl RosterConfig {
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(self.database.as_deref().unwrap_or(DEFAULT_DATABASE))
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        let bind = self.bind.as_deref().unwrap_or(DEFAULT_BIND);
        bind.parse()
            .map_err(|e| anyhow::anyhow!("invalid bind address `{}`: {}", bind, e))
    }

    pub fn server_url(&self) -> &str {
        self.server_url.as_deref().unwrap_or(DEFAULT_SERVER_URL)
    }

    pub fn expose_error_detail(&self) -> bool {
        self.expose_error_detail.unwrap_or(false)
    }

    /// Store parameters derived from this config
    pub fn store_config(&self) -> StoreConfig {
        let mut store = StoreConfig::new(self.database_path());
        if let Some(ms) = self.busy_timeout_ms {
            store = store.with_busy_timeout(Duration::from_millis(ms));
        }
        store
    }

    /// Starter config written by `roster config init`
    pub fn starter() -> Self {
        Self {
            database: Some(DEFAULT_DATABASE.to_string()),
            bind: Some(DEFAULT_BIND.to_string()),
            server_url: Some(DEFAULT_SERVER_URL.to_string()),
            busy_timeout_ms: Some(5000),
            expose_error_detail: Some(false),
            seed: Some(SeedData::default()),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("roster.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<RosterConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: RosterConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &RosterConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
