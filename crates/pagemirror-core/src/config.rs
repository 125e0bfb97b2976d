use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::fetch::CurlOptions;

/// Global configuration loaded from `~/.config/pagemirror/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorConfig {
    /// Seconds allowed for establishing a connection.
    pub connect_timeout_secs: u64,
    /// Total deadline in seconds for one request (page or asset), including the body.
    pub request_timeout_secs: u64,
    /// Maximum number of redirects followed per request.
    pub max_redirections: u32,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
    /// Abort a transfer that stays below this many bytes/sec for `low_speed_time_secs`.
    #[serde(default = "default_low_speed_limit")]
    pub low_speed_limit_bytes: u32,
    #[serde(default = "default_low_speed_time")]
    pub low_speed_time_secs: u64,
}

fn default_low_speed_limit() -> u32 {
    1024
}

fn default_low_speed_time() -> u64 {
    30
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
            request_timeout_secs: 60,
            max_redirections: 10,
            user_agent: concat!("pagemirror/", env!("CARGO_PKG_VERSION")).to_string(),
            low_speed_limit_bytes: default_low_speed_limit(),
            low_speed_time_secs: default_low_speed_time(),
        }
    }
}

impl MirrorConfig {
    /// Transfer options for the curl-backed fetcher.
    pub fn curl_options(&self) -> CurlOptions {
        CurlOptions {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            timeout: Duration::from_secs(self.request_timeout_secs),
            max_redirections: self.max_redirections,
            user_agent: self.user_agent.clone(),
            low_speed_limit: self.low_speed_limit_bytes,
            low_speed_time: Duration::from_secs(self.low_speed_time_secs),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pagemirror")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<MirrorConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = MirrorConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: MirrorConfig = toml::from_str(&data)?;
    Ok(cfg)
}
