use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Retry policy parameters (optional section in config.toml).
/// Applies to idempotent GET requests only; writes are never retried.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per request (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.5 = 500ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 0.5,
            max_delay_secs: 15,
        }
    }
}

/// Station configuration loaded from `~/.config/lgs/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationConfig {
    /// Base URL of the station backend, e.g. "http://lgs.hospital.local:3000/".
    pub base_url: String,
    /// Connect timeout for API requests, in seconds.
    pub connect_timeout_secs: u64,
    /// Overall timeout for API requests, in seconds. The artifact download
    /// has its own, much longer limit.
    pub request_timeout_secs: u64,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    /// Optional override for the update artifact directory (default: XDG cache home).
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    /// Privileged command used to install a verified update. "{pkg}" is
    /// replaced with the package path. Default: "pkexec dpkg -i {pkg}".
    #[serde(default)]
    pub install_command: Option<String>,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/".to_string(),
            connect_timeout_secs: 15,
            request_timeout_secs: 30,
            retry: None,
            cache_dir: None,
            install_command: None,
        }
    }
}

impl StationConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Directory holding the downloaded update artifact.
    pub fn artifact_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.cache_dir {
            return Ok(dir.clone());
        }
        let xdg_dirs = xdg::BaseDirectories::with_prefix("lgs")?;
        Ok(xdg_dirs.get_cache_home())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("lgs")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<StationConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = StationConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: StationConfig = toml::from_str(&data)?;
    Ok(cfg)
}
