use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::model::LocationRequest;

pub const API_KEY_VAR: &str = "HEFENG_API_KEY";
pub const WEBHOOK_VAR: &str = "DINGTALK_WEBHOOK";

/// QWeather endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QWeatherConfig {
    /// API host, e.g. "https://devapi.qweather.com" or a per-account host.
    #[serde(default = "default_api_host")]
    pub api_host: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl QWeatherConfig {
    /// Request timeout shared by the QWeather client and the webhook notifier.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for QWeatherConfig {
    fn default() -> Self {
        Self {
            api_host: default_api_host(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Title of the DingTalk markdown message.
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
        }
    }
}

fn default_api_host() -> String {
    "https://devapi.qweather.com".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_title() -> String {
    "每日天气播报".to_string()
}

/// Top-level configuration file.
///
/// Example TOML:
/// [[areas]]
/// name = "北京"
/// days = 3
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub qweather: QWeatherConfig,

    #[serde(default)]
    pub report: ReportConfig,

    /// Areas to report on, in broadcast order.
    #[serde(default)]
    pub areas: Vec<LocationRequest>,
}

impl Config {
    /// Load from `path`, or from the platform config file when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_file_path()?,
        };

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.qweather.timeout_seconds == 0 {
            bail!("qweather.timeout_seconds must be at least 1");
        }
        for (idx, area) in self.areas.iter().enumerate() {
            if area.name.trim().is_empty() {
                bail!("areas[{idx}]: name must not be empty");
            }
            if area.days == 0 {
                bail!("areas[{idx}] ({}): days must be at least 1", area.name);
            }
        }
        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-bot", "weather-bot")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// Secrets taken from the process environment once at startup.
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub webhook_url: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("webhook_url", &self.webhook_url.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = get(API_KEY_VAR).with_context(|| format!("Missing {API_KEY_VAR} env var"))?;

        Ok(Self {
            api_key,
            webhook_url: get(WEBHOOK_VAR),
        })
    }

    pub fn require_webhook(&self) -> Result<&str> {
        self.webhook_url
            .as_deref()
            .with_context(|| format!("Missing {WEBHOOK_VAR} env var"))
    }
}
