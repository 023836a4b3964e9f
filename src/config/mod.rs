//! Configuration loading and management.
//!
//! Loads bridge configuration from `./bridge.toml` (or `$BRIDGE_CONFIG_PATH`).
//! Environment variables override file values; file values override defaults.
//!
//! Precedence: env vars > config file > defaults.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level bridge configuration loaded from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Core settings (`[bridge]`).
    pub bridge: CoreConfig,
    /// Personal-channel bridge settings (`[personal]`).
    pub personal: PersonalConfig,
    /// Official-account platform settings (`[official]`).
    pub official: OfficialConfig,
    /// Page-messaging platform settings (`[page]`).
    pub page: PageConfig,
}

/// Core settings shared by every subcommand.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Directory for rotated JSON log files (daemon mode only).
    pub logs_dir: String,
    /// Seconds between conversation refresh passes in daemon mode.
    pub refresh_interval_secs: u64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            logs_dir: "logs".to_owned(),
            refresh_interval_secs: 30,
        }
    }
}

/// Personal-channel bridge endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PersonalConfig {
    /// Base URL of the device-linked bridge.
    pub bridge_url: String,
}

impl Default for PersonalConfig {
    fn default() -> Self {
        Self {
            bridge_url: "http://127.0.0.1:3001".to_owned(),
        }
    }
}

/// Official-account platform endpoint and credentials.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OfficialConfig {
    /// Base URL of the platform API.
    pub base_url: String,
    /// Bearer token for the platform API.
    pub access_token: String,
}

impl Default for OfficialConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8082".to_owned(),
            access_token: String::new(),
        }
    }
}

/// Page-messaging platform endpoint and credentials.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Base URL of the platform API.
    pub base_url: String,
    /// Page identifier whose inbox is bridged.
    pub page_id: String,
    /// Page access token.
    pub access_token: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8083".to_owned(),
            page_id: String::new(),
            access_token: String::new(),
        }
    }
}

impl BridgeConfig {
    /// Load configuration with precedence: env vars > TOML file > defaults.
    ///
    /// Config file path: `$BRIDGE_CONFIG_PATH` or `./bridge.toml`. A missing
    /// file yields defaults.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from_file()?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load from TOML file only, no env overrides.
    fn load_from_file() -> Result<Self> {
        let path = Self::config_path_with(|key| std::env::var(key).ok());
        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                tracing::info!(path = %path.display(), "loading config from file");
                let config: BridgeConfig =
                    toml::from_str(&contents).context("failed to parse config TOML")?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("no config file found, using defaults");
                Ok(BridgeConfig::default())
            }
            Err(e) => Err(anyhow::anyhow!("failed to read config file: {e}")),
        }
    }

    /// Resolve config path using a custom env resolver (for testing).
    fn config_path_with(env: impl Fn(&str) -> Option<String>) -> PathBuf {
        env("BRIDGE_CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("bridge.toml"))
    }

    /// Apply environment variable overrides (env > config > defaults).
    ///
    /// Takes a resolver function for testability.
    pub fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(v) = env("BRIDGE_LOG_LEVEL") {
            self.bridge.log_level = v;
        }
        if let Some(v) = env("BRIDGE_LOGS_DIR") {
            self.bridge.logs_dir = v;
        }
        if let Some(v) = env("BRIDGE_REFRESH_INTERVAL_SECS") {
            match v.parse() {
                Ok(n) => self.bridge.refresh_interval_secs = n,
                Err(_) => tracing::warn!(
                    var = "BRIDGE_REFRESH_INTERVAL_SECS",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }
        if let Some(v) = env("BRIDGE_PERSONAL_URL") {
            self.personal.bridge_url = v;
        }
        if let Some(v) = env("BRIDGE_OFFICIAL_URL") {
            self.official.base_url = v;
        }
        if let Some(v) = env("BRIDGE_OFFICIAL_TOKEN") {
            self.official.access_token = v;
        }
        if let Some(v) = env("BRIDGE_PAGE_URL") {
            self.page.base_url = v;
        }
        if let Some(v) = env("BRIDGE_PAGE_ID") {
            self.page.page_id = v;
        }
        if let Some(v) = env("BRIDGE_PAGE_TOKEN") {
            self.page.access_token = v;
        }
    }

    /// Reject malformed provider endpoints up front.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("personal.bridge_url", &self.personal.bridge_url),
            ("official.base_url", &self.official.base_url),
            ("page.base_url", &self.page.base_url),
        ] {
            url::Url::parse(value).with_context(|| format!("invalid URL in {name}: {value}"))?;
        }
        Ok(())
    }
}
