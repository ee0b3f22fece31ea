// src/config.rs - Configuration management
use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub polling: PollingConfig,
    pub export: ExportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_seconds: u64,
    pub connect_timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PollingConfig {
    pub dashboard_interval_seconds: u64,
    pub report_interval_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            request_timeout_seconds: 15,
            connect_timeout_seconds: 5,
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            dashboard_interval_seconds: 30,
            report_interval_seconds: 10,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("exports"),
            format: "csv".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }
}

impl PollingConfig {
    pub fn dashboard_interval(&self) -> Duration {
        Duration::from_secs(self.dashboard_interval_seconds)
    }

    pub fn report_interval(&self) -> Duration {
        Duration::from_secs(self.report_interval_seconds)
    }
}

pub fn load_config() -> Result<Config> {
    load_env_file()?;

    let mut config = if let Ok(config_file) = env::var("CONFIG_FILE") {
        let path = Path::new(&config_file);
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", config_file))?;
        toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", config_file))?
    } else {
        Config::default()
    };

    override_with_env(&mut config);

    config.validate()
        .context("Configuration validation failed")?;

    Ok(config)
}

fn override_with_env(config: &mut Config) {
    if let Ok(url) = env::var("LABDESK_API_URL") {
        config.api.base_url = url;
    }
    if let Ok(timeout_str) = env::var("LABDESK_REQUEST_TIMEOUT_SECS") {
        if let Ok(timeout) = timeout_str.parse::<u64>() {
            config.api.request_timeout_seconds = timeout;
        }
    }
    if let Ok(interval_str) = env::var("LABDESK_POLL_INTERVAL_SECS") {
        if let Ok(interval) = interval_str.parse::<u64>() {
            config.polling.dashboard_interval_seconds = interval;
            config.polling.report_interval_seconds = interval;
        }
    }
    if let Ok(dir) = env::var("LABDESK_EXPORT_DIR") {
        config.export.output_dir = PathBuf::from(dir);
    }
    if let Ok(level) = env::var("RUST_LOG") {
        config.logging.level = level;
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        let url = self.api.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(anyhow::anyhow!(
                "api.base_url must start with http:// or https:// (current: '{}')",
                self.api.base_url
            ));
        }

        if self.api.request_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("api.request_timeout_seconds must be > 0"));
        }

        if self.polling.dashboard_interval_seconds == 0 || self.polling.report_interval_seconds == 0 {
            return Err(anyhow::anyhow!("polling intervals must be > 0"));
        }

        // A poll that can outlive its interval would always be skipped.
        if self.api.request_timeout_seconds > self.polling.dashboard_interval_seconds {
            return Err(anyhow::anyhow!(
                "request timeout ({}s) must not exceed the dashboard poll interval ({}s)",
                self.api.request_timeout_seconds,
                self.polling.dashboard_interval_seconds
            ));
        }

        if !matches!(self.export.format.as_str(), "csv" | "html") {
            return Err(anyhow::anyhow!(
                "export.format must be 'csv' or 'html' (current: '{}')",
                self.export.format
            ));
        }

        Ok(())
    }

    pub fn print_startup_info(&self) {
        log::info!("🧪 Labdesk client starting up...");
        log::info!("🌐 Backend: {}", self.api.base_url);
        log::info!("⏱️  Request timeout: {}s", self.api.request_timeout_seconds);
        log::info!("🔄 Dashboard polling: every {}s", self.polling.dashboard_interval_seconds);
        log::info!("🔄 Lab report polling: every {}s", self.polling.report_interval_seconds);
        log::info!("📄 Export: {} into {}", self.export.format, self.export.output_dir.display());
        log::info!("📊 Logging: {} level", self.logging.level);

        if self.api.base_url.starts_with("http://") && !self.api.base_url.contains("127.0.0.1") && !self.api.base_url.contains("localhost") {
            log::warn!("⚠️  Backend is reached over plain HTTP");
        }
    }
}

pub fn load_env_file() -> Result<()> {
    if let Ok(env_file) = env::var("ENV_FILE") {
        dotenvy::from_filename(&env_file)
            .with_context(|| format!("Failed to load environment file: {}", env_file))?;
    } else if Path::new(".env").exists() {
        dotenvy::dotenv().context("Failed to load .env file")?;
    }
    Ok(())
}
