//! CLI configuration management.
//!
//! Reads/writes JSON at `~/.config/fieldup/config.json`. A missing file is
//! created with defaults; unparseable files are ignored with a warning.

use std::path::{Path, PathBuf};
use std::time::Duration;

use fieldup_upload::config::{DEFAULT_MAX_ATTEMPTS, DEFAULT_REQUEST_TIMEOUT, DEFAULT_RETRY_DELAY};
use fieldup_upload::{DEFAULT_CHUNK_SIZE, HttpTransportConfig, QueueConfig, RetryPolicy};
use serde::{Deserialize, Serialize};

use crate::Cli;

/// Environment variable selecting the upload target.
pub const BASE_URL_ENV: &str = "FIELDUP_BASE_URL";

/// On-disk config format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    #[serde(default)]
    base_url: String,
    #[serde(default)]
    chunk_size: u64,
    #[serde(default)]
    max_attempts: u32,
    #[serde(default)]
    retry_delay_secs: u64,
    #[serde(default)]
    request_timeout_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token_file: Option<PathBuf>,
    #[serde(default)]
    legacy_file_types: bool,
}

/// Effective CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldupConfig {
    pub base_url: String,
    pub chunk_size: u64,
    pub max_attempts: u32,
    pub retry_delay: Duration,
    pub request_timeout: Duration,
    pub token_file: Option<PathBuf>,
    /// Send only `video`/`image` file types.
    pub legacy_file_types: bool,
}

impl Default for FieldupConfig {
    fn default() -> Self {
        Self {
            base_url: HttpTransportConfig::default().base_url,
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay: DEFAULT_RETRY_DELAY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            token_file: None,
            legacy_file_types: false,
        }
    }
}

impl FieldupConfig {
    /// Loads configuration from `path`, or from the default location.
    ///
    /// `FIELDUP_BASE_URL` overrides the file's base URL.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let file_path = match path {
            Some(path) => path.to_path_buf(),
            None => config_file_path()?,
        };

        let mut config = Self::read_or_create(&file_path)?;
        config.apply_base_url_override(std::env::var(BASE_URL_ENV).ok());
        Ok(config)
    }

    fn read_or_create(file_path: &Path) -> anyhow::Result<Self> {
        if !file_path.exists() {
            let config = Self::default();
            config.save(file_path)?;
            tracing::info!(path = %file_path.display(), "created default configuration");
            return Ok(config);
        }

        let content = std::fs::read_to_string(file_path)?;
        match serde_json::from_str::<ConfigFile>(&content) {
            Ok(file) => Ok(Self::from_file(file)),
            Err(e) => {
                tracing::warn!(
                    path = %file_path.display(),
                    error = %e,
                    "failed to parse config, using defaults"
                );
                Ok(Self::default())
            }
        }
    }

    /// Merges a parsed file over the defaults; zero or empty values keep the default.
    fn from_file(file: ConfigFile) -> Self {
        let mut config = Self::default();
        if !file.base_url.trim().is_empty() {
            config.base_url = file.base_url;
        }
        if file.chunk_size > 0 {
            config.chunk_size = file.chunk_size;
        }
        if file.max_attempts > 0 {
            config.max_attempts = file.max_attempts;
        }
        if file.retry_delay_secs > 0 {
            config.retry_delay = Duration::from_secs(file.retry_delay_secs);
        }
        if file.request_timeout_secs > 0 {
            config.request_timeout = Duration::from_secs(file.request_timeout_secs);
        }
        config.token_file = file.token_file;
        config.legacy_file_types = file.legacy_file_types;
        config
    }

    /// Saves configuration to `file_path`.
    pub fn save(&self, file_path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = ConfigFile {
            base_url: self.base_url.clone(),
            chunk_size: self.chunk_size,
            max_attempts: self.max_attempts,
            retry_delay_secs: self.retry_delay.as_secs(),
            request_timeout_secs: self.request_timeout.as_secs(),
            token_file: self.token_file.clone(),
            legacy_file_types: self.legacy_file_types,
        };

        let json = serde_json::to_string_pretty(&file)?;
        std::fs::write(file_path, json)?;

        tracing::debug!("configuration saved");
        Ok(())
    }

    fn apply_base_url_override(&mut self, value: Option<String>) {
        if let Some(url) = value.filter(|url| !url.trim().is_empty()) {
            tracing::debug!(base_url = %url, "base url taken from {BASE_URL_ENV}");
            self.base_url = url;
        }
    }

    /// Applies command line flags, which win over file and environment.
    pub fn with_overrides(mut self, cli: &Cli) -> Self {
        if let Some(url) = &cli.base_url {
            self.base_url = url.clone();
        }
        if let Some(path) = &cli.token_file {
            self.token_file = Some(path.clone());
        }
        if let Some(size) = cli.chunk_size {
            self.chunk_size = size;
        }
        self
    }

    pub fn queue_config(&self) -> QueueConfig {
        QueueConfig {
            chunk_size: self.chunk_size,
            retry: RetryPolicy {
                max_attempts: self.max_attempts,
                delay: self.retry_delay,
            },
        }
    }

    pub fn transport_config(&self) -> HttpTransportConfig {
        HttpTransportConfig {
            base_url: self.base_url.clone(),
            request_timeout: self.request_timeout,
            legacy_file_types: self.legacy_file_types,
        }
    }
}

fn config_file_path() -> anyhow::Result<PathBuf> {
    let config_dir = config_base_dir()?;
    Ok(config_dir.join("fieldup").join("config.json"))
}

fn config_base_dir() -> anyhow::Result<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        let appdata = std::env::var("APPDATA")
            .map_err(|_| anyhow::anyhow!("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata))
    }

    #[cfg(not(target_os = "windows"))]
    {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME is not set"))?;
        Ok(PathBuf::from(home).join(".config"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = FieldupConfig::read_or_create(&path).unwrap();
        assert_eq!(config, FieldupConfig::default());
        assert!(path.exists());

        let reloaded = FieldupConfig::read_or_create(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{
                "baseUrl": "https://api.example.com/api",
                "chunkSize": 1048576,
                "maxAttempts": 5,
                "retryDelaySecs": 1,
                "tokenFile": "/run/secrets/token",
                "legacyFileTypes": true
            }"#,
        )
        .unwrap();

        let config = FieldupConfig::read_or_create(&path).unwrap();
        assert_eq!(config.base_url, "https://api.example.com/api");
        assert_eq!(config.chunk_size, 1_048_576);
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.retry_delay, Duration::from_secs(1));
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(config.token_file, Some(PathBuf::from("/run/secrets/token")));
        assert!(config.transport_config().legacy_file_types);
    }

    #[test]
    fn zero_values_keep_defaults() {
        let config = FieldupConfig::from_file(ConfigFile {
            base_url: "  ".into(),
            chunk_size: 0,
            max_attempts: 0,
            retry_delay_secs: 0,
            request_timeout_secs: 0,
            token_file: None,
            legacy_file_types: false,
        });
        assert_eq!(config, FieldupConfig::default());
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let config = FieldupConfig::read_or_create(&path).unwrap();
        assert_eq!(config, FieldupConfig::default());
    }

    #[test]
    fn env_override_replaces_base_url() {
        let mut config = FieldupConfig::default();
        config.apply_base_url_override(Some("https://staging.example.com".into()));
        assert_eq!(config.base_url, "https://staging.example.com");

        config.apply_base_url_override(Some(String::new()));
        assert_eq!(config.base_url, "https://staging.example.com");

        config.apply_base_url_override(None);
        assert_eq!(config.base_url, "https://staging.example.com");
    }

    #[test]
    fn flags_win_over_file() {
        let cli = Cli::parse_from([
            "fieldup",
            "--base-url",
            "https://prod.example.com",
            "--chunk-size",
            "1024",
            "a.jpg",
        ]);
        let config = FieldupConfig {
            base_url: "https://file.example.com".into(),
            ..Default::default()
        }
        .with_overrides(&cli);

        assert_eq!(config.base_url, "https://prod.example.com");
        assert_eq!(config.chunk_size, 1024);
        assert_eq!(config.token_file, None);
    }

    #[test]
    fn derived_library_configs() {
        let config = FieldupConfig {
            chunk_size: 4096,
            max_attempts: 4,
            ..Default::default()
        };
        let queue = config.queue_config();
        assert_eq!(queue.chunk_size, 4096);
        assert_eq!(queue.retry.max_attempts, 4);
        assert_eq!(queue.retry.delay, DEFAULT_RETRY_DELAY);
        assert_eq!(config.transport_config().base_url, config.base_url);
    }
}
