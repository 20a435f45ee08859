use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use genflow_core::Settings;
use genflow_engine::ChannelSettings;
use genflow_logging::genflow_info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "genflow.ron";
pub const TOKEN_VAR: &str = "GENFLOW_API_TOKEN";
const RPC_URL_VAR: &str = "GENFLOW_RPC_BASE_URL";
const HTTP_URL_VAR: &str = "GENFLOW_HTTP_BASE_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub rpc_base_url: String,
    /// Absent means calls have no fallback channel.
    pub http_base_url: Option<String>,
    pub language: String,
    pub humanize_delay_ms: u64,
    pub humanize_passes: u8,
    pub watch_interval_secs: u64,
    pub watch_max_attempts: u32,
    pub sample_interval_ms: u64,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    #[serde(skip)]
    pub api_token: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let settings = Settings::default();
        let channel = ChannelSettings::default();
        Self {
            rpc_base_url: "http://localhost:54321".to_string(),
            http_base_url: None,
            language: settings.language,
            humanize_delay_ms: settings.humanize_delay.as_millis() as u64,
            humanize_passes: settings.humanize_passes,
            watch_interval_secs: settings.watch_interval.as_secs(),
            watch_max_attempts: settings.watch_max_attempts,
            sample_interval_ms: settings.sample_interval.as_millis() as u64,
            connect_timeout_secs: channel.connect_timeout.as_secs(),
            request_timeout_secs: channel.request_timeout.as_secs(),
            api_token: None,
        }
    }
}

impl AppConfig {
    /// Reads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                genflow_info!("No config at {:?}; using defaults", path);
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let config = Self::parse(&content).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })?;
        genflow_info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        ron::from_str(content).map_err(|err| err.to_string())
    }

    /// Environment wins over the file for endpoints and supplies the token.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        if let Some(url) = non_empty(RPC_URL_VAR) {
            self.rpc_base_url = url;
        }
        if let Some(url) = non_empty(HTTP_URL_VAR) {
            self.http_base_url = Some(url);
        }
        self.api_token = non_empty(TOKEN_VAR).map(|token| token.trim().to_string());
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rpc_base_url.trim().is_empty() {
            return Err(invalid("rpc_base_url", "must not be empty"));
        }
        if self
            .http_base_url
            .as_deref()
            .is_some_and(|url| url.trim().is_empty())
        {
            return Err(invalid("http_base_url", "remove it or give a URL"));
        }
        if self.language.trim().is_empty() {
            return Err(invalid("language", "must not be empty"));
        }
        if self.humanize_passes == 0 {
            return Err(invalid("humanize_passes", "must be at least 1"));
        }
        if self.watch_interval_secs == 0 {
            return Err(invalid("watch_interval_secs", "must be positive"));
        }
        if self.watch_max_attempts == 0 {
            return Err(invalid("watch_max_attempts", "must be positive"));
        }
        if self.sample_interval_ms == 0 {
            return Err(invalid("sample_interval_ms", "must be positive"));
        }
        if self.request_timeout_secs == 0 {
            return Err(invalid("request_timeout_secs", "must be positive"));
        }
        Ok(())
    }

    pub fn settings(&self) -> Settings {
        Settings {
            language: self.language.clone(),
            humanize_delay: Duration::from_millis(self.humanize_delay_ms),
            humanize_passes: self.humanize_passes,
            watch_interval: Duration::from_secs(self.watch_interval_secs),
            watch_max_attempts: self.watch_max_attempts,
            sample_interval: Duration::from_millis(self.sample_interval_ms),
        }
    }

    pub fn channel_settings(&self) -> ChannelSettings {
        ChannelSettings {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

/// `abcd...wxyz`; short tokens are hidden entirely.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.ron")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.settings(), Settings::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"(
                rpc_base_url: "https://project.supabase.co",
                http_base_url: Some("https://api.example.com"),
                watch_interval_secs: 5,
            )"#
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.rpc_base_url, "https://project.supabase.co");
        assert_eq!(config.http_base_url.as_deref(), Some("https://api.example.com"));
        assert_eq!(config.settings().watch_interval, Duration::from_secs(5));
        assert_eq!(config.watch_max_attempts, 75);
        assert_eq!(config.sample_interval_ms, 800);
        assert_eq!(config.humanize_delay_ms, 500);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "(rpc_base_url: 42)").unwrap();
        let err = AppConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn environment_overrides_endpoints_and_supplies_token() {
        let mut config = AppConfig::default();
        config.apply_env(env(&[
            ("GENFLOW_RPC_BASE_URL", "https://rpc.example.com"),
            ("GENFLOW_API_TOKEN", "  sk-live-0123456789  "),
            ("GENFLOW_HTTP_BASE_URL", ""),
        ]));
        assert_eq!(config.rpc_base_url, "https://rpc.example.com");
        assert_eq!(config.http_base_url, None);
        assert_eq!(config.api_token.as_deref(), Some("sk-live-0123456789"));
    }

    #[test]
    fn zero_intervals_are_rejected() {
        let config = AppConfig {
            watch_interval_secs: 0,
            ..AppConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "watch_interval_secs",
                ..
            })
        ));
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn token_masking() {
        assert_eq!(mask_token("abcd1234567890wxyz"), "abcd...wxyz");
        assert_eq!(mask_token("short"), "*****");
        assert_eq!(mask_token(""), "");
    }
}
