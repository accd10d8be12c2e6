use crate::job::client::DEFAULT_PROJECT_NAME;
use crate::options::{ColorGrading, ProcessOptions, QuoteCategory, QuoteFormat, QuoteLanguage, Resolution};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_DIR: &str = "shorts-studio";
const CONFIG_FILE: &str = "config.json";
const MIN_POLL_INTERVAL_MS: u64 = 250;

pub const API_URL_ENV: &str = "SHORTS_API_URL";
pub const LOCAL_API_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;

/// Production address baked in at build time, when the build provides one.
pub const PRODUCTION_API_URL: Option<&str> = option_env!("SHORTS_PRODUCTION_API_URL");

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to resolve config dir")]
    NoConfigDir,

    #[error("Config I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: Option<String>,
    pub project_name: String,
    pub resolution: Resolution,
    pub color_grading: ColorGrading,
    pub poll_interval_ms: u64,
    pub request_timeout_secs: Option<u64>,
    pub quote: QuoteDefaults,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: None,
            project_name: DEFAULT_PROJECT_NAME.to_string(),
            resolution: Resolution::default(),
            color_grading: ColorGrading::default(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            request_timeout_secs: None,
            quote: QuoteDefaults::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct QuoteDefaults {
    pub language: QuoteLanguage,
    pub category: QuoteCategory,
    pub format: QuoteFormat,
}

impl AppConfig {
    pub fn process_options(&self) -> ProcessOptions {
        ProcessOptions {
            resolution: self.resolution,
            color_grading: self.color_grading,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(MIN_POLL_INTERVAL_MS))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Base address of the service: environment override, then this file,
    /// then the production default, then the local development server.
    pub fn api_base_url(&self) -> String {
        resolve_api_base_url(
            std::env::var(API_URL_ENV).ok(),
            self.api_base_url.clone(),
            PRODUCTION_API_URL,
        )
    }
}

pub fn resolve_api_base_url(
    env_override: Option<String>,
    configured: Option<String>,
    production: Option<&str>,
) -> String {
    env_override
        .and_then(non_blank)
        .or_else(|| configured.and_then(non_blank))
        .or_else(|| production.map(str::to_string).and_then(non_blank))
        .unwrap_or_else(|| LOCAL_API_URL.to_string())
}

pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(dir.join(CONFIG_DIR).join(CONFIG_FILE))
}

/// Reads the config at `path`, writing defaults when it does not exist.
///
/// A file that fails to parse is copied to `config.json.bak` and replaced
/// with defaults.
pub fn load_or_create(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        let config = AppConfig::default();
        save(path, &config)?;
        return Ok(config);
    }

    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    match serde_json::from_str::<AppConfig>(&raw) {
        Ok(mut config) => {
            normalize_config(&mut config);
            Ok(config)
        }
        Err(e) => {
            tracing::warn!("Config at {} is invalid ({}), resetting", path.display(), e);
            let backup = path.with_extension("json.bak");
            let _ = fs::copy(path, backup);
            let config = AppConfig::default();
            save(path, &config)?;
            Ok(config)
        }
    }
}

pub fn save(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn normalize_config(config: &mut AppConfig) {
    config.api_base_url = config
        .api_base_url
        .take()
        .and_then(non_blank)
        .map(|url| url.trim_end_matches('/').to_string());
    if config.project_name.trim().is_empty() {
        config.project_name = DEFAULT_PROJECT_NAME.to_string();
    } else {
        config.project_name = config.project_name.trim().to_string();
    }
    config.poll_interval_ms = config.poll_interval_ms.max(MIN_POLL_INTERVAL_MS);
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_base_url_resolution_order() {
        assert_eq!(
            resolve_api_base_url(
                Some("http://env:1".into()),
                Some("http://file:2".into()),
                Some("https://prod")
            ),
            "http://env:1"
        );
        assert_eq!(
            resolve_api_base_url(Some("  ".into()), Some("http://file:2".into()), Some("https://prod")),
            "http://file:2"
        );
        assert_eq!(resolve_api_base_url(None, None, Some("https://prod")), "https://prod");
        assert_eq!(resolve_api_base_url(None, None, None), LOCAL_API_URL);
    }

    #[test]
    fn test_load_creates_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let config = load_or_create(&path).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(path.exists());
        assert_eq!(config.poll_interval(), Duration::from_secs(2));
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn test_partial_file_is_normalized() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            r#"{"project_name":"  ","resolution":"720p","poll_interval_ms":10,"api_base_url":"http://host:8000/"}"#,
        )
        .unwrap();

        let config = load_or_create(&path).unwrap();
        assert_eq!(config.project_name, DEFAULT_PROJECT_NAME);
        assert_eq!(config.resolution, Resolution::P720);
        assert_eq!(config.color_grading, ColorGrading::None);
        assert_eq!(config.poll_interval_ms, MIN_POLL_INTERVAL_MS);
        assert_eq!(config.api_base_url.as_deref(), Some("http://host:8000"));
    }

    #[test]
    fn test_corrupt_file_is_backed_up_and_reset() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "{ not json").unwrap();

        let config = load_or_create(&path).unwrap();
        assert_eq!(config, AppConfig::default());
        let backup = dir.path().join("config.json.bak");
        assert_eq!(fs::read_to_string(backup).unwrap(), "{ not json");
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let mut config = AppConfig::default();
        config.color_grading = ColorGrading::MatteFilm;
        config.quote.format = QuoteFormat::Video;
        config.request_timeout_secs = Some(30);

        save(&path, &config).unwrap();
        let loaded = load_or_create(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.request_timeout(), Some(Duration::from_secs(30)));
    }
}
