//! Configuration loading.
//!
//! Priority order (highest first): CLI flags (applied by the caller),
//! environment variables, the TOML file, built-in defaults. A missing
//! config file is not an error; a malformed one is.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cache::{CacheManifest, DEFAULT_CACHE_VERSION, DEFAULT_ORIGIN};
use crate::provider::{DEFAULT_BASE_URL, DEFAULT_MODEL};

pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse TOML config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderToml {
    pub model: Option<String>,
    pub api_base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    /// Local JSON content pack used when no API key is set.
    pub content_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheToml {
    pub dir: Option<PathBuf>,
    pub version: Option<String>,
    pub origin: Option<String>,
    pub assets: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingToml {
    pub file: Option<PathBuf>,
}

/// On-disk configuration file layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigToml {
    pub provider: ProviderToml,
    pub cache: CacheToml,
    pub logging: LoggingToml,
}

/// Resolved runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Never read from the TOML file, only from the environment.
    pub api_key: Option<String>,
    pub model: String,
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub content_file: Option<PathBuf>,
    pub cache_dir: PathBuf,
    pub manifest: CacheManifest,
    pub log_file: PathBuf,
    pub config_file_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("scripture-quiz");

        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            content_file: None,
            cache_dir: data_dir.join("cache"),
            manifest: CacheManifest::new(DEFAULT_CACHE_VERSION, DEFAULT_ORIGIN),
            log_file: data_dir.join("scripture-quiz.log"),
            config_file_path: None,
        }
    }
}

/// `$XDG_CONFIG_HOME/scripture-quiz/config.toml` or the platform equivalent.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("scripture-quiz").join("config.toml"))
}

/// Load from the default path and the process environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from_path(default_config_path().as_deref())
}

pub fn load_config_from_path(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut config = Config::default();

    if let Some(config_path) = path {
        if config_path.exists() {
            let content =
                std::fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
                    path: config_path.to_path_buf(),
                    source,
                })?;
            let toml_config: ConfigToml = toml::from_str(&content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.to_path_buf());

            tracing::info!(path = %config_path.display(), "Loaded configuration from file");
        } else {
            tracing::debug!(path = %config_path.display(), "Config file not found, using defaults");
        }
    }

    apply_env_config(&mut config, |key| std::env::var(key).ok())?;
    Ok(config)
}

fn apply_toml_config(config: &mut Config, toml: &ConfigToml) {
    if let Some(model) = &toml.provider.model {
        config.model = model.clone();
    }
    if let Some(url) = &toml.provider.api_base_url {
        config.api_base_url = url.clone();
    }
    if let Some(secs) = toml.provider.request_timeout_secs {
        config.request_timeout = Duration::from_secs(secs);
    }
    if let Some(path) = &toml.provider.content_file {
        config.content_file = Some(path.clone());
    }

    if let Some(dir) = &toml.cache.dir {
        config.cache_dir = dir.clone();
    }
    if let Some(version) = &toml.cache.version {
        config.manifest.version = version.clone();
    }
    if let Some(origin) = &toml.cache.origin {
        config.manifest.origin = origin.clone();
    }
    if let Some(assets) = &toml.cache.assets {
        config.manifest.assets = assets.clone();
    }

    if let Some(file) = &toml.logging.file {
        config.log_file = file.clone();
    }
}

/// Apply environment overrides. `lookup` abstracts `std::env::var` for tests.
pub fn apply_env_config<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = lookup("GEMINI_API_KEY").or_else(|| lookup("API_KEY")) {
        if !key.trim().is_empty() {
            config.api_key = Some(key);
        }
    }
    if let Some(model) = lookup("SCRIPTURE_QUIZ_MODEL") {
        config.model = model;
    }
    if let Some(url) = lookup("SCRIPTURE_QUIZ_API_BASE_URL") {
        config.api_base_url = url;
    }
    if let Some(secs) = lookup("SCRIPTURE_QUIZ_TIMEOUT_SECS") {
        let secs: u64 = secs.parse().map_err(|_| {
            ConfigError::Invalid(format!("SCRIPTURE_QUIZ_TIMEOUT_SECS is not a number: {secs}"))
        })?;
        config.request_timeout = Duration::from_secs(secs);
    }
    if let Some(dir) = lookup("SCRIPTURE_QUIZ_CACHE_DIR") {
        config.cache_dir = PathBuf::from(dir);
    }
    if let Some(version) = lookup("SCRIPTURE_QUIZ_CACHE_VERSION") {
        config.manifest.version = version;
    }
    if let Some(origin) = lookup("SCRIPTURE_QUIZ_ORIGIN") {
        config.manifest.origin = origin;
    }
    if let Some(file) = lookup("SCRIPTURE_QUIZ_LOG_FILE") {
        config.log_file = PathBuf::from(file);
    }
    if let Some(file) = lookup("SCRIPTURE_QUIZ_CONTENT") {
        config.content_file = Some(PathBuf::from(file));
    }
    Ok(())
}

/// Overrides from command-line flags.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub content_file: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut Config) {
        if let Some(path) = &self.content_file {
            config.content_file = Some(path.clone());
        }
        if let Some(path) = &self.log_file {
            config.log_file = path.clone();
        }
        if let Some(path) = &self.cache_dir {
            config.cache_dir = path.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.request_timeout, Duration::from_secs(120));
        assert_eq!(config.manifest.version, DEFAULT_CACHE_VERSION);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_parse_toml_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[provider]
model = "gemini-pro"
request_timeout_secs = 30

[cache]
version = "scripture-quiz-v3"
assets = ["/", "/index.html"]

[logging]
file = "/tmp/quiz.log"
"#
        )
        .unwrap();

        let mut config = Config::default();
        let content = std::fs::read_to_string(file.path()).unwrap();
        let parsed: ConfigToml = toml::from_str(&content).unwrap();
        apply_toml_config(&mut config, &parsed);

        assert_eq!(config.model, "gemini-pro");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.manifest.version, "scripture-quiz-v3");
        assert_eq!(config.manifest.assets, vec!["/", "/index.html"]);
        assert_eq!(config.log_file, PathBuf::from("/tmp/quiz.log"));
    }

    #[test]
    fn test_malformed_toml_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[provider\nmodel = ").unwrap();
        let result = load_config_from_path(Some(file.path()));
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = load_config_from_path(Some(Path::new("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config.config_file_path, None);
    }

    #[test]
    fn test_loaded_file_is_recorded() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[cache]\nversion = \"scripture-quiz-v9\"").unwrap();
        let config = load_config_from_path(Some(file.path())).unwrap();
        assert_eq!(config.config_file_path.as_deref(), Some(file.path()));
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config::default();
        let parsed: ConfigToml = toml::from_str("[provider]\nmodel = \"from-file\"").unwrap();
        apply_toml_config(&mut config, &parsed);

        apply_env_config(
            &mut config,
            env(&[
                ("SCRIPTURE_QUIZ_MODEL", "from-env"),
                ("API_KEY", "fallback-key"),
                ("SCRIPTURE_QUIZ_CACHE_VERSION", "v9"),
            ]),
        )
        .unwrap();

        assert_eq!(config.model, "from-env");
        assert_eq!(config.api_key.as_deref(), Some("fallback-key"));
        assert_eq!(config.manifest.version, "v9");
    }

    #[test]
    fn test_gemini_key_preferred() {
        let mut config = Config::default();
        apply_env_config(
            &mut config,
            env(&[("GEMINI_API_KEY", "primary"), ("API_KEY", "fallback")]),
        )
        .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("primary"));
    }

    #[test]
    fn test_bad_timeout_rejected() {
        let mut config = Config::default();
        let result = apply_env_config(&mut config, env(&[("SCRIPTURE_QUIZ_TIMEOUT_SECS", "soon")]));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_cli_overrides_apply() {
        let mut config = Config::default();
        let overrides = ConfigOverrides {
            content_file: Some(PathBuf::from("pack.json")),
            ..Default::default()
        };
        overrides.apply(&mut config);
        assert_eq!(config.content_file, Some(PathBuf::from("pack.json")));
    }
}
