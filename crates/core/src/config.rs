use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub inference: InferenceSettings,
    pub retry: RetrySettings,
    pub catalogs: CatalogSettings,
    pub output: OutputSettings,
    pub review: ReviewSettings,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct InferenceSettings {
    pub base_url: String,
    pub model: String,
    pub request_timeout_secs: u64,
}

/// Knobs for the resilient invocation layer.
#[derive(Clone, Debug)]
pub struct RetrySettings {
    /// Attempts allowed per credential; total budget is this times the
    /// pool size.
    pub max_retries_per_credential: u32,
    pub base_delay_secs: u64,
    pub intra_cycle_delay_ms: u64,
    pub max_backoff_secs: u64,
    /// Uniform pre-call jitter window for concurrent extraction tasks.
    pub jitter_min_secs: u64,
    pub jitter_max_secs: u64,
}

#[derive(Clone, Debug)]
pub struct CatalogSettings {
    pub material_path: PathBuf,
    pub service_path: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct OutputSettings {
    pub runs_dir: PathBuf,
}

#[derive(Clone, Debug)]
pub struct ReviewSettings {
    /// Rejections tolerated per phase before the gate stops blocking.
    pub max_retries: u32,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub material_catalog: Option<PathBuf>,
    pub service_catalog: Option<PathBuf>,
    pub runs_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            inference: InferenceSettings {
                base_url: "https://generativelanguage.googleapis.com".to_string(),
                model: "gemini-flash-latest".to_string(),
                request_timeout_secs: 120,
            },
            retry: RetrySettings {
                max_retries_per_credential: 3,
                base_delay_secs: 5,
                intra_cycle_delay_ms: 1_000,
                max_backoff_secs: 60,
                jitter_min_secs: 3,
                jitter_max_secs: 8,
            },
            catalogs: CatalogSettings {
                material_path: PathBuf::from("data/catalog/products.csv"),
                service_path: Some(PathBuf::from("data/catalog/service_pricing.csv")),
            },
            output: OutputSettings { runs_dir: PathBuf::from("data/runs") },
            review: ReviewSettings { max_retries: 3 },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigPatch {
    #[serde(default)]
    inference: InferencePatch,
    #[serde(default)]
    retry: RetryPatch,
    #[serde(default)]
    catalogs: CatalogPatch,
    #[serde(default)]
    output: OutputPatch,
    #[serde(default)]
    review: ReviewPatch,
    #[serde(default)]
    logging: LoggingPatch,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct InferencePatch {
    base_url: Option<String>,
    model: Option<String>,
    request_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RetryPatch {
    max_retries_per_credential: Option<u32>,
    base_delay_secs: Option<u64>,
    intra_cycle_delay_ms: Option<u64>,
    max_backoff_secs: Option<u64>,
    jitter_min_secs: Option<u64>,
    jitter_max_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogPatch {
    material_path: Option<PathBuf>,
    service_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct OutputPatch {
    runs_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReviewPatch {
    max_retries: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let maybe_path = resolve_config_path(options.config_path.as_deref());
        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("bidpilot.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(value) = patch.inference.base_url {
            self.inference.base_url = value;
        }
        if let Some(value) = patch.inference.model {
            self.inference.model = value;
        }
        if let Some(value) = patch.inference.request_timeout_secs {
            self.inference.request_timeout_secs = value;
        }
        if let Some(value) = patch.retry.max_retries_per_credential {
            self.retry.max_retries_per_credential = value;
        }
        if let Some(value) = patch.retry.base_delay_secs {
            self.retry.base_delay_secs = value;
        }
        if let Some(value) = patch.retry.intra_cycle_delay_ms {
            self.retry.intra_cycle_delay_ms = value;
        }
        if let Some(value) = patch.retry.max_backoff_secs {
            self.retry.max_backoff_secs = value;
        }
        if let Some(value) = patch.retry.jitter_min_secs {
            self.retry.jitter_min_secs = value;
        }
        if let Some(value) = patch.retry.jitter_max_secs {
            self.retry.jitter_max_secs = value;
        }
        if let Some(value) = patch.catalogs.material_path {
            self.catalogs.material_path = value;
        }
        if let Some(value) = patch.catalogs.service_path {
            self.catalogs.service_path = Some(value);
        }
        if let Some(value) = patch.output.runs_dir {
            self.output.runs_dir = value;
        }
        if let Some(value) = patch.review.max_retries {
            self.review.max_retries = value;
        }
        if let Some(value) = patch.logging.level {
            self.logging.level = value;
        }
        if let Some(value) = patch.logging.format {
            self.logging.format = value;
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(value) = env::var("BIDPILOT_BASE_URL") {
            self.inference.base_url = value;
        }
        if let Ok(value) = env::var("BIDPILOT_MODEL") {
            self.inference.model = value;
        }
        if let Ok(value) = env::var("BIDPILOT_MATERIAL_CATALOG") {
            self.catalogs.material_path = PathBuf::from(value);
        }
        if let Ok(value) = env::var("BIDPILOT_SERVICE_CATALOG") {
            self.catalogs.service_path = Some(PathBuf::from(value));
        }
        if let Ok(value) = env::var("BIDPILOT_RUNS_DIR") {
            self.output.runs_dir = PathBuf::from(value);
        }
        if let Ok(value) = env::var("BIDPILOT_LOG_LEVEL") {
            self.logging.level = value;
        }
        if let Ok(value) = env::var("BIDPILOT_LOG_FORMAT") {
            self.logging.format = value.parse()?;
        }
        if let Ok(value) = env::var("BIDPILOT_MAX_REVIEW_RETRIES") {
            self.review.max_retries = value.parse().map_err(|_| {
                ConfigError::InvalidEnvOverride {
                    key: "BIDPILOT_MAX_REVIEW_RETRIES".to_string(),
                    value,
                }
            })?;
        }
        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(path) = overrides.material_catalog {
            self.catalogs.material_path = path;
        }
        if let Some(path) = overrides.service_catalog {
            self.catalogs.service_path = Some(path);
        }
        if let Some(path) = overrides.runs_dir {
            self.output.runs_dir = path;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.inference.model.trim().is_empty() {
            return Err(ConfigError::Validation("inference.model must not be empty".to_string()));
        }
        if self.inference.base_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "inference.base_url must not be empty".to_string(),
            ));
        }
        if self.retry.jitter_min_secs > self.retry.jitter_max_secs {
            return Err(ConfigError::Validation(format!(
                "retry.jitter_min_secs ({}) exceeds retry.jitter_max_secs ({})",
                self.retry.jitter_min_secs, self.retry.jitter_max_secs
            )));
        }
        Ok(())
    }
}

fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let default = PathBuf::from("bidpilot.toml");
    default.exists().then_some(default)
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let content = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;
    toml::from_str(&content)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}
