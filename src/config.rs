//! Typed configuration: defaults, then a YAML file, then `CADENCE_*` variables.

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::detector::Thresholds;

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "CADENCE";

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {}", .path.display())]
    Read {
        /// File that was requested
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid YAML for [`Config`].
    #[error("failed to parse config file {}", .path.display())]
    Parse {
        /// File that was requested
        path: PathBuf,
        /// Underlying parse failure
        #[source]
        source: serde_yaml::Error,
    },

    /// An environment override could not be parsed.
    #[error("invalid value {value:?} for {key}: expected {expected}")]
    InvalidEnv {
        /// Variable name
        key: String,
        /// Raw value
        value: String,
        /// Expected type
        expected: &'static str,
    },

    /// A value violates a range invariant.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// The sample file could not be written.
    #[error("failed to write config file {}", .path.display())]
    Write {
        /// Destination
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },
}

/// Complete application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Detection thresholds
    pub thresholds: Thresholds,
    /// Glob patterns skipped by diff collection
    pub exclude_files: Vec<String>,
    /// Webhook server settings
    pub webhook: WebhookConfig,
    /// Optional AI-assisted review settings
    pub ai: AiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            exclude_files: default_exclude_files(),
            webhook: WebhookConfig::default(),
            ai: AiConfig::default(),
        }
    }
}

fn default_exclude_files() -> Vec<String> {
    ["package-lock.json", "yarn.lock", "*.min.js", "*.min.css", "node_modules/**"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Webhook server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// Whether `cadence webhook` may start
    pub enabled: bool,
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Shared secret for `X-Hub-Signature-256`; empty disables verification
    pub secret: String,
    /// Worker tasks processing queued jobs
    pub max_workers: usize,
    /// Request read timeout in seconds
    pub read_timeout: u64,
    /// Response write timeout in seconds
    pub write_timeout: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: "0.0.0.0".to_string(),
            port: 3000,
            secret: String::new(),
            max_workers: 4,
            read_timeout: 30,
            write_timeout: 30,
        }
    }
}

/// AI-assisted review settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Whether `--ai` may call the provider
    pub enabled: bool,
    /// Provider name; only `openai` is supported
    pub provider: String,
    /// API key
    pub api_key: String,
    /// Model identifier
    pub model: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: "openai".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
        }
    }
}

impl Config {
    /// Loads defaults, the optional file and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    /// Like [`Config::load`] with an explicit environment lookup.
    pub fn load_with_env<F>(path: Option<&Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        config.apply_env(lookup)?;
        config.normalize();
        config
            .thresholds
            .validate()
            .map_err(ConfigError::Invalid)?;

        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "Loaded config file");

        // An empty document deserializes as unit, not as an empty mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies `CADENCE_<SECTION>_<KEY>` overrides.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvReader { lookup };

        let t = &mut self.thresholds;
        env.parse("THRESHOLDS_SUSPICIOUS_ADDITIONS", &mut t.suspicious_additions)?;
        env.parse("THRESHOLDS_SUSPICIOUS_DELETIONS", &mut t.suspicious_deletions)?;
        env.parse("THRESHOLDS_MAX_ADDITIONS_PER_MIN", &mut t.max_additions_per_min)?;
        env.parse("THRESHOLDS_MAX_DELETIONS_PER_MIN", &mut t.max_deletions_per_min)?;
        env.parse("THRESHOLDS_MIN_TIME_DELTA_SECONDS", &mut t.min_time_delta_seconds)?;
        env.parse("THRESHOLDS_MAX_FILES_PER_COMMIT", &mut t.max_files_per_commit)?;
        env.parse("THRESHOLDS_MAX_ADDITION_RATIO", &mut t.max_addition_ratio)?;
        env.parse("THRESHOLDS_MIN_DELETION_RATIO", &mut t.min_deletion_ratio)?;
        env.parse("THRESHOLDS_MIN_COMMIT_SIZE_RATIO", &mut t.min_commit_size_ratio)?;
        env.flag("THRESHOLDS_ENABLE_PRECISION_ANALYSIS", &mut t.enable_precision_analysis)?;

        if let Some(value) = env.get("EXCLUDE_FILES") {
            self.exclude_files = value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }

        let w = &mut self.webhook;
        env.flag("WEBHOOK_ENABLED", &mut w.enabled)?;
        env.string("WEBHOOK_HOST", &mut w.host);
        env.parse("WEBHOOK_PORT", &mut w.port)?;
        env.string("WEBHOOK_SECRET", &mut w.secret);
        env.parse("WEBHOOK_MAX_WORKERS", &mut w.max_workers)?;
        env.parse("WEBHOOK_READ_TIMEOUT", &mut w.read_timeout)?;
        env.parse("WEBHOOK_WRITE_TIMEOUT", &mut w.write_timeout)?;

        let a = &mut self.ai;
        env.flag("AI_ENABLED", &mut a.enabled)?;
        env.string("AI_PROVIDER", &mut a.provider);
        env.string("AI_KEY", &mut a.api_key);
        env.string("AI_API_KEY", &mut a.api_key);
        env.string("AI_MODEL", &mut a.model);

        Ok(())
    }

    /// Replaces zero or empty values that have no meaning with defaults.
    fn normalize(&mut self) {
        let defaults = WebhookConfig::default();
        let w = &mut self.webhook;
        if w.host.is_empty() {
            w.host = defaults.host;
        }
        if w.port == 0 {
            w.port = defaults.port;
        }
        if w.max_workers == 0 {
            w.max_workers = defaults.max_workers;
        }
        if w.read_timeout == 0 {
            w.read_timeout = defaults.read_timeout;
        }
        if w.write_timeout == 0 {
            w.write_timeout = defaults.write_timeout;
        }
        if self.ai.model.is_empty() {
            self.ai.model = AiConfig::default().model;
        }
    }
}

struct EnvReader<F> {
    lookup: F,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn key(suffix: &str) -> String {
        format!("{ENV_PREFIX}_{suffix}")
    }

    fn get(&self, suffix: &str) -> Option<String> {
        (self.lookup)(&Self::key(suffix))
    }

    fn string(&self, suffix: &str, target: &mut String) {
        if let Some(value) = self.get(suffix) {
            *target = value;
        }
    }

    fn parse<T: FromStr>(&self, suffix: &str, target: &mut T) -> Result<(), ConfigError> {
        let Some(value) = self.get(suffix) else {
            return Ok(());
        };
        *target = value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidEnv {
                key: Self::key(suffix),
                value: value.clone(),
                expected: std::any::type_name::<T>(),
            })?;
        Ok(())
    }

    fn flag(&self, suffix: &str, target: &mut bool) -> Result<(), ConfigError> {
        let Some(value) = self.get(suffix) else {
            return Ok(());
        };
        *target = match value.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => {
                return Err(ConfigError::InvalidEnv {
                    key: Self::key(suffix),
                    value,
                    expected: "bool",
                })
            }
        };
        Ok(())
    }
}

/// Commented sample configuration whose values equal the defaults.
pub const SAMPLE_CONFIG: &str = r#"# Cadence configuration
# Scores git commits for signs of automated or AI-generated code.

thresholds:
  # Size
  suspicious_additions: 500
  suspicious_deletions: 1000

  # Velocity (lines per minute)
  max_additions_per_min: 100
  max_deletions_per_min: 500

  # Minimum gap before a velocity is trusted
  min_time_delta_seconds: 60

  # File dispersion
  max_files_per_commit: 50

  # Ratios
  max_addition_ratio: 0.95
  min_deletion_ratio: 0.95
  min_commit_size_ratio: 100

  enable_precision_analysis: true

# Paths skipped when collecting diffs
exclude_files:
  - package-lock.json
  - yarn.lock
  - "*.min.js"
  - "*.min.css"
  - "node_modules/**"

webhook:
  enabled: false
  host: "0.0.0.0"
  port: 3000
  # Shared secret for X-Hub-Signature-256; leave empty to skip verification
  secret: ""
  max_workers: 4
  # Seconds
  read_timeout: 30
  write_timeout: 30

# Optional AI-assisted review (analyze --ai)
ai:
  enabled: false
  provider: "openai"
  # Or set CADENCE_AI_API_KEY
  api_key: ""
  model: "gpt-4o-mini"
"#;

/// Writes [`SAMPLE_CONFIG`] to `path`, readable only by the owner on Unix.
pub fn generate_sample_config(path: &Path) -> Result<(), ConfigError> {
    let write_err = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt as _;
        options.mode(0o600);
    }

    let mut file = options.open(path).map_err(write_err)?;
    file.write_all(SAMPLE_CONFIG.as_bytes()).map_err(write_err)?;
    Ok(())
}
