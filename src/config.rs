//! Game and catalog configuration.

use crate::catalog::{CatalogError, HttpCatalog, RecordStyle};
use crate::hints::HintLocale;
use crate::scoring::ScoreRules;
use crate::session::{FetchFailurePolicy, SessionOptions};
use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Environment variable overriding [`CatalogConfig::api_url`].
pub const API_URL_ENV: &str = "PLAYER_SEEKER_API_URL";

/// Where and how to reach the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
pub struct CatalogConfig {
    /// Catalog base URL.
    #[serde(default = "default_api_url")]
    api_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,

    /// Record endpoint addressing.
    #[serde(default)]
    record_style: RecordStyle,
}

#[instrument]
fn default_api_url() -> String {
    "http://127.0.0.1:8787".to_string()
}

#[instrument]
fn default_timeout_secs() -> u64 {
    10
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
            record_style: RecordStyle::default(),
        }
    }
}

impl CatalogConfig {
    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Builds the HTTP client described by this config.
    #[instrument(skip(self), fields(api_url = %self.api_url))]
    pub fn connect(&self) -> Result<HttpCatalog, CatalogError> {
        HttpCatalog::new(&self.api_url, self.timeout(), self.record_style)
    }
}

/// Full game configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct GameConfig {
    /// Catalog connection.
    catalog: CatalogConfig,

    /// Score deltas.
    scoring: ScoreRules,

    /// Hint language.
    locale: HintLocale,

    /// Candidate handling when a record fetch fails.
    fetch_failure: FetchFailurePolicy,

    /// Seed for reproducible target and hint order.
    #[setters(strip_option)]
    seed: Option<u64>,
}

impl GameConfig {
    /// Loads configuration from a TOML file. Missing keys take defaults.
    ///
    /// The result is not validated, since environment and command-line
    /// overrides may still fill in what the file leaves out. Call
    /// [`GameConfig::validate`] once every layer is applied.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(api_url = %config.catalog.api_url, locale = %config.locale, "Config loaded successfully");
        Ok(config)
    }

    /// Applies overrides from `lookup`, keyed like environment variables.
    #[instrument(skip(self, lookup))]
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(API_URL_ENV).filter(|url| !url.trim().is_empty()) {
            debug!(api_url = %url, "API URL overridden from environment");
            self.catalog.api_url = url;
        }
        self
    }

    /// Applies command-line overrides. Set fields win over the file and
    /// the environment.
    #[instrument(skip(self))]
    pub fn with_cli_overrides(mut self, overrides: &ConfigOverrides) -> Self {
        if let Some(url) = &overrides.api_url {
            debug!(api_url = %url, "API URL overridden from command line");
            self.catalog.api_url = url.clone();
        }
        if let Some(style) = overrides.record_style {
            self.catalog.record_style = style;
        }
        if let Some(locale) = overrides.locale {
            self.locale = locale;
        }
        if let Some(policy) = overrides.fetch_failure {
            self.fetch_failure = policy;
        }
        if let Some(seed) = overrides.seed {
            self.seed = Some(seed);
        }
        self
    }

    /// Loads every layer in rising priority: file (or defaults), the
    /// process environment, then `overrides`. Validates the merged result.
    #[instrument(skip(path, overrides))]
    pub fn load(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        Self::load_with(path, overrides, |key| std::env::var(key).ok())
    }

    /// Like [`GameConfig::load`], reading environment keys from `lookup`.
    pub fn load_with(
        path: Option<&Path>,
        overrides: &ConfigOverrides,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        }
        .with_overrides_from(lookup)
        .with_cli_overrides(overrides);

        config.validate()?;
        Ok(config)
    }

    /// Rejects settings no session could run with.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.catalog.api_url.as_str();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::new(format!(
                "api_url must be an http(s) URL, got '{}'",
                url
            )));
        }
        if self.catalog.timeout_secs == 0 {
            return Err(ConfigError::new("timeout_secs must be positive".to_string()));
        }
        if let Some(field) = self.scoring.negative_field() {
            return Err(ConfigError::new(format!(
                "scoring.{} must not be negative",
                field
            )));
        }
        Ok(())
    }

    /// Session tunables derived from this config.
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions::default()
            .with_rules(self.scoring)
            .with_locale(self.locale)
            .with_fetch_timeout(self.catalog.timeout())
            .with_fetch_failure(self.fetch_failure)
    }
}

/// Settings given on the command line. `None` keeps the lower layer's
/// value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Setters)]
#[setters(prefix = "with_", strip_option)]
pub struct ConfigOverrides {
    /// Catalog base URL.
    pub api_url: Option<String>,
    /// Record endpoint addressing.
    pub record_style: Option<RecordStyle>,
    /// Hint language.
    pub locale: Option<HintLocale>,
    /// Candidate handling when a record fetch fails.
    pub fetch_failure: Option<FetchFailurePolicy>,
    /// RNG seed.
    pub seed: Option<u64>,
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
