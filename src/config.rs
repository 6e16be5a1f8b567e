//! Configuration management for `samenmeten`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::SamenMetenError;
use anyhow::{Context, Result};
use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamenMetenConfig {
    /// SensorThings API settings
    #[serde(default)]
    pub api: ApiConfig,
    /// How the Locations → Things → Datastreams walk behaves
    #[serde(default)]
    pub traversal: TraversalConfig,
    /// Presentation settings
    #[serde(default)]
    pub display: DisplayConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// SensorThings API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the API, without trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u32,
    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Upper bound on next-link hops for one collection
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
}

/// Whether association links are followed for their first member only or in full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationMode {
    /// First Thing per Location and the first page of its Datastreams
    FirstOnly,
    /// Every Thing and every page of Datastreams
    Paginated,
}

/// Traversal configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraversalConfig {
    #[serde(default = "default_association_mode")]
    pub association_mode: AssociationMode,
    /// Fetch the unit of measurement of each datastream (one extra request each)
    #[serde(default = "default_fetch_units")]
    pub fetch_units: bool,
    /// Datastreams of one Thing processed at once; 1 means strictly sequential
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,
    /// Stop after this many Locations
    #[serde(default)]
    pub max_locations: Option<u32>,
}

/// Display configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// IANA time zone observation timestamps are shown in
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_base_url() -> String {
    "https://api-samenmeten.rivm.nl/v1.0".to_string()
}

fn default_timeout() -> u32 {
    30
}

fn default_user_agent() -> String {
    concat!("samenmeten/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_max_pages() -> u32 {
    10_000
}

fn default_association_mode() -> AssociationMode {
    AssociationMode::Paginated
}

fn default_fetch_units() -> bool {
    true
}

fn default_concurrency() -> u32 {
    1
}

fn default_timezone() -> String {
    "Europe/Amsterdam".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
            max_pages: default_max_pages(),
        }
    }
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            association_mode: default_association_mode(),
            fetch_units: default_fetch_units(),
            concurrency: default_concurrency(),
            max_locations: None,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for SamenMetenConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            traversal: TraversalConfig::default(),
            display: DisplayConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl DisplayConfig {
    /// Parsed time zone; call after `validate`
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| SamenMetenError::config(format!("Unknown time zone '{}': {e}", self.timezone)).into())
    }
}

impl SamenMetenConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut config = Self::read_from_path(config_path)?;
        config.apply_defaults();
        config.validate()?;
        Ok(config)
    }

    /// File and environment values as written, before defaults and validation.
    /// Callers layering further overrides validate afterwards.
    pub fn read_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let explicit = config_path.is_some();
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("samenmeten.toml"))
        });

        if explicit && !config_file.exists() {
            return Err(SamenMetenError::config(format!(
                "Config file not found: {}",
                config_file.display()
            ))
            .into());
        }

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // SAMENMETEN_API__BASE_URL, SAMENMETEN_TRAVERSAL__CONCURRENCY, ...
        builder = builder.add_source(
            Environment::with_prefix("SAMENMETEN")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("samenmeten").join("config.toml"))
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.api.base_url.is_empty() {
            self.api.base_url = default_base_url();
        }
        self.api.base_url = self.api.base_url.trim_end_matches('/').to_string();
        if self.api.timeout_seconds == 0 {
            self.api.timeout_seconds = default_timeout();
        }
        if self.api.user_agent.is_empty() {
            self.api.user_agent = default_user_agent();
        }
        if self.api.max_pages == 0 {
            self.api.max_pages = default_max_pages();
        }
        if self.traversal.concurrency == 0 {
            self.traversal.concurrency = default_concurrency();
        }
        if self.display.timezone.is_empty() {
            self.display.timezone = default_timezone();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.api.timeout_seconds > 300 {
            return Err(SamenMetenError::config("API timeout cannot exceed 300 seconds").into());
        }

        if !(1..=32).contains(&self.traversal.concurrency) {
            return Err(
                SamenMetenError::config("Traversal concurrency must be between 1 and 32").into(),
            );
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(SamenMetenError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(SamenMetenError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://")
        {
            return Err(
                SamenMetenError::config("API base URL must be a valid HTTP or HTTPS URL").into(),
            );
        }

        self.display.tz()?;

        Ok(())
    }
}
