use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use domain::services::AlertThresholds;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Grace period for background jobs on shutdown.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl DatabaseConfig {
    pub fn pool_config(&self) -> persistence::db::DatabaseConfig {
        persistence::db::DatabaseConfig {
            url: self.url.clone(),
            max_connections: self.max_connections,
            min_connections: self.min_connections,
            connect_timeout_secs: self.connect_timeout_secs,
            idle_timeout_secs: self.idle_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecurityConfig {
    /// Allowed CORS origins. Empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

/// Analytics engine settings.
///
/// The millisecond fields may also be written `cacheTtlMs` and
/// `broadcastIntervalMs`; see [`Config::load`].
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsConfig {
    /// Time-to-live of cached bundles.
    #[serde(default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: u64,

    /// Period of the realtime push feed.
    #[serde(default = "default_broadcast_interval_ms")]
    pub broadcast_interval_ms: u64,

    /// Frames buffered per subscriber before it is lagged.
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,

    /// Directory export artifacts are written to.
    #[serde(default = "default_reports_dir")]
    pub reports_dir: String,

    /// Days a generated report is kept; 0 keeps reports for the process lifetime.
    #[serde(default)]
    pub report_retention_days: u32,

    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: u64,

    #[serde(default = "default_revenue_drop_threshold")]
    pub revenue_drop_threshold_percent: f64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            cache_ttl_ms: default_cache_ttl_ms(),
            broadcast_interval_ms: default_broadcast_interval_ms(),
            broadcast_capacity: default_broadcast_capacity(),
            reports_dir: default_reports_dir(),
            report_retention_days: 0,
            low_stock_threshold: default_low_stock_threshold(),
            revenue_drop_threshold_percent: default_revenue_drop_threshold(),
        }
    }
}

impl AnalyticsConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    pub fn broadcast_interval(&self) -> Duration {
        Duration::from_millis(self.broadcast_interval_ms)
    }

    pub fn reports_dir(&self) -> PathBuf {
        PathBuf::from(&self.reports_dir)
    }

    pub fn alert_thresholds(&self) -> AlertThresholds {
        AlertThresholds {
            low_stock_threshold: self.low_stock_threshold,
            revenue_drop_threshold_percent: self.revenue_drop_threshold_percent,
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_shutdown_timeout() -> u64 {
    10
}
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    2
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_cache_ttl_ms() -> u64 {
    300_000
}
fn default_broadcast_interval_ms() -> u64 {
    5_000
}
fn default_broadcast_capacity() -> usize {
    16
}
fn default_reports_dir() -> String {
    "reports".to_string()
}
fn default_low_stock_threshold() -> u64 {
    5
}
fn default_revenue_drop_threshold() -> f64 {
    -20.0
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// camelCase spellings of analytics keys, as the loader stores them
/// (lowercased), with the key they stand for.
const ANALYTICS_KEY_ALIASES: &[(&str, &str)] = &[
    ("analytics.cachettlms", "analytics.cache_ttl_ms"),
    ("analytics.broadcastintervalms", "analytics.broadcast_interval_ms"),
];

type Builder = config::ConfigBuilder<config::builder::DefaultState>;

/// Builds the merged configuration, folding camelCase analytics keys onto
/// their snake_case fields. A camelCase value wins over the snake_case one.
fn build_with_aliases(builder: Builder) -> Result<config::Config, config::ConfigError> {
    let merged = builder.clone().build()?;

    let mut builder = builder;
    for (alias, canonical) in ANALYTICS_KEY_ALIASES {
        if let Ok(value) = merged.get::<i64>(alias) {
            builder = builder.set_override(*canonical, value)?;
        }
    }
    builder.build()
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with SA__ prefix
    ///
    /// `analytics.cacheTtlMs` and `analytics.broadcastIntervalMs` are accepted
    /// in any source.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = build_with_aliases(
            config::Config::builder()
                .add_source(config::File::with_name("config/default"))
                .add_source(config::File::with_name("config/local").required(false))
                .add_source(config::Environment::with_prefix("SA").separator("__")),
        )?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// Defaults are embedded so tests do not depend on the working directory.
    /// Validation is skipped to allow partial configs.
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "127.0.0.1"
            port = 8080
            request_timeout_secs = 30
            shutdown_timeout_secs = 2

            [database]
            url = ""
            max_connections = 5
            min_connections = 1
            connect_timeout_secs = 10
            idle_timeout_secs = 600

            [logging]
            level = "debug"
            format = "pretty"

            [security]
            cors_origins = []

            [analytics]
            cache_ttl_ms = 300000
            broadcast_interval_ms = 5000
            broadcast_capacity = 16
            reports_dir = "target/test-reports"
            report_retention_days = 0
            low_stock_threshold = 5
            revenue_drop_threshold_percent = -20.0
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        build_with_aliases(builder)?.try_deserialize()
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "SA__DATABASE__URL environment variable must be set".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        if self.analytics.broadcast_interval_ms == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "analytics.broadcast_interval_ms must be greater than 0".to_string(),
            ));
        }

        if self.analytics.broadcast_capacity == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "analytics.broadcast_capacity must be greater than 0".to_string(),
            ));
        }

        if self.analytics.reports_dir.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "analytics.reports_dir must be set".to_string(),
            ));
        }

        if !self.analytics.revenue_drop_threshold_percent.is_finite()
            || self.analytics.revenue_drop_threshold_percent > 0.0
        {
            return Err(ConfigValidationError::InvalidValue(
                "analytics.revenue_drop_threshold_percent must be a non-positive number"
                    .to_string(),
            ));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}
