use clap::{Args, Parser, ValueEnum};

#[derive(Clone, Debug, Default, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    #[command(flatten)]
    pub server: ServerConfig,

    #[command(flatten)]
    pub storage: StorageConfig,

    #[command(flatten)]
    pub database: DatabaseConfig,

    #[command(flatten)]
    pub api: ApiConfig,

    #[command(flatten)]
    pub telemetry: TelemetryConfig,
}

impl Config {
    #[must_use]
    pub fn load() -> Self {
        Self::parse()
    }
}

#[derive(Clone, Debug, Args)]
pub struct ServerConfig {
    /// Host to listen on
    #[arg(long, env = "EXERCISE_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port for the public API
    #[arg(long, env = "EXERCISE_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Port for the management endpoints (health probes)
    #[arg(long, env = "EXERCISE_MGMT_PORT", default_value_t = 9090)]
    pub mgmt_port: u16,

    /// Seconds to let in-flight requests drain after a shutdown signal
    #[arg(long, env = "EXERCISE_SHUTDOWN_TIMEOUT_SECS", default_value_t = 5)]
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 3000, mgmt_port: 9090, shutdown_timeout_secs: 5 }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum StorageBackend {
    /// PostgreSQL via `EXERCISE_DATABASE_URL`
    #[default]
    Postgres,
    /// Process-local store, lost on restart
    Memory,
}

/// What the store does with an entry saved without a date.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum DefaultDatePolicy {
    /// Stamp the entry with the current UTC date
    #[default]
    Now,
    /// Keep the entry undated
    Unset,
}

#[derive(Clone, Debug, Default, Args)]
pub struct StorageConfig {
    /// Which record store to use
    #[arg(long = "storage", env = "EXERCISE_STORAGE", value_enum, default_value_t = StorageBackend::Postgres)]
    pub backend: StorageBackend,

    /// Date assigned to entries logged without one
    #[arg(long, env = "EXERCISE_DEFAULT_ENTRY_DATE", value_enum, default_value_t = DefaultDatePolicy::Now)]
    pub default_entry_date: DefaultDatePolicy,
}

#[derive(Clone, Debug, Args)]
pub struct DatabaseConfig {
    /// Database connection URL (required for the postgres store)
    #[arg(long = "database-url", env = "EXERCISE_DATABASE_URL")]
    pub url: Option<String>,

    /// Maximum number of pooled connections
    #[arg(long, env = "EXERCISE_DB_MAX_CONNECTIONS", default_value_t = 10)]
    pub max_connections: u32,

    /// Minimum number of idle connections kept open
    #[arg(long, env = "EXERCISE_DB_MIN_CONNECTIONS", default_value_t = 1)]
    pub min_connections: u32,

    /// Seconds to wait for a free connection
    #[arg(long, env = "EXERCISE_DB_ACQUIRE_TIMEOUT_SECS", default_value_t = 5)]
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { url: None, max_connections: 10, min_connections: 1, acquire_timeout_secs: 5 }
    }
}

#[derive(Clone, Debug, Default, Args)]
pub struct ApiConfig {
    /// Answer validation, duplicate and lookup failures with 200 instead of 4xx
    #[arg(long, env = "EXERCISE_LEGACY_STATUS_CODES", default_value_t = false)]
    pub legacy_status_codes: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, Default, Args)]
pub struct TelemetryConfig {
    /// Log output format
    #[arg(long, env = "EXERCISE_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// OTLP collector endpoint; export is disabled when unset
    #[arg(long, env = "EXERCISE_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}
