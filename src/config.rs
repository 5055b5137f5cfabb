use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub sensor: SensorConfig,
    pub security: SecurityConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub max_pool_size: u32,
    /// Readings buffered in the worker before a batch insert.
    pub flush_rate: u64,
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

fn default_retention_days() -> u32 {
    7
}

#[derive(Debug, Clone, Deserialize)]
pub struct SensorConfig {
    pub sample_interval_ms: u64,
    /// Use the simulated SCD40 source. The only supported source in this build.
    #[serde(default = "default_simulate")]
    pub simulate: bool,
}

fn default_simulate() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,
    #[serde(default = "default_rate_limit_enabled")]
    pub rate_limit_enabled: bool,
    /// Max rows a /data query may return (count parameter upper bound).
    #[serde(default = "default_max_query_results")]
    pub max_query_results: u32,
    /// Max start..end span accepted by /data/range and /data/aggregates.
    #[serde(default = "default_max_range_hours")]
    pub max_range_hours: i64,
}

fn default_requests_per_minute() -> u32 {
    60
}

fn default_rate_limit_enabled() -> bool {
    true
}

fn default_max_query_results() -> u32 {
    10_000
}

fn default_max_range_hours() -> i64 {
    24 * 7
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    /// How often to log app stats (readings saved/pruned) at INFO level.
    pub stats_log_interval_secs: u64,
    pub prune_interval_secs: u64,
    /// Worker flushes its buffer at least this often even below flush_rate.
    pub flush_interval_secs: u64,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.database.path.is_empty(),
            "database.path must be non-empty"
        );
        anyhow::ensure!(
            self.database.max_pool_size > 0,
            "database.max_pool_size must be > 0, got {}",
            self.database.max_pool_size
        );
        anyhow::ensure!(
            self.database.flush_rate > 0,
            "database.flush_rate must be > 0, got {}",
            self.database.flush_rate
        );
        anyhow::ensure!(
            self.database.retention_days > 0,
            "database.retention_days must be > 0, got {}",
            self.database.retention_days
        );
        anyhow::ensure!(
            self.sensor.sample_interval_ms > 0,
            "sensor.sample_interval_ms must be > 0, got {}",
            self.sensor.sample_interval_ms
        );
        anyhow::ensure!(
            self.security.requests_per_minute > 0,
            "security.requests_per_minute must be > 0, got {}",
            self.security.requests_per_minute
        );
        anyhow::ensure!(
            self.security.max_query_results > 0,
            "security.max_query_results must be > 0, got {}",
            self.security.max_query_results
        );
        anyhow::ensure!(
            self.security.max_range_hours > 0,
            "security.max_range_hours must be > 0, got {}",
            self.security.max_range_hours
        );
        anyhow::ensure!(
            self.monitoring.stats_log_interval_secs > 0,
            "monitoring.stats_log_interval_secs must be > 0, got {}",
            self.monitoring.stats_log_interval_secs
        );
        anyhow::ensure!(
            self.monitoring.prune_interval_secs > 0,
            "monitoring.prune_interval_secs must be > 0, got {}",
            self.monitoring.prune_interval_secs
        );
        anyhow::ensure!(
            self.monitoring.flush_interval_secs > 0,
            "monitoring.flush_interval_secs must be > 0, got {}",
            self.monitoring.flush_interval_secs
        );
        Ok(())
    }
}
