use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub collector: CollectorConfig,
    #[serde(default)]
    pub nfsclient: NfsClientConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectorConfig {
    /// How often mountstats is scanned.
    pub interval_ms: u64,
    /// How often to log collector stats (cycles ok/failed, last metric count) at INFO level.
    #[serde(default = "default_stats_log_interval_secs")]
    pub stats_log_interval_secs: u64,
    /// Max number of snapshots kept in the broadcast channel for /ws/metrics (slow clients may lag).
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,
}

fn default_stats_log_interval_secs() -> u64 {
    60
}

fn default_broadcast_capacity() -> usize {
    16
}

/// What to collect from mountstats. Everything is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NfsClientConfig {
    /// Also emit events, bytes, xprt and per-operation metrics.
    pub fullstat: bool,
    /// Regexes; a mount must match one of these (empty = all mounts).
    pub include_mounts: Vec<String>,
    /// Regexes; a mount matching any of these is skipped.
    pub exclude_mounts: Vec<String>,
    /// Operation names tracked for both NFSv3 and NFSv4 (empty = all known).
    pub include_operations: Vec<String>,
    pub exclude_operations: Vec<String>,
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
        anyhow::ensure!(!self.server.host.is_empty(), "server.host must be non-empty");
        anyhow::ensure!(
            self.collector.interval_ms > 0,
            "collector.interval_ms must be > 0, got {}",
            self.collector.interval_ms
        );
        anyhow::ensure!(
            self.collector.stats_log_interval_secs > 0,
            "collector.stats_log_interval_secs must be > 0, got {}",
            self.collector.stats_log_interval_secs
        );
        anyhow::ensure!(
            self.collector.broadcast_capacity > 0,
            "collector.broadcast_capacity must be > 0, got {}",
            self.collector.broadcast_capacity
        );
        Ok(())
    }
}
