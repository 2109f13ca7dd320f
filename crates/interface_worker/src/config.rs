//! Worker configuration

use serde::Deserialize;

/// Worker configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    /// NATS server URL
    pub nats_url: String,
    /// JetStream stream holding job requests
    pub stream_name: String,
    /// Subject jobs are published to
    pub subject: String,
    /// Durable consumer name
    pub consumer_name: String,
    /// Subject failure reports are published to
    pub failure_subject: String,
    /// Database URL
    pub database_url: String,
    /// Log level
    pub log_level: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            nats_url: "nats://127.0.0.1:4222".to_string(),
            stream_name: "SYNC_JOBS".to_string(),
            subject: "sync.jobs".to_string(),
            consumer_name: "sync_worker".to_string(),
            failure_subject: "sync.failures".to_string(),
            database_url: "postgres://localhost/campaign_sync".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl WorkerConfig {
    /// Loads configuration from environment variables prefixed `WORKER_`
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("WORKER"))
            .build()?
            .try_deserialize()
    }
}
