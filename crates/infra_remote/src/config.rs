//! Remote gateway configuration

use serde::Deserialize;

/// Remote platform configuration
///
/// One credential set covers all three services; the platform issues
/// session tokens per service endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the campaign management service
    pub campaign_url: String,
    /// Base URL of the member management service
    pub member_url: String,
    /// Base URL of the transactional notification service
    pub notification_url: String,
    /// Account login
    pub login: String,
    /// Account password
    pub password: String,
    /// API key issued for the account
    pub api_key: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            campaign_url: "http://localhost:9090/apiccmd".to_string(),
            member_url: "http://localhost:9090/apimember".to_string(),
            notification_url: "http://localhost:9090/NMS".to_string(),
            login: "change-me".to_string(),
            password: "change-me".to_string(),
            api_key: "change-me".to_string(),
            timeout_secs: 30,
        }
    }
}

impl RemoteConfig {
    /// Loads configuration from environment variables prefixed `REMOTE_`
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("REMOTE"))
            .build()?
            .try_deserialize()
    }
}
