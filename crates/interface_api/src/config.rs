//! API configuration

use serde::Deserialize;

use core_kernel::Timezone;

/// API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database URL
    pub database_url: String,
    /// Log level
    pub log_level: String,
    /// IANA timezone the billing calendar runs in
    pub billing_timezone: String,
    /// Whether the monthly scheduler task is spawned
    pub scheduler_enabled: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: "postgres://localhost/homecrew_billing".to_string(),
            log_level: "info".to_string(),
            billing_timezone: "Asia/Kolkata".to_string(),
            scheduler_enabled: true,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parses the configured billing timezone
    pub fn timezone(&self) -> Result<Timezone, config::ConfigError> {
        self.billing_timezone.parse().map_err(|_| {
            config::ConfigError::Message(format!(
                "invalid billing_timezone '{}'",
                self.billing_timezone
            ))
        })
    }
}
