//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Paycheck planning limits.
    #[serde(default)]
    pub planning: PlanningConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT settings as read from configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for verifying tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    900 // 15 minutes
}

/// Bounds applied to planning reads and materialization.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct PlanningConfig {
    /// Largest accepted `lookahead_months` value.
    #[serde(default = "default_max_lookahead_months")]
    pub max_lookahead_months: u32,
    /// Lookahead used when a request does not specify one.
    #[serde(default)]
    pub default_lookahead_months: u32,
}

fn default_max_lookahead_months() -> u32 {
    12
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            max_lookahead_months: default_max_lookahead_months(),
            default_lookahead_months: 0,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("PAYPLAN").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planning_config_defaults() {
        let config = PlanningConfig::default();
        assert_eq!(config.max_lookahead_months, 12);
        assert_eq!(config.default_lookahead_months, 0);
    }

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("PAYPLAN__DATABASE__URL", Some("postgres://localhost/payplan")),
                ("PAYPLAN__JWT__SECRET", Some("secret")),
                ("PAYPLAN__SERVER__PORT", Some("9090")),
                ("PAYPLAN__PLANNING__MAX_LOOKAHEAD_MONTHS", Some("6")),
                ("RUN_MODE", Some("test-does-not-exist")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/payplan");
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.server.port, 9090);
                assert_eq!(config.server.host, "0.0.0.0");
                assert_eq!(config.jwt.access_token_expiry_secs, 900);
                assert_eq!(config.planning.max_lookahead_months, 6);
                assert_eq!(config.planning.default_lookahead_months, 0);
            },
        );
    }

    #[test]
    fn test_load_fails_without_database_url() {
        temp_env::with_vars(
            [
                ("PAYPLAN__DATABASE__URL", None::<&str>),
                ("PAYPLAN__JWT__SECRET", Some("secret")),
                ("RUN_MODE", Some("test-does-not-exist")),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }
}
