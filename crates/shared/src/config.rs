//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Budget gate configuration.
    #[serde(default)]
    pub budget: BudgetConfig,
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

/// Budget gate configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BudgetConfig {
    /// What to do when a requisition line projects over budget.
    #[serde(default)]
    pub policy: BudgetPolicy,
    /// Stock report cache time-to-live in seconds.
    #[serde(default = "default_report_cache_ttl")]
    pub report_cache_ttl_secs: u64,
}

fn default_report_cache_ttl() -> u64 {
    300 // 5 minutes
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            policy: BudgetPolicy::default(),
            report_cache_ttl_secs: default_report_cache_ttl(),
        }
    }
}

/// Policy applied when a requisition line would exceed its budget.
///
/// Over-budget handling is a site-level decision, not an invariant: some
/// sites block the line outright, others record it and let the requester
/// proceed with a warning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPolicy {
    /// Accept the line and surface a warning to the caller.
    #[default]
    Warn,
    /// Reject the line with a validation error.
    Block,
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
            .add_source(config::Environment::with_prefix("ACOPIO").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_policy_default_is_warn() {
        assert_eq!(BudgetPolicy::default(), BudgetPolicy::Warn);
    }

    #[test]
    fn test_budget_config_defaults() {
        let cfg = BudgetConfig::default();
        assert_eq!(cfg.policy, BudgetPolicy::Warn);
        assert_eq!(cfg.report_cache_ttl_secs, 300);
    }
}
