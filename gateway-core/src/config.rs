//! Configuration for the admission gateway

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::limits::AnonymousUserRestrictions;
use crate::types::AccountAddress;

/// Gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Account allowed to submit administrative operations
    pub bank_master_address: AccountAddress,

    /// How long after settlement a payment stays reversible (seconds)
    pub reversal_period_secs: i64,

    /// Ceilings for anonymous accounts moving anonymous assets
    pub anonymous: AnonymousUserRestrictions,

    /// Fast statistics store configuration
    pub statistics_store: StatisticsStoreConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            service_name: "admission-gateway".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            bank_master_address: AccountAddress::new("BANK0000000000000001"),
            reversal_period_secs: 86_400, // 24 hours
            anonymous: AnonymousUserRestrictions::default(),
            statistics_store: StatisticsStoreConfig::default(),
        }
    }
}

/// Fast statistics store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticsStoreConfig {
    /// Redis connection URL
    pub redis_url: String,
}

impl Default for StatisticsStoreConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
        }
    }
}

impl GatewayConfig {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        let config: GatewayConfig = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        debug!(
            path = %path.as_ref().display(),
            bank_master = %config.bank_master_address,
            "configuration loaded from file"
        );
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = GatewayConfig::default();

        if let Ok(address) = std::env::var("GATEWAY_BANK_MASTER") {
            config.bank_master_address = AccountAddress::new(address);
        }

        if let Ok(secs) = std::env::var("GATEWAY_REVERSAL_PERIOD_SECS") {
            config.reversal_period_secs = secs.parse().map_err(|e| {
                crate::Error::Config(format!("Invalid GATEWAY_REVERSAL_PERIOD_SECS: {}", e))
            })?;
        }

        if let Ok(url) = std::env::var("GATEWAY_STATISTICS_REDIS_URL") {
            config.statistics_store.redis_url = url;
        }

        debug!(
            bank_master = %config.bank_master_address,
            reversal_period_secs = config.reversal_period_secs,
            "configuration loaded from environment"
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.service_name, "admission-gateway");
        assert_eq!(config.reversal_period_secs, 86_400);
        assert!(config.anonymous.max_balance > 0);
    }

    #[test]
    fn test_parse_from_toml() {
        let toml = r#"
            service_name = "admission-gateway"
            service_version = "0.1.0"
            bank_master_address = "BANK0000000000000001"
            reversal_period_secs = 3600

            [anonymous]
            max_balance = 1000
            max_daily_outcome = 100
            max_monthly_outcome = 500
            max_annual_outcome = 2000
            max_annual_income = 4000

            [statistics_store]
            redis_url = "redis://cache:6379"
        "#;
        let config: GatewayConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.reversal_period_secs, 3600);
        assert_eq!(config.anonymous.max_balance, 1000);
        assert_eq!(config.statistics_store.redis_url, "redis://cache:6379");
    }
}
