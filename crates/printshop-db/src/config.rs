//! Shop configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | Variable                         | Default                           |
//! |----------------------------------|-----------------------------------|
//! | `PRINTSHOP_DB_PATH`              | `./printshop.db`                  |
//! | `PRINTSHOP_DB_MAX_CONNECTIONS`   | `5`                               |
//! | `PRINTSHOP_CUSTOMIZATION_CHARGE` | `1.00`                            |
//! | `PRINTSHOP_LOG`                  | `info,printshop=debug,sqlx=warn`  |

use std::env;
use std::path::PathBuf;

use printshop_core::validation::validate_price;
use printshop_core::{Money, PricingPolicy};
use serde::{Deserialize, Serialize};

use crate::pool::DbConfig;

/// Default tracing filter directive.
pub const DEFAULT_LOG_FILTER: &str = "info,printshop=debug,sqlx=warn";

/// Shop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub max_connections: u32,

    /// Flat charge per populated option on attribute-priced products
    pub customization_charge: Money,

    /// `tracing_subscriber::EnvFilter` directive
    pub log_filter: String,
}

impl Default for ShopConfig {
    fn default() -> Self {
        ShopConfig {
            database_path: PathBuf::from("./printshop.db"),
            max_connections: 5,
            customization_charge: PricingPolicy::default().customization_charge,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl ShopConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = ShopConfig::default();

        let config = ShopConfig {
            database_path: lookup("PRINTSHOP_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),

            max_connections: match lookup("PRINTSHOP_DB_MAX_CONNECTIONS") {
                Some(raw) => raw.trim().parse().map_err(|_| {
                    ConfigError::InvalidValue("PRINTSHOP_DB_MAX_CONNECTIONS".to_string())
                })?,
                None => defaults.max_connections,
            },

            customization_charge: match lookup("PRINTSHOP_CUSTOMIZATION_CHARGE") {
                Some(raw) => raw.trim().parse().map_err(|_| {
                    ConfigError::InvalidValue("PRINTSHOP_CUSTOMIZATION_CHARGE".to_string())
                })?,
                None => defaults.customization_charge,
            },

            log_filter: lookup("PRINTSHOP_LOG").unwrap_or(defaults.log_filter),
        };

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "PRINTSHOP_DB_MAX_CONNECTIONS".to_string(),
            ));
        }
        if validate_price("customization_charge", config.customization_charge).is_err() {
            return Err(ConfigError::InvalidValue(
                "PRINTSHOP_CUSTOMIZATION_CHARGE".to_string(),
            ));
        }

        Ok(config)
    }

    /// Pool configuration for [`crate::Database::new`].
    pub fn to_db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path).max_connections(self.max_connections)
    }

    /// Pricing policy handed to order placement and cart quotes.
    pub fn pricing_policy(&self) -> PricingPolicy {
        PricingPolicy {
            customization_charge: self.customization_charge,
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ShopConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.customization_charge, Money::from_cents(100));
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_overrides() {
        let config = ShopConfig::from_lookup(lookup_from(&[
            ("PRINTSHOP_DB_PATH", "/tmp/shop.db"),
            ("PRINTSHOP_DB_MAX_CONNECTIONS", "8"),
            ("PRINTSHOP_CUSTOMIZATION_CHARGE", "2.50"),
        ]))
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/shop.db"));
        assert_eq!(config.to_db_config().max_connections, 8);
        assert_eq!(
            config.pricing_policy().customization_charge,
            Money::from_cents(250)
        );
    }

    #[test]
    fn test_invalid_values() {
        for (key, value) in [
            ("PRINTSHOP_DB_MAX_CONNECTIONS", "many"),
            ("PRINTSHOP_DB_MAX_CONNECTIONS", "0"),
            ("PRINTSHOP_CUSTOMIZATION_CHARGE", "one euro"),
            ("PRINTSHOP_CUSTOMIZATION_CHARGE", "-1"),
            ("PRINTSHOP_CUSTOMIZATION_CHARGE", "99999999999"),
        ] {
            let err = ShopConfig::from_lookup(lookup_from(&[(key, value)])).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue(k) if k == key));
        }
    }
}
