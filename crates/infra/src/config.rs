//! Configuration loading and representation.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use pitstop_core::Decimal;
use pitstop_core::money::DEFAULT_TAX_RATE;

pub const ENV_DATA_PATH: &str = "PITSTOP_DATA_PATH";
pub const ENV_TAX_RATE: &str = "PITSTOP_TAX_RATE";
pub const ENV_BIND_ADDR: &str = "PITSTOP_BIND_ADDR";

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("PITSTOP_TAX_RATE must be a decimal between 0 and 1 (got {0:?})")]
    InvalidTaxRate(String),

    #[error("PITSTOP_BIND_ADDR must be a socket address (got {0:?})")]
    InvalidBindAddr(String),
}

/// Shop runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopConfig {
    /// JSON document backing the record store. `None` keeps data in memory.
    pub data_path: Option<PathBuf>,
    /// Flat tax rate captured by new visits.
    pub tax_rate: Decimal,
    pub bind_addr: SocketAddr,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            tax_rate: DEFAULT_TAX_RATE,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
        }
    }
}

impl ShopConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, treating blank values as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_path = value(ENV_DATA_PATH).map(PathBuf::from);

        let tax_rate = match value(ENV_TAX_RATE) {
            Some(raw) => {
                let rate = Decimal::from_str(raw.trim())
                    .map_err(|_| ConfigError::InvalidTaxRate(raw.clone()))?;
                if rate < Decimal::ZERO || rate > Decimal::ONE {
                    return Err(ConfigError::InvalidTaxRate(raw));
                }
                rate
            }
            None => DEFAULT_TAX_RATE,
        };

        let bind_raw = value(ENV_BIND_ADDR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .trim()
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidBindAddr(bind_raw.clone()))?;

        Ok(Self {
            data_path,
            tax_rate,
            bind_addr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = ShopConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ShopConfig::default());
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
    }

    #[test]
    fn values_are_read_from_lookup() {
        let config = ShopConfig::from_lookup(lookup(&[
            (ENV_DATA_PATH, "/var/lib/pitstop/shop.json"),
            (ENV_TAX_RATE, "0.14"),
            (ENV_BIND_ADDR, "127.0.0.1:3000"),
        ]))
        .unwrap();
        assert_eq!(
            config.data_path,
            Some(PathBuf::from("/var/lib/pitstop/shop.json"))
        );
        assert_eq!(config.tax_rate, Decimal::new(14, 2));
        assert_eq!(config.bind_addr.port(), 3000);
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = ShopConfig::from_lookup(lookup(&[(ENV_DATA_PATH, "  ")])).unwrap();
        assert_eq!(config.data_path, None);
    }

    #[test]
    fn bad_values_are_rejected() {
        assert_eq!(
            ShopConfig::from_lookup(lookup(&[(ENV_TAX_RATE, "15%")])).unwrap_err(),
            ConfigError::InvalidTaxRate("15%".to_string())
        );
        assert_eq!(
            ShopConfig::from_lookup(lookup(&[(ENV_TAX_RATE, "1.5")])).unwrap_err(),
            ConfigError::InvalidTaxRate("1.5".to_string())
        );
        assert!(matches!(
            ShopConfig::from_lookup(lookup(&[(ENV_BIND_ADDR, "nowhere")])),
            Err(ConfigError::InvalidBindAddr(_))
        ));
    }
}
