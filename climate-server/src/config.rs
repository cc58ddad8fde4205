//! Server configuration from environment variables.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::cache::CacheConfig;
use crate::noaa::NoaaConfig;

const DEFAULT_BIND_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 8080);

/// Errors reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name}={value:?} is not valid: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Everything the binary needs to start.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub noaa: NoaaConfig,
    pub cache: CacheConfig,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to
    /// its value. Unset and empty variables fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bind_addr: SocketAddr = match get("CLIMATE_BIND_ADDR") {
            Some(value) => parse("CLIMATE_BIND_ADDR", value)?,
            None => DEFAULT_BIND_ADDR,
        };

        let mut noaa = NoaaConfig::new();
        if let Some(url) = get("NOAA_BASE_URL") {
            noaa = noaa.with_base_url(url);
        }
        if let Some(value) = get("NOAA_TIMEOUT_SECS") {
            noaa = noaa.with_timeout(parse_positive("NOAA_TIMEOUT_SECS", value)?);
        }

        let mut cache = CacheConfig::new();
        if let Some(value) = get("CACHE_TTL_SECS") {
            let secs: u64 = parse("CACHE_TTL_SECS", value)?;
            cache = cache.with_ttl(Duration::from_secs(secs));
        }
        if let Some(value) = get("CACHE_MAX_ENTRIES") {
            let max = parse_positive("CACHE_MAX_ENTRIES", value)?;
            cache = cache.with_max_entries(max as usize);
        }

        Ok(Self {
            bind_addr,
            noaa,
            cache,
        })
    }
}

fn parse<T>(name: &'static str, value: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        reason: e.to_string(),
        value,
    })
}

fn parse_positive(name: &'static str, value: String) -> Result<u64, ConfigError> {
    let parsed: u64 = parse(name, value.clone())?;
    if parsed == 0 {
        return Err(ConfigError::Invalid {
            name,
            value,
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config(&[]).unwrap();
        assert_eq!(config.bind_addr, SocketAddr::from(([0, 0, 0, 0], 8080)));
        assert_eq!(config.noaa.base_url, "https://noaa-ghcn-pds.s3.amazonaws.com");
        assert_eq!(config.noaa.timeout_secs, 30);
        assert_eq!(config.cache.ttl, Duration::from_secs(3600));
        assert_eq!(config.cache.max_entries, None);
    }

    #[test]
    fn reads_every_variable() {
        let config = config(&[
            ("CLIMATE_BIND_ADDR", "127.0.0.1:9000"),
            ("NOAA_BASE_URL", "http://mirror.local/"),
            ("NOAA_TIMEOUT_SECS", "5"),
            ("CACHE_TTL_SECS", "60"),
            ("CACHE_MAX_ENTRIES", "100"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr, SocketAddr::from(([127, 0, 0, 1], 9000)));
        assert_eq!(config.noaa.base_url, "http://mirror.local");
        assert_eq!(config.noaa.timeout_secs, 5);
        assert_eq!(config.cache.ttl, Duration::from_secs(60));
        assert_eq!(config.cache.max_entries, Some(100));
    }

    #[test]
    fn empty_values_use_defaults() {
        let config = config(&[("NOAA_TIMEOUT_SECS", ""), ("CACHE_TTL_SECS", "  ")]).unwrap();
        assert_eq!(config.noaa.timeout_secs, 30);
        assert_eq!(config.cache.ttl, Duration::from_secs(3600));
    }

    #[test]
    fn zero_ttl_is_allowed() {
        let config = config(&[("CACHE_TTL_SECS", "0")]).unwrap();
        assert_eq!(config.cache.ttl, Duration::ZERO);
    }

    #[test]
    fn invalid_number_names_the_variable() {
        let err = config(&[("CACHE_TTL_SECS", "an hour")]).unwrap_err();
        let ConfigError::Invalid { name, value, .. } = &err;
        assert_eq!(*name, "CACHE_TTL_SECS");
        assert_eq!(value, "an hour");
        assert!(err.to_string().starts_with("CACHE_TTL_SECS=\"an hour\""));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = config(&[("NOAA_TIMEOUT_SECS", "0")]).unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    fn invalid_bind_addr_is_rejected() {
        let err = config(&[("CLIMATE_BIND_ADDR", "localhost")]).unwrap_err();
        assert!(err.to_string().starts_with("CLIMATE_BIND_ADDR"));
    }
}
