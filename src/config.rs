use std::time::Duration;

use crate::error::{Error, Result};

pub const CACHE_CAPACITY_VAR: &str = "RINGKV_CACHE_CAPACITY";
pub const CACHE_TTL_MS_VAR: &str = "RINGKV_CACHE_TTL_MS";

pub const DEFAULT_CACHE_CAPACITY: usize = 3;
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub cache_capacity: usize,
    pub cache_ttl: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

impl StoreConfig {
    pub fn new(cache_capacity: usize, cache_ttl: Duration) -> Result<Self> {
        let config = StoreConfig {
            cache_capacity,
            cache_ttl,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reads overrides from the environment; unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = StoreConfig::default();

        if let Some(raw) = lookup(CACHE_CAPACITY_VAR) {
            config.cache_capacity = raw.trim().parse().map_err(|_| {
                Error::Parse(format!("{} must be an integer, got {:?}", CACHE_CAPACITY_VAR, raw))
            })?;
        }
        if let Some(raw) = lookup(CACHE_TTL_MS_VAR) {
            let ms: u64 = raw.trim().parse().map_err(|_| {
                Error::Parse(format!("{} must be milliseconds, got {:?}", CACHE_TTL_MS_VAR, raw))
            })?;
            config.cache_ttl = Duration::from_millis(ms);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cache_capacity == 0 {
            return Err(Error::Config("cache capacity must be greater than 0".into()));
        }
        if self.cache_ttl.is_zero() {
            return Err(Error::Config("cache ttl must be greater than 0".into()));
        }
        Ok(())
    }
}
