//! Process-wide sizing defaults shared by container configurations.

use super::{parse_env_var, Config, ValidationError};
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Sizing defaults consumed by the container `*Config::from_settings` constructors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionSettings {
    /// Initial slot count for arrays, deques and priority queues
    pub default_capacity: usize,
    /// Array and priority queue growth multiplier
    pub growth_factor: f32,
    /// Initial bucket count for hash tables
    pub hash_capacity: usize,
    /// Hash table fill ratio that triggers a rehash
    pub load_factor: f32,
    /// Seed passed to hash callbacks
    pub hash_seed: u32,
}

impl CollectionSettings {
    /// Default initial capacity
    pub const DEFAULT_CAPACITY: usize = 8;
    /// Default growth multiplier
    pub const DEFAULT_GROWTH_FACTOR: f32 = 2.0;
    /// Default bucket count
    pub const DEFAULT_HASH_CAPACITY: usize = 16;
    /// Default load factor
    pub const DEFAULT_LOAD_FACTOR: f32 = 0.75;
}

impl Default for CollectionSettings {
    fn default() -> Self {
        Self {
            default_capacity: Self::DEFAULT_CAPACITY,
            growth_factor: Self::DEFAULT_GROWTH_FACTOR,
            hash_capacity: Self::DEFAULT_HASH_CAPACITY,
            load_factor: Self::DEFAULT_LOAD_FACTOR,
            hash_seed: 0,
        }
    }
}

impl Config for CollectionSettings {
    fn validate(&self) -> Result<()> {
        if self.default_capacity == 0 {
            return Err(ValidationError::new("default_capacity", 0, "must be greater than 0").into());
        }
        if !self.growth_factor.is_finite() || self.growth_factor <= 1.0 {
            return Err(ValidationError::new(
                "growth_factor",
                self.growth_factor,
                "must be a finite value greater than 1",
            )
            .with_suggestion("1.5 or 2.0")
            .into());
        }
        if self.hash_capacity == 0 {
            return Err(ValidationError::new("hash_capacity", 0, "must be greater than 0").into());
        }
        if !self.load_factor.is_finite() || self.load_factor <= 0.0 {
            return Err(ValidationError::new(
                "load_factor",
                self.load_factor,
                "must be a finite positive value",
            )
            .with_suggestion("0.5..=1.0")
            .into());
        }
        Ok(())
    }

    fn from_env_with_prefix(prefix: &str) -> Result<Self> {
        let mut config = Self::default();
        config.default_capacity = parse_env_var(
            &format!("{}DEFAULT_CAPACITY", prefix),
            config.default_capacity,
        );
        config.growth_factor =
            parse_env_var(&format!("{}GROWTH_FACTOR", prefix), config.growth_factor);
        config.hash_capacity =
            parse_env_var(&format!("{}HASH_CAPACITY", prefix), config.hash_capacity);
        config.load_factor = parse_env_var(&format!("{}LOAD_FACTOR", prefix), config.load_factor);
        config.hash_seed = parse_env_var(&format!("{}HASH_SEED", prefix), config.hash_seed);
        config.validate()?;
        Ok(config)
    }

    fn performance_preset() -> Self {
        Self {
            default_capacity: 64,
            growth_factor: 2.0,
            hash_capacity: 256,
            load_factor: 0.75,
            hash_seed: 0,
        }
    }

    fn memory_preset() -> Self {
        Self {
            default_capacity: 4,
            growth_factor: 1.5,
            hash_capacity: 8,
            load_factor: 0.9,
            hash_seed: 0,
        }
    }

    fn realtime_preset() -> Self {
        Self {
            default_capacity: 32,
            growth_factor: 2.0,
            hash_capacity: 128,
            load_factor: 0.5,
            hash_seed: 0,
        }
    }
}
