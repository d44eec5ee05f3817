//! Configuration APIs for nut-collections
//!
//! Containers are configured through per-type `*Config` structs that carry
//! the allocator, comparator and sizing knobs a container captures at
//! construction. Process-wide sizing defaults live in [`CollectionSettings`],
//! which can be read from the environment and fed into any container config
//! through its `from_settings` constructor.
//!
//! Settings types implement [`Config`]. An invalid field is reported as a
//! [`ValidationError`], which converts into `NutError::Configuration`.
//!
//! # Loading from the environment
//!
//! ```rust
//! use nut_collections::config::{CollectionSettings, Config};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Reads NUT_DEFAULT_CAPACITY, NUT_GROWTH_FACTOR, NUT_HASH_CAPACITY, ...
//! let settings = CollectionSettings::from_env()?;
//!
//! // Custom prefix
//! let settings = CollectionSettings::from_env_with_prefix("MYAPP_")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Presets
//!
//! ```rust
//! use nut_collections::config::{CollectionSettings, Config};
//!
//! let small = CollectionSettings::memory_preset();
//! let fast = CollectionSettings::performance_preset();
//! assert!(small.default_capacity < fast.default_capacity);
//! ```

use crate::error::{NutError, Result};
use std::env;
use std::fmt;

pub mod collections;

pub use collections::CollectionSettings;

/// Settings types that can be validated, loaded from the environment and
/// built from named presets
pub trait Config: Clone + fmt::Debug {
    /// Reject out-of-range fields with `Configuration`
    fn validate(&self) -> Result<()>;

    /// Load from `NUT_`-prefixed environment variables
    ///
    /// Environment variables use the format `NUT_{FIELD}`, for example
    /// `NUT_DEFAULT_CAPACITY=32`.
    fn from_env() -> Result<Self>
    where
        Self: Default,
    {
        Self::from_env_with_prefix("NUT_")
    }

    /// Load from environment variables named `{prefix}{FIELD}`
    ///
    /// Unset or unparsable variables keep their default value; the result is
    /// validated before it is returned.
    fn from_env_with_prefix(prefix: &str) -> Result<Self>
    where
        Self: Default;

    /// Preset favouring throughput over footprint.
    fn performance_preset() -> Self;

    /// Preset favouring a small footprint.
    fn memory_preset() -> Self;

    /// Preset favouring predictable latency (fewer growth events).
    fn realtime_preset() -> Self;

    /// Balanced preset; the defaults.
    fn balanced_preset() -> Self
    where
        Self: Default,
    {
        Self::default()
    }
}

/// A settings field rejected by [`Config::validate`]
///
/// Converts into [`NutError::Configuration`] so `validate` can return it with `?`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub field: &'static str,
    /// Rendered offending value
    pub value: String,
    pub reason: &'static str,
    /// Acceptable values, when a short hint exists
    pub suggestion: Option<&'static str>,
}

impl ValidationError {
    pub fn new(field: &'static str, value: impl fmt::Display, reason: &'static str) -> Self {
        Self {
            field,
            value: value.to_string(),
            reason,
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: &'static str) -> Self {
        self.suggestion = Some(suggestion);
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}: {}", self.field, self.value, self.reason)?;
        match self.suggestion {
            Some(hint) => write!(f, " (try {})", hint),
            None => Ok(()),
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for NutError {
    fn from(err: ValidationError) -> Self {
        NutError::configuration(err.to_string())
    }
}

/// Parse environment variable `var_name`, falling back to `default` when it is
/// unset or does not parse.
pub fn parse_env_var<T>(var_name: &str, default: T) -> T
where
    T: std::str::FromStr + Clone,
{
    env::var(var_name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_var_fallbacks() {
        env::set_var("NUT_CFG_TEST_NUMBER", "42");
        env::set_var("NUT_CFG_TEST_GARBAGE", "forty-two");

        assert_eq!(parse_env_var("NUT_CFG_TEST_NUMBER", 7usize), 42);
        assert_eq!(parse_env_var("NUT_CFG_TEST_GARBAGE", 7usize), 7);
        assert_eq!(parse_env_var("NUT_CFG_TEST_UNSET", 7usize), 7);

        env::remove_var("NUT_CFG_TEST_NUMBER");
        env::remove_var("NUT_CFG_TEST_GARBAGE");
    }

    #[test]
    fn test_validation_error_into_nut_error() {
        let err = ValidationError::new("load_factor", 0.0, "must be positive")
            .with_suggestion("0.5..=1.0");
        assert_eq!(err.to_string(), "load_factor = 0: must be positive (try 0.5..=1.0)");

        let nut: NutError = err.into();
        assert!(matches!(nut, NutError::Configuration { ref message } if message.contains("load_factor")));
        assert!(!nut.is_recoverable());
    }
}
