//! Configuration APIs for primkey containers
//!
//! Dictionaries and arrays can be built from plain constructors, or from a
//! validated configuration object. Configuration objects can be initialized
//! from presets, from environment variables, or from JSON files.
//!
//! ```rust
//! use primkey::config::{Config, DictionaryConfig};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DictionaryConfig::performance_preset();
//! config.validate()?;
//!
//! // Reads PRIMKEY_DICT_INITIAL_CAPACITY / PRIMKEY_DICT_LOAD_FACTOR
//! let from_env = DictionaryConfig::from_env()?;
//! assert!(from_env.validate().is_ok());
//! # Ok(())
//! # }
//! ```

use crate::error::Result;
use std::env;
use std::fmt;
use std::path::Path;

pub mod array;
pub mod dictionary;


pub use array::ArrayConfig;
pub use dictionary::DictionaryConfig;

/// Common configuration trait providing validation, environment initialization,
/// and preset management functionality.
pub trait Config: Clone + fmt::Debug {
    /// Validate the configuration for correctness and consistency.
    fn validate(&self) -> Result<()>;

    /// Initialize configuration from environment variables with the `PRIMKEY_` prefix.
    ///
    /// Unset variables keep their default values.
    fn from_env() -> Result<Self>
    where
        Self: Default,
    {
        Self::from_env_with_prefix("PRIMKEY_")
    }

    /// Initialize configuration from environment variables with a custom prefix.
    fn from_env_with_prefix(prefix: &str) -> Result<Self>
    where
        Self: Default;

    /// Preset tuned for throughput at the cost of memory.
    fn performance_preset() -> Self;

    /// Preset tuned for a small footprint.
    fn memory_preset() -> Self;

    /// Preset tuned for predictable latency: enough headroom that resizes are rare.
    fn realtime_preset() -> Self;

    /// Balanced preset, identical to the default configuration.
    fn balanced_preset() -> Self
    where
        Self: Default,
    {
        Self::default()
    }

    /// Save configuration to a JSON file.
    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()>;

    /// Load and validate configuration from a JSON file.
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self>;
}

/// Parse an environment variable, falling back to `default` when the
/// variable is unset or does not parse.
pub fn parse_env_var<T>(var_name: &str, default: T) -> T
where
    T: std::str::FromStr + Clone,
{
    env::var(var_name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
