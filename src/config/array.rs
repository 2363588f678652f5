//! Array configuration.

use super::{parse_env_var, Config};
use crate::containers::array::{DEFAULT_ARRAY_CAPACITY, MAX_ARRAY_CAPACITY};
use crate::error::{PrimkeyError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Initial sizing of an [`Array`](crate::containers::Array) or
/// [`ConcurrentArray`](crate::containers::ConcurrentArray).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayConfig {
    /// Number of slots reserved up front
    pub initial_capacity: usize,
}

impl Default for ArrayConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_ARRAY_CAPACITY,
        }
    }
}

impl ArrayConfig {
    /// Create a configuration with the given initial capacity.
    pub fn new(initial_capacity: usize) -> Self {
        Self { initial_capacity }
    }
}

impl Config for ArrayConfig {
    fn validate(&self) -> Result<()> {
        if self.initial_capacity > MAX_ARRAY_CAPACITY {
            return Err(PrimkeyError::invalid_argument(format!(
                "initial capacity {} exceeds maximum {}",
                self.initial_capacity, MAX_ARRAY_CAPACITY
            )));
        }
        Ok(())
    }

    fn from_env_with_prefix(prefix: &str) -> Result<Self> {
        let mut config = Self::default();
        config.initial_capacity = parse_env_var(
            &format!("{}ARRAY_INITIAL_CAPACITY", prefix),
            config.initial_capacity,
        );
        config.validate()?;
        Ok(config)
    }

    fn performance_preset() -> Self {
        Self::new(256)
    }

    fn memory_preset() -> Self {
        Self::new(0)
    }

    fn realtime_preset() -> Self {
        Self::new(1024)
    }

    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self).map_err(|e| {
            PrimkeyError::configuration(format!("Failed to serialize array config: {}", e))
        })?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            PrimkeyError::configuration(format!("Failed to parse array config file: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }
}
