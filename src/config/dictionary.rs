//! Dictionary configuration.

use super::{parse_env_var, Config};
use crate::dictionary::{DEFAULT_INITIAL_CAPACITY, DEFAULT_LOAD_FACTOR, MAXIMUM_CAPACITY};
use crate::error::{PrimkeyError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Sizing policy of a primitive-keyed dictionary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictionaryConfig {
    /// Requested bucket count, rounded up to the next power of two
    pub initial_capacity: usize,
    /// Ratio of live pairs to buckets at which the table doubles, in (0, 1]
    pub load_factor: f32,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            load_factor: DEFAULT_LOAD_FACTOR,
        }
    }
}

impl DictionaryConfig {
    /// Create a configuration from explicit values. Not validated until used.
    pub fn new(initial_capacity: usize, load_factor: f32) -> Self {
        Self {
            initial_capacity,
            load_factor,
        }
    }

    /// Bucket count the table starts with.
    pub fn table_length(&self) -> usize {
        self.initial_capacity
            .max(1)
            .next_power_of_two()
            .min(MAXIMUM_CAPACITY)
    }

    /// Initial resize threshold, `table_length * load_factor`.
    pub fn initial_threshold(&self) -> usize {
        threshold_for(self.table_length(), self.load_factor)
    }
}

/// Resize threshold of a table with `table_length` buckets.
pub(crate) fn threshold_for(table_length: usize, load_factor: f32) -> usize {
    ((table_length as f64 * load_factor as f64) as usize).max(1)
}

impl Config for DictionaryConfig {
    fn validate(&self) -> Result<()> {
        if !self.load_factor.is_finite() || self.load_factor <= 0.0 || self.load_factor > 1.0 {
            return Err(PrimkeyError::invalid_argument(format!(
                "load factor must be in (0, 1], got {}",
                self.load_factor
            )));
        }
        if self.initial_capacity == 0 {
            return Err(PrimkeyError::invalid_argument(
                "initial capacity must be greater than 0",
            ));
        }
        if self.initial_capacity > MAXIMUM_CAPACITY {
            return Err(PrimkeyError::invalid_argument(format!(
                "initial capacity {} exceeds maximum {}",
                self.initial_capacity, MAXIMUM_CAPACITY
            )));
        }
        Ok(())
    }

    fn from_env_with_prefix(prefix: &str) -> Result<Self> {
        let mut config = Self::default();
        config.initial_capacity = parse_env_var(
            &format!("{}DICT_INITIAL_CAPACITY", prefix),
            config.initial_capacity,
        );
        config.load_factor =
            parse_env_var(&format!("{}DICT_LOAD_FACTOR", prefix), config.load_factor);
        config.validate()?;
        Ok(config)
    }

    fn performance_preset() -> Self {
        Self::new(256, 0.5)
    }

    fn memory_preset() -> Self {
        Self::new(8, 1.0)
    }

    fn realtime_preset() -> Self {
        Self::new(1024, 0.75)
    }

    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self).map_err(|e| {
            PrimkeyError::configuration(format!("Failed to serialize dictionary config: {}", e))
        })?;
        std::fs::write(path, serialized)?;
        Ok(())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            PrimkeyError::configuration(format!("Failed to parse dictionary config file: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }
}
