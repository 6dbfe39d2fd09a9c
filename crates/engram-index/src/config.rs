use crate::codec::SCALAR_SIZE;
use crate::error::{IndexError, Result};
use serde::{Deserialize, Serialize};

/// Number of vectors pre-reserved by a new index.
pub const DEFAULT_INITIAL_CAPACITY: usize = 1000;

/// Index construction parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Number of components per vector. Fixed for the lifetime of the index.
    pub dimension: usize,

    /// Vectors to reserve room for up front.
    /// Default: 1000. Purely a growth hint.
    #[serde(default = "default_initial_capacity")]
    pub initial_capacity: usize,
}

fn default_initial_capacity() -> usize {
    DEFAULT_INITIAL_CAPACITY
}

impl IndexConfig {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
        }
    }

    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.dimension == 0 {
            return Err(IndexError::InvalidConfig(
                "dimension must be positive".to_string(),
            ));
        }

        let max_scalars = isize::MAX as usize / SCALAR_SIZE;
        match self.dimension.checked_mul(self.initial_capacity) {
            Some(scalars) if scalars <= max_scalars => Ok(()),
            _ => Err(IndexError::InvalidConfig(format!(
                "initial capacity of {} vectors x {} dimensions exceeds addressable memory",
                self.initial_capacity, self.dimension
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IndexConfig::new(128);
        assert_eq!(config.dimension, 128);
        assert_eq!(config.initial_capacity, DEFAULT_INITIAL_CAPACITY);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let result = IndexConfig::new(0).validate();
        assert!(matches!(result, Err(IndexError::InvalidConfig(_))));
    }

    #[test]
    fn test_oversized_capacity_rejected() {
        let result = IndexConfig::new(128)
            .with_initial_capacity(usize::MAX)
            .validate();
        assert!(matches!(result, Err(IndexError::InvalidConfig(_))));

        let result = IndexConfig::new(2)
            .with_initial_capacity(isize::MAX as usize / 4)
            .validate();
        assert!(matches!(result, Err(IndexError::InvalidConfig(_))));

        assert!(IndexConfig::new(128)
            .with_initial_capacity(1_000_000)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_deserialize_fills_capacity() {
        let config: IndexConfig = serde_json::from_str(r#"{"dimension": 3}"#).unwrap();
        assert_eq!(config, IndexConfig::new(3));

        let config: IndexConfig =
            serde_json::from_str(r#"{"dimension": 3, "initial_capacity": 10}"#).unwrap();
        assert_eq!(config, IndexConfig::new(3).with_initial_capacity(10));
    }
}
