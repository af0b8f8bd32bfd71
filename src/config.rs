//! Construction parameters for `BucketedHashMap`.

use thiserror::Error;

/// Bucket count used when none is given.
pub const DEFAULT_BUCKETS: usize = 16;

/// Load factor above which an insert doubles the bucket array.
pub const DEFAULT_MAX_LOAD_FACTOR: f32 = 0.75;

/// Smallest accepted max load factor: at most 100 buckets per entry.
pub const MIN_MAX_LOAD_FACTOR: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    #[error("max load factor must be finite and >= {min}, got {0}", min = MIN_MAX_LOAD_FACTOR)]
    InvalidMaxLoadFactor(f32),
}

/// Initial sizing and growth threshold.
///
/// `initial_buckets == 0` is accepted and coerced to a single bucket when the
/// map is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapConfig {
    pub initial_buckets: usize,
    pub max_load_factor: f32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            initial_buckets: DEFAULT_BUCKETS,
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
        }
    }
}

impl MapConfig {
    pub fn with_initial_buckets(mut self, n: usize) -> Self {
        self.initial_buckets = n;
        self
    }

    pub fn with_max_load_factor(mut self, lf: f32) -> Self {
        self.max_load_factor = lf;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_max_load_factor(self.max_load_factor)
    }
}

pub(crate) fn check_max_load_factor(lf: f32) -> Result<(), ConfigError> {
    if lf.is_finite() && lf >= MIN_MAX_LOAD_FACTOR {
        Ok(())
    } else {
        Err(ConfigError::InvalidMaxLoadFactor(lf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = MapConfig::default();
        assert_eq!(c.initial_buckets, 16);
        assert_eq!(c.max_load_factor, 0.75);
        assert!(c.validate().is_ok());
    }

    /// Invariant: only finite load factors at or above the minimum validate.
    #[test]
    fn rejects_bad_load_factors() {
        for lf in [0.0, -1.0, f32::NAN, f32::INFINITY, 1e-30, 0.009] {
            let c = MapConfig::default().with_max_load_factor(lf);
            assert!(matches!(
                c.validate(),
                Err(ConfigError::InvalidMaxLoadFactor(_))
            ));
        }
        for lf in [MIN_MAX_LOAD_FACTOR, 4.0, f32::MAX] {
            assert!(MapConfig::default().with_max_load_factor(lf).validate().is_ok());
        }
    }

    #[test]
    fn error_message_names_value() {
        let e = ConfigError::InvalidMaxLoadFactor(-2.0);
        assert_eq!(e.to_string(), "max load factor must be finite and >= 0.01, got -2");
    }
}
