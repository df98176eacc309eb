//! Tuning parameters for [`QuadBuckets`].
//!
//! [`QuadBuckets`]: ../quadbuckets/struct.QuadBuckets.html " "

use core::fmt::{self, Formatter, Display};
use crate::quad_tiling::NR_LEVELS;

/// Splitting parameters of a [`QuadBuckets`] index.
///
/// # Example
/// ```rust
/// use quadbuckets::{Config, QuadBuckets, LatLon};
///
/// let config = Config::new()
///     .with_max_objects_per_level(4)
///     .with_max_level(8)
///     .expect("8 levels are available");
/// let mut buckets = QuadBuckets::<LatLon>::with_config(config);
/// buckets.add(LatLon::new(1.0, 1.0));
/// assert_eq!(buckets.config().max_level(), 8);
/// ```
///
/// [`QuadBuckets`]: ../quadbuckets/struct.QuadBuckets.html " "
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Config {
    max_objects_per_level: usize,
    max_level: u8,
}
impl Config {
    /// The number of entities a bucket may hold before it gets split, unless configured otherwise.
    pub const DEFAULT_MAX_OBJECTS_PER_LEVEL: usize = 16;

    /// Creates the default configuration: 16 entities per bucket and all available levels.
    #[inline]
    pub const fn new() -> Self {
        Self {
            max_objects_per_level: Self::DEFAULT_MAX_OBJECTS_PER_LEVEL,
            max_level: NR_LEVELS,
        }
    }
    /// Sets the number of entities a leaf bucket may hold; adding one more splits it.
    #[inline]
    pub const fn with_max_objects_per_level(mut self, max_objects_per_level: usize) -> Self {
        self.max_objects_per_level = max_objects_per_level;
        self
    }
    /// Sets the deepest level buckets may be split to. Buckets at that level grow without bound.
    ///
    /// # Errors
    /// Fails if `max_level` exceeds the number of levels quad paths can address.
    #[inline]
    pub fn with_max_level(mut self, max_level: u8) -> Result<Self, ConfigError> {
        if max_level > NR_LEVELS {
            return Err(ConfigError::MaxLevelTooDeep(max_level));
        }
        self.max_level = max_level;
        Ok(self)
    }

    /// Returns the number of entities a leaf bucket may hold before being split.
    #[inline(always)]
    pub const fn max_objects_per_level(&self) -> usize {
        self.max_objects_per_level
    }
    /// Returns the deepest level buckets may be split to.
    #[inline(always)]
    pub const fn max_level(&self) -> u8 {
        self.max_level
    }
}
impl Default for Config {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/// The error type returned when building an invalid [`Config`].
///
/// [`Config`]: struct.Config.html " "
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub enum ConfigError {
    /// The requested maximum level is deeper than quad paths can address. Contains the requested level.
    MaxLevelTooDeep(u8),
}
impl Display for ConfigError {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxLevelTooDeep(level) => write!(
                f,
                "maximum level {} exceeds the {} levels quad paths can address",
                level, NR_LEVELS,
            ),
        }
    }
}
impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.max_objects_per_level(), 16);
        assert_eq!(config.max_level(), NR_LEVELS);
    }

    #[test]
    fn too_deep() {
        let err = Config::new().with_max_level(NR_LEVELS + 1).unwrap_err();
        assert_eq!(err, ConfigError::MaxLevelTooDeep(NR_LEVELS + 1));
        assert_eq!(
            err.to_string(),
            "maximum level 25 exceeds the 24 levels quad paths can address",
        );
        assert!(Config::new().with_max_level(0).is_ok());
    }
}
