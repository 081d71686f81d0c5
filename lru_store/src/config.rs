//! Declarative description of a store, loadable from the environment.

use std::{
    env,
    num::NonZeroUsize,
    str::FromStr,
};

use serde::{
    Deserialize,
    Serialize,
};

use crate::error::{
    Result,
    StoreError,
};

/// Environment variable holding the store capacity.
pub const CAPACITY_VAR: &str = "LRU_STORE_CAPACITY";

/// Environment variable controlling up-front allocation.
pub const PREALLOCATE_VAR: &str = "LRU_STORE_PREALLOCATE";

const DEFAULT_CAPACITY: usize = 1024;

/// Settings used by [`LruStore::from_config`](crate::LruStore::from_config).
///
/// Missing fields fall back to [`StoreConfig::default`] when deserializing.
///
/// # Examples
///
/// ```rust
/// use lru_store::{
///     LruStore,
///     StoreConfig,
/// };
///
/// let config = StoreConfig {
///     capacity: 2,
///     ..StoreConfig::default()
/// };
/// let store = LruStore::<String, u32>::from_config(&config).unwrap();
/// assert_eq!(store.capacity(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Maximum number of entries. Must be non-zero to build a store.
    pub capacity: usize,
    /// Reserve storage up front. The reservation is capped, so a huge
    /// `capacity` still grows on demand.
    pub preallocate: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            preallocate: true,
        }
    }
}

impl StoreConfig {
    /// Loads the configuration from the process environment.
    ///
    /// - `LRU_STORE_CAPACITY` - maximum entries (default: 1024)
    /// - `LRU_STORE_PREALLOCATE` - `true`/`false` (default: true)
    ///
    /// Unset variables take their default; set but unparsable ones are an
    /// error.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads variables through
    /// `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            capacity: parse_var(&lookup, CAPACITY_VAR)?.unwrap_or(defaults.capacity),
            preallocate: parse_var(&lookup, PREALLOCATE_VAR)?.unwrap_or(defaults.preallocate),
        })
    }

    /// Returns the capacity, rejecting zero.
    pub fn nonzero_capacity(&self) -> Result<NonZeroUsize> {
        NonZeroUsize::new(self.capacity).ok_or(StoreError::ZeroCapacity)
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };

    raw.trim()
        .parse()
        .map(Some)
        .map_err(|_| StoreError::InvalidConfig {
            key: key.to_string(),
            value: raw,
        })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_config_default() {
        let config = StoreConfig::default();
        assert_eq!(config.capacity, 1024);
        assert!(config.preallocate);
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config = StoreConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, StoreConfig::default());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = StoreConfig::from_lookup(lookup_from(&[
            (CAPACITY_VAR, " 16 "),
            (PREALLOCATE_VAR, "false"),
        ]))
        .unwrap();
        assert_eq!(config.capacity, 16);
        assert!(!config.preallocate);
    }

    #[test]
    fn test_from_lookup_invalid_capacity() {
        let err = StoreConfig::from_lookup(lookup_from(&[(CAPACITY_VAR, "-3")])).unwrap_err();
        assert_eq!(
            err,
            StoreError::InvalidConfig {
                key: CAPACITY_VAR.to_string(),
                value: "-3".to_string(),
            }
        );
    }

    #[test]
    fn test_from_lookup_invalid_preallocate() {
        let err =
            StoreConfig::from_lookup(lookup_from(&[(PREALLOCATE_VAR, "sometimes")])).unwrap_err();
        assert!(matches!(err, StoreError::InvalidConfig { ref key, .. } if key == PREALLOCATE_VAR));
    }

    #[test]
    fn test_nonzero_capacity() {
        let config = StoreConfig {
            capacity: 0,
            preallocate: true,
        };
        assert_eq!(config.nonzero_capacity(), Err(StoreError::ZeroCapacity));

        let config = StoreConfig {
            capacity: 5,
            preallocate: true,
        };
        assert_eq!(config.nonzero_capacity().unwrap().get(), 5);
    }

    #[test]
    fn test_from_lookup_huge_capacity_builds() {
        let huge = (usize::MAX / 4).to_string();
        let config = StoreConfig::from_lookup(lookup_from(&[(CAPACITY_VAR, huge.as_str())])).unwrap();
        let store = crate::LruStore::<String, u64>::from_config(&config).unwrap();
        assert_eq!(store.capacity(), usize::MAX / 4);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: StoreConfig = serde_json::from_str(r#"{ "capacity": 8 }"#).unwrap();
        assert_eq!(config.capacity, 8);
        assert!(config.preallocate);

        let config: StoreConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, StoreConfig::default());
    }

    #[test]
    fn test_serialize_round_trip() {
        let config = StoreConfig {
            capacity: 3,
            preallocate: false,
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"capacity":3,"preallocate":false}"#);
        assert_eq!(serde_json::from_str::<StoreConfig>(&json).unwrap(), config);
    }
}
