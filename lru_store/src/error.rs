//! Errors reported while building a store.
//!
//! Looking up, inserting or removing keys never fails: a missing key is
//! reported through `Option`/`bool`. Only construction can go wrong.

use thiserror::Error;

/// Error type for fallible [`LruStore`](crate::LruStore) construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A store was requested with room for zero entries.
    #[error("store capacity must be greater than zero")]
    ZeroCapacity,

    /// A configuration variable held a value that could not be parsed.
    #[error("invalid value {value:?} for {key}")]
    InvalidConfig {
        /// Name of the offending variable.
        key: String,
        /// The raw value that failed to parse.
        value: String,
    },
}

/// Convenience result type for store construction.
pub type Result<T> = std::result::Result<T, StoreError>;
