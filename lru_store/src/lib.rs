#![doc = include_str!("../../README.md")]
#![deny(missing_docs)]
#![cfg_attr(all(doc, ENABLE_DOC_AUTO_CFG), feature(doc_auto_cfg))]

mod config;
mod error;
pub mod iter;
mod linked_hashmap;
mod store;

pub use config::{
    CAPACITY_VAR,
    PREALLOCATE_VAR,
    StoreConfig,
};
pub use error::{
    Result,
    StoreError,
};
pub use iter::{
    IntoIter,
    Iter,
    Keys,
    Values,
};
pub use store::LruStore;

#[cfg(not(feature = "ahash"))]
type RandomState = std::hash::RandomState;
#[cfg(feature = "ahash")]
type RandomState = ahash::RandomState;
