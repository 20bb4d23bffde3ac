//! Versioned response cache
//!
//! Responses live in named namespaces, one per pool and cache version.
//! Entries are immutable snapshots, replaced wholesale on re-fetch.
//! Eviction happens only by deleting whole namespaces.
//!
//! # Pools
//!
//! | Pool | Filled by | Example |
//! |------|-----------|---------|
//! | static | install, runtime fetches of static file types | `xenon-static-v1.0.0` |
//! | dynamic | runtime fetches, periodic content sync | `xenon-dynamic-v1.0.0` |

pub mod disk;
pub mod key;
pub mod memory;
pub mod namespace;
pub mod storage;

pub use disk::DiskStorage;
pub use key::RequestKey;
pub use memory::MemoryStorage;
pub use namespace::{check_prefix, check_version, CacheNamespace, NamespaceSet, Pool};
pub use storage::{CacheEntry, CacheStorage};
