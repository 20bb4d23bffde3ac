//! Offcache - offline cache manager for static sites
//!
//! Caches a site's assets under versioned namespaces, answers requests from
//! the cache when the network is unreachable, and refreshes pages in the
//! background. Storage, network and notifications are injected capabilities,
//! so the same worker runs in the CLI, in tests and in embedders.

pub mod cache;
pub mod cli;
pub mod config;
pub mod content;
pub mod error;
pub mod fetch;
pub mod notify;
pub mod policy;
pub mod request;
pub mod ui;
pub mod worker;

pub use error::{OffcacheError, OffcacheResult};
