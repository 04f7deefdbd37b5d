//! Snapshot cache abstraction
//!
//! Upstream event data is written here by the sync job and read by the web
//! handlers. Values are JSON documents stored under plain string keys.

mod repository;

pub use repository::{encode_entry, Cache, CacheExt};

#[cfg(test)]
pub use repository::mock::MockCache;
