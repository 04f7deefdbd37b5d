//! Event infrastructure

mod cache_source;

pub use cache_source::CacheEventSource;
