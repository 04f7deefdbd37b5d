//! Tournament platform integration

mod client;
mod sync;

pub use client::{UpstreamClient, UpstreamConfig};
pub use sync::{SyncReport, SyncService};
