//! Event source reading upstream snapshots from the cache

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::cache::{Cache, CacheExt};
use crate::domain::event::{event_registrations_key, Event, EventSource, Registration, EVENT_LIST_KEY};
use crate::domain::DomainError;

/// Reads the event list and rosters written by the sync job
#[derive(Debug, Clone)]
pub struct CacheEventSource {
    cache: Arc<dyn Cache>,
}

impl CacheEventSource {
    pub fn new(cache: Arc<dyn Cache>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl EventSource for CacheEventSource {
    async fn events(&self) -> Result<Vec<Event>, DomainError> {
        let events: Option<Vec<Event>> = self.cache.get(EVENT_LIST_KEY).await?;

        if events.is_none() {
            debug!(key = EVENT_LIST_KEY, "Event list not cached");
        }

        Ok(events.unwrap_or_default())
    }

    async fn registrations(&self, event_id: i64) -> Result<Vec<Registration>, DomainError> {
        let key = event_registrations_key(event_id);
        let registrations: Option<Vec<Registration>> = self.cache.get(&key).await?;

        if registrations.is_none() {
            debug!(key = %key, "Registrations not cached");
        }

        Ok(registrations.unwrap_or_default())
    }
}
