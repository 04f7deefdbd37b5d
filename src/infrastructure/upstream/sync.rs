//! Snapshot sync from the platform API into the cache

use std::sync::Arc;
use std::time::Duration;

use chrono::Datelike;
use serde::Serialize;
use tracing::info;

use super::client::UpstreamClient;
use crate::domain::cache::{encode_entry, Cache};
use crate::domain::event::{event_registrations_key, EVENT_LIST_KEY};
use crate::domain::DomainError;

/// What a sync run wrote
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub events: usize,
    pub registrations: usize,
}

/// Refreshes the event list and every event's roster in the cache
#[derive(Debug)]
pub struct SyncService {
    client: UpstreamClient,
    cache: Arc<dyn Cache>,
    ttl: Duration,
}

impl SyncService {
    pub fn new(client: UpstreamClient, cache: Arc<dyn Cache>, ttl: Duration) -> Self {
        Self { client, cache, ttl }
    }

    /// Fetch everything, then store it in one write; `year` keeps only
    /// events starting in that year
    ///
    /// The first failure aborts the run before anything is written, so the
    /// cache never holds an event list pointing at a missing roster.
    pub async fn run(&self, year: Option<i32>) -> Result<SyncReport, DomainError> {
        let token = self.client.access_token().await?;

        let events: Vec<_> = self
            .client
            .events(&token)
            .await?
            .into_iter()
            .filter(|event| year.is_none_or(|year| event.start.year() == year))
            .collect();

        let mut report = SyncReport {
            events: events.len(),
            registrations: 0,
        };
        let mut entries = Vec::with_capacity(events.len() + 1);

        for event in &events {
            let registrations = self.client.registrations(&token, event.id).await?;
            info!(event_id = event.id, registrations = registrations.len(), "Fetched registrations");

            report.registrations += registrations.len();
            entries.push(encode_entry(event_registrations_key(event.id), &registrations)?);
        }

        entries.push(encode_entry(EVENT_LIST_KEY, &events)?);
        self.cache.set_many_raw(&entries, self.ttl).await?;
        info!(events = report.events, registrations = report.registrations, "Sync complete");

        Ok(report)
    }
}
