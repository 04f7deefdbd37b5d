//! Read access to cached event data

use std::fmt::Debug;

use async_trait::async_trait;

use super::entity::{Event, Registration};
use crate::domain::DomainError;

/// Cache key holding the JSON event list
pub const EVENT_LIST_KEY: &str = "event-list";

/// Cache key holding the JSON registration list for one event
pub fn event_registrations_key(event_id: i64) -> String {
    format!("event-registrations-{}", event_id)
}

/// Source of events and rosters
///
/// A missing snapshot is an empty list, never an error.
#[async_trait]
pub trait EventSource: Send + Sync + Debug {
    /// All known events, in the order they were published
    async fn events(&self) -> Result<Vec<Event>, DomainError>;

    /// Registrations for one event
    async fn registrations(&self, event_id: i64) -> Result<Vec<Registration>, DomainError>;

    /// Look up a single event
    async fn event(&self, event_id: i64) -> Result<Option<Event>, DomainError> {
        Ok(self
            .events()
            .await?
            .into_iter()
            .find(|event| event.id == event_id))
    }
}
