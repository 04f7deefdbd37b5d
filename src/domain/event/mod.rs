//! Event domain
//!
//! Events and their registration rosters are owned by the tournament platform
//! and only ever read from a snapshot cache.

mod entity;
mod source;

pub use entity::{Event, Person, PersonKey, Registration, Role, TeamRef};
pub use source::{event_registrations_key, EventSource, EVENT_LIST_KEY};
