//! Event service - event listing and per-team compliance pages

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use super::TrackerSettings;
use crate::domain::accreditation::{valid_after, AccreditationRepository};
use crate::domain::compliance::{admin_teams, group_registrations_by_team, index_by_email};
use crate::domain::event::{Event, EventSource, Registration};
use crate::domain::{DomainError, TeamAggregate, User};

/// Cached events split around today
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventListing {
    pub upcoming_events: Vec<Event>,
    pub past_events: Vec<Event>,
}

impl EventListing {
    /// Partition keeping the cached order within each half
    pub fn split(events: Vec<Event>, today: NaiveDate) -> Self {
        let (upcoming_events, past_events) = events
            .into_iter()
            .partition(|event| event.is_upcoming(today));

        Self {
            upcoming_events,
            past_events,
        }
    }
}

/// Everything shown on an event page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventPage {
    pub event: Event,
    pub registrations: Vec<Registration>,
    pub admin_teams: BTreeSet<String>,
    pub registrations_by_team: BTreeMap<String, TeamAggregate>,
}

/// Event service joining cached rosters with stored accreditations
#[derive(Debug)]
pub struct EventService<S: EventSource, R: AccreditationRepository> {
    source: Arc<S>,
    accreditations: Arc<R>,
    settings: TrackerSettings,
}

impl<S: EventSource, R: AccreditationRepository> EventService<S, R> {
    pub fn new(source: Arc<S>, accreditations: Arc<R>, settings: TrackerSettings) -> Self {
        Self {
            source,
            accreditations,
            settings,
        }
    }

    /// List cached events as upcoming and past
    pub async fn list_events(&self, today: NaiveDate) -> Result<EventListing, DomainError> {
        let events = self.source.events().await?;
        Ok(EventListing::split(events, today))
    }

    /// Get an event, returning an error if it is not cached
    pub async fn get_required(&self, event_id: i64) -> Result<Event, DomainError> {
        self.source
            .event(event_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Event '{}' not found", event_id)))
    }

    /// Build the compliance page of one event for `user`
    pub async fn event_page(&self, event_id: i64, user: &User) -> Result<EventPage, DomainError> {
        let event = self.get_required(event_id).await?;
        let registrations = self.source.registrations(event_id).await?;

        let emails: Vec<String> = registrations
            .iter()
            .filter_map(|registration| registration.person.email().map(str::to_string))
            .collect();
        let cutoff = valid_after(event.end, self.settings.validity_months);
        let valid = self.accreditations.find_valid(&emails, cutoff).await?;

        debug!(
            event_id,
            registrations = registrations.len(),
            valid_accreditations = valid.len(),
            valid_after = %cutoff,
            "Building event page"
        );

        let by_email = index_by_email(valid);
        let registrations_by_team = group_registrations_by_team(&registrations, &by_email);
        let admin_teams = admin_teams(&registrations, user, self.settings.demo_mode);

        Ok(EventPage {
            event,
            registrations,
            admin_teams,
            registrations_by_team,
        })
    }
}
