//! Accreditation service - team accreditation forms and batch submission

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use super::TrackerSettings;
use crate::domain::accreditation::{
    valid_after, Accreditation, AccreditationRepository, AccreditationUpsert, FieldError,
};
use crate::domain::compliance::can_administer;
use crate::domain::event::{Event, EventSource, Registration};
use crate::domain::intake::{
    conflict_errors, plan_intake, roster_emails, team_roster, validate_submission,
    AccreditationFormRow, FormErrors, FormStats, IntakePlan, ValidatedRow,
};
use crate::domain::{DomainError, User};

const UNKNOWN_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";
const NOT_ON_ROSTER: &str = "This player is not registered for the team.";

/// A team's accreditation form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccreditationForm {
    pub event: Event,
    pub team_name: String,
    #[serde(flatten)]
    pub plan: IntakePlan,
    pub stats: FormStats,
}

/// Result of submitting an accreditation form
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    /// Every row was stored; carries the refreshed form
    Saved {
        saved: Vec<Accreditation>,
        form: AccreditationForm,
    },
    /// Nothing was stored; the submitted rows come back with their errors
    Rejected {
        errors: FormErrors,
        rows: Vec<AccreditationFormRow>,
    },
}

/// Accreditation service for team administrators
#[derive(Debug)]
pub struct AccreditationService<S: EventSource, R: AccreditationRepository> {
    source: Arc<S>,
    repository: Arc<R>,
    settings: TrackerSettings,
}

impl<S: EventSource, R: AccreditationRepository> AccreditationService<S, R> {
    pub fn new(source: Arc<S>, repository: Arc<R>, settings: TrackerSettings) -> Self {
        Self {
            source,
            repository,
            settings,
        }
    }

    /// Build the form for `team_name` at an event
    pub async fn form(
        &self,
        event_id: i64,
        team_name: &str,
        user: &User,
    ) -> Result<AccreditationForm, DomainError> {
        let (event, registrations) = self.load_authorized(event_id, team_name, user).await?;
        self.build_form(event, &registrations, team_name).await
    }

    /// Validate and store a submitted form
    ///
    /// Either every row is stored or none is.
    pub async fn submit(
        &self,
        event_id: i64,
        team_name: &str,
        user: &User,
        rows: Vec<AccreditationFormRow>,
        today: NaiveDate,
    ) -> Result<SubmissionOutcome, DomainError> {
        let (event, registrations) = self.load_authorized(event_id, team_name, user).await?;

        let validated = match validate_submission(&rows, today) {
            Ok(validated) => validated,
            Err(errors) => return Ok(self.rejected(event_id, team_name, errors, rows)),
        };

        let roster = roster_emails(&team_roster(&registrations, team_name));

        let store_errors = self.store_errors(&validated, &roster).await?;
        if !store_errors.is_empty() {
            let errors = FormErrors::new(store_errors);
            return Ok(self.rejected(event_id, team_name, errors, rows));
        }

        let changes: Vec<AccreditationUpsert> =
            validated.iter().map(|row| row.change.clone()).collect();

        let saved = match self.repository.save_all(changes).await {
            Ok(saved) => saved,
            Err(DomainError::Conflict { message }) => {
                // Another writer got in between the check and the save
                let store_errors = self.store_errors(&validated, &roster).await?;
                if store_errors.is_empty() {
                    return Err(DomainError::conflict(message));
                }
                let errors = FormErrors::new(store_errors);
                return Ok(self.rejected(event_id, team_name, errors, rows));
            }
            Err(e) => return Err(e),
        };

        info!(
            event_id,
            team = %team_name,
            user = %user.username(),
            saved = saved.len(),
            "Saved accreditations"
        );

        let form = self.build_form(event, &registrations, team_name).await?;
        Ok(SubmissionOutcome::Saved { saved, form })
    }

    async fn load_authorized(
        &self,
        event_id: i64,
        team_name: &str,
        user: &User,
    ) -> Result<(Event, Vec<Registration>), DomainError> {
        let event = self
            .source
            .event(event_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Event '{}' not found", event_id)))?;
        let registrations = self.source.registrations(event_id).await?;

        if !can_administer(&registrations, user, self.settings.demo_mode, team_name) {
            warn!(
                event_id,
                team = %team_name,
                user = %user.username(),
                "Accreditation form access denied"
            );
            return Err(DomainError::permission_denied(format!(
                "Not an administrator of '{}'",
                team_name
            )));
        }

        Ok((event, registrations))
    }

    async fn build_form(
        &self,
        event: Event,
        registrations: &[Registration],
        team_name: &str,
    ) -> Result<AccreditationForm, DomainError> {
        let roster = team_roster(registrations, team_name);
        let emails = roster_emails(&roster);

        let stored = self.repository.find_by_emails(&emails).await?;
        let cutoff = valid_after(event.end, self.settings.validity_months);
        let valid = self.repository.find_valid(&emails, cutoff).await?;

        let stats = FormStats::new(&valid, roster.len());
        let plan = plan_intake(&roster, stored);

        Ok(AccreditationForm {
            event,
            team_name: team_name.to_string(),
            plan,
            stats,
        })
    }

    /// Rows touching players off the team's roster, unknown update targets
    /// and collisions with other stored records
    async fn store_errors(
        &self,
        validated: &[ValidatedRow],
        roster: &[String],
    ) -> Result<Vec<FieldError>, DomainError> {
        let on_roster = |email: &str| roster.iter().any(|e| e == email);
        let mut errors = Vec::new();

        for ValidatedRow { row, change } in validated {
            match change.id {
                Some(id) => match self.repository.get(id).await? {
                    None => {
                        errors.push(FieldError::new(*row, "id", UNKNOWN_CHOICE));
                        continue;
                    }
                    Some(stored) if !on_roster(stored.email()) => {
                        errors.push(FieldError::new(*row, "id", UNKNOWN_CHOICE));
                        continue;
                    }
                    Some(_) => {}
                },
                None if !on_roster(&change.draft.email) => {
                    errors.push(FieldError::new(*row, "email", NOT_ON_ROSTER));
                    continue;
                }
                None => {}
            }

            let conflicts = self.repository.find_conflicts(&change.draft, change.id).await?;
            errors.extend(conflict_errors(*row, &change.draft, &conflicts));
        }

        Ok(errors)
    }

    fn rejected(
        &self,
        event_id: i64,
        team_name: &str,
        errors: FormErrors,
        rows: Vec<AccreditationFormRow>,
    ) -> SubmissionOutcome {
        info!(
            event_id,
            team = %team_name,
            errors = errors.errors.len(),
            "Rejected accreditation submission"
        );
        SubmissionOutcome::Rejected { errors, rows }
    }
}
