//! Team roster for the accreditation form

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use super::submission::AccreditationFormRow;
use crate::domain::accreditation::{Accreditation, AccreditationType};
use crate::domain::event::{Registration, Role};

/// A distinct non-admin person registered with a team
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RosterPlayer {
    pub name: String,
    pub uc_username: Option<String>,
    pub email: Option<String>,
}

impl RosterPlayer {
    fn from_registration(registration: &Registration) -> Self {
        Self {
            name: registration.person.full_name.clone(),
            uc_username: registration.person.username().map(str::to_string),
            email: registration.person.email().map(str::to_string),
        }
    }

    /// Both an email and a platform username are known
    pub fn is_contactable(&self) -> bool {
        self.email.is_some() && self.uc_username.is_some()
    }
}

/// Distinct non-admin players of `team_name`, sorted by name, username, email
pub fn team_roster(registrations: &[Registration], team_name: &str) -> Vec<RosterPlayer> {
    registrations
        .iter()
        .filter(|registration| {
            registration.is_for_team(team_name) && registration.role != Role::Admin
        })
        .map(RosterPlayer::from_registration)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Emails present on the roster
pub fn roster_emails(roster: &[RosterPlayer]) -> Vec<String> {
    roster
        .iter()
        .filter_map(|player| player.email.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// How the form treats each roster player
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntakePlan {
    /// Missing email or username; shown but not editable
    pub no_contact: Vec<RosterPlayer>,
    /// Stored records for roster emails, ordered by name
    pub existing: Vec<AccreditationFormRow>,
    /// Blank rows pre-filled from the roster
    pub new_players: Vec<AccreditationFormRow>,
}

/// Partition a roster against the records already stored for its emails
pub fn plan_intake(roster: &[RosterPlayer], stored: Vec<Accreditation>) -> IntakePlan {
    let stored_emails: HashSet<&str> = stored.iter().map(Accreditation::email).collect();

    let new_players = roster
        .iter()
        .filter(|player| {
            player.is_contactable()
                && player
                    .email
                    .as_deref()
                    .is_some_and(|email| !stored_emails.contains(email))
        })
        .map(AccreditationFormRow::prefilled)
        .collect();

    let no_contact = roster
        .iter()
        .filter(|player| !player.is_contactable())
        .cloned()
        .collect();

    let mut existing: Vec<&Accreditation> = stored.iter().collect();
    existing.sort_by(|a, b| a.name().cmp(b.name()).then_with(|| a.id().cmp(&b.id())));

    IntakePlan {
        no_contact,
        existing: existing.into_iter().map(AccreditationFormRow::from).collect(),
        new_players,
    }
}

/// Header counters on the accreditation form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FormStats {
    #[serde(rename = "Standard")]
    pub standard: usize,
    #[serde(rename = "Advanced")]
    pub advanced: usize,
    #[serde(rename = "Players")]
    pub players: usize,
}

impl FormStats {
    /// Count valid accreditations by tier against the roster size
    pub fn new(valid: &[Accreditation], roster_size: usize) -> Self {
        valid.iter().fold(
            Self {
                players: roster_size,
                ..Self::default()
            },
            |stats, record| match record.kind() {
                AccreditationType::Standard => Self {
                    standard: stats.standard + 1,
                    ..stats
                },
                AccreditationType::Advanced => Self {
                    advanced: stats.advanced + 1,
                    ..stats
                },
            },
        )
    }
}
