//! Accreditation intake
//!
//! Builds a team's accreditation form from the roster and turns a submitted
//! form back into validated store changes.

mod roster;
mod submission;

pub use roster::{plan_intake, roster_emails, team_roster, FormStats, IntakePlan, RosterPlayer};
pub use submission::{
    conflict_errors, duplicate_message, validate_submission, AccreditationFormRow, FormErrors,
    ValidatedRow,
};
