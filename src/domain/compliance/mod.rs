//! Team compliance
//!
//! Pure functions over a roster snapshot and a set of valid accreditations.

mod access;
mod aggregation;
mod stats;

pub use access::{admin_teams, can_administer};
pub use aggregation::{
    group_registrations_by_team, index_by_email, PlayerEntry, TeamAggregate, NO_TEAM,
};
pub use stats::{is_complying, TeamStats};
