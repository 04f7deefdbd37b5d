//! Team access control

use std::collections::BTreeSet;

use crate::domain::event::Registration;
use crate::domain::user::User;

/// Teams in `registrations` whose accreditation form `user` may manage
///
/// Superusers, and everyone in demo mode, get every named team. Otherwise a
/// team is included when one of its registrations carries the user's email
/// (exact match) with an admin, captain or player role.
pub fn admin_teams(registrations: &[Registration], user: &User, demo_mode: bool) -> BTreeSet<String> {
    let all_teams = demo_mode || user.is_superuser();

    registrations
        .iter()
        .filter(|registration| {
            all_teams
                || (registration.person.email() == Some(user.email())
                    && registration.role.can_administer())
        })
        .filter_map(|registration| registration.team_name().map(str::to_string))
        .collect()
}

pub fn can_administer(
    registrations: &[Registration],
    user: &User,
    demo_mode: bool,
    team_name: &str,
) -> bool {
    admin_teams(registrations, user, demo_mode).contains(team_name)
}
