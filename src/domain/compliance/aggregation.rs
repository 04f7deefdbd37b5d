//! Registration-to-team aggregation

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Serialize, Serializer};

use super::stats::TeamStats;
use crate::domain::accreditation::{Accreditation, AccreditationType};
use crate::domain::event::{PersonKey, Registration, Role};

/// Bucket for registrations without a team
pub const NO_TEAM: &str = "No team";

/// One person on a team roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerEntry {
    pub name: String,
    pub roles: BTreeSet<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub accreditation: Option<AccreditationType>,
}

impl PlayerEntry {
    fn from_registration(
        registration: &Registration,
        accreditations: &HashMap<String, Accreditation>,
    ) -> Self {
        let email = registration.person.email().map(str::to_string);

        Self {
            name: registration.person.full_name.clone(),
            roles: BTreeSet::from([registration.role.clone()]),
            accreditation: lookup_type(email.as_deref(), accreditations),
            email,
        }
    }

    /// Fold another registration of the same person into this entry
    fn merge(
        self,
        registration: &Registration,
        accreditations: &HashMap<String, Accreditation>,
    ) -> Self {
        let mut roles = self.roles;
        roles.insert(registration.role.clone());

        let email = self
            .email
            .or_else(|| registration.person.email().map(str::to_string));
        let accreditation = self
            .accreditation
            .or_else(|| lookup_type(email.as_deref(), accreditations));

        Self {
            name: self.name,
            roles,
            email,
            accreditation,
        }
    }

    /// Holds a player or captain role
    pub fn is_eligible(&self) -> bool {
        self.roles.iter().any(Role::is_eligible)
    }
}

fn lookup_type(
    email: Option<&str>,
    accreditations: &HashMap<String, Accreditation>,
) -> Option<AccreditationType> {
    email
        .and_then(|email| accreditations.get(email))
        .map(Accreditation::kind)
}

/// A team's players with their compliance counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamAggregate {
    pub team_name: String,
    #[serde(serialize_with = "serialize_players")]
    pub players: BTreeMap<PersonKey, PlayerEntry>,
    pub stats: TeamStats,
}

impl TeamAggregate {
    fn new(team_name: String, players: BTreeMap<PersonKey, PlayerEntry>) -> Self {
        let stats = players
            .values()
            .filter(|player| player.is_eligible())
            .fold(TeamStats::default(), |stats, player| {
                stats.with_player(player.accreditation)
            });

        Self {
            team_name,
            players,
            stats,
        }
    }
}

fn serialize_players<S>(
    players: &BTreeMap<PersonKey, PlayerEntry>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_seq(players.values())
}

/// Index valid accreditations by email; later records win
pub fn index_by_email(accreditations: Vec<Accreditation>) -> HashMap<String, Accreditation> {
    accreditations
        .into_iter()
        .map(|record| (record.email().to_string(), record))
        .collect()
}

/// Group registrations by team and person, then compute each team's stats
///
/// Teams come back ordered by name. Registrations with no team land in
/// [`NO_TEAM`].
pub fn group_registrations_by_team(
    registrations: &[Registration],
    accreditations: &HashMap<String, Accreditation>,
) -> BTreeMap<String, TeamAggregate> {
    let grouped = registrations.iter().fold(
        BTreeMap::<String, BTreeMap<PersonKey, PlayerEntry>>::new(),
        |mut teams, registration| {
            let team_name = registration.team_name().unwrap_or(NO_TEAM).to_string();
            let players = teams.entry(team_name).or_default();
            let key = registration.person.key();

            let entry = match players.remove(&key) {
                Some(existing) => existing.merge(registration, accreditations),
                None => PlayerEntry::from_registration(registration, accreditations),
            };
            players.insert(key, entry);

            teams
        },
    );

    grouped
        .into_iter()
        .map(|(team_name, players)| {
            let aggregate = TeamAggregate::new(team_name.clone(), players);
            (team_name, aggregate)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::accreditation::{AccreditationDraft, AccreditationId};
    use crate::domain::event::Person;
    use chrono::{NaiveDate, Utc};

    fn accreditation(id: i64, email: &str, kind: AccreditationType) -> Accreditation {
        Accreditation::from_parts(
            AccreditationId::new(id),
            AccreditationDraft {
                name: email.to_string(),
                email: email.to_string(),
                kind,
                date: NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(),
                uc_username: format!("user-{}", id),
                wfdf_userid: id,
            },
            Utc::now(),
        )
    }

    fn player(id: i64, name: &str, email: &str) -> Person {
        Person::new(name).with_id(id).with_email(email)
    }

    #[test]
    fn test_empty_roster_yields_empty_mapping() {
        assert!(group_registrations_by_team(&[], &HashMap::new()).is_empty());
    }

    #[test]
    fn test_groups_by_team_and_counts_tiers() {
        let registrations = vec![
            Registration::new(player(1, "Ann", "ann@x.org"), Some("ATC"), "player"),
            Registration::new(player(2, "Bo", "bo@x.org"), Some("ATC"), "captain"),
            Registration::new(player(3, "Cy", "cy@x.org"), Some("ATC"), "player"),
            Registration::new(player(4, "Di", "di@x.org"), Some("Bangalore"), "player"),
        ];
        let accreditations = index_by_email(vec![
            accreditation(1, "ann@x.org", AccreditationType::Standard),
            accreditation(2, "bo@x.org", AccreditationType::Advanced),
            accreditation(4, "di@x.org", AccreditationType::Advanced),
        ]);

        let teams = group_registrations_by_team(&registrations, &accreditations);

        assert_eq!(teams.keys().collect::<Vec<_>>(), vec!["ATC", "Bangalore"]);
        assert_eq!(teams["ATC"].stats, TeamStats::new(1, 1, 3));
        assert!(!teams["ATC"].stats.complying);
        assert_eq!(teams["Bangalore"].stats, TeamStats::new(0, 1, 1));
        assert!(teams["Bangalore"].stats.complying);
    }

    #[test]
    fn test_admin_only_registrant_is_not_counted() {
        let registrations = vec![
            Registration::new(player(1, "Ann", "ann@x.org"), Some("ATC"), "player"),
            Registration::new(player(2, "Manager", "m@x.org"), Some("ATC"), "admin"),
        ];
        let accreditations =
            index_by_email(vec![accreditation(1, "ann@x.org", AccreditationType::Advanced)]);

        let teams = group_registrations_by_team(&registrations, &accreditations);
        let atc = &teams["ATC"];

        assert_eq!(atc.players.len(), 2);
        assert_eq!(atc.stats.players, 1);
        assert!(atc.stats.complying);
    }

    #[test]
    fn test_roles_fold_across_registrations() {
        let ann = player(1, "Ann", "ann@x.org");
        let registrations = vec![
            Registration::new(ann.clone(), Some("ATC"), "admin"),
            Registration::new(ann, Some("ATC"), "player"),
        ];

        let teams = group_registrations_by_team(&registrations, &HashMap::new());
        let entry = &teams["ATC"].players[&PersonKey::Id(1)];

        assert_eq!(entry.roles, BTreeSet::from([Role::Admin, Role::Player]));
        assert_eq!(teams["ATC"].stats.players, 1);
        assert!(teams["ATC"]
            .players
            .values()
            .all(|player| !player.roles.is_empty()));
    }

    #[test]
    fn test_namesakes_with_ids_stay_separate() {
        let registrations = vec![
            Registration::new(player(1, "Sam", "sam1@x.org"), Some("ATC"), "player"),
            Registration::new(player(2, "Sam", "sam2@x.org"), Some("ATC"), "player"),
        ];

        let teams = group_registrations_by_team(&registrations, &HashMap::new());
        assert_eq!(teams["ATC"].stats.players, 2);
    }

    #[test]
    fn test_missing_team_goes_to_no_team() {
        let registrations = vec![Registration::new(Person::new("Solo"), None, "player")];

        let teams = group_registrations_by_team(&registrations, &HashMap::new());

        assert_eq!(teams[NO_TEAM].players.len(), 1);
        assert_eq!(teams[NO_TEAM].stats, TeamStats::new(0, 0, 1));
    }

    #[test]
    fn test_serializes_players_as_list() {
        let registrations = vec![Registration::new(
            player(1, "Ann", "ann@x.org"),
            Some("ATC"),
            "player",
        )];

        let teams = group_registrations_by_team(&registrations, &HashMap::new());
        let json = serde_json::to_value(&teams["ATC"]).unwrap();

        assert_eq!(json["players"][0]["name"], "Ann");
        assert_eq!(json["players"][0]["roles"][0], "player");
        assert!(json["players"][0]["accreditation"].is_null());
        assert_eq!(json["stats"]["Players"], 1);
    }
}
