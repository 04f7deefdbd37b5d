//! Events and registrations as published by the tournament platform

use std::fmt;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

/// A league event (tournament)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(deserialize_with = "deserialize_event_date")]
    pub start: NaiveDate,
    #[serde(deserialize_with = "deserialize_event_date")]
    pub end: NaiveDate,
}

impl Event {
    /// An event is upcoming until the day after it ends
    pub fn is_upcoming(&self, today: NaiveDate) -> bool {
        self.end >= today
    }
}

/// Accepts either a plain date or an RFC 3339 timestamp, keeping the date part
fn deserialize_event_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_event_date(&raw).map_err(serde::de::Error::custom)
}

fn parse_event_date(raw: &str) -> Result<NaiveDate, String> {
    let raw = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }

    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .map_err(|e| format!("Invalid event date '{}': {}", raw, e))
}

fn deserialize_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;

    Ok(value.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }))
}

/// Person attached to a registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub full_name: String,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub email_address: Option<String>,
    /// Ultimate Central username
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub slug: Option<String>,
}

impl Person {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            id: None,
            full_name: full_name.into(),
            email_address: None,
            slug: None,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email_address = Some(email.into());
        self
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn email(&self) -> Option<&str> {
        self.email_address.as_deref()
    }

    pub fn username(&self) -> Option<&str> {
        self.slug.as_deref()
    }

    /// Grouping key: platform ID, then username, then display name
    pub fn key(&self) -> PersonKey {
        if let Some(id) = self.id {
            PersonKey::Id(id)
        } else if let Some(slug) = &self.slug {
            PersonKey::Username(slug.clone())
        } else {
            PersonKey::Name(self.full_name.clone())
        }
    }
}

/// Identifies a person within a team roster
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PersonKey {
    Id(i64),
    Username(String),
    /// Fallback when the platform supplies no identifier; namesakes collapse
    Name(String),
}

impl fmt::Display for PersonKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "id:{}", id),
            Self::Username(slug) => write!(f, "user:{}", slug),
            Self::Name(name) => write!(f, "name:{}", name),
        }
    }
}

/// Team reference on a registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRef {
    pub name: String,
}

/// Role held by a registrant
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Captain,
    Player,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "admin",
            Self::Captain => "captain",
            Self::Player => "player",
            Self::Other(role) => role,
        }
    }

    /// Counts towards a team's compliance denominator
    pub fn is_eligible(&self) -> bool {
        matches!(self, Self::Player | Self::Captain)
    }

    /// Grants access to the team's accreditation form
    pub fn can_administer(&self) -> bool {
        matches!(self, Self::Admin | Self::Captain | Self::Player)
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "admin" => Self::Admin,
            "captain" => Self::Captain,
            "player" => Self::Player,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(role) => role,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Links a person to a team and role for one event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    #[serde(rename = "Person", alias = "person")]
    pub person: Person,
    #[serde(rename = "Team", alias = "team", default)]
    pub team: Option<TeamRef>,
    pub role: Role,
}

impl Registration {
    pub fn new(person: Person, team: Option<&str>, role: impl Into<Role>) -> Self {
        Self {
            person,
            team: team.map(|name| TeamRef {
                name: name.to_string(),
            }),
            role: role.into(),
        }
    }

    pub fn team_name(&self) -> Option<&str> {
        self.team.as_ref().map(|t| t.name.as_str())
    }

    pub fn is_for_team(&self, team_name: &str) -> bool {
        self.team_name() == Some(team_name)
    }
}
