//! Accreditation entity and related types

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::validation::AccreditationValidationError;

/// Store-assigned accreditation identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccreditationId(i64);

impl AccreditationId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for AccreditationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Accreditation tier
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub enum AccreditationType {
    #[default]
    Standard,
    Advanced,
}

impl AccreditationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::Advanced => "Advanced",
        }
    }
}

impl fmt::Display for AccreditationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccreditationType {
    type Err = AccreditationValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Standard" => Ok(Self::Standard),
            "Advanced" => Ok(Self::Advanced),
            other => Err(AccreditationValidationError::UnknownType(other.to_string())),
        }
    }
}

/// Field values for an accreditation, before the store assigns an ID
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct AccreditationDraft {
    #[validate(length(min = 1, max = 100, message = "Please enter a name"))]
    pub name: String,
    #[validate(
        email(message = "Enter a valid email address."),
        length(max = 254, message = "Email address is too long")
    )]
    pub email: String,
    #[serde(rename = "type")]
    pub kind: AccreditationType,
    pub date: NaiveDate,
    #[validate(length(
        min = 1,
        max = 50,
        message = "Please enter the Ultimate Central username"
    ))]
    pub uc_username: String,
    #[validate(range(min = 0, message = "Please enter valid ID"))]
    pub wfdf_userid: i64,
}

/// Insert (no ID) or update (existing ID) of one accreditation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccreditationUpsert {
    pub id: Option<AccreditationId>,
    pub draft: AccreditationDraft,
}

impl AccreditationUpsert {
    pub fn insert(draft: AccreditationDraft) -> Self {
        Self { id: None, draft }
    }

    pub fn update(id: AccreditationId, draft: AccreditationDraft) -> Self {
        Self { id: Some(id), draft }
    }
}

/// Stored accreditation record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accreditation {
    id: AccreditationId,
    name: String,
    email: String,
    #[serde(rename = "type")]
    kind: AccreditationType,
    date: NaiveDate,
    uc_username: String,
    wfdf_userid: i64,
    last_modified_at: DateTime<Utc>,
}

impl Accreditation {
    /// Materialize a record from its stored parts
    pub fn from_parts(
        id: AccreditationId,
        draft: AccreditationDraft,
        last_modified_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: draft.name,
            email: draft.email,
            kind: draft.kind,
            date: draft.date,
            uc_username: draft.uc_username,
            wfdf_userid: draft.wfdf_userid,
            last_modified_at,
        }
    }

    pub fn id(&self) -> AccreditationId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn kind(&self) -> AccreditationType {
        self.kind
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn uc_username(&self) -> &str {
        &self.uc_username
    }

    pub fn wfdf_userid(&self) -> i64 {
        self.wfdf_userid
    }

    pub fn last_modified_at(&self) -> DateTime<Utc> {
        self.last_modified_at
    }

    /// Current field values, e.g. to pre-fill an edit form
    pub fn to_draft(&self) -> AccreditationDraft {
        AccreditationDraft {
            name: self.name.clone(),
            email: self.email.clone(),
            kind: self.kind,
            date: self.date,
            uc_username: self.uc_username.clone(),
            wfdf_userid: self.wfdf_userid,
        }
    }

    /// Whether another draft would collide with this record on a unique field
    pub fn conflicts_with(&self, draft: &AccreditationDraft) -> bool {
        self.email == draft.email
            || self.uc_username == draft.uc_username
            || self.wfdf_userid == draft.wfdf_userid
    }
}

impl fmt::Display for Accreditation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - ({}:{})", self.name, self.kind, self.date)
    }
}
