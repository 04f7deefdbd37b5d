//! Accreditation repository trait

use async_trait::async_trait;
use chrono::NaiveDate;
use std::fmt::Debug;

use super::entity::{Accreditation, AccreditationDraft, AccreditationId, AccreditationUpsert};
use crate::domain::DomainError;

/// Repository trait for accreditation storage
///
/// Email, Ultimate Central username and WFDF user ID are each unique across
/// all records.
#[async_trait]
pub trait AccreditationRepository: Send + Sync + Debug {
    /// Get an accreditation by ID
    async fn get(&self, id: AccreditationId) -> Result<Option<Accreditation>, DomainError>;

    /// All records whose email is in `emails`
    async fn find_by_emails(&self, emails: &[String]) -> Result<Vec<Accreditation>, DomainError>;

    /// Records whose email is in `emails` and whose date is on or after `valid_after`
    async fn find_valid(
        &self,
        emails: &[String],
        valid_after: NaiveDate,
    ) -> Result<Vec<Accreditation>, DomainError>;

    /// Records that would collide with `draft` on a unique field, ignoring `exclude`
    async fn find_conflicts(
        &self,
        draft: &AccreditationDraft,
        exclude: Option<AccreditationId>,
    ) -> Result<Vec<Accreditation>, DomainError>;

    /// Apply a batch of inserts and updates; either all are stored or none
    async fn save_all(
        &self,
        changes: Vec<AccreditationUpsert>,
    ) -> Result<Vec<Accreditation>, DomainError>;

    /// List all accreditations ordered by name
    async fn list(&self) -> Result<Vec<Accreditation>, DomainError>;

    async fn count(&self) -> Result<usize, DomainError>;
}
