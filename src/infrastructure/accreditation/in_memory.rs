//! In-memory accreditation repository

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;

use crate::domain::accreditation::{
    is_valid_since, Accreditation, AccreditationDraft, AccreditationId, AccreditationRepository,
    AccreditationUpsert,
};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct State {
    records: BTreeMap<AccreditationId, Accreditation>,
    next_id: i64,
}

impl State {
    fn conflicts(
        &self,
        draft: &AccreditationDraft,
        exclude: Option<AccreditationId>,
    ) -> Vec<Accreditation> {
        self.records
            .values()
            .filter(|record| Some(record.id()) != exclude && record.conflicts_with(draft))
            .cloned()
            .collect()
    }
}

/// In-memory implementation of AccreditationRepository
///
/// A batch save holds the write lock for its whole duration and is applied
/// to a copy of the map, so a failing change leaves nothing behind.
#[derive(Debug, Default)]
pub struct InMemoryAccreditationRepository {
    state: Arc<RwLock<State>>,
}

impl InMemoryAccreditationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccreditationRepository for InMemoryAccreditationRepository {
    async fn get(&self, id: AccreditationId) -> Result<Option<Accreditation>, DomainError> {
        let state = self.state.read().await;
        Ok(state.records.get(&id).cloned())
    }

    async fn find_by_emails(&self, emails: &[String]) -> Result<Vec<Accreditation>, DomainError> {
        let state = self.state.read().await;

        Ok(state
            .records
            .values()
            .filter(|record| emails.iter().any(|email| email == record.email()))
            .cloned()
            .collect())
    }

    async fn find_valid(
        &self,
        emails: &[String],
        valid_after: NaiveDate,
    ) -> Result<Vec<Accreditation>, DomainError> {
        Ok(self
            .find_by_emails(emails)
            .await?
            .into_iter()
            .filter(|record| is_valid_since(record.date(), valid_after))
            .collect())
    }

    async fn find_conflicts(
        &self,
        draft: &AccreditationDraft,
        exclude: Option<AccreditationId>,
    ) -> Result<Vec<Accreditation>, DomainError> {
        let state = self.state.read().await;
        Ok(state.conflicts(draft, exclude))
    }

    async fn save_all(
        &self,
        changes: Vec<AccreditationUpsert>,
    ) -> Result<Vec<Accreditation>, DomainError> {
        let mut state = self.state.write().await;
        let mut staged = State {
            records: state.records.clone(),
            next_id: state.next_id,
        };
        let now = Utc::now();
        let mut saved = Vec::with_capacity(changes.len());

        for change in changes {
            let id = match change.id {
                Some(id) => {
                    if !staged.records.contains_key(&id) {
                        return Err(DomainError::not_found(format!(
                            "Accreditation '{}' not found",
                            id
                        )));
                    }
                    id
                }
                None => {
                    staged.next_id += 1;
                    AccreditationId::new(staged.next_id)
                }
            };

            if let Some(conflict) = staged.conflicts(&change.draft, Some(id)).first() {
                return Err(DomainError::conflict(format!(
                    "Accreditation for '{}' collides with existing record {}",
                    change.draft.email,
                    conflict.id()
                )));
            }

            let record = Accreditation::from_parts(id, change.draft, now);
            staged.records.insert(id, record.clone());
            saved.push(record);
        }

        *state = staged;
        Ok(saved)
    }

    async fn list(&self) -> Result<Vec<Accreditation>, DomainError> {
        let state = self.state.read().await;
        let mut records: Vec<Accreditation> = state.records.values().cloned().collect();
        records.sort_by(|a, b| a.name().cmp(b.name()).then_with(|| a.id().cmp(&b.id())));
        Ok(records)
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.state.read().await.records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::accreditation::AccreditationType;

    fn draft(name: &str, email: &str, username: &str, wfdf: i64, date: NaiveDate) -> AccreditationDraft {
        AccreditationDraft {
            name: name.to_string(),
            email: email.to_string(),
            kind: AccreditationType::Standard,
            date,
            uc_username: username.to_string(),
            wfdf_userid: wfdf,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_insert_assigns_ids_and_update_keeps_them() {
        let repo = InMemoryAccreditationRepository::new();

        let saved = repo
            .save_all(vec![
                AccreditationUpsert::insert(draft("Ann", "ann@x.org", "ann", 1, date(2019, 1, 1))),
                AccreditationUpsert::insert(draft("Bo", "bo@x.org", "bo", 2, date(2019, 1, 1))),
            ])
            .await
            .unwrap();
        assert_eq!(saved[0].id(), AccreditationId::new(1));
        assert_eq!(saved[1].id(), AccreditationId::new(2));

        let mut changed = saved[0].to_draft();
        changed.kind = AccreditationType::Advanced;
        repo.save_all(vec![AccreditationUpsert::update(saved[0].id(), changed)])
            .await
            .unwrap();

        let ann = repo.get(AccreditationId::new(1)).await.unwrap().unwrap();
        assert_eq!(ann.kind(), AccreditationType::Advanced);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_conflicting_batch_is_not_persisted() {
        let repo = InMemoryAccreditationRepository::new();
        repo.save_all(vec![AccreditationUpsert::insert(draft(
            "Ann", "ann@x.org", "ann", 1, date(2019, 1, 1),
        ))])
        .await
        .unwrap();

        let result = repo
            .save_all(vec![
                AccreditationUpsert::insert(draft("Bo", "bo@x.org", "bo", 2, date(2019, 1, 1))),
                AccreditationUpsert::insert(draft("Cy", "cy@x.org", "ann", 3, date(2019, 1, 1))),
            ])
            .await;

        assert!(matches!(result, Err(DomainError::Conflict { .. })));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_of_unknown_record_fails() {
        let repo = InMemoryAccreditationRepository::new();

        let result = repo
            .save_all(vec![AccreditationUpsert::update(
                AccreditationId::new(9),
                draft("Ann", "ann@x.org", "ann", 1, date(2019, 1, 1)),
            )])
            .await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_find_valid_is_inclusive() {
        let repo = InMemoryAccreditationRepository::new();
        repo.save_all(vec![
            AccreditationUpsert::insert(draft("Ann", "ann@x.org", "ann", 1, date(2018, 3, 22))),
            AccreditationUpsert::insert(draft("Bo", "bo@x.org", "bo", 2, date(2018, 3, 21))),
            AccreditationUpsert::insert(draft("Cy", "cy@x.org", "cy", 3, date(2019, 1, 1))),
        ])
        .await
        .unwrap();

        let emails = vec!["ann@x.org".to_string(), "bo@x.org".to_string()];
        let valid = repo.find_valid(&emails, date(2018, 3, 22)).await.unwrap();

        assert_eq!(valid.len(), 1);
        assert_eq!(valid[0].email(), "ann@x.org");
    }

    #[tokio::test]
    async fn test_find_conflicts_excludes_self() {
        let repo = InMemoryAccreditationRepository::new();
        let saved = repo
            .save_all(vec![AccreditationUpsert::insert(draft(
                "Ann", "ann@x.org", "ann", 1, date(2019, 1, 1),
            ))])
            .await
            .unwrap();

        let same = saved[0].to_draft();
        assert!(repo.find_conflicts(&same, Some(saved[0].id())).await.unwrap().is_empty());
        assert_eq!(repo.find_conflicts(&same, None).await.unwrap().len(), 1);
    }
}
