//! PostgreSQL accreditation repository implementation

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Row};

use crate::domain::accreditation::{
    Accreditation, AccreditationDraft, AccreditationId, AccreditationRepository,
    AccreditationType, AccreditationUpsert,
};
use crate::domain::DomainError;
use crate::infrastructure::storage::is_unique_violation;

const COLUMNS: &str = "id, name, email, type, date, uc_username, wfdf_userid, last_modified_at";

/// PostgreSQL implementation of AccreditationRepository
#[derive(Debug, Clone)]
pub struct PostgresAccreditationRepository {
    pool: PgPool,
}

impl PostgresAccreditationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccreditationRepository for PostgresAccreditationRepository {
    async fn get(&self, id: AccreditationId) -> Result<Option<Accreditation>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM accreditations WHERE id = $1", COLUMNS))
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get accreditation: {}", e)))?;

        row.as_ref().map(row_to_accreditation).transpose()
    }

    async fn find_by_emails(&self, emails: &[String]) -> Result<Vec<Accreditation>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM accreditations WHERE email = ANY($1) ORDER BY id",
            COLUMNS
        ))
        .bind(emails)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to find accreditations: {}", e)))?;

        rows.iter().map(row_to_accreditation).collect()
    }

    async fn find_valid(
        &self,
        emails: &[String],
        valid_after: NaiveDate,
    ) -> Result<Vec<Accreditation>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM accreditations WHERE email = ANY($1) AND date >= $2 ORDER BY id",
            COLUMNS
        ))
        .bind(emails)
        .bind(valid_after)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::storage(format!("Failed to find valid accreditations: {}", e))
        })?;

        rows.iter().map(row_to_accreditation).collect()
    }

    async fn find_conflicts(
        &self,
        draft: &AccreditationDraft,
        exclude: Option<AccreditationId>,
    ) -> Result<Vec<Accreditation>, DomainError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {} FROM accreditations
            WHERE (email = $1 OR uc_username = $2 OR wfdf_userid = $3)
              AND ($4::BIGINT IS NULL OR id <> $4)
            ORDER BY id
            "#,
            COLUMNS
        ))
        .bind(&draft.email)
        .bind(&draft.uc_username)
        .bind(draft.wfdf_userid)
        .bind(exclude.map(|id| id.value()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to check conflicts: {}", e)))?;

        rows.iter().map(row_to_accreditation).collect()
    }

    async fn save_all(
        &self,
        changes: Vec<AccreditationUpsert>,
    ) -> Result<Vec<Accreditation>, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        let update_sql = format!(
            r#"
            UPDATE accreditations
            SET name = $2, email = $3, type = $4, date = $5, uc_username = $6,
                wfdf_userid = $7, last_modified_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            COLUMNS
        );
        let insert_sql = format!(
            r#"
            INSERT INTO accreditations (name, email, type, date, uc_username, wfdf_userid)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            COLUMNS
        );
        let mut saved = Vec::with_capacity(changes.len());

        for change in changes {
            let draft = &change.draft;

            let query = match change.id {
                Some(id) => sqlx::query(&update_sql).bind(id.value()),
                None => sqlx::query(&insert_sql),
            };

            let row = query
                .bind(&draft.name)
                .bind(&draft.email)
                .bind(draft.kind.as_str())
                .bind(draft.date)
                .bind(&draft.uc_username)
                .bind(draft.wfdf_userid)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| {
                    if is_unique_violation(&e) {
                        DomainError::conflict(format!(
                            "Accreditation for '{}' collides with an existing record",
                            draft.email
                        ))
                    } else {
                        DomainError::storage(format!("Failed to save accreditation: {}", e))
                    }
                })?;

            match row {
                Some(row) => saved.push(row_to_accreditation(&row)?),
                None => {
                    return Err(DomainError::not_found(format!(
                        "Accreditation '{}' not found",
                        change.id.map(|id| id.to_string()).unwrap_or_default()
                    )));
                }
            }
        }

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit accreditations: {}", e)))?;

        Ok(saved)
    }

    async fn list(&self) -> Result<Vec<Accreditation>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM accreditations ORDER BY name, id",
            COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list accreditations: {}", e)))?;

        rows.iter().map(row_to_accreditation).collect()
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accreditations")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count accreditations: {}", e)))?;

        Ok(count as usize)
    }
}

fn row_to_accreditation(row: &sqlx::postgres::PgRow) -> Result<Accreditation, DomainError> {
    let kind: String = row.get("type");
    let kind: AccreditationType = kind
        .parse()
        .map_err(|e| DomainError::storage(format!("Invalid accreditation type in database: {}", e)))?;
    let last_modified_at: DateTime<Utc> = row.get("last_modified_at");

    Ok(Accreditation::from_parts(
        AccreditationId::new(row.get("id")),
        AccreditationDraft {
            name: row.get("name"),
            email: row.get("email"),
            kind,
            date: row.get("date"),
            uc_username: row.get("uc_username"),
            wfdf_userid: row.get("wfdf_userid"),
        },
        last_modified_at,
    ))
}
