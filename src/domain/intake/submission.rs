//! Accreditation form submission

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

use super::roster::RosterPlayer;
use crate::domain::accreditation::{
    field_errors_for_row, parse_accreditation_date, validate_accreditation_date, Accreditation,
    AccreditationDraft, AccreditationId, AccreditationType, AccreditationUpsert,
    AccreditationValidationError, FieldError,
};

/// One row of the accreditation form, as shown and as submitted
///
/// Type and date stay as text so that unparseable input comes back as a
/// field error instead of rejecting the whole request body.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccreditationFormRow {
    pub id: Option<i64>,
    pub name: String,
    pub email: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub date: String,
    pub uc_username: String,
    pub wfdf_userid: Option<i64>,
}

impl AccreditationFormRow {
    /// Blank row for a roster player without a stored record
    pub fn prefilled(player: &RosterPlayer) -> Self {
        Self {
            name: player.name.clone(),
            email: player.email.clone().unwrap_or_default(),
            uc_username: player.uc_username.clone().unwrap_or_default(),
            ..Self::default()
        }
    }

    /// New row where none of the accreditation details were filled in
    pub fn is_untouched(&self) -> bool {
        self.id.is_none()
            && self.kind.trim().is_empty()
            && self.date.trim().is_empty()
            && self.wfdf_userid.is_none()
    }
}

impl From<&Accreditation> for AccreditationFormRow {
    fn from(record: &Accreditation) -> Self {
        Self {
            id: Some(record.id().value()),
            name: record.name().to_string(),
            email: record.email().to_string(),
            kind: record.kind().to_string(),
            date: record.date().format("%Y-%m-%d").to_string(),
            uc_username: record.uc_username().to_string(),
            wfdf_userid: Some(record.wfdf_userid()),
        }
    }
}

/// Field errors for a rejected submission
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("Submission has {} invalid field(s)", .errors.len())]
pub struct FormErrors {
    pub errors: Vec<FieldError>,
}

impl FormErrors {
    pub fn new(mut errors: Vec<FieldError>) -> Self {
        errors.sort_by(|a, b| a.row.cmp(&b.row).then_with(|| a.field.cmp(&b.field)));
        Self { errors }
    }
}

/// A validated change together with its position in the submitted batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRow {
    pub row: usize,
    pub change: AccreditationUpsert,
}

pub fn duplicate_message(field: &str) -> String {
    format!(
        "Please correct the duplicate data for {}, which must be unique.",
        field
    )
}

/// Validate every row and the batch as a whole
///
/// Untouched new rows are skipped. Any error rejects the entire batch.
pub fn validate_submission(
    rows: &[AccreditationFormRow],
    today: NaiveDate,
) -> Result<Vec<ValidatedRow>, FormErrors> {
    let mut errors = Vec::new();
    let mut validated = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        if row.is_untouched() {
            continue;
        }

        match validate_row(index, row, today) {
            Ok(change) => validated.push(ValidatedRow { row: index, change }),
            Err(row_errors) => errors.extend(row_errors),
        }
    }

    errors.extend(batch_duplicates(&validated));

    if errors.is_empty() {
        Ok(validated)
    } else {
        Err(FormErrors::new(errors))
    }
}

fn validate_row(
    row_index: usize,
    row: &AccreditationFormRow,
    today: NaiveDate,
) -> Result<AccreditationUpsert, Vec<FieldError>> {
    let mut errors = Vec::new();
    let field_error = |field: &str, error: AccreditationValidationError| {
        FieldError::new(row_index, field, error.to_string())
    };

    let kind = match row.kind.trim() {
        "" => Err(field_error("type", AccreditationValidationError::Required)),
        raw => raw
            .parse::<AccreditationType>()
            .map_err(|e| field_error("type", e)),
    };

    let date = parse_accreditation_date(&row.date)
        .and_then(|date| validate_accreditation_date(date, today).map(|_| date))
        .map_err(|e| field_error("date", e));

    let wfdf_userid = row
        .wfdf_userid
        .ok_or_else(|| field_error("wfdf_userid", AccreditationValidationError::Required));

    let draft = AccreditationDraft {
        name: row.name.trim().to_string(),
        email: row.email.trim().to_string(),
        kind: kind.clone().unwrap_or_default(),
        date: date.clone().unwrap_or(today),
        uc_username: row.uc_username.trim().to_string(),
        wfdf_userid: wfdf_userid.clone().unwrap_or_default(),
    };

    if let Err(field_errors) = draft.validate() {
        errors.extend(field_errors_for_row(row_index, &field_errors));
    }

    errors.extend(kind.err());
    errors.extend(date.err());
    errors.extend(wfdf_userid.err());

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(match row.id {
        Some(id) => AccreditationUpsert::update(AccreditationId::new(id), draft),
        None => AccreditationUpsert::insert(draft),
    })
}

/// Later rows repeating a unique value already used earlier in the batch
fn batch_duplicates(rows: &[ValidatedRow]) -> Vec<FieldError> {
    let mut seen_ids = HashSet::new();
    let mut seen_emails = HashSet::new();
    let mut seen_usernames = HashSet::new();
    let mut seen_wfdf_ids = HashSet::new();
    let mut errors = Vec::new();

    for ValidatedRow { row, change } in rows {
        let draft = &change.draft;

        if let Some(id) = change.id {
            if !seen_ids.insert(id) {
                errors.push(FieldError::new(*row, "id", duplicate_message("id")));
            }
        }
        if !seen_emails.insert(draft.email.as_str()) {
            errors.push(FieldError::new(*row, "email", duplicate_message("email")));
        }
        if !seen_usernames.insert(draft.uc_username.as_str()) {
            errors.push(FieldError::new(
                *row,
                "uc_username",
                duplicate_message("uc_username"),
            ));
        }
        if !seen_wfdf_ids.insert(draft.wfdf_userid) {
            errors.push(FieldError::new(
                *row,
                "wfdf_userid",
                duplicate_message("wfdf_userid"),
            ));
        }
    }

    errors
}

/// Field errors for collisions between `draft` and records already stored
pub fn conflict_errors(
    row: usize,
    draft: &AccreditationDraft,
    conflicts: &[Accreditation],
) -> Vec<FieldError> {
    let mut errors = Vec::new();
    let mut push = |field: &str, label: &str, clash: bool| {
        if clash && !errors.iter().any(|e: &FieldError| e.field == field) {
            errors.push(FieldError::new(
                row,
                field,
                format!("Accreditation with this {} already exists.", label),
            ));
        }
    };

    for record in conflicts {
        push("email", "Email", record.email() == draft.email);
        push(
            "uc_username",
            "Ultimate Central username",
            record.uc_username() == draft.uc_username,
        );
        push(
            "wfdf_userid",
            "WFDF user ID",
            record.wfdf_userid() == draft.wfdf_userid,
        );
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2019, 9, 1).unwrap()
    }

    fn row(name: &str, email: &str, username: &str, wfdf: i64) -> AccreditationFormRow {
        AccreditationFormRow {
            id: None,
            name: name.to_string(),
            email: email.to_string(),
            kind: "Standard".to_string(),
            date: "2019-06-01".to_string(),
            uc_username: username.to_string(),
            wfdf_userid: Some(wfdf),
        }
    }

    fn fields(errors: &FormErrors) -> Vec<(usize, &str)> {
        errors
            .errors
            .iter()
            .map(|e| (e.row, e.field.as_str()))
            .collect()
    }

    #[test]
    fn test_valid_batch_becomes_inserts_and_updates() {
        let mut update = row("Bo", "bo@x.org", "bo", 2);
        update.id = Some(9);
        update.kind = "Advanced".to_string();

        let validated =
            validate_submission(&[row("Ann", " ann@x.org ", "ann", 1), update], today()).unwrap();

        assert_eq!(validated.len(), 2);
        assert_eq!(validated[0].change.id, None);
        assert_eq!(validated[0].change.draft.email, "ann@x.org");
        assert_eq!(validated[1].change.id, Some(AccreditationId::new(9)));
        assert_eq!(validated[1].change.draft.kind, AccreditationType::Advanced);
    }

    #[test]
    fn test_duplicate_email_rejects_batch() {
        let errors = validate_submission(
            &[
                row("Ann", "same@x.org", "ann", 1),
                row("Bo", "same@x.org", "bo", 2),
            ],
            today(),
        )
        .unwrap_err();

        assert_eq!(fields(&errors), vec![(1, "email")]);
        assert_eq!(
            errors.errors[0].message,
            "Please correct the duplicate data for email, which must be unique."
        );
    }

    #[test]
    fn test_future_date_and_bad_type() {
        let mut bad = row("Ann", "ann@x.org", "ann", 1);
        bad.date = "2019-09-02".to_string();
        bad.kind = "Gold".to_string();

        let errors = validate_submission(&[bad], today()).unwrap_err();

        assert_eq!(fields(&errors), vec![(0, "date"), (0, "type")]);
        assert_eq!(errors.errors[0].message, "Please enter valid accreditation date");
    }

    #[test]
    fn test_field_rules() {
        let mut bad = row("", "not-an-email", "", -3);
        bad.wfdf_userid = Some(-3);

        let errors = validate_submission(&[bad], today()).unwrap_err();

        assert_eq!(
            fields(&errors),
            vec![(0, "email"), (0, "name"), (0, "uc_username"), (0, "wfdf_userid")]
        );
    }

    #[test]
    fn test_missing_wfdf_id_is_required_once() {
        let mut bad = row("Ann", "ann@x.org", "ann", 1);
        bad.wfdf_userid = None;
        bad.kind = "Advanced".to_string();

        let errors = validate_submission(&[bad], today()).unwrap_err();

        assert_eq!(fields(&errors), vec![(0, "wfdf_userid")]);
        assert_eq!(errors.errors[0].message, "This field is required.");
    }

    #[test]
    fn test_untouched_new_rows_are_skipped() {
        let blank = AccreditationFormRow {
            name: "Zed".to_string(),
            email: "zed@x.org".to_string(),
            uc_username: "zed".to_string(),
            ..AccreditationFormRow::default()
        };

        let validated =
            validate_submission(&[blank, row("Ann", "ann@x.org", "ann", 1)], today()).unwrap();

        assert_eq!(validated.len(), 1);
        assert_eq!(validated[0].row, 1);
    }

    #[test]
    fn test_row_deserializes_form_field_names() {
        let row: AccreditationFormRow = serde_json::from_str(
            r#"{"name": "Ann", "email": "ann@x.org", "type": "Advanced",
                "date": "2019-01-01", "uc_username": "ann", "wfdf_userid": 4}"#,
        )
        .unwrap();

        assert_eq!(row.kind, "Advanced");
        assert_eq!(row.id, None);
    }

    #[test]
    fn test_conflict_errors_name_each_clashing_field() {
        let draft = validate_submission(&[row("Ann", "ann@x.org", "ann", 1)], today())
            .unwrap()
            .remove(0)
            .change
            .draft;

        let mut stored = draft.clone();
        stored.email = "other@x.org".to_string();
        let records = vec![
            Accreditation::from_parts(AccreditationId::new(3), stored.clone(), chrono::Utc::now()),
            Accreditation::from_parts(AccreditationId::new(4), stored, chrono::Utc::now()),
        ];

        let errors = conflict_errors(2, &draft, &records);

        assert_eq!(
            errors
                .iter()
                .map(|e| (e.row, e.field.as_str()))
                .collect::<Vec<_>>(),
            vec![(2, "uc_username"), (2, "wfdf_userid")]
        );
        assert_eq!(
            errors[0].message,
            "Accreditation with this Ultimate Central username already exists."
        );
    }
}
