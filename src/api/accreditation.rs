//! Team accreditation form endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Local;
use serde::{Deserialize, Serialize};

use super::middleware::RequireUser;
use super::state::AppState;
use super::types::{ApiError, Json};
use crate::domain::accreditation::{Accreditation, FieldError};
use crate::domain::intake::AccreditationFormRow;
use crate::infrastructure::services::{AccreditationForm, SubmissionOutcome};

/// Submitted form rows, existing records first as they were served
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub rows: Vec<AccreditationFormRow>,
}

#[derive(Debug, Serialize)]
pub struct SavedResponse {
    pub saved: Vec<Accreditation>,
    pub form: AccreditationForm,
}

/// 422 body: every field error plus the rows as submitted
#[derive(Debug, Serialize)]
pub struct RejectedResponse {
    pub errors: Vec<FieldError>,
    pub rows: Vec<AccreditationFormRow>,
}

/// GET /events/{event_id}/teams/{team}/accreditation
pub async fn get_form(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path((event_id, team)): Path<(i64, String)>,
) -> Result<Json<AccreditationForm>, ApiError> {
    let form = state
        .accreditation_service
        .form(event_id, &team, &user)
        .await?;

    Ok(Json(form))
}

/// POST /events/{event_id}/teams/{team}/accreditation
pub async fn submit_form(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path((event_id, team)): Path<(i64, String)>,
    Json(request): Json<SubmitRequest>,
) -> Result<Response, ApiError> {
    let today = Local::now().date_naive();

    let outcome = state
        .accreditation_service
        .submit(event_id, &team, &user, request.rows, today)
        .await?;

    Ok(match outcome {
        SubmissionOutcome::Saved { saved, form } => {
            (StatusCode::OK, Json(SavedResponse { saved, form })).into_response()
        }
        SubmissionOutcome::Rejected { errors, rows } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(RejectedResponse {
                errors: errors.errors,
                rows,
            }),
        )
            .into_response(),
    })
}
