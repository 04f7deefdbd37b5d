//! Event listing and event page endpoints

use axum::extract::{Path, State};
use chrono::Local;

use super::middleware::RequireUser;
use super::state::AppState;
use super::types::{ApiError, Json};
use crate::infrastructure::services::{EventListing, EventPage};

/// GET /events
pub async fn list_events(State(state): State<AppState>) -> Result<Json<EventListing>, ApiError> {
    let today = Local::now().date_naive();
    let listing = state.event_service.list_events(today).await?;
    Ok(Json(listing))
}

/// GET /events/{event_id}
pub async fn event_page(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(event_id): Path<i64>,
) -> Result<Json<EventPage>, ApiError> {
    let page = state.event_service.event_page(event_id, &user).await?;
    Ok(Json(page))
}
