//! Staff note endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use shared::error::{AppError, ErrorCode};
use shared::models::{Note, NoteCreate, NoteUpdate};

use crate::db::notes;
use crate::state::AppState;
use crate::util::now_millis;
use crate::validation;

use super::{ApiResult, Json, RestaurantFilter};

fn not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::NoteNotFound).with_detail("note_id", id)
}

/// GET /notes?restaurant_id=
pub async fn list_notes(
    State(state): State<AppState>,
    Query(filter): Query<RestaurantFilter>,
) -> ApiResult<Vec<Note>> {
    Ok(Json(notes::list(&state.pool, filter.restaurant_id).await?))
}

/// GET /notes/{id}
pub async fn get_note(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Note> {
    let note = notes::find(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(note))
}

/// POST /notes
pub async fn create_note(
    State(state): State<AppState>,
    Json(data): Json<NoteCreate>,
) -> Result<(StatusCode, Json<Note>), AppError> {
    validation::validate_note_create(&data)?;
    let note = notes::create(&state.pool, &data, now_millis()).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// PATCH /notes/{id}
pub async fn update_note(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(data): Json<NoteUpdate>,
) -> ApiResult<Note> {
    validation::validate_note_update(&data)?;
    let note = notes::update(&state.pool, id, &data, now_millis())
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(note))
}

/// DELETE /notes/{id}
pub async fn delete_note(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    if !notes::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}
