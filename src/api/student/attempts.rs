use axum::{
    extract::{Path, State},
    Json,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentStudent;
use crate::api::results;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::attempt::{AttemptResultResponse, AttemptSummaryResponse};

pub(super) async fn list_attempts(
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<Vec<AttemptSummaryResponse>>, ApiError> {
    let attempts = repositories::attempts::list_by_student(state.db(), &student.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list attempts"))?;

    Ok(Json(attempts.into_iter().map(AttemptSummaryResponse::from).collect()))
}

pub(super) async fn get_attempt(
    Path(attempt_id): Path<String>,
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<AttemptResultResponse>, ApiError> {
    let attempt = results::fetch_attempt(&state, &attempt_id).await?;
    if attempt.student_id != student.id {
        return Err(ApiError::Forbidden("You can only view your own results"));
    }

    Ok(Json(results::attempt_result(&state, attempt).await?))
}
