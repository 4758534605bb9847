use axum::{
    extract::{Path, State},
    Json,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentTeacher;
use crate::api::results;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::quiz::{AssignmentsResponse, AssignmentsUpdate};
use crate::schemas::user::StudentSummary;
use crate::services::assignments;

pub(super) async fn replace_assignments(
    Path(quiz_id): Path<String>,
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
    Json(payload): Json<AssignmentsUpdate>,
) -> Result<Json<AssignmentsResponse>, ApiError> {
    let quiz = results::fetch_owned_quiz(&state, &teacher, &quiz_id).await?;

    assignments::replace_assignments(state.db(), &quiz.id, &payload.student_ids)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to update quiz assignments"))?;

    assigned_students(&state, quiz.id).await.map(Json)
}

pub(super) async fn list_assignments(
    Path(quiz_id): Path<String>,
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<AssignmentsResponse>, ApiError> {
    let quiz = results::fetch_owned_quiz(&state, &teacher, &quiz_id).await?;
    assigned_students(&state, quiz.id).await.map(Json)
}

pub(super) async fn list_students(
    CurrentTeacher(_teacher): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<Vec<StudentSummary>>, ApiError> {
    let students = repositories::students::list_all(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list students"))?;

    Ok(Json(students.iter().map(StudentSummary::from).collect()))
}

async fn assigned_students(
    state: &AppState,
    quiz_id: String,
) -> Result<AssignmentsResponse, ApiError> {
    let students = repositories::assignments::list_students(state.db(), &quiz_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load assigned students"))?;

    let students = students.iter().map(StudentSummary::from).collect();
    Ok(AssignmentsResponse { quiz_id, students })
}
