use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentStudent;
use crate::api::results;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::attempt::{AttemptSubmit, SubmitResponse};
use crate::schemas::format_primitive;
use crate::schemas::quiz::{
    AssignedQuizResponse, QuizResponse, QuizStartResponse, StudentQuestionResponse,
    StudentQuizResponse, TimeRemainingResponse,
};
use crate::services::quiz_timing;
use crate::services::scoring::{self, SubmitOutcome};

pub(super) async fn list_assigned_quizzes(
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<Vec<AssignedQuizResponse>>, ApiError> {
    let rows = repositories::quizzes::list_assigned_to_student(state.db(), &student.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list assigned quizzes"))?;

    Ok(Json(rows.into_iter().map(AssignedQuizResponse::from).collect()))
}

pub(super) async fn get_quiz(
    Path(quiz_id): Path<String>,
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<StudentQuizResponse>, ApiError> {
    let quiz = results::fetch_assigned_quiz(&state, &student, &quiz_id).await?;

    let questions = repositories::questions::list_by_quiz(state.db(), &quiz.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load questions"))?;
    let time_remaining = quiz_timing::time_remaining(state.db(), &quiz, &student.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to compute remaining time"))?;

    Ok(Json(StudentQuizResponse {
        quiz: QuizResponse::from(&quiz),
        questions: questions.iter().map(StudentQuestionResponse::from).collect(),
        time_remaining,
    }))
}

pub(super) async fn start_quiz(
    Path(quiz_id): Path<String>,
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<QuizStartResponse>, ApiError> {
    let quiz = results::fetch_assigned_quiz(&state, &student, &quiz_id).await?;

    let attempted =
        repositories::attempts::find_by_student_and_quiz(state.db(), &student.id, &quiz.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to check previous attempt"))?;
    if attempted.is_some() {
        return Err(ApiError::Conflict("You have already attempted this quiz".to_string()));
    }

    let start = quiz_timing::start_quiz(state.db(), &quiz, &student.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start quiz"))?;
    let time_remaining = quiz_timing::remaining_seconds(
        quiz.time_limit_minutes,
        Some(start.started_at),
        primitive_now_utc(),
        false,
    );

    Ok(Json(QuizStartResponse {
        quiz_id: quiz.id,
        started_at: format_primitive(start.started_at),
        time_remaining,
    }))
}

pub(super) async fn get_time_remaining(
    Path(quiz_id): Path<String>,
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<TimeRemainingResponse>, ApiError> {
    let quiz = results::fetch_assigned_quiz(&state, &student, &quiz_id).await?;

    let time_remaining = quiz_timing::time_remaining(state.db(), &quiz, &student.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to compute remaining time"))?;

    Ok(Json(TimeRemainingResponse { quiz_id: quiz.id, time_remaining }))
}

pub(super) async fn submit_attempt(
    Path(quiz_id): Path<String>,
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
    Json(payload): Json<AttemptSubmit>,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    let quiz = results::fetch_assigned_quiz(&state, &student, &quiz_id).await?;

    // A repeat submission is answered with the stored attempt, whatever it carries.
    let existing =
        repositories::attempts::find_by_student_and_quiz(state.db(), &student.id, &quiz.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to check previous attempt"))?;
    if let Some(existing) = existing {
        return Ok(already_attempted(existing.id));
    }

    let answers = scoring::parse_answer_labels(&payload.answers)?;
    let outcome = scoring::submit_attempt(state.db(), &quiz.id, &student.id, &answers).await?;

    match outcome {
        SubmitOutcome::Recorded { attempt, graded } => Ok((
            StatusCode::CREATED,
            Json(SubmitResponse {
                already_attempted: false,
                attempt_id: attempt.id,
                score: Some(graded.score),
                correct_count: Some(graded.correct),
                total_questions: Some(graded.total),
                detail: "Attempt recorded".to_string(),
            }),
        )),
        SubmitOutcome::AlreadyAttempted { attempt_id } => Ok(already_attempted(attempt_id)),
    }
}

fn already_attempted(attempt_id: String) -> (StatusCode, Json<SubmitResponse>) {
    (
        StatusCode::OK,
        Json(SubmitResponse {
            already_attempted: true,
            attempt_id,
            score: None,
            correct_count: None,
            total_questions: None,
            detail: "You have already attempted this quiz".to_string(),
        }),
    )
}
