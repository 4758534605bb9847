use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentTeacher;
use crate::api::results;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::attempt::{AttemptResultResponse, AttemptSummaryResponse};
use crate::schemas::quiz::{
    QuestionResponse, QuizCreate, QuizCreatedResponse, QuizDetailResponse, QuizResponse,
    QuizSummaryResponse,
};
use crate::schemas::stats::{QuizStatsResponse, QuizStatusResponse};
use crate::schemas::user::StudentSummary;
use crate::services::quiz_assembly::{self, AssembleQuiz};
use crate::services::statistics;

pub(super) async fn create_quiz(
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
    Json(payload): Json<QuizCreate>,
) -> Result<(StatusCode, Json<QuizCreatedResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let assembled = quiz_assembly::assemble_quiz(
        state.db(),
        AssembleQuiz {
            teacher_id: &teacher.id,
            title: &payload.title,
            difficulty: payload.difficulty,
            time_limit_minutes: payload.time_limit_minutes,
            candidates: &payload.questions,
        },
    )
    .await?;

    tracing::info!(
        teacher_id = %teacher.id,
        quiz_id = %assembled.quiz.id,
        question_count = assembled.questions.len(),
        "Quiz created"
    );

    Ok((
        StatusCode::CREATED,
        Json(QuizCreatedResponse {
            quiz: QuizResponse::from(&assembled.quiz),
            questions: assembled.questions.iter().map(QuestionResponse::from).collect(),
        }),
    ))
}

pub(super) async fn list_quizzes(
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<Vec<QuizSummaryResponse>>, ApiError> {
    let rows = repositories::quizzes::list_by_teacher(state.db(), &teacher.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list quizzes"))?;

    Ok(Json(rows.into_iter().map(QuizSummaryResponse::from).collect()))
}

pub(super) async fn get_quiz(
    Path(quiz_id): Path<String>,
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<QuizDetailResponse>, ApiError> {
    let quiz = results::fetch_owned_quiz(&state, &teacher, &quiz_id).await?;

    let questions = repositories::questions::list_by_quiz(state.db(), &quiz.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load questions"))?;
    let students = repositories::assignments::list_students(state.db(), &quiz.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load assigned students"))?;
    let attempts = repositories::attempts::list_by_quiz(state.db(), &quiz.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load attempts"))?;

    Ok(Json(QuizDetailResponse {
        quiz: QuizResponse::from(&quiz),
        questions: questions.iter().map(QuestionResponse::from).collect(),
        assigned_students: students.iter().map(StudentSummary::from).collect(),
        attempts: attempts.into_iter().map(AttemptSummaryResponse::from).collect(),
    }))
}

pub(super) async fn list_quiz_attempts(
    Path(quiz_id): Path<String>,
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<Vec<AttemptSummaryResponse>>, ApiError> {
    let quiz = results::fetch_owned_quiz(&state, &teacher, &quiz_id).await?;

    let attempts = repositories::attempts::list_by_quiz(state.db(), &quiz.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load attempts"))?;

    Ok(Json(attempts.into_iter().map(AttemptSummaryResponse::from).collect()))
}

pub(super) async fn get_quiz_stats(
    Path(quiz_id): Path<String>,
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<QuizStatsResponse>, ApiError> {
    let quiz = results::fetch_owned_quiz(&state, &teacher, &quiz_id).await?;

    let stats = statistics::quiz_stats(state.db(), &quiz.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to compute quiz statistics"))?;

    Ok(Json(QuizStatsResponse::new(&quiz.id, stats)))
}

pub(super) async fn get_quiz_status(
    Path(quiz_id): Path<String>,
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<QuizStatusResponse>, ApiError> {
    let quiz = results::fetch_owned_quiz(&state, &teacher, &quiz_id).await?;

    let status = statistics::quiz_status(state.db(), &quiz.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load quiz status"))?;

    Ok(Json(QuizStatusResponse::new(&quiz.id, status)))
}

pub(super) async fn get_attempt(
    Path(attempt_id): Path<String>,
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<AttemptResultResponse>, ApiError> {
    let attempt = results::fetch_attempt(&state, &attempt_id).await?;
    results::fetch_owned_quiz(&state, &teacher, &attempt.quiz_id).await?;

    Ok(Json(results::attempt_result(&state, attempt).await?))
}
