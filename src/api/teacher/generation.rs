use axum::{
    extract::{Multipart, State},
    Json,
};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentTeacher;
use crate::api::validation::{validate_question_count, validate_source_upload};
use crate::core::redis::RateLimitScope;
use crate::core::state::AppState;
use crate::db::models::Teacher;
use crate::db::types::DifficultyLevel;
use crate::schemas::quiz::{CandidateListResponse, GenerateFromFile, GenerateFromText};

pub(super) async fn generate_from_text(
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
    Json(payload): Json<GenerateFromText>,
) -> Result<Json<CandidateListResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    if payload.text_content.trim().is_empty() {
        return Err(ApiError::BadRequest("text_content must not be empty".to_string()));
    }
    let max_questions = state.settings().quiz().max_generated_questions;
    validate_question_count(payload.question_count, max_questions)?;
    check_generation_rate(&state, &teacher).await?;

    let batch = state
        .questions()
        .from_text(&payload.text_content, payload.question_count, payload.difficulty)
        .await;

    tracing::info!(
        teacher_id = %teacher.id,
        origin = batch.origin.as_str(),
        question_count = batch.questions.len(),
        "Generated candidate questions from text"
    );

    Ok(Json(CandidateListResponse::from(batch)))
}

pub(super) async fn generate_from_file(
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<CandidateListResponse>, ApiError> {
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut filename: Option<String> = None;
    let mut params = GenerateFromFile::default();
    let max_bytes = state.settings().storage().max_upload_bytes();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::BadRequest("Invalid multipart data".to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                filename = field.file_name().map(|s| s.to_string());
                let mut bytes = Vec::new();
                while let Some(chunk) = field
                    .chunk()
                    .await
                    .map_err(|_| ApiError::BadRequest("Failed to read file".to_string()))?
                {
                    if bytes.len() + chunk.len() > max_bytes {
                        return Err(ApiError::BadRequest(format!(
                            "File size exceeds {}MB limit",
                            state.settings().storage().max_upload_size_mb
                        )));
                    }
                    bytes.extend_from_slice(&chunk);
                }
                file_bytes = Some(bytes);
            }
            "difficulty" => {
                let text = field
                    .text()
                    .await
                    .map_err(|_| ApiError::BadRequest("Invalid difficulty".to_string()))?;
                params.difficulty = DifficultyLevel::parse(&text).ok_or_else(|| {
                    ApiError::BadRequest("difficulty must be one of easy, medium, hard".to_string())
                })?;
            }
            "question_count" => {
                let text = field
                    .text()
                    .await
                    .map_err(|_| ApiError::BadRequest("Invalid question count".to_string()))?;
                params.question_count = text.trim().parse::<u32>().map_err(|_| {
                    ApiError::BadRequest("question_count must be a valid integer".to_string())
                })?;
            }
            _ => {}
        }
    }

    let file_bytes =
        file_bytes.ok_or_else(|| ApiError::BadRequest("File is required".to_string()))?;
    let filename =
        filename.ok_or_else(|| ApiError::BadRequest("File name is required".to_string()))?;

    validate_source_upload(&filename, state.settings().storage())?;
    params.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let max_questions = state.settings().quiz().max_generated_questions;
    validate_question_count(params.question_count, max_questions)?;
    check_generation_rate(&state, &teacher).await?;

    let batch = state
        .questions()
        .from_file(&filename, &file_bytes, params.question_count, params.difficulty)
        .await;

    tracing::info!(
        teacher_id = %teacher.id,
        filename = %filename,
        size_bytes = file_bytes.len(),
        origin = batch.origin.as_str(),
        question_count = batch.questions.len(),
        "Generated candidate questions from file"
    );

    Ok(Json(CandidateListResponse::from(batch)))
}

async fn check_generation_rate(state: &AppState, teacher: &Teacher) -> Result<(), ApiError> {
    let per_minute = state.settings().security().generation_rate_limit_per_minute;
    if state.redis().allow(RateLimitScope::Generate, &teacher.id, per_minute).await {
        Ok(())
    } else {
        Err(ApiError::TooManyRequests("Too many generation requests, try again later"))
    }
}
