//! Lookups shared by the teacher and student routes.

use std::collections::HashMap;

use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::db::models::{Answer, Question, Quiz, Student, Teacher};
use crate::repositories;
use crate::repositories::attempts::AttemptOverviewRow;
use crate::schemas::attempt::{AnswerDetailResponse, AttemptResultResponse, AttemptSummaryResponse};
use crate::schemas::quiz::QuestionOptions;

pub(crate) async fn fetch_quiz(state: &AppState, quiz_id: &str) -> Result<Quiz, ApiError> {
    repositories::quizzes::find_by_id(state.db(), quiz_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch quiz"))?
        .ok_or_else(|| ApiError::NotFound("Quiz not found".to_string()))
}

/// The quiz, provided the teacher created it.
pub(crate) async fn fetch_owned_quiz(
    state: &AppState,
    teacher: &Teacher,
    quiz_id: &str,
) -> Result<Quiz, ApiError> {
    let quiz = fetch_quiz(state, quiz_id).await?;
    if quiz.teacher_id != teacher.id {
        return Err(ApiError::Forbidden("You can only manage your own quizzes"));
    }
    Ok(quiz)
}

/// The quiz, provided it is assigned to the student.
pub(crate) async fn fetch_assigned_quiz(
    state: &AppState,
    student: &Student,
    quiz_id: &str,
) -> Result<Quiz, ApiError> {
    let quiz = fetch_quiz(state, quiz_id).await?;
    let assigned = repositories::assignments::is_assigned(state.db(), &quiz.id, &student.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check quiz assignment"))?;
    if !assigned {
        return Err(ApiError::Forbidden("This quiz is not assigned to you"));
    }
    Ok(quiz)
}

pub(crate) async fn fetch_attempt(
    state: &AppState,
    attempt_id: &str,
) -> Result<AttemptOverviewRow, ApiError> {
    repositories::attempts::find_overview(state.db(), attempt_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch attempt"))?
        .ok_or_else(|| ApiError::NotFound("Attempt not found".to_string()))
}

pub(crate) async fn attempt_result(
    state: &AppState,
    attempt: AttemptOverviewRow,
) -> Result<AttemptResultResponse, ApiError> {
    let questions = repositories::questions::list_by_quiz(state.db(), &attempt.quiz_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load questions"))?;
    let answers = repositories::answers::list_by_attempt(state.db(), &attempt.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load answers"))?;

    let details = answer_details(&questions, &answers);
    let correct_count = details.iter().filter(|detail| detail.is_correct).count();

    Ok(AttemptResultResponse {
        attempt: AttemptSummaryResponse::from(attempt),
        correct_count,
        total_questions: questions.len(),
        answers: details,
    })
}

/// One entry per question in quiz order; questions without a stored answer
/// show up as unanswered.
pub(crate) fn answer_details(
    questions: &[Question],
    answers: &[Answer],
) -> Vec<AnswerDetailResponse> {
    let by_question: HashMap<&str, &Answer> =
        answers.iter().map(|answer| (answer.question_id.as_str(), answer)).collect();

    questions
        .iter()
        .map(|question| {
            let answer = by_question.get(question.id.as_str());
            AnswerDetailResponse {
                question_id: question.id.clone(),
                position: question.position,
                question_text: question.question_text.clone(),
                options: QuestionOptions::from(question),
                selected_option: answer.and_then(|answer| answer.selected_option),
                correct_option: question.correct_option,
                is_correct: answer.is_some_and(|answer| answer.is_correct),
            }
        })
        .collect()
}
