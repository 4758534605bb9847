use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::models::{Question, Quiz};
use crate::db::types::{DifficultyLevel, OptionLabel};
use crate::repositories::quizzes::{AssignedQuizRow, QuizSummaryRow};
use crate::schemas::attempt::AttemptSummaryResponse;
use crate::schemas::format_primitive;
use crate::schemas::user::StudentSummary;
use crate::services::question_source::{CandidateBatch, CandidateOrigin, CandidateQuestion};

fn default_difficulty() -> DifficultyLevel {
    DifficultyLevel::Medium
}

fn default_question_count() -> u32 {
    5
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct GenerateFromText {
    #[serde(alias = "textContent")]
    #[validate(length(min = 1, message = "text_content must not be empty"))]
    pub(crate) text_content: String,
    #[serde(default = "default_difficulty")]
    pub(crate) difficulty: DifficultyLevel,
    #[serde(default = "default_question_count")]
    #[serde(alias = "questionCount")]
    #[validate(range(min = 1, message = "question_count must be at least 1"))]
    pub(crate) question_count: u32,
}

/// Settings sent next to the file in a multipart generation request.
#[derive(Debug, Validate)]
pub(crate) struct GenerateFromFile {
    pub(crate) difficulty: DifficultyLevel,
    #[validate(range(min = 1, message = "question_count must be at least 1"))]
    pub(crate) question_count: u32,
}

impl Default for GenerateFromFile {
    fn default() -> Self {
        Self { difficulty: default_difficulty(), question_count: default_question_count() }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CandidateListResponse {
    pub(crate) origin: CandidateOrigin,
    pub(crate) question_count: usize,
    pub(crate) questions: Vec<CandidateQuestion>,
}

impl From<CandidateBatch> for CandidateListResponse {
    fn from(batch: CandidateBatch) -> Self {
        Self {
            origin: batch.origin,
            question_count: batch.questions.len(),
            questions: batch.questions,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuizCreate {
    #[validate(length(min = 1, max = 200, message = "title must be between 1 and 200 characters"))]
    pub(crate) title: String,
    #[serde(default = "default_difficulty")]
    pub(crate) difficulty: DifficultyLevel,
    #[serde(alias = "timeLimit", alias = "time_limit", alias = "timeLimitMinutes")]
    #[validate(range(min = 1, max = 1440, message = "time_limit_minutes must be between 1 and 1440"))]
    pub(crate) time_limit_minutes: i32,
    #[serde(default)]
    pub(crate) questions: Vec<CandidateQuestion>,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuizResponse {
    pub(crate) id: String,
    pub(crate) teacher_id: String,
    pub(crate) title: String,
    pub(crate) difficulty: DifficultyLevel,
    pub(crate) time_limit_minutes: i32,
    pub(crate) created_at: String,
}

impl From<&Quiz> for QuizResponse {
    fn from(quiz: &Quiz) -> Self {
        Self {
            id: quiz.id.clone(),
            teacher_id: quiz.teacher_id.clone(),
            title: quiz.title.clone(),
            difficulty: quiz.difficulty,
            time_limit_minutes: quiz.time_limit_minutes,
            created_at: format_primitive(quiz.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionOptions {
    pub(crate) a: String,
    pub(crate) b: String,
    pub(crate) c: String,
    pub(crate) d: String,
}

impl From<&Question> for QuestionOptions {
    fn from(question: &Question) -> Self {
        Self {
            a: question.option_a.clone(),
            b: question.option_b.clone(),
            c: question.option_c.clone(),
            d: question.option_d.clone(),
        }
    }
}

/// Question as the owning teacher sees it, answer included.
#[derive(Debug, Serialize)]
pub(crate) struct QuestionResponse {
    pub(crate) id: String,
    pub(crate) position: i32,
    pub(crate) question_text: String,
    pub(crate) options: QuestionOptions,
    pub(crate) correct_option: OptionLabel,
}

impl From<&Question> for QuestionResponse {
    fn from(question: &Question) -> Self {
        Self {
            id: question.id.clone(),
            position: question.position,
            question_text: question.question_text.clone(),
            options: QuestionOptions::from(question),
            correct_option: question.correct_option,
        }
    }
}

/// Question as shown to a student taking the quiz.
#[derive(Debug, Serialize)]
pub(crate) struct StudentQuestionResponse {
    pub(crate) id: String,
    pub(crate) position: i32,
    pub(crate) question_text: String,
    pub(crate) options: QuestionOptions,
}

impl From<&Question> for StudentQuestionResponse {
    fn from(question: &Question) -> Self {
        Self {
            id: question.id.clone(),
            position: question.position,
            question_text: question.question_text.clone(),
            options: QuestionOptions::from(question),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct QuizCreatedResponse {
    #[serde(flatten)]
    pub(crate) quiz: QuizResponse,
    pub(crate) questions: Vec<QuestionResponse>,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuizSummaryResponse {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) difficulty: DifficultyLevel,
    pub(crate) time_limit_minutes: i32,
    pub(crate) created_at: String,
    pub(crate) question_count: i64,
    pub(crate) assigned_count: i64,
    pub(crate) attempt_count: i64,
}

impl From<QuizSummaryRow> for QuizSummaryResponse {
    fn from(row: QuizSummaryRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            difficulty: row.difficulty,
            time_limit_minutes: row.time_limit_minutes,
            created_at: format_primitive(row.created_at),
            question_count: row.question_count,
            assigned_count: row.assigned_count,
            attempt_count: row.attempt_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct QuizDetailResponse {
    #[serde(flatten)]
    pub(crate) quiz: QuizResponse,
    pub(crate) questions: Vec<QuestionResponse>,
    pub(crate) assigned_students: Vec<StudentSummary>,
    pub(crate) attempts: Vec<AttemptSummaryResponse>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AssignedQuizResponse {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) difficulty: DifficultyLevel,
    pub(crate) time_limit_minutes: i32,
    pub(crate) created_at: String,
    pub(crate) teacher_name: String,
    pub(crate) question_count: i64,
    pub(crate) attempted: bool,
    pub(crate) attempt_id: Option<String>,
    pub(crate) score: Option<f64>,
}

impl From<AssignedQuizRow> for AssignedQuizResponse {
    fn from(row: AssignedQuizRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            difficulty: row.difficulty,
            time_limit_minutes: row.time_limit_minutes,
            created_at: format_primitive(row.created_at),
            teacher_name: row.teacher_name,
            question_count: row.question_count,
            attempted: row.attempt_id.is_some(),
            attempt_id: row.attempt_id,
            score: row.score,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct StudentQuizResponse {
    #[serde(flatten)]
    pub(crate) quiz: QuizResponse,
    pub(crate) questions: Vec<StudentQuestionResponse>,
    pub(crate) time_remaining: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssignmentsUpdate {
    #[serde(default)]
    #[serde(alias = "studentIds")]
    pub(crate) student_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AssignmentsResponse {
    pub(crate) quiz_id: String,
    pub(crate) students: Vec<StudentSummary>,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuizStartResponse {
    pub(crate) quiz_id: String,
    pub(crate) started_at: String,
    pub(crate) time_remaining: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct TimeRemainingResponse {
    pub(crate) quiz_id: String,
    pub(crate) time_remaining: i64,
}
