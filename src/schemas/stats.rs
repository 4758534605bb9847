use serde::Serialize;

use crate::services::statistics::{QuestionStats, QuizStats, QuizStatus};

#[derive(Debug, Serialize)]
pub(crate) struct QuestionStatsResponse {
    pub(crate) question_id: String,
    pub(crate) position: i32,
    pub(crate) question_text: String,
    pub(crate) correct: i64,
    pub(crate) incorrect: i64,
    pub(crate) success_rate: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuizStatsResponse {
    pub(crate) quiz_id: String,
    pub(crate) total_attempts: usize,
    pub(crate) average_score: f64,
    pub(crate) highest_score: f64,
    pub(crate) lowest_score: f64,
    pub(crate) questions: Vec<QuestionStatsResponse>,
}

impl QuizStatsResponse {
    pub(crate) fn new(quiz_id: &str, stats: QuizStats) -> Self {
        Self {
            quiz_id: quiz_id.to_string(),
            total_attempts: stats.summary.total_attempts,
            average_score: stats.summary.average_score,
            highest_score: stats.summary.highest_score,
            lowest_score: stats.summary.lowest_score,
            questions: stats.questions.into_iter().map(QuestionStatsResponse::from).collect(),
        }
    }
}

impl From<QuestionStats> for QuestionStatsResponse {
    fn from(stats: QuestionStats) -> Self {
        Self {
            question_id: stats.question_id,
            position: stats.position,
            question_text: stats.question_text,
            correct: stats.correct,
            incorrect: stats.incorrect,
            success_rate: stats.success_rate,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct QuizStatusResponse {
    pub(crate) quiz_id: String,
    pub(crate) total_attempts: i64,
    pub(crate) completed_attempts: i64,
    pub(crate) is_active: bool,
}

impl QuizStatusResponse {
    pub(crate) fn new(quiz_id: &str, status: QuizStatus) -> Self {
        Self {
            quiz_id: quiz_id.to_string(),
            total_attempts: status.total_attempts,
            completed_attempts: status.completed_attempts,
            is_active: true,
        }
    }
}
