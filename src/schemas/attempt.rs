use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::db::types::OptionLabel;
use crate::repositories::attempts::AttemptOverviewRow;
use crate::schemas::format_primitive;
use crate::schemas::quiz::QuestionOptions;

#[derive(Debug, Deserialize)]
pub(crate) struct AttemptSubmit {
    /// Question id to chosen label.
    #[serde(default)]
    pub(crate) answers: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmitResponse {
    pub(crate) already_attempted: bool,
    pub(crate) attempt_id: String,
    pub(crate) score: Option<f64>,
    pub(crate) correct_count: Option<usize>,
    pub(crate) total_questions: Option<usize>,
    pub(crate) detail: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct AttemptSummaryResponse {
    pub(crate) id: String,
    pub(crate) quiz_id: String,
    pub(crate) quiz_title: String,
    pub(crate) student_id: String,
    pub(crate) student_name: String,
    pub(crate) student_email: String,
    pub(crate) score: f64,
    pub(crate) started_at: String,
    pub(crate) completed_at: Option<String>,
}

impl From<AttemptOverviewRow> for AttemptSummaryResponse {
    fn from(row: AttemptOverviewRow) -> Self {
        Self {
            id: row.id,
            quiz_id: row.quiz_id,
            quiz_title: row.quiz_title,
            student_id: row.student_id,
            student_name: row.student_name,
            student_email: row.student_email,
            score: row.score,
            started_at: format_primitive(row.started_at),
            completed_at: row.completed_at.map(format_primitive),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AnswerDetailResponse {
    pub(crate) question_id: String,
    pub(crate) position: i32,
    pub(crate) question_text: String,
    pub(crate) options: QuestionOptions,
    pub(crate) selected_option: Option<OptionLabel>,
    pub(crate) correct_option: OptionLabel,
    pub(crate) is_correct: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct AttemptResultResponse {
    #[serde(flatten)]
    pub(crate) attempt: AttemptSummaryResponse,
    pub(crate) correct_count: usize,
    pub(crate) total_questions: usize,
    pub(crate) answers: Vec<AnswerDetailResponse>,
}
