use std::collections::HashMap;

use sqlx::PgPool;

use crate::db::models::Question;
use crate::repositories;
use crate::repositories::answers::QuestionTallyRow;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScoreSummary {
    pub(crate) total_attempts: usize,
    pub(crate) average_score: f64,
    pub(crate) highest_score: f64,
    pub(crate) lowest_score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct QuestionStats {
    pub(crate) question_id: String,
    pub(crate) position: i32,
    pub(crate) question_text: String,
    pub(crate) correct: i64,
    pub(crate) incorrect: i64,
    pub(crate) success_rate: f64,
}

#[derive(Debug, Clone)]
pub(crate) struct QuizStats {
    pub(crate) summary: ScoreSummary,
    pub(crate) questions: Vec<QuestionStats>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct QuizStatus {
    pub(crate) total_attempts: i64,
    pub(crate) completed_attempts: i64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// All zeros when nobody has attempted the quiz yet.
pub(crate) fn summarize_scores(scores: &[f64]) -> ScoreSummary {
    if scores.is_empty() {
        return ScoreSummary {
            total_attempts: 0,
            average_score: 0.0,
            highest_score: 0.0,
            lowest_score: 0.0,
        };
    }

    let total: f64 = scores.iter().sum();
    ScoreSummary {
        total_attempts: scores.len(),
        average_score: round2(total / scores.len() as f64),
        highest_score: scores.iter().copied().fold(f64::MIN, f64::max),
        lowest_score: scores.iter().copied().fold(f64::MAX, f64::min),
    }
}

pub(crate) fn success_rate(correct: i64, answered: i64) -> f64 {
    if answered <= 0 {
        return 0.0;
    }
    correct as f64 / answered as f64 * 100.0
}

/// Per-question tallies in quiz order; questions nobody answered report zeros.
pub(crate) fn question_stats(
    questions: &[Question],
    tallies: &[QuestionTallyRow],
) -> Vec<QuestionStats> {
    let by_question: HashMap<&str, &QuestionTallyRow> =
        tallies.iter().map(|tally| (tally.question_id.as_str(), tally)).collect();

    questions
        .iter()
        .map(|question| {
            let (correct, answered) = by_question
                .get(question.id.as_str())
                .map(|tally| (tally.correct, tally.total))
                .unwrap_or((0, 0));
            QuestionStats {
                question_id: question.id.clone(),
                position: question.position,
                question_text: question.question_text.clone(),
                correct,
                incorrect: answered - correct,
                success_rate: success_rate(correct, answered),
            }
        })
        .collect()
}

pub(crate) async fn quiz_stats(pool: &PgPool, quiz_id: &str) -> Result<QuizStats, sqlx::Error> {
    let scores = repositories::attempts::scores_by_quiz(pool, quiz_id).await?;
    let questions = repositories::questions::list_by_quiz(pool, quiz_id).await?;
    let tallies = repositories::answers::tallies_by_quiz(pool, quiz_id).await?;

    Ok(QuizStats {
        summary: summarize_scores(&scores),
        questions: question_stats(&questions, &tallies),
    })
}

pub(crate) async fn quiz_status(pool: &PgPool, quiz_id: &str) -> Result<QuizStatus, sqlx::Error> {
    let (total_attempts, completed_attempts) =
        repositories::attempts::count_by_quiz(pool, quiz_id).await?;
    Ok(QuizStatus { total_attempts, completed_attempts })
}
