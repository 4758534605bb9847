use std::collections::HashMap;

use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::core::time::primitive_now_utc;
use crate::db::models::{Attempt, Question};
use crate::db::types::OptionLabel;
use crate::repositories;

#[derive(Debug, Error)]
pub(crate) enum SubmitError {
    #[error("answer for question {question_id} must be one of a, b, c, d (got {value:?})")]
    InvalidLabel { question_id: String, value: String },
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GradedAnswer {
    pub(crate) question_id: String,
    pub(crate) selected_option: Option<OptionLabel>,
    pub(crate) is_correct: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GradedAttempt {
    pub(crate) answers: Vec<GradedAnswer>,
    pub(crate) correct: usize,
    pub(crate) total: usize,
    pub(crate) score: f64,
}

#[derive(Debug)]
pub(crate) enum SubmitOutcome {
    Recorded { attempt: Attempt, graded: GradedAttempt },
    AlreadyAttempted { attempt_id: String },
}

/// Turns raw form labels into option labels. Blank values mean "not answered";
/// anything else must be exactly one of `a`..`d`.
pub(crate) fn parse_answer_labels(
    raw: &HashMap<String, String>,
) -> Result<HashMap<String, OptionLabel>, SubmitError> {
    let mut parsed = HashMap::with_capacity(raw.len());
    for (question_id, value) in raw {
        if value.trim().is_empty() {
            continue;
        }
        let label = OptionLabel::parse(value).ok_or_else(|| SubmitError::InvalidLabel {
            question_id: question_id.clone(),
            value: value.clone(),
        })?;
        parsed.insert(question_id.clone(), label);
    }
    Ok(parsed)
}

pub(crate) fn score_percent(correct: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    correct as f64 / total as f64 * 100.0
}

/// Grades every question of the quiz; answers for other ids are ignored.
pub(crate) fn grade_answers(
    questions: &[Question],
    answers: &HashMap<String, OptionLabel>,
) -> GradedAttempt {
    let graded: Vec<GradedAnswer> = questions
        .iter()
        .map(|question| {
            let selected_option = answers.get(&question.id).copied();
            GradedAnswer {
                question_id: question.id.clone(),
                selected_option,
                is_correct: selected_option == Some(question.correct_option),
            }
        })
        .collect();

    let correct = graded.iter().filter(|answer| answer.is_correct).count();
    let total = graded.len();

    GradedAttempt { answers: graded, correct, total, score: score_percent(correct, total) }
}

/// Grades and stores the student's single attempt at a quiz.
pub(crate) async fn submit_attempt(
    pool: &PgPool,
    quiz_id: &str,
    student_id: &str,
    answers: &HashMap<String, OptionLabel>,
) -> Result<SubmitOutcome, SubmitError> {
    let mut tx = pool.begin().await?;

    if let Some(existing) =
        repositories::attempts::find_by_student_and_quiz(&mut *tx, student_id, quiz_id).await?
    {
        return Ok(SubmitOutcome::AlreadyAttempted { attempt_id: existing.id });
    }

    let questions = repositories::questions::list_by_quiz(&mut *tx, quiz_id).await?;
    let graded = grade_answers(&questions, answers);

    let now = primitive_now_utc();
    let started_at = repositories::quiz_starts::find(&mut *tx, student_id, quiz_id)
        .await?
        .map(|start| start.started_at)
        .unwrap_or(now);

    let attempt_id = Uuid::new_v4().to_string();
    let inserted = repositories::attempts::insert_if_absent(
        &mut *tx,
        repositories::attempts::CreateAttempt {
            id: &attempt_id,
            student_id,
            quiz_id,
            score: graded.score,
            started_at,
            completed_at: now,
        },
    )
    .await?;

    let Some(attempt) = inserted else {
        tx.rollback().await?;
        let winner =
            repositories::attempts::find_by_student_and_quiz(pool, student_id, quiz_id)
                .await?
                .ok_or(sqlx::Error::RowNotFound)?;
        tracing::info!(
            quiz_id,
            student_id,
            attempt_id = %winner.id,
            "Concurrent attempt lost the race"
        );
        return Ok(SubmitOutcome::AlreadyAttempted { attempt_id: winner.id });
    };

    for answer in &graded.answers {
        repositories::answers::create(
            &mut *tx,
            repositories::answers::CreateAnswer {
                id: &Uuid::new_v4().to_string(),
                attempt_id: &attempt.id,
                question_id: &answer.question_id,
                selected_option: answer.selected_option,
                is_correct: answer.is_correct,
            },
        )
        .await?;
    }

    tx.commit().await?;

    metrics::counter!("quiz_attempts_total").increment(1);
    tracing::info!(
        quiz_id,
        student_id,
        attempt_id = %attempt.id,
        correct = graded.correct,
        total = graded.total,
        score = graded.score,
        "Quiz attempt recorded"
    );

    Ok(SubmitOutcome::Recorded { attempt, graded })
}
