use sqlx::{FromRow, PgPool};

use crate::db::models::Answer;
use crate::db::types::OptionLabel;

const COLUMNS: &str = "id, attempt_id, question_id, selected_option, is_correct";

/// Correct and total answer rows for one question.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct QuestionTallyRow {
    pub(crate) question_id: String,
    pub(crate) correct: i64,
    pub(crate) total: i64,
}

pub(crate) struct CreateAnswer<'a> {
    pub id: &'a str,
    pub attempt_id: &'a str,
    pub question_id: &'a str,
    pub selected_option: Option<OptionLabel>,
    pub is_correct: bool,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateAnswer<'_>,
) -> Result<Answer, sqlx::Error> {
    sqlx::query_as::<_, Answer>(&format!(
        "INSERT INTO answers (id, attempt_id, question_id, selected_option, is_correct)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.attempt_id)
    .bind(params.question_id)
    .bind(params.selected_option)
    .bind(params.is_correct)
    .fetch_one(executor)
    .await
}

pub(crate) async fn list_by_attempt(
    pool: &PgPool,
    attempt_id: &str,
) -> Result<Vec<Answer>, sqlx::Error> {
    sqlx::query_as::<_, Answer>(&format!(
        "SELECT {COLUMNS} FROM answers WHERE attempt_id = $1"
    ))
    .bind(attempt_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn tallies_by_quiz(
    pool: &PgPool,
    quiz_id: &str,
) -> Result<Vec<QuestionTallyRow>, sqlx::Error> {
    sqlx::query_as::<_, QuestionTallyRow>(
        "SELECT an.question_id,
                COUNT(*) FILTER (WHERE an.is_correct) AS correct,
                COUNT(*) AS total
         FROM answers an
         JOIN questions qs ON qs.id = an.question_id
         WHERE qs.quiz_id = $1
         GROUP BY an.question_id",
    )
    .bind(quiz_id)
    .fetch_all(pool)
    .await
}
