use sqlx::{FromRow, PgPool};
use time::PrimitiveDateTime;

use crate::db::models::Attempt;

pub(crate) const COLUMNS: &str = "id, student_id, quiz_id, score, started_at, completed_at";

/// Attempt joined with the names shown next to it.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct AttemptOverviewRow {
    pub(crate) id: String,
    pub(crate) student_id: String,
    pub(crate) student_name: String,
    pub(crate) student_email: String,
    pub(crate) quiz_id: String,
    pub(crate) quiz_title: String,
    pub(crate) score: f64,
    pub(crate) started_at: PrimitiveDateTime,
    pub(crate) completed_at: Option<PrimitiveDateTime>,
}

const OVERVIEW_SELECT: &str = "\
    SELECT a.id, a.student_id, s.name AS student_name, s.email AS student_email, \
           a.quiz_id, q.title AS quiz_title, a.score, a.started_at, a.completed_at \
    FROM attempts a \
    JOIN students s ON s.id = a.student_id \
    JOIN quizzes q ON q.id = a.quiz_id";

pub(crate) struct CreateAttempt<'a> {
    pub id: &'a str,
    pub student_id: &'a str,
    pub quiz_id: &'a str,
    pub score: f64,
    pub started_at: PrimitiveDateTime,
    pub completed_at: PrimitiveDateTime,
}

/// Inserts the attempt unless the student already has one for this quiz.
/// `None` means the unique (student_id, quiz_id) constraint won.
pub(crate) async fn insert_if_absent(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateAttempt<'_>,
) -> Result<Option<Attempt>, sqlx::Error> {
    sqlx::query_as::<_, Attempt>(&format!(
        "INSERT INTO attempts (id, student_id, quiz_id, score, started_at, completed_at)
         VALUES ($1, $2, $3, $4, $5, $6)
         ON CONFLICT (student_id, quiz_id) DO NOTHING
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.student_id)
    .bind(params.quiz_id)
    .bind(params.score)
    .bind(params.started_at)
    .bind(params.completed_at)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn find_by_student_and_quiz(
    executor: impl sqlx::PgExecutor<'_>,
    student_id: &str,
    quiz_id: &str,
) -> Result<Option<Attempt>, sqlx::Error> {
    sqlx::query_as::<_, Attempt>(&format!(
        "SELECT {COLUMNS} FROM attempts WHERE student_id = $1 AND quiz_id = $2"
    ))
    .bind(student_id)
    .bind(quiz_id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn find_overview(
    pool: &PgPool,
    attempt_id: &str,
) -> Result<Option<AttemptOverviewRow>, sqlx::Error> {
    sqlx::query_as::<_, AttemptOverviewRow>(&format!("{OVERVIEW_SELECT} WHERE a.id = $1"))
        .bind(attempt_id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_by_quiz(
    pool: &PgPool,
    quiz_id: &str,
) -> Result<Vec<AttemptOverviewRow>, sqlx::Error> {
    sqlx::query_as::<_, AttemptOverviewRow>(&format!(
        "{OVERVIEW_SELECT} WHERE a.quiz_id = $1 ORDER BY a.completed_at DESC NULLS LAST, a.id"
    ))
    .bind(quiz_id)
    .fetch_all(pool)
    .await
}

/// A student's attempts, newest first.
pub(crate) async fn list_by_student(
    pool: &PgPool,
    student_id: &str,
) -> Result<Vec<AttemptOverviewRow>, sqlx::Error> {
    sqlx::query_as::<_, AttemptOverviewRow>(&format!(
        "{OVERVIEW_SELECT} WHERE a.student_id = $1 ORDER BY a.completed_at DESC NULLS LAST, a.id"
    ))
    .bind(student_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn scores_by_quiz(pool: &PgPool, quiz_id: &str) -> Result<Vec<f64>, sqlx::Error> {
    sqlx::query_scalar::<_, f64>("SELECT score FROM attempts WHERE quiz_id = $1")
        .bind(quiz_id)
        .fetch_all(pool)
        .await
}

/// (total, completed) attempt counts for a quiz.
pub(crate) async fn count_by_quiz(pool: &PgPool, quiz_id: &str) -> Result<(i64, i64), sqlx::Error> {
    sqlx::query_as::<_, (i64, i64)>(
        "SELECT COUNT(*), COUNT(completed_at) FROM attempts WHERE quiz_id = $1",
    )
    .bind(quiz_id)
    .fetch_one(pool)
    .await
}
