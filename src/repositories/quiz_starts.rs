use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::QuizStart;

/// Inserts the start time unless one is already recorded, then returns the stored row.
pub(crate) async fn record(
    pool: &PgPool,
    student_id: &str,
    quiz_id: &str,
    started_at: PrimitiveDateTime,
) -> Result<QuizStart, sqlx::Error> {
    sqlx::query_as::<_, QuizStart>(
        "INSERT INTO quiz_starts (student_id, quiz_id, started_at)
         VALUES ($1, $2, $3)
         ON CONFLICT (student_id, quiz_id)
         DO UPDATE SET started_at = quiz_starts.started_at
         RETURNING student_id, quiz_id, started_at",
    )
    .bind(student_id)
    .bind(quiz_id)
    .bind(started_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find(
    executor: impl sqlx::PgExecutor<'_>,
    student_id: &str,
    quiz_id: &str,
) -> Result<Option<QuizStart>, sqlx::Error> {
    sqlx::query_as::<_, QuizStart>(
        "SELECT student_id, quiz_id, started_at FROM quiz_starts
         WHERE student_id = $1 AND quiz_id = $2",
    )
    .bind(student_id)
    .bind(quiz_id)
    .fetch_optional(executor)
    .await
}
