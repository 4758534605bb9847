use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::core::time::{primitive_now_utc, seconds_between};
use crate::db::models::{Quiz, QuizStart};
use crate::repositories;

/// Seconds left on the advisory timer. Without a start record the full
/// limit is reported; a finished quiz has none left.
pub(crate) fn remaining_seconds(
    time_limit_minutes: i32,
    started_at: Option<PrimitiveDateTime>,
    now: PrimitiveDateTime,
    already_attempted: bool,
) -> i64 {
    if already_attempted {
        return 0;
    }

    let limit = i64::from(time_limit_minutes.max(0)) * 60;
    match started_at {
        None => limit,
        Some(started_at) => {
            let elapsed = seconds_between(started_at, now).max(0);
            (limit - elapsed).max(0)
        }
    }
}

pub(crate) async fn time_remaining(
    pool: &PgPool,
    quiz: &Quiz,
    student_id: &str,
) -> Result<i64, sqlx::Error> {
    let attempted =
        repositories::attempts::find_by_student_and_quiz(pool, student_id, &quiz.id).await?;
    let start = repositories::quiz_starts::find(pool, student_id, &quiz.id).await?;

    Ok(remaining_seconds(
        quiz.time_limit_minutes,
        start.map(|start| start.started_at),
        primitive_now_utc(),
        attempted.is_some(),
    ))
}

/// Records the first time the student opened the quiz; later calls keep it.
pub(crate) async fn start_quiz(
    pool: &PgPool,
    quiz: &Quiz,
    student_id: &str,
) -> Result<QuizStart, sqlx::Error> {
    let start =
        repositories::quiz_starts::record(pool, student_id, &quiz.id, primitive_now_utc()).await?;
    tracing::info!(quiz_id = %quiz.id, student_id, started_at = %start.started_at, "Quiz started");
    Ok(start)
}
