use sqlx::PgPool;

use crate::db::models::Student;

pub(crate) async fn delete_for_quiz(
    executor: impl sqlx::PgExecutor<'_>,
    quiz_id: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM quiz_assignments WHERE quiz_id = $1")
        .bind(quiz_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

pub(crate) async fn insert_many(
    executor: impl sqlx::PgExecutor<'_>,
    quiz_id: &str,
    student_ids: &[String],
) -> Result<u64, sqlx::Error> {
    if student_ids.is_empty() {
        return Ok(0);
    }

    let result = sqlx::query(
        "INSERT INTO quiz_assignments (quiz_id, student_id)
         SELECT $1, student_id FROM UNNEST($2::varchar[]) AS ids(student_id)
         ON CONFLICT DO NOTHING",
    )
    .bind(quiz_id)
    .bind(student_ids)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

pub(crate) async fn is_assigned(
    pool: &PgPool,
    quiz_id: &str,
    student_id: &str,
) -> Result<bool, sqlx::Error> {
    let found: Option<i32> = sqlx::query_scalar(
        "SELECT 1 FROM quiz_assignments WHERE quiz_id = $1 AND student_id = $2",
    )
    .bind(quiz_id)
    .bind(student_id)
    .fetch_optional(pool)
    .await?;
    Ok(found.is_some())
}

pub(crate) async fn list_students(pool: &PgPool, quiz_id: &str) -> Result<Vec<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(
        "SELECT s.id, s.name, s.email, s.hashed_password, s.created_at
         FROM quiz_assignments qa
         JOIN students s ON s.id = qa.student_id
         WHERE qa.quiz_id = $1
         ORDER BY s.name, s.email",
    )
    .bind(quiz_id)
    .fetch_all(pool)
    .await
}
