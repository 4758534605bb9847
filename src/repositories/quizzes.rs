use sqlx::{FromRow, PgPool};
use time::PrimitiveDateTime;

use crate::db::models::Quiz;
use crate::db::types::DifficultyLevel;

pub(crate) const COLUMNS: &str = "id, teacher_id, title, difficulty, time_limit_minutes, created_at";

/// Quiz row with the counters shown on list pages.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct QuizSummaryRow {
    pub(crate) id: String,
    pub(crate) teacher_id: String,
    pub(crate) title: String,
    pub(crate) difficulty: DifficultyLevel,
    pub(crate) time_limit_minutes: i32,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) question_count: i64,
    pub(crate) assigned_count: i64,
    pub(crate) attempt_count: i64,
}

/// Quiz assigned to a student, with that student's attempt if one exists.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct AssignedQuizRow {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) difficulty: DifficultyLevel,
    pub(crate) time_limit_minutes: i32,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) teacher_name: String,
    pub(crate) question_count: i64,
    pub(crate) attempt_id: Option<String>,
    pub(crate) score: Option<f64>,
}

pub(crate) struct CreateQuiz<'a> {
    pub id: &'a str,
    pub teacher_id: &'a str,
    pub title: &'a str,
    pub difficulty: DifficultyLevel,
    pub time_limit_minutes: i32,
    pub created_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateQuiz<'_>,
) -> Result<Quiz, sqlx::Error> {
    sqlx::query_as::<_, Quiz>(&format!(
        "INSERT INTO quizzes (id, teacher_id, title, difficulty, time_limit_minutes, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.teacher_id)
    .bind(params.title)
    .bind(params.difficulty)
    .bind(params.time_limit_minutes)
    .bind(params.created_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Quiz>, sqlx::Error> {
    sqlx::query_as::<_, Quiz>(&format!("SELECT {COLUMNS} FROM quizzes WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_by_teacher(
    pool: &PgPool,
    teacher_id: &str,
) -> Result<Vec<QuizSummaryRow>, sqlx::Error> {
    sqlx::query_as::<_, QuizSummaryRow>(
        "SELECT q.id, q.teacher_id, q.title, q.difficulty, q.time_limit_minutes, q.created_at,
                (SELECT COUNT(*) FROM questions qs WHERE qs.quiz_id = q.id) AS question_count,
                (SELECT COUNT(*) FROM quiz_assignments qa WHERE qa.quiz_id = q.id) AS assigned_count,
                (SELECT COUNT(*) FROM attempts a WHERE a.quiz_id = q.id) AS attempt_count
         FROM quizzes q
         WHERE q.teacher_id = $1
         ORDER BY q.created_at DESC, q.id",
    )
    .bind(teacher_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_assigned_to_student(
    pool: &PgPool,
    student_id: &str,
) -> Result<Vec<AssignedQuizRow>, sqlx::Error> {
    sqlx::query_as::<_, AssignedQuizRow>(
        "SELECT q.id, q.title, q.difficulty, q.time_limit_minutes, q.created_at,
                t.name AS teacher_name,
                (SELECT COUNT(*) FROM questions qs WHERE qs.quiz_id = q.id) AS question_count,
                a.id AS attempt_id, a.score
         FROM quiz_assignments qa
         JOIN quizzes q ON q.id = qa.quiz_id
         JOIN teachers t ON t.id = q.teacher_id
         LEFT JOIN attempts a ON a.quiz_id = q.id AND a.student_id = qa.student_id
         WHERE qa.student_id = $1
         ORDER BY q.created_at DESC, q.id",
    )
    .bind(student_id)
    .fetch_all(pool)
    .await
}
