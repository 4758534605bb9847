use crate::db::models::Question;
use crate::db::types::OptionLabel;

const COLUMNS: &str = "\
    id, quiz_id, position, question_text, option_a, option_b, option_c, option_d, correct_option";

pub(crate) struct CreateQuestion<'a> {
    pub id: &'a str,
    pub quiz_id: &'a str,
    pub position: i32,
    pub question_text: &'a str,
    pub options: [&'a str; 4],
    pub correct_option: OptionLabel,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateQuestion<'_>,
) -> Result<Question, sqlx::Error> {
    let [option_a, option_b, option_c, option_d] = params.options;
    sqlx::query_as::<_, Question>(&format!(
        "INSERT INTO questions (
            id, quiz_id, position, question_text,
            option_a, option_b, option_c, option_d, correct_option
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.quiz_id)
    .bind(params.position)
    .bind(params.question_text)
    .bind(option_a)
    .bind(option_b)
    .bind(option_c)
    .bind(option_d)
    .bind(params.correct_option)
    .fetch_one(executor)
    .await
}

/// Questions of a quiz in their stored order.
pub(crate) async fn list_by_quiz(
    executor: impl sqlx::PgExecutor<'_>,
    quiz_id: &str,
) -> Result<Vec<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {COLUMNS} FROM questions WHERE quiz_id = $1 ORDER BY position"
    ))
    .bind(quiz_id)
    .fetch_all(executor)
    .await
}
