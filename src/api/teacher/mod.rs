mod assignments;
mod generation;
mod quizzes;

use axum::{routing::get, routing::post, Router};

use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/quizzes", post(quizzes::create_quiz).get(quizzes::list_quizzes))
        .route("/quizzes/generate/text", post(generation::generate_from_text))
        .route("/quizzes/generate/file", post(generation::generate_from_file))
        .route("/quizzes/:quiz_id", get(quizzes::get_quiz))
        .route(
            "/quizzes/:quiz_id/assignments",
            get(assignments::list_assignments).put(assignments::replace_assignments),
        )
        .route("/quizzes/:quiz_id/attempts", get(quizzes::list_quiz_attempts))
        .route("/quizzes/:quiz_id/stats", get(quizzes::get_quiz_stats))
        .route("/quizzes/:quiz_id/status", get(quizzes::get_quiz_status))
        .route("/attempts/:attempt_id", get(quizzes::get_attempt))
        .route("/students", get(assignments::list_students))
}

#[cfg(test)]
mod tests;
