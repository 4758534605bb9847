mod attempts;
mod quizzes;

use axum::{routing::get, routing::post, Router};

use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/quizzes", get(quizzes::list_assigned_quizzes))
        .route("/quizzes/:quiz_id", get(quizzes::get_quiz))
        .route("/quizzes/:quiz_id/start", post(quizzes::start_quiz))
        .route("/quizzes/:quiz_id/time-remaining", get(quizzes::get_time_remaining))
        .route("/quizzes/:quiz_id/attempt", post(quizzes::submit_attempt))
        .route("/attempts", get(attempts::list_attempts))
        .route("/attempts/:attempt_id", get(attempts::get_attempt))
}

#[cfg(test)]
mod tests;
