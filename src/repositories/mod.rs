pub(crate) mod answers;
pub(crate) mod assignments;
pub(crate) mod attempts;
pub(crate) mod health;
pub(crate) mod questions;
pub(crate) mod quiz_starts;
pub(crate) mod quizzes;
pub(crate) mod students;
pub(crate) mod teachers;
