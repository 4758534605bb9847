use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::core::time::primitive_now_utc;
use crate::db::models::{Question, Quiz};
use crate::db::types::DifficultyLevel;
use crate::repositories;
use crate::services::question_source::CandidateQuestion;

#[derive(Debug, Error)]
pub(crate) enum AssemblyError {
    #[error("quiz title must not be blank")]
    BlankTitle,
    #[error("time limit must be positive, got {0}")]
    InvalidTimeLimit(i32),
    #[error("a quiz needs at least one question; generate questions first")]
    NoCandidates,
    #[error("question {index} is invalid: {reason}")]
    InvalidCandidate { index: usize, reason: String },
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub(crate) struct AssembleQuiz<'a> {
    pub(crate) teacher_id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) difficulty: DifficultyLevel,
    pub(crate) time_limit_minutes: i32,
    pub(crate) candidates: &'a [CandidateQuestion],
}

#[derive(Debug)]
pub(crate) struct AssembledQuiz {
    pub(crate) quiz: Quiz,
    pub(crate) questions: Vec<Question>,
}

pub(crate) fn check_assembly(params: &AssembleQuiz<'_>) -> Result<(), AssemblyError> {
    if params.title.trim().is_empty() {
        return Err(AssemblyError::BlankTitle);
    }
    if params.time_limit_minutes <= 0 {
        return Err(AssemblyError::InvalidTimeLimit(params.time_limit_minutes));
    }
    if params.candidates.is_empty() {
        return Err(AssemblyError::NoCandidates);
    }
    for (index, candidate) in params.candidates.iter().enumerate() {
        candidate.check().map_err(|reason| AssemblyError::InvalidCandidate { index, reason })?;
    }
    Ok(())
}

/// Saves the quiz and its questions in one transaction. Question positions
/// follow the candidate order.
pub(crate) async fn assemble_quiz(
    pool: &PgPool,
    params: AssembleQuiz<'_>,
) -> Result<AssembledQuiz, AssemblyError> {
    check_assembly(&params)?;

    let mut tx = pool.begin().await?;
    let quiz_id = Uuid::new_v4().to_string();

    let quiz = repositories::quizzes::create(
        &mut *tx,
        repositories::quizzes::CreateQuiz {
            id: &quiz_id,
            teacher_id: params.teacher_id,
            title: params.title.trim(),
            difficulty: params.difficulty,
            time_limit_minutes: params.time_limit_minutes,
            created_at: primitive_now_utc(),
        },
    )
    .await?;

    let mut questions = Vec::with_capacity(params.candidates.len());
    for (position, candidate) in params.candidates.iter().enumerate() {
        let question = repositories::questions::create(
            &mut *tx,
            repositories::questions::CreateQuestion {
                id: &Uuid::new_v4().to_string(),
                quiz_id: &quiz.id,
                position: position as i32,
                question_text: candidate.question_text.trim(),
                options: candidate.options.as_array().map(str::trim),
                correct_option: candidate.correct_option,
            },
        )
        .await?;
        questions.push(question);
    }

    tx.commit().await?;

    tracing::info!(
        quiz_id = %quiz.id,
        teacher_id = %quiz.teacher_id,
        questions = questions.len(),
        "Quiz assembled"
    );

    Ok(AssembledQuiz { quiz, questions })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::types::OptionLabel;
    use crate::services::question_source::fallback_questions;

    fn params<'a>(candidates: &'a [CandidateQuestion]) -> AssembleQuiz<'a> {
        AssembleQuiz {
            teacher_id: "teacher-1",
            title: "Week 1",
            difficulty: DifficultyLevel::Medium,
            time_limit_minutes: 15,
            candidates,
        }
    }

    #[test]
    fn empty_candidate_list_is_rejected() {
        assert!(matches!(check_assembly(&params(&[])), Err(AssemblyError::NoCandidates)));
    }

    #[test]
    fn title_and_time_limit_are_checked() {
        let candidates = fallback_questions(2);
        let blank = AssembleQuiz { title: "  ", ..params(&candidates) };
        assert!(matches!(check_assembly(&blank), Err(AssemblyError::BlankTitle)));

        let zero = AssembleQuiz { time_limit_minutes: 0, ..params(&candidates) };
        assert!(matches!(check_assembly(&zero), Err(AssemblyError::InvalidTimeLimit(0))));

        assert!(check_assembly(&params(&candidates)).is_ok());
    }

    #[test]
    fn blank_candidate_reports_its_index() {
        let mut candidates = fallback_questions(3);
        candidates[2] = CandidateQuestion::new("Q?", ["a", "", "c", "d"], OptionLabel::A);
        match check_assembly(&params(&candidates)) {
            Err(AssemblyError::InvalidCandidate { index, .. }) => assert_eq!(index, 2),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn overlong_option_is_a_validation_error() {
        let long = "x".repeat(600);
        let candidates =
            vec![CandidateQuestion::new("Q?", [long.as_str(), "b", "c", "d"], OptionLabel::A)];
        let err = check_assembly(&params(&candidates)).expect_err("overlong option");
        assert!(matches!(err, AssemblyError::InvalidCandidate { index: 0, .. }));
        assert!(err.to_string().contains("longer than 500"));
    }
}
