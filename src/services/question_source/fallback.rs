use crate::db::types::OptionLabel;

use super::candidates::CandidateQuestion;

const FALLBACK_QUESTIONS: &[(&str, [&str; 4], OptionLabel)] = &[
    (
        "What is the primary purpose of a database?",
        ["To store and organize data", "To create user interfaces", "To process images", "To send emails"],
        OptionLabel::A,
    ),
    (
        "Which programming language is commonly used for web development?",
        ["Assembly", "Python", "COBOL", "Fortran"],
        OptionLabel::B,
    ),
    (
        "What does HTML stand for?",
        [
            "Hyper Text Markup Language",
            "High Tech Modern Language",
            "Hybrid Text Management Logic",
            "Home Tool Markup Language",
        ],
        OptionLabel::A,
    ),
    ("Which of these is a version control system?", ["MySQL", "Apache", "Git", "Node.js"], OptionLabel::C),
    (
        "What is the purpose of CSS?",
        [
            "To handle server-side logic",
            "To style web pages",
            "To manage databases",
            "To create web servers",
        ],
        OptionLabel::B,
    ),
];

/// Generic questions used whenever generation fails, at most five.
pub(crate) fn fallback_questions(count: u32) -> Vec<CandidateQuestion> {
    FALLBACK_QUESTIONS
        .iter()
        .take(count as usize)
        .map(|(text, options, correct)| CandidateQuestion::new(text, *options, *correct))
        .collect()
}
