use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "difficultylevel", rename_all = "lowercase")]
pub(crate) enum DifficultyLevel {
    Easy,
    Medium,
    Hard,
}

impl DifficultyLevel {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "medium" => Some(Self::Medium),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }
}

/// One of the four answer slots of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "optionlabel", rename_all = "lowercase")]
pub(crate) enum OptionLabel {
    A,
    B,
    C,
    D,
}

impl OptionLabel {
    pub(crate) const ALL: [OptionLabel; 4] = [Self::A, Self::B, Self::C, Self::D];

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::A => "a",
            Self::B => "b",
            Self::C => "c",
            Self::D => "d",
        }
    }

    /// Exact match only: no trimming, no case folding.
    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value {
            "a" => Some(Self::A),
            "b" => Some(Self::B),
            "c" => Some(Self::C),
            "d" => Some(Self::D),
            _ => None,
        }
    }
}

impl fmt::Display for OptionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_label_parse_accepts_only_lowercase_a_to_d() {
        assert_eq!(OptionLabel::parse("a"), Some(OptionLabel::A));
        assert_eq!(OptionLabel::parse("d"), Some(OptionLabel::D));
        assert_eq!(OptionLabel::parse(" d "), None);
        assert_eq!(OptionLabel::parse("e"), None);
        assert_eq!(OptionLabel::parse("A"), None);
        assert_eq!(OptionLabel::parse(""), None);
    }

    #[test]
    fn difficulty_parse_ignores_case() {
        assert_eq!(DifficultyLevel::parse("Hard"), Some(DifficultyLevel::Hard));
        assert_eq!(DifficultyLevel::parse(" easy "), Some(DifficultyLevel::Easy));
        assert_eq!(DifficultyLevel::parse("extreme"), None);
    }

    #[test]
    fn difficulty_serializes_lowercase() {
        let value = serde_json::to_value(DifficultyLevel::Medium).unwrap();
        assert_eq!(value, serde_json::json!("medium"));
        let parsed: DifficultyLevel = serde_json::from_value(serde_json::json!("hard")).unwrap();
        assert_eq!(parsed, DifficultyLevel::Hard);
    }
}
