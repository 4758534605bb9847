use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::types::OptionLabel;

/// Longest answer text a question column can hold.
const MAX_OPTION_CHARS: usize = 500;

/// The four answer texts of a candidate, keyed by label. Extra keys from the
/// generator are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct CandidateOptions {
    pub(crate) a: String,
    pub(crate) b: String,
    pub(crate) c: String,
    pub(crate) d: String,
}

impl CandidateOptions {
    pub(crate) fn get(&self, label: OptionLabel) -> &str {
        match label {
            OptionLabel::A => &self.a,
            OptionLabel::B => &self.b,
            OptionLabel::C => &self.c,
            OptionLabel::D => &self.d,
        }
    }

    pub(crate) fn as_array(&self) -> [&str; 4] {
        [&self.a, &self.b, &self.c, &self.d]
    }
}

/// A multiple-choice question that has not been saved to a quiz yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct CandidateQuestion {
    pub(crate) question_text: String,
    pub(crate) options: CandidateOptions,
    pub(crate) correct_option: OptionLabel,
}

impl CandidateQuestion {
    pub(crate) fn new(
        question_text: &str,
        options: [&str; 4],
        correct_option: OptionLabel,
    ) -> Self {
        let [a, b, c, d] = options.map(str::to_string);
        Self {
            question_text: question_text.to_string(),
            options: CandidateOptions { a, b, c, d },
            correct_option,
        }
    }

    /// Checks what the type system cannot: no blank text anywhere and every
    /// option fits its column.
    pub(crate) fn check(&self) -> Result<(), String> {
        if self.question_text.trim().is_empty() {
            return Err("question_text is blank".to_string());
        }
        for label in OptionLabel::ALL {
            let option = self.options.get(label).trim();
            if option.is_empty() {
                return Err(format!("option {label} is blank"));
            }
            if option.chars().count() > MAX_OPTION_CHARS {
                return Err(format!(
                    "option {label} is longer than {MAX_OPTION_CHARS} characters"
                ));
            }
        }
        Ok(())
    }
}

/// Outcome of reading a generator response.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ParsedCandidates {
    Parsed(Vec<CandidateQuestion>),
    Malformed(String),
}

/// Pulls the JSON array embedded in free-form model output and keeps the
/// well-formed questions. An empty survivor list counts as malformed.
pub(crate) fn parse_candidates(response_text: &str) -> ParsedCandidates {
    let Some(start) = response_text.find("[{") else {
        return ParsedCandidates::Malformed("no JSON array start in response".to_string());
    };
    let Some(end) = response_text.rfind("}]") else {
        return ParsedCandidates::Malformed("no JSON array end in response".to_string());
    };
    if end < start {
        return ParsedCandidates::Malformed("JSON array bounds are reversed".to_string());
    }

    let slice = &response_text[start..end + 2];
    let items: Vec<Value> = match serde_json::from_str(slice) {
        Ok(items) => items,
        Err(err) => return ParsedCandidates::Malformed(format!("invalid JSON array: {err}")),
    };

    let total = items.len();
    let mut valid = Vec::with_capacity(total);
    for (index, item) in items.into_iter().enumerate() {
        let candidate = match serde_json::from_value::<CandidateQuestion>(item) {
            Ok(candidate) => candidate,
            Err(err) => {
                tracing::debug!(index, error = %err, "Dropping malformed candidate question");
                continue;
            }
        };
        if let Err(reason) = candidate.check() {
            tracing::debug!(index, reason = %reason, "Dropping invalid candidate question");
            continue;
        }
        valid.push(candidate);
    }

    if valid.is_empty() {
        return ParsedCandidates::Malformed(format!("none of {total} candidates were valid"));
    }

    ParsedCandidates::Parsed(valid)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: &str = r#"{"question_text":"Q1?","options":{"a":"1","b":"2","c":"3","d":"4"},"correct_option":"c"}"#;

    #[test]
    fn parses_array_wrapped_in_prose() {
        let text = format!("Sure! Here you go:\n```json\n[{GOOD}]\n```\nGood luck.");
        let ParsedCandidates::Parsed(items) = parse_candidates(&text) else {
            panic!("expected parsed candidates");
        };
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].question_text, "Q1?");
        assert_eq!(items[0].correct_option, OptionLabel::C);
        assert_eq!(items[0].options.get(OptionLabel::B), "2");
    }

    #[test]
    fn drops_invalid_candidates_and_keeps_order() {
        let bad_label = r#"{"question_text":"Q2?","options":{"a":"1","b":"2","c":"3","d":"4"},"correct_option":"e"}"#;
        let missing_option = r#"{"question_text":"Q3?","options":{"a":"1","b":"2","c":"3"},"correct_option":"a"}"#;
        let extra_key = r#"{"question_text":"Q4?","options":{"a":"1","b":"2","c":"3","d":"4"},"correct_option":"a","hint":"x"}"#;
        let blank_option = r#"{"question_text":"Q5?","options":{"a":"1","b":" ","c":"3","d":"4"},"correct_option":"a"}"#;
        let numeric_option = r#"{"question_text":"Q6?","options":{"a":1,"b":"2","c":"3","d":"4"},"correct_option":"a"}"#;
        let last = r#"{"question_text":"Q7?","options":{"a":"w","b":"x","c":"y","d":"z"},"correct_option":"d"}"#;
        let text = format!(
            "[{GOOD},{bad_label},{missing_option},{extra_key},{blank_option},{numeric_option},{last}]"
        );

        let ParsedCandidates::Parsed(items) = parse_candidates(&text) else {
            panic!("expected parsed candidates");
        };
        let texts: Vec<&str> = items.iter().map(|item| item.question_text.as_str()).collect();
        assert_eq!(texts, vec!["Q1?", "Q7?"]);
    }

    #[test]
    fn extra_option_keys_are_ignored() {
        let text = r#"[{"question_text":"Q?","options":{"a":"1","b":"2","c":"3","d":"4","e":"5"},"correct_option":"a"}]"#;
        let ParsedCandidates::Parsed(items) = parse_candidates(text) else {
            panic!("expected parsed candidates");
        };
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].options.as_array(), ["1", "2", "3", "4"]);
    }

    #[test]
    fn overlong_option_is_dropped() {
        let long = "x".repeat(600);
        let text = format!(
            r#"[{{"question_text":"Long?","options":{{"a":"{long}","b":"2","c":"3","d":"4"}},"correct_option":"a"}},{GOOD}]"#
        );
        let ParsedCandidates::Parsed(items) = parse_candidates(&text) else {
            panic!("expected parsed candidates");
        };
        let texts: Vec<&str> = items.iter().map(|item| item.question_text.as_str()).collect();
        assert_eq!(texts, vec!["Q1?"]);

        let limit = "y".repeat(500);
        let exact = CandidateQuestion::new("Q?", [limit.as_str(), "2", "3", "4"], OptionLabel::A);
        assert!(exact.check().is_ok());
    }

    #[test]
    fn missing_brackets_is_malformed() {
        assert!(matches!(parse_candidates("no questions today"), ParsedCandidates::Malformed(_)));
        assert!(matches!(parse_candidates("[{\"question_text\": 1"), ParsedCandidates::Malformed(_)));
    }

    #[test]
    fn broken_json_is_malformed() {
        let text = "[{\"question_text\": \"Q\", }]";
        assert!(matches!(parse_candidates(text), ParsedCandidates::Malformed(_)));
    }

    #[test]
    fn all_invalid_is_malformed() {
        let text = r#"[{"question_text":"","options":{"a":"1","b":"2","c":"3","d":"4"},"correct_option":"a"}]"#;
        assert!(matches!(parse_candidates(text), ParsedCandidates::Malformed(_)));
    }
}
