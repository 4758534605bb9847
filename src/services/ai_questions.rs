use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::{Duration, Instant};

use crate::core::config::Settings;
use crate::db::types::DifficultyLevel;

const GENERATION_SYSTEM_PROMPT: &str = "You write multiple-choice quiz questions for teachers. \
Answer only with the JSON array requested by the user.";

/// Client for an OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone)]
pub(crate) struct AiQuestionService {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl AiQuestionService {
    pub(crate) fn from_settings(settings: &Settings) -> Result<Self> {
        let timeout = Duration::from_secs(settings.ai().ai_request_timeout);
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key: settings.ai().openai_api_key.clone(),
            base_url: settings.ai().openai_base_url.trim_end_matches('/').to_string(),
            model: settings.ai().ai_model.clone(),
            max_tokens: settings.ai().ai_max_tokens,
        })
    }

    pub(crate) fn is_configured(&self) -> bool {
        !self.api_key.is_empty() && !self.base_url.is_empty()
    }

    /// Sends one generation request and returns the model's message text.
    pub(crate) async fn request_questions(
        &self,
        text: &str,
        count: u32,
        difficulty: DifficultyLevel,
    ) -> Result<String> {
        if !self.is_configured() {
            anyhow::bail!("AI credentials are not configured");
        }

        let timer = Instant::now();
        let payload = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": GENERATION_SYSTEM_PROMPT},
                {"role": "user", "content": build_prompt(text, count, difficulty)}
            ],
            "max_tokens": self.max_tokens,
        });

        tracing::info!(
            model = %self.model,
            count,
            difficulty = difficulty.as_str(),
            source_chars = text.chars().count(),
            "Sending question generation request"
        );

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .context("Failed to call question generation API")?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);
        if !status.is_success() {
            anyhow::bail!("Question generation API error (status {status}): {body}");
        }

        let content = body
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|value| value.as_str())
            .context("Missing generation response content")?;

        let tokens_used = body
            .get("usage")
            .and_then(|usage| usage.get("total_tokens"))
            .and_then(|value| value.as_u64());

        tracing::info!(
            duration_seconds = timer.elapsed().as_secs_f64(),
            tokens_used = tokens_used,
            "Question generation completed"
        );

        Ok(content.to_string())
    }
}

fn build_prompt(text: &str, count: u32, difficulty: DifficultyLevel) -> String {
    format!(
        r#"Generate {count} multiple-choice questions based on the following text.
The difficulty level should be {difficulty}.

For each question:
1. Create a clear, concise question
2. Provide exactly 4 options labeled a, b, c, and d
3. Indicate which option is correct

Text content:
{text}

Format your response as a JSON array with this structure:
[
  {{
    "question_text": "Question here?",
    "options": {{
      "a": "First option",
      "b": "Second option",
      "c": "Third option",
      "d": "Fourth option"
    }},
    "correct_option": "a"
  }}
]

Ensure all questions are factually accurate based on the provided text."#,
        difficulty = difficulty.as_str(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_mentions_count_difficulty_and_text() {
        let prompt = build_prompt("Cells divide by mitosis.", 7, DifficultyLevel::Hard);
        assert!(prompt.starts_with("Generate 7 multiple-choice questions"));
        assert!(prompt.contains("The difficulty level should be hard."));
        assert!(prompt.contains("Cells divide by mitosis."));
        assert!(prompt.contains("\"correct_option\": \"a\""));
    }
}
