//! Candidate questions from raw text or an uploaded file.
//!
//! Every path ends in a usable list: extraction problems, generator errors
//! and malformed responses all fall back to the fixed generic set.

mod candidates;
mod extraction;
mod fallback;

pub(crate) use candidates::{parse_candidates, CandidateQuestion, ParsedCandidates};
pub(crate) use extraction::{extract_text, file_extension, truncate_chars};
pub(crate) use fallback::fallback_questions;

use serde::Serialize;

use crate::core::config::Settings;
use crate::db::types::DifficultyLevel;
use crate::services::ai_questions::AiQuestionService;
use crate::services::datalab_ocr::DatalabOcrService;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum CandidateOrigin {
    Generated,
    Fallback,
}

impl CandidateOrigin {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Generated => "generated",
            Self::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CandidateBatch {
    pub(crate) questions: Vec<CandidateQuestion>,
    pub(crate) origin: CandidateOrigin,
}

impl CandidateBatch {
    fn fallback(count: u32) -> Self {
        Self { questions: fallback_questions(count), origin: CandidateOrigin::Fallback }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct QuestionSource {
    ai: AiQuestionService,
    ocr: Option<DatalabOcrService>,
    max_chars: usize,
}

impl QuestionSource {
    pub(crate) fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        Ok(Self {
            ai: AiQuestionService::from_settings(settings)?,
            ocr: DatalabOcrService::from_settings(settings)?,
            max_chars: settings.quiz().max_source_chars,
        })
    }

    pub(crate) async fn from_text(
        &self,
        text: &str,
        count: u32,
        difficulty: DifficultyLevel,
    ) -> CandidateBatch {
        let batch = self.generate(text, count, difficulty).await;
        record(&batch);
        batch
    }

    pub(crate) async fn from_file(
        &self,
        filename: &str,
        bytes: &[u8],
        count: u32,
        difficulty: DifficultyLevel,
    ) -> CandidateBatch {
        let text = match extract_text(filename, bytes, self.ocr.as_ref()).await {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(filename, error = %err, "Failed to extract text from upload");
                String::new()
            }
        };

        let batch = if text.trim().is_empty() {
            tracing::warn!(filename, "No text extracted from upload; using fallback questions");
            CandidateBatch::fallback(count)
        } else {
            self.generate(&text, count, difficulty).await
        };
        record(&batch);
        batch
    }

    async fn generate(
        &self,
        text: &str,
        count: u32,
        difficulty: DifficultyLevel,
    ) -> CandidateBatch {
        let truncated = truncate_chars(text, self.max_chars);
        if truncated.len() < text.len() {
            tracing::info!(max_chars = self.max_chars, "Source text truncated");
        }

        let response = match self.ai.request_questions(truncated, count, difficulty).await {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(
                    error = %err,
                    "Question generation failed; using fallback questions"
                );
                return CandidateBatch::fallback(count);
            }
        };

        match parse_candidates(&response) {
            ParsedCandidates::Parsed(questions) => {
                CandidateBatch { questions, origin: CandidateOrigin::Generated }
            }
            ParsedCandidates::Malformed(reason) => {
                tracing::error!(
                    reason = %reason,
                    "Malformed generation response; using fallback questions"
                );
                CandidateBatch::fallback(count)
            }
        }
    }
}

fn record(batch: &CandidateBatch) {
    metrics::counter!("question_generation_total", "source" => batch.origin.as_str()).increment(1);
}
