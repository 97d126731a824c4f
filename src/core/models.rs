//! Core data models for translation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Language pair a request targets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum Direction {
    /// Thai source, English output
    #[default]
    #[serde(rename = "th-en")]
    #[value(name = "th-en")]
    ThaiToEnglish,
    /// English source, Thai output
    #[serde(rename = "en-th")]
    #[value(name = "en-th")]
    EnglishToThai,
}

impl Direction {
    /// The opposite direction
    pub fn swap(self) -> Self {
        match self {
            Direction::ThaiToEnglish => Direction::EnglishToThai,
            Direction::EnglishToThai => Direction::ThaiToEnglish,
        }
    }

    /// System instruction sent ahead of the source text
    pub fn system_instruction(self) -> &'static str {
        match self {
            Direction::ThaiToEnglish => {
                "You are a professional translator. Translate the following Thai text into natural, \
                 fluent English. Respond with the translation only, without explanations or notes."
            }
            Direction::EnglishToThai => {
                "You are a professional translator. Translate the following English text into natural, \
                 fluent Thai. Respond with the translation only, without explanations or notes."
            }
        }
    }

    /// Human-readable label, e.g. for history listings
    pub fn label(self) -> &'static str {
        match self {
            Direction::ThaiToEnglish => "Thai → English",
            Direction::EnglishToThai => "English → Thai",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::ThaiToEnglish => write!(f, "th-en"),
            Direction::EnglishToThai => write!(f, "en-th"),
        }
    }
}

/// Translation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub source_text: String,
    pub direction: Direction,
}

impl TranslationRequest {
    pub fn new(source_text: impl Into<String>, direction: Direction) -> Self {
        Self {
            source_text: source_text.into(),
            direction,
        }
    }
}

/// Translation result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub translated_text: String,
}

/// One persisted record of a completed translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub source_text: String,
    pub translated_text: String,
    pub direction: Direction,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    /// Build an entry for a finished request
    pub fn from_result(
        request: &TranslationRequest,
        result: &TranslationResult,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            source_text: request.source_text.trim().to_string(),
            translated_text: result.translated_text.clone(),
            direction: request.direction,
            timestamp,
        }
    }
}

/// Chat message in the completions body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Chat-completions request body
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}
