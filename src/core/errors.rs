//! Custom error types for translation operations

use thiserror::Error;

/// Translation-related errors
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Source text is empty or whitespace only
    #[error("Source text is empty")]
    EmptyInput,

    /// No API key available for the request
    #[error("No API key configured")]
    MissingCredential,

    /// Transport failure or non-2xx status from the endpoint
    #[error("Request failed{}", status_suffix(.status_code))]
    RequestFailed {
        status_code: Option<u16>,
    },

    /// 2xx response without a usable translation
    #[error("Malformed response: {reason}")]
    MalformedResponse {
        reason: String,
    },

    /// History position that does not exist
    #[error("History entry {index} out of range ({len} entries)")]
    HistoryIndexOutOfRange {
        index: usize,
        len: usize,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
    },

    /// Persistent store error
    #[error("Store error: {path} - {message}")]
    StoreError {
        path: String,
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

fn status_suffix(status_code: &Option<u16>) -> String {
    match status_code {
        Some(code) => format!(" with HTTP status {}", code),
        None => String::new(),
    }
}

impl TranslationError {
    /// Short message suitable for showing to the user.
    ///
    /// Never includes response bodies or the credential.
    pub fn user_message(&self) -> String {
        match self {
            TranslationError::EmptyInput => "Please enter some text to translate.".to_string(),
            TranslationError::MissingCredential => {
                "Please set your OpenTyphoon API key first (typhoon-translator key set <KEY>).".to_string()
            }
            TranslationError::RequestFailed { status_code: Some(401) }
            | TranslationError::RequestFailed { status_code: Some(403) } => {
                "The API key was rejected. Check that it is correct.".to_string()
            }
            TranslationError::RequestFailed { status_code: Some(429) } => {
                "Too many requests. Please wait a moment and try again.".to_string()
            }
            TranslationError::RequestFailed { status_code: Some(code) } => {
                format!("Translation failed (HTTP {}). Please try again.", code)
            }
            TranslationError::RequestFailed { status_code: None } => {
                "Could not reach the translation service. Check your connection.".to_string()
            }
            TranslationError::MalformedResponse { .. } => {
                "The translation service returned an unexpected response.".to_string()
            }
            TranslationError::HistoryIndexOutOfRange { len, .. } => {
                format!("No such history entry (history has {} entries).", len)
            }
            TranslationError::ConfigError { .. } => "Invalid configuration.".to_string(),
            TranslationError::StoreError { .. }
            | TranslationError::IoError(_)
            | TranslationError::JsonError(_) => "Could not access local storage.".to_string(),
        }
    }
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslationError>;
