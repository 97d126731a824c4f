//! Typhoon Translator - Thai/English translation over the OpenTyphoon API
//!
//! This library sends one chat-completions request per translation and keeps
//! the API key and a bounded translation history in a local key-value store.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod core;

// Re-export key types for convenience
pub use crate::core::{
    client::TranslationRequestManager,
    config::TranslatorConfig,
    errors::TranslationError,
    history::{History, HISTORY_CAPACITY},
    models::{Direction, HistoryEntry, TranslationRequest, TranslationResult},
    session::{AppState, TranslationSession},
    store::{Credential, FileStore, KeyValueStore, MemoryStore},
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
