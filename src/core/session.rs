//! Application state and the translate-then-persist cycle

use chrono::Utc;
use tracing::{info, warn};

use crate::core::client::TranslationRequestManager;
use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::history::History;
use crate::core::models::{Direction, HistoryEntry, TranslationRequest, TranslationResult};
use crate::core::store::{self, Credential, KeyValueStore};

/// Everything the front end needs to render
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppState {
    pub direction: Direction,
    pub credential: Option<Credential>,
    pub history: History,
}

/// Owns the store, the request manager and the current state.
///
/// `translate` borrows the session mutably, so at most one request is in
/// flight per session.
#[derive(Debug)]
pub struct TranslationSession<S: KeyValueStore> {
    store: S,
    manager: TranslationRequestManager,
    state: AppState,
}

impl<S: KeyValueStore> TranslationSession<S> {
    /// Load credential and history from `store`
    pub fn open(store: S, manager: TranslationRequestManager) -> Self {
        let state = AppState {
            direction: Direction::default(),
            credential: store::load_credential(&store),
            history: store::load_history(&store),
        };

        info!(
            "Session opened: credential {}, {} history entries",
            if state.credential.is_some() { "present" } else { "absent" },
            state.history.len()
        );

        Self {
            store,
            manager,
            state,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn history(&self) -> &History {
        &self.state.history
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Configuration the request manager runs with
    pub fn config(&self) -> &TranslatorConfig {
        self.manager.config()
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.state.direction = direction;
    }

    /// Flip the direction and return the new one
    pub fn swap_direction(&mut self) -> Direction {
        self.state.direction = self.state.direction.swap();
        self.state.direction
    }

    /// Use `credential` for this session without persisting it
    pub fn override_credential(&mut self, credential: Credential) {
        self.state.credential = Some(credential);
    }

    /// Validate and persist a new API key
    pub fn set_credential(&mut self, raw: &str) -> Result<()> {
        let credential = Credential::new(raw).ok_or(TranslationError::MissingCredential)?;
        store::save_credential(&mut self.store, &credential)?;
        self.state.credential = Some(credential);
        info!("API key saved");
        Ok(())
    }

    pub fn clear_credential(&mut self) -> Result<()> {
        store::clear_credential(&mut self.store)?;
        self.state.credential = None;
        info!("API key cleared");
        Ok(())
    }

    /// Translate `text` in the current direction and record it in history
    pub async fn translate(&mut self, text: &str) -> Result<TranslationResult> {
        let request = TranslationRequest::new(text, self.state.direction);
        let credential = self
            .state
            .credential
            .as_ref()
            .map(Credential::expose)
            .unwrap_or("");

        let result = self.manager.translate(&request, credential).await?;

        let entry = HistoryEntry::from_result(&request, &result, Utc::now());
        self.state.history.push(entry);
        if let Err(e) = store::save_history(&mut self.store, &self.state.history) {
            warn!("Failed to persist history: {}", e);
        }

        Ok(result)
    }

    /// Remove one entry by 0-based display position
    pub fn remove_history_entry(&mut self, index: usize) -> Result<HistoryEntry> {
        let removed = self.state.history.remove(index)?;
        store::save_history(&mut self.store, &self.state.history)?;
        Ok(removed)
    }

    pub fn clear_history(&mut self) -> Result<()> {
        self.state.history.clear();
        store::save_history(&mut self.store, &self.state.history)?;
        info!("History cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::{MemoryStore, API_KEY_STORAGE_KEY, HISTORY_STORAGE_KEY};

    fn offline_manager() -> TranslationRequestManager {
        let config = TranslatorConfig {
            api_endpoint: "http://127.0.0.1:9/v1/chat/completions".to_string(),
            ..Default::default()
        };
        TranslationRequestManager::new(config).unwrap()
    }

    fn seeded_history(store: &mut MemoryStore, count: usize) {
        let mut history = History::new();
        for n in 0..count {
            history.push(HistoryEntry {
                source_text: format!("s{}", n),
                translated_text: format!("t{}", n),
                direction: Direction::EnglishToThai,
                timestamp: Utc::now(),
            });
        }
        store::save_history(store, &history).unwrap();
    }

    #[test]
    fn test_open_loads_state() {
        let mut store = MemoryStore::new();
        store.set(API_KEY_STORAGE_KEY, "sk-stored".to_string()).unwrap();
        seeded_history(&mut store, 3);

        let session = TranslationSession::open(store, offline_manager());
        assert_eq!(session.state().credential, Credential::new("sk-stored"));
        assert_eq!(session.history().len(), 3);
        assert_eq!(session.state().direction, Direction::ThaiToEnglish);
    }

    #[test]
    fn test_open_with_malformed_history() {
        let mut store = MemoryStore::new();
        store.set(HISTORY_STORAGE_KEY, "oops".to_string()).unwrap();

        let session = TranslationSession::open(store, offline_manager());
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_credential_lifecycle() {
        let mut session = TranslationSession::open(MemoryStore::new(), offline_manager());

        assert!(matches!(
            session.set_credential("   "),
            Err(TranslationError::MissingCredential)
        ));
        assert!(session.store().get(API_KEY_STORAGE_KEY).is_none());

        session.set_credential(" sk-new ").unwrap();
        assert_eq!(session.store().get(API_KEY_STORAGE_KEY).as_deref(), Some("sk-new"));

        session.clear_credential().unwrap();
        assert!(session.state().credential.is_none());
        assert!(session.store().get(API_KEY_STORAGE_KEY).is_none());
    }

    #[test]
    fn test_override_credential_not_persisted() {
        let mut session = TranslationSession::open(MemoryStore::new(), offline_manager());
        session.override_credential(Credential::new("sk-once").unwrap());

        assert!(session.state().credential.is_some());
        assert!(session.store().get(API_KEY_STORAGE_KEY).is_none());
    }

    #[test]
    fn test_config_exposed() {
        let session = TranslationSession::open(MemoryStore::new(), offline_manager());
        assert_eq!(session.config().api_endpoint, "http://127.0.0.1:9/v1/chat/completions");
    }

    #[test]
    fn test_swap_direction() {
        let mut session = TranslationSession::open(MemoryStore::new(), offline_manager());
        assert_eq!(session.swap_direction(), Direction::EnglishToThai);
        assert_eq!(session.swap_direction(), Direction::ThaiToEnglish);
    }

    #[test]
    fn test_translate_without_credential_leaves_history() {
        let mut store = MemoryStore::new();
        seeded_history(&mut store, 2);
        let mut session = TranslationSession::open(store, offline_manager());

        let result = tokio_test::block_on(session.translate("Hello"));
        assert!(matches!(result, Err(TranslationError::MissingCredential)));
        assert_eq!(session.history().len(), 2);
    }

    #[test]
    fn test_translate_empty_input() {
        let mut session = TranslationSession::open(MemoryStore::new(), offline_manager());
        session.set_credential("sk-key").unwrap();

        let result = tokio_test::block_on(session.translate("   "));
        assert!(matches!(result, Err(TranslationError::EmptyInput)));
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_remove_and_clear_history_persist() {
        let mut store = MemoryStore::new();
        seeded_history(&mut store, 3);
        let mut session = TranslationSession::open(store, offline_manager());

        let removed = session.remove_history_entry(0).unwrap();
        assert_eq!(removed.source_text, "s2");
        assert_eq!(store::load_history(session.store()).len(), 2);

        assert!(matches!(
            session.remove_history_entry(7),
            Err(TranslationError::HistoryIndexOutOfRange { index: 7, len: 2 })
        ));

        session.clear_history().unwrap();
        assert!(store::load_history(session.store()).is_empty());
    }
}
