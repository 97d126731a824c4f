//! Local key-value persistence for the API key and translation history

use directories::ProjectDirs;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::core::errors::{Result, TranslationError};
use crate::core::history::History;

/// Key under which the API key is stored
pub const API_KEY_STORAGE_KEY: &str = "opentyphoon_api_key";

/// Key under which the serialized history is stored
pub const HISTORY_STORAGE_KEY: &str = "translation_history";

const STORE_FILE_NAME: &str = "store.json";

const MASK_MIN_REVEAL_LEN: usize = 16;

/// String-valued key-value store
pub trait KeyValueStore {
    /// Value for `key`, if present
    fn get(&self, key: &str) -> Option<String>;

    /// Insert or overwrite `key`
    fn set(&mut self, key: &str, value: String) -> Result<()>;

    /// Delete `key`; deleting an absent key is not an error
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON object file.
///
/// Every mutation is written through to disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store file inside `dir`, creating the directory if needed
    pub fn open_in<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| TranslationError::StoreError {
            path: dir.display().to_string(),
            message: e.to_string(),
        })?;
        Self::open(dir.join(STORE_FILE_NAME))
    }

    /// Open the store in `dir`, or in the platform data directory when `None`
    pub fn open_default(dir: Option<&Path>) -> Result<Self> {
        match dir {
            Some(dir) => Self::open_in(dir),
            None => Self::open_in(default_data_dir()?),
        }
    }

    /// Open a store file at an explicit path.
    ///
    /// A missing file gives an empty store. An unreadable or malformed file
    /// also gives an empty store; it is replaced on the next write.
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();

        let values = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<BTreeMap<String, String>>(&content) {
                Ok(values) => values,
                Err(e) => {
                    warn!("Ignoring malformed store file {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!("Could not read store file {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };

        debug!("Opened store {} with {} keys", path.display(), values.len());

        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.values)?;
        write_private(&self.path, content.as_bytes()).map_err(|e| TranslationError::StoreError {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.values.insert(key.to_string(), value);
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// Platform data directory for the store
pub fn default_data_dir() -> Result<PathBuf> {
    ProjectDirs::from("ai", "opentyphoon", "typhoon-translator")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| TranslationError::StoreError {
            path: String::new(),
            message: "Failed to get project directories".to_string(),
        })
}

/// Replace `path` with `content` atomically: write a sibling temp file,
/// restrict it to the owner, then rename it over the store.
fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    restrict_permissions(tmp.as_file())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(unix)]
fn restrict_permissions(file: &fs::File) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_file: &fs::File) -> std::io::Result<()> {
    Ok(())
}

/// User-supplied API key. Never empty.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Trimmed credential, or `None` for empty input
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// The raw key, for the Authorization header only
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Display form with the middle hidden.
    ///
    /// Keys shorter than 16 characters are fully hidden. Longer keys show
    /// one character at each end per 8 characters of length, at most 4.
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() < MASK_MIN_REVEAL_LEN {
            return "********".to_string();
        }
        let shown = (chars.len() / 8).min(4);
        let head: String = chars[..shown].iter().collect();
        let tail: String = chars[chars.len() - shown..].iter().collect();
        format!("{}…{}", head, tail)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Stored API key, if any
pub fn load_credential<S: KeyValueStore + ?Sized>(store: &S) -> Option<Credential> {
    store.get(API_KEY_STORAGE_KEY).and_then(Credential::new)
}

pub fn save_credential<S: KeyValueStore + ?Sized>(store: &mut S, credential: &Credential) -> Result<()> {
    store.set(API_KEY_STORAGE_KEY, credential.expose().to_string())
}

pub fn clear_credential<S: KeyValueStore + ?Sized>(store: &mut S) -> Result<()> {
    store.remove(API_KEY_STORAGE_KEY)
}

/// Stored history; absent or malformed values load as empty
pub fn load_history<S: KeyValueStore + ?Sized>(store: &S) -> History {
    let Some(raw) = store.get(HISTORY_STORAGE_KEY) else {
        return History::new();
    };

    match serde_json::from_str::<History>(&raw) {
        Ok(history) => history,
        Err(e) => {
            warn!("Discarding malformed stored history: {}", e);
            History::new()
        }
    }
}

pub fn save_history<S: KeyValueStore + ?Sized>(store: &mut S, history: &History) -> Result<()> {
    let json = serde_json::to_string(history)?;
    store.set(HISTORY_STORAGE_KEY, json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::history::HISTORY_CAPACITY;
    use crate::core::models::{Direction, HistoryEntry};
    use chrono::Utc;

    fn sample_entry(text: &str) -> HistoryEntry {
        HistoryEntry {
            source_text: text.to_string(),
            translated_text: format!("{} (translated)", text),
            direction: Direction::ThaiToEnglish,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_credential_rejects_blank() {
        assert!(Credential::new("").is_none());
        assert!(Credential::new("   \t").is_none());
        assert_eq!(Credential::new("  sk-abc ").unwrap().expose(), "sk-abc");
    }

    #[test]
    fn test_credential_debug_redacted() {
        let credential = Credential::new("sk-very-secret-key").unwrap();
        let debug = format!("{:?}", credential);
        assert!(!debug.contains("secret"));
        assert_eq!(credential.masked(), "sk…ey");
    }

    #[test]
    fn test_masked_scales_with_length() {
        assert_eq!(Credential::new("short").unwrap().masked(), "********");
        assert_eq!(Credential::new("sk-abcdef9").unwrap().masked(), "********");
        assert_eq!(Credential::new("sk-abcdefghij15").unwrap().masked(), "********");

        let sixteen = Credential::new("sk-abcdefghijk16").unwrap();
        assert_eq!(sixteen.masked(), "sk…16");

        let long = Credential::new(format!("sk-{}end", "x".repeat(60))).unwrap();
        assert_eq!(long.masked(), "sk-x…xend");
    }

    #[test]
    fn test_credential_round_trip() {
        let mut store = MemoryStore::new();
        assert!(load_credential(&store).is_none());

        let credential = Credential::new("sk-123456789").unwrap();
        save_credential(&mut store, &credential).unwrap();
        assert_eq!(load_credential(&store), Some(credential));

        clear_credential(&mut store).unwrap();
        assert!(load_credential(&store).is_none());
    }

    #[test]
    fn test_blank_stored_credential_is_absent() {
        let mut store = MemoryStore::new();
        store.set(API_KEY_STORAGE_KEY, "  ".to_string()).unwrap();
        assert!(load_credential(&store).is_none());
    }

    #[test]
    fn test_history_round_trip() {
        let mut store = MemoryStore::new();
        let mut history = History::new();
        history.push(sample_entry("one"));
        history.push(sample_entry("two"));

        save_history(&mut store, &history).unwrap();
        assert_eq!(load_history(&store), history);
    }

    #[test]
    fn test_malformed_history_loads_empty() {
        let mut store = MemoryStore::new();
        store.set(HISTORY_STORAGE_KEY, "{not json".to_string()).unwrap();
        assert!(load_history(&store).is_empty());

        store
            .set(HISTORY_STORAGE_KEY, "[{\"unexpected\": true}]".to_string())
            .unwrap();
        assert!(load_history(&store).is_empty());
    }

    #[test]
    fn test_oversized_history_truncated_on_load() {
        let mut store = MemoryStore::new();
        let entries: Vec<HistoryEntry> = (0..HISTORY_CAPACITY + 5)
            .map(|n| sample_entry(&n.to_string()))
            .collect();
        store
            .set(HISTORY_STORAGE_KEY, serde_json::to_string(&entries).unwrap())
            .unwrap();

        assert_eq!(load_history(&store).len(), HISTORY_CAPACITY);
    }

    #[test]
    fn test_file_store_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();

        {
            let mut store = FileStore::open_in(dir.path()).unwrap();
            store.set(API_KEY_STORAGE_KEY, "sk-file".to_string()).unwrap();
            store.set("other", "value".to_string()).unwrap();
            store.remove("other").unwrap();
        }

        let store = FileStore::open_in(dir.path()).unwrap();
        assert_eq!(store.get(API_KEY_STORAGE_KEY).as_deref(), Some("sk-file"));
        assert!(store.get("other").is_none());
    }

    #[test]
    fn test_file_store_malformed_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE_NAME);
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        let mut store = FileStore::open(&path).unwrap();
        assert!(store.get(API_KEY_STORAGE_KEY).is_none());

        store.set(API_KEY_STORAGE_KEY, "sk-new".to_string()).unwrap();
        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get(API_KEY_STORAGE_KEY).as_deref(), Some("sk-new"));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open_in(dir.path()).unwrap();
        store.set(API_KEY_STORAGE_KEY, "sk-perm".to_string()).unwrap();

        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_existing_store_permissions_tightened() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE_NAME);
        std::fs::write(&path, "{}").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let mut store = FileStore::open(&path).unwrap();
        store.set(API_KEY_STORAGE_KEY, "sk-perm".to_string()).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_write_replaces_file_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open_in(dir.path()).unwrap();
        store.set(API_KEY_STORAGE_KEY, "sk-one".to_string()).unwrap();
        store.set(API_KEY_STORAGE_KEY, "sk-two".to_string()).unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![STORE_FILE_NAME.to_string()]);

        let reopened = FileStore::open_in(dir.path()).unwrap();
        assert_eq!(reopened.get(API_KEY_STORAGE_KEY).as_deref(), Some("sk-two"));
    }
}
