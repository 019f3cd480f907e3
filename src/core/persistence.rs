/// Persistence: the session state document and the key-value slot it
/// lives in.

use serde::{Deserialize, Deserializer, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;
use thiserror::Error;

use crate::core::locks::LockSet;
use crate::schema::category::Category;
use crate::schema::record::GeneratedRecord;
use crate::schema::tarot::TarotResult;

/// Slot key used unless the builder overrides it.
pub const DEFAULT_STORAGE_KEY: &str = "storySpinnerState";

/// Tab shown when nothing was persisted.
pub const DEFAULT_TAB: &str = "characters";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A durable string slot addressed by key.
pub trait StoragePort {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<S: StoragePort + ?Sized> StoragePort for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

/// In-memory slots. Clones share the same slots, so a caller can keep a
/// handle while the controller owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-fill a slot.
    pub fn with_slot(self, key: &str, value: &str) -> Self {
        self.slots
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn slot(&self, key: &str) -> Option<String> {
        self.slots.borrow().get(key).cloned()
    }
}

impl StoragePort for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.slot(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.slots
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per slot inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl StoragePort for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir)?;
        // Write then rename so a crash never leaves a half-written slot.
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// Generated records per category, plus the last tarot draw.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedState {
    #[serde(default)]
    pub characters: GeneratedRecord,
    #[serde(default)]
    pub stories: GeneratedRecord,
    #[serde(default)]
    pub music: GeneratedRecord,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_tarot"
    )]
    pub tarot: Option<TarotResult>,
}

impl GeneratedState {
    pub fn record(&self, category: Category) -> &GeneratedRecord {
        match category {
            Category::Characters => &self.characters,
            Category::Stories => &self.stories,
            Category::Music => &self.music,
        }
    }

    pub fn record_mut(&mut self, category: Category) -> &mut GeneratedRecord {
        match category {
            Category::Characters => &mut self.characters,
            Category::Stories => &mut self.stories,
            Category::Music => &mut self.music,
        }
    }
}

/// Lock sets per category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedState {
    #[serde(default)]
    pub characters: LockSet,
    #[serde(default)]
    pub stories: LockSet,
    #[serde(default)]
    pub music: LockSet,
}

impl LockedState {
    pub fn locks(&self, category: Category) -> &LockSet {
        match category {
            Category::Characters => &self.characters,
            Category::Stories => &self.stories,
            Category::Music => &self.music,
        }
    }

    pub fn locks_mut(&mut self, category: Category) -> &mut LockSet {
        match category {
            Category::Characters => &mut self.characters,
            Category::Stories => &mut self.stories,
            Category::Music => &mut self.music,
        }
    }
}

/// Everything a session needs to resume: the active tab, every record,
/// every lock set and the selected tarot layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default = "default_tab", alias = "currentTab")]
    pub active_tab: String,
    #[serde(default)]
    pub generated: GeneratedState,
    #[serde(default)]
    pub locked: LockedState,
    #[serde(default, deserialize_with = "layout_index")]
    pub tarot_layout_index: usize,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            active_tab: default_tab(),
            generated: GeneratedState::default(),
            locked: LockedState::default(),
            tarot_layout_index: 0,
        }
    }
}

fn default_tab() -> String {
    DEFAULT_TAB.to_string()
}

// Older saves used `currentTab`, stored the layout selector's string
// value, and wrote an empty object for "no draw yet". All are accepted
// on read.

fn layout_index<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
        Other(serde_json::Value),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Number(n) => usize::try_from(n).unwrap_or(0),
        Raw::Text(s) => s.trim().parse().unwrap_or(0),
        Raw::Other(_) => 0,
    })
}

fn lenient_tarot<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<TarotResult>, D::Error> {
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| serde_json::from_value(value).ok()))
}

/// Saves and restores [`PersistedState`] in a single storage slot.
pub struct PersistenceStore<S: StoragePort> {
    storage: S,
    key: String,
}

impl<S: StoragePort> PersistenceStore<S> {
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(storage: S, key: &str) -> Self {
        Self {
            storage,
            key: key.to_string(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Overwrite the slot with `state`.
    pub fn save(&mut self, state: &PersistedState) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(state)?;
        self.storage.set(&self.key, &json)?;
        log::debug!("Saved session state to '{}' ({} bytes)", self.key, json.len());
        Ok(())
    }

    /// Read the slot back. A missing slot, an unreadable slot and
    /// malformed content all yield `None`; the last two are logged.
    pub fn restore(&self) -> Option<PersistedState> {
        let contents = match self.storage.get(&self.key) {
            Ok(Some(contents)) => contents,
            Ok(None) => {
                log::info!("No saved session under '{}', starting fresh", self.key);
                return None;
            }
            Err(e) => {
                log::warn!("Failed to read saved session '{}': {}", self.key, e);
                return None;
            }
        };

        match serde_json::from_str::<PersistedState>(&contents) {
            Ok(state) => {
                log::info!("Restored session state from '{}'", self.key);
                Some(state)
            }
            Err(e) => {
                log::warn!("Discarding corrupt session state '{}': {}", self.key, e);
                None
            }
        }
    }
}
