/// Category tables: the three read-only candidate documents and their loader.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use thiserror::Error;

use crate::schema::category::Category;
use crate::schema::tarot::{TarotCard, TarotLayout};

#[derive(Debug, Error)]
pub enum TableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("missing table document: {0}")]
    MissingDocument(String),
}

/// Location of a candidate table: the owning document plus the keys
/// leading to the sequence inside it.
///
/// Fields name their document explicitly, so a character field may read
/// from the stories document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TablePath {
    pub document: Category,
    pub segments: &'static [&'static str],
}

impl TablePath {
    pub const fn new(document: Category, segments: &'static [&'static str]) -> Self {
        Self { document, segments }
    }
}

impl fmt::Display for TablePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.document.document_name(), self.segments.join("."))
    }
}

/// Spread definitions live in the characters document.
pub const TAROT_LAYOUTS: TablePath = TablePath::new(Category::Characters, &["tarot_layouts"]);
/// The deck lives next to the layouts.
pub const TAROT_CARDS: TablePath = TablePath::new(Category::Characters, &["tarot_cards"]);

/// The three loaded table documents. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct CategoryTables {
    documents: HashMap<Category, Value>,
}

impl CategoryTables {
    pub fn from_documents(characters: Value, stories: Value, music: Value) -> Self {
        let documents = HashMap::from([
            (Category::Characters, characters),
            (Category::Stories, stories),
            (Category::Music, music),
        ]);
        Self { documents }
    }

    /// Replace one document. Used to assemble partial tables.
    pub fn with_document(mut self, category: Category, document: Value) -> Self {
        self.documents.insert(category, document);
        self
    }

    /// Parse the three documents from JSON strings.
    pub fn parse_json(characters: &str, stories: &str, music: &str) -> Result<Self, TableError> {
        Ok(Self::from_documents(
            serde_json::from_str(characters)?,
            serde_json::from_str(stories)?,
            serde_json::from_str(music)?,
        ))
    }

    /// Load `character_elements`, `story_elements` and `music_elements`
    /// from a directory. Each may be `.json` or `.ron`; JSON wins when
    /// both exist.
    pub fn load_from_dir(dir: &Path) -> Result<Self, TableError> {
        let mut documents = HashMap::new();
        for category in Category::ALL {
            documents.insert(category, load_document(dir, category)?);
        }
        log::info!("Loaded category tables from {}", dir.display());
        Ok(Self { documents })
    }

    pub fn document(&self, category: Category) -> Option<&Value> {
        self.documents.get(&category)
    }

    /// Walk a path down to its value, if every segment exists.
    pub fn resolve(&self, path: &TablePath) -> Option<&Value> {
        let mut node = self.documents.get(&path.document)?;
        for segment in path.segments {
            node = node.get(*segment)?;
        }
        Some(node)
    }

    /// The string candidates at `path`. `None` when the path is absent,
    /// not a sequence, or holds no strings.
    pub fn strings(&self, path: &TablePath) -> Option<Vec<&str>> {
        let items = self.resolve(path)?.as_array()?;
        let strings: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
        if strings.is_empty() {
            None
        } else {
            Some(strings)
        }
    }

    /// Structured candidates at `path`. Entries that do not match `T` are
    /// skipped; `None` when nothing usable remains.
    pub fn entries<T: DeserializeOwned>(&self, path: &TablePath) -> Option<Vec<T>> {
        let items = self.resolve(path)?.as_array()?;
        let mut entries = Vec::with_capacity(items.len());
        for item in items {
            match serde_json::from_value::<T>(item.clone()) {
                Ok(entry) => entries.push(entry),
                Err(e) => log::debug!("Skipping malformed entry in {}: {}", path, e),
            }
        }
        if entries.is_empty() {
            None
        } else {
            Some(entries)
        }
    }

    pub fn tarot_layouts(&self) -> Vec<TarotLayout> {
        self.entries(&TAROT_LAYOUTS).unwrap_or_default()
    }

    pub fn tarot_deck(&self) -> Vec<TarotCard> {
        self.entries(&TAROT_CARDS).unwrap_or_default()
    }
}

fn load_document(dir: &Path, category: Category) -> Result<Value, TableError> {
    let stem = category.document_name();

    let json_path = dir.join(format!("{}.json", stem));
    if json_path.exists() {
        let contents = std::fs::read_to_string(&json_path)?;
        return Ok(serde_json::from_str(&contents)?);
    }

    let ron_path = dir.join(format!("{}.ron", stem));
    if ron_path.exists() {
        let contents = std::fs::read_to_string(&ron_path)?;
        return Ok(ron::from_str(&contents)?);
    }

    Err(TableError::MissingDocument(format!(
        "{} (looked for {}.json and {}.ron)",
        dir.join(stem).display(),
        stem,
        stem
    )))
}
