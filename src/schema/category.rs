use serde::{Deserialize, Serialize};
use std::fmt;

/// A generation domain. Each one owns a record, a lock set and a
/// table document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Characters,
    Stories,
    Music,
}

impl Category {
    pub const ALL: [Category; 3] = [Self::Characters, Self::Stories, Self::Music];

    /// Identifier used for tabs and persisted keys: "characters", "stories", "music".
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Characters => "characters",
            Self::Stories => "stories",
            Self::Music => "music",
        }
    }

    /// File stem of the table document backing this category.
    pub fn document_name(&self) -> &'static str {
        match self {
            Self::Characters => "character_elements",
            Self::Stories => "story_elements",
            Self::Music => "music_elements",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "characters" | "character" | "char" => Some(Self::Characters),
            "stories" | "story" => Some(Self::Stories),
            "music" => Some(Self::Music),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
