use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The current field → display value mapping for one category.
///
/// Fields that were never generated are simply absent. The mapping has no
/// order of its own; display order comes from the field schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeneratedRecord {
    fields: HashMap<String, String>,
}

impl GeneratedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.fields.remove(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for GeneratedRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_get_remove() {
        let mut record = GeneratedRecord::new();
        assert!(record.is_empty());
        record.insert("Race", "Elf");
        assert_eq!(record.get("Race"), Some("Elf"));
        assert!(record.contains("Race"));
        assert_eq!(record.remove("Race"), Some("Elf".to_string()));
        assert_eq!(record.get("Race"), None);
    }

    #[test]
    fn serializes_as_plain_object() {
        let record: GeneratedRecord = [("Style", "Ambient")].into_iter().collect();
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"Style":"Ambient"}"#);
    }
}
