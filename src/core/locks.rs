/// Lock sets: per-category fields protected from re-rolling.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Field names that keep their current value on the next generation.
///
/// Lock state is independent of whether the field has a value yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockSet {
    fields: FxHashSet<String>,
}

impl LockSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the lock on `field`. Returns `true` if the field is now locked.
    pub fn toggle(&mut self, field: &str) -> bool {
        if self.fields.remove(field) {
            false
        } else {
            self.fields.insert(field.to_string());
            true
        }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Locked field names in a stable (sorted) order.
    pub fn to_sorted_vec(&self) -> Vec<String> {
        let mut fields: Vec<String> = self.fields.iter().cloned().collect();
        fields.sort();
        fields
    }
}

impl<S: Into<String>> FromIterator<S> for LockSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(Into::into).collect(),
        }
    }
}

// Persisted as an ordered sequence of field names.
impl Serialize for LockSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_sorted_vec().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for LockSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = Vec::<String>::deserialize(deserializer)?;
        Ok(fields.into_iter().collect())
    }
}
