//! Story Spinner: lockable random generators for writers.
//!
//! Draws characters, story premises and music prompts from curated category
//! tables, keeps locked fields stable across re-rolls, deals tarot spreads
//! without repeating a card, and persists the whole session to a key-value
//! slot.

pub mod core;
pub mod schema;
