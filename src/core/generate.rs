/// Generation engine: turns a previous record, a lock set and the tables
/// into a fresh record.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::fields::{
    schema, FieldKind, ReusedPart, SummarySources, PARENT_ALIVE_PROBABILITY, SUMMARY_AGE_RANGE,
};
use crate::core::locks::LockSet;
use crate::core::tables::{CategoryTables, TablePath};
use crate::schema::category::Category;
use crate::schema::entries::{AgeRange, Theory};
use crate::schema::record::GeneratedRecord;

/// Produce a new record for `category`.
///
/// Locked fields are copied from `previous` verbatim (a locked field with
/// no previous value stays absent). Every other schema field is drawn
/// fresh; a field whose table is missing or empty is left absent.
/// Unlocked fields outside the schema are not carried over.
pub fn regenerate<R: Rng + ?Sized>(
    category: Category,
    previous: &GeneratedRecord,
    locks: &LockSet,
    tables: &CategoryTables,
    rng: &mut R,
) -> GeneratedRecord {
    let mut record = GeneratedRecord::new();

    for field in locks.iter() {
        if let Some(value) = previous.get(field) {
            record.insert(field, value);
        }
    }

    for spec in schema(category) {
        if locks.contains(spec.name) {
            continue;
        }
        match draw_field(&spec.kind, &record, tables, rng) {
            Some(value) => record.insert(spec.name, value),
            None => log::debug!(
                "Skipping {} field '{}': backing table missing or empty",
                category,
                spec.name
            ),
        }
    }

    record
}

/// Draw one value for a field. `record` is the record built so far in this
/// pass, consulted by fields that reuse earlier values.
pub fn draw_field<R: Rng + ?Sized>(
    kind: &FieldKind,
    record: &GeneratedRecord,
    tables: &CategoryTables,
    rng: &mut R,
) -> Option<String> {
    match kind {
        FieldKind::Pick(path) => pick(tables, path, rng).map(str::to_string),
        FieldKind::Age(path) => {
            let ranges: Vec<AgeRange> = tables.entries(path)?;
            let range = ranges.choose(rng)?;
            let (lo, hi) = (range.min.min(range.max), range.min.max(range.max));
            let age = rng.gen_range(lo..=hi);
            Some(format!("{} ({})", range.name, age))
        }
        FieldKind::ParentStatus { alive, deceased } => {
            let table = if rng.gen_bool(PARENT_ALIVE_PROBABILITY) {
                alive
            } else {
                deceased
            };
            pick(tables, table, rng).map(str::to_string)
        }
        FieldKind::DistinctPair { table, style } => {
            let (first, second) = distinct_pair(tables, table, rng)?;
            Some(style.join(first, second))
        }
        FieldKind::Theory(path) => {
            let theories: Vec<Theory> = tables.entries(path)?;
            theories.choose(rng).map(Theory::display)
        }
        FieldKind::StoryHook { descriptor, event } => {
            let descriptor = pick(tables, descriptor, rng)?;
            let event = pick(tables, event, rng)?;
            Some(format!(
                "A {} {} begins the character's journey.",
                descriptor, event
            ))
        }
        FieldKind::Summary(sources) => summary(sources, record, tables, rng),
    }
}

/// Uniform pick from the string table at `path`.
fn pick<'a, R: Rng + ?Sized>(
    tables: &'a CategoryTables,
    path: &TablePath,
    rng: &mut R,
) -> Option<&'a str> {
    tables.strings(path)?.choose(rng).copied()
}

/// Two different values from one table, drawing the second until it
/// differs from the first. `None` when the table cannot supply two
/// distinct values.
fn distinct_pair<'a, R: Rng + ?Sized>(
    tables: &'a CategoryTables,
    path: &TablePath,
    rng: &mut R,
) -> Option<(&'a str, &'a str)> {
    let candidates = tables.strings(path)?;
    let first = *candidates.choose(rng)?;
    if candidates.iter().all(|c| *c == first) {
        return None;
    }
    loop {
        let second = *candidates.choose(rng)?;
        if second != first {
            return Some((first, second));
        }
    }
}

fn reuse_or_draw<R: Rng + ?Sized>(
    part: &ReusedPart,
    record: &GeneratedRecord,
    tables: &CategoryTables,
    rng: &mut R,
) -> Option<String> {
    match record.get(part.field) {
        Some(value) => Some(value.to_string()),
        None => pick(tables, &part.table, rng).map(str::to_string),
    }
}

fn summary<R: Rng + ?Sized>(
    sources: &SummarySources,
    record: &GeneratedRecord,
    tables: &CategoryTables,
    rng: &mut R,
) -> Option<String> {
    let age = rng.gen_range(SUMMARY_AGE_RANGE.0..=SUMMARY_AGE_RANGE.1);
    let gender = pick(tables, &sources.gender, rng)?;
    let race = pick(tables, &sources.race, rng)?;
    let ending = pick(tables, &sources.ending, rng)?;

    // Fresh draws here only feed the sentence; they are not stored.
    let genre = reuse_or_draw(&sources.genre, record, tables, rng)?;
    let protagonist = reuse_or_draw(&sources.protagonist, record, tables, rng)?;
    let relationship = reuse_or_draw(&sources.relationship, record, tables, rng)?;

    Some(format!(
        "This is a {}-themed story featuring a {}-year-old {} {} {} with a relationship of {}. The ending is {}.",
        genre, age, protagonist, gender, race, relationship, ending
    ))
}
