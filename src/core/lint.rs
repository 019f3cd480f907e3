/// Table linting: checks a set of category tables against the field
/// schemas before they are used for generation.

use rustc_hash::FxHashSet;
use std::fmt;

use crate::core::fields::{schema, FieldKind};
use crate::core::tables::{CategoryTables, TablePath, TAROT_CARDS, TAROT_LAYOUTS};
use crate::schema::category::Category;
use crate::schema::entries::{AgeRange, Theory};

/// One finding. Errors stop fields from generating; warnings do not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LintIssue {
    MissingTable { field: String, path: String },
    TooFewDistinct { field: String, path: String },
    InvertedAgeRange { path: String, name: String },
    DuplicateCard(String),
    LayoutTooLarge { layout: String, slots: usize, deck: usize },
    NoTarotLayouts,
    NoTarotCards,
}

impl LintIssue {
    pub fn is_error(&self) -> bool {
        !matches!(self, Self::InvertedAgeRange { .. })
    }
}

impl fmt::Display for LintIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTable { field, path } => {
                write!(f, "field '{}' has no usable table at {}", field, path)
            }
            Self::TooFewDistinct { field, path } => write!(
                f,
                "field '{}' needs two distinct values but {} has fewer",
                field, path
            ),
            Self::InvertedAgeRange { path, name } => {
                write!(f, "age range '{}' in {} has min > max", name, path)
            }
            Self::DuplicateCard(name) => write!(f, "tarot card '{}' appears more than once", name),
            Self::LayoutTooLarge { layout, slots, deck } => write!(
                f,
                "layout '{}' has {} slots but the deck has {} cards",
                layout, slots, deck
            ),
            Self::NoTarotLayouts => write!(f, "no tarot layouts at {}", TAROT_LAYOUTS),
            Self::NoTarotCards => write!(f, "no tarot cards at {}", TAROT_CARDS),
        }
    }
}

/// Errors and warnings found in a set of tables.
#[derive(Debug, Clone, Default)]
pub struct LintReport {
    pub issues: Vec<LintIssue>,
}

impl LintReport {
    pub fn errors(&self) -> impl Iterator<Item = &LintIssue> {
        self.issues.iter().filter(|issue| issue.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &LintIssue> {
        self.issues.iter().filter(|issue| !issue.is_error())
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

pub fn lint_tables(tables: &CategoryTables) -> LintReport {
    let mut report = LintReport::default();
    for category in Category::ALL {
        for spec in schema(category) {
            lint_field(spec.name, &spec.kind, tables, &mut report);
        }
    }
    lint_tarot(tables, &mut report);
    report
}

fn lint_field(field: &str, kind: &FieldKind, tables: &CategoryTables, report: &mut LintReport) {
    let require_strings = |path: &TablePath, report: &mut LintReport| {
        if tables.strings(path).is_none() {
            report.issues.push(LintIssue::MissingTable {
                field: field.to_string(),
                path: path.to_string(),
            });
        }
    };

    match kind {
        FieldKind::Pick(path) => require_strings(path, report),
        FieldKind::ParentStatus { alive, deceased } => {
            require_strings(alive, report);
            require_strings(deceased, report);
        }
        FieldKind::StoryHook { descriptor, event } => {
            require_strings(descriptor, report);
            require_strings(event, report);
        }
        FieldKind::Summary(sources) => {
            for path in [
                &sources.gender,
                &sources.race,
                &sources.ending,
                &sources.genre.table,
                &sources.protagonist.table,
                &sources.relationship.table,
            ] {
                require_strings(path, report);
            }
        }
        FieldKind::DistinctPair { table, .. } => match tables.strings(table) {
            None => require_strings(table, report),
            Some(values) => {
                let distinct: FxHashSet<&str> = values.into_iter().collect();
                if distinct.len() < 2 {
                    report.issues.push(LintIssue::TooFewDistinct {
                        field: field.to_string(),
                        path: table.to_string(),
                    });
                }
            }
        },
        FieldKind::Age(path) => match tables.entries::<AgeRange>(path) {
            None => report.issues.push(LintIssue::MissingTable {
                field: field.to_string(),
                path: path.to_string(),
            }),
            Some(ranges) => {
                for range in ranges.into_iter().filter(|r| r.min > r.max) {
                    report.issues.push(LintIssue::InvertedAgeRange {
                        path: path.to_string(),
                        name: range.name,
                    });
                }
            }
        },
        FieldKind::Theory(path) => {
            if tables.entries::<Theory>(path).is_none() {
                report.issues.push(LintIssue::MissingTable {
                    field: field.to_string(),
                    path: path.to_string(),
                });
            }
        }
    }
}

fn lint_tarot(tables: &CategoryTables, report: &mut LintReport) {
    let layouts = tables.tarot_layouts();
    let deck = tables.tarot_deck();

    if layouts.is_empty() {
        report.issues.push(LintIssue::NoTarotLayouts);
    }
    if deck.is_empty() {
        report.issues.push(LintIssue::NoTarotCards);
    }

    let mut seen = FxHashSet::default();
    for card in &deck {
        if !seen.insert(card.name.as_str()) {
            report.issues.push(LintIssue::DuplicateCard(card.name.clone()));
        }
    }

    for layout in &layouts {
        if layout.slots.len() > deck.len() {
            report.issues.push(LintIssue::LayoutTooLarge {
                layout: layout.name.clone(),
                slots: layout.slots.len(),
                deck: deck.len(),
            });
        }
    }
}
