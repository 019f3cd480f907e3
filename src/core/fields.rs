/// Field schemas: which fields each category generates, how each value is
/// drawn, and which table backs it.

use crate::core::tables::TablePath;
use crate::schema::category::Category;

const CHARS: Category = Category::Characters;
const STORIES: Category = Category::Stories;
const MUSIC: Category = Category::Music;

/// How the two halves of a distinct pair are joined for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairStyle {
    /// `a, b`
    Comma,
    /// `1. a` / `2. b` on separate lines
    Numbered,
}

impl PairStyle {
    pub fn join(&self, first: &str, second: &str) -> String {
        match self {
            Self::Comma => format!("{}, {}", first, second),
            Self::Numbered => format!("1. {}\n2. {}", first, second),
        }
    }
}

/// A summary ingredient that reuses a sibling field's value when this
/// generation pass already produced (or kept) one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReusedPart {
    pub field: &'static str,
    pub table: TablePath,
}

/// Sources for the story summary sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummarySources {
    pub genre: ReusedPart,
    pub protagonist: ReusedPart,
    pub relationship: ReusedPart,
    pub gender: TablePath,
    pub race: TablePath,
    pub ending: TablePath,
}

/// Inclusive bounds of the age drawn for a story summary.
pub const SUMMARY_AGE_RANGE: (i64, i64) = (0, 120);

/// Probability that a parent status is drawn from the "alive" table.
pub const PARENT_ALIVE_PROBABILITY: f64 = 0.7;

/// The drawing rule for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// One uniform pick.
    Pick(TablePath),
    /// Uniform age range, then a uniform age inside it.
    Age(TablePath),
    /// Alive table with [`PARENT_ALIVE_PROBABILITY`], deceased table otherwise.
    ParentStatus { alive: TablePath, deceased: TablePath },
    /// Two different picks from the same table.
    DistinctPair { table: TablePath, style: PairStyle },
    /// A structured theory rendered as `Title: "statement"`.
    Theory(TablePath),
    /// A descriptor and an event dropped into a fixed sentence.
    StoryHook { descriptor: TablePath, event: TablePath },
    /// The story summary sentence.
    Summary(SummarySources),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn pick(name: &'static str, document: Category, segments: &'static [&'static str]) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::Pick(TablePath::new(document, segments)),
    }
}

const fn parent(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::ParentStatus {
            alive: TablePath::new(CHARS, &["parent_status_alive"]),
            deceased: TablePath::new(CHARS, &["parent_status_deceased"]),
        },
    }
}

const THEORIES: TablePath = TablePath::new(STORIES, &["character", "theories_of_control"]);
const RELATIONSHIPS: TablePath = TablePath::new(STORIES, &["character", "relationship"]);
const DESCRIPTORS: TablePath = TablePath::new(STORIES, &["character", "descriptors"]);
const GENRES: TablePath = TablePath::new(STORIES, &["plot", "genres"]);

/// Character fields in generation order.
pub const CHARACTER_FIELDS: &[FieldSpec] = &[
    pick("Race", CHARS, &["basic", "race"]),
    pick("Gender", CHARS, &["basic", "gender"]),
    FieldSpec {
        name: "Age",
        kind: FieldKind::Age(TablePath::new(CHARS, &["basic", "age_ranges"])),
    },
    pick("Attracted To", CHARS, &["basic", "attracted to"]),
    pick("Height", CHARS, &["appearance", "height"]),
    pick("Build", CHARS, &["appearance", "build"]),
    pick("Hair Color", CHARS, &["appearance", "hair_color"]),
    pick("Hair Style", CHARS, &["appearance", "hair_style"]),
    pick("Eye Color", CHARS, &["appearance", "eye_color"]),
    pick("Skin Tone", CHARS, &["appearance", "skin_tone"]),
    pick("Dist. Feature", CHARS, &["appearance", "distinctive_features"]),
    pick("Trait", CHARS, &["personality", "traits"]),
    pick("Flaw", CHARS, &["personality", "flaws"]),
    pick("Value", CHARS, &["personality", "values"]),
    pick("Motivation", CHARS, &["personality", "motivations"]),
    pick("Occupation", CHARS, &["background", "occupation"]),
    pick("Social Class", CHARS, &["background", "social_class"]),
    pick("Homeland", CHARS, &["background", "homeland"]),
    pick("Family", CHARS, &["background", "family_status"]),
    pick("National Heritage", CHARS, &["CHARACTER_NATIONAL_HERITAGE"]),
    parent("Mother Status"),
    parent("Father Status"),
    pick("Name Type", CHARS, &["CHARACTER_NAME_TYPE"]),
    FieldSpec {
        name: "Skills",
        kind: FieldKind::DistinctPair {
            table: TablePath::new(CHARS, &["abilities", "skills"]),
            style: PairStyle::Comma,
        },
    },
    pick("Special Ability", CHARS, &["abilities", "special_abilities"]),
    pick("Notable Equipment", CHARS, &["abilities", "equipment"]),
    FieldSpec {
        name: "Relationship Status",
        kind: FieldKind::Pick(RELATIONSHIPS),
    },
    pick("Ally", CHARS, &["relationships", "allies"]),
    pick("Enemy", CHARS, &["relationships", "enemies"]),
    pick("Organization", CHARS, &["relationships", "organizations"]),
    pick("Story Style", CHARS, &["STORY_DESCRIPTOR"]),
    pick("Intimate Preference", CHARS, &["SEX_KINK"]),
    FieldSpec {
        name: "Speech Patterns",
        kind: FieldKind::DistinctPair {
            table: TablePath::new(CHARS, &["CHARACTER_SPEECH"]),
            style: PairStyle::Numbered,
        },
    },
    FieldSpec {
        name: "Story Hook",
        kind: FieldKind::StoryHook {
            descriptor: TablePath::new(CHARS, &["STORY_DESCRIPTOR"]),
            event: TablePath::new(CHARS, &["BASIC_EVENT"]),
        },
    },
    FieldSpec {
        name: "Theory of Control",
        kind: FieldKind::Theory(THEORIES),
    },
];

/// Story fields in generation order. Summary comes last so it can reuse
/// the values drawn before it.
pub const STORY_FIELDS: &[FieldSpec] = &[
    pick("Archetype", STORIES, &["plot", "archetypes"]),
    pick("Perspective", STORIES, &["plot", "perspectives"]),
    FieldSpec {
        name: "Genre",
        kind: FieldKind::Pick(GENRES),
    },
    pick("Social Issue", STORIES, &["plot", "social_issues"]),
    pick("Theme", STORIES, &["plot", "universal_human_questions"]),
    FieldSpec {
        name: "Protagonist Theory",
        kind: FieldKind::Theory(THEORIES),
    },
    FieldSpec {
        name: "Protagonist Desc.",
        kind: FieldKind::Pick(DESCRIPTORS),
    },
    FieldSpec {
        name: "Relationship",
        kind: FieldKind::Pick(RELATIONSHIPS),
    },
    FieldSpec {
        name: "Summary",
        kind: FieldKind::Summary(SummarySources {
            genre: ReusedPart {
                field: "Genre",
                table: GENRES,
            },
            protagonist: ReusedPart {
                field: "Protagonist Desc.",
                table: DESCRIPTORS,
            },
            relationship: ReusedPart {
                field: "Relationship",
                table: RELATIONSHIPS,
            },
            gender: TablePath::new(STORIES, &["character", "gender"]),
            race: TablePath::new(STORIES, &["character", "race"]),
            ending: DESCRIPTORS,
        }),
    },
];

pub const MUSIC_FIELDS: &[FieldSpec] = &[
    pick("Style", MUSIC, &["styles"]),
    pick("Genre", MUSIC, &["genres"]),
    pick("Emotion", MUSIC, &["emotions"]),
    pick("High Inst.", MUSIC, &["instrumentation_highs"]),
    pick("Mid Inst.", MUSIC, &["instrumentation_mids"]),
    pick("Low Inst.", MUSIC, &["instrumentation_lows"]),
    pick("Ear Candy", MUSIC, &["ear_candy"]),
    pick("Vocal FX", MUSIC, &["vocal_effects"]),
    pick("Chord Prog.", MUSIC, &["chord_progressions"]),
    pick("Melody Idea", MUSIC, &["melody_ideas"]),
    pick("Ambience", MUSIC, &["ambience_ideas"]),
];

pub fn schema(category: Category) -> &'static [FieldSpec] {
    match category {
        Category::Characters => CHARACTER_FIELDS,
        Category::Stories => STORY_FIELDS,
        Category::Music => MUSIC_FIELDS,
    }
}

pub fn field_spec(category: Category, name: &str) -> Option<&'static FieldSpec> {
    schema(category).iter().find(|spec| spec.name == name)
}

/// A titled group of fields for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub title: Option<&'static str>,
    pub fields: &'static [&'static str],
}

const CHARACTER_SECTIONS: &[Section] = &[
    Section {
        title: Some("BASIC INFORMATION"),
        fields: &["Name", "Race", "Gender", "Age"],
    },
    Section {
        title: Some("APPEARANCE"),
        fields: &[
            "Height",
            "Build",
            "Hair Color",
            "Hair Style",
            "Eye Color",
            "Skin Tone",
            "Dist. Feature",
        ],
    },
    Section {
        title: Some("PERSONALITY"),
        fields: &["Trait", "Flaw", "Value", "Motivation"],
    },
    Section {
        title: Some("BACKGROUND"),
        fields: &[
            "Attracted To",
            "Occupation",
            "Social Class",
            "Homeland",
            "Family",
            "National Heritage",
            "Mother Status",
            "Father Status",
            "Name Type",
        ],
    },
    Section {
        title: Some("ABILITIES"),
        fields: &["Skills", "Special Ability", "Notable Equipment"],
    },
    Section {
        title: Some("RELATIONSHIPS"),
        fields: &["Relationship Status", "Ally", "Enemy", "Organization"],
    },
    Section {
        title: Some("DETAILS"),
        fields: &["Story Style", "Intimate Preference"],
    },
    Section {
        title: Some("SPEECH PATTERNS"),
        fields: &["Speech Patterns"],
    },
    Section {
        title: Some("STORY HOOK"),
        fields: &["Story Hook", "Theory of Control"],
    },
];

const STORY_SECTIONS: &[Section] = &[
    Section {
        title: None,
        fields: &["Summary"],
    },
    Section {
        title: None,
        fields: &[
            "Archetype",
            "Perspective",
            "Genre",
            "Social Issue",
            "Theme",
            "Protagonist Theory",
            "Protagonist Desc.",
            "Relationship",
        ],
    },
];

const MUSIC_SECTIONS: &[Section] = &[Section {
    title: None,
    fields: &[
        "Style",
        "Genre",
        "Emotion",
        "High Inst.",
        "Mid Inst.",
        "Low Inst.",
        "Ear Candy",
        "Vocal FX",
        "Chord Prog.",
        "Melody Idea",
        "Ambience",
    ],
}];

pub fn display_sections(category: Category) -> &'static [Section] {
    match category {
        Category::Characters => CHARACTER_SECTIONS,
        Category::Stories => STORY_SECTIONS,
        Category::Music => MUSIC_SECTIONS,
    }
}

/// Every displayable field of a category, in display order.
pub fn display_order(category: Category) -> impl Iterator<Item = &'static str> {
    display_sections(category)
        .iter()
        .flat_map(|section| section.fields.iter().copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn schema_field_names_are_unique() {
        for category in Category::ALL {
            let names: HashSet<_> = schema(category).iter().map(|f| f.name).collect();
            assert_eq!(names.len(), schema(category).len(), "{}", category);
        }
    }

    #[test]
    fn every_schema_field_is_displayed() {
        for category in Category::ALL {
            let shown: HashSet<_> = display_order(category).collect();
            for spec in schema(category) {
                assert!(
                    shown.contains(spec.name),
                    "{} field '{}' has no display slot",
                    category,
                    spec.name
                );
            }
        }
    }

    #[test]
    fn relationship_status_reads_story_table() {
        let spec = field_spec(Category::Characters, "Relationship Status").unwrap();
        match spec.kind {
            FieldKind::Pick(path) => {
                assert_eq!(path.document, Category::Stories);
                assert_eq!(path.segments, &["character", "relationship"]);
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn summary_is_generated_last() {
        assert_eq!(STORY_FIELDS.last().map(|f| f.name), Some("Summary"));
    }

    #[test]
    fn story_display_starts_with_summary() {
        assert_eq!(display_order(Category::Stories).next(), Some("Summary"));
    }

    #[test]
    fn pair_styles() {
        assert_eq!(PairStyle::Comma.join("Archery", "Cooking"), "Archery, Cooking");
        assert_eq!(
            PairStyle::Numbered.join("Stutters", "Whispers"),
            "1. Stutters\n2. Whispers"
        );
    }
}
