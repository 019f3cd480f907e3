/// Generation integration tests: fixture tables through the engine.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;
use story_spinner::core::fields::{schema, FieldKind};
use story_spinner::core::generate::regenerate;
use story_spinner::core::locks::LockSet;
use story_spinner::core::persistence::{MemoryStorage, PersistenceStore, DEFAULT_STORAGE_KEY};
use story_spinner::core::tables::CategoryTables;
use story_spinner::core::tarot::{draw, TarotError};
use story_spinner::schema::category::Category;
use story_spinner::schema::record::GeneratedRecord;
use story_spinner::schema::tarot::{TarotCard, TarotLayout};
use std::collections::HashSet;
use std::path::Path;

fn fixture_tables() -> CategoryTables {
    CategoryTables::load_from_dir(Path::new("tests/fixtures")).unwrap()
}

fn card(name: &str) -> TarotCard {
    TarotCard {
        name: name.to_string(),
        keyword: format!("{} keyword", name),
        upright: format!("{} upright", name),
        reversed: format!("{} reversed", name),
    }
}

#[test]
fn fixtures_fill_every_schema_field() {
    let tables = fixture_tables();
    let mut rng = StdRng::seed_from_u64(42);
    for category in Category::ALL {
        let record = regenerate(
            category,
            &GeneratedRecord::new(),
            &LockSet::new(),
            &tables,
            &mut rng,
        );
        for spec in schema(category) {
            assert!(
                record.contains(spec.name),
                "{} missing from {} record",
                spec.name,
                category
            );
        }
        assert_eq!(record.len(), schema(category).len());
    }
}

#[test]
fn picked_values_come_from_their_tables() {
    let tables = fixture_tables();
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..25 {
        for category in Category::ALL {
            let record = regenerate(
                category,
                &GeneratedRecord::new(),
                &LockSet::new(),
                &tables,
                &mut rng,
            );
            for spec in schema(category) {
                if let FieldKind::Pick(path) = spec.kind {
                    let candidates = tables.strings(&path).unwrap();
                    let value = record.get(spec.name).unwrap();
                    assert!(
                        candidates.contains(&value),
                        "{} = {:?} not in {}",
                        spec.name,
                        value,
                        path
                    );
                }
            }
        }
    }
}

#[test]
fn character_age_uses_named_range() {
    let tables = fixture_tables();
    let mut rng = StdRng::seed_from_u64(3);
    let bounds = [("Child", 6, 12), ("Young Adult", 18, 25), ("Elder", 65, 90)];
    for _ in 0..50 {
        let record = regenerate(
            Category::Characters,
            &GeneratedRecord::new(),
            &LockSet::new(),
            &tables,
            &mut rng,
        );
        let age = record.get("Age").unwrap();
        let (name, rest) = age.split_once(" (").unwrap();
        let years: i64 = rest.trim_end_matches(')').parse().unwrap();
        let (_, min, max) = bounds.iter().find(|(n, _, _)| *n == name).unwrap();
        assert!((*min..=*max).contains(&years), "{}", age);
    }
}

#[test]
fn skills_and_speech_never_repeat() {
    let tables = fixture_tables();
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..100 {
        let record = regenerate(
            Category::Characters,
            &GeneratedRecord::new(),
            &LockSet::new(),
            &tables,
            &mut rng,
        );
        let (a, b) = record.get("Skills").unwrap().split_once(", ").unwrap();
        assert_ne!(a, b);

        let speech = record.get("Speech Patterns").unwrap();
        let lines: Vec<_> = speech.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("1. "));
        assert!(lines[1].starts_with("2. "));
        assert_ne!(&lines[0][3..], &lines[1][3..]);
    }
}

#[test]
fn story_summary_reuses_drawn_parts() {
    let tables = fixture_tables();
    let mut rng = StdRng::seed_from_u64(5);
    let record = regenerate(
        Category::Stories,
        &GeneratedRecord::new(),
        &LockSet::new(),
        &tables,
        &mut rng,
    );
    let summary = record.get("Summary").unwrap();
    let genre = record.get("Genre").unwrap();
    let protagonist = record.get("Protagonist Desc.").unwrap();
    let relationship = record.get("Relationship").unwrap();
    assert!(summary.starts_with(&format!("This is a {}-themed story featuring a ", genre)));
    assert!(summary.contains(&format!("-year-old {} ", protagonist)));
    assert!(summary.contains(&format!("with a relationship of {}.", relationship)));
}

// Singleton table makes the pick deterministic.
#[test]
fn singleton_style_is_always_chosen() {
    let tables = CategoryTables::default().with_document(
        Category::Music,
        json!({ "styles": ["Ambient"] }),
    );
    for seed in 0..10 {
        let mut rng = StdRng::seed_from_u64(seed);
        let record = regenerate(
            Category::Music,
            &GeneratedRecord::new(),
            &LockSet::new(),
            &tables,
            &mut rng,
        );
        assert_eq!(record.get("Style"), Some("Ambient"));
    }
}

#[test]
fn locked_race_survives_repeated_regeneration() {
    let tables = fixture_tables();
    let mut rng = StdRng::seed_from_u64(99);
    let mut record = regenerate(
        Category::Characters,
        &GeneratedRecord::new(),
        &LockSet::new(),
        &tables,
        &mut rng,
    );
    record.insert("Race", "Elf");
    let locks: LockSet = ["Race"].into_iter().collect();

    for _ in 0..2 {
        record = regenerate(Category::Characters, &record, &locks, &tables, &mut rng);
        assert_eq!(record.get("Race"), Some("Elf"));
    }
}

#[test]
fn locked_fields_match_previous_record_exactly() {
    let tables = fixture_tables();
    let mut rng = StdRng::seed_from_u64(21);
    let previous = regenerate(
        Category::Characters,
        &GeneratedRecord::new(),
        &LockSet::new(),
        &tables,
        &mut rng,
    );
    let locks: LockSet = ["Skills", "Age", "Story Hook", "Mother Status"]
        .into_iter()
        .collect();
    for _ in 0..20 {
        let next = regenerate(Category::Characters, &previous, &locks, &tables, &mut rng);
        for field in locks.iter() {
            assert_eq!(next.get(field), previous.get(field));
        }
    }
}

#[test]
fn three_card_spread_from_five_card_deck() {
    let layout = TarotLayout {
        name: "Past, Present, Future".to_string(),
        slots: vec!["Past".into(), "Present".into(), "Future".into()],
    };
    let deck: Vec<_> = ["A", "B", "C", "D", "E"].iter().map(|n| card(n)).collect();
    let mut rng = StdRng::seed_from_u64(8);

    let mut saw_reversed = false;
    let mut saw_upright = false;
    for _ in 0..50 {
        let result = draw(&layout, &deck, &mut rng).unwrap();
        assert_eq!(result.cards.len(), 3);
        let names: HashSet<_> = result.cards.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names.len(), 3);
        for (drawn, slot) in result.cards.iter().zip(&layout.slots) {
            assert_eq!(&drawn.slot, slot);
            saw_reversed |= drawn.is_reversed;
            saw_upright |= !drawn.is_reversed;
        }
    }
    assert!(saw_reversed && saw_upright);
}

#[test]
fn fixture_crossroads_layout_draws_five_distinct() {
    let tables = fixture_tables();
    let layout = &tables.tarot_layouts()[2];
    let mut rng = StdRng::seed_from_u64(13);
    let result = draw(layout, &tables.tarot_deck(), &mut rng).unwrap();
    assert_eq!(result.layout_name, "Crossroads");
    let names: HashSet<_> = result.cards.iter().map(|c| c.name.clone()).collect();
    assert_eq!(names.len(), 5);
}

#[test]
fn oversized_layout_is_rejected() {
    let layout = TarotLayout {
        name: "Big".to_string(),
        slots: (0..4).map(|i| format!("slot {}", i)).collect(),
    };
    let deck: Vec<_> = ["A", "B", "C"].iter().map(|n| card(n)).collect();
    let mut rng = StdRng::seed_from_u64(1);
    assert_eq!(
        draw(&layout, &deck, &mut rng),
        Err(TarotError::DeckTooSmall {
            layout: "Big".to_string(),
            slots: 4,
            deck: 3,
        })
    );
}

#[test]
fn invalid_saved_state_restores_nothing() {
    let storage = MemoryStorage::new().with_slot(DEFAULT_STORAGE_KEY, "{not json");
    let store = PersistenceStore::new(storage);
    assert!(store.restore().is_none());
}

#[test]
fn json_and_ron_documents_load_alike() {
    let dir = std::env::temp_dir().join(format!("story-spinner-ron-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    for name in ["character_elements", "story_elements"] {
        std::fs::copy(
            Path::new("tests/fixtures").join(format!("{}.json", name)),
            dir.join(format!("{}.json", name)),
        )
        .unwrap();
    }
    std::fs::write(
        dir.join("music_elements.ron"),
        r#"{ "styles": ["Lo-fi"], "genres": ["Jazz"] }"#,
    )
    .unwrap();

    let tables = CategoryTables::load_from_dir(&dir).unwrap();
    let mut rng = StdRng::seed_from_u64(0);
    let record = regenerate(
        Category::Music,
        &GeneratedRecord::new(),
        &LockSet::new(),
        &tables,
        &mut rng,
    );
    assert_eq!(record.get("Style"), Some("Lo-fi"));
    assert_eq!(record.get("Genre"), Some("Jazz"));
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn fixture_tables_pass_the_linter() {
    let report = story_spinner::core::lint::lint_tables(&fixture_tables());
    assert!(report.is_clean(), "{:?}", report.issues);
}
