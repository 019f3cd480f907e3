/// Tarot engine: deals a layout from a shuffled deck.

use rand::seq::SliceRandom;
use rand::Rng;
use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::core::tables::CategoryTables;
use crate::schema::tarot::{DrawnCard, TarotCard, TarotLayout, TarotResult};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TarotError {
    #[error("layout '{layout}' needs {slots} cards but the deck has only {deck}")]
    DeckTooSmall {
        layout: String,
        slots: usize,
        deck: usize,
    },
    #[error("deck contains the card '{0}' more than once")]
    DuplicateCard(String),
    #[error("no tarot layout at index {index} ({available} available)")]
    UnknownLayout { index: usize, available: usize },
    #[error("no tarot layouts are defined")]
    NoLayouts,
}

/// Deal one card per slot of `layout`.
///
/// The deck is shuffled uniformly (Fisher–Yates) and the first cards are
/// paired with the slots in order, so no card appears twice. Each card is
/// independently reversed with probability one half.
pub fn draw<R: Rng + ?Sized>(
    layout: &TarotLayout,
    deck: &[TarotCard],
    rng: &mut R,
) -> Result<TarotResult, TarotError> {
    if deck.len() < layout.slots.len() {
        return Err(TarotError::DeckTooSmall {
            layout: layout.name.clone(),
            slots: layout.slots.len(),
            deck: deck.len(),
        });
    }

    let mut seen = FxHashSet::default();
    for card in deck {
        if !seen.insert(card.name.as_str()) {
            return Err(TarotError::DuplicateCard(card.name.clone()));
        }
    }

    let mut order: Vec<&TarotCard> = deck.iter().collect();
    order.shuffle(rng);

    let cards = layout
        .slots
        .iter()
        .zip(order)
        .map(|(slot, card)| {
            let is_reversed = rng.gen_bool(0.5);
            DrawnCard {
                slot: slot.clone(),
                name: card.name.clone(),
                is_reversed,
                keyword: card.keyword.clone(),
                meaning: if is_reversed {
                    card.reversed.clone()
                } else {
                    card.upright.clone()
                },
            }
        })
        .collect();

    Ok(TarotResult {
        layout_name: layout.name.clone(),
        cards,
    })
}

/// Draw using the layout at `layout_index` and the deck from `tables`.
pub fn draw_from_tables<R: Rng + ?Sized>(
    tables: &CategoryTables,
    layout_index: usize,
    rng: &mut R,
) -> Result<TarotResult, TarotError> {
    let layouts = tables.tarot_layouts();
    if layouts.is_empty() {
        return Err(TarotError::NoLayouts);
    }
    let layout = layouts.get(layout_index).ok_or(TarotError::UnknownLayout {
        index: layout_index,
        available: layouts.len(),
    })?;
    draw(layout, &tables.tarot_deck(), rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn card(name: &str) -> TarotCard {
        TarotCard {
            name: name.to_string(),
            keyword: format!("{} keyword", name),
            upright: format!("{} upright", name),
            reversed: format!("{} reversed", name),
        }
    }

    fn deck(n: usize) -> Vec<TarotCard> {
        (0..n).map(|i| card(&format!("Card {}", i))).collect()
    }

    fn layout(slots: &[&str]) -> TarotLayout {
        TarotLayout {
            name: "Test Spread".to_string(),
            slots: slots.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn three_slots_from_five_cards() {
        let spread = layout(&["Past", "Present", "Future"]);
        let deck = deck(5);
        let mut rng = StdRng::seed_from_u64(42);
        let result = draw(&spread, &deck, &mut rng).unwrap();

        assert_eq!(result.layout_name, "Test Spread");
        assert_eq!(result.cards.len(), 3);
        let slots: Vec<_> = result.cards.iter().map(|c| c.slot.as_str()).collect();
        assert_eq!(slots, vec!["Past", "Present", "Future"]);
        let names: FxHashSet<_> = result.cards.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names.len(), 3);
    }

    #[test]
    fn meaning_follows_orientation() {
        let spread = layout(&["A", "B", "C", "D"]);
        let deck = deck(10);
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let result = draw(&spread, &deck, &mut rng).unwrap();
            for drawn in &result.cards {
                let expected = if drawn.is_reversed {
                    format!("{} reversed", drawn.name)
                } else {
                    format!("{} upright", drawn.name)
                };
                assert_eq!(drawn.meaning, expected);
                assert_eq!(drawn.keyword, format!("{} keyword", drawn.name));
            }
        }
    }

    #[test]
    fn deck_too_small_is_rejected() {
        let spread = layout(&["A", "B", "C"]);
        let mut rng = StdRng::seed_from_u64(1);
        let err = draw(&spread, &deck(2), &mut rng).unwrap_err();
        assert_eq!(
            err,
            TarotError::DeckTooSmall {
                layout: "Test Spread".to_string(),
                slots: 3,
                deck: 2,
            }
        );
    }

    #[test]
    fn exact_size_deck_uses_every_card() {
        let spread = layout(&["A", "B", "C"]);
        let mut rng = StdRng::seed_from_u64(8);
        let result = draw(&spread, &deck(3), &mut rng).unwrap();
        let names: FxHashSet<_> = result.cards.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names.len(), 3);
    }

    #[test]
    fn duplicate_card_names_are_rejected() {
        let spread = layout(&["A"]);
        let deck = vec![card("The Tower"), card("The Tower")];
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            draw(&spread, &deck, &mut rng).unwrap_err(),
            TarotError::DuplicateCard("The Tower".to_string())
        );
    }

    #[test]
    fn first_slot_is_roughly_uniform() {
        let spread = layout(&["Only"]);
        let deck = deck(4);
        let mut counts: HashMap<String, u32> = HashMap::new();
        let mut rng = StdRng::seed_from_u64(2024);
        for _ in 0..4000 {
            let result = draw(&spread, &deck, &mut rng).unwrap();
            *counts.entry(result.cards[0].name.clone()).or_default() += 1;
        }
        assert_eq!(counts.len(), 4);
        for (name, count) in &counts {
            assert!(
                *count > 850 && *count < 1150,
                "{} drawn {} times out of 4000",
                name,
                count
            );
        }
    }

    #[test]
    fn orientation_is_roughly_even() {
        let spread = layout(&["A", "B", "C"]);
        let deck = deck(5);
        let mut reversed = 0;
        let mut rng = StdRng::seed_from_u64(77);
        for _ in 0..1000 {
            let result = draw(&spread, &deck, &mut rng).unwrap();
            reversed += result.cards.iter().filter(|c| c.is_reversed).count();
        }
        assert!(reversed > 1350 && reversed < 1650, "reversed: {}/3000", reversed);
    }
}
