/// Plain-text export of records and tarot draws, as handed to the clipboard.

use crate::core::fields::display_order;
use crate::schema::category::Category;
use crate::schema::record::GeneratedRecord;
use crate::schema::tarot::TarotResult;

/// One `key: value` line per present field, in display order. Fields the
/// display order does not know are appended in name order.
pub fn format_record(category: Category, record: &GeneratedRecord) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(record.len());
    let known: Vec<&str> = display_order(category).collect();

    for field in &known {
        if let Some(value) = record.get(field) {
            lines.push(format!("{}: {}", field, value));
        }
    }

    let mut extra: Vec<(&str, &str)> = record
        .iter()
        .filter(|(field, _)| !known.contains(field))
        .collect();
    extra.sort();
    for (field, value) in extra {
        lines.push(format!("{}: {}", field, value));
    }

    lines.join("\n")
}

/// Header line, then per card its slot/name/orientation, keyword and
/// meaning, each card followed by a blank line.
pub fn format_tarot(result: &TarotResult) -> String {
    let mut lines = vec![format!("=== {} ===", result.layout_name)];
    for card in &result.cards {
        if card.is_reversed {
            lines.push(format!("[{}]: {} (Reversed)", card.slot, card.name));
        } else {
            lines.push(format!("[{}]: {}", card.slot, card.name));
        }
        lines.push(format!("Keyword: {}", card.keyword));
        lines.push(format!("Meaning: {}", card.meaning));
        lines.push(String::new());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::tarot::DrawnCard;

    #[test]
    fn record_lines_follow_display_order() {
        let record: GeneratedRecord = [
            ("Ambience", "Rain on glass"),
            ("Style", "Lo-fi"),
            ("Emotion", "Nostalgic"),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            format_record(Category::Music, &record),
            "Style: Lo-fi\nEmotion: Nostalgic\nAmbience: Rain on glass"
        );
    }

    #[test]
    fn story_summary_comes_first() {
        let record: GeneratedRecord = [("Genre", "Noir"), ("Summary", "A tale.")]
            .into_iter()
            .collect();
        assert_eq!(
            format_record(Category::Stories, &record),
            "Summary: A tale.\nGenre: Noir"
        );
    }

    #[test]
    fn unknown_fields_are_appended() {
        let record: GeneratedRecord = [("Zeta", "z"), ("Alpha", "a"), ("Style", "Dub")]
            .into_iter()
            .collect();
        assert_eq!(
            format_record(Category::Music, &record),
            "Style: Dub\nAlpha: a\nZeta: z"
        );
    }

    #[test]
    fn empty_record_exports_nothing() {
        assert_eq!(format_record(Category::Characters, &GeneratedRecord::new()), "");
    }

    #[test]
    fn tarot_block() {
        let result = TarotResult {
            layout_name: "Two Paths".to_string(),
            cards: vec![
                DrawnCard {
                    slot: "Left".to_string(),
                    name: "The Moon".to_string(),
                    is_reversed: true,
                    keyword: "Illusion".to_string(),
                    meaning: "Clarity returns".to_string(),
                },
                DrawnCard {
                    slot: "Right".to_string(),
                    name: "The Sun".to_string(),
                    is_reversed: false,
                    keyword: "Joy".to_string(),
                    meaning: "Success".to_string(),
                },
            ],
        };
        let expected = "=== Two Paths ===\n\
                        [Left]: The Moon (Reversed)\n\
                        Keyword: Illusion\n\
                        Meaning: Clarity returns\n\
                        \n\
                        [Right]: The Sun\n\
                        Keyword: Joy\n\
                        Meaning: Success\n";
        assert_eq!(format_tarot(&result), expected);
    }
}
