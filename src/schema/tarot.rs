use serde::{Deserialize, Serialize};

/// A named spread: an ordered list of slot labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TarotLayout {
    pub name: String,
    pub slots: Vec<String>,
}

/// One card of the deck with both of its readings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TarotCard {
    pub name: String,
    pub keyword: String,
    pub upright: String,
    pub reversed: String,
}

/// A card placed in a layout slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawnCard {
    pub slot: String,
    pub name: String,
    pub is_reversed: bool,
    pub keyword: String,
    pub meaning: String,
}

/// A complete draw: one card per slot of the named layout, in slot order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TarotResult {
    pub layout_name: String,
    pub cards: Vec<DrawnCard>,
}
