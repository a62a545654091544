//! Render instructions produced by the section renderers

use serde::Serialize;

/// Colour category for bars and scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Positive,
    Negative,
    Neutral,
}

/// Display category of a trading signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignalCategory {
    StrongBuy,
    Buy,
    Hold,
    Avoid,
}

impl SignalCategory {
    /// Classify a free-text signal type
    ///
    /// Case-insensitive substring match, first hit wins:
    /// `strong buy`, then `buy`, then `avoid`; anything else is a hold.
    pub fn classify(signal_type: &str) -> Self {
        let normalized = signal_type.to_lowercase().replace('_', " ");

        if normalized.contains("strong buy") {
            Self::StrongBuy
        } else if normalized.contains("buy") {
            Self::Buy
        } else if normalized.contains("avoid") {
            Self::Avoid
        } else {
            Self::Hold
        }
    }

    pub fn tone(self) -> Tone {
        match self {
            Self::StrongBuy | Self::Buy => Tone::Positive,
            Self::Avoid => Tone::Negative,
            Self::Hold => Tone::Neutral,
        }
    }
}

/// One row of a table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub cells: Vec<String>,
    /// Visually emphasised, e.g. the analysed company among its peers
    pub highlighted: bool,
}

/// A single render instruction
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Element {
    /// Large heading text
    Title { text: String },
    /// Signal badge
    Badge {
        label: String,
        category: SignalCategory,
    },
    /// Label / value pair
    Field {
        label: String,
        value: String,
        tone: Option<Tone>,
    },
    /// Horizontal bar, `percent` in 0..=100
    Bar {
        label: String,
        percent: f64,
        tone: Tone,
    },
    /// Bulleted list; `placeholder` renders as a single muted entry when
    /// `items` is empty
    List {
        label: String,
        items: Vec<String>,
        placeholder: Option<String>,
    },
    /// Free text paragraph
    Text { label: String, text: String },
    /// Tabular data
    Table {
        headers: Vec<String>,
        rows: Vec<TableRow>,
    },
}

impl Element {
    pub fn title(text: impl Into<String>) -> Self {
        Self::Title { text: text.into() }
    }

    pub fn field(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Field {
            label: label.into(),
            value: value.into(),
            tone: None,
        }
    }

    pub fn toned_field(label: impl Into<String>, value: impl Into<String>, tone: Tone) -> Self {
        Self::Field {
            label: label.into(),
            value: value.into(),
            tone: Some(tone),
        }
    }

    pub fn text(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Text {
            label: label.into(),
            text: text.into(),
        }
    }

    pub fn list(label: impl Into<String>, items: Vec<String>) -> Self {
        Self::List {
            label: label.into(),
            items,
            placeholder: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_order() {
        assert_eq!(SignalCategory::classify("Strong Buy"), SignalCategory::StrongBuy);
        assert_eq!(SignalCategory::classify("strong_buy"), SignalCategory::StrongBuy);
        assert_eq!(SignalCategory::classify("BUY"), SignalCategory::Buy);
        assert_eq!(SignalCategory::classify("Avoid"), SignalCategory::Avoid);
        assert_eq!(SignalCategory::classify("Hold"), SignalCategory::Hold);
        assert_eq!(SignalCategory::classify("speculative"), SignalCategory::Hold);
        // "buy" is checked before "avoid"
        assert_eq!(SignalCategory::classify("avoid, then buy"), SignalCategory::Buy);
    }

    #[test]
    fn test_element_serializes_with_kind_tag() {
        let json = serde_json::to_value(Element::field("ROE", "12%")).unwrap();
        assert_eq!(json["kind"], "field");
        assert_eq!(json["value"], "12%");
    }
}
