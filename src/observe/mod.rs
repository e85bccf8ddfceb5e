//! Input observation: raw dialog cards -> observed trade-up inputs.
//!
//! Extraction is page-specific guesswork, so each heuristic lives behind a
//! small strategy trait. Strategies are tried in rank order and the first one
//! that produces a value wins.

pub mod card;
pub mod strategies;

pub use card::CardRecord;
pub use strategies::{
    ImageAltName, LabelName, NameStrategy, QualityStrategy, TextQuality, TitleQuality,
    parse_quality_text,
};

use tracing::debug;

use crate::domain::ObservedCard;

/// Name used when no strategy can read one; the card still counts.
pub const UNKNOWN_NAME: &str = "Unknown Skin";

pub struct CardObserver {
    quality: Vec<Box<dyn QualityStrategy>>,
    names: Vec<Box<dyn NameStrategy>>,
}

impl Default for CardObserver {
    fn default() -> Self {
        Self::new(
            vec![Box::new(TitleQuality), Box::new(TextQuality)],
            vec![Box::new(ImageAltName), Box::new(LabelName)],
        )
    }
}

impl CardObserver {
    pub fn new(quality: Vec<Box<dyn QualityStrategy>>, names: Vec<Box<dyn NameStrategy>>) -> Self {
        Self { quality, names }
    }

    pub fn quality(&self, card: &CardRecord) -> Option<f64> {
        self.quality.iter().find_map(|s| {
            let value = s.extract(card)?;
            debug!(strategy = s.name(), value, "quality extracted");
            Some(value)
        })
    }

    pub fn name(&self, card: &CardRecord) -> String {
        self.names
            .iter()
            .find_map(|s| s.extract(card))
            .unwrap_or_else(|| UNKNOWN_NAME.to_string())
    }

    /// `None` when no quality could be read; such cards are left out.
    pub fn observe_card(&self, card: &CardRecord) -> Option<ObservedCard> {
        let name = self.name(card);
        match self.quality(card) {
            Some(quality) => Some(ObservedCard { name, quality }),
            None => {
                debug!(%name, "no quality found on card, skipping");
                None
            }
        }
    }

    pub fn observe(&self, cards: &[CardRecord]) -> Vec<ObservedCard> {
        cards.iter().filter_map(|c| self.observe_card(c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_beats_text_when_both_present() {
        let card = CardRecord {
            titles: vec!["AK-47 | Redline | 0.21".to_string()],
            texts: vec!["0.99".to_string()],
            image_alt: Some("AK-47 | Redline (Field-Tested)".to_string()),
            ..Default::default()
        };
        let seen = CardObserver::default().observe_card(&card).unwrap();
        assert_eq!(seen.name, "AK-47 | Redline");
        assert_eq!(seen.quality, 0.21);
    }

    #[test]
    fn unnamed_card_falls_back_to_placeholder() {
        let card = CardRecord {
            texts: vec!["0.5".to_string()],
            ..Default::default()
        };
        let seen = CardObserver::default().observe_card(&card).unwrap();
        assert_eq!(seen.name, UNKNOWN_NAME);
    }

    #[test]
    fn cards_without_quality_are_dropped() {
        let cards = vec![
            CardRecord {
                image_alt: Some("AWP | Asiimov".to_string()),
                ..Default::default()
            },
            CardRecord {
                image_alt: Some("AWP | Asiimov".to_string()),
                texts: vec!["0.33".to_string()],
                ..Default::default()
            },
        ];
        let seen = CardObserver::default().observe(&cards);
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].quality, 0.33);
    }

    #[test]
    fn custom_rank_order_is_respected() {
        let observer = CardObserver::new(
            vec![Box::new(TextQuality), Box::new(TitleQuality)],
            vec![Box::new(LabelName), Box::new(ImageAltName)],
        );
        let card = CardRecord {
            titles: vec!["X | 0.21".to_string()],
            texts: vec!["0.99".to_string()],
            image_alt: Some("Alt Name".to_string()),
            labels: vec!["Label".to_string(), "Name".to_string()],
        };
        let seen = observer.observe_card(&card).unwrap();
        assert_eq!(seen.quality, 0.99);
        assert_eq!(seen.name, "Label | Name");
    }
}
