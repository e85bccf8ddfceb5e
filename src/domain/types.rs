//! Shared domain types.
//!
//! These types are deliberately plain data so they can be:
//!
//! - decoded straight from the reference catalog JSON
//! - passed by value through the engine and into renderers
//! - rebuilt from scratch on every calculation pass

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Rarity tiers in trade-up order.
///
/// A trade-up consumes items of one tier and yields one item of the next.
/// `Covert` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
pub enum Rarity {
    ConsumerGrade,
    IndustrialGrade,
    MilSpecGrade,
    Restricted,
    Classified,
    Covert,
}

impl Rarity {
    pub const ALL: [Rarity; 6] = [
        Rarity::ConsumerGrade,
        Rarity::IndustrialGrade,
        Rarity::MilSpecGrade,
        Rarity::Restricted,
        Rarity::Classified,
        Rarity::Covert,
    ];

    /// Catalog label, exactly as the reference data spells it.
    pub fn label(self) -> &'static str {
        match self {
            Rarity::ConsumerGrade => "Consumer Grade",
            Rarity::IndustrialGrade => "Industrial Grade",
            Rarity::MilSpecGrade => "Mil-Spec Grade",
            Rarity::Restricted => "Restricted",
            Rarity::Classified => "Classified",
            Rarity::Covert => "Covert",
        }
    }

    /// Exact, case-sensitive match against the catalog labels.
    pub fn from_label(label: &str) -> Option<Rarity> {
        Rarity::ALL.into_iter().find(|r| r.label() == label)
    }

    /// The tier a trade-up of this tier produces.
    pub fn next(self) -> Option<Rarity> {
        let idx = Rarity::ALL.iter().position(|r| *r == self)?;
        Rarity::ALL.get(idx + 1).copied()
    }
}

impl std::fmt::Display for Rarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Wear bracket implied by a quality (float) value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    FactoryNew,
    MinimalWear,
    FieldTested,
    WellWorn,
    BattleScarred,
}

impl Condition {
    pub const ALL: [Condition; 5] = [
        Condition::FactoryNew,
        Condition::MinimalWear,
        Condition::FieldTested,
        Condition::WellWorn,
        Condition::BattleScarred,
    ];

    /// Bracket upper bounds are inclusive: 0.07 is still Factory New.
    pub fn from_quality(quality: f64) -> Condition {
        if quality <= 0.07 {
            Condition::FactoryNew
        } else if quality <= 0.15 {
            Condition::MinimalWear
        } else if quality <= 0.38 {
            Condition::FieldTested
        } else if quality <= 0.45 {
            Condition::WellWorn
        } else {
            Condition::BattleScarred
        }
    }

    pub fn short_name(self) -> &'static str {
        match self {
            Condition::FactoryNew => "FN",
            Condition::MinimalWear => "MW",
            Condition::FieldTested => "FT",
            Condition::WellWorn => "WW",
            Condition::BattleScarred => "BS",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Condition::FactoryNew => "Factory New",
            Condition::MinimalWear => "Minimal Wear",
            Condition::FieldTested => "Field-Tested",
            Condition::WellWorn => "Well-Worn",
            Condition::BattleScarred => "Battle-Scarred",
        }
    }
}

/// One entry of the reference catalog.
///
/// `rarity` is kept as the raw label: records whose label is not one of the
/// known tiers simply never match a tier lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinRecord {
    pub name: String,
    pub rarity: String,
    #[serde(default)]
    pub collection: String,
    #[serde(rename = "minFloat", default, skip_serializing_if = "Option::is_none")]
    pub min_quality: Option<f64>,
    #[serde(rename = "maxFloat", default, skip_serializing_if = "Option::is_none")]
    pub max_quality: Option<f64>,
}

impl SkinRecord {
    pub fn tier(&self) -> Option<Rarity> {
        Rarity::from_label(&self.rarity)
    }
}

/// A card as read off the dialog, after extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservedCard {
    pub name: String,
    pub quality: f64,
}

/// An observed card joined against the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct InputItem {
    pub name: String,
    pub quality: f64,
    /// `None` when the name has no catalog match.
    pub resolved: Option<SkinRecord>,
}

/// How often a name appears among the inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct NameShare {
    pub name: String,
    pub count: usize,
    pub percent: f64,
}

/// A possible trade-up output.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputCandidate {
    pub record: SkinRecord,
    /// `None` when the record is missing a quality bound.
    pub predicted_quality: Option<f64>,
    /// One ticket per input item from the same collection.
    pub tickets: u32,
    /// Set only when the candidate set carries at least one ticket.
    pub probability: Option<f64>,
}

/// Full snapshot of one calculation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeUpResult {
    pub inputs: Vec<InputItem>,
    pub average_quality: f64,
    /// First-seen order.
    pub name_shares: Vec<NameShare>,
    /// Raw rarity label of the first resolved input.
    pub input_rarity: Option<String>,
    pub next_rarity: Option<Rarity>,
    /// Distinct collections of resolved inputs, first-seen order.
    pub collections: Vec<String>,
    /// Catalog order.
    pub outputs: Vec<OutputCandidate>,
}

impl TradeUpResult {
    pub fn total_tickets(&self) -> u32 {
        self.outputs.iter().map(|o| o.tickets).sum()
    }
}

/// Reference catalog load lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Unloaded,
    Loading,
    Loaded,
    Failed,
}

impl LoadState {
    /// `Loaded` or `Failed`; neither ever changes again.
    pub fn is_settled(self) -> bool {
        matches!(self, LoadState::Loaded | LoadState::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rarity_successors_follow_tier_order() {
        assert_eq!(Rarity::ConsumerGrade.next(), Some(Rarity::IndustrialGrade));
        assert_eq!(Rarity::MilSpecGrade.next(), Some(Rarity::Restricted));
        assert_eq!(Rarity::Classified.next(), Some(Rarity::Covert));
        assert_eq!(Rarity::Covert.next(), None);
    }

    #[test]
    fn rarity_labels_round_trip_exactly() {
        for r in Rarity::ALL {
            assert_eq!(Rarity::from_label(r.label()), Some(r));
        }
        assert_eq!(Rarity::from_label("mil-spec grade"), None);
        assert_eq!(Rarity::from_label("Contraband"), None);
    }

    #[test]
    fn condition_brackets_are_inclusive_upper_bounds() {
        assert_eq!(Condition::from_quality(0.0), Condition::FactoryNew);
        assert_eq!(Condition::from_quality(0.07), Condition::FactoryNew);
        assert_eq!(Condition::from_quality(0.0701), Condition::MinimalWear);
        assert_eq!(Condition::from_quality(0.15), Condition::MinimalWear);
        assert_eq!(Condition::from_quality(0.38), Condition::FieldTested);
        assert_eq!(Condition::from_quality(0.45), Condition::WellWorn);
        assert_eq!(Condition::from_quality(0.99), Condition::BattleScarred);
    }

    #[test]
    fn skin_record_decodes_catalog_shape() {
        let json = r#"{"name":"AK-47 | Redline","rarity":"Classified","collection":"Phoenix","minFloat":0.1,"maxFloat":0.7}"#;
        let rec: SkinRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.tier(), Some(Rarity::Classified));
        assert_eq!(rec.min_quality, Some(0.1));
        assert_eq!(rec.max_quality, Some(0.7));

        let bare: SkinRecord = serde_json::from_str(r#"{"name":"X","rarity":"Odd"}"#).unwrap();
        assert_eq!(bare.tier(), None);
        assert!(bare.collection.is_empty());
        assert_eq!(bare.min_quality, None);
    }
}
