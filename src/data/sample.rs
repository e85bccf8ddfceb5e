//! Synthetic trade-up cards drawn from the catalog.
//!
//! Handy for demos and for exercising `watch` without a live page: the output
//! uses the same card shape the observer reads, so it goes through the exact
//! extraction path real cards do.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::prelude::*;
use rand::rngs::StdRng;

use crate::data::Catalog;
use crate::domain::{Condition, Rarity, SkinRecord};
use crate::error::AppError;
use crate::observe::CardRecord;

/// Share of generated cards that carry the StatTrak prefix.
const STATTRAK_PROB: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub rarity: Rarity,
    /// Restrict to one collection (case-insensitive); all collections if `None`.
    pub collection: Option<String>,
    pub count: usize,
    pub seed: u64,
}

pub fn generate_sample(catalog: &Catalog, config: &SampleConfig) -> Result<Vec<CardRecord>, AppError> {
    if config.count == 0 {
        return Err(AppError::new(2, "Sample count must be > 0."));
    }

    let pool: Vec<&SkinRecord> = catalog
        .records()
        .iter()
        .filter(|r| r.tier() == Some(config.rarity))
        .filter(|r| match &config.collection {
            Some(c) => r.collection.eq_ignore_ascii_case(c),
            None => true,
        })
        .collect();

    if pool.is_empty() {
        let scope = config
            .collection
            .as_deref()
            .map(|c| format!(" in collection '{c}'"))
            .unwrap_or_default();
        return Err(AppError::new(
            2,
            format!("No {} skins found{scope}.", config.rarity.label()),
        ));
    }

    let mut rng = StdRng::seed_from_u64(sample_seed(config));
    let mut cards = Vec::with_capacity(config.count);
    for _ in 0..config.count {
        let Some(record) = pool.choose(&mut rng) else {
            break;
        };
        let (lo, hi) = quality_range(record);
        let quality = if hi > lo { rng.gen_range(lo..=hi) } else { lo };
        let stattrak = rng.gen_bool(STATTRAK_PROB);
        cards.push(card_for(record, quality, stattrak));
    }
    Ok(cards)
}

fn quality_range(record: &SkinRecord) -> (f64, f64) {
    let lo = record.min_quality.unwrap_or(0.0).clamp(0.0, 1.0);
    let hi = record.max_quality.unwrap_or(1.0).clamp(0.0, 1.0);
    if hi < lo { (hi, lo) } else { (lo, hi) }
}

fn card_for(record: &SkinRecord, quality: f64, stattrak: bool) -> CardRecord {
    let condition = Condition::from_quality(quality);
    let prefix = if stattrak { "StatTrak™ " } else { "" };
    let (weapon, skin) = record
        .name
        .split_once(" | ")
        .unwrap_or((record.name.as_str(), ""));

    let mut labels = vec![weapon.to_string()];
    if !skin.is_empty() {
        labels.push(skin.to_string());
    }
    labels.push(condition.display_name().to_string());

    CardRecord {
        titles: vec![format!("{} | {quality:.10}", record.name)],
        texts: vec![format!("{quality:.10}")],
        image_alt: Some(format!("{prefix}{} ({})", record.name, condition.display_name())),
        labels,
    }
}

fn sample_seed(config: &SampleConfig) -> u64 {
    let mut hasher = DefaultHasher::new();
    config.rarity.hash(&mut hasher);
    config
        .collection
        .as_deref()
        .map(str::to_lowercase)
        .hash(&mut hasher);
    config.count.hash(&mut hasher);
    config.seed.hash(&mut hasher);
    hasher.finish()
}
