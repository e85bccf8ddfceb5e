//! The trade-up calculation itself.
//!
//! Pure functions only: catalog + observed inputs in, a full result out.
//! Nothing here logs at more than debug level or touches shared state.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::data::Catalog;
use crate::domain::{
    InputItem, NameShare, ObservedCard, OutputCandidate, Rarity, TradeUpResult,
};
use crate::engine::quality::{mean, predict_quality};

/// Join observed cards against the catalog (case-insensitive by name).
pub fn resolve_inputs(observed: &[ObservedCard], catalog: &Catalog) -> Vec<InputItem> {
    observed
        .iter()
        .map(|card| InputItem {
            name: card.name.clone(),
            quality: card.quality,
            resolved: catalog.find(&card.name).cloned(),
        })
        .collect()
}

/// Observe-to-result in one step.
pub fn evaluate(observed: &[ObservedCard], catalog: &Catalog) -> Option<TradeUpResult> {
    compute_result(resolve_inputs(observed, catalog), catalog)
}

/// Compute the trade-up outcome for `inputs`. `None` when there are no inputs.
pub fn compute_result(inputs: Vec<InputItem>, catalog: &Catalog) -> Option<TradeUpResult> {
    let qualities: Vec<f64> = inputs.iter().map(|i| i.quality).collect();
    let average_quality = mean(&qualities)?;

    let name_shares = name_shares(&inputs);

    let input_rarity = inputs
        .iter()
        .find_map(|i| i.resolved.as_ref())
        .map(|r| r.rarity.clone());
    let collections = input_collections(&inputs);
    let next_rarity = input_rarity
        .as_deref()
        .and_then(Rarity::from_label)
        .and_then(Rarity::next);

    debug!(
        input_rarity = ?input_rarity,
        next_rarity = ?next_rarity,
        collections = ?collections,
        "trade-up inputs resolved"
    );

    // With resolved inputs but no usable collection there is nothing to match.
    let searchable = !collections.is_empty() || input_rarity.is_none();
    let outputs = match next_rarity {
        Some(next) if searchable => candidates(&inputs, catalog, next, &collections, average_quality),
        _ => Vec::new(),
    };

    Some(TradeUpResult {
        inputs,
        average_quality,
        name_shares,
        input_rarity,
        next_rarity,
        collections,
        outputs,
    })
}

fn name_shares(inputs: &[InputItem]) -> Vec<NameShare> {
    let total = inputs.len() as f64;
    let mut shares: Vec<NameShare> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for item in inputs {
        match index.get(item.name.as_str()) {
            Some(&idx) => shares[idx].count += 1,
            None => {
                index.insert(&item.name, shares.len());
                shares.push(NameShare {
                    name: item.name.clone(),
                    count: 1,
                    percent: 0.0,
                });
            }
        }
    }
    for share in &mut shares {
        share.percent = share.count as f64 / total * 100.0;
    }
    shares
}

fn input_collections(inputs: &[InputItem]) -> Vec<String> {
    let mut seen = HashSet::new();
    inputs
        .iter()
        .filter_map(|i| i.resolved.as_ref())
        .map(|r| r.collection.as_str())
        .filter(|c| !c.is_empty() && seen.insert(*c))
        .map(str::to_string)
        .collect()
}

fn candidates(
    inputs: &[InputItem],
    catalog: &Catalog,
    next: Rarity,
    collections: &[String],
    average_quality: f64,
) -> Vec<OutputCandidate> {
    let mut outputs: Vec<OutputCandidate> = catalog
        .records()
        .iter()
        .filter(|rec| rec.tier() == Some(next))
        .filter(|rec| collections.is_empty() || collections.contains(&rec.collection))
        .map(|rec| OutputCandidate {
            record: rec.clone(),
            predicted_quality: predict_quality(average_quality, rec),
            tickets: tickets_for(inputs, &rec.collection),
            probability: None,
        })
        .collect();

    let total: u32 = outputs.iter().map(|o| o.tickets).sum();
    if total > 0 {
        for out in &mut outputs {
            out.probability = Some(out.tickets as f64 / total as f64 * 100.0);
        }
    }
    outputs
}

/// One ticket per input whose resolved record shares the collection.
fn tickets_for(inputs: &[InputItem], collection: &str) -> u32 {
    inputs
        .iter()
        .filter(|i| i.resolved.as_ref().is_some_and(|r| r.collection == collection))
        .count() as u32
}
