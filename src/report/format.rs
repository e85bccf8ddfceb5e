//! Text formatting for calculation passes.
//!
//! All presentation rules live here so the engine stays free of display
//! concerns and both the plain renderer and the TUI agree on numbers.

use std::cmp::Ordering;

use crate::domain::{Condition, OutputCandidate, TradeUpResult};
use crate::session::{RenderState, RenderView};

pub const LOADING_MESSAGE: &str = "Loading skins database...";
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load skins database";
pub const NO_ITEMS_MESSAGE: &str = "No valid items found in trade-up";

/// Quality with as much precision as is meaningful for its magnitude.
///
/// Tiny values switch to scientific notation; small values get up to 15
/// decimals with trailing zeros trimmed; everything else gets 10 decimals.
pub fn format_quality(value: Option<f64>) -> String {
    let Some(v) = value else {
        return "N/A".to_string();
    };
    if v < 0.000_001 {
        // Explicit exponent sign: `0.00000000e+0`, `5.00000000e-7`.
        let sci = format!("{v:.8e}");
        return match sci.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => sci,
        };
    }
    if v < 0.01 {
        let fixed = format!("{v:.15}");
        return fixed.trim_end_matches('0').trim_end_matches('.').to_string();
    }
    format!("{v:.10}")
}

/// Short wear label (`FN`, `MW`, ...) or `N/A`.
pub fn condition_label(value: Option<f64>) -> &'static str {
    value
        .map(|v| Condition::from_quality(v).short_name())
        .unwrap_or("N/A")
}

pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(p) => format!("{p:.1}%"),
        None => "-".to_string(),
    }
}

pub fn tickets_label(tickets: u32) -> String {
    if tickets == 1 {
        "1 ticket".to_string()
    } else {
        format!("{tickets} tickets")
    }
}

/// Outputs ordered by probability, highest first. Ties keep catalog order.
pub fn sorted_for_display(outputs: &[OutputCandidate]) -> Vec<&OutputCandidate> {
    let mut sorted: Vec<&OutputCandidate> = outputs.iter().collect();
    sorted.sort_by(|a, b| {
        b.probability
            .unwrap_or(0.0)
            .partial_cmp(&a.probability.unwrap_or(0.0))
            .unwrap_or(Ordering::Equal)
    });
    sorted
}

/// Informational line shown when a result has no outputs.
pub fn no_outputs_message(result: &TradeUpResult) -> Option<String> {
    if !result.outputs.is_empty() {
        return None;
    }
    let rarity = result.input_rarity.as_deref()?;
    Some(match result.next_rarity {
        Some(next) => format!(
            "No {next} skins found in database for collections: {}",
            result.collections.join(", ")
        ),
        None => format!("Cannot trade up from {rarity} (already highest tier)"),
    })
}

pub fn footer_line(view: &RenderView) -> String {
    let mut line = format!("Database: {} skins loaded", view.catalog_size);
    if let Some(at) = view.loaded_at {
        line.push_str(&format!(" at {} UTC", at.format("%H:%M:%S")));
    }
    if let Some(result) = view.result().filter(|r| !r.collections.is_empty()) {
        line.push_str(&format!(" | Collections: {}", result.collections.join(", ")));
    }
    line
}

/// One-line status for every non-result state.
pub fn status_message(state: &RenderState) -> Option<String> {
    match state {
        RenderState::Loading => Some(LOADING_MESSAGE.to_string()),
        RenderState::LoadFailed(detail) => Some(format!("{LOAD_FAILED_MESSAGE} ({detail})")),
        RenderState::NoItems => Some(NO_ITEMS_MESSAGE.to_string()),
        RenderState::Error(message) => Some(format!("Error: {message}")),
        RenderState::Ready(_) => None,
    }
}

/// Full text for one render view.
pub fn format_view(view: &RenderView) -> String {
    match &view.state {
        RenderState::Ready(result) => format_result(result, &footer_line(view)),
        other => {
            let mut out = status_message(other).unwrap_or_default();
            out.push('\n');
            out
        }
    }
}

/// Full text report for a computed trade-up, ending with `footer`.
pub fn format_result(result: &TradeUpResult, footer: &str) -> String {
    let mut out = String::new();
    let avg = Some(result.average_quality);

    out.push_str("=== Trade-up ===\n");
    out.push_str(&format!(
        "Average input float ({} items): {} [{}]\n",
        result.inputs.len(),
        format_quality(avg),
        condition_label(avg),
    ));
    out.push_str(&format!("Full precision: {}\n", result.average_quality));

    if result.inputs.len() > 1 {
        out.push_str("\nInput items:\n");
        for share in &result.name_shares {
            out.push_str(&format!(
                "  {:<40} x{:<3} {:>6.1}%\n",
                truncate(&share.name, 40),
                share.count,
                share.percent
            ));
        }
    }

    if !result.outputs.is_empty() {
        let next = result
            .next_rarity
            .map(|r| r.label())
            .unwrap_or("next tier");
        out.push_str(&format!("\nPossible outputs ({next}):\n"));
        out.push_str(&format_outputs_table(&result.outputs));
    } else if let Some(message) = no_outputs_message(result) {
        out.push('\n');
        out.push_str(&message);
        out.push('\n');
    }

    out.push('\n');
    out.push_str(footer);
    out.push('\n');
    out
}

fn format_outputs_table(outputs: &[OutputCandidate]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<36} {:<20} {:<4} {:>18} {:>7} {:<10}\n",
            "name", "collection", "cond", "float", "chance", "tickets"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<36} {:-<20} {:-<4} {:-<18} {:-<7} {:-<10}\n",
            "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for o in sorted_for_display(outputs) {
        out.push_str(
            format!(
                "{:<36} {:<20} {:<4} {:>18} {:>7} {:<10}\n",
                truncate(&o.record.name, 36),
                truncate(&o.record.collection, 20),
                condition_label(o.predicted_quality),
                format_quality(o.predicted_quality),
                format_percent(o.probability),
                tickets_label(o.tickets),
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
