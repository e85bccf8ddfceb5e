//! Ranked extraction strategies for quality values and item names.

use crate::domain::Condition;
use crate::observe::card::CardRecord;

/// Extracts a quality value from a card.
pub trait QualityStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn extract(&self, card: &CardRecord) -> Option<f64>;
}

/// Extracts an item name from a card.
pub trait NameStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn extract(&self, card: &CardRecord) -> Option<String>;
}

/// Parse a displayed quality value.
///
/// Accepts plain decimals (`0.123`, `.5`, `1.`) and scientific notation
/// (`1.5e-7`), after stripping `...` truncation marks. Anything outside
/// `[0, 1]` is rejected.
pub fn parse_quality_text(text: &str) -> Option<f64> {
    let cleaned = text.replace("...", "");
    let cleaned = cleaned.trim();
    if !(is_scientific(cleaned) || is_decimal(cleaned)) {
        return None;
    }
    let value = cleaned.parse::<f64>().ok()?;
    (value.is_finite() && (0.0..=1.0).contains(&value)).then_some(value)
}

/// `digits.digits`, `.digits` or `digits.` (exactly one dot, at least one digit).
fn is_decimal(s: &str) -> bool {
    let Some((int, frac)) = s.split_once('.') else {
        return false;
    };
    let all_digits = |p: &str| p.chars().all(|c| c.is_ascii_digit());
    all_digits(int) && all_digits(frac) && !(int.is_empty() && frac.is_empty())
}

/// `[digits and dots]e[+-]digits`, case-insensitive.
///
/// The whole fragment must be a number: a malformed mantissa such as
/// `0.5.3e-2` fails the final parse instead of yielding its `0.5` prefix.
fn is_scientific(s: &str) -> bool {
    let Some(pos) = s.find(['e', 'E']) else {
        return false;
    };
    let (mantissa, rest) = (&s[..pos], &s[pos + 1..]);
    let exponent = rest.strip_prefix(['+', '-']).unwrap_or(rest);
    !mantissa.is_empty()
        && mantissa.chars().all(|c| c.is_ascii_digit() || c == '.')
        && !exponent.is_empty()
        && exponent.chars().all(|c| c.is_ascii_digit())
}

/// Hover titles of the form `name | ... | quality`, read right to left.
pub struct TitleQuality;

impl QualityStrategy for TitleQuality {
    fn name(&self) -> &'static str {
        "title"
    }

    fn extract(&self, card: &CardRecord) -> Option<f64> {
        card.titles
            .iter()
            .filter(|t| t.contains('|'))
            .find_map(|t| t.rsplit('|').find_map(parse_quality_text))
    }
}

/// Loose text fragments that look like a quality value.
pub struct TextQuality;

impl QualityStrategy for TextQuality {
    fn name(&self) -> &'static str {
        "text"
    }

    fn extract(&self, card: &CardRecord) -> Option<f64> {
        card.texts
            .iter()
            .filter(|t| t.contains("0.") || t.contains("e-") || t.contains("E-"))
            .find_map(|t| parse_quality_text(t))
    }
}

const STATTRAK_PREFIX: &str = "StatTrak™";

/// Image alt text, minus the StatTrak prefix and the trailing `(Condition)`.
pub struct ImageAltName;

impl NameStrategy for ImageAltName {
    fn name(&self) -> &'static str {
        "image-alt"
    }

    fn extract(&self, card: &CardRecord) -> Option<String> {
        let mut name = card.image_alt.as_deref()?.trim();
        if let Some(rest) = name.strip_prefix(STATTRAK_PREFIX) {
            name = rest.trim_start();
        }
        if name.ends_with(')') {
            if let Some(open) = name.rfind('(') {
                name = name[..open].trim_end();
            }
        }
        (!name.is_empty()).then(|| name.to_string())
    }
}

/// Name label lines: weapon first, then skin. Wear labels are skipped.
pub struct LabelName;

impl NameStrategy for LabelName {
    fn name(&self) -> &'static str {
        "labels"
    }

    fn extract(&self, card: &CardRecord) -> Option<String> {
        let mut parts = card
            .labels
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .filter(|l| !Condition::ALL.iter().any(|c| c.display_name() == *l));

        let weapon = parts.next()?;
        match parts.next() {
            Some(skin) => Some(format!("{weapon} | {skin}")),
            None => Some(weapon.to_string()),
        }
    }
}
