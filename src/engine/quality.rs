//! Output quality prediction.

use crate::domain::SkinRecord;

/// Lowest bracket floor consistent with a skin's minimum quality.
///
/// Step function with inclusive boundaries at 0.07 / 0.15 / 0.38 / 0.45.
pub fn condition_floor(min_quality: f64) -> f64 {
    if min_quality <= 0.07 {
        0.0
    } else if min_quality <= 0.15 {
        0.07
    } else if min_quality <= 0.38 {
        0.15
    } else if min_quality <= 0.45 {
        0.38
    } else {
        0.45
    }
}

/// Predicted output quality for `record` given the inputs' average quality.
///
/// `raw = (max - min) * avg`; if `raw` falls short of the record's bracket
/// floor, the floor is added on top. Records missing either bound have no
/// prediction.
pub fn predict_quality(average_quality: f64, record: &SkinRecord) -> Option<f64> {
    let (min, max) = (record.min_quality?, record.max_quality?);
    let raw = (max - min) * average_quality;
    let floor = condition_floor(min);
    Some(if raw >= floor { raw } else { raw + floor })
}

/// Arithmetic mean; `None` for an empty slice.
///
/// Computed as a shift from the first value, so N copies of `q` average to
/// exactly `q`.
pub fn mean(values: &[f64]) -> Option<f64> {
    let (&first, _) = values.split_first()?;
    let shift = values.iter().map(|v| v - first).sum::<f64>() / values.len() as f64;
    Some(first + shift)
}
