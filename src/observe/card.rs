//! Raw card records, as scraped from the trade-up dialog.

use serde::{Deserialize, Serialize};

/// Everything the extractors may look at for one displayed card.
///
/// The fields mirror what the host page exposes: hover titles such as
/// `"AK-47 | Redline | 0.1234"`, loose paragraph/span texts, the item image's
/// alt text, and the coloured name label lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRecord {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub titles: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub texts: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_alt: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
}
