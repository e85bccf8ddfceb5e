//! Trade-up math.
//!
//! Responsibilities:
//!
//! - resolve observed inputs against the catalog
//! - average quality, name shares, rarity and collection resolution
//! - candidate outputs with predicted quality and ticket-weighted odds

pub mod quality;
pub mod tradeup;

pub use quality::*;
pub use tradeup::*;
