//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the rarity ladder and wear brackets (`Rarity`, `Condition`)
//! - catalog entries (`SkinRecord`) and their load lifecycle (`LoadState`)
//! - per-pass engine inputs and outputs (`InputItem`, `TradeUpResult`, etc.)

pub mod types;

pub use types::*;
