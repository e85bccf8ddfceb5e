//! Read/write card files.
//!
//! A card file is a JSON array of `CardRecord`s: the dialog's displayed cards
//! as scraped from the host page (or produced by `tradeup sample`).

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::error::AppError;
use crate::observe::CardRecord;

/// Read a card file.
pub fn read_cards(path: &Path) -> Result<Vec<CardRecord>, AppError> {
    let bytes = std::fs::read(path)
        .map_err(|e| AppError::new(2, format!("Failed to open card file '{}': {e}", path.display())))?;
    decode_cards(&bytes)
        .map_err(|e| AppError::new(2, format!("Invalid card file '{}': {e}", path.display())))
}

/// Decode a card document; an empty or whitespace-only document is no cards.
pub fn decode_cards(bytes: &[u8]) -> Result<Vec<CardRecord>, serde_json::Error> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    serde_json::from_slice(bytes)
}

/// Write a card file (pretty-printed).
pub fn write_cards(path: &Path, cards: &[CardRecord]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create card file '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(BufWriter::new(file), cards)
        .map_err(|e| AppError::new(2, format!("Failed to write card file: {e}")))?;
    Ok(())
}

/// Render cards as pretty JSON (for stdout).
pub fn cards_to_json(cards: &[CardRecord]) -> Result<String, AppError> {
    serde_json::to_string_pretty(cards).map_err(|e| AppError::new(4, format!("Failed to encode cards: {e}")))
}
