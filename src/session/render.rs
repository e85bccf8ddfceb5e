//! The rendering collaborator interface.

use chrono::{DateTime, Utc};

use crate::domain::{LoadState, TradeUpResult};

/// What a calculation pass produced.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderState {
    /// Catalog not loaded yet.
    Loading,
    /// Catalog load failed; carries the failure message.
    LoadFailed(String),
    /// No card in the dialog yielded a usable quality.
    NoItems,
    Ready(TradeUpResult),
    /// The pass itself failed; nothing of it is kept.
    Error(String),
}

/// Everything a renderer gets for one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderView {
    pub state: RenderState,
    pub load_state: LoadState,
    pub catalog_size: usize,
    /// When the catalog finished loading, if it has.
    pub loaded_at: Option<DateTime<Utc>>,
}

impl RenderView {
    pub fn result(&self) -> Option<&TradeUpResult> {
        match &self.state {
            RenderState::Ready(result) => Some(result),
            _ => None,
        }
    }
}

/// Receives pass output. Must be idempotent and cheap: a session may call
/// `render` many times with the same view.
pub trait Renderer {
    fn render(&mut self, view: &RenderView);

    /// The dialog closed; drop whatever is on screen.
    fn clear(&mut self);
}
