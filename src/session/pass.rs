//! One calculation pass: load state + cards -> render view.
//!
//! Shared by the live session and the one-shot `calc` command so both apply
//! the same loading / failure / empty rules.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, warn};

use crate::data::CatalogStore;
use crate::domain::LoadState;
use crate::engine::evaluate;
use crate::error::AppError;
use crate::observe::{CardObserver, CardRecord};
use crate::session::render::{RenderState, RenderView};

/// Build the view for the current store state.
///
/// `cards` is only consulted once the catalog is loaded. Any failure inside
/// the pass, including a panic in the engine, becomes `RenderState::Error`.
pub fn build_view<F>(store: &CatalogStore, observer: &CardObserver, cards: F) -> RenderView
where
    F: FnOnce() -> Result<Vec<CardRecord>, AppError>,
{
    let load_state = store.state();
    let state = match load_state {
        LoadState::Failed => RenderState::LoadFailed(
            store
                .last_error()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown error".to_string()),
        ),
        LoadState::Unloaded | LoadState::Loading => RenderState::Loading,
        LoadState::Loaded => compute_state(store, observer, cards),
    };

    RenderView {
        state,
        load_state,
        catalog_size: store.all().len(),
        loaded_at: store.loaded_at(),
    }
}

fn compute_state<F>(store: &CatalogStore, observer: &CardObserver, cards: F) -> RenderState
where
    F: FnOnce() -> Result<Vec<CardRecord>, AppError>,
{
    let cards = match cards() {
        Ok(cards) => cards,
        Err(err) => {
            warn!(error = %err, "failed to read dialog cards");
            return RenderState::Error(err.to_string());
        }
    };

    let catalog = store.all();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let observed = observer.observe(&cards);
        debug!(cards = cards.len(), observed = observed.len(), "computing trade-up");
        evaluate(&observed, &catalog)
    }));

    match outcome {
        Ok(Some(result)) => RenderState::Ready(result),
        Ok(None) => RenderState::NoItems,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(%message, "trade-up pass failed");
            RenderState::Error(message)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "calculation failed".to_string()
    }
}
