//! Reference catalog and the store that owns it.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::domain::{LoadState, SkinRecord};
use crate::error::CatalogError;

/// An immutable, loaded catalog with a case-insensitive name index.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<SkinRecord>,
    by_name: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(records: Vec<SkinRecord>) -> Self {
        let mut by_name = HashMap::with_capacity(records.len());
        for (idx, rec) in records.iter().enumerate() {
            // Duplicate names: the earliest record wins.
            by_name.entry(rec.name.to_lowercase()).or_insert(idx);
        }
        Self { records, by_name }
    }

    pub fn records(&self) -> &[SkinRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<&SkinRecord> {
        self.by_name
            .get(&name.to_lowercase())
            .and_then(|&idx| self.records.get(idx))
    }
}

#[derive(Debug, Default)]
struct StoreInner {
    catalog: Arc<Catalog>,
    loaded_at: Option<DateTime<Utc>>,
    error: Option<CatalogError>,
}

/// Holds the catalog and its load state.
///
/// The catalog is replaced wholesale exactly once, when the load settles.
/// Load state changes are broadcast through a `watch` channel so a session
/// can re-render when a slow load finishes.
#[derive(Debug)]
pub struct CatalogStore {
    inner: RwLock<StoreInner>,
    state: watch::Sender<LoadState>,
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(LoadState::Unloaded);
        Self {
            inner: RwLock::new(StoreInner::default()),
            state,
        }
    }

    pub fn state(&self) -> LoadState {
        *self.state.borrow()
    }

    pub fn is_ready(&self) -> bool {
        self.state() == LoadState::Loaded
    }

    /// Current catalog; empty until the load reaches `Loaded`.
    pub fn all(&self) -> Arc<Catalog> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&inner.catalog)
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.loaded_at
    }

    pub fn last_error(&self) -> Option<CatalogError> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.error.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LoadState> {
        self.state.subscribe()
    }

    pub(crate) fn mark_loading(&self) {
        self.state.send_replace(LoadState::Loading);
    }

    pub(crate) fn install(&self, records: Vec<SkinRecord>) {
        let catalog = Catalog::new(records);
        info!(records = catalog.len(), "skins database loaded");
        {
            let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
            inner.catalog = Arc::new(catalog);
            inner.loaded_at = Some(Utc::now());
            inner.error = None;
        }
        self.state.send_replace(LoadState::Loaded);
    }

    pub(crate) fn fail(&self, err: CatalogError) {
        warn!(error = %err, "failed to load skins database");
        {
            let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
            inner.error = Some(err);
        }
        self.state.send_replace(LoadState::Failed);
    }
}
