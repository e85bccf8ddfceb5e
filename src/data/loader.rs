//! One-shot asynchronous catalog loader.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info};

use crate::data::catalog::CatalogStore;
use crate::data::source::CatalogSource;
use crate::domain::LoadState;

/// Fetches the catalog at most once and installs it into a [`CatalogStore`].
///
/// `Unloaded -> Loading -> Loaded | Failed`. There is no retry path: a failed
/// load stays failed for the lifetime of the loader.
pub struct CatalogLoader {
    store: Arc<CatalogStore>,
    source: Arc<dyn CatalogSource>,
    attempted: AtomicBool,
}

impl CatalogLoader {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self {
            store: Arc::new(CatalogStore::new()),
            source,
            attempted: AtomicBool::new(false),
        }
    }

    pub fn store(&self) -> &Arc<CatalogStore> {
        &self.store
    }

    /// Start the fetch in the background. Returns `false` if a load was
    /// already attempted.
    ///
    /// Must be called from within a tokio runtime.
    pub fn load(&self) -> bool {
        // Latch before spawning so a racing caller never starts a second fetch.
        if self.attempted.swap(true, Ordering::SeqCst) {
            debug!("skins database load already attempted");
            return false;
        }

        info!(source = %self.source.describe(), "loading skins database");
        self.store.mark_loading();

        let store = Arc::clone(&self.store);
        let source = Arc::clone(&self.source);
        tokio::spawn(async move {
            match source.fetch().await {
                Ok(records) => store.install(records),
                Err(err) => store.fail(err),
            }
        });
        true
    }

    /// Start the load if needed and wait until it settles.
    pub async fn load_and_wait(&self) -> LoadState {
        self.load();
        let mut rx = self.store.subscribe();
        match rx.wait_for(|state| state.is_settled()).await {
            Ok(state) => *state,
            // The store owns the sender; it cannot close while we hold `self`.
            Err(_) => self.store.state(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::AtomicUsize;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use crate::domain::SkinRecord;
    use crate::error::CatalogError;

    struct GatedSource {
        calls: AtomicUsize,
        gate: Notify,
        fail: bool,
    }

    impl GatedSource {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                gate: Notify::new(),
                fail,
            })
        }
    }

    #[async_trait]
    impl CatalogSource for GatedSource {
        async fn fetch(&self) -> Result<Vec<SkinRecord>, CatalogError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            if self.fail {
                return Err(CatalogError::Status(500));
            }
            Ok(vec![SkinRecord {
                name: "Glock-18 | Fade".to_string(),
                rarity: "Restricted".to_string(),
                collection: "Assault".to_string(),
                min_quality: Some(0.0),
                max_quality: Some(0.08),
            }])
        }

        fn describe(&self) -> String {
            "gated".to_string()
        }
    }

    #[tokio::test]
    async fn concurrent_loads_fetch_once() {
        let source = GatedSource::new(false);
        let loader = CatalogLoader::new(source.clone());

        assert!(loader.load());
        assert!(!loader.load());
        assert_eq!(loader.store().state(), LoadState::Loading);

        tokio::task::yield_now().await;
        source.gate.notify_one();
        let state = loader.load_and_wait().await;

        assert_eq!(state, LoadState::Loaded);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(loader.store().all().len(), 1);
    }

    #[tokio::test]
    async fn failed_load_is_terminal() {
        let source = GatedSource::new(true);
        let loader = CatalogLoader::new(source.clone());

        source.gate.notify_one();
        assert_eq!(loader.load_and_wait().await, LoadState::Failed);
        assert!(!loader.load());
        assert_eq!(loader.store().state(), LoadState::Failed);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(loader.store().last_error(), Some(CatalogError::Status(500)));
    }
}
