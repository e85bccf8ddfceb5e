//! Update coordination for one watched trade-up dialog.
//!
//! A `TradeUpSession` owns everything that changes while the dialog is up:
//! the change hook, the debounce timer, the in-progress flag and the renderer.
//! It reacts to four inputs:
//!
//! - dialog opened: start the catalog load (once), attach the hook, render now
//! - content changed: restart the debounce timer
//! - dialog closed: detach, cancel the timer, clear the output
//! - catalog load settled: re-render so a "loading" view never goes stale
//!
//! The state machine is synchronous and takes explicit instants, so it can be
//! stepped directly; [`TradeUpSession::drive`] runs it off an event channel on
//! a tokio runtime.

pub mod debounce;
pub mod pass;
pub mod render;

pub use debounce::Debounce;
pub use pass::build_view;
pub use render::{RenderState, RenderView, Renderer};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info};

use crate::data::CatalogLoader;
use crate::error::AppError;
use crate::observe::{CardObserver, CardRecord};

/// Quiet period after the last content change before recomputing.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);
pub const DEFAULT_POLL_FAST: Duration = Duration::from_millis(250);
pub const DEFAULT_POLL_SLOW: Duration = Duration::from_millis(500);
/// Presence checks at the fast interval before backing off.
pub const DEFAULT_SLOW_AFTER: u32 = 20;

/// Source of the cards currently shown in the dialog.
pub trait Dialog {
    fn cards(&mut self) -> Result<Vec<CardRecord>, AppError>;
}

/// Presence and content notifications fed to [`TradeUpSession::drive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    DialogOpened,
    ContentChanged,
    DialogClosed,
    /// Recompute and render immediately (resize, manual refresh).
    Refresh,
    Shutdown,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub debounce: Duration,
    pub poll_fast: Duration,
    pub poll_slow: Duration,
    pub slow_after: u32,
    /// Catalog fetch timeout; `None` waits indefinitely.
    pub fetch_timeout: Option<Duration>,
}

impl SessionConfig {
    /// Presence poll interval after `checks` checks.
    pub fn poll_interval(&self, checks: u32) -> Duration {
        if checks < self.slow_after {
            self.poll_fast
        } else {
            self.poll_slow
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            poll_fast: DEFAULT_POLL_FAST,
            poll_slow: DEFAULT_POLL_SLOW,
            slow_after: DEFAULT_SLOW_AFTER,
            fetch_timeout: None,
        }
    }
}

/// Whether a requested pass actually ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    Rendered,
    /// Another pass was in progress; this request was dropped, not queued.
    Dropped,
    /// No dialog is open.
    Inactive,
}

/// State that exists only while the dialog is present.
#[derive(Debug)]
struct ActiveDialog {
    opened_at: Instant,
    debounce: Debounce,
}

pub struct TradeUpSession<D, R> {
    loader: Arc<CatalogLoader>,
    observer: CardObserver,
    dialog: D,
    renderer: R,
    config: SessionConfig,
    active: Option<ActiveDialog>,
    in_progress: bool,
    passes: u64,
}

impl<D: Dialog, R: Renderer> TradeUpSession<D, R> {
    pub fn new(loader: Arc<CatalogLoader>, dialog: D, renderer: R, config: SessionConfig) -> Self {
        Self::with_observer(loader, CardObserver::default(), dialog, renderer, config)
    }

    pub fn with_observer(
        loader: Arc<CatalogLoader>,
        observer: CardObserver,
        dialog: D,
        renderer: R,
        config: SessionConfig,
    ) -> Self {
        Self {
            loader,
            observer,
            dialog,
            renderer,
            config,
            active: None,
            in_progress: false,
            passes: 0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }

    /// Completed render passes so far.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// When the pending debounced recompute is due, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.active.as_ref().and_then(|a| a.debounce.deadline())
    }

    /// Absent -> Present. Must be called within a tokio runtime.
    pub fn open(&mut self, now: Instant) -> PassOutcome {
        if self.active.is_some() {
            return PassOutcome::Inactive;
        }
        info!("trade-up dialog opened");
        self.loader.load();
        self.active = Some(ActiveDialog {
            opened_at: now,
            debounce: Debounce::new(self.config.debounce),
        });
        self.run_pass()
    }

    /// Structural change inside the open dialog; recompute after the quiet period.
    pub fn content_changed(&mut self, now: Instant) {
        if let Some(active) = self.active.as_mut() {
            debug!(restart = active.debounce.is_pending(), "dialog content changed, debouncing");
            active.debounce.schedule(now);
        }
    }

    /// Run the debounced recompute if its deadline has passed.
    pub fn fire_due(&mut self, now: Instant) -> PassOutcome {
        let due = self
            .active
            .as_mut()
            .is_some_and(|a| a.debounce.take_due(now));
        if due { self.run_pass() } else { PassOutcome::Inactive }
    }

    /// Present -> Absent.
    pub fn close(&mut self) {
        if let Some(mut active) = self.active.take() {
            active.debounce.cancel();
            info!(
                open_for_ms = active.opened_at.elapsed().as_millis() as u64,
                "trade-up dialog closed"
            );
            self.renderer.clear();
        }
    }

    /// The catalog reached `Loaded` or `Failed`.
    pub fn catalog_settled(&mut self) -> PassOutcome {
        debug!(state = ?self.loader.store().state(), "catalog load settled");
        self.refresh()
    }

    /// Immediate, non-debounced pass.
    pub fn refresh(&mut self) -> PassOutcome {
        if self.active.is_none() {
            return PassOutcome::Inactive;
        }
        self.run_pass()
    }

    fn run_pass(&mut self) -> PassOutcome {
        if self.in_progress {
            debug!("pass already in progress, dropping request");
            return PassOutcome::Dropped;
        }
        self.in_progress = true;

        let dialog = &mut self.dialog;
        let view = build_view(self.loader.store(), &self.observer, || dialog.cards());
        self.renderer.render(&view);

        self.in_progress = false;
        self.passes += 1;
        PassOutcome::Rendered
    }

    /// Run the session until `Shutdown` arrives or the channel closes.
    pub async fn drive(mut self, mut events: mpsc::Receiver<SessionEvent>) -> Self {
        let mut load_rx = self.loader.store().subscribe();
        let mut load_seen = load_rx.borrow_and_update().is_settled();

        loop {
            let deadline = self.next_deadline();
            tokio::select! {
                event = events.recv() => match event {
                    Some(SessionEvent::DialogOpened) => {
                        self.open(Instant::now());
                    }
                    Some(SessionEvent::ContentChanged) => self.content_changed(Instant::now()),
                    Some(SessionEvent::DialogClosed) => self.close(),
                    Some(SessionEvent::Refresh) => {
                        self.refresh();
                    }
                    Some(SessionEvent::Shutdown) | None => break,
                },
                changed = load_rx.changed(), if !load_seen => {
                    if changed.is_err() {
                        load_seen = true;
                    } else if load_rx.borrow_and_update().is_settled() {
                        load_seen = true;
                        self.catalog_settled();
                    }
                },
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.fire_due(Instant::now());
                },
            }
        }

        self.close();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;

    use crate::data::CatalogSource;
    use crate::domain::{LoadState, SkinRecord};
    use crate::error::CatalogError;
    use crate::observe::{ImageAltName, QualityStrategy, TitleQuality};

    struct FixedSource;

    #[async_trait]
    impl CatalogSource for FixedSource {
        async fn fetch(&self) -> Result<Vec<SkinRecord>, CatalogError> {
            Ok(vec![SkinRecord {
                name: "MAC-10 | Neon Rider".to_string(),
                rarity: "Classified".to_string(),
                collection: "Horizon".to_string(),
                min_quality: Some(0.0),
                max_quality: Some(0.6),
            }])
        }

        fn describe(&self) -> String {
            "fixed".to_string()
        }
    }

    struct StaticDialog(Vec<CardRecord>);

    impl Dialog for StaticDialog {
        fn cards(&mut self) -> Result<Vec<CardRecord>, AppError> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    struct Recorder {
        views: Vec<RenderView>,
        clears: usize,
    }

    impl Renderer for Recorder {
        fn render(&mut self, view: &RenderView) {
            self.views.push(view.clone());
        }

        fn clear(&mut self) {
            self.clears += 1;
        }
    }

    async fn loaded_session() -> TradeUpSession<StaticDialog, Recorder> {
        let loader = Arc::new(CatalogLoader::new(Arc::new(FixedSource)));
        assert_eq!(loader.load_and_wait().await, LoadState::Loaded);
        let card = CardRecord {
            titles: vec!["MAC-10 | Neon Rider | 0.12".to_string()],
            image_alt: Some("MAC-10 | Neon Rider (Minimal Wear)".to_string()),
            ..Default::default()
        };
        TradeUpSession::new(loader, StaticDialog(vec![card]), Recorder::default(), SessionConfig::default())
    }

    #[tokio::test]
    async fn opening_renders_immediately() {
        let mut session = loaded_session().await;
        let t0 = Instant::now();
        assert_eq!(session.open(t0), PassOutcome::Rendered);
        assert!(session.is_open());
        assert_eq!(session.passes(), 1);
        assert!(session.renderer().views[0].result().is_some());

        // A second open while present is a no-op.
        assert_eq!(session.open(t0), PassOutcome::Inactive);
        assert_eq!(session.passes(), 1);
    }

    #[tokio::test]
    async fn burst_of_changes_collapses_into_one_pass() {
        let mut session = loaded_session().await;
        let t0 = Instant::now();
        session.open(t0);

        for i in 0..10 {
            session.content_changed(t0 + Duration::from_millis(i * 15));
        }
        let last = t0 + Duration::from_millis(135);
        assert_eq!(session.next_deadline(), Some(last + DEFAULT_DEBOUNCE));

        assert_eq!(session.fire_due(last + Duration::from_millis(100)), PassOutcome::Inactive);
        assert_eq!(session.fire_due(last + DEFAULT_DEBOUNCE), PassOutcome::Rendered);
        assert_eq!(session.fire_due(last + Duration::from_secs(5)), PassOutcome::Inactive);
        assert_eq!(session.passes(), 2);
    }

    #[tokio::test]
    async fn closing_cancels_pending_recompute_and_clears() {
        let mut session = loaded_session().await;
        let t0 = Instant::now();
        session.open(t0);
        session.content_changed(t0);
        session.close();

        assert!(!session.is_open());
        assert_eq!(session.next_deadline(), None);
        assert_eq!(session.fire_due(t0 + Duration::from_secs(1)), PassOutcome::Inactive);
        assert_eq!(session.renderer().clears, 1);
        assert_eq!(session.passes(), 1);

        // Changes while absent are ignored.
        session.content_changed(t0);
        assert_eq!(session.next_deadline(), None);
    }

    #[tokio::test]
    async fn refresh_requires_an_open_dialog() {
        let mut session = loaded_session().await;
        assert_eq!(session.refresh(), PassOutcome::Inactive);
        assert_eq!(session.catalog_settled(), PassOutcome::Inactive);
        session.open(Instant::now());
        assert_eq!(session.refresh(), PassOutcome::Rendered);
    }

    #[test]
    fn presence_polling_backs_off() {
        let config = SessionConfig::default();
        assert_eq!(config.poll_interval(0), DEFAULT_POLL_FAST);
        assert_eq!(config.poll_interval(19), DEFAULT_POLL_FAST);
        assert_eq!(config.poll_interval(20), DEFAULT_POLL_SLOW);
    }

    #[tokio::test]
    async fn pass_requested_during_a_pass_is_dropped() {
        let mut session = loaded_session().await;
        session.open(Instant::now());
        session.in_progress = true;
        assert_eq!(session.refresh(), PassOutcome::Dropped);
        session.in_progress = false;
        assert_eq!(session.refresh(), PassOutcome::Rendered);
        assert_eq!(session.passes(), 2);
    }

    struct FailsOnce(std::sync::atomic::AtomicBool);

    impl QualityStrategy for FailsOnce {
        fn name(&self) -> &'static str {
            "fails-once"
        }

        fn extract(&self, card: &CardRecord) -> Option<f64> {
            if !self.0.swap(true, std::sync::atomic::Ordering::SeqCst) {
                panic!("quality strategy blew up");
            }
            TitleQuality.extract(card)
        }
    }

    #[tokio::test]
    async fn failed_pass_shows_an_error_and_the_next_pass_recovers() {
        let session = loaded_session().await;
        let observer = CardObserver::new(
            vec![Box::new(FailsOnce(std::sync::atomic::AtomicBool::new(false)))],
            vec![Box::new(ImageAltName)],
        );
        let mut session = TradeUpSession::with_observer(
            session.loader,
            observer,
            session.dialog,
            Recorder::default(),
            SessionConfig::default(),
        );

        assert_eq!(session.open(Instant::now()), PassOutcome::Rendered);
        assert_eq!(
            session.renderer().views[0].state,
            RenderState::Error("quality strategy blew up".to_string())
        );
        assert!(!session.in_progress);

        assert_eq!(session.refresh(), PassOutcome::Rendered);
        assert!(session.renderer().views[1].result().is_some());
        assert_eq!(session.passes(), 2);
    }
}
