//! Live mode: a card file plays the role of the trade-up dialog.
//!
//! The file is polled at an adaptive interval. Its appearance opens the
//! dialog, its disappearance closes it, and a change in its bytes counts as a
//! structural change to the set of cards.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cli::WatchArgs;
use crate::data::{CatalogLoader, CatalogSpec};
use crate::error::AppError;
use crate::io::read_cards;
use crate::observe::CardRecord;
use crate::report::PlainRenderer;
use crate::session::{Dialog, SessionConfig, SessionEvent, TradeUpSession};
use crate::tui::TuiRenderer;

const KEY_POLL: Duration = Duration::from_millis(100);

/// Reads the current cards from the watched file.
#[derive(Debug, Clone)]
pub struct CardFileDialog {
    path: PathBuf,
}

impl CardFileDialog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Dialog for CardFileDialog {
    fn cards(&mut self) -> Result<Vec<CardRecord>, AppError> {
        read_cards(&self.path)
    }
}

/// One look at the watched file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileProbe {
    Absent,
    /// Present, with a fingerprint of its contents.
    Present(u64),
}

pub async fn probe(path: &Path) -> FileProbe {
    match tokio::fs::read(path).await {
        Ok(bytes) => {
            let mut hasher = DefaultHasher::new();
            bytes.hash(&mut hasher);
            FileProbe::Present(hasher.finish())
        }
        Err(_) => FileProbe::Absent,
    }
}

/// Turns successive probes into session events.
#[derive(Debug)]
pub struct PresenceTracker {
    last: FileProbe,
    checks: u32,
}

impl Default for PresenceTracker {
    fn default() -> Self {
        Self {
            last: FileProbe::Absent,
            checks: 0,
        }
    }
}

impl PresenceTracker {
    pub fn checks(&self) -> u32 {
        self.checks
    }

    pub fn observe(&mut self, probe: FileProbe) -> Option<SessionEvent> {
        self.checks = self.checks.saturating_add(1);
        let event = match (self.last, probe) {
            (FileProbe::Absent, FileProbe::Present(_)) => Some(SessionEvent::DialogOpened),
            (FileProbe::Present(_), FileProbe::Absent) => Some(SessionEvent::DialogClosed),
            (FileProbe::Present(a), FileProbe::Present(b)) if a != b => {
                Some(SessionEvent::ContentChanged)
            }
            _ => None,
        };
        self.last = probe;
        event
    }
}

/// Poll `path` until the receiving side goes away.
pub async fn poll_card_file(path: PathBuf, config: SessionConfig, tx: mpsc::Sender<SessionEvent>) {
    let mut tracker = PresenceTracker::default();
    loop {
        if let Some(event) = tracker.observe(probe(&path).await) {
            debug!(?event, path = %path.display(), "card file event");
            if tx.send(event).await.is_err() {
                break;
            }
        }
        tokio::time::sleep(config.poll_interval(tracker.checks())).await;
    }
}

/// Map a terminal event to a session event.
pub fn terminal_event(ev: &Event) -> Option<SessionEvent> {
    match ev {
        Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(SessionEvent::Shutdown),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(SessionEvent::Shutdown)
            }
            KeyCode::Char('r') => Some(SessionEvent::Refresh),
            _ => None,
        },
        Event::Resize(_, _) => Some(SessionEvent::Refresh),
        _ => None,
    }
}

/// Read terminal events on a plain thread; stops once the session is gone.
fn spawn_key_reader(tx: mpsc::Sender<SessionEvent>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        while !tx.is_closed() {
            match event::poll(KEY_POLL) {
                Ok(false) => continue,
                Ok(true) => {}
                Err(e) => {
                    warn!(error = %e, "terminal event poll failed");
                    break;
                }
            }
            let ev = match event::read() {
                Ok(ev) => ev,
                Err(e) => {
                    warn!(error = %e, "terminal event read failed");
                    break;
                }
            };
            if let Some(session_event) = terminal_event(&ev) {
                if tx.blocking_send(session_event).is_err() {
                    break;
                }
            }
        }
    })
}

/// Run live mode until the user quits.
pub async fn run(args: &WatchArgs) -> Result<(), AppError> {
    let config = args.session_config();
    let source = CatalogSpec::resolve(args.catalog.catalog.as_deref()).into_source(config.fetch_timeout)?;
    info!(source = %source.describe(), cards = %args.cards.display(), "watching card file");

    let loader = Arc::new(CatalogLoader::new(source));
    let dialog = CardFileDialog::new(&args.cards);
    let (tx, rx) = mpsc::channel(64);
    let poller = tokio::spawn(poll_card_file(args.cards.clone(), config.clone(), tx.clone()));

    if args.plain {
        let ctrl_c_tx = tx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = ctrl_c_tx.send(SessionEvent::Shutdown).await;
            }
        });
        drop(tx);
        let session = TradeUpSession::new(loader, dialog, PlainRenderer::stdout(), config);
        session.drive(rx).await;
    } else {
        let renderer = TuiRenderer::stdout(args.cards.display().to_string())?;
        let _keys = spawn_key_reader(tx);
        let session = TradeUpSession::new(loader, dialog, renderer, config);
        // Dropping the session restores the terminal.
        drop(session.drive(rx).await);
    }

    poller.abort();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;

    #[test]
    fn tracker_reports_presence_transitions() {
        let mut t = PresenceTracker::default();
        assert_eq!(t.observe(FileProbe::Absent), None);
        assert_eq!(t.observe(FileProbe::Present(1)), Some(SessionEvent::DialogOpened));
        assert_eq!(t.observe(FileProbe::Present(1)), None);
        assert_eq!(t.observe(FileProbe::Present(2)), Some(SessionEvent::ContentChanged));
        assert_eq!(t.observe(FileProbe::Absent), Some(SessionEvent::DialogClosed));
        assert_eq!(t.observe(FileProbe::Absent), None);
        assert_eq!(t.checks(), 6);
    }

    #[tokio::test]
    async fn probe_fingerprints_file_contents() {
        let path = std::env::temp_dir().join(format!("tradeup-probe-{}.json", std::process::id()));
        let _ = std::fs::remove_file(&path);
        assert_eq!(probe(&path).await, FileProbe::Absent);

        std::fs::write(&path, "[]").unwrap();
        let first = probe(&path).await;
        assert!(matches!(first, FileProbe::Present(_)));
        assert_eq!(probe(&path).await, first);

        std::fs::write(&path, "[{}]").unwrap();
        assert_ne!(probe(&path).await, first);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn keys_map_to_session_events() {
        let key = |code| Event::Key(KeyEvent::new(code, KeyModifiers::NONE));
        assert_eq!(terminal_event(&key(KeyCode::Char('q'))), Some(SessionEvent::Shutdown));
        assert_eq!(terminal_event(&key(KeyCode::Esc)), Some(SessionEvent::Shutdown));
        assert_eq!(terminal_event(&key(KeyCode::Char('r'))), Some(SessionEvent::Refresh));
        assert_eq!(terminal_event(&key(KeyCode::Char('x'))), None);
        assert_eq!(terminal_event(&Event::Resize(80, 24)), Some(SessionEvent::Refresh));

        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(terminal_event(&ctrl_c), Some(SessionEvent::Shutdown));
    }

    #[test]
    fn dialog_reads_the_card_file() {
        let path = std::env::temp_dir().join(format!("tradeup-dialog-{}.json", std::process::id()));
        std::fs::write(&path, r#"[{"titles": ["AK-47 | Redline | 0.2"]}]"#).unwrap();
        let mut dialog = CardFileDialog::new(&path);
        let cards = dialog.cards().unwrap();
        assert_eq!(cards.len(), 1);
        std::fs::remove_file(&path).unwrap();

        let err = dialog.cards().unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
