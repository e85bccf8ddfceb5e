//! Ratatui-based terminal UI.
//!
//! The TUI is a [`Renderer`]: the session hands it a view after every pass and
//! it redraws. Keyboard input is read separately (see `app::watch`).

use std::io::{self, Stdout};
use std::panic::{self, PanicHookInfo};
use std::thread;

use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, List, ListItem, Paragraph, Row, Table},
};
use tracing::{error, warn};

use crate::domain::{Condition, TradeUpResult};
use crate::error::AppError;
use crate::report::{
    condition_label, footer_line, format_percent, format_quality, no_outputs_message,
    sorted_for_display, status_message, tickets_label,
};
use crate::session::{RenderState, RenderView, Renderer};

type PanicHook = Box<dyn Fn(&PanicHookInfo<'_>) + Sync + Send + 'static>;

/// Sends panic reports to `tracing` instead of stderr while alive.
/// The previous hook comes back on drop.
pub struct PanicLog {
    previous: Option<PanicHook>,
}

impl PanicLog {
    pub fn install() -> Self {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(|info| {
            error!(panic = %info, "panic while the terminal UI is active");
        }));
        Self {
            previous: Some(previous),
        }
    }
}

impl Drop for PanicLog {
    fn drop(&mut self) {
        // set_hook itself panics on a panicking thread.
        if thread::panicking() {
            return;
        }
        if let Some(previous) = self.previous.take() {
            panic::set_hook(previous);
        }
    }
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
pub struct TerminalGuard {
    _panic_log: PanicLog,
}

impl TerminalGuard {
    pub fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self {
            _panic_log: PanicLog::install(),
        })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

pub struct TuiRenderer<B: Backend> {
    terminal: Terminal<B>,
    /// What is being watched, shown in the header.
    source: String,
    view: Option<RenderView>,
    // Declared last so the terminal is dropped before the screen is restored.
    _guard: Option<TerminalGuard>,
}

impl TuiRenderer<CrosstermBackend<Stdout>> {
    /// Take over stdout (raw mode + alternate screen) until dropped.
    pub fn stdout(source: impl Into<String>) -> Result<Self, AppError> {
        let guard = TerminalGuard::new()?;
        let backend = CrosstermBackend::new(io::stdout());
        let terminal = Terminal::new(backend)
            .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;
        let mut renderer = Self {
            terminal,
            source: source.into(),
            view: None,
            _guard: Some(guard),
        };
        renderer.redraw();
        Ok(renderer)
    }
}

impl<B: Backend> TuiRenderer<B> {
    /// Renderer over an arbitrary backend; the terminal mode is left alone.
    pub fn with_backend(backend: B, source: impl Into<String>) -> Result<Self, AppError> {
        let terminal = Terminal::new(backend)
            .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;
        Ok(Self {
            terminal,
            source: source.into(),
            view: None,
            _guard: None,
        })
    }

    pub fn backend(&self) -> &B {
        self.terminal.backend()
    }

    pub fn redraw(&mut self) {
        let view = self.view.as_ref();
        let source = self.source.as_str();
        if let Err(e) = self.terminal.draw(|f| draw(f, source, view)) {
            warn!(error = %e, "terminal draw failed");
        }
    }
}

impl<B: Backend> Renderer for TuiRenderer<B> {
    fn render(&mut self, view: &RenderView) {
        if self.view.as_ref() == Some(view) {
            return;
        }
        self.view = Some(view.clone());
        self.redraw();
    }

    fn clear(&mut self) {
        self.view = None;
        self.redraw();
    }
}

fn condition_color(value: Option<f64>) -> Color {
    match value.map(Condition::from_quality) {
        Some(Condition::FactoryNew) => Color::Rgb(76, 175, 80),
        Some(Condition::MinimalWear) => Color::Rgb(139, 195, 74),
        Some(Condition::FieldTested) => Color::Rgb(255, 152, 0),
        Some(Condition::WellWorn) => Color::Rgb(255, 87, 34),
        Some(Condition::BattleScarred) => Color::Rgb(121, 85, 72),
        None => Color::Gray,
    }
}

fn draw(frame: &mut ratatui::Frame<'_>, source: &str, view: Option<&RenderView>) {
    let size = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(3)])
        .split(size);

    draw_header(frame, chunks[0], source, view);
    draw_body(frame, chunks[1], view);
    draw_footer(frame, chunks[2], view);
}

fn draw_header(frame: &mut ratatui::Frame<'_>, area: Rect, source: &str, view: Option<&RenderView>) {
    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(vec![
        Span::styled("tradeup", Style::default().fg(Color::Cyan)),
        Span::raw(format!(" | watching {source}")),
    ]));

    if let Some(result) = view.and_then(RenderView::result) {
        let avg = Some(result.average_quality);
        lines.push(Line::from(vec![
            Span::styled(
                format!("Average input float ({} items): ", result.inputs.len()),
                Style::default().fg(Color::Gray),
            ),
            Span::styled(
                format_quality(avg),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(
                condition_label(avg),
                Style::default()
                    .fg(Color::White)
                    .bg(condition_color(avg))
                    .add_modifier(Modifier::BOLD),
            ),
        ]));
        lines.push(Line::from(Span::styled(
            format!("full precision: {}", result.average_quality),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(p, area);
}

fn draw_body(frame: &mut ratatui::Frame<'_>, area: Rect, view: Option<&RenderView>) {
    let Some(view) = view else {
        let msg = Paragraph::new("Waiting for trade-up dialog...")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(msg, area);
        return;
    };

    let Some(result) = view.result() else {
        let color = match view.state {
            RenderState::Loading => Color::Yellow,
            RenderState::NoItems => Color::Gray,
            _ => Color::Red,
        };
        let msg = Paragraph::new(status_message(&view.state).unwrap_or_default())
            .style(Style::default().fg(color))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(msg, area);
        return;
    };

    // Input breakdown only matters with more than one input.
    let input_rows = if result.inputs.len() > 1 {
        (result.name_shares.len() as u16 + 2).min(area.height / 3)
    } else {
        0
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(input_rows), Constraint::Min(0)])
        .split(area);

    if input_rows > 0 {
        draw_inputs(frame, chunks[0], result);
    }
    draw_outputs(frame, chunks[1], result);
}

fn draw_inputs(frame: &mut ratatui::Frame<'_>, area: Rect, result: &TradeUpResult) {
    let items: Vec<ListItem> = result
        .name_shares
        .iter()
        .map(|share| {
            ListItem::new(Line::from(vec![
                Span::raw(share.name.clone()),
                Span::styled(format!("  x{}", share.count), Style::default().fg(Color::Gray)),
                Span::styled(
                    format!("  {:.1}%", share.percent),
                    Style::default().fg(Color::Yellow),
                ),
            ]))
        })
        .collect();
    let list = List::new(items).block(Block::default().title("Input items").borders(Borders::ALL));
    frame.render_widget(list, area);
}

fn draw_outputs(frame: &mut ratatui::Frame<'_>, area: Rect, result: &TradeUpResult) {
    let title = match result.next_rarity {
        Some(next) => format!("Possible outputs ({next})"),
        None => "Possible outputs".to_string(),
    };
    let block = Block::default().title(title).borders(Borders::ALL);

    if result.outputs.is_empty() {
        let msg = no_outputs_message(result).unwrap_or_default();
        let p = Paragraph::new(msg)
            .style(Style::default().fg(Color::LightRed))
            .block(block);
        frame.render_widget(p, area);
        return;
    }

    let header = Row::new(["name", "collection", "cond", "float", "chance", "tickets"])
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = sorted_for_display(&result.outputs)
        .into_iter()
        .map(|o| {
            let color = condition_color(o.predicted_quality);
            Row::new(vec![
                Cell::from(o.record.name.clone()),
                Cell::from(o.record.collection.clone()).style(Style::default().fg(Color::Gray)),
                Cell::from(condition_label(o.predicted_quality))
                    .style(Style::default().fg(color).add_modifier(Modifier::BOLD)),
                Cell::from(format_quality(o.predicted_quality))
                    .style(Style::default().fg(Color::Yellow)),
                Cell::from(format_percent(o.probability)).style(Style::default().fg(Color::Green)),
                Cell::from(tickets_label(o.tickets)).style(Style::default().fg(Color::Gray)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Min(24),
        Constraint::Length(22),
        Constraint::Length(4),
        Constraint::Length(18),
        Constraint::Length(7),
        Constraint::Length(10),
    ];
    let table = Table::new(rows, widths).header(header).block(block);
    frame.render_widget(table, area);
}

fn draw_footer(frame: &mut ratatui::Frame<'_>, area: Rect, view: Option<&RenderView>) {
    let help = "r refresh  q quit";
    let status = match view {
        Some(v) => footer_line(v),
        None => "dialog closed".to_string(),
    };
    let line = Line::from(vec![
        Span::styled(help, Style::default().fg(Color::Gray)),
        Span::raw(" | "),
        Span::styled(status, Style::default().fg(Color::Yellow)),
    ]);
    let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    frame.render_widget(p, area);
}
