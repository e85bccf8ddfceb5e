//! Reporting: formatted trade-up text and the plain stdout renderer.

pub mod format;

pub use format::*;

use std::io::Write;

use tracing::warn;

use crate::session::{RenderView, Renderer};

/// Writes each distinct view as a text block.
///
/// Repeated renders of an unchanged view print nothing.
pub struct PlainRenderer<W: Write> {
    out: W,
    last: Option<String>,
}

impl PlainRenderer<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> PlainRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, last: None }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        let written = self
            .out
            .write_all(text.as_bytes())
            .and_then(|_| self.out.flush());
        if let Err(err) = written {
            warn!(error = %err, "failed to write report");
        }
    }
}

impl<W: Write> Renderer for PlainRenderer<W> {
    fn render(&mut self, view: &RenderView) {
        let text = format_view(view);
        if self.last.as_deref() == Some(text.as_str()) {
            return;
        }
        self.emit(&format!("{text}\n"));
        self.last = Some(text);
    }

    fn clear(&mut self) {
        if self.last.take().is_some() {
            self.emit("(trade-up closed)\n\n");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LoadState;
    use crate::session::RenderState;

    fn view(state: RenderState) -> RenderView {
        RenderView {
            state,
            load_state: LoadState::Loaded,
            catalog_size: 3,
            loaded_at: None,
        }
    }

    #[test]
    fn unchanged_views_are_printed_once() {
        let mut r = PlainRenderer::new(Vec::new());
        r.render(&view(RenderState::NoItems));
        r.render(&view(RenderState::NoItems));
        r.render(&view(RenderState::Loading));
        let text = String::from_utf8(r.into_inner()).unwrap();
        assert_eq!(
            text,
            "No valid items found in trade-up\n\nLoading skins database...\n\n"
        );
    }

    #[test]
    fn clear_only_prints_after_output() {
        let mut r = PlainRenderer::new(Vec::new());
        r.clear();
        r.render(&view(RenderState::NoItems));
        r.clear();
        r.clear();
        let text = String::from_utf8(r.into_inner()).unwrap();
        assert_eq!(text.matches("(trade-up closed)").count(), 1);
    }
}
