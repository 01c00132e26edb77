//! Terminal rendering of the view surface and ambient playback.

use std::io::{self, Write};

use keepsake_core::error::DomainError;
use keepsake_core::media::AmbientPlayback;
use keepsake_core::view::{Element, Region, StepId, ViewSurface};
use tracing::{info, trace};

/// View surface that prints to a line-oriented writer.
///
/// Typed text is streamed: each write prints only the characters added
/// since the previous one. The first I/O error is kept and every later
/// write is skipped until [`TerminalSurface::take_error`] collects it.
#[derive(Debug)]
pub struct TerminalSurface<W> {
    out: W,
    typing: Option<(Region, usize)>,
    error: Option<io::Error>,
}

impl<W: Write> TerminalSurface<W> {
    /// Wraps a writer.
    pub fn new(out: W) -> Self {
        Self {
            out,
            typing: None,
            error: None,
        }
    }

    /// Prints a line outside the presentation's own output.
    pub fn notice(&mut self, message: &str) {
        self.line(message);
    }

    /// Returns the first write error, if any, and clears it.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    /// The wrapped writer.
    pub fn writer(&self) -> &W {
        &self.out
    }

    fn emit(&mut self, text: &str, newline: bool) {
        if self.error.is_some() {
            return;
        }
        let result = if newline {
            writeln!(self.out, "{text}")
        } else {
            write!(self.out, "{text}")
        }
        .and_then(|()| self.out.flush());
        if let Err(e) = result {
            self.error = Some(e);
        }
    }

    /// Prints a full line, closing any typed line first.
    fn line(&mut self, text: &str) {
        if self.typing.take().is_some() {
            self.emit("", true);
        }
        self.emit(text, true);
    }
}

impl<W: Write> ViewSurface for TerminalSurface<W> {
    fn show(&mut self, step: StepId) {
        self.line("");
        self.line(&format!("== {step} =="));
    }

    fn hide(&mut self, step: StepId) {
        trace!(%step, "hidden");
    }

    fn set_active(&mut self, step: StepId, active: bool) {
        trace!(%step, active, "activity changed");
    }

    fn flush_layout(&mut self, step: StepId) {
        trace!(%step, "layout flushed");
    }

    fn write_text(&mut self, region: Region, text: &str) {
        let shown = match self.typing {
            Some((current, shown)) if current == region => shown,
            _ => {
                if self.typing.take().is_some() {
                    self.emit("", true);
                }
                0
            }
        };
        let total = text.chars().count();
        if total < shown {
            // The region was cleared; start a fresh line.
            self.emit("", true);
            self.typing = Some((region, 0));
            self.write_text(region, text);
            return;
        }
        let added: String = text.chars().skip(shown).collect();
        self.emit(&added, false);
        self.typing = Some((region, total));
    }

    fn reveal(&mut self, element: Element) {
        let hint = match element {
            Element::StartButton => "[start]",
            Element::TimelineContinue | Element::ChatContinue => "[continue]",
            Element::Envelope => "[an envelope: open]",
            Element::FinishButton => "[finish]",
            Element::IntroLine(_) | Element::MomentDisplay | Element::FinalMessage => return,
        };
        self.line(hint);
    }

    fn conceal(&mut self, element: Element) {
        trace!(%element, "concealed");
    }

    fn present_options(&mut self, _step: StepId, prompt: &str, options: &[String]) {
        self.line(prompt);
        for (i, option) in options.iter().enumerate() {
            self.line(&format!("  {}) {option}   [choose {}]", i + 1, i + 1));
        }
    }

    fn render_points(&mut self, count: usize) {
        self.line(&format!("{count} moments   [point 1..{count}]"));
    }

    fn set_point_active(&mut self, index: usize, active: bool) {
        trace!(point = index + 1, active, "timeline point toggled");
    }

    fn display_moment(&mut self, caption: &str, image: &str) {
        self.line(&format!("* {caption}  ({image})"));
    }

    fn clear_bubbles(&mut self) {
        trace!("chat log cleared");
    }

    fn append_bubble(&mut self, text: &str) {
        self.line(&format!("  > {text}"));
    }

    fn collapse_envelope(&mut self) {
        self.line("(the envelope opens)");
    }

    fn acknowledge(&mut self, message: &str) {
        self.line(message);
    }

    fn reset(&mut self) {
        self.typing = None;
        self.line("");
    }
}

/// Ambient playback of the terminal: there is no soundtrack, so it only
/// reports whether one would be playing.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPlayback {
    muted: bool,
}

impl TerminalPlayback {
    /// Playback that is refused when `muted` is set.
    #[must_use]
    pub fn new(muted: bool) -> Self {
        Self { muted }
    }
}

impl AmbientPlayback for TerminalPlayback {
    fn play(&mut self) -> Result<(), DomainError> {
        if self.muted {
            return Err(DomainError::MediaPlaybackDenied(
                "muted by configuration".to_owned(),
            ));
        }
        info!("ambient playback started");
        Ok(())
    }
}
