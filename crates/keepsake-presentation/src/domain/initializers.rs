//! Step initializers and the effects they schedule.
//!
//! Each initializer runs once per activation and only touches its own
//! step's regions. Follow-ups land on the activation sequence, so leaving
//! the step silences them.

use keepsake_core::error::DomainError;
use keepsake_core::media::AmbientPlayback;
use keepsake_core::view::{Element, Region, StepId, ViewSurface};
use tracing::debug;

use super::aggregates::Presentation;
use super::cues::Cue;
use super::events::PresentationEventKind;

impl<V, P> Presentation<V, P>
where
    V: ViewSurface,
    P: AmbientPlayback,
{
    pub(crate) fn initialize(&mut self, step: StepId) -> Result<(), DomainError> {
        match step {
            StepId::Intro => self.start_intro_line(0)?,
            StepId::Question | StepId::Reflection => {
                if let Some(prompt) = self.script.prompt(step) {
                    self.surface
                        .present_options(step, &prompt.prompt, &prompt.options);
                }
            }
            StepId::Timeline => self.init_timeline(),
            StepId::Chat => self.init_chat()?,
            StepId::Envelope => self.init_envelope(),
            StepId::Ending => {}
        }
        Ok(())
    }

    /// Types intro line `line`, or schedules the start affordance once
    /// every line is done.
    pub(crate) fn start_intro_line(&mut self, line: usize) -> Result<(), DomainError> {
        let Some(text) = self.script.intro_lines.get(line).cloned() else {
            self.after(
                self.pacing.intro_affordance_delay_ms,
                Cue::RevealElement(Element::StartButton),
            );
            return Ok(());
        };
        self.reveal_element(Element::IntroLine(line));
        self.typewriter.start(
            &mut self.scheduler,
            Region::IntroLine(line),
            &text,
            self.pacing.typing_cadence_ms,
            Cue::IntroLineTyped(line),
        )?;
        Ok(())
    }

    pub(crate) fn intro_line_typed(&mut self, line: usize) {
        self.record(PresentationEventKind::IntroLineTyped { line });
        if line + 1 < self.script.intro_lines.len() {
            self.after(self.pacing.intro_line_pause_ms, Cue::StartIntroLine(line + 1));
        } else {
            self.after(
                self.pacing.intro_affordance_delay_ms,
                Cue::RevealElement(Element::StartButton),
            );
        }
    }

    fn init_timeline(&mut self) {
        self.active_moment = None;
        self.surface.render_points(self.script.moments.len());
        self.conceal_element(Element::MomentDisplay);
        self.conceal_element(Element::TimelineContinue);
        self.after(self.pacing.timeline_autoselect_ms, Cue::SelectMoment(0));
    }

    /// Makes moment `index` the only active point and displays it.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInput` if `index` is out of range.
    pub(crate) fn select_moment(&mut self, index: usize) -> Result<(), DomainError> {
        let count = self.script.moments.len();
        let Some(moment) = self.script.moments.get(index).cloned() else {
            return Err(DomainError::InvalidInput(format!(
                "moment {index} out of range, the timeline has {count}"
            )));
        };
        if let Some(previous) = self.active_moment.replace(index) {
            if previous != index {
                self.surface.set_point_active(previous, false);
            }
        }
        self.surface.set_point_active(index, true);
        self.surface.display_moment(&moment.caption, &moment.image);
        self.reveal_element(Element::MomentDisplay);
        self.record(PresentationEventKind::MomentSelected { index });
        if index + 1 == count {
            self.reveal_element(Element::TimelineContinue);
        }
        Ok(())
    }

    fn init_chat(&mut self) -> Result<(), DomainError> {
        self.conceal_element(Element::ChatContinue);
        self.reveals.reveal_all(
            &mut self.scheduler,
            Region::ChatLog,
            self.script.chat_messages.len(),
            self.pacing.chat_timing(),
            Cue::RevealElement(Element::ChatContinue),
        )?;
        Ok(())
    }

    pub(crate) fn render_bubble(&mut self, index: usize) {
        let Some(message) = self.script.chat_messages.get(index) else {
            return;
        };
        self.surface.append_bubble(message);
        self.record(PresentationEventKind::ChatBubbleRendered { index });
    }

    fn init_envelope(&mut self) {
        self.envelope_opened = false;
        self.conceal_element(Element::FinalMessage);
        self.conceal_element(Element::FinishButton);
        self.reveal_element(Element::Envelope);
    }

    /// Opens the envelope once; later clicks are ignored.
    pub(crate) fn open_envelope(&mut self) {
        if self.envelope_opened {
            debug!("envelope already opened, click ignored");
            return;
        }
        self.envelope_opened = true;
        self.surface.collapse_envelope();
        self.record(PresentationEventKind::EnvelopeOpened);

        let message_at = self.pacing.envelope_message_delay_ms;
        let finish_at = message_at.saturating_add(self.pacing.envelope_finish_delay_ms);
        let sequence = self.scheduler.spawn([
            (message_at, Cue::ShowFinalMessage),
            (finish_at, Cue::RevealElement(Element::FinishButton)),
        ]);
        self.owned.push(sequence);
    }

    pub(crate) fn show_final_message(&mut self) {
        self.conceal_element(Element::Envelope);
        self.surface
            .write_text(Region::FinalMessage, &self.script.final_message);
        self.reveal_element(Element::FinalMessage);
        self.record(PresentationEventKind::FinalMessageRevealed);
    }
}
