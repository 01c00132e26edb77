//! The presentation aggregate: current-step state and the step transition
//! controller.
//!
//! Every deferred effect goes through one [`Scheduler`]. A transition leaves
//! the current step (canceling whatever its activation scheduled), then a
//! single transition sequence hides the old view after the fade-out and
//! shows the target after the enter delay. While that sequence is in flight
//! further transition requests are absorbed, so each activation runs its
//! initializer exactly once.

use std::collections::BTreeSet;
use std::sync::Arc;

use keepsake_core::clock::Clock;
use keepsake_core::error::DomainError;
use keepsake_core::event::EventMetadata;
use keepsake_core::media::AmbientPlayback;
use keepsake_core::view::{Element, Region, StepId, ViewSurface, Visibility};
use keepsake_sequencer::{
    Millis, RevealStep, Scheduler, SequenceId, StaggeredReveal, TypingStep, Typewriter,
};
use tracing::{debug, info, instrument, trace, warn};
use uuid::Uuid;

use super::commands::{Interaction, UserInput};
use super::cues::Cue;
use super::events::{PresentationEvent, PresentationEventKind};
use super::pacing::Pacing;
use super::script::Script;

const STEP_COUNT: usize = StepId::ALL.len();

/// Outcome of a transition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The transition was scheduled.
    Started,
    /// Another transition is still running; the request was ignored.
    AlreadyInFlight,
}

/// The aggregate root for one presentation run.
pub struct Presentation<V, P> {
    /// Aggregate identifier.
    pub id: Uuid,
    pub(crate) script: Script,
    pub(crate) pacing: Pacing,
    pub(crate) surface: V,
    playback: P,
    clock: Arc<dyn Clock>,
    pub(crate) scheduler: Scheduler<Cue>,
    pub(crate) typewriter: Typewriter<Region, Cue>,
    pub(crate) reveals: StaggeredReveal<Region, Cue>,
    visibility: [Visibility; STEP_COUNT],
    current: Option<StepId>,
    in_flight: Option<StepId>,
    /// Running sequence of the current activation; follow-ups land on it.
    activation: Option<SequenceId>,
    /// Every sequence the current activation started.
    pub(crate) owned: Vec<SequenceId>,
    revealed: BTreeSet<Element>,
    pub(crate) active_moment: Option<usize>,
    pub(crate) envelope_opened: bool,
    ambient_started: bool,
    visits: [usize; STEP_COUNT],
    correlation_id: Uuid,
    /// Current version (committed event count).
    version: i64,
    /// Events recorded since the last [`Presentation::take_events`].
    uncommitted_events: Vec<PresentationEvent>,
}

impl<V, P> Presentation<V, P>
where
    V: ViewSurface,
    P: AmbientPlayback,
{
    /// Creates a presentation that has not begun yet.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidConfig` if the script or pacing is
    /// invalid.
    pub fn new(
        id: Uuid,
        script: Script,
        pacing: Pacing,
        surface: V,
        playback: P,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, DomainError> {
        script.validate()?;
        pacing.validate()?;
        Ok(Self {
            id,
            script,
            pacing,
            surface,
            playback,
            clock,
            scheduler: Scheduler::new(),
            typewriter: Typewriter::new(),
            reveals: StaggeredReveal::new(),
            visibility: [Visibility::Hidden; STEP_COUNT],
            current: None,
            in_flight: None,
            activation: None,
            owned: Vec::new(),
            revealed: BTreeSet::new(),
            active_moment: None,
            envelope_opened: false,
            ambient_started: false,
            visits: [0; STEP_COUNT],
            correlation_id: Uuid::new_v4(),
            version: 0,
            uncommitted_events: Vec::new(),
        })
    }

    /// Activates the intro immediately.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStep` if the presentation already began.
    pub fn begin(&mut self) -> Result<(), DomainError> {
        if self.current.is_some() || self.in_flight.is_some() {
            return Err(DomainError::InvalidStep(
                "presentation has already begun".to_owned(),
            ));
        }
        info!(presentation_id = %self.id, "presentation begins");
        self.enter(StepId::Intro)?;
        self.run_due()
    }

    /// Requests a transition to `target`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStep` if `target` is not the step that
    /// follows the current one.
    pub fn go_to(&mut self, target: StepId) -> Result<Transition, DomainError> {
        let transition = self.request_transition(target)?;
        self.run_due()?;
        Ok(transition)
    }

    /// Requests a transition to the step named `name`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStep` if the name is unknown or the step
    /// is not reachable from the current one.
    pub fn go_to_named(&mut self, name: &str) -> Result<Transition, DomainError> {
        let target: StepId = name.parse()?;
        self.go_to(target)
    }

    /// Applies one user input.
    ///
    /// Inputs arriving while a transition is in flight are ignored.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInput` if the input is not accepted in
    /// the current state; the presentation is left unchanged.
    #[instrument(
        skip(self, interaction),
        fields(
            presentation_id = %self.id,
            input = interaction.input.name(),
            correlation_id = %interaction.correlation_id,
        )
    )]
    pub fn handle(&mut self, interaction: &Interaction) -> Result<(), DomainError> {
        if let Some(target) = self.in_flight {
            debug!(%target, "input ignored while a transition is in flight");
            return Ok(());
        }
        let current = self
            .current
            .ok_or_else(|| DomainError::InvalidInput("presentation has not begun".to_owned()))?;
        let previous = std::mem::replace(&mut self.correlation_id, interaction.correlation_id);
        if let Err(e) = self.apply_input(current, interaction.input) {
            self.correlation_id = previous;
            return Err(e);
        }
        self.run_due()
    }

    fn apply_input(&mut self, current: StepId, input: UserInput) -> Result<(), DomainError> {
        match input {
            UserInput::Start => {
                expect_step(current, StepId::Intro, "start")?;
                self.expect_revealed(Element::StartButton)?;
                self.start_ambient()?;
                self.advance_from(current)?;
            }
            UserInput::Choose { option } => {
                let prompt = self.script.prompt(current).ok_or_else(|| {
                    DomainError::InvalidInput(format!("no choice is offered at {current}"))
                })?;
                if option >= prompt.options.len() {
                    return Err(DomainError::InvalidInput(format!(
                        "option {option} out of range, {current} offers {}",
                        prompt.options.len()
                    )));
                }
                self.record(PresentationEventKind::OptionChosen {
                    step: current,
                    option,
                });
                self.advance_from(current)?;
            }
            UserInput::SelectMoment { index } => {
                expect_step(current, StepId::Timeline, "select_moment")?;
                self.select_moment(index)?;
            }
            UserInput::Continue => {
                let affordance = match current {
                    StepId::Timeline => Element::TimelineContinue,
                    StepId::Chat => Element::ChatContinue,
                    other => {
                        return Err(DomainError::InvalidInput(format!(
                            "nothing to continue at {other}"
                        )));
                    }
                };
                self.expect_revealed(affordance)?;
                self.advance_from(current)?;
            }
            UserInput::OpenEnvelope => {
                expect_step(current, StepId::Envelope, "open_envelope")?;
                self.open_envelope();
            }
            UserInput::Finish => {
                expect_step(current, StepId::Envelope, "finish")?;
                self.expect_revealed(Element::FinishButton)?;
                self.advance_from(current)?;
            }
            UserInput::Replay => {
                expect_step(current, StepId::Ending, "replay")?;
                self.restart()?;
            }
            UserInput::Freeze => {
                expect_step(current, StepId::Ending, "freeze")?;
                self.surface.acknowledge(&self.script.freeze_acknowledgement);
                self.record(PresentationEventKind::Frozen);
            }
        }
        Ok(())
    }

    /// Moves presentation time forward to `until`, executing every effect
    /// that comes due on the way.
    ///
    /// # Errors
    ///
    /// Propagates a `DomainError` raised by an effect.
    pub fn advance_to(&mut self, until: Millis) -> Result<(), DomainError> {
        while let Some(fired) = self.scheduler.pop_due(until) {
            trace!(sequence = %fired.sequence, at = fired.at, cue = ?fired.effect, "timer fired");
            self.dispatch(fired.effect)?;
        }
        Ok(())
    }

    /// Moves presentation time forward by `delta`.
    ///
    /// # Errors
    ///
    /// Propagates a `DomainError` raised by an effect.
    pub fn advance_by(&mut self, delta: Millis) -> Result<(), DomainError> {
        self.advance_to(self.scheduler.now().saturating_add(delta))
    }

    /// Presentation time of the next pending effect.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Millis> {
        self.scheduler.next_deadline()
    }

    /// Current presentation time.
    #[must_use]
    pub fn now(&self) -> Millis {
        self.scheduler.now()
    }

    /// Number of effects still waiting to fire.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    /// The step that is (or was last) active.
    #[must_use]
    pub fn current_step(&self) -> Option<StepId> {
        self.current
    }

    /// Target of the running transition.
    #[must_use]
    pub fn in_flight(&self) -> Option<StepId> {
        self.in_flight
    }

    /// Visibility of a step's view.
    #[must_use]
    pub fn visibility(&self, step: StepId) -> Visibility {
        self.visibility[step.index()]
    }

    /// Index of the selected timeline moment.
    #[must_use]
    pub fn active_moment(&self) -> Option<usize> {
        self.active_moment
    }

    /// Whether the envelope of the current visit has been opened.
    #[must_use]
    pub fn is_envelope_opened(&self) -> bool {
        self.envelope_opened
    }

    /// How many times the step has been activated.
    #[must_use]
    pub fn visits(&self, step: StepId) -> usize {
        self.visits[step.index()]
    }

    /// Whether `element` has been revealed.
    #[must_use]
    pub fn is_revealed(&self, element: Element) -> bool {
        self.revealed.contains(&element)
    }

    /// Revealed elements, in a stable order.
    pub fn revealed(&self) -> impl Iterator<Item = Element> + '_ {
        self.revealed.iter().copied()
    }

    /// The script being presented.
    #[must_use]
    pub fn script(&self) -> &Script {
        &self.script
    }

    /// The view surface.
    #[must_use]
    pub fn surface(&self) -> &V {
        &self.surface
    }

    /// The view surface, mutably.
    pub fn surface_mut(&mut self) -> &mut V {
        &mut self.surface
    }

    /// The ambient playback collaborator.
    #[must_use]
    pub fn playback(&self) -> &P {
        &self.playback
    }

    /// Current version (committed event count).
    #[must_use]
    pub fn version(&self) -> i64 {
        self.version
    }

    /// Events recorded since the last [`Presentation::take_events`].
    #[must_use]
    pub fn uncommitted_events(&self) -> &[PresentationEvent] {
        &self.uncommitted_events
    }

    /// Drains the recorded events and commits them to the version.
    #[allow(clippy::cast_possible_wrap)]
    pub fn take_events(&mut self) -> Vec<PresentationEvent> {
        self.version += self.uncommitted_events.len() as i64;
        std::mem::take(&mut self.uncommitted_events)
    }

    /// Returns the next sequence number for a new event.
    #[allow(clippy::cast_possible_wrap)]
    fn next_sequence_number(&self) -> i64 {
        self.version + self.uncommitted_events.len() as i64 + 1
    }

    pub(crate) fn record(&mut self, kind: PresentationEventKind) {
        let event = PresentationEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: kind.event_type().to_owned(),
                aggregate_id: self.id,
                sequence_number: self.next_sequence_number(),
                correlation_id: self.correlation_id,
                causation_id: self.correlation_id,
                occurred_at: self.clock.now(),
                at_ms: self.scheduler.now(),
            },
            kind,
        };
        self.uncommitted_events.push(event);
    }

    /// Schedules `cue` on the current activation, `delay` ms from now.
    pub(crate) fn after(&mut self, delay: Millis, cue: Cue) {
        match self.activation {
            Some(activation) => self.scheduler.schedule_after(activation, delay, cue),
            None => debug!(?cue, "no active step; dropping follow-up"),
        }
    }

    /// Reveals `element` once; repeats are no-ops.
    pub(crate) fn reveal_element(&mut self, element: Element) {
        if !self.revealed.insert(element) {
            return;
        }
        self.surface.reveal(element);
        self.record(PresentationEventKind::ElementRevealed { element });
    }

    pub(crate) fn conceal_element(&mut self, element: Element) {
        self.revealed.remove(&element);
        self.surface.conceal(element);
    }

    fn expect_revealed(&self, element: Element) -> Result<(), DomainError> {
        if self.revealed.contains(&element) {
            Ok(())
        } else {
            Err(DomainError::InvalidInput(format!(
                "'{element}' has not been revealed yet"
            )))
        }
    }

    fn run_due(&mut self) -> Result<(), DomainError> {
        self.advance_to(self.scheduler.now())
    }

    fn advance_from(&mut self, current: StepId) -> Result<(), DomainError> {
        let next = current
            .next()
            .ok_or_else(|| DomainError::InvalidStep(format!("{current} is the last step")))?;
        self.request_transition(next)?;
        Ok(())
    }

    fn request_transition(&mut self, target: StepId) -> Result<Transition, DomainError> {
        if let Some(pending) = self.in_flight {
            debug!(%pending, %target, "transition already in flight; request ignored");
            return Ok(Transition::AlreadyInFlight);
        }
        let expected = self.current.map_or(Some(StepId::Intro), StepId::next);
        if expected != Some(target) {
            return Err(DomainError::InvalidStep(match self.current {
                Some(current) => format!("cannot go from {current} to {target}"),
                None => format!("presentation must open with intro, not {target}"),
            }));
        }

        let leaving = self.current;
        if let Some(step) = leaving {
            self.leave(step);
        }
        self.in_flight = Some(target);
        let hide = leaving.map(|step| (self.pacing.fade_out_ms, Cue::HideStep(step)));
        let enter = (self.pacing.enter_delay_ms, Cue::EnterStep(target));
        let sequence = self.scheduler.spawn(hide.into_iter().chain([enter]));
        info!(from = ?leaving, to = %target, %sequence, "transition started");
        Ok(Transition::Started)
    }

    fn leave(&mut self, step: StepId) {
        for sequence in self.owned.drain(..) {
            self.scheduler.cancel(sequence);
        }
        self.activation = None;
        self.typewriter.cancel_all(&mut self.scheduler);
        self.reveals.cancel_all(&mut self.scheduler);
        self.visibility[step.index()] = Visibility::Leaving;
        self.surface.set_active(step, false);
        self.record(PresentationEventKind::StepDeactivated { step });
    }

    fn finish_leaving(&mut self, step: StepId) {
        if self.visibility[step.index()] != Visibility::Leaving {
            debug!(%step, "step is no longer leaving; hide skipped");
            return;
        }
        self.visibility[step.index()] = Visibility::Hidden;
        self.surface.hide(step);
        self.record(PresentationEventKind::StepHidden { step });
    }

    fn enter(&mut self, step: StepId) -> Result<(), DomainError> {
        let slot = step.index();
        self.surface.show(step);
        self.visibility[slot] = Visibility::Entering;
        self.record(PresentationEventKind::StepShown { step });

        self.surface.flush_layout(step);
        self.surface.set_active(step, true);
        self.visibility[slot] = Visibility::Active;
        self.current = Some(step);
        self.in_flight = None;
        self.visits[slot] += 1;

        let activation = self.scheduler.spawn(std::iter::empty());
        self.activation = Some(activation);
        self.owned.push(activation);
        self.record(PresentationEventKind::StepActivated { step });
        info!(%step, visit = self.visits[slot], "step activated");

        self.initialize(step)
    }

    fn start_ambient(&mut self) -> Result<(), DomainError> {
        if self.ambient_started {
            return Ok(());
        }
        match self.playback.play() {
            Ok(()) => self.record(PresentationEventKind::AmbientPlaybackStarted),
            Err(e) if e.is_recoverable() => {
                warn!(error = %e, "ambient playback denied, continuing without it");
                self.record(PresentationEventKind::AmbientPlaybackDenied {
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
        self.ambient_started = true;
        Ok(())
    }

    fn restart(&mut self) -> Result<(), DomainError> {
        self.scheduler.reset();
        self.typewriter = Typewriter::new();
        self.reveals = StaggeredReveal::new();
        self.owned.clear();
        self.activation = None;
        self.visibility = [Visibility::Hidden; STEP_COUNT];
        self.current = None;
        self.in_flight = None;
        self.revealed.clear();
        self.active_moment = None;
        self.envelope_opened = false;
        self.ambient_started = false;
        self.surface.reset();
        self.record(PresentationEventKind::Replayed);
        info!(presentation_id = %self.id, "presentation replayed");
        self.enter(StepId::Intro)
    }

    fn dispatch(&mut self, cue: Cue) -> Result<(), DomainError> {
        match cue {
            Cue::HideStep(step) => self.finish_leaving(step),
            Cue::EnterStep(step) => return self.enter(step),
            Cue::Typing(tick) => {
                let sink = tick.sink();
                match self.typewriter.apply(tick) {
                    TypingStep::Show(text) => self.surface.write_text(sink, &text),
                    TypingStep::Completed(next) => return self.dispatch(next),
                    TypingStep::Stale => trace!(?sink, "stale typing tick"),
                }
            }
            Cue::Reveal(tick) => match self.reveals.apply(tick) {
                RevealStep::Clear => self.surface.clear_bubbles(),
                RevealStep::Render(index) => self.render_bubble(index),
                RevealStep::Finished(next) => return self.dispatch(next),
                RevealStep::Stale => trace!(target = ?tick.target(), "stale reveal tick"),
            },
            Cue::IntroLineTyped(line) => self.intro_line_typed(line),
            Cue::StartIntroLine(line) => return self.start_intro_line(line),
            Cue::RevealElement(element) => self.reveal_element(element),
            Cue::SelectMoment(index) => return self.select_moment(index),
            Cue::ShowFinalMessage => self.show_final_message(),
        }
        Ok(())
    }
}

fn expect_step(current: StepId, required: StepId, input: &str) -> Result<(), DomainError> {
    if current == required {
        Ok(())
    } else {
        Err(DomainError::InvalidInput(format!(
            "'{input}' is only accepted at {required}, not {current}"
        )))
    }
}
