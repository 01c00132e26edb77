//! Shared helpers for presentation scenario tests.
#![allow(dead_code)]

use std::sync::Arc;

use keepsake_core::view::StepId;
use keepsake_presentation::domain::aggregates::Presentation;
use keepsake_presentation::domain::commands::{Interaction, UserInput};
use keepsake_presentation::domain::events::PresentationEventKind;
use keepsake_presentation::domain::pacing::Pacing;
use keepsake_presentation::domain::script::Script;
use keepsake_sequencer::Millis;
use keepsake_test_support::{FixedClock, RecordingSurface, ScriptedPlayback};
use uuid::Uuid;

pub type TestPresentation = Presentation<RecordingSurface, ScriptedPlayback>;

/// A presentation of `script` with default pacing, not begun yet.
pub fn build(script: Script, playback: ScriptedPlayback) -> TestPresentation {
    Presentation::new(
        Uuid::new_v4(),
        script,
        Pacing::default(),
        RecordingSurface::new(),
        playback,
        Arc::new(FixedClock::default()),
    )
    .unwrap()
}

/// Sends one input.
pub fn press(presentation: &mut TestPresentation, input: UserInput) {
    presentation.handle(&Interaction::new(input)).unwrap();
}

/// Fires every pending timer, including the ones fired timers schedule.
pub fn settle(presentation: &mut TestPresentation) {
    while let Some(deadline) = presentation.next_deadline() {
        presentation.advance_to(deadline).unwrap();
    }
}

/// Begins the presentation and plays it through to the moment `target`
/// becomes active. The journal is emptied on arrival.
pub fn drive_to(presentation: &mut TestPresentation, target: StepId) {
    presentation.begin().unwrap();
    while presentation.current_step() != Some(target) {
        let step = presentation.current_step().unwrap();
        settle(presentation);
        match step {
            StepId::Intro => press(presentation, UserInput::Start),
            StepId::Question | StepId::Reflection => {
                press(presentation, UserInput::Choose { option: 0 });
            }
            StepId::Timeline => {
                let last = presentation.script().moments.len() - 1;
                press(presentation, UserInput::SelectMoment { index: last });
                press(presentation, UserInput::Continue);
            }
            StepId::Chat => press(presentation, UserInput::Continue),
            StepId::Envelope => {
                press(presentation, UserInput::OpenEnvelope);
                settle(presentation);
                press(presentation, UserInput::Finish);
            }
            StepId::Ending => panic!("{target} lies before the ending"),
        }
        presentation
            .advance_by(Pacing::default().enter_delay_ms)
            .unwrap();
    }
    presentation.take_events();
}

/// Presentation times of the journal events matching `wanted`.
pub fn times_of(
    presentation: &TestPresentation,
    wanted: impl Fn(&PresentationEventKind) -> bool,
) -> Vec<Millis> {
    presentation
        .uncommitted_events()
        .iter()
        .filter(|e| wanted(&e.kind))
        .map(|e| e.metadata.at_ms)
        .collect()
}
