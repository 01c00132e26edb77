//! Scenario tests for replay.

mod common;

use keepsake_core::view::{Element, StepId, Visibility};
use keepsake_presentation::domain::commands::{Interaction, UserInput};
use keepsake_presentation::domain::events::PresentationEventKind;
use keepsake_presentation::domain::script::Script;
use keepsake_test_support::{ScriptedPlayback, SurfaceCall};

use common::{build, drive_to, press, settle};

#[test]
fn test_replay_returns_to_intro_and_discards_pending_timers() {
    // Arrange
    let mut presentation = build(Script::default(), ScriptedPlayback::allowing());
    // The envelope's fade-out is still pending when the ending appears.
    drive_to(&mut presentation, StepId::Ending);
    assert!(presentation.pending_timers() > 0);

    // Act
    press(&mut presentation, UserInput::Replay);

    // Assert
    assert_eq!(presentation.current_step(), Some(StepId::Intro));
    assert_eq!(presentation.visits(StepId::Intro), 2);
    for step in StepId::ALL {
        let expected = if step == StepId::Intro {
            Visibility::Active
        } else {
            Visibility::Hidden
        };
        assert_eq!(presentation.visibility(step), expected, "{step}");
    }
    assert!(!presentation.is_revealed(Element::FinishButton));
    assert!(!presentation.is_envelope_opened());
    assert_eq!(presentation.surface().count(&SurfaceCall::Reset), 1);
    assert_eq!(
        presentation.uncommitted_events()[0].kind,
        PresentationEventKind::Replayed
    );

    settle(&mut presentation);
    assert!(presentation.surface().is_shown(StepId::Intro));
    assert!(!presentation.surface().is_shown(StepId::Envelope));
    assert!(presentation.is_revealed(Element::StartButton));
}

#[test]
fn test_second_run_plays_through_and_restarts_ambient() {
    let mut presentation = build(Script::default(), ScriptedPlayback::allowing());
    drive_to(&mut presentation, StepId::Ending);
    press(&mut presentation, UserInput::Replay);
    settle(&mut presentation);

    press(&mut presentation, UserInput::Start);
    settle(&mut presentation);

    assert_eq!(presentation.current_step(), Some(StepId::Question));
    assert_eq!(presentation.visits(StepId::Question), 2);
    assert_eq!(presentation.playback().attempts(), 2);
}

#[test]
fn test_replay_outside_the_ending_is_rejected() {
    let mut presentation = build(Script::default(), ScriptedPlayback::allowing());
    drive_to(&mut presentation, StepId::Envelope);

    let result = presentation.handle(&Interaction::new(UserInput::Replay));

    assert!(result.is_err());
    assert_eq!(presentation.current_step(), Some(StepId::Envelope));
}
