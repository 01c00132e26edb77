//! Scenario tests for step transitions.

mod common;

use keepsake_core::view::{Element, Region, StepId, Visibility};
use keepsake_presentation::domain::aggregates::Transition;
use keepsake_presentation::domain::commands::{Interaction, UserInput};
use keepsake_presentation::domain::events::PresentationEventKind;
use keepsake_presentation::domain::script::Script;
use keepsake_test_support::{ScriptedPlayback, SurfaceCall};

use common::{build, drive_to, press, settle, times_of};

#[test]
fn test_walks_the_whole_path_once() {
    let mut presentation = build(Script::default(), ScriptedPlayback::allowing());

    drive_to(&mut presentation, StepId::Ending);
    settle(&mut presentation);

    for step in StepId::ALL {
        assert_eq!(presentation.visits(step), 1, "{step}");
        let expected = if step == StepId::Ending {
            Visibility::Active
        } else {
            Visibility::Hidden
        };
        assert_eq!(presentation.visibility(step), expected, "{step}");
    }
    assert_eq!(presentation.pending_timers(), 0);
}

#[test]
fn test_double_choice_runs_next_initializer_once() {
    // Arrange
    let mut presentation = build(Script::default(), ScriptedPlayback::allowing());
    drive_to(&mut presentation, StepId::Question);

    // Act
    press(&mut presentation, UserInput::Choose { option: 0 });
    press(&mut presentation, UserInput::Choose { option: 1 });
    settle(&mut presentation);

    // Assert
    assert_eq!(presentation.visits(StepId::Timeline), 1);
    assert_eq!(
        presentation.surface().count(&SurfaceCall::RenderPoints(4)),
        1
    );
    let chosen = times_of(&presentation, |k| {
        matches!(k, PresentationEventKind::OptionChosen { .. })
    });
    assert_eq!(chosen.len(), 1);
}

#[test]
fn test_go_to_twice_in_rapid_succession_enters_once() {
    let mut presentation = build(Script::default(), ScriptedPlayback::allowing());
    presentation.begin().unwrap();

    let first = presentation.go_to(StepId::Question).unwrap();
    let second = presentation.go_to(StepId::Question).unwrap();
    settle(&mut presentation);

    assert_eq!(first, Transition::Started);
    assert_eq!(second, Transition::AlreadyInFlight);
    assert_eq!(presentation.visits(StepId::Question), 1);
}

#[test]
fn test_leaving_intro_mid_typing_silences_its_timers() {
    // Arrange
    let mut presentation = build(Script::default(), ScriptedPlayback::allowing());
    presentation.begin().unwrap();
    presentation.advance_to(120).unwrap();
    let typed = presentation
        .surface()
        .text(Region::IntroLine(0))
        .map(str::to_owned);

    // Act
    presentation.go_to(StepId::Question).unwrap();
    settle(&mut presentation);

    // Assert
    assert_eq!(
        presentation.surface().text(Region::IntroLine(0)).map(str::to_owned),
        typed
    );
    assert!(times_of(&presentation, |k| matches!(
        k,
        PresentationEventKind::IntroLineTyped { .. }
    ))
    .is_empty());
    assert!(!presentation.is_revealed(Element::StartButton));
    assert_eq!(presentation.current_step(), Some(StepId::Question));
}

#[test]
fn test_leaving_timeline_before_autoselect_never_selects() {
    let mut presentation = build(Script::default(), ScriptedPlayback::allowing());
    drive_to(&mut presentation, StepId::Timeline);

    presentation.go_to(StepId::Chat).unwrap();
    settle(&mut presentation);

    assert_eq!(presentation.active_moment(), None);
    assert!(presentation.surface().active_points().is_empty());
    assert!(times_of(&presentation, |k| matches!(
        k,
        PresentationEventKind::MomentSelected { .. }
    ))
    .is_empty());
}

#[test]
fn test_playback_denial_does_not_block_intro_to_question() {
    // Arrange
    let mut presentation = build(
        Script::default(),
        ScriptedPlayback::denying("autoplay blocked"),
    );
    presentation.begin().unwrap();
    settle(&mut presentation);
    presentation.take_events();

    // Act
    press(&mut presentation, UserInput::Start);
    settle(&mut presentation);

    // Assert
    assert_eq!(presentation.current_step(), Some(StepId::Question));
    assert_eq!(presentation.playback().attempts(), 1);
    assert!(matches!(
        &presentation.uncommitted_events()[0].kind,
        PresentationEventKind::AmbientPlaybackDenied { reason } if reason.contains("autoplay blocked")
    ));
}

#[test]
fn test_inputs_during_transition_are_ignored() {
    let mut presentation = build(Script::default(), ScriptedPlayback::allowing());
    drive_to(&mut presentation, StepId::Reflection);
    press(&mut presentation, UserInput::Choose { option: 0 });

    // Not valid at the envelope either, but absorbed while in flight.
    press(&mut presentation, UserInput::Replay);

    assert_eq!(presentation.in_flight(), Some(StepId::Envelope));
}

#[test]
fn test_input_for_another_step_is_rejected() {
    let mut presentation = build(Script::default(), ScriptedPlayback::allowing());
    drive_to(&mut presentation, StepId::Chat);

    let result = presentation.handle(&Interaction::new(UserInput::SelectMoment { index: 0 }));

    assert!(result.is_err());
    assert_eq!(presentation.current_step(), Some(StepId::Chat));
    assert_eq!(presentation.in_flight(), None);
}
