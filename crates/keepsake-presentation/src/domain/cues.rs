//! Effects the presentation schedules on its sequencer.

use keepsake_core::view::{Element, Region, StepId};
use keepsake_sequencer::{RevealTick, TypingTick};

/// A deferred presentation effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// Finish a step's fade-out.
    HideStep(StepId),
    /// Show, activate and initialize a step.
    EnterStep(StepId),
    /// Advance a typing session.
    Typing(TypingTick<Region>),
    /// Advance a staggered reveal.
    Reveal(RevealTick<Region>),
    /// An intro line finished typing.
    IntroLineTyped(usize),
    /// Start typing an intro line.
    StartIntroLine(usize),
    /// Reveal an element.
    RevealElement(Element),
    /// Select a timeline moment.
    SelectMoment(usize),
    /// Swap the envelope for the final message.
    ShowFinalMessage,
}

impl From<TypingTick<Region>> for Cue {
    fn from(tick: TypingTick<Region>) -> Self {
        Self::Typing(tick)
    }
}

impl From<RevealTick<Region>> for Cue {
    fn from(tick: RevealTick<Region>) -> Self {
        Self::Reveal(tick)
    }
}
