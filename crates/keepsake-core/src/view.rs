//! View surface port and the vocabulary it is addressed with.
//!
//! The engine never touches rendering primitives. Every visual change goes
//! through [`ViewSurface`], keyed by the step, region or element it affects.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// One screen of the linear presentation, in path order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    /// Typed opening lines.
    Intro,
    /// First binary choice.
    Question,
    /// Clickable moments.
    Timeline,
    /// Staggered chat bubbles.
    Chat,
    /// Second binary choice.
    Reflection,
    /// One-shot envelope reveal.
    Envelope,
    /// Replay or freeze.
    Ending,
}

impl StepId {
    /// Every step, in path order.
    pub const ALL: [Self; 7] = [
        Self::Intro,
        Self::Question,
        Self::Timeline,
        Self::Chat,
        Self::Reflection,
        Self::Envelope,
        Self::Ending,
    ];

    /// Zero-based position on the path.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// The step every transition out of `self` leads to.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        Self::ALL.get(self.index() + 1).copied()
    }

    /// Whether the step is a choice junction.
    #[must_use]
    pub fn is_choice(self) -> bool {
        matches!(self, Self::Question | Self::Reflection)
    }

    /// Stable lowercase name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Intro => "intro",
            Self::Question => "question",
            Self::Timeline => "timeline",
            Self::Chat => "chat",
            Self::Reflection => "reflection",
            Self::Envelope => "envelope",
            Self::Ending => "ending",
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StepId {
    type Err = DomainError;

    /// Accepts either the step name (`timeline`) or its one-based
    /// positional form (`step-3`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(step) = Self::ALL.iter().find(|step| step.name().eq_ignore_ascii_case(s)) {
            return Ok(*step);
        }
        s.strip_prefix("step-")
            .and_then(|n| n.parse::<usize>().ok())
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or_else(|| DomainError::InvalidStep(format!("unknown step '{s}'")))
    }
}

/// Visibility state of a step's view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Not displayed at all.
    #[default]
    Hidden,
    /// Displayed, fading in, not yet active.
    Entering,
    /// Displayed and interactive.
    Active,
    /// Displayed, no longer active, fading out.
    Leaving,
}

impl Visibility {
    /// Whether the view is displayed in any form.
    #[must_use]
    pub fn is_visible(self) -> bool {
        !matches!(self, Self::Hidden)
    }
}

/// A content region that receives text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    /// The n-th typed intro line.
    IntroLine(usize),
    /// The chat bubble container.
    ChatLog,
    /// The message revealed by the envelope.
    FinalMessage,
}

/// A view element that is revealed or concealed as a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    /// The n-th intro line container.
    IntroLine(usize),
    /// "Start" affordance at the end of the intro.
    StartButton,
    /// Caption and image of the selected moment.
    MomentDisplay,
    /// "Continue" affordance of the timeline.
    TimelineContinue,
    /// "Continue" affordance of the chat.
    ChatContinue,
    /// The closed envelope.
    Envelope,
    /// The message inside the envelope.
    FinalMessage,
    /// "Finish" affordance after the final message.
    FinishButton,
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IntroLine(n) => write!(f, "intro line {}", n + 1),
            Self::StartButton => f.write_str("start"),
            Self::MomentDisplay => f.write_str("moment display"),
            Self::TimelineContinue | Self::ChatContinue => f.write_str("continue"),
            Self::Envelope => f.write_str("envelope"),
            Self::FinalMessage => f.write_str("final message"),
            Self::FinishButton => f.write_str("finish"),
        }
    }
}

/// Rendering collaborator driven by the presentation engine.
///
/// Implementations decide how things look; the engine only decides when.
pub trait ViewSurface {
    /// Makes the step's view displayed (still inactive).
    fn show(&mut self, step: StepId);

    /// Removes the step's view from display.
    fn hide(&mut self, step: StepId);

    /// Toggles the step's active (fully faded-in, interactive) state.
    fn set_active(&mut self, step: StepId, active: bool);

    /// Forces pending style changes to apply so the next change animates.
    fn flush_layout(&mut self, step: StepId);

    /// Replaces the text shown in `region`.
    fn write_text(&mut self, region: Region, text: &str);

    /// Makes an element visible.
    fn reveal(&mut self, element: Element);

    /// Hides an element.
    fn conceal(&mut self, element: Element);

    /// Shows the prompt and option labels of a choice step.
    fn present_options(&mut self, step: StepId, prompt: &str, options: &[String]);

    /// Replaces all timeline points with `count` fresh, inactive ones.
    fn render_points(&mut self, count: usize);

    /// Marks one timeline point active or inactive.
    fn set_point_active(&mut self, index: usize, active: bool);

    /// Shows a moment's caption and image, restarting its fade-in.
    fn display_moment(&mut self, caption: &str, image: &str);

    /// Removes every chat bubble.
    fn clear_bubbles(&mut self);

    /// Appends one chat bubble.
    fn append_bubble(&mut self, text: &str);

    /// Starts the envelope's collapse-and-fade animation.
    fn collapse_envelope(&mut self);

    /// Shows an informative message that changes no state.
    fn acknowledge(&mut self, message: &str);

    /// Returns every region to its initial, empty state.
    fn reset(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_parses_from_name_and_position() {
        assert_eq!("timeline".parse::<StepId>(), Ok(StepId::Timeline));
        assert_eq!("Chat".parse::<StepId>(), Ok(StepId::Chat));
        assert_eq!("step-1".parse::<StepId>(), Ok(StepId::Intro));
        assert_eq!("step-7".parse::<StepId>(), Ok(StepId::Ending));
    }

    #[test]
    fn test_unknown_step_is_invalid_step() {
        for input in ["step-0", "step-8", "epilogue", ""] {
            let result = input.parse::<StepId>();
            assert!(
                matches!(result, Err(DomainError::InvalidStep(_))),
                "expected InvalidStep for {input:?}, got {result:?}"
            );
        }
    }

    #[test]
    fn test_path_is_linear_and_ends_at_ending() {
        let mut step = StepId::Intro;
        let mut visited = vec![step];
        while let Some(next) = step.next() {
            assert_eq!(next.index(), step.index() + 1);
            visited.push(next);
            step = next;
        }
        assert_eq!(visited, StepId::ALL);
        assert_eq!(step, StepId::Ending);
    }

    #[test]
    fn test_only_question_and_reflection_are_choices() {
        let choices: Vec<StepId> = StepId::ALL.into_iter().filter(|s| s.is_choice()).collect();
        assert_eq!(choices, vec![StepId::Question, StepId::Reflection]);
    }
}
