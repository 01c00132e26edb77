//! User inputs accepted by the presentation.

use keepsake_core::command::Command;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A discrete user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserInput {
    /// Press "start" at the end of the intro.
    Start,
    /// Pick an option at a choice step.
    Choose {
        /// Zero-based option index.
        option: usize,
    },
    /// Click a timeline point.
    SelectMoment {
        /// Zero-based moment index.
        index: usize,
    },
    /// Press "continue" on the timeline or the chat.
    Continue,
    /// Click the envelope.
    OpenEnvelope,
    /// Press "finish" after the final message.
    Finish,
    /// Start over from the first step.
    Replay,
    /// Keep the ending on screen.
    Freeze,
}

impl UserInput {
    /// Stable snake-case name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Choose { .. } => "choose",
            Self::SelectMoment { .. } => "select_moment",
            Self::Continue => "continue",
            Self::OpenEnvelope => "open_envelope",
            Self::Finish => "finish",
            Self::Replay => "replay",
            Self::Freeze => "freeze",
        }
    }
}

/// A user input tagged for tracing.
#[derive(Debug, Clone)]
pub struct Interaction {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// What the user did.
    pub input: UserInput,
}

impl Interaction {
    /// Wraps an input with a fresh correlation ID.
    #[must_use]
    pub fn new(input: UserInput) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            input,
        }
    }
}

impl Command for Interaction {
    fn command_type(&self) -> &'static str {
        self.input.name()
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
