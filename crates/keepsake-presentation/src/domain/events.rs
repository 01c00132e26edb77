//! Domain events of the presentation journal.

use keepsake_core::event::{DomainEvent, EventMetadata};
use keepsake_core::view::{Element, StepId};
use serde::{Deserialize, Serialize};

/// Event payload variants of the presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentationEventKind {
    /// A step's view became displayed.
    StepShown {
        /// The step.
        step: StepId,
    },
    /// A step became active and its initializer ran.
    StepActivated {
        /// The step.
        step: StepId,
    },
    /// A step stopped being active and started fading out.
    StepDeactivated {
        /// The step.
        step: StepId,
    },
    /// A step's view was removed after its fade-out.
    StepHidden {
        /// The step.
        step: StepId,
    },
    /// An intro line finished typing.
    IntroLineTyped {
        /// Zero-based line index.
        line: usize,
    },
    /// The user picked an option at a choice step.
    OptionChosen {
        /// The choice step.
        step: StepId,
        /// Zero-based option index.
        option: usize,
    },
    /// A timeline moment became the active one.
    MomentSelected {
        /// Zero-based moment index.
        index: usize,
    },
    /// A chat bubble appeared.
    ChatBubbleRendered {
        /// Zero-based message index.
        index: usize,
    },
    /// An element or affordance became visible.
    ElementRevealed {
        /// The element.
        element: Element,
    },
    /// The envelope was opened.
    EnvelopeOpened,
    /// The final message appeared.
    FinalMessageRevealed,
    /// Ambient playback started.
    AmbientPlaybackStarted,
    /// The host refused ambient playback; the presentation went on.
    AmbientPlaybackDenied {
        /// Reason reported by the host.
        reason: String,
    },
    /// The user chose to freeze the ending.
    Frozen,
    /// The presentation restarted from the first step.
    Replayed,
}

impl PresentationEventKind {
    /// Event type name used in metadata and logs.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::StepShown { .. } => "presentation.step_shown",
            Self::StepActivated { .. } => "presentation.step_activated",
            Self::StepDeactivated { .. } => "presentation.step_deactivated",
            Self::StepHidden { .. } => "presentation.step_hidden",
            Self::IntroLineTyped { .. } => "presentation.intro_line_typed",
            Self::OptionChosen { .. } => "presentation.option_chosen",
            Self::MomentSelected { .. } => "presentation.moment_selected",
            Self::ChatBubbleRendered { .. } => "presentation.chat_bubble_rendered",
            Self::ElementRevealed { .. } => "presentation.element_revealed",
            Self::EnvelopeOpened => "presentation.envelope_opened",
            Self::FinalMessageRevealed => "presentation.final_message_revealed",
            Self::AmbientPlaybackStarted => "presentation.ambient_playback_started",
            Self::AmbientPlaybackDenied { .. } => "presentation.ambient_playback_denied",
            Self::Frozen => "presentation.frozen",
            Self::Replayed => "presentation.replayed",
        }
    }
}

/// Domain event envelope of the presentation.
#[derive(Debug, Clone, PartialEq)]
pub struct PresentationEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: PresentationEventKind,
}

impl DomainEvent for PresentationEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind)
            .expect("PresentationEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
