//! Query handlers for the presentation context.

use keepsake_core::media::AmbientPlayback;
use keepsake_core::view::{Element, StepId, ViewSurface, Visibility};
use keepsake_sequencer::Millis;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::aggregates::Presentation;

/// Visibility of one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepView {
    /// The step.
    pub step: StepId,
    /// Its visibility.
    pub visibility: Visibility,
    /// How many times it has been activated.
    pub visits: usize,
}

/// Read-only snapshot of a presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresentationView {
    /// The presentation identifier.
    pub presentation_id: Uuid,
    /// The step that is (or was last) active.
    pub current_step: Option<StepId>,
    /// Target of the running transition.
    pub in_flight: Option<StepId>,
    /// Every step, in path order.
    pub steps: Vec<StepView>,
    /// Selected timeline moment.
    pub active_moment: Option<usize>,
    /// Whether the envelope has been opened.
    pub envelope_opened: bool,
    /// Revealed elements.
    pub revealed: Vec<Element>,
    /// Presentation time.
    pub now_ms: Millis,
    /// Effects still waiting to fire.
    pub pending_timers: usize,
    /// Committed event count.
    pub version: i64,
}

/// Builds the view of a presentation.
#[must_use]
pub fn get_view<V, P>(presentation: &Presentation<V, P>) -> PresentationView
where
    V: ViewSurface,
    P: AmbientPlayback,
{
    PresentationView {
        presentation_id: presentation.id,
        current_step: presentation.current_step(),
        in_flight: presentation.in_flight(),
        steps: StepId::ALL
            .iter()
            .map(|&step| StepView {
                step,
                visibility: presentation.visibility(step),
                visits: presentation.visits(step),
            })
            .collect(),
        active_moment: presentation.active_moment(),
        envelope_opened: presentation.is_envelope_opened(),
        revealed: presentation.revealed().collect(),
        now_ms: presentation.now(),
        pending_timers: presentation.pending_timers(),
        version: presentation.version(),
    }
}
