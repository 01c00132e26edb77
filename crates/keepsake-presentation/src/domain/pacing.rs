//! Presentation pacing: every delay the choreography uses.

use keepsake_core::error::DomainError;
use keepsake_sequencer::{Millis, StaggerTiming};
use serde::{Deserialize, Serialize};

/// All presentation delays, in milliseconds.
///
/// Missing YAML fields fall back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Pacing {
    /// Time a leaving step keeps fading out before it is hidden.
    pub fade_out_ms: Millis,
    /// Time between a transition request and the target step appearing.
    pub enter_delay_ms: Millis,
    /// Time per typed character.
    pub typing_cadence_ms: Millis,
    /// Pause between one intro line finishing and the next one starting.
    pub intro_line_pause_ms: Millis,
    /// Pause between the last intro line and the start affordance.
    pub intro_affordance_delay_ms: Millis,
    /// Delay before the timeline selects its first moment.
    pub timeline_autoselect_ms: Millis,
    /// Delay before the first chat bubble.
    pub chat_base_delay_ms: Millis,
    /// Delay between chat bubbles.
    pub chat_step_delay_ms: Millis,
    /// Pause between the last chat bubble and the continue affordance.
    pub chat_settle_ms: Millis,
    /// Delay between opening the envelope and showing the final message.
    pub envelope_message_delay_ms: Millis,
    /// Delay between the final message and the finish affordance.
    pub envelope_finish_delay_ms: Millis,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            fade_out_ms: 1_000,
            enter_delay_ms: 800,
            typing_cadence_ms: 50,
            intro_line_pause_ms: 1_500,
            intro_affordance_delay_ms: 1_000,
            timeline_autoselect_ms: 500,
            chat_base_delay_ms: 500,
            chat_step_delay_ms: 2_500,
            chat_settle_ms: 1_000,
            envelope_message_delay_ms: 500,
            envelope_finish_delay_ms: 3_000,
        }
    }
}

impl Pacing {
    /// Parses pacing from YAML and validates it.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidConfig` if the YAML is malformed or a
    /// value fails [`Pacing::validate`].
    pub fn from_yaml(source: &str) -> Result<Self, DomainError> {
        let pacing: Self = serde_yaml::from_str(source)
            .map_err(|e| DomainError::InvalidConfig(format!("pacing: {e}")))?;
        pacing.validate()?;
        Ok(pacing)
    }

    /// Checks that the typing cadence and chat stagger are positive.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidConfig` naming the offending value.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.typing_cadence_ms == 0 {
            return Err(DomainError::InvalidConfig(
                "typing_cadence_ms must be positive".to_owned(),
            ));
        }
        self.chat_timing().validate()
    }

    /// Stagger timing of the chat bubbles.
    #[must_use]
    pub fn chat_timing(&self) -> StaggerTiming {
        StaggerTiming {
            base_delay_ms: self.chat_base_delay_ms,
            step_delay_ms: self.chat_step_delay_ms,
            settle_ms: self.chat_settle_ms,
        }
    }

    /// Multiplies every delay by `factor`.
    ///
    /// Cadence and chat step never round down to zero.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidConfig` if `factor` is not a finite,
    /// positive number.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    pub fn scaled(&self, factor: f64) -> Result<Self, DomainError> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(DomainError::InvalidConfig(format!(
                "time scale must be a positive number, got {factor}"
            )));
        }
        let scale = |ms: Millis| (ms as f64 * factor).round() as Millis;
        Ok(Self {
            fade_out_ms: scale(self.fade_out_ms),
            enter_delay_ms: scale(self.enter_delay_ms),
            typing_cadence_ms: scale(self.typing_cadence_ms).max(1),
            intro_line_pause_ms: scale(self.intro_line_pause_ms),
            intro_affordance_delay_ms: scale(self.intro_affordance_delay_ms),
            timeline_autoselect_ms: scale(self.timeline_autoselect_ms),
            chat_base_delay_ms: scale(self.chat_base_delay_ms),
            chat_step_delay_ms: scale(self.chat_step_delay_ms).max(1),
            chat_settle_ms: scale(self.chat_settle_ms),
            envelope_message_delay_ms: scale(self.envelope_message_delay_ms),
            envelope_finish_delay_ms: scale(self.envelope_finish_delay_ms),
        })
    }
}
