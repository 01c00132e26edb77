//! Command handlers for the presentation context.
//!
//! Each handler drives the aggregate and hands back the events the call
//! produced, committing them to the aggregate's version.

use keepsake_core::command::Command;
use keepsake_core::error::DomainError;
use keepsake_core::media::AmbientPlayback;
use keepsake_core::view::ViewSurface;
use keepsake_sequencer::Millis;
use tracing::debug;

use crate::domain::aggregates::Presentation;
use crate::domain::commands::Interaction;
use crate::domain::events::PresentationEvent;

/// Handles a user interaction and returns the resulting events.
///
/// # Errors
///
/// Returns `DomainError::InvalidInput` if the input is not accepted in the
/// current state. Events recorded before the failure stay uncommitted.
pub fn handle_interaction<V, P>(
    presentation: &mut Presentation<V, P>,
    interaction: &Interaction,
) -> Result<Vec<PresentationEvent>, DomainError>
where
    V: ViewSurface,
    P: AmbientPlayback,
{
    debug!(
        command = interaction.command_type(),
        correlation_id = %interaction.correlation_id(),
        "handling interaction"
    );
    presentation.handle(interaction)?;
    Ok(presentation.take_events())
}

/// Advances presentation time to `until` and returns the resulting events.
///
/// # Errors
///
/// Propagates a `DomainError` raised by a scheduled effect.
pub fn advance_clock<V, P>(
    presentation: &mut Presentation<V, P>,
    until: Millis,
) -> Result<Vec<PresentationEvent>, DomainError>
where
    V: ViewSurface,
    P: AmbientPlayback,
{
    presentation.advance_to(until)?;
    Ok(presentation.take_events())
}
