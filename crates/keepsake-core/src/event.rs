//! Domain event abstractions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata attached to every domain event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// Type name for routing and display.
    pub event_type: String,
    /// Presentation this event belongs to.
    pub aggregate_id: Uuid,
    /// Monotonically increasing position within the presentation journal.
    pub sequence_number: i64,
    /// Correlation ID of the user input whose consequences this event is.
    pub correlation_id: Uuid,
    /// Causation ID linking this event to the input or timer that caused it.
    pub causation_id: Uuid,
    /// Wall-clock timestamp of event creation.
    pub occurred_at: DateTime<Utc>,
    /// Presentation time (virtual milliseconds) at which the event happened.
    pub at_ms: u64,
}

/// Trait that all domain events implement.
pub trait DomainEvent: Send + Sync + std::fmt::Debug {
    /// Returns the event type name (used for serialization routing).
    fn event_type(&self) -> &'static str;

    /// Serializes the event payload to JSON.
    fn to_payload(&self) -> serde_json::Value;

    /// Returns the metadata for this event.
    fn metadata(&self) -> &EventMetadata;
}
