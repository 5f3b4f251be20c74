use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope for an event, containing stream metadata.
///
/// Notes:
/// - `sequence_number` is the position of the mutation that produced the event
///   and is monotonically increasing per store.
/// - `recorded_at` is wall-clock time on the client; it is informational only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,

    /// Monotonically increasing position in the store's mutation stream.
    sequence_number: u64,

    recorded_at: DateTime<Utc>,

    payload: E,
}

impl<E> EventEnvelope<E> {
    /// Wrap a freshly decided event. Uses a UUIDv7 (time-ordered) event id.
    pub fn new(sequence_number: u64, payload: E) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            sequence_number,
            recorded_at: Utc::now(),
            payload,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }
}
