//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`RosterEvent`]s. It is
//! shared via `Arc<EventBus>` between the engine (publisher) and the audit
//! persistence service and front ends (subscribers).

use gsbot_core::types::{DbId, Snowflake, Timestamp};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// RosterEvent
// ---------------------------------------------------------------------------

/// Something that happened to the roster of one group.
///
/// Constructed via [`RosterEvent::new`] and enriched with
/// [`with_target`](RosterEvent::with_target) and
/// [`with_payload`](RosterEvent::with_payload).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEvent {
    /// Dot-separated event name, see `gsbot_core::audit::action_types`.
    pub event_type: String,

    pub group_id: Snowflake,

    /// The member who caused the event.
    pub actor_id: Snowflake,

    /// Operation name, e.g. `"set_dp"` or `"delete_all"`.
    pub operation: String,

    /// Display name of the affected character, if a single one.
    pub target_name: Option<String>,

    pub character_id: Option<DbId>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the operation took effect (the request's `now`).
    pub timestamp: Timestamp,
}

impl RosterEvent {
    /// Create an event with no target and an empty payload.
    pub fn new(
        event_type: impl Into<String>,
        group_id: Snowflake,
        actor_id: Snowflake,
        operation: impl Into<String>,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            event_type: event_type.into(),
            group_id,
            actor_id,
            operation: operation.into(),
            target_name: None,
            character_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp,
        }
    }

    /// Attach the affected character.
    pub fn with_target(mut self, display_name: impl Into<String>, character_id: DbId) -> Self {
        self.target_name = Some(display_name.into());
        self.character_id = Some(character_id);
        self
    }

    /// Set the JSON payload for the event.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus.
///
/// ```rust
/// use chrono::Utc;
/// use gsbot_events::bus::{EventBus, RosterEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(RosterEvent::new("character.updated", 1, 2, "set_ap", Utc::now()));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<RosterEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With no subscribers the event is dropped; the audit persistence
    /// service subscribes at startup to capture every entry.
    pub fn publish(&self, event: RosterEvent) {
        // Ignore the SendError, it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<RosterEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
