//! Append-only world event ledger.
//!
//! Every attempted action and every orchestrator milestone produces one
//! immutable [`WorldEvent`]. The log is the sole history and audit trail:
//! external analytics read it, nothing ever rewrites it. Appending is the
//! only mutation; reads hand out shared references.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vivarium_types::{EntityId, EventId, EventResult, Position, RejectReason};

/// One immutable ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldEvent {
    /// Stable identifier, time-ordered.
    pub id: EventId,
    /// The tick the event belongs to.
    pub tick: u64,
    /// The acting entity, when one exists (system events have none).
    pub actor_id: Option<EntityId>,
    /// Broad category (`"action"`, `"conflict"`, `"lifecycle"`, ...).
    pub event_type: String,
    /// The action name (an action kind, or a milestone name).
    pub action: String,
    /// The proposal parameters or milestone payload, as JSON.
    pub params: serde_json::Value,
    /// Accepted or rejected.
    pub result: EventResult,
    /// Rejection reason code, when rejected.
    pub reason: Option<RejectReason>,
    /// Where the event happened, when known.
    pub position: Option<Position>,
    /// Importance weight for downstream consumers.
    pub importance: f64,
    /// Wall-clock time the entry was appended.
    pub created_at: DateTime<Utc>,
}

/// A draft event, everything but the id and timestamp.
///
/// [`EventLog::append`] stamps the rest; callers never construct ids or
/// timestamps themselves.
#[derive(Debug, Clone)]
pub struct EventDraft {
    /// The tick the event belongs to.
    pub tick: u64,
    /// The acting entity, when one exists.
    pub actor_id: Option<EntityId>,
    /// Broad category.
    pub event_type: String,
    /// The action name.
    pub action: String,
    /// Parameters or payload.
    pub params: serde_json::Value,
    /// Accepted or rejected.
    pub result: EventResult,
    /// Rejection reason code.
    pub reason: Option<RejectReason>,
    /// Position, when known.
    pub position: Option<Position>,
    /// Importance weight.
    pub importance: f64,
}

/// The append-only event log.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<WorldEvent>,
}

impl EventLog {
    /// An empty log.
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Append one event, stamping its id and timestamp. The only
    /// mutation the log supports.
    pub fn append(&mut self, draft: EventDraft) -> EventId {
        let id = EventId::new();
        self.events.push(WorldEvent {
            id,
            tick: draft.tick,
            actor_id: draft.actor_id,
            event_type: draft.event_type,
            action: draft.action,
            params: draft.params,
            result: draft.result,
            reason: draft.reason,
            position: draft.position,
            importance: draft.importance,
            created_at: Utc::now(),
        });
        id
    }

    /// All events in append order.
    pub fn all(&self) -> &[WorldEvent] {
        &self.events
    }

    /// Events at or after the given tick, in append order.
    pub fn since_tick(&self, tick: u64) -> impl Iterator<Item = &WorldEvent> {
        self.events.iter().filter(move |e| e.tick >= tick)
    }

    /// Events for a specific actor, in append order.
    pub fn for_actor(&self, actor: EntityId) -> impl Iterator<Item = &WorldEvent> {
        self.events
            .iter()
            .filter(move |e| e.actor_id == Some(actor))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn draft(tick: u64, actor: Option<EntityId>, result: EventResult) -> EventDraft {
        EventDraft {
            tick,
            actor_id: actor,
            event_type: String::from("action"),
            action: String::from("speak"),
            params: serde_json::json!({"text": "hi"}),
            result,
            reason: None,
            position: None,
            importance: 0.5,
        }
    }

    #[test]
    fn append_preserves_order_and_stamps_ids() {
        let mut log = EventLog::new();
        let a = log.append(draft(1, None, EventResult::Accepted));
        let b = log.append(draft(2, None, EventResult::Rejected));
        assert_ne!(a, b);

        let all = log.all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].tick, 1);
        assert_eq!(all[1].tick, 2);
    }

    #[test]
    fn since_tick_filters() {
        let mut log = EventLog::new();
        for tick in 0..10 {
            log.append(draft(tick, None, EventResult::Accepted));
        }
        assert_eq!(log.since_tick(7).count(), 3);
    }

    #[test]
    fn for_actor_filters() {
        let actor = EntityId::new();
        let other = EntityId::new();
        let mut log = EventLog::new();
        log.append(draft(1, Some(actor), EventResult::Accepted));
        log.append(draft(1, Some(other), EventResult::Accepted));
        log.append(draft(2, Some(actor), EventResult::Rejected));
        log.append(draft(2, None, EventResult::Accepted));

        assert_eq!(log.for_actor(actor).count(), 2);
    }
}
