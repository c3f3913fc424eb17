//! Directional relationships between entities.
//!
//! A relationship is created lazily on the first event between an ordered
//! pair and never deleted. Seven named axes carry individual ranges --
//! `trust` spans [-100,100], the rest [0,100]. Updates go through named
//! event rules: each rule is a fixed per-axis delta multiplied by a
//! caller-supplied magnitude, and every axis is clamped to its range after
//! each update. A periodic decay sweep multiplies a subset of axes toward
//! zero; axes configured with a decay rate >= 1 never decay.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use vivarium_types::EntityId;

/// Number of relationship axes.
pub const AXIS_COUNT: usize = 7;

/// The named relationship axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipAxis {
    /// Confidence in the other's intentions; the only signed axis.
    Trust,
    /// Warmth toward the other.
    Affection,
    /// Regard for the other's competence.
    Respect,
    /// How well this entity knows the other.
    Familiarity,
    /// Active resentment.
    Anger,
    /// Competitive antagonism.
    Rivalry,
    /// Felt debt for past help.
    Gratitude,
}

impl RelationshipAxis {
    /// All axes in declaration order.
    pub const ALL: [Self; AXIS_COUNT] = [
        Self::Trust,
        Self::Affection,
        Self::Respect,
        Self::Familiarity,
        Self::Anger,
        Self::Rivalry,
        Self::Gratitude,
    ];

    /// The axis's index into the backing array.
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|a| *a == self).unwrap_or(0)
    }

    /// The inclusive `(min, max)` range of the axis.
    pub const fn range(self) -> (f64, f64) {
        match self {
            Self::Trust => (-100.0, 100.0),
            _ => (0.0, 100.0),
        }
    }

    /// Multiplicative decay rate applied by the periodic sweep.
    ///
    /// Values below 1 shrink the axis toward zero each sweep; a rate of
    /// 1 or above means the axis never decays.
    pub const fn decay_rate(self) -> f64 {
        match self {
            Self::Anger => 0.92,
            Self::Rivalry => 0.96,
            Self::Familiarity => 0.995,
            // Durable axes: trust, affection, respect, gratitude.
            _ => 1.0,
        }
    }
}

/// Named relationship event rules.
///
/// Each rule carries a fixed per-axis delta table; the applied change is
/// `delta x magnitude`, clamped to the axis range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipEvent {
    /// The other entity helped this one.
    Helped,
    /// The other entity gave a gift.
    Gift,
    /// A friendly conversation.
    Conversation,
    /// The other entity insulted this one.
    Insult,
    /// The other entity attacked this one.
    Attack,
    /// The other entity broke a trust.
    Betrayal,
    /// The other entity defended this one.
    Defended,
    /// A completed trade.
    Trade,
    /// A victory shared as allies.
    SharedVictory,
    /// This entity lost a contest to the other.
    RivalryLoss,
}

impl RelationshipEvent {
    /// The per-axis deltas for this rule, in axis declaration order:
    /// trust, affection, respect, familiarity, anger, rivalry, gratitude.
    pub const fn deltas(self) -> [f64; AXIS_COUNT] {
        match self {
            Self::Helped => [6.0, 4.0, 2.0, 3.0, -2.0, 0.0, 8.0],
            Self::Gift => [4.0, 6.0, 0.0, 2.0, -1.0, 0.0, 6.0],
            Self::Conversation => [1.0, 2.0, 1.0, 4.0, 0.0, 0.0, 0.0],
            Self::Insult => [-4.0, -3.0, -2.0, 2.0, 8.0, 3.0, 0.0],
            Self::Attack => [-12.0, -8.0, 0.0, 3.0, 15.0, 8.0, -5.0],
            Self::Betrayal => [-20.0, -10.0, -5.0, 2.0, 12.0, 5.0, -10.0],
            Self::Defended => [8.0, 5.0, 6.0, 3.0, -3.0, 0.0, 10.0],
            Self::Trade => [3.0, 1.0, 2.0, 3.0, 0.0, 0.0, 1.0],
            Self::SharedVictory => [5.0, 4.0, 5.0, 4.0, -2.0, -3.0, 2.0],
            Self::RivalryLoss => [-2.0, -1.0, 4.0, 3.0, 4.0, 10.0, 0.0],
        }
    }
}

/// One directional relationship record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    values: [f64; AXIS_COUNT],
    /// Tick of the most recent event between the pair.
    pub last_event_tick: u64,
    /// Total number of events applied.
    pub event_count: u64,
}

impl Default for Relationship {
    fn default() -> Self {
        Self::new()
    }
}

impl Relationship {
    /// A fresh relationship with every axis at zero.
    pub const fn new() -> Self {
        Self {
            values: [0.0; AXIS_COUNT],
            last_event_tick: 0,
            event_count: 0,
        }
    }

    /// Read a single axis value.
    pub fn get(&self, axis: RelationshipAxis) -> f64 {
        self.values.get(axis.index()).copied().unwrap_or(0.0)
    }

    /// Set a single axis value, clamped to its range. Test and scenario
    /// helper; gameplay updates go through [`apply_event`](Self::apply_event).
    pub fn set(&mut self, axis: RelationshipAxis, value: f64) {
        let (lo, hi) = axis.range();
        if let Some(slot) = self.values.get_mut(axis.index()) {
            *slot = value.clamp(lo, hi);
        }
    }

    /// Apply a named event rule scaled by `magnitude`, clamping every axis
    /// to its declared range afterwards.
    pub fn apply_event(&mut self, event: RelationshipEvent, magnitude: f64, tick: u64) {
        let deltas = event.deltas();
        for axis in RelationshipAxis::ALL {
            let idx = axis.index();
            let delta = deltas.get(idx).copied().unwrap_or(0.0);
            let (lo, hi) = axis.range();
            if let Some(slot) = self.values.get_mut(idx) {
                *slot = (*slot + delta * magnitude).clamp(lo, hi);
            }
        }
        self.last_event_tick = tick;
        self.event_count = self.event_count.saturating_add(1);
    }

    /// Run one decay sweep: multiply each decaying axis toward zero.
    pub fn decay(&mut self) {
        for axis in RelationshipAxis::ALL {
            let rate = axis.decay_rate();
            if rate >= 1.0 {
                continue;
            }
            if let Some(slot) = self.values.get_mut(axis.index()) {
                *slot *= rate;
            }
        }
    }
}

/// All directional relationships in the world, keyed `(from, to)`.
///
/// Records are created lazily on first access and never deleted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationshipStore {
    relationships: BTreeMap<(EntityId, EntityId), Relationship>,
}

impl RelationshipStore {
    /// An empty store.
    pub const fn new() -> Self {
        Self {
            relationships: BTreeMap::new(),
        }
    }

    /// Read the relationship from `from` toward `to`, if one exists.
    pub fn get(&self, from: EntityId, to: EntityId) -> Option<&Relationship> {
        self.relationships.get(&(from, to))
    }

    /// Get or lazily create the relationship from `from` toward `to`.
    pub fn get_or_create(&mut self, from: EntityId, to: EntityId) -> &mut Relationship {
        self.relationships.entry((from, to)).or_default()
    }

    /// Apply an event rule to the directional record `(from, to)`.
    pub fn apply_event(
        &mut self,
        from: EntityId,
        to: EntityId,
        event: RelationshipEvent,
        magnitude: f64,
        tick: u64,
    ) {
        self.get_or_create(from, to).apply_event(event, magnitude, tick);
    }

    /// Run the decay sweep over every record.
    pub fn decay_all(&mut self) {
        for rel in self.relationships.values_mut() {
            rel.decay();
        }
    }

    /// Number of directional records.
    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::Rng;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn axes_stay_in_range_under_random_interleaving() {
        let events = [
            RelationshipEvent::Helped,
            RelationshipEvent::Gift,
            RelationshipEvent::Conversation,
            RelationshipEvent::Insult,
            RelationshipEvent::Attack,
            RelationshipEvent::Betrayal,
            RelationshipEvent::Defended,
            RelationshipEvent::Trade,
            RelationshipEvent::SharedVictory,
            RelationshipEvent::RivalryLoss,
        ];
        let mut rng = StdRng::seed_from_u64(77);
        let mut rel = Relationship::new();

        for tick in 0..2000 {
            if rng.random_bool(0.8) {
                let event = events[rng.random_range(0..events.len())];
                let magnitude = rng.random_range(0.0..5.0);
                rel.apply_event(event, magnitude, tick);
            } else {
                rel.decay();
            }
            for axis in RelationshipAxis::ALL {
                let (lo, hi) = axis.range();
                let v = rel.get(axis);
                assert!(v >= lo && v <= hi, "{axis:?} = {v} outside [{lo}, {hi}]");
            }
        }
    }

    #[test]
    fn trust_can_go_negative_others_cannot() {
        let mut rel = Relationship::new();
        for _ in 0..20 {
            rel.apply_event(RelationshipEvent::Betrayal, 2.0, 1);
        }
        assert!(rel.get(RelationshipAxis::Trust) < 0.0);
        assert!(rel.get(RelationshipAxis::Affection) >= 0.0);
        assert!(rel.get(RelationshipAxis::Gratitude) >= 0.0);
    }

    #[test]
    fn durable_axes_never_decay() {
        let mut rel = Relationship::new();
        rel.apply_event(RelationshipEvent::Helped, 5.0, 1);
        let trust_before = rel.get(RelationshipAxis::Trust);
        let gratitude_before = rel.get(RelationshipAxis::Gratitude);

        for _ in 0..100 {
            rel.decay();
        }
        assert!((rel.get(RelationshipAxis::Trust) - trust_before).abs() < 1e-9);
        assert!((rel.get(RelationshipAxis::Gratitude) - gratitude_before).abs() < 1e-9);
    }

    #[test]
    fn anger_decays_toward_zero() {
        let mut rel = Relationship::new();
        rel.apply_event(RelationshipEvent::Attack, 3.0, 1);
        let initial = rel.get(RelationshipAxis::Anger);
        assert!(initial > 0.0);

        for _ in 0..200 {
            rel.decay();
        }
        assert!(rel.get(RelationshipAxis::Anger) < 0.1);
    }

    #[test]
    fn store_creates_lazily_and_is_directional() {
        let a = EntityId::new();
        let b = EntityId::new();
        let mut store = RelationshipStore::new();
        assert!(store.get(a, b).is_none());

        store.apply_event(a, b, RelationshipEvent::Gift, 1.0, 5);
        assert!(store.get(a, b).is_some());
        assert!(store.get(b, a).is_none());
        assert_eq!(store.len(), 1);
    }
}
