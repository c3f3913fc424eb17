//! The entity record and its versioned mutable state.
//!
//! An [`Entity`] pairs immutable identity (id, personality snapshot, birth
//! tick) with an explicitly versioned mutable [`EntityState`]. The state is
//! a small set of typed sub-records -- needs, emotional state, inventory,
//! behavior flags -- rather than a free-form bag, and carries a version
//! number so shape changes migrate explicitly.
//!
//! Entities are never hard-deleted: death clears the alive flag and stamps
//! `death_tick`, preserving the full history.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use vivarium_types::{BehaviorMode, EntityClass, EntityId, Facing, Position};

use crate::error::EntityError;
use crate::memory::MemoryStore;
use crate::needs::Needs;
use crate::personality::Personality;

/// Current shape version of [`EntityState`].
pub const STATE_VERSION: u32 = 2;

/// Emotional state as a valence/arousal pair, both in [-1,1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionalState {
    /// Pleasantness: -1 (distressed) to 1 (content).
    pub valence: f64,
    /// Activation: -1 (lethargic) to 1 (agitated).
    pub arousal: f64,
}

impl Default for EmotionalState {
    fn default() -> Self {
        Self {
            valence: 0.0,
            arousal: 0.0,
        }
    }
}

impl EmotionalState {
    /// Shift both components by deltas, clamping into [-1,1].
    pub fn shift(&mut self, dvalence: f64, darousal: f64) {
        self.valence = (self.valence + dvalence).clamp(-1.0, 1.0);
        self.arousal = (self.arousal + darousal).clamp(-1.0, 1.0);
    }

    /// Relax both components toward neutral by the given factor in [0,1].
    pub fn settle(&mut self, factor: f64) {
        let keep = 1.0 - factor.clamp(0.0, 1.0);
        self.valence *= keep;
        self.arousal *= keep;
    }
}

/// Items carried by an entity, keyed by item name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    items: BTreeMap<String, u32>,
}

impl Inventory {
    /// An empty inventory.
    pub const fn new() -> Self {
        Self {
            items: BTreeMap::new(),
        }
    }

    /// Quantity held of the given item.
    pub fn count(&self, item: &str) -> u32 {
        self.items.get(item).copied().unwrap_or(0)
    }

    /// Add `quantity` of `item`.
    pub fn add(&mut self, item: impl Into<String>, quantity: u32) {
        let entry = self.items.entry(item.into()).or_insert(0);
        *entry = entry.saturating_add(quantity);
    }

    /// Remove up to `quantity` of `item`; returns how many were removed.
    pub fn remove(&mut self, item: &str, quantity: u32) -> u32 {
        match self.items.get_mut(item) {
            Some(held) => {
                let taken = quantity.min(*held);
                *held -= taken;
                if *held == 0 {
                    self.items.remove(item);
                }
                taken
            }
            None => 0,
        }
    }

    /// All held items.
    pub const fn items(&self) -> &BTreeMap<String, u32> {
        &self.items
    }
}

/// Behavior-related flags on an entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviorFlags {
    /// Mode derived from evolution pressure; refreshed by the engine.
    pub mode: BehaviorMode,
    /// Tick of this entity's most recent conflict, if any.
    pub last_conflict_tick: Option<u64>,
}

/// The versioned mutable state of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    /// Shape version; see [`STATE_VERSION`].
    pub version: u32,
    /// The 8-axis needs record.
    pub needs: Needs,
    /// Valence/arousal emotional state.
    pub emotion: EmotionalState,
    /// Carried items.
    pub inventory: Inventory,
    /// Behavior mode and conflict bookkeeping.
    pub behavior: BehaviorFlags,
    /// Episodic and semantic memory.
    pub memory: MemoryStore,
}

impl Default for EntityState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            needs: Needs::new(),
            emotion: EmotionalState::default(),
            inventory: Inventory::new(),
            behavior: BehaviorFlags::default(),
            memory: MemoryStore::new(),
        }
    }
}

impl EntityState {
    /// Migrate a state record from an earlier shape version to
    /// [`STATE_VERSION`].
    ///
    /// Version 1 predates [`BehaviorFlags::last_conflict_tick`]; serde
    /// defaults already fill the field, so migration only stamps the
    /// version. Unknown future versions are an error.
    pub fn migrate(mut self) -> Result<Self, EntityError> {
        match self.version {
            1 | STATE_VERSION => {
                self.version = STATE_VERSION;
                Ok(self)
            }
            found => Err(EntityError::UnsupportedStateVersion {
                found,
                supported: STATE_VERSION,
            }),
        }
    }
}

/// One inhabitant of the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Stable identifier.
    pub id: EntityId,
    /// Display name; used for conflict-narration winner parsing.
    pub name: String,
    /// Continuous position in world space.
    pub position: Position,
    /// Viewing direction.
    pub facing: Facing,
    /// Immutable personality snapshot.
    pub personality: Personality,
    /// Broad entity class.
    pub class: EntityClass,
    /// Versioned mutable state.
    pub state: EntityState,
    /// Whether the entity is alive.
    pub alive: bool,
    /// Tick the entity entered the world.
    pub birth_tick: u64,
    /// Tick the entity died, if it has.
    pub death_tick: Option<u64>,
    /// Opaque owner reference for human-controlled entities.
    pub owner: Option<String>,
}

impl Entity {
    /// Create a living entity at a position with the given personality.
    pub fn new(
        name: impl Into<String>,
        position: Position,
        personality: Personality,
        class: EntityClass,
        birth_tick: u64,
    ) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            position,
            facing: Facing::default(),
            personality,
            class,
            state: EntityState::default(),
            alive: true,
            birth_tick,
            death_tick: None,
            owner: None,
        }
    }

    /// Mark the entity dead at the given tick. Idempotent; the original
    /// death tick is preserved.
    pub fn kill(&mut self, tick: u64) {
        if self.alive {
            self.alive = false;
            self.death_tick = Some(tick);
        }
    }
}
