//! The complete mutable state of one world instance.
//!
//! Everything a tick touches lives here: the entity registry, spatial
//! state, relationships, the event log, and ranking/starvation
//! bookkeeping. The engine is the sole writer; there are no global
//! singletons, so tests can run many independent worlds side by side.

use std::collections::BTreeMap;

use vivarium_entity::{Entity, RelationshipStore};
use vivarium_events::EventLog;
use vivarium_types::EntityId;
use vivarium_world::{StructureRegistry, VoxelGrid, ZoneRegistry};

/// All mutable state of a single world.
#[derive(Debug, Default)]
pub struct WorldState {
    /// The current tick; zero before the first tick runs.
    pub tick: u64,
    /// Every entity that has ever existed, alive or dead.
    pub entities: BTreeMap<EntityId, Entity>,
    /// Directional relationships between entities.
    pub relationships: RelationshipStore,
    /// Voxel block occupancy.
    pub grid: VoxelGrid,
    /// Zone claims.
    pub zones: ZoneRegistry,
    /// Placed structures.
    pub structures: StructureRegistry,
    /// The append-only event log.
    pub events: EventLog,
    /// Rank signals in [0,1] from the most recent ranking phase; higher
    /// means more pressure to change.
    pub rankings: BTreeMap<EntityId, f64>,
    /// Consecutive ticks each entity has spent at maximum sustenance.
    pub(crate) starvation: BTreeMap<EntityId, u32>,
}

impl WorldState {
    /// An empty world at tick zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity to the registry, returning its id.
    pub fn insert_entity(&mut self, entity: Entity) -> EntityId {
        let id = entity.id;
        self.entities.insert(id, entity);
        id
    }

    /// Look up an entity by id.
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Look up an entity mutably by id.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Ids of all living entities, in id order.
    pub fn alive_ids(&self) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|e| e.alive)
            .map(|e| e.id)
            .collect()
    }

    /// Number of living entities.
    pub fn population_alive(&self) -> usize {
        self.entities.values().filter(|e| e.alive).count()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use vivarium_entity::personality::Personality;
    use vivarium_types::{EntityClass, Position};

    use super::*;

    #[test]
    fn alive_ids_excludes_the_dead() {
        let mut state = WorldState::new();
        let a = state.insert_entity(Entity::new(
            "Asha",
            Position::new(0.0, 0.0, 0.0),
            Personality::neutral(),
            EntityClass::Citizen,
            0,
        ));
        let b = state.insert_entity(Entity::new(
            "Bram",
            Position::new(1.0, 0.0, 0.0),
            Personality::neutral(),
            EntityClass::Citizen,
            0,
        ));
        state.entity_mut(b).unwrap().kill(1);

        assert_eq!(state.alive_ids(), vec![a]);
        assert_eq!(state.population_alive(), 1);
        assert_eq!(state.entities.len(), 2);
    }
}
