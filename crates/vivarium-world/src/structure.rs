//! Structures: named groups of voxel blocks under one bounding box.
//!
//! A structure does not own its blocks' occupancy -- those live in the
//! [`VoxelGrid`](crate::voxel::VoxelGrid) -- it groups a set of
//! coordinates under one owner, kind, and computed AABB. Signs are
//! single-block structures carrying text.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use vivarium_types::{Aabb, BlockCoord, EntityId, StructureId};

use crate::error::WorldError;

/// A grouped set of blocks with an owner and bounding box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Structure {
    /// Stable identifier.
    pub id: StructureId,
    /// The entity that placed the structure, when placed by one.
    pub owner: Option<EntityId>,
    /// Structure kind name (e.g. `"shelter"`, `"sign"`).
    pub kind: String,
    /// Cells the structure occupies.
    pub blocks: Vec<BlockCoord>,
    /// The tightest box enclosing all blocks.
    pub bbox: Aabb,
    /// Sign text, for structures that carry it.
    pub text: Option<String>,
    /// Tick the structure was placed.
    pub placed_tick: u64,
}

/// All structures in the world.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructureRegistry {
    structures: BTreeMap<StructureId, Structure>,
}

impl StructureRegistry {
    /// An empty registry.
    pub const fn new() -> Self {
        Self {
            structures: BTreeMap::new(),
        }
    }

    /// Insert a structure over the given blocks, computing its bounding
    /// box.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::EmptyStructure`] if `blocks` is empty.
    pub fn insert(
        &mut self,
        owner: Option<EntityId>,
        kind: impl Into<String>,
        blocks: Vec<BlockCoord>,
        text: Option<String>,
        tick: u64,
    ) -> Result<StructureId, WorldError> {
        let bbox = Aabb::enclosing(&blocks).ok_or(WorldError::EmptyStructure)?;
        let id = StructureId::new();
        self.structures.insert(
            id,
            Structure {
                id,
                owner,
                kind: kind.into(),
                blocks,
                bbox,
                text,
                placed_tick: tick,
            },
        );
        Ok(id)
    }

    /// Look up a structure by id.
    pub fn get(&self, id: StructureId) -> Option<&Structure> {
        self.structures.get(&id)
    }

    /// The structure occupying the given cell, if any.
    pub fn structure_at(&self, coord: &BlockCoord) -> Option<&Structure> {
        self.structures
            .values()
            .find(|s| s.blocks.contains(coord))
    }

    /// All structures.
    pub fn iter(&self) -> impl Iterator<Item = &Structure> {
        self.structures.values()
    }

    /// Number of structures.
    pub fn len(&self) -> usize {
        self.structures.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn insert_computes_bounding_box() {
        let mut registry = StructureRegistry::new();
        let blocks = vec![
            BlockCoord::new(0, 0, 0),
            BlockCoord::new(2, 1, 0),
            BlockCoord::new(1, 3, -1),
        ];
        let id = registry
            .insert(Some(EntityId::new()), "shelter", blocks, None, 5)
            .unwrap();

        let s = registry.get(id).unwrap();
        assert_eq!(s.bbox.min, BlockCoord::new(0, 0, -1));
        assert_eq!(s.bbox.max, BlockCoord::new(2, 3, 0));
        assert_eq!(s.placed_tick, 5);
    }

    #[test]
    fn empty_block_set_is_rejected() {
        let mut registry = StructureRegistry::new();
        assert!(matches!(
            registry.insert(None, "shelter", Vec::new(), None, 1),
            Err(WorldError::EmptyStructure)
        ));
    }

    #[test]
    fn structure_lookup_by_cell() {
        let mut registry = StructureRegistry::new();
        let id = registry
            .insert(
                None,
                "sign",
                vec![BlockCoord::new(7, 0, 7)],
                Some(String::from("keep out")),
                1,
            )
            .unwrap();

        let found = registry.structure_at(&BlockCoord::new(7, 0, 7)).unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.text.as_deref(), Some("keep out"));
        assert!(registry.structure_at(&BlockCoord::new(0, 0, 0)).is_none());
    }
}
