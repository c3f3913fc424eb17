//! Voxel block occupancy.
//!
//! The grid is a sparse map from integer coordinate to block. Insertion
//! enforces the one-block-per-coordinate invariant; callers see a typed
//! error, never silent replacement.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use vivarium_types::{BlockCoord, EntityId};

use crate::error::WorldError;

/// One voxel block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoxelBlock {
    /// The cell the block occupies.
    pub coord: BlockCoord,
    /// Material name.
    pub material: String,
    /// The entity that placed the block, when placed by one.
    pub placed_by: Option<EntityId>,
    /// Whether the block emits light (signs are emissive).
    pub emissive: bool,
    /// Whether entities can pass through the cell.
    pub solid: bool,
}

/// Sparse voxel grid with unique occupancy per coordinate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoxelGrid {
    blocks: BTreeMap<BlockCoord, VoxelBlock>,
}

impl VoxelGrid {
    /// An empty grid.
    pub const fn new() -> Self {
        Self {
            blocks: BTreeMap::new(),
        }
    }

    /// Whether any block occupies the coordinate.
    pub fn is_occupied(&self, coord: &BlockCoord) -> bool {
        self.blocks.contains_key(coord)
    }

    /// Whether a solid block occupies the coordinate.
    pub fn is_solid(&self, coord: &BlockCoord) -> bool {
        self.blocks.get(coord).is_some_and(|b| b.solid)
    }

    /// The block at the coordinate, if any.
    pub fn get(&self, coord: &BlockCoord) -> Option<&VoxelBlock> {
        self.blocks.get(coord)
    }

    /// Insert a block.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::CoordinateOccupied`] if a block already
    /// occupies the coordinate.
    pub fn insert(&mut self, block: VoxelBlock) -> Result<(), WorldError> {
        if self.blocks.contains_key(&block.coord) {
            return Err(WorldError::CoordinateOccupied(block.coord));
        }
        self.blocks.insert(block.coord, block);
        Ok(())
    }

    /// Remove and return the block at the coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::BlockNotFound`] if the cell is empty.
    pub fn remove(&mut self, coord: &BlockCoord) -> Result<VoxelBlock, WorldError> {
        self.blocks
            .remove(coord)
            .ok_or(WorldError::BlockNotFound(*coord))
    }

    /// Number of blocks in the grid.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the grid has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn stone(coord: BlockCoord) -> VoxelBlock {
        VoxelBlock {
            coord,
            material: String::from("stone"),
            placed_by: None,
            emissive: false,
            solid: true,
        }
    }

    #[test]
    fn occupancy_is_unique() {
        let mut grid = VoxelGrid::new();
        let c = BlockCoord::new(1, 2, 3);
        grid.insert(stone(c)).unwrap();

        // Every further insert at the same coordinate fails.
        for _ in 0..3 {
            assert!(matches!(
                grid.insert(stone(c)),
                Err(WorldError::CoordinateOccupied(_))
            ));
        }
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn remove_frees_the_cell() {
        let mut grid = VoxelGrid::new();
        let c = BlockCoord::new(0, 0, 0);
        grid.insert(stone(c)).unwrap();
        let removed = grid.remove(&c).unwrap();
        assert_eq!(removed.coord, c);
        assert!(!grid.is_occupied(&c));
        assert!(matches!(grid.remove(&c), Err(WorldError::BlockNotFound(_))));
    }

    #[test]
    fn solidity_check_distinguishes_materials() {
        let mut grid = VoxelGrid::new();
        let c = BlockCoord::new(5, 0, 5);
        grid.insert(VoxelBlock {
            coord: c,
            material: String::from("marker"),
            placed_by: None,
            emissive: true,
            solid: false,
        })
        .unwrap();
        assert!(grid.is_occupied(&c));
        assert!(!grid.is_solid(&c));
    }
}
