//! Error types for world spatial state operations.

use vivarium_types::{BlockCoord, StructureId, ZoneId};

/// Errors that can occur during spatial state mutation.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A block already occupies the target coordinate.
    #[error("coordinate occupied: {0}")]
    CoordinateOccupied(BlockCoord),

    /// No block exists at the target coordinate.
    #[error("no block at coordinate: {0}")]
    BlockNotFound(BlockCoord),

    /// The zone box has min > max on some axis.
    #[error("invalid zone box: min must not exceed max on any axis")]
    InvalidZoneBox,

    /// The zone box intersects an existing zone.
    #[error("zone box intersects existing zone {0}")]
    ZoneOverlap(ZoneId),

    /// Structure with the given id was not found.
    #[error("structure not found: {0}")]
    StructureNotFound(StructureId),

    /// A structure was given an empty block set.
    #[error("structure has no blocks")]
    EmptyStructure,
}
