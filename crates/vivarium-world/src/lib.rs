//! World spatial state for the Vivarium simulation.
//!
//! Integer-coordinate occupancy records with two hard invariants:
//!
//! - no two voxel blocks occupy the same coordinate;
//! - no two zones' axis-aligned bounding boxes intersect.
//!
//! All checks are read-check-write: the World Authority is the sole
//! writer within a tick, so no additional locking is needed.

pub mod error;
pub mod structure;
pub mod voxel;
pub mod zone;

pub use error::WorldError;
pub use structure::{Structure, StructureRegistry};
pub use voxel::{VoxelBlock, VoxelGrid};
pub use zone::{Zone, ZoneRegistry};
