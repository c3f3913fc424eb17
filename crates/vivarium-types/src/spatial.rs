//! Spatial primitives: positions, facings, block coordinates, and AABBs.
//!
//! Entities move through continuous space ([`Position`], three floats) while
//! the voxel grid and zone registry operate on integer cells
//! ([`BlockCoord`]). [`Aabb`] is the closed integer box used for structure
//! bounds and zone claims.

use serde::{Deserialize, Serialize};

/// A continuous position in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// East-west coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
    /// North-south coordinate.
    pub z: f64,
}

impl Position {
    /// Construct a position from its three components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another position.
    pub fn distance_to(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// The integer grid cell containing this position.
    pub fn block(&self) -> BlockCoord {
        BlockCoord {
            x: self.x.floor() as i64,
            y: self.y.floor() as i64,
            z: self.z.floor() as i64,
        }
    }

    /// The position offset by a displacement vector.
    pub const fn offset(&self, dx: f64, dy: f64, dz: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
        }
    }
}

/// A viewing direction as yaw/pitch in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Facing {
    /// Rotation around the vertical axis.
    pub yaw: f64,
    /// Elevation angle.
    pub pitch: f64,
}

impl Facing {
    /// Derive a facing from a displacement vector.
    ///
    /// A zero-length horizontal displacement keeps yaw at 0.
    pub fn from_displacement(dx: f64, dy: f64, dz: f64) -> Self {
        let yaw = dz.atan2(dx);
        let horizontal = (dx * dx + dz * dz).sqrt();
        let pitch = if horizontal == 0.0 && dy == 0.0 {
            0.0
        } else {
            dy.atan2(horizontal)
        };
        Self { yaw, pitch }
    }
}

/// An integer voxel-grid coordinate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct BlockCoord {
    /// East-west cell index.
    pub x: i64,
    /// Vertical cell index.
    pub y: i64,
    /// North-south cell index.
    pub z: i64,
}

impl BlockCoord {
    /// Construct a block coordinate from its three components.
    pub const fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }
}

impl core::fmt::Display for BlockCoord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// A closed axis-aligned bounding box over integer coordinates.
///
/// Both corners are inclusive: a 1x1x1 box has `min == max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aabb {
    /// Inclusive minimum corner.
    pub min: BlockCoord,
    /// Inclusive maximum corner.
    pub max: BlockCoord,
}

impl Aabb {
    /// Construct a box from two inclusive corners.
    pub const fn new(min: BlockCoord, max: BlockCoord) -> Self {
        Self { min, max }
    }

    /// Whether `min <= max` holds on every axis.
    pub const fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    /// Extent along each axis, counted in cells (inclusive bounds).
    pub const fn extent(&self) -> (i64, i64, i64) {
        (
            self.max.x - self.min.x + 1,
            self.max.y - self.min.y + 1,
            self.max.z - self.min.z + 1,
        )
    }

    /// Whether this box and `other` share any cell.
    pub const fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Whether the box contains the given cell.
    pub const fn contains(&self, coord: &BlockCoord) -> bool {
        coord.x >= self.min.x
            && coord.x <= self.max.x
            && coord.y >= self.min.y
            && coord.y <= self.max.y
            && coord.z >= self.min.z
            && coord.z <= self.max.z
    }

    /// The tightest box enclosing all of `coords`, or `None` when empty.
    pub fn enclosing(coords: &[BlockCoord]) -> Option<Self> {
        let first = coords.first()?;
        let mut min = *first;
        let mut max = *first;
        for c in coords {
            min.x = min.x.min(c.x);
            min.y = min.y.min(c.y);
            min.z = min.z.min(c.z);
            max.x = max.x.max(c.x);
            max.y = max.y.max(c.y);
            max.z = max.z.max(c.z);
        }
        Some(Self { min, max })
    }
}
