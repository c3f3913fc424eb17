//! Owned, non-overlapping rectangular zone claims.
//!
//! The registry enforces the global invariant that no two zones' bounding
//! boxes intersect. Validation order: box well-formedness, then the
//! overlap scan. Extent caps are the World Authority's concern (they are
//! tunables); the registry owns only the structural invariants.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use vivarium_types::{Aabb, BlockCoord, EntityId, ZoneId};

use crate::error::WorldError;

/// An owned rectangular claim over world space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// Stable identifier.
    pub id: ZoneId,
    /// The claiming entity.
    pub owner: EntityId,
    /// The claimed box, inclusive on all axes.
    pub bbox: Aabb,
    /// Tick the claim was accepted.
    pub claimed_tick: u64,
}

/// All zones in the world, with the non-overlap invariant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZoneRegistry {
    zones: BTreeMap<ZoneId, Zone>,
}

impl ZoneRegistry {
    /// An empty registry.
    pub const fn new() -> Self {
        Self {
            zones: BTreeMap::new(),
        }
    }

    /// The first existing zone whose box intersects `bbox`, if any.
    pub fn find_overlap(&self, bbox: &Aabb) -> Option<&Zone> {
        self.zones.values().find(|z| z.bbox.intersects(bbox))
    }

    /// Insert a claim.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidZoneBox`] for a malformed box, or
    /// [`WorldError::ZoneOverlap`] if the box intersects an existing zone.
    pub fn claim(
        &mut self,
        owner: EntityId,
        bbox: Aabb,
        tick: u64,
    ) -> Result<ZoneId, WorldError> {
        if !bbox.is_valid() {
            return Err(WorldError::InvalidZoneBox);
        }
        if let Some(existing) = self.find_overlap(&bbox) {
            return Err(WorldError::ZoneOverlap(existing.id));
        }
        let id = ZoneId::new();
        self.zones.insert(
            id,
            Zone {
                id,
                owner,
                bbox,
                claimed_tick: tick,
            },
        );
        debug!(zone = %id, owner = %owner, tick, "zone claimed");
        Ok(id)
    }

    /// The zone containing the coordinate, if any.
    ///
    /// At most one zone can contain any cell, by the non-overlap
    /// invariant.
    pub fn zone_at(&self, coord: &BlockCoord) -> Option<&Zone> {
        self.zones.values().find(|z| z.bbox.contains(coord))
    }

    /// The owner of the zone covering the coordinate, if any.
    pub fn owner_covering(&self, coord: &BlockCoord) -> Option<EntityId> {
        self.zone_at(coord).map(|z| z.owner)
    }

    /// Look up a zone by id.
    pub fn get(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.get(&id)
    }

    /// All zones.
    pub fn iter(&self) -> impl Iterator<Item = &Zone> {
        self.zones.values()
    }

    /// Number of zones.
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::Rng;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn bbox(min: (i64, i64, i64), max: (i64, i64, i64)) -> Aabb {
        Aabb::new(
            BlockCoord::new(min.0, min.1, min.2),
            BlockCoord::new(max.0, max.1, max.2),
        )
    }

    #[test]
    fn overlapping_claim_is_rejected() {
        let mut registry = ZoneRegistry::new();
        let owner = EntityId::new();
        registry.claim(owner, bbox((0, 0, 0), (4, 4, 4)), 1).unwrap();

        assert!(matches!(
            registry.claim(owner, bbox((4, 4, 4), (8, 8, 8)), 2),
            Err(WorldError::ZoneOverlap(_))
        ));
        assert!(registry.claim(owner, bbox((5, 0, 0), (8, 4, 4)), 3).is_ok());
    }

    #[test]
    fn malformed_box_is_rejected() {
        let mut registry = ZoneRegistry::new();
        assert!(matches!(
            registry.claim(EntityId::new(), bbox((3, 0, 0), (1, 4, 4)), 1),
            Err(WorldError::InvalidZoneBox)
        ));
    }

    #[test]
    fn accepted_zones_never_overlap_random_rectangles() {
        // Property: for any sequence of accepted claims, the registry
        // holds pairwise-disjoint boxes.
        let mut rng = StdRng::seed_from_u64(4242);
        let mut registry = ZoneRegistry::new();
        let owner = EntityId::new();

        for tick in 0..300 {
            let x = rng.random_range(-40..40);
            let y = rng.random_range(-8..8);
            let z = rng.random_range(-40..40);
            let b = bbox(
                (x, y, z),
                (
                    x + rng.random_range(0..10),
                    y + rng.random_range(0..4),
                    z + rng.random_range(0..10),
                ),
            );
            // Accepted or rejected, the invariant must hold afterwards.
            let _ = registry.claim(owner, b, tick);

            let zones: Vec<&Zone> = registry.iter().collect();
            for (i, a) in zones.iter().enumerate() {
                for b in zones.iter().skip(i + 1) {
                    assert!(
                        !a.bbox.intersects(&b.bbox),
                        "zones {} and {} overlap",
                        a.id,
                        b.id
                    );
                }
            }
        }
        assert!(!registry.is_empty());
    }

    #[test]
    fn owner_lookup_by_coordinate() {
        let mut registry = ZoneRegistry::new();
        let owner = EntityId::new();
        registry.claim(owner, bbox((0, 0, 0), (2, 2, 2)), 1).unwrap();

        assert_eq!(
            registry.owner_covering(&BlockCoord::new(1, 1, 1)),
            Some(owner)
        );
        assert_eq!(registry.owner_covering(&BlockCoord::new(3, 0, 0)), None);
    }
}
