//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Every record in the simulation has a strongly-typed ID to prevent
//! accidental mixing of identifiers at compile time. All IDs use UUID v7
//! (time-ordered) so that insertion order is reflected in the id ordering.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for an entity inhabiting the world.
    EntityId
}

define_id! {
    /// Unique identifier for a structure (a grouped set of voxel blocks).
    StructureId
}

define_id! {
    /// Unique identifier for a claimed zone.
    ZoneId
}

define_id! {
    /// Unique identifier for an entry in the world event log.
    EventId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let entity = EntityId::new();
        let zone = ZoneId::new();
        // Different types -- the compiler enforces no mixing.
        assert_ne!(entity.into_inner(), Uuid::nil());
        assert_ne!(zone.into_inner(), Uuid::nil());
    }

    #[test]
    fn ids_round_trip_through_serde() {
        let id = EntityId::new();
        let json = serde_json::to_string(&id).unwrap();
        let back: EntityId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn v7_ids_are_time_ordered() {
        let a = EventId::new();
        let b = EventId::new();
        assert!(a <= b);
    }
}
