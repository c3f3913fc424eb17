//! Entity attribute model for the Vivarium simulation.
//!
//! Pure data and update-rule logic for the population: no I/O, no store
//! access. The engine crate owns when these rules run; this crate owns what
//! they do.
//!
//! # Modules
//!
//! - [`personality`] -- 18-axis immutable personality value type.
//! - [`needs`] -- 8-axis needs with logistic accumulation and context
//!   discharge, plus evolution pressure and behavior modes.
//! - [`memory`] -- capped episodic memory and keyed semantic memory.
//! - [`relationship`] -- directional 7-axis relationships with event rules
//!   and periodic decay.
//! - [`entity`] -- the entity record and its versioned mutable state.
//! - [`error`] -- typed errors for attribute operations.

pub mod entity;
pub mod error;
pub mod memory;
pub mod needs;
pub mod personality;
pub mod relationship;

pub use entity::{BehaviorFlags, EmotionalState, Entity, EntityState, Inventory, STATE_VERSION};
pub use error::EntityError;
pub use memory::{EpisodicMemory, MemoryConfig, MemoryStore, SemanticFact};
pub use needs::{ContextFlags, NeedAxis, Needs, NeedsConfig, PressureConfig};
pub use personality::{Personality, PersonalityAxis};
pub use relationship::{Relationship, RelationshipAxis, RelationshipEvent, RelationshipStore};
