//! Shared type definitions for the Vivarium simulation.
//!
//! This crate is the dependency root of the workspace: every other crate
//! depends on it and it depends on nothing but serialization and id
//! libraries. It defines:
//!
//! - [`ids`] -- strongly-typed UUID v7 identifier newtypes.
//! - [`spatial`] -- positions, facings, integer block coordinates, and
//!   axis-aligned bounding boxes.
//! - [`action`] -- action proposals submitted to the World Authority and
//!   the structured outcomes it returns.
//! - [`enums`] -- behavior modes, conflict archetypes, entity classes,
//!   and event result codes.

pub mod action;
pub mod enums;
pub mod ids;
pub mod spatial;

pub use action::{ActionKind, ActionOutcome, ActionParams, ActionProposal, RejectReason};
pub use enums::{BehaviorMode, ConflictArchetype, EntityClass, EventResult};
pub use ids::{EntityId, EventId, StructureId, ZoneId};
pub use spatial::{Aabb, BlockCoord, Facing, Position};
