//! The Vivarium engine: the World Authority and the tick orchestrator.
//!
//! The engine is the single mutation point for a world. Entities (or any
//! other caller) submit action proposals; the World Authority validates
//! each against the spatial state and hard caps, applies accepted effects,
//! and appends exactly one event per proposal to the append-only log.
//! Around that sits the tick loop: interval-gated phases for needs,
//! cognition, interaction and conflict, culture, death, evolution
//! pressure, ranking, commentary, narrative, and succession.
//!
//! Decisions that need judgment are delegated to an opaque external
//! decision service through the three-phase pipeline in [`pipeline`];
//! the engine never blocks store access on a network call.

pub mod authority;
pub mod config;
pub mod conflict;
pub mod pipeline;
pub mod state;
pub mod tick;

pub use authority::WorldAuthority;
pub use config::{ConfigError, EngineConfig};
pub use conflict::ConflictOutcome;
pub use pipeline::PipelineReport;
pub use state::WorldState;
pub use tick::{Engine, PhaseError, TickOrchestrator, TickSummary};
