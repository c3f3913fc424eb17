//! Configuration loading and typed config structures for the engine.
//!
//! Configuration is a YAML file; the binary resolves its path from the
//! `VIVARIUM_CONFIG` environment variable. Every tunable the engine
//! consults is here; nothing is hard-coded in the handlers or phases. All
//! fields have defaults, so an empty file (or no file at all) yields a
//! runnable configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use vivarium_entity::{MemoryConfig, NeedsConfig, PressureConfig};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// World Authority validation caps.
    #[serde(default)]
    pub world: WorldRulesConfig,

    /// Per-phase tick intervals.
    #[serde(default)]
    pub intervals: PhaseIntervals,

    /// Decision Pipeline parameters.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Conflict detection and resolution parameters.
    #[serde(default)]
    pub conflict: ConflictConfig,

    /// Needs accumulation and discharge parameters.
    #[serde(default)]
    pub needs: NeedsConfig,

    /// Evolution pressure and behavior-mode parameters.
    #[serde(default)]
    pub pressure: PressureConfig,

    /// Episodic memory parameters.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Death and succession parameters.
    #[serde(default)]
    pub lifecycle: LifecycleConfig,

    /// Decision-service call parameters.
    #[serde(default)]
    pub decision: DecisionConfig,

    /// Tick replay bounds.
    #[serde(default)]
    pub clock: ClockConfig,
}

impl EngineConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_yml::from_str(&contents)?)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }
}

/// Validation caps the World Authority enforces on proposals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldRulesConfig {
    /// Maximum per-tick move displacement; equal-to-cap is accepted.
    pub max_move_distance: f64,
    /// Maximum voxel count for one structure.
    pub max_structure_voxels: usize,
    /// Maximum zone extent on any axis, in blocks.
    pub max_zone_extent: i64,
    /// Maximum sign text length, in characters.
    pub max_sign_length: usize,
    /// Maximum speak volume; requests above are clamped, not rejected.
    pub max_speak_volume: f64,
    /// Distance within which two entities can interact in a tick.
    pub interaction_radius: f64,
}

impl Default for WorldRulesConfig {
    fn default() -> Self {
        Self {
            max_move_distance: 5.0,
            max_structure_voxels: 64,
            max_zone_extent: 32,
            max_sign_length: 256,
            max_speak_volume: 10.0,
            interaction_radius: 12.0,
        }
    }
}

/// Tick intervals for the interval-gated phases.
///
/// A phase runs when `tick % interval == 0`. An interval of zero disables
/// the phase entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseIntervals {
    /// Cognition (reflection) pipeline.
    pub cognition: u64,
    /// Interaction pipeline and conflict checks.
    pub interaction: u64,
    /// Cultural drift pipeline.
    pub culture: u64,
    /// Relationship decay sweep.
    pub relationship_decay: u64,
    /// Evolution-pressure application and behavior-mode refresh.
    pub evolution: u64,
    /// Ranking recomputation.
    pub ranking: u64,
    /// Observer commentary.
    pub commentary: u64,
    /// Succession eligibility check.
    pub succession: u64,
    /// Ticks per era; the narrative phase fires at each boundary.
    pub era_length: u64,
}

impl Default for PhaseIntervals {
    fn default() -> Self {
        Self {
            cognition: 5,
            interaction: 2,
            culture: 25,
            relationship_decay: 10,
            evolution: 10,
            ranking: 10,
            commentary: 50,
            succession: 100,
            era_length: 500,
        }
    }
}

/// Decision Pipeline parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum candidates per pipeline run; larger sets are randomly
    /// sampled down.
    pub batch_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { batch_size: 8 }
    }
}

/// Conflict detection thresholds and resolution effect sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConflictConfig {
    /// Trust below this makes a relationship hostile.
    pub hostility_trust_threshold: f64,
    /// Anger above this makes a relationship hostile.
    pub anger_threshold: f64,
    /// Rivalry above this makes a relationship hostile.
    pub rivalry_threshold: f64,
    /// Weighted personality divergence above this can trigger a debate.
    pub divergence_threshold: f64,
    /// Base probability of a spontaneous duel, scaled by max aggression.
    pub duel_base_chance: f64,
    /// Fatigue cost to both debate participants.
    pub debate_energy_cost: f64,
    /// Fatigue cost to a duel loser.
    pub duel_energy_cost: f64,
    /// Fatigue recovered by a duel winner.
    pub duel_energy_gain: f64,
    /// Fatigue cost to both territorial participants.
    pub territorial_energy_cost: f64,
    /// Extra fatigue cost to the territorial loser.
    pub territorial_loser_extra: f64,
    /// Stimulation discharged for the winner of any conflict.
    pub awareness_gain: f64,
    /// How far a territorial loser is displaced, in world units.
    pub displacement_distance: f64,
}

impl Default for ConflictConfig {
    fn default() -> Self {
        Self {
            hostility_trust_threshold: -30.0,
            anger_threshold: 60.0,
            rivalry_threshold: 60.0,
            divergence_threshold: 1.2,
            duel_base_chance: 0.02,
            debate_energy_cost: 4.0,
            duel_energy_cost: 12.0,
            duel_energy_gain: 6.0,
            territorial_energy_cost: 8.0,
            territorial_loser_extra: 6.0,
            awareness_gain: 10.0,
            displacement_distance: 6.0,
        }
    }
}

/// Death and succession parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Consecutive ticks at maximum sustenance before death.
    pub starvation_ticks: u32,
    /// Evolution pressure at or above which an entity becomes eligible
    /// for succession.
    pub succession_pressure_threshold: f64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            starvation_ticks: 25,
            succession_pressure_threshold: 90.0,
        }
    }
}

/// Decision-service call parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    /// Per-call deadline in milliseconds.
    pub timeout_ms: u64,
    /// Token budget for routine pipeline calls.
    pub max_tokens: u32,
    /// Importance at or above which calls prefer the escalation backend.
    pub escalation_threshold: f64,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 8000,
            max_tokens: 256,
            escalation_threshold: 0.8,
        }
    }
}

/// Tick replay bounds for the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Maximum ticks replayed per orchestrator invocation, regardless of
    /// speed.
    pub max_ticks_per_advance: u32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            max_ticks_per_advance: 10,
        }
    }
}
