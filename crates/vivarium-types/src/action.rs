//! Action proposals and their structured outcomes.
//!
//! An [`ActionProposal`] is the only way anything mutates world state:
//! autonomous entities, scripted agents, and human-control paths all submit
//! proposals to the World Authority, which answers with an
//! [`ActionOutcome`] -- always a value, never an error.

use serde::{Deserialize, Serialize};

use crate::enums::EventResult;
use crate::ids::EntityId;
use crate::spatial::{BlockCoord, Position};

/// The kind of action a proposal requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Continuous movement through space.
    Move,
    /// Place a single voxel block.
    PlaceVoxel,
    /// Remove a voxel block.
    DestroyVoxel,
    /// Place a multi-block structure.
    PlaceStructure,
    /// Emit speech.
    Speak,
    /// Claim a rectangular zone.
    ClaimZone,
    /// Place a sign block carrying text.
    WriteSign,
    /// An action name the transport layer could not map to a known kind.
    Unknown,
}

impl core::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            Self::Move => "move",
            Self::PlaceVoxel => "place_voxel",
            Self::DestroyVoxel => "destroy_voxel",
            Self::PlaceStructure => "place_structure",
            Self::Speak => "speak",
            Self::ClaimZone => "claim_zone",
            Self::WriteSign => "write_sign",
            Self::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

/// Typed parameters for each action kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionParams {
    /// Move by a displacement vector.
    Move {
        /// East-west displacement.
        dx: f64,
        /// Vertical displacement.
        dy: f64,
        /// North-south displacement.
        dz: f64,
    },
    /// Place one block of `material` at `coord`.
    PlaceVoxel {
        /// Target cell.
        coord: BlockCoord,
        /// Material name.
        material: String,
    },
    /// Remove the block at `coord`.
    DestroyVoxel {
        /// Target cell.
        coord: BlockCoord,
    },
    /// Place a named structure occupying `blocks`.
    PlaceStructure {
        /// Structure kind name.
        kind: String,
        /// Material name applied to every block.
        material: String,
        /// Cells the structure occupies.
        blocks: Vec<BlockCoord>,
    },
    /// Say `text` at `volume`.
    Speak {
        /// The spoken text.
        text: String,
        /// Requested volume; clamped by the authority.
        volume: f64,
    },
    /// Claim the box `[min, max]` as a zone.
    ClaimZone {
        /// Inclusive minimum corner.
        min: BlockCoord,
        /// Inclusive maximum corner.
        max: BlockCoord,
    },
    /// Place a sign at `coord` carrying `text`.
    WriteSign {
        /// Target cell.
        coord: BlockCoord,
        /// Sign text.
        text: String,
    },
    /// An action the transport layer could not map; always rejected.
    Unknown {
        /// The unrecognized action name, kept for the event log.
        name: String,
    },
}

impl ActionParams {
    /// The action kind these parameters belong to.
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::Move { .. } => ActionKind::Move,
            Self::PlaceVoxel { .. } => ActionKind::PlaceVoxel,
            Self::DestroyVoxel { .. } => ActionKind::DestroyVoxel,
            Self::PlaceStructure { .. } => ActionKind::PlaceStructure,
            Self::Speak { .. } => ActionKind::Speak,
            Self::ClaimZone { .. } => ActionKind::ClaimZone,
            Self::WriteSign { .. } => ActionKind::WriteSign,
            Self::Unknown { .. } => ActionKind::Unknown,
        }
    }
}

/// A requested world mutation submitted by an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionProposal {
    /// The entity requesting the action.
    pub actor_id: EntityId,
    /// Typed action parameters.
    pub params: ActionParams,
    /// The tick the proposal targets.
    pub tick: u64,
}

/// Why a proposal was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// The actor id does not resolve to any entity.
    EntityNotFound,
    /// The actor exists but is dead.
    EntityDead,
    /// The action kind is not recognized.
    UnknownAction,
    /// Move displacement exceeds the per-tick cap.
    MoveTooFar,
    /// The target cell is already occupied.
    PositionOccupied,
    /// No block exists at the target cell.
    BlockNotFound,
    /// The actor lacks permission for this mutation.
    NotPermitted,
    /// The structure exceeds the voxel-count cap.
    StructureTooLarge,
    /// The zone box has min > max on some axis.
    InvalidZone,
    /// The zone exceeds the per-axis extent cap.
    ZoneTooLarge,
    /// The zone box intersects an existing zone.
    ZoneOverlap,
    /// Required text was empty.
    EmptyText,
    /// Text exceeds the length cap.
    TextTooLong,
    /// An unexpected internal error; logged, never propagated.
    Internal,
}

impl core::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            Self::EntityNotFound => "entity_not_found",
            Self::EntityDead => "entity_dead",
            Self::UnknownAction => "unknown_action",
            Self::MoveTooFar => "move_too_far",
            Self::PositionOccupied => "position_occupied",
            Self::BlockNotFound => "block_not_found",
            Self::NotPermitted => "not_permitted",
            Self::StructureTooLarge => "structure_too_large",
            Self::InvalidZone => "invalid_zone",
            Self::ZoneTooLarge => "zone_too_large",
            Self::ZoneOverlap => "zone_overlap",
            Self::EmptyText => "empty_text",
            Self::TextTooLong => "text_too_long",
            Self::Internal => "internal_error",
        };
        write!(f, "{s}")
    }
}

/// The structured result of processing one proposal.
///
/// Callers always receive an outcome; rejection is data, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOutcome {
    /// Accepted or rejected.
    pub status: EventResult,
    /// Rejection reason code, present when rejected.
    pub reason: Option<RejectReason>,
    /// Human-readable detail, when available.
    pub detail: Option<String>,
    /// The actor's position after the action, when relevant.
    pub position: Option<Position>,
    /// Kind-specific payload (e.g. speech emission, new structure id).
    pub data: Option<serde_json::Value>,
    /// Importance weight recorded on the event-log entry.
    pub importance: f64,
}

impl ActionOutcome {
    /// Build an accepted outcome.
    pub const fn accepted(
        position: Option<Position>,
        data: Option<serde_json::Value>,
        importance: f64,
    ) -> Self {
        Self {
            status: EventResult::Accepted,
            reason: None,
            detail: None,
            position,
            data,
            importance,
        }
    }

    /// Build a rejected outcome with a reason code.
    pub const fn rejected(reason: RejectReason) -> Self {
        Self {
            status: EventResult::Rejected,
            reason: Some(reason),
            detail: None,
            position: None,
            data: None,
            importance: 0.0,
        }
    }

    /// Attach a human-readable detail message.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Whether the proposal was accepted.
    pub fn is_accepted(&self) -> bool {
        self.status == EventResult::Accepted
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn params_report_their_kind() {
        let p = ActionParams::Speak {
            text: String::from("hello"),
            volume: 1.0,
        };
        assert_eq!(p.kind(), ActionKind::Speak);

        let p = ActionParams::Unknown {
            name: String::from("levitate"),
        };
        assert_eq!(p.kind(), ActionKind::Unknown);
    }

    #[test]
    fn unknown_params_round_trip_through_serde() {
        // The variant's payload field must not collide with the "action"
        // content tag.
        let proposal = ActionProposal {
            actor_id: EntityId::new(),
            params: ActionParams::Unknown {
                name: String::from("levitate"),
            },
            tick: 3,
        };
        let json = serde_json::to_value(&proposal).unwrap();
        assert_eq!(json["params"]["action"], "unknown");
        assert_eq!(json["params"]["name"], "levitate");
        let back: ActionProposal = serde_json::from_value(json).unwrap();
        assert_eq!(proposal, back);
    }

    #[test]
    fn reason_codes_render_snake_case() {
        assert_eq!(RejectReason::EntityNotFound.to_string(), "entity_not_found");
        assert_eq!(RejectReason::ZoneOverlap.to_string(), "zone_overlap");
    }

    #[test]
    fn proposal_round_trips_through_serde() {
        let proposal = ActionProposal {
            actor_id: EntityId::new(),
            params: ActionParams::Move {
                dx: 1.0,
                dy: 0.0,
                dz: -2.0,
            },
            tick: 7,
        };
        let json = serde_json::to_string(&proposal).unwrap();
        let back: ActionProposal = serde_json::from_str(&json).unwrap();
        assert_eq!(proposal, back);
    }
}
