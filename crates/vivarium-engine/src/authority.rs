//! The World Authority: the single mutation point for world state.
//!
//! Every mutation -- autonomous, scripted, or human-controlled -- arrives
//! as an [`ActionProposal`] and leaves as an [`ActionOutcome`]. Rejection
//! is a value with a reason code, never an error, and nothing below
//! [`WorldAuthority::process`] escapes it: unexpected internal failures
//! are caught, logged, and reported as an `Internal` rejection. Exactly
//! one event-log entry is appended per proposal, accept or reject.

use serde_json::json;
use tracing::{debug, warn};
use vivarium_types::{ActionOutcome, ActionParams, ActionProposal, Facing, RejectReason};
use vivarium_types::{Aabb, BlockCoord, EntityClass, EntityId};
use vivarium_events::EventDraft;
use vivarium_world::{VoxelBlock, WorldError};

use crate::config::WorldRulesConfig;
use crate::state::WorldState;

/// Importance weights recorded on accepted action events.
mod importance {
    pub const MOVE: f64 = 0.1;
    pub const SPEAK: f64 = 0.2;
    pub const VOXEL: f64 = 0.3;
    pub const SIGN: f64 = 0.4;
    pub const ZONE: f64 = 0.5;
    pub const STRUCTURE: f64 = 0.6;
}

/// Validates proposals against world rules and applies accepted ones.
#[derive(Debug, Clone)]
pub struct WorldAuthority {
    rules: WorldRulesConfig,
}

impl WorldAuthority {
    /// Create an authority enforcing the given rule caps.
    pub const fn new(rules: WorldRulesConfig) -> Self {
        Self { rules }
    }

    /// The rule caps this authority enforces.
    pub const fn rules(&self) -> &WorldRulesConfig {
        &self.rules
    }

    /// Process one proposal: validate, apply on acceptance, and append
    /// exactly one event-log entry either way.
    pub fn process(&self, state: &mut WorldState, proposal: &ActionProposal) -> ActionOutcome {
        let outcome = self.evaluate(state, proposal);

        let position = outcome
            .position
            .or_else(|| state.entity(proposal.actor_id).map(|e| e.position));
        let params = serde_json::to_value(&proposal.params).unwrap_or(serde_json::Value::Null);
        state.events.append(EventDraft {
            tick: proposal.tick,
            actor_id: Some(proposal.actor_id),
            event_type: String::from("action"),
            action: proposal.params.kind().to_string(),
            params,
            result: outcome.status,
            reason: outcome.reason,
            position,
            importance: outcome.importance,
        });

        debug!(
            actor = %proposal.actor_id,
            action = %proposal.params.kind(),
            accepted = outcome.is_accepted(),
            "proposal processed"
        );
        outcome
    }

    /// Resolve the actor and dispatch to the handler for the action kind.
    fn evaluate(&self, state: &mut WorldState, proposal: &ActionProposal) -> ActionOutcome {
        let Some(actor) = state.entity(proposal.actor_id) else {
            return ActionOutcome::rejected(RejectReason::EntityNotFound);
        };
        if !actor.alive {
            return ActionOutcome::rejected(RejectReason::EntityDead);
        }

        let result = match &proposal.params {
            ActionParams::Move { dx, dy, dz } => {
                self.handle_move(state, proposal.actor_id, *dx, *dy, *dz)
            }
            ActionParams::PlaceVoxel { coord, material } => {
                Self::handle_place_voxel(state, proposal.actor_id, *coord, material, proposal.tick)
            }
            ActionParams::DestroyVoxel { coord } => {
                Self::handle_destroy_voxel(state, proposal.actor_id, *coord)
            }
            ActionParams::PlaceStructure {
                kind,
                material,
                blocks,
            } => self.handle_place_structure(
                state,
                proposal.actor_id,
                kind,
                material,
                blocks,
                proposal.tick,
            ),
            ActionParams::Speak { text, volume } => {
                self.handle_speak(state, proposal.actor_id, text, *volume)
            }
            ActionParams::ClaimZone { min, max } => {
                self.handle_claim_zone(state, proposal.actor_id, *min, *max, proposal.tick)
            }
            ActionParams::WriteSign { coord, text } => {
                self.handle_write_sign(state, proposal.actor_id, *coord, text, proposal.tick)
            }
            ActionParams::Unknown { name } => {
                return ActionOutcome::rejected(RejectReason::UnknownAction)
                    .with_detail(format!("unrecognized action: {name}"));
            }
        };

        result.unwrap_or_else(|e| {
            warn!(actor = %proposal.actor_id, error = %e, "internal error processing proposal");
            ActionOutcome::rejected(RejectReason::Internal).with_detail(e.to_string())
        })
    }

    fn handle_move(
        &self,
        state: &mut WorldState,
        actor_id: EntityId,
        dx: f64,
        dy: f64,
        dz: f64,
    ) -> Result<ActionOutcome, WorldError> {
        let distance = dz.mul_add(dz, dx.mul_add(dx, dy * dy)).sqrt();
        if distance > self.rules.max_move_distance {
            return Ok(ActionOutcome::rejected(RejectReason::MoveTooFar).with_detail(
                format!(
                    "displacement {distance:.2} exceeds cap {:.2}",
                    self.rules.max_move_distance
                ),
            ));
        }

        let Some(actor) = state.entity(actor_id) else {
            return Ok(ActionOutcome::rejected(RejectReason::EntityNotFound));
        };
        let target = actor.position.offset(dx, dy, dz);
        if state.grid.is_solid(&target.block()) {
            return Ok(ActionOutcome::rejected(RejectReason::PositionOccupied));
        }

        if let Some(actor) = state.entity_mut(actor_id) {
            actor.position = target;
            if distance > 0.0 {
                actor.facing = Facing::from_displacement(dx, dy, dz);
            }
        }
        Ok(ActionOutcome::accepted(Some(target), None, importance::MOVE))
    }

    fn handle_place_voxel(
        state: &mut WorldState,
        actor_id: EntityId,
        coord: BlockCoord,
        material: &str,
        _tick: u64,
    ) -> Result<ActionOutcome, WorldError> {
        if state.grid.is_occupied(&coord) {
            return Ok(ActionOutcome::rejected(RejectReason::PositionOccupied));
        }
        state.grid.insert(VoxelBlock {
            coord,
            material: material.to_owned(),
            placed_by: Some(actor_id),
            emissive: false,
            solid: true,
        })?;
        Ok(ActionOutcome::accepted(
            None,
            Some(json!({ "coord": coord })),
            importance::VOXEL,
        ))
    }

    /// Destroy permission: the placer, the owner of a zone covering the
    /// cell, or an apex-class entity.
    fn handle_destroy_voxel(
        state: &mut WorldState,
        actor_id: EntityId,
        coord: BlockCoord,
    ) -> Result<ActionOutcome, WorldError> {
        let Some(block) = state.grid.get(&coord) else {
            return Ok(ActionOutcome::rejected(RejectReason::BlockNotFound));
        };

        let is_placer = block.placed_by == Some(actor_id);
        let owns_zone = state.zones.owner_covering(&coord) == Some(actor_id);
        let is_apex = state
            .entity(actor_id)
            .is_some_and(|e| e.class == EntityClass::Apex);
        if !(is_placer || owns_zone || is_apex) {
            return Ok(ActionOutcome::rejected(RejectReason::NotPermitted));
        }

        let removed = state.grid.remove(&coord)?;
        Ok(ActionOutcome::accepted(
            None,
            Some(json!({ "coord": coord, "material": removed.material })),
            importance::VOXEL,
        ))
    }

    fn handle_place_structure(
        &self,
        state: &mut WorldState,
        actor_id: EntityId,
        kind: &str,
        material: &str,
        blocks: &[BlockCoord],
        tick: u64,
    ) -> Result<ActionOutcome, WorldError> {
        if blocks.len() > self.rules.max_structure_voxels {
            return Ok(ActionOutcome::rejected(RejectReason::StructureTooLarge).with_detail(
                format!(
                    "{} voxels exceeds cap {}",
                    blocks.len(),
                    self.rules.max_structure_voxels
                ),
            ));
        }
        let unique: std::collections::BTreeSet<&BlockCoord> = blocks.iter().collect();
        if unique.len() != blocks.len() {
            return Ok(ActionOutcome::rejected(RejectReason::PositionOccupied)
                .with_detail("duplicate coordinates in block set"));
        }
        if let Some(taken) = blocks.iter().find(|c| state.grid.is_occupied(c)) {
            return Ok(ActionOutcome::rejected(RejectReason::PositionOccupied)
                .with_detail(format!("coordinate occupied: {taken}")));
        }

        // Empty block sets surface as EmptyStructure and fall out as an
        // internal rejection.
        let id = state
            .structures
            .insert(Some(actor_id), kind, blocks.to_vec(), None, tick)?;
        for coord in blocks {
            state.grid.insert(VoxelBlock {
                coord: *coord,
                material: material.to_owned(),
                placed_by: Some(actor_id),
                emissive: false,
                solid: true,
            })?;
        }
        Ok(ActionOutcome::accepted(
            None,
            Some(json!({ "structure_id": id })),
            importance::STRUCTURE,
        ))
    }

    /// Speak mutates nothing but the event log; the emission payload
    /// travels in the outcome data.
    fn handle_speak(
        &self,
        state: &mut WorldState,
        actor_id: EntityId,
        text: &str,
        volume: f64,
    ) -> Result<ActionOutcome, WorldError> {
        if text.trim().is_empty() {
            return Ok(ActionOutcome::rejected(RejectReason::EmptyText));
        }
        let volume = volume.clamp(0.0, self.rules.max_speak_volume);
        let position = state.entity(actor_id).map(|e| e.position);
        Ok(ActionOutcome::accepted(
            position,
            Some(json!({ "text": text, "volume": volume })),
            importance::SPEAK,
        ))
    }

    fn handle_claim_zone(
        &self,
        state: &mut WorldState,
        actor_id: EntityId,
        min: BlockCoord,
        max: BlockCoord,
        tick: u64,
    ) -> Result<ActionOutcome, WorldError> {
        let bbox = Aabb::new(min, max);
        if !bbox.is_valid() {
            return Ok(ActionOutcome::rejected(RejectReason::InvalidZone));
        }
        let (ex, ey, ez) = bbox.extent();
        if ex > self.rules.max_zone_extent
            || ey > self.rules.max_zone_extent
            || ez > self.rules.max_zone_extent
        {
            return Ok(ActionOutcome::rejected(RejectReason::ZoneTooLarge).with_detail(
                format!("extent ({ex}, {ey}, {ez}) exceeds cap {}", self.rules.max_zone_extent),
            ));
        }

        match state.zones.claim(actor_id, bbox, tick) {
            Ok(id) => Ok(ActionOutcome::accepted(
                None,
                Some(json!({ "zone_id": id })),
                importance::ZONE,
            )),
            Err(WorldError::ZoneOverlap(existing)) => {
                Ok(ActionOutcome::rejected(RejectReason::ZoneOverlap)
                    .with_detail(format!("overlaps zone {existing}")))
            }
            Err(WorldError::InvalidZoneBox) => {
                Ok(ActionOutcome::rejected(RejectReason::InvalidZone))
            }
            Err(e) => Err(e),
        }
    }

    fn handle_write_sign(
        &self,
        state: &mut WorldState,
        actor_id: EntityId,
        coord: BlockCoord,
        text: &str,
        tick: u64,
    ) -> Result<ActionOutcome, WorldError> {
        if text.trim().is_empty() {
            return Ok(ActionOutcome::rejected(RejectReason::EmptyText));
        }
        if text.chars().count() > self.rules.max_sign_length {
            return Ok(ActionOutcome::rejected(RejectReason::TextTooLong).with_detail(format!(
                "{} characters exceeds cap {}",
                text.chars().count(),
                self.rules.max_sign_length
            )));
        }
        if state.grid.is_occupied(&coord) {
            return Ok(ActionOutcome::rejected(RejectReason::PositionOccupied));
        }

        state.grid.insert(VoxelBlock {
            coord,
            material: String::from("sign"),
            placed_by: Some(actor_id),
            emissive: true,
            solid: true,
        })?;
        let id = state.structures.insert(
            Some(actor_id),
            "sign",
            vec![coord],
            Some(text.to_owned()),
            tick,
        )?;
        Ok(ActionOutcome::accepted(
            None,
            Some(json!({ "structure_id": id })),
            importance::SIGN,
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use vivarium_entity::{Entity, Personality};
    use vivarium_types::{EventResult, Position};

    use super::*;

    fn setup() -> (WorldAuthority, WorldState, EntityId) {
        let mut state = WorldState::new();
        let id = state.insert_entity(Entity::new(
            "Asha",
            Position::new(0.5, 0.0, 0.5),
            Personality::neutral(),
            EntityClass::Citizen,
            0,
        ));
        (WorldAuthority::new(WorldRulesConfig::default()), state, id)
    }

    fn proposal(actor_id: EntityId, params: ActionParams) -> ActionProposal {
        ActionProposal {
            actor_id,
            params,
            tick: 1,
        }
    }

    #[test]
    fn move_at_exactly_the_cap_is_accepted() {
        let (authority, mut state, id) = setup();
        let cap = authority.rules().max_move_distance;

        let outcome = authority.process(
            &mut state,
            &proposal(
                id,
                ActionParams::Move {
                    dx: cap,
                    dy: 0.0,
                    dz: 0.0,
                },
            ),
        );
        assert!(outcome.is_accepted(), "{outcome:?}");

        let outcome = authority.process(
            &mut state,
            &proposal(
                id,
                ActionParams::Move {
                    dx: cap + 0.01,
                    dy: 0.0,
                    dz: 0.0,
                },
            ),
        );
        assert_eq!(outcome.reason, Some(RejectReason::MoveTooFar));
    }

    #[test]
    fn speak_clamps_volume_and_rejects_empty_text() {
        let (authority, mut state, id) = setup();

        let outcome = authority.process(
            &mut state,
            &proposal(
                id,
                ActionParams::Speak {
                    text: String::from("hello"),
                    volume: 99.0,
                },
            ),
        );
        assert!(outcome.is_accepted());
        let data = outcome.data.unwrap();
        assert!((data["volume"].as_f64().unwrap() - 10.0).abs() < 1e-9);

        let outcome = authority.process(
            &mut state,
            &proposal(
                id,
                ActionParams::Speak {
                    text: String::from("   "),
                    volume: 1.0,
                },
            ),
        );
        assert_eq!(outcome.reason, Some(RejectReason::EmptyText));
    }

    #[test]
    fn every_proposal_appends_exactly_one_event() {
        let (authority, mut state, id) = setup();
        let proposals = [
            proposal(
                id,
                ActionParams::Move {
                    dx: 1.0,
                    dy: 0.0,
                    dz: 0.0,
                },
            ),
            proposal(
                id,
                ActionParams::Move {
                    dx: 100.0,
                    dy: 0.0,
                    dz: 0.0,
                },
            ),
            proposal(
                id,
                ActionParams::Unknown {
                    name: String::from("levitate"),
                },
            ),
            proposal(EntityId::new(), ActionParams::DestroyVoxel {
                coord: BlockCoord::new(0, 0, 0),
            }),
        ];
        for (i, p) in proposals.iter().enumerate() {
            authority.process(&mut state, p);
            assert_eq!(state.events.len(), i + 1);
        }

        let results: Vec<EventResult> =
            state.events.all().iter().map(|e| e.result).collect();
        assert_eq!(
            results,
            vec![
                EventResult::Accepted,
                EventResult::Rejected,
                EventResult::Rejected,
                EventResult::Rejected,
            ]
        );
    }
}
