//! Conflict detection and resolution.
//!
//! Detection ([`should_conflict`]) is a pure function over two entities
//! and their (optional) directional relationship, evaluated in a fixed
//! precedence. Resolution splits into three steps so the interaction
//! phase can route narration through the decision pipeline:
//! [`narration_request`] builds the service call, [`resolve`] picks the
//! winner (narration parse, then deterministic fallback), and
//! [`apply_outcome`] lands the effects -- which run unconditionally,
//! narration or not.

use rand::Rng;
use rand::rngs::StdRng;
use serde_json::json;
use tracing::debug;
use vivarium_decision::{DecisionError, DecisionRequest};
use vivarium_decision::prompt::PromptEngine;
use vivarium_entity::needs::NeedAxis;
use vivarium_entity::personality::{Personality, PersonalityAxis};
use vivarium_entity::{Entity, Relationship, RelationshipAxis, RelationshipEvent};
use vivarium_events::EventDraft;
use vivarium_types::{BehaviorMode, ConflictArchetype, EntityId, EventResult};

use crate::config::ConflictConfig;
use crate::state::WorldState;

/// The five opposing personality axes divergence is computed over, with
/// their weights.
const DIVERGENCE_AXES: [(PersonalityAxis, f64); 5] = [
    (PersonalityAxis::Aggression, 1.0),
    (PersonalityAxis::Dominance, 0.9),
    (PersonalityAxis::Pride, 0.7),
    (PersonalityAxis::Honesty, 0.5),
    (PersonalityAxis::Stoicism, 0.4),
];

/// Token budget for narration calls.
const NARRATION_MAX_TOKENS: u32 = 200;

/// Jitter range applied to each side's fallback score.
const JITTER_LOW: f64 = 0.8;
const JITTER_HIGH: f64 = 1.2;

/// Weighted personality divergence between two entities.
pub fn divergence(a: &Personality, b: &Personality) -> f64 {
    DIVERGENCE_AXES
        .iter()
        .map(|&(axis, weight)| weight * (a.get(axis) - b.get(axis)).abs())
        .sum()
}

/// Decide whether a meeting between `a` and `b` turns into a conflict,
/// and of which archetype. Evaluated in fixed precedence; the first
/// matching rule wins.
pub fn should_conflict(
    a: &Entity,
    b: &Entity,
    relationship: Option<&Relationship>,
    config: &ConflictConfig,
    rng: &mut StdRng,
) -> Option<ConflictArchetype> {
    // Rampage overrides everything.
    if a.state.behavior.mode == BehaviorMode::Rampage
        || b.state.behavior.mode == BehaviorMode::Rampage
    {
        return Some(ConflictArchetype::Duel);
    }

    let div = divergence(&a.personality, &b.personality);
    let max_aggression = a
        .personality
        .get(PersonalityAxis::Aggression)
        .max(b.personality.get(PersonalityAxis::Aggression));
    let hostile = relationship.is_some_and(|rel| {
        rel.get(RelationshipAxis::Trust) < config.hostility_trust_threshold
            || rel.get(RelationshipAxis::Anger) > config.anger_threshold
            || rel.get(RelationshipAxis::Rivalry) > config.rivalry_threshold
    });

    if hostile && max_aggression > 0.7 {
        return Some(ConflictArchetype::Duel);
    }
    if hostile && div > config.divergence_threshold {
        return Some(ConflictArchetype::Debate);
    }
    if div > 1.5 * config.divergence_threshold && max_aggression > 0.6 {
        return Some(if rng.random_bool(0.5) {
            ConflictArchetype::Debate
        } else {
            ConflictArchetype::Duel
        });
    }
    if hostile {
        return Some(ConflictArchetype::Territorial);
    }

    let spontaneous = (config.duel_base_chance * max_aggression).clamp(0.0, 1.0);
    if spontaneous > 0.0 && rng.random_bool(spontaneous) {
        return Some(ConflictArchetype::Duel);
    }
    None
}

/// Build the narration request for a detected conflict.
///
/// # Errors
///
/// Returns [`DecisionError::Template`] if the conflict template fails to
/// render.
pub fn narration_request(
    prompts: &PromptEngine,
    a: &Entity,
    b: &Entity,
    archetype: ConflictArchetype,
    tick: u64,
) -> Result<DecisionRequest, DecisionError> {
    let prompt = prompts.render(
        "conflict",
        &json!({
            "archetype": archetype.to_string(),
            "a_name": a.name,
            "b_name": b.name,
            "tick": tick,
            "a_aggression": a.personality.get(PersonalityAxis::Aggression),
            "a_pride": a.personality.get(PersonalityAxis::Pride),
            "b_aggression": b.personality.get(PersonalityAxis::Aggression),
            "b_pride": b.personality.get(PersonalityAxis::Pride),
        }),
    )?;
    Ok(DecisionRequest {
        prompt,
        max_tokens: NARRATION_MAX_TOKENS,
        structured_output: false,
        // Duels matter more than debates for escalation routing.
        importance: match archetype {
            ConflictArchetype::Duel => 0.7,
            ConflictArchetype::Territorial => 0.5,
            ConflictArchetype::Debate => 0.4,
        },
    })
}

/// A fully resolved conflict, ready to apply.
#[derive(Debug, Clone)]
pub struct ConflictOutcome {
    /// The conflict archetype.
    pub archetype: ConflictArchetype,
    /// The winning entity.
    pub winner: EntityId,
    /// The losing entity.
    pub loser: EntityId,
    /// The narration, when the service produced one.
    pub narration: Option<String>,
    /// Whether the winner came from the deterministic fallback rather
    /// than the narration.
    pub fallback_used: bool,
}

/// Pick the winner: parse the narration by case-insensitive name
/// substring; on ambiguity or no narration, fall back to the
/// deterministic per-archetype score with independent jitter per side.
pub fn resolve(
    a: &Entity,
    b: &Entity,
    archetype: ConflictArchetype,
    narration: Option<String>,
    rng: &mut StdRng,
) -> ConflictOutcome {
    let parsed = narration.as_deref().and_then(|text| parse_winner(text, a, b));

    let (winner, fallback_used) = match parsed {
        Some(id) => (id, false),
        None => {
            let score_a = fallback_score(a, archetype) * rng.random_range(JITTER_LOW..=JITTER_HIGH);
            let score_b = fallback_score(b, archetype) * rng.random_range(JITTER_LOW..=JITTER_HIGH);
            debug!(
                a = %a.name,
                b = %b.name,
                score_a,
                score_b,
                "narration inconclusive, deterministic fallback"
            );
            (if score_a >= score_b { a.id } else { b.id }, true)
        }
    };
    let loser = if winner == a.id { b.id } else { a.id };

    ConflictOutcome {
        archetype,
        winner,
        loser,
        narration,
        fallback_used,
    }
}

/// The winner named by the narration, if exactly one name appears.
fn parse_winner(narration: &str, a: &Entity, b: &Entity) -> Option<EntityId> {
    let text = narration.to_lowercase();
    let a_named = text.contains(&a.name.to_lowercase());
    let b_named = text.contains(&b.name.to_lowercase());
    match (a_named, b_named) {
        (true, false) => Some(a.id),
        (false, true) => Some(b.id),
        // Both or neither named: ambiguous.
        _ => None,
    }
}

/// Deterministic per-archetype strength: weighted personality axes minus
/// a fatigue penalty.
fn fallback_score(entity: &Entity, archetype: ConflictArchetype) -> f64 {
    let p = &entity.personality;
    let base = match archetype {
        ConflictArchetype::Debate => {
            0.4 * p.get(PersonalityAxis::Creativity)
                + 0.3 * p.get(PersonalityAxis::Curiosity)
                + 0.3 * p.get(PersonalityAxis::Patience)
        }
        ConflictArchetype::Duel => {
            0.5 * p.get(PersonalityAxis::Aggression)
                + 0.3 * p.get(PersonalityAxis::Dominance)
                + 0.2 * p.get(PersonalityAxis::Stoicism)
        }
        ConflictArchetype::Territorial => {
            0.4 * p.get(PersonalityAxis::Dominance)
                + 0.3 * p.get(PersonalityAxis::Caution)
                + 0.3 * p.get(PersonalityAxis::Pride)
        }
    };
    let fatigue = entity.state.needs.get(NeedAxis::Rest) / 100.0;
    base * (1.0 - 0.5 * fatigue)
}

/// Episodic importance of a conflict, by archetype.
const fn conflict_importance(archetype: ConflictArchetype) -> f64 {
    match archetype {
        ConflictArchetype::Debate => 0.4,
        ConflictArchetype::Territorial => 0.6,
        ConflictArchetype::Duel => 0.8,
    }
}

/// Apply a resolved conflict to world state: archetype effects, one
/// episodic memory per participant, relationship updates in both
/// directions, and exactly one event-log entry.
pub fn apply_outcome(
    state: &mut WorldState,
    outcome: &ConflictOutcome,
    tick: u64,
    config: &ConflictConfig,
    memory: &vivarium_entity::MemoryConfig,
    rng: &mut StdRng,
) {
    let importance = conflict_importance(outcome.archetype);

    apply_effects(state, outcome, config, rng);

    // Relationship updates run in both directions: each side saw the
    // other act against it, and the loser additionally registers the
    // defeat.
    let hostility = match outcome.archetype {
        ConflictArchetype::Duel => RelationshipEvent::Attack,
        ConflictArchetype::Debate | ConflictArchetype::Territorial => RelationshipEvent::Insult,
    };
    state
        .relationships
        .apply_event(outcome.winner, outcome.loser, hostility, 1.0, tick);
    state
        .relationships
        .apply_event(outcome.loser, outcome.winner, hostility, 1.0, tick);
    state
        .relationships
        .apply_event(outcome.loser, outcome.winner, RelationshipEvent::RivalryLoss, 1.0, tick);

    for (id, other, won) in [
        (outcome.winner, outcome.loser, true),
        (outcome.loser, outcome.winner, false),
    ] {
        let other_name = state
            .entity(other)
            .map_or_else(|| other.to_string(), |e| e.name.clone());
        if let Some(entity) = state.entity_mut(id) {
            let verb = if won { "won" } else { "lost" };
            let location = Some(entity.position);
            entity.state.memory.add_episodic(
                format!("{verb} a {} against {other_name}", outcome.archetype),
                importance,
                tick,
                vec![other],
                location,
                "conflict",
                memory,
            );
            entity.state.behavior.last_conflict_tick = Some(tick);
            if won {
                entity.state.emotion.shift(0.2, 0.1);
            } else {
                entity.state.emotion.shift(-0.3, 0.2);
            }
        }
    }

    let position = state.entity(outcome.winner).map(|e| e.position);
    state.events.append(EventDraft {
        tick,
        actor_id: Some(outcome.winner),
        event_type: String::from("conflict"),
        action: outcome.archetype.to_string(),
        params: json!({
            "winner": outcome.winner,
            "loser": outcome.loser,
            "fallback": outcome.fallback_used,
            "narration": outcome.narration,
        }),
        result: EventResult::Accepted,
        reason: None,
        position,
        importance,
    });
}

/// Archetype-specific energy and awareness effects, plus territorial
/// displacement. Energy loss lands as fatigue (the `rest` need);
/// awareness gain discharges `stimulation`.
fn apply_effects(
    state: &mut WorldState,
    outcome: &ConflictOutcome,
    config: &ConflictConfig,
    rng: &mut StdRng,
) {
    let (winner_fatigue, loser_fatigue) = match outcome.archetype {
        ConflictArchetype::Debate => (config.debate_energy_cost, config.debate_energy_cost),
        ConflictArchetype::Duel => (-config.duel_energy_gain, config.duel_energy_cost),
        ConflictArchetype::Territorial => (
            config.territorial_energy_cost,
            config.territorial_energy_cost + config.territorial_loser_extra,
        ),
    };

    if let Some(winner) = state.entity_mut(outcome.winner) {
        let needs = &mut winner.state.needs;
        needs.set(NeedAxis::Rest, needs.get(NeedAxis::Rest) + winner_fatigue);
        // Territorial wins carry no awareness gain.
        if matches!(
            outcome.archetype,
            ConflictArchetype::Debate | ConflictArchetype::Duel
        ) {
            needs.set(
                NeedAxis::Stimulation,
                needs.get(NeedAxis::Stimulation) - config.awareness_gain,
            );
        }
    }
    if let Some(loser) = state.entity_mut(outcome.loser) {
        let needs = &mut loser.state.needs;
        needs.set(NeedAxis::Rest, needs.get(NeedAxis::Rest) + loser_fatigue);

        if outcome.archetype == ConflictArchetype::Territorial {
            let angle = rng.random_range(0.0..core::f64::consts::TAU);
            let dx = angle.cos() * config.displacement_distance;
            let dz = angle.sin() * config.displacement_distance;
            loser.position = loser.position.offset(dx, 0.0, dz);
        }
    }
}
