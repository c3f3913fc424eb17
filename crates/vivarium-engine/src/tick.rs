//! The tick orchestrator and the per-tick phase list.
//!
//! Each tick runs a fixed ordered list of phases, most gated by
//! `tick % interval == 0` with per-phase configured intervals:
//!
//! 1. age & passive recovery (every tick)
//! 2. cognition pipeline (interval)
//! 3. interaction pipeline + conflict engine (interval)
//! 4. culture pipeline (interval)
//! 5. death resolution (every tick)
//! 6. evolution-pressure application (interval)
//! 7. ranking recomputation (interval)
//! 8. observer commentary (interval)
//! 9. narrative summary (era boundary)
//! 10. succession eligibility (interval + pressure threshold)
//!
//! A failure inside one phase is caught, logged, and recorded on the
//! [`TickSummary`]; later phases still run. Nothing below
//! [`Engine::run_tick`] escapes it.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::json;
use tracing::{debug, info, warn};
use vivarium_decision::prompt::PromptEngine;
use vivarium_decision::{DecisionError, DecisionRequest, DecisionService};
use vivarium_entity::needs::{ContextFlags, NeedAxis};
use vivarium_entity::{RelationshipAxis, RelationshipEvent};
use vivarium_events::EventDraft;
use vivarium_types::{ConflictArchetype, EntityId, EventResult};

use crate::authority::WorldAuthority;
use crate::config::EngineConfig;
use crate::conflict;
use crate::pipeline;
use crate::state::WorldState;

/// Emotional settling factor applied every tick.
const EMOTION_SETTLE: f64 = 0.05;

/// An error inside one tick phase. Caught at the orchestrator; never
/// propagates past [`Engine::run_tick`].
#[derive(Debug, thiserror::Error)]
pub enum PhaseError {
    /// A prompt template failed to render.
    #[error("template error: {source}")]
    Template {
        /// The underlying template error.
        #[from]
        source: DecisionError,
    },

    /// An unexpected internal failure.
    #[error("{0}")]
    Internal(String),
}

/// Speed and pause control for tick replay.
///
/// Sub-1 speeds accumulate fractionally and fire a tick once the
/// accumulator reaches 1; speeds of 2 and above replay that many ticks
/// per invocation, bounded by the configured cap.
#[derive(Debug, Clone)]
pub struct TickOrchestrator {
    speed: f64,
    accumulator: f64,
    paused: bool,
}

impl Default for TickOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl TickOrchestrator {
    /// An orchestrator at speed 1, unpaused.
    pub const fn new() -> Self {
        Self {
            speed: 1.0,
            accumulator: 0.0,
            paused: false,
        }
    }

    /// Set the replay speed; negative values are treated as zero.
    pub const fn set_speed(&mut self, speed: f64) {
        self.speed = if speed < 0.0 { 0.0 } else { speed };
    }

    /// The current replay speed.
    pub const fn speed(&self) -> f64 {
        self.speed
    }

    /// Suppress ticking entirely.
    pub const fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume ticking.
    pub const fn resume(&mut self) {
        self.paused = false;
    }

    /// Whether ticking is suppressed.
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// How many ticks to replay for this invocation, at most `cap`.
    pub fn due_ticks(&mut self, cap: u32) -> u32 {
        if self.paused {
            return 0;
        }
        self.accumulator += self.speed;
        if self.accumulator < 1.0 {
            return 0;
        }
        let due = self.accumulator.floor();
        if due >= f64::from(cap) {
            // Drop the excess rather than letting a stall replay forever.
            self.accumulator = 0.0;
            cap
        } else {
            self.accumulator -= due;
            due as u32
        }
    }
}

/// Summary of one executed tick.
#[derive(Debug, Clone, Default)]
pub struct TickSummary {
    /// The tick that ran.
    pub tick: u64,
    /// Phases that completed.
    pub phases_run: Vec<&'static str>,
    /// Phases that failed and were skipped past.
    pub phases_failed: Vec<&'static str>,
    /// Entities that died this tick.
    pub deaths: usize,
    /// Conflicts resolved this tick.
    pub conflicts: usize,
}

/// A candidate pair for the interaction phase that turned hostile.
struct ConflictPair {
    a: EntityId,
    b: EntityId,
    archetype: ConflictArchetype,
}

/// One sampled group for the culture phase.
struct CultureGroup {
    members: Vec<EntityId>,
}

/// The engine: World Authority plus the tick phase driver.
pub struct Engine {
    config: EngineConfig,
    authority: WorldAuthority,
    service: DecisionService,
    prompts: PromptEngine,
    orchestrator: TickOrchestrator,
    rng: StdRng,
}

impl Engine {
    /// Create an engine from configuration, a decision service, prompt
    /// templates, and an RNG seed.
    pub fn new(
        config: EngineConfig,
        service: DecisionService,
        prompts: PromptEngine,
        seed: u64,
    ) -> Self {
        let authority = WorldAuthority::new(config.world.clone());
        Self {
            config,
            authority,
            service,
            prompts,
            orchestrator: TickOrchestrator::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// The World Authority, for submitting proposals outside the tick.
    pub const fn authority(&self) -> &WorldAuthority {
        &self.authority
    }

    /// The engine configuration.
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Speed and pause control.
    pub const fn orchestrator_mut(&mut self) -> &mut TickOrchestrator {
        &mut self.orchestrator
    }

    /// Run however many ticks are due at the current speed.
    pub async fn advance(&mut self, state: &mut WorldState) -> Vec<TickSummary> {
        let due = self
            .orchestrator
            .due_ticks(self.config.clock.max_ticks_per_advance);
        let mut summaries = Vec::with_capacity(due as usize);
        for _ in 0..due {
            summaries.push(self.run_tick(state).await);
        }
        summaries
    }

    /// Execute one full tick. Never errors: phase failures are caught,
    /// logged, and recorded on the summary.
    pub async fn run_tick(&mut self, state: &mut WorldState) -> TickSummary {
        state.tick += 1;
        let tick = state.tick;
        let intervals = self.config.intervals.clone();
        let mut summary = TickSummary {
            tick,
            ..TickSummary::default()
        };

        record(&mut summary, "age", self.phase_age(state));

        if due(tick, intervals.cognition) {
            let result = self.phase_cognition(state).await;
            record(&mut summary, "cognition", result);
        }
        if due(tick, intervals.interaction) {
            let result = self.phase_interaction(state).await;
            if let Some(conflicts) = record(&mut summary, "interaction", result) {
                summary.conflicts = conflicts;
            }
        }
        if due(tick, intervals.culture) {
            let result = self.phase_culture(state).await;
            record(&mut summary, "culture", result);
        }

        if let Some(deaths) = record(&mut summary, "death", self.phase_death(state)) {
            summary.deaths = deaths;
        }

        if due(tick, intervals.evolution) {
            record(&mut summary, "evolution", self.phase_evolution(state));
        }
        if due(tick, intervals.ranking) {
            record(&mut summary, "ranking", self.phase_ranking(state));
        }
        if due(tick, intervals.commentary) {
            let result = self.phase_commentary(state).await;
            record(&mut summary, "commentary", result);
        }
        if due(tick, intervals.era_length) {
            let result = self.phase_narrative(state).await;
            record(&mut summary, "narrative", result);
        }
        if due(tick, intervals.succession) {
            record(&mut summary, "succession", self.phase_succession(state));
        }

        info!(
            tick,
            alive = state.population_alive(),
            conflicts = summary.conflicts,
            deaths = summary.deaths,
            failed = summary.phases_failed.len(),
            "tick complete"
        );
        summary
    }

    /// Phase 1: needs accumulation, emotional settling, memory expiry,
    /// and the interval-gated relationship decay sweep.
    fn phase_age(&mut self, state: &mut WorldState) -> Result<(), PhaseError> {
        let needs_config = &self.config.needs;
        let WorldState {
            tick,
            entities,
            zones,
            relationships,
            ..
        } = state;
        let tick = *tick;

        for entity in entities.values_mut().filter(|e| e.alive) {
            let flags = ContextFlags {
                secure: zones.owner_covering(&entity.position.block()) == Some(entity.id),
                ..ContextFlags::default()
            };
            entity
                .state
                .needs
                .update(&entity.personality, &flags, needs_config);
            entity.state.emotion.settle(EMOTION_SETTLE);
            entity.state.memory.sweep_expired(tick);
        }

        if due(tick, self.config.intervals.relationship_decay) {
            relationships.decay_all();
        }
        Ok(())
    }

    /// Phase 2: reflection decisions through the pipeline. Each entity's
    /// decision lands as its `focus` semantic fact.
    async fn phase_cognition(&mut self, state: &mut WorldState) -> Result<(), PhaseError> {
        let config = &self.config;
        let prompts = &self.prompts;
        let service = &self.service;
        let rng = &mut self.rng;
        let tick = state.tick;

        let candidates =
            pipeline::sample_batch(state.alive_ids(), config.pipeline.batch_size, rng);

        pipeline::run(
            "cognition",
            state,
            candidates,
            |state, id| -> Result<DecisionRequest, PhaseError> {
                let entity = state
                    .entity(*id)
                    .ok_or_else(|| PhaseError::Internal(format!("entity {id} vanished")))?;
                let needs: Vec<String> = NeedAxis::ALL
                    .iter()
                    .map(|&axis| format!("{axis:?}: {:.0}", entity.state.needs.get(axis)))
                    .collect();
                let memories: Vec<&str> = entity
                    .state
                    .memory
                    .episodic()
                    .iter()
                    .map(|m| m.summary.as_str())
                    .take(5)
                    .collect();
                let prompt = prompts.render(
                    "cognition",
                    &json!({
                        "name": entity.name,
                        "tick": tick,
                        "needs": needs.join(", "),
                        "memories": memories.join("; "),
                    }),
                )?;
                Ok(DecisionRequest {
                    prompt,
                    max_tokens: config.decision.max_tokens,
                    structured_output: true,
                    importance: 0.3,
                })
            },
            |request| async move { service.decide(&request).await.structured() },
            |state, id, decision| {
                let focus = decision
                    .get("focus")
                    .and_then(serde_json::Value::as_str)
                    .ok_or_else(|| PhaseError::Internal(String::from("decision missing focus")))?
                    .to_owned();
                if let Some(entity) = state.entity_mut(*id) {
                    entity.state.memory.upsert_semantic("focus", focus, 0.8, tick);
                    if let Some(note) = decision.get("note").and_then(serde_json::Value::as_str) {
                        entity.state.memory.add_episodic(
                            note.to_owned(),
                            0.2,
                            tick,
                            Vec::new(),
                            None,
                            "reflection",
                            &config.memory,
                        );
                    }
                }
                Ok(())
            },
        )
        .await;
        Ok(())
    }

    /// Phase 3: sampled pair interactions. Hostile pairs go through the
    /// conflict engine; the rest exchange a friendly decision. Returns
    /// the number of conflicts resolved.
    async fn phase_interaction(&mut self, state: &mut WorldState) -> Result<usize, PhaseError> {
        let config = &self.config;
        let prompts = &self.prompts;
        let service = &self.service;
        let rng = &mut self.rng;
        let tick = state.tick;

        let ids = state.alive_ids();
        let mut pairs = Vec::new();
        for (i, &a) in ids.iter().enumerate() {
            for &b in ids.iter().skip(i + 1) {
                let close = match (state.entity(a), state.entity(b)) {
                    (Some(ea), Some(eb)) => {
                        ea.position.distance_to(&eb.position) <= config.world.interaction_radius
                    }
                    _ => false,
                };
                if close {
                    pairs.push((a, b));
                }
            }
        }
        let pairs = pipeline::sample_batch(pairs, config.pipeline.batch_size, rng);

        let mut conflicts = Vec::new();
        let mut friendly = Vec::new();
        for (a, b) in pairs {
            let (Some(ea), Some(eb)) = (state.entity(a), state.entity(b)) else {
                continue;
            };
            let relationship = state.relationships.get(a, b);
            match conflict::should_conflict(ea, eb, relationship, &config.conflict, rng) {
                Some(archetype) => conflicts.push(ConflictPair { a, b, archetype }),
                None => friendly.push((a, b)),
            }
        }

        let conflict_report = pipeline::run(
            "conflict",
            state,
            conflicts,
            |state, pair| -> Result<DecisionRequest, PhaseError> {
                let a = state
                    .entity(pair.a)
                    .ok_or_else(|| PhaseError::Internal(format!("entity {} vanished", pair.a)))?;
                let b = state
                    .entity(pair.b)
                    .ok_or_else(|| PhaseError::Internal(format!("entity {} vanished", pair.b)))?;
                Ok(conflict::narration_request(prompts, a, b, pair.archetype, tick)?)
            },
            // The narration is optional but the conflict is not: wrap in
            // Some so the effects always apply in phase 3.
            |request| async move { Some(service.decide(&request).await.text()) },
            |state, pair, narration| {
                let a = state
                    .entity(pair.a)
                    .cloned()
                    .ok_or_else(|| PhaseError::Internal(format!("entity {} vanished", pair.a)))?;
                let b = state
                    .entity(pair.b)
                    .cloned()
                    .ok_or_else(|| PhaseError::Internal(format!("entity {} vanished", pair.b)))?;
                let outcome = conflict::resolve(&a, &b, pair.archetype, narration, rng);
                conflict::apply_outcome(
                    state,
                    &outcome,
                    tick,
                    &config.conflict,
                    &config.memory,
                    rng,
                );
                Ok(())
            },
        )
        .await;

        pipeline::run(
            "interaction",
            state,
            friendly,
            |state, &(a, b)| -> Result<DecisionRequest, PhaseError> {
                let ea = state
                    .entity(a)
                    .ok_or_else(|| PhaseError::Internal(format!("entity {a} vanished")))?;
                let eb = state
                    .entity(b)
                    .ok_or_else(|| PhaseError::Internal(format!("entity {b} vanished")))?;
                let disposition = state.relationships.get(a, b).map_or_else(
                    || String::from("strangers"),
                    |rel| {
                        format!(
                            "trust {:.0}, affection {:.0}",
                            rel.get(RelationshipAxis::Trust),
                            rel.get(RelationshipAxis::Affection)
                        )
                    },
                );
                let prompt = prompts.render(
                    "interaction",
                    &json!({
                        "a_name": ea.name,
                        "b_name": eb.name,
                        "tick": tick,
                        "disposition": disposition,
                    }),
                )?;
                Ok(DecisionRequest {
                    prompt,
                    max_tokens: config.decision.max_tokens,
                    structured_output: true,
                    importance: 0.3,
                })
            },
            |request| async move { service.decide(&request).await.structured() },
            |state, &(a, b), decision| {
                let hostile_tone = decision
                    .get("tone")
                    .and_then(serde_json::Value::as_str)
                    .is_some_and(|t| t.eq_ignore_ascii_case("hostile"));
                let (event, magnitude) = if hostile_tone {
                    (RelationshipEvent::Insult, 0.5)
                } else {
                    (RelationshipEvent::Conversation, 1.0)
                };
                state.relationships.apply_event(a, b, event, magnitude, tick);
                state.relationships.apply_event(b, a, event, magnitude, tick);

                for (id, other) in [(a, b), (b, a)] {
                    let other_name = state
                        .entity(other)
                        .map_or_else(|| other.to_string(), |e| e.name.clone());
                    if let Some(entity) = state.entity_mut(id) {
                        let social = entity.state.needs.get(NeedAxis::Social);
                        entity
                            .state
                            .needs
                            .set(NeedAxis::Social, social - config.needs.discharge_amount);
                        entity.state.memory.add_episodic(
                            format!("talked with {other_name}"),
                            0.2,
                            tick,
                            vec![other],
                            None,
                            "social",
                            &config.memory,
                        );
                    }
                }
                Ok(())
            },
        )
        .await;

        Ok(conflict_report.applied)
    }

    /// Phase 4: cultural drift. One sampled group per run; an emerged
    /// concept lands as a shared semantic fact.
    async fn phase_culture(&mut self, state: &mut WorldState) -> Result<(), PhaseError> {
        let config = &self.config;
        let prompts = &self.prompts;
        let service = &self.service;
        let rng = &mut self.rng;
        let tick = state.tick;

        let members =
            pipeline::sample_batch(state.alive_ids(), config.pipeline.batch_size, rng);
        if members.len() < 2 {
            return Ok(());
        }
        let groups = vec![CultureGroup { members }];

        pipeline::run(
            "culture",
            state,
            groups,
            |state, group| -> Result<DecisionRequest, PhaseError> {
                let window = tick.saturating_sub(config.intervals.culture);
                let shared: Vec<String> = state
                    .events
                    .since_tick(window)
                    .filter(|e| e.result == EventResult::Accepted)
                    .map(|e| e.action.clone())
                    .take(10)
                    .collect();
                let prompt = prompts.render(
                    "culture",
                    &json!({
                        "group_size": group.members.len(),
                        "shared_events": shared.join(", "),
                    }),
                )?;
                Ok(DecisionRequest {
                    prompt,
                    max_tokens: config.decision.max_tokens,
                    structured_output: true,
                    importance: 0.4,
                })
            },
            |request| async move { service.decide(&request).await.structured() },
            |state, group, decision| {
                let concept = decision
                    .get("concept")
                    .and_then(serde_json::Value::as_str)
                    .ok_or_else(|| PhaseError::Internal(String::from("decision missing concept")))?
                    .to_owned();
                let description = decision
                    .get("description")
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or("")
                    .to_owned();

                for id in &group.members {
                    if let Some(entity) = state.entity_mut(*id) {
                        entity.state.memory.upsert_semantic(
                            format!("culture:{concept}"),
                            description.clone(),
                            0.6,
                            tick,
                        );
                    }
                }
                state.events.append(EventDraft {
                    tick,
                    actor_id: None,
                    event_type: String::from("culture"),
                    action: String::from("concept"),
                    params: json!({ "concept": concept, "description": description }),
                    result: EventResult::Accepted,
                    reason: None,
                    position: None,
                    importance: 0.5,
                });
                Ok(())
            },
        )
        .await;
        Ok(())
    }

    /// Phase 5: death resolution. An entity pinned at maximum sustenance
    /// for the configured run of ticks starves.
    fn phase_death(&mut self, state: &mut WorldState) -> Result<usize, PhaseError> {
        let threshold = self.config.lifecycle.starvation_ticks;
        let tick = state.tick;

        let mut deaths = Vec::new();
        for id in state.alive_ids() {
            let starving = state
                .entity(id)
                .is_some_and(|e| e.state.needs.get(NeedAxis::Sustenance) >= 100.0);
            if starving {
                let streak = state.starvation.entry(id).or_insert(0);
                *streak += 1;
                if *streak >= threshold {
                    deaths.push(id);
                }
            } else {
                state.starvation.remove(&id);
            }
        }

        for id in &deaths {
            let position = state.entity(*id).map(|e| e.position);
            if let Some(entity) = state.entity_mut(*id) {
                entity.kill(tick);
            }
            state.starvation.remove(id);
            state.events.append(EventDraft {
                tick,
                actor_id: Some(*id),
                event_type: String::from("lifecycle"),
                action: String::from("death"),
                params: json!({ "cause": "starvation" }),
                result: EventResult::Accepted,
                reason: None,
                position,
                importance: 0.9,
            });
            warn!(entity = %id, tick, "entity starved");
        }
        Ok(deaths.len())
    }

    /// Phase 6: apply the rank signal to evolution pressure and refresh
    /// behavior modes.
    fn phase_evolution(&mut self, state: &mut WorldState) -> Result<(), PhaseError> {
        let pressure_config = &self.config.pressure;
        let WorldState {
            entities, rankings, ..
        } = state;

        for entity in entities.values_mut().filter(|e| e.alive) {
            let signal = rankings.get(&entity.id).copied().unwrap_or(0.0);
            entity
                .state
                .needs
                .apply_rank_signal(signal, entity.class, pressure_config);
            entity.state.behavior.mode = entity.state.needs.behavior_mode(pressure_config);
        }
        Ok(())
    }

    /// Phase 7: recompute rank signals from recent event prominence.
    ///
    /// Entities with the least recent accepted-event importance sit at
    /// the bottom of the ranking and receive the strongest signal.
    fn phase_ranking(&mut self, state: &mut WorldState) -> Result<(), PhaseError> {
        let window = state.tick.saturating_sub(self.config.intervals.ranking);

        let mut scores: BTreeMap<EntityId, f64> =
            state.alive_ids().into_iter().map(|id| (id, 0.0)).collect();
        for event in state.events.since_tick(window) {
            if event.result != EventResult::Accepted {
                continue;
            }
            if let Some(actor) = event.actor_id
                && let Some(score) = scores.get_mut(&actor)
            {
                *score += event.importance;
            }
        }

        let mut ordered: Vec<(EntityId, f64)> = scores.into_iter().collect();
        ordered.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(core::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });

        let count = ordered.len();
        state.rankings.clear();
        for (idx, (id, _)) in ordered.into_iter().enumerate() {
            let signal = if count <= 1 {
                0.0
            } else {
                idx as f64 / (count - 1) as f64
            };
            state.rankings.insert(id, signal);
        }
        Ok(())
    }

    /// Phase 8: one observer commentary call; unavailability skips the
    /// event quietly.
    async fn phase_commentary(&mut self, state: &mut WorldState) -> Result<(), PhaseError> {
        let tick = state.tick;
        let window = tick.saturating_sub(self.config.intervals.commentary);
        let recent: Vec<String> = state
            .events
            .all()
            .iter()
            .rev()
            .filter(|e| e.tick >= window)
            .take(5)
            .map(|e| format!("{} ({})", e.action, e.event_type))
            .collect();
        let prompt = self.prompts.render(
            "commentary",
            &json!({
                "tick": tick,
                "population": state.population_alive(),
                "events": recent.join("; "),
            }),
        )?;

        let outcome = self
            .service
            .decide(&DecisionRequest {
                prompt,
                max_tokens: self.config.decision.max_tokens,
                structured_output: false,
                importance: 0.2,
            })
            .await;

        match outcome.text() {
            Some(text) => {
                state.events.append(EventDraft {
                    tick,
                    actor_id: None,
                    event_type: String::from("commentary"),
                    action: String::from("observer"),
                    params: json!({ "text": text }),
                    result: EventResult::Accepted,
                    reason: None,
                    position: None,
                    importance: 0.2,
                });
            }
            None => debug!(tick, "commentary unavailable, skipping"),
        }
        Ok(())
    }

    /// Phase 9: era-boundary narrative summary. The milestone event is
    /// appended whether or not the service produced text.
    async fn phase_narrative(&mut self, state: &mut WorldState) -> Result<(), PhaseError> {
        let tick = state.tick;
        let era_length = self.config.intervals.era_length;
        let era = tick / era_length.max(1);
        let era_start = tick.saturating_sub(era_length);

        let deaths = state
            .entities
            .values()
            .filter(|e| e.death_tick.is_some_and(|t| t > era_start))
            .count();
        let notable: Vec<String> = state
            .events
            .since_tick(era_start)
            .filter(|e| e.importance >= 0.5)
            .map(|e| format!("{} ({})", e.action, e.event_type))
            .take(10)
            .collect();

        let prompt = self.prompts.render(
            "narrative",
            &json!({
                "era": era,
                "tick": tick,
                "population": state.population_alive(),
                "deaths": deaths,
                "events": notable.join("; "),
            }),
        )?;
        let text = self
            .service
            .decide(&DecisionRequest {
                prompt,
                max_tokens: self.config.decision.max_tokens,
                structured_output: false,
                // Era summaries are worth the escalation backend.
                importance: 0.9,
            })
            .await
            .text();

        state.events.append(EventDraft {
            tick,
            actor_id: None,
            event_type: String::from("narrative"),
            action: String::from("era_summary"),
            params: json!({ "era": era, "text": text }),
            result: EventResult::Accepted,
            reason: None,
            position: None,
            importance: 0.8,
        });
        Ok(())
    }

    /// Phase 10: emit a succession-eligibility event for the entity with
    /// the highest evolution pressure, when it crosses the threshold.
    fn phase_succession(&mut self, state: &mut WorldState) -> Result<(), PhaseError> {
        let threshold = self.config.lifecycle.succession_pressure_threshold;
        let tick = state.tick;

        let candidate = state
            .entities
            .values()
            .filter(|e| e.alive)
            .map(|e| (e.id, e.state.needs.get(NeedAxis::EvolutionPressure)))
            .filter(|&(_, pressure)| pressure >= threshold)
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(core::cmp::Ordering::Equal));

        if let Some((id, pressure)) = candidate {
            info!(entity = %id, pressure, "succession eligibility reached");
            state.events.append(EventDraft {
                tick,
                actor_id: Some(id),
                event_type: String::from("succession"),
                action: String::from("eligible"),
                params: json!({ "pressure": pressure }),
                result: EventResult::Accepted,
                reason: None,
                position: None,
                importance: 1.0,
            });
        }
        Ok(())
    }
}

/// Whether an interval-gated phase fires this tick. Zero disables.
const fn due(tick: u64, interval: u64) -> bool {
    interval != 0 && tick % interval == 0
}

/// Record one phase result on the summary; failures are logged and
/// isolated.
fn record<T>(
    summary: &mut TickSummary,
    phase: &'static str,
    result: Result<T, PhaseError>,
) -> Option<T> {
    match result {
        Ok(value) => {
            summary.phases_run.push(phase);
            Some(value)
        }
        Err(e) => {
            warn!(phase, error = %e, "phase failed, continuing");
            summary.phases_failed.push(phase);
            None
        }
    }
}
