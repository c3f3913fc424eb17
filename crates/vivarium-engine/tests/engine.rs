//! End-to-end tick loop tests against a scripted decision service.

#![allow(clippy::unwrap_used)]

use vivarium_decision::prompt::PromptEngine;
use vivarium_decision::{DecisionService, ScriptedDecisionService};
use vivarium_engine::config::EngineConfig;
use vivarium_engine::state::WorldState;
use vivarium_engine::tick::Engine;
use vivarium_entity::needs::NeedAxis;
use vivarium_entity::personality::Personality;
use vivarium_entity::{Entity, RelationshipAxis};
use vivarium_types::{EntityClass, EntityId, Position};

fn engine_with(config: EngineConfig, service: ScriptedDecisionService) -> Engine {
    Engine::new(
        config,
        DecisionService::Scripted(service),
        PromptEngine::new().unwrap(),
        7,
    )
}

fn spawn(state: &mut WorldState, name: &str, x: f64) -> EntityId {
    state.insert_entity(Entity::new(
        name,
        Position::new(x, 0.0, 0.0),
        Personality::neutral(),
        EntityClass::Citizen,
        0,
    ))
}

#[tokio::test]
async fn intervals_gate_phases() {
    let mut engine = engine_with(
        EngineConfig::default(),
        ScriptedDecisionService::always_unavailable(),
    );
    let mut state = WorldState::new();
    spawn(&mut state, "Asha", 0.0);

    // Defaults: cognition every 5, interaction every 2, evolution every 10.
    let mut summaries = Vec::new();
    for _ in 0..4 {
        summaries.push(engine.run_tick(&mut state).await);
    }

    let at_tick_4 = &summaries[3];
    assert_eq!(at_tick_4.tick, 4);
    assert!(at_tick_4.phases_run.contains(&"age"));
    assert!(at_tick_4.phases_run.contains(&"death"));
    assert!(at_tick_4.phases_run.contains(&"interaction"));
    assert!(!at_tick_4.phases_run.contains(&"cognition"));
    assert!(!at_tick_4.phases_run.contains(&"evolution"));

    let at_tick_3 = &summaries[2];
    assert!(!at_tick_3.phases_run.contains(&"interaction"));
}

#[tokio::test]
async fn service_outage_never_fails_a_phase() {
    let mut config = EngineConfig::default();
    config.intervals.cognition = 1;
    config.intervals.interaction = 1;
    config.intervals.culture = 1;
    config.intervals.commentary = 1;
    let mut engine = engine_with(config, ScriptedDecisionService::always_unavailable());
    let mut state = WorldState::new();
    spawn(&mut state, "Asha", 0.0);
    spawn(&mut state, "Bram", 3.0);

    for _ in 0..10 {
        let summary = engine.run_tick(&mut state).await;
        assert!(
            summary.phases_failed.is_empty(),
            "phases failed on tick {}: {:?}",
            summary.tick,
            summary.phases_failed
        );
    }
    assert_eq!(state.population_alive(), 2);
}

#[tokio::test]
async fn pinned_sustenance_starves_after_the_configured_run() {
    let mut config = EngineConfig::default();
    config.lifecycle.starvation_ticks = 3;
    let mut engine = engine_with(config, ScriptedDecisionService::always_unavailable());
    let mut state = WorldState::new();
    let id = spawn(&mut state, "Asha", 0.0);
    state
        .entity_mut(id)
        .unwrap()
        .state
        .needs
        .set(NeedAxis::Sustenance, 100.0);

    let mut deaths = 0;
    for _ in 0..3 {
        deaths += engine.run_tick(&mut state).await.deaths;
    }

    assert_eq!(deaths, 1);
    let entity = state.entity(id).unwrap();
    assert!(!entity.alive);
    assert_eq!(entity.death_tick, Some(3));
    let death_events: Vec<_> = state
        .events
        .all()
        .iter()
        .filter(|e| e.event_type == "lifecycle" && e.action == "death")
        .collect();
    assert_eq!(death_events.len(), 1);
    assert_eq!(death_events[0].actor_id, Some(id));
}

#[tokio::test]
async fn hostile_neighbors_fight_even_without_narration() {
    let mut engine = engine_with(
        EngineConfig::default(),
        ScriptedDecisionService::always_unavailable(),
    );
    let mut state = WorldState::new();
    let a = spawn(&mut state, "Asha", 0.0);
    let b = spawn(&mut state, "Bram", 2.0);
    for (from, to) in [(a, b), (b, a)] {
        state
            .relationships
            .get_or_create(from, to)
            .set(RelationshipAxis::Trust, -50.0);
    }

    // Interaction fires on even ticks.
    engine.run_tick(&mut state).await;
    let summary = engine.run_tick(&mut state).await;

    assert_eq!(summary.conflicts, 1);
    let conflict_events: Vec<_> = state
        .events
        .all()
        .iter()
        .filter(|e| e.event_type == "conflict")
        .collect();
    assert_eq!(conflict_events.len(), 1);
    // Low mutual trust with mild personalities resolves territorially.
    assert_eq!(conflict_events[0].action, "territorial");
    for id in [a, b] {
        let entity = state.entity(id).unwrap();
        assert_eq!(entity.state.behavior.last_conflict_tick, Some(2));
    }
}

#[tokio::test]
async fn commentary_is_skipped_when_the_service_is_down() {
    let mut config = EngineConfig::default();
    config.intervals.commentary = 1;

    let mut engine = engine_with(
        config.clone(),
        ScriptedDecisionService::always_unavailable(),
    );
    let mut state = WorldState::new();
    spawn(&mut state, "Asha", 0.0);
    engine.run_tick(&mut state).await;
    assert!(
        !state.events.all().iter().any(|e| e.event_type == "commentary"),
        "no commentary event without an answer"
    );

    let mut engine = engine_with(config, ScriptedDecisionService::always_text("A quiet day."));
    let mut state = WorldState::new();
    spawn(&mut state, "Asha", 0.0);
    engine.run_tick(&mut state).await;
    let commentary: Vec<_> = state
        .events
        .all()
        .iter()
        .filter(|e| e.event_type == "commentary")
        .collect();
    assert_eq!(commentary.len(), 1);
    assert_eq!(commentary[0].params["text"], "A quiet day.");
}

#[tokio::test]
async fn era_summary_lands_even_without_narration() {
    let mut config = EngineConfig::default();
    config.intervals.era_length = 2;
    let mut engine = engine_with(config, ScriptedDecisionService::always_unavailable());
    let mut state = WorldState::new();
    spawn(&mut state, "Asha", 0.0);

    engine.run_tick(&mut state).await;
    engine.run_tick(&mut state).await;

    let narratives: Vec<_> = state
        .events
        .all()
        .iter()
        .filter(|e| e.event_type == "narrative")
        .collect();
    assert_eq!(narratives.len(), 1);
    assert_eq!(narratives[0].params["era"], 1);
    assert!(narratives[0].params["text"].is_null());
}

#[tokio::test]
async fn succession_eligibility_emits_an_event() {
    let mut config = EngineConfig::default();
    config.intervals.succession = 1;
    config.lifecycle.succession_pressure_threshold = 10.0;
    let mut engine = engine_with(config, ScriptedDecisionService::always_unavailable());
    let mut state = WorldState::new();
    let id = spawn(&mut state, "Asha", 0.0);
    state
        .entity_mut(id)
        .unwrap()
        .state
        .needs
        .set(NeedAxis::EvolutionPressure, 50.0);

    engine.run_tick(&mut state).await;

    let succession: Vec<_> = state
        .events
        .all()
        .iter()
        .filter(|e| e.event_type == "succession")
        .collect();
    assert_eq!(succession.len(), 1);
    assert_eq!(succession[0].actor_id, Some(id));
    assert_eq!(succession[0].action, "eligible");
}

#[tokio::test]
async fn advance_honors_speed_pause_and_cap() {
    let mut engine = engine_with(
        EngineConfig::default(),
        ScriptedDecisionService::always_unavailable(),
    );
    let mut state = WorldState::new();
    spawn(&mut state, "Asha", 0.0);

    engine.orchestrator_mut().pause();
    assert!(engine.advance(&mut state).await.is_empty());
    assert_eq!(state.tick, 0);

    engine.orchestrator_mut().resume();
    engine.orchestrator_mut().set_speed(25.0);
    // Default cap: ten ticks per invocation.
    let summaries = engine.advance(&mut state).await;
    assert_eq!(summaries.len(), 10);
    assert_eq!(state.tick, 10);
}
