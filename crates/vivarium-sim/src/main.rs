//! Simulation entry point for the Vivarium world.
//!
//! Wires configuration, the decision service, and prompt templates into
//! an [`Engine`], seeds a founding population, and drives the tick loop
//! on a wall-clock interval. Everything is environment-configured:
//!
//! - `VIVARIUM_CONFIG`: path to a YAML engine configuration file
//! - `VIVARIUM_TEMPLATES`: directory of prompt template overrides
//! - `VIVARIUM_API_URL` / `VIVARIUM_API_KEY` / `VIVARIUM_MODEL` /
//!   `VIVARIUM_BACKEND`: primary LLM backend; without an API URL the
//!   world runs offline on fallback behavior
//! - `VIVARIUM_ESCALATION_MODEL`: optional stronger model for
//!   high-importance decisions
//! - `VIVARIUM_SEED`: RNG seed; defaults to the current time
//! - `VIVARIUM_TICK_MS`: wall-clock milliseconds per tick

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;
use tracing_subscriber::EnvFilter;
use vivarium_decision::prompt::PromptEngine;
use vivarium_decision::{
    BackendKind, DecisionService, LlmBackend, LlmBackendConfig, LlmService,
    ScriptedDecisionService, profile,
};
use vivarium_engine::config::EngineConfig;
use vivarium_engine::state::WorldState;
use vivarium_engine::tick::Engine;
use vivarium_entity::Entity;
use vivarium_types::{EntityClass, Position};

/// The founding population: a name, a personality description, and a
/// spawn position.
const FOUNDERS: &[(&str, &str, f64, f64)] = &[
    (
        "Asha",
        "a careful builder who trusts slowly and holds grudges even slower",
        0.0,
        0.0,
    ),
    (
        "Bram",
        "boisterous and proud, quick to laugh and quicker to take offense",
        6.0,
        2.0,
    ),
    (
        "Ceda",
        "a wanderer drawn to anything new, indifferent to comfort",
        -4.0,
        5.0,
    ),
    (
        "Doran",
        "patient and watchful, happiest with a wall at his back",
        3.0,
        -6.0,
    ),
    (
        "Edhe",
        "warm and talkative, miserable when alone for long",
        -2.0,
        -3.0,
    ),
    (
        "Fenn",
        "restless and competitive, always measuring against the others",
        8.0,
        -1.0,
    ),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("vivarium starting");

    let config = load_config()?;
    info!(
        batch_size = config.pipeline.batch_size,
        max_ticks_per_advance = config.clock.max_ticks_per_advance,
        "configuration loaded"
    );

    let prompts = match std::env::var("VIVARIUM_TEMPLATES") {
        Ok(dir) => {
            info!(dir, "loading prompt template overrides");
            PromptEngine::from_dir(&dir)?
        }
        Err(_) => PromptEngine::new()?,
    };

    let service = build_service(&config);

    let seed = std::env::var("VIVARIUM_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| rand::rng().random());
    info!(seed, "world seed");
    let mut rng = StdRng::seed_from_u64(seed);

    let mut state = WorldState::new();
    for &(name, description, x, z) in FOUNDERS {
        let personality =
            profile::derive_personality(&service, &prompts, description, &mut rng).await;
        let id = state.insert_entity(Entity::new(
            name,
            Position::new(x, 0.0, z),
            personality,
            EntityClass::Citizen,
            0,
        ));
        info!(entity = %id, name, "founder spawned");
    }

    let tick_ms = std::env::var("VIVARIUM_TICK_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(1000u64);
    let mut engine = Engine::new(config, service, prompts, seed);

    info!(
        population = state.population_alive(),
        tick_ms, "entering tick loop"
    );
    let mut clock = tokio::time::interval(Duration::from_millis(tick_ms.max(1)));
    loop {
        clock.tick().await;
        for summary in engine.advance(&mut state).await {
            if summary.deaths > 0 || summary.conflicts > 0 {
                info!(
                    tick = summary.tick,
                    deaths = summary.deaths,
                    conflicts = summary.conflicts,
                    "eventful tick"
                );
            }
        }
        if state.population_alive() == 0 {
            info!(tick = state.tick, events = state.events.len(), "world has gone quiet");
            return Ok(());
        }
    }
}

/// Load engine configuration from `VIVARIUM_CONFIG`, or defaults.
fn load_config() -> anyhow::Result<EngineConfig> {
    match std::env::var("VIVARIUM_CONFIG") {
        Ok(path) => {
            info!(path, "loading configuration file");
            EngineConfig::from_file(Path::new(&path))
                .with_context(|| format!("loading config from {path}"))
        }
        Err(_) => Ok(EngineConfig::default()),
    }
}

/// Build the decision service from backend environment variables.
///
/// Without `VIVARIUM_API_URL` the world runs offline: every decision is
/// unavailable and the engine falls back to deterministic behavior.
fn build_service(config: &EngineConfig) -> DecisionService {
    let Ok(api_url) = std::env::var("VIVARIUM_API_URL") else {
        info!("no API URL configured, running offline");
        return DecisionService::Scripted(ScriptedDecisionService::always_unavailable());
    };

    let kind = match std::env::var("VIVARIUM_BACKEND").as_deref() {
        Ok("anthropic") => BackendKind::Anthropic,
        _ => BackendKind::OpenAi,
    };
    let api_key = std::env::var("VIVARIUM_API_KEY").unwrap_or_default();
    let model = std::env::var("VIVARIUM_MODEL").unwrap_or_else(|_| String::from("gpt-4o-mini"));

    let primary = LlmBackend::from_config(&LlmBackendConfig {
        kind,
        api_url: api_url.clone(),
        api_key: api_key.clone(),
        model: model.clone(),
    });
    info!(api_url, model, "primary backend configured");

    let mut service = LlmService::new(primary, Duration::from_millis(config.decision.timeout_ms));

    if let Ok(escalation_model) = std::env::var("VIVARIUM_ESCALATION_MODEL") {
        let escalation = LlmBackend::from_config(&LlmBackendConfig {
            kind,
            api_url,
            api_key,
            model: escalation_model.clone(),
        });
        info!(model = escalation_model, "escalation backend configured");
        service = service.with_escalation(escalation, config.decision.escalation_threshold);
    }

    DecisionService::Llm(service)
}
