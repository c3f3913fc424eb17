//! Personality derivation from natural-language descriptions.
//!
//! Builds a structured decision call asking the service to map a free-text
//! description onto the 18 personality axes. Any failure -- unavailability,
//! missing axes, junk values -- falls back to random generation, so callers
//! always receive a usable personality.

use rand::Rng;
use tracing::{debug, warn};
use vivarium_entity::personality::{AXIS_COUNT, Personality, PersonalityAxis};

use crate::prompt::PromptEngine;
use crate::service::{DecisionRequest, DecisionService};

/// Token budget for profile derivation calls.
const PROFILE_MAX_TOKENS: u32 = 400;

/// Importance hint for profile derivation; below escalation thresholds.
const PROFILE_IMPORTANCE: f64 = 0.4;

/// Derive a personality from a description via the decision service,
/// falling back to random generation on any failure.
pub async fn derive_personality<R: Rng + ?Sized>(
    service: &DecisionService,
    prompts: &PromptEngine,
    description: &str,
    rng: &mut R,
) -> Personality {
    match try_derive(service, prompts, description).await {
        Some(personality) => personality,
        None => {
            warn!(description, "profile derivation failed, using random personality");
            Personality::random(rng)
        }
    }
}

/// The fallible derivation path; `None` means "fall back to random".
async fn try_derive(
    service: &DecisionService,
    prompts: &PromptEngine,
    description: &str,
) -> Option<Personality> {
    let axis_names: Vec<&str> = PersonalityAxis::ALL.iter().map(|a| a.name()).collect();
    let prompt = prompts
        .render(
            "profile",
            &serde_json::json!({
                "description": description,
                "axes": axis_names.join(", "),
            }),
        )
        .ok()?;

    let outcome = service
        .decide(&DecisionRequest {
            prompt,
            max_tokens: PROFILE_MAX_TOKENS,
            structured_output: true,
            importance: PROFILE_IMPORTANCE,
        })
        .await;

    let value = outcome.structured()?;
    let obj = value.as_object()?;

    let mut axes = [0.5; AXIS_COUNT];
    let mut found = 0usize;
    for axis in PersonalityAxis::ALL {
        if let Some(v) = obj.get(axis.name()).and_then(serde_json::Value::as_f64) {
            if let Some(slot) = axes.get_mut(axis.index()) {
                *slot = v;
            }
            found += 1;
        }
    }

    // A response missing most axes is junk; take the fallback instead.
    if found < AXIS_COUNT / 2 {
        debug!(found, "profile response too sparse");
        return None;
    }
    Some(Personality::from_axes(axes))
}
