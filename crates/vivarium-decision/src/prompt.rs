//! Prompt template loading and rendering via `minijinja`.
//!
//! Built-in templates cover every decision the engine makes; operators can
//! override any of them by pointing [`PromptEngine::from_dir`] at a
//! directory of `.j2` files with the same names. Overrides are picked up
//! on the next engine construction, not live.

use minijinja::Environment;

use crate::error::DecisionError;

/// Template names the engine renders.
const TEMPLATE_NAMES: [&str; 7] = [
    "cognition",
    "interaction",
    "culture",
    "conflict",
    "profile",
    "commentary",
    "narrative",
];

/// Built-in cognition (reflection) template.
const DEFAULT_COGNITION: &str = "\
You are {{ name }}, an inhabitant of a simulated world at tick {{ tick }}.
Your pressing needs: {{ needs }}.
Recent memories: {{ memories }}.
In one short JSON object, decide what to focus on next:
{\"focus\": \"<one of: sustenance, rest, social, stimulation, safety, achievement, expression>\", \"note\": \"<one sentence>\"}";

/// Built-in interaction template.
const DEFAULT_INTERACTION: &str = "\
{{ a_name }} and {{ b_name }} meet at tick {{ tick }}.
{{ a_name }}'s disposition toward {{ b_name }}: {{ disposition }}.
Reply with JSON: {\"tone\": \"<friendly|neutral|hostile>\", \"utterance\": \"<one line of dialogue>\"}";

/// Built-in cultural drift template.
const DEFAULT_CULTURE: &str = "\
A group of {{ group_size }} entities shares these recent experiences:
{{ shared_events }}
Reply with JSON: {\"concept\": \"<a short name for an emerging shared idea>\", \"description\": \"<one sentence>\"}";

/// Built-in conflict narration template.
const DEFAULT_CONFLICT: &str = "\
Narrate a {{ archetype }} between {{ a_name }} and {{ b_name }} at tick {{ tick }}.
{{ a_name }}: aggression {{ a_aggression }}, pride {{ a_pride }}.
{{ b_name }}: aggression {{ b_aggression }}, pride {{ b_pride }}.
Write 2-3 sentences and name the winner explicitly by name.";

/// Built-in personality profile template.
const DEFAULT_PROFILE: &str = "\
Derive a personality profile from this description:
\"{{ description }}\"
Reply with a JSON object mapping each of these axes to a number in [0,1]:
{{ axes }}";

/// Built-in observer commentary template.
const DEFAULT_COMMENTARY: &str = "\
You are an unseen observer of a simulated world at tick {{ tick }}.
Population: {{ population }} alive. Notable recent events:
{{ events }}
Write one wry sentence of commentary.";

/// Built-in era narrative template.
const DEFAULT_NARRATIVE: &str = "\
Era {{ era }} of a simulated world has ended at tick {{ tick }}.
Population: {{ population }} alive, {{ deaths }} dead this era.
Notable events of the era:
{{ events }}
Write a short narrative summary (3-4 sentences) of the era.";

/// Manages prompt template loading and rendering.
///
/// Wraps a `minijinja` [`Environment`] with every engine template
/// pre-loaded.
pub struct PromptEngine {
    env: Environment<'static>,
}

impl PromptEngine {
    /// Create an engine with the built-in templates.
    pub fn new() -> Result<Self, DecisionError> {
        let mut env = Environment::new();
        for (name, body) in [
            ("cognition", DEFAULT_COGNITION),
            ("interaction", DEFAULT_INTERACTION),
            ("culture", DEFAULT_CULTURE),
            ("conflict", DEFAULT_CONFLICT),
            ("profile", DEFAULT_PROFILE),
            ("commentary", DEFAULT_COMMENTARY),
            ("narrative", DEFAULT_NARRATIVE),
        ] {
            env.add_template_owned(name.to_owned(), body.to_owned())
                .map_err(|e| {
                    DecisionError::Template(format!("failed to add {name} template: {e}"))
                })?;
        }
        Ok(Self { env })
    }

    /// Create an engine loading overrides from a directory.
    ///
    /// For each known template name, `{dir}/{name}.j2` replaces the
    /// built-in body when the file exists; missing files keep defaults.
    pub fn from_dir(dir: &str) -> Result<Self, DecisionError> {
        let mut engine = Self::new()?;
        for name in TEMPLATE_NAMES {
            let path = format!("{dir}/{name}.j2");
            if let Ok(body) = std::fs::read_to_string(&path) {
                engine
                    .env
                    .add_template_owned(name.to_owned(), body)
                    .map_err(|e| {
                        DecisionError::Template(format!("failed to add {path}: {e}"))
                    })?;
            }
        }
        Ok(engine)
    }

    /// Render a template with the given JSON context.
    pub fn render(
        &self,
        name: &str,
        context: &serde_json::Value,
    ) -> Result<String, DecisionError> {
        self.env
            .get_template(name)
            .map_err(|e| DecisionError::Template(format!("missing {name} template: {e}")))?
            .render(context)
            .map_err(|e| DecisionError::Template(format!("{name} render failed: {e}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn builtin_templates_render() {
        let engine = PromptEngine::new().unwrap();
        let prompt = engine
            .render(
                "conflict",
                &serde_json::json!({
                    "archetype": "duel",
                    "a_name": "Asha",
                    "b_name": "Bram",
                    "tick": 40,
                    "a_aggression": 0.9,
                    "a_pride": 0.5,
                    "b_aggression": 0.2,
                    "b_pride": 0.7,
                }),
            )
            .unwrap();
        assert!(prompt.contains("duel"));
        assert!(prompt.contains("Asha"));
        assert!(prompt.contains("Bram"));
    }

    #[test]
    fn unknown_template_is_an_error() {
        let engine = PromptEngine::new().unwrap();
        assert!(engine.render("missing", &serde_json::json!({})).is_err());
    }

    #[test]
    fn dir_overrides_replace_builtins() {
        let dir = std::env::temp_dir().join("vivarium-prompt-test");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("commentary.j2"), "tick {{ tick }} override").unwrap();

        let engine = PromptEngine::from_dir(&dir.to_string_lossy()).unwrap();
        let out = engine
            .render("commentary", &serde_json::json!({"tick": 3}))
            .unwrap();
        assert_eq!(out, "tick 3 override");

        // Non-overridden templates keep their defaults.
        let profile = engine
            .render(
                "profile",
                &serde_json::json!({"description": "stoic", "axes": "curiosity"}),
            )
            .unwrap();
        assert!(profile.contains("stoic"));
    }
}
