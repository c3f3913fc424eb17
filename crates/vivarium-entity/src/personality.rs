//! The 18-axis immutable personality value type.
//!
//! A [`Personality`] is frozen at construction: the type exposes no
//! mutators at all, so immutability is enforced by the compiler rather
//! than a runtime guard. Construction goes through one of two factories:
//!
//! - [`Personality::random`] -- Gaussian sampling around 0.5 per axis,
//!   with a probabilistic chance of 1-2 extreme axes.
//! - [`Personality::from_axes`] -- explicit values, clamped into [0,1].
//!   Used by the decision-service profile derivation (with random
//!   fallback on failure) and by tests.

use rand::Rng;
use rand::seq::SliceRandom;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// Number of personality axes.
pub const AXIS_COUNT: usize = 18;

/// Standard deviation of the Gaussian used by [`Personality::random`].
const RANDOM_SIGMA: f64 = 0.15;

/// Probability that a randomly generated personality has extreme axes.
const EXTREME_CHANCE: f64 = 0.3;

/// The named axes of a personality, each valued in [0,1].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonalityAxis {
    /// Drive to explore and question.
    Curiosity,
    /// Readiness to escalate and dominate confrontations.
    Aggression,
    /// Sensitivity to the states of others.
    Empathy,
    /// Persistence on long tasks.
    Diligence,
    /// Appetite for company.
    Sociability,
    /// Aversion to risk.
    Caution,
    /// Drive to produce novel things.
    Creativity,
    /// Attachment to status and reputation.
    Pride,
    /// Tolerance for delay and friction.
    Patience,
    /// Playful framing of events.
    Humor,
    /// Attachment to allies and groups.
    Loyalty,
    /// Hunger for advancement.
    Ambition,
    /// Orientation toward meaning beyond the material.
    Spirituality,
    /// Ease of adjusting to changed circumstances.
    Adaptability,
    /// Reluctance to deceive.
    Honesty,
    /// Emotional flatness under stress.
    Stoicism,
    /// Preference for play over work.
    Playfulness,
    /// Drive to control others.
    Dominance,
}

impl PersonalityAxis {
    /// All axes in declaration order.
    pub const ALL: [Self; AXIS_COUNT] = [
        Self::Curiosity,
        Self::Aggression,
        Self::Empathy,
        Self::Diligence,
        Self::Sociability,
        Self::Caution,
        Self::Creativity,
        Self::Pride,
        Self::Patience,
        Self::Humor,
        Self::Loyalty,
        Self::Ambition,
        Self::Spirituality,
        Self::Adaptability,
        Self::Honesty,
        Self::Stoicism,
        Self::Playfulness,
        Self::Dominance,
    ];

    /// The axis's index into the backing array.
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|a| *a == self).unwrap_or(0)
    }

    /// The snake_case name of the axis.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Curiosity => "curiosity",
            Self::Aggression => "aggression",
            Self::Empathy => "empathy",
            Self::Diligence => "diligence",
            Self::Sociability => "sociability",
            Self::Caution => "caution",
            Self::Creativity => "creativity",
            Self::Pride => "pride",
            Self::Patience => "patience",
            Self::Humor => "humor",
            Self::Loyalty => "loyalty",
            Self::Ambition => "ambition",
            Self::Spirituality => "spirituality",
            Self::Adaptability => "adaptability",
            Self::Honesty => "honesty",
            Self::Stoicism => "stoicism",
            Self::Playfulness => "playfulness",
            Self::Dominance => "dominance",
        }
    }
}

/// An immutable 18-axis personality snapshot.
///
/// Values are clamped into [0,1] at construction and never change
/// afterwards -- there are no mutating methods, by design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Personality {
    axes: [f64; AXIS_COUNT],
}

impl Personality {
    /// Build a personality from explicit axis values, clamping each into
    /// [0,1]. NaN values collapse to 0.5.
    pub fn from_axes(axes: [f64; AXIS_COUNT]) -> Self {
        let mut clamped = [0.0; AXIS_COUNT];
        for (slot, value) in clamped.iter_mut().zip(axes.iter()) {
            *slot = if value.is_nan() {
                0.5
            } else {
                value.clamp(0.0, 1.0)
            };
        }
        Self { axes: clamped }
    }

    /// Build a personality with every axis at 0.5.
    pub const fn neutral() -> Self {
        Self {
            axes: [0.5; AXIS_COUNT],
        }
    }

    /// Generate a random personality.
    ///
    /// Each axis is drawn from a Gaussian centered on 0.5 and clamped.
    /// With probability 0.3, one or two randomly chosen axes are pushed to
    /// an extreme (near 0 or near 1), producing occasional strong
    /// characters.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut axes = [0.0; AXIS_COUNT];

        // Normal::new only fails on non-finite parameters; the constants
        // here are finite, but degrade to uniform sampling rather than
        // panicking if that ever changes.
        if let Ok(normal) = Normal::new(0.5, RANDOM_SIGMA) {
            for slot in &mut axes {
                *slot = normal.sample(rng).clamp(0.0, 1.0);
            }
        } else {
            for slot in &mut axes {
                *slot = rng.random_range(0.0..=1.0);
            }
        }

        if rng.random_bool(EXTREME_CHANCE) {
            let extreme_count = if rng.random_bool(0.5) { 1 } else { 2 };
            let mut indices: Vec<usize> = (0..AXIS_COUNT).collect();
            indices.shuffle(rng);
            for idx in indices.into_iter().take(extreme_count) {
                let high = rng.random_bool(0.5);
                let v = if high {
                    rng.random_range(0.95..=1.0)
                } else {
                    rng.random_range(0.0..=0.05)
                };
                if let Some(slot) = axes.get_mut(idx) {
                    *slot = v;
                }
            }
        }

        Self { axes }
    }

    /// Read a single axis value.
    pub fn get(&self, axis: PersonalityAxis) -> f64 {
        self.axes.get(axis.index()).copied().unwrap_or(0.5)
    }

    /// Iterate over `(axis, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (PersonalityAxis, f64)> + '_ {
        PersonalityAxis::ALL
            .iter()
            .zip(self.axes.iter())
            .map(|(a, v)| (*a, *v))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn from_axes_clamps_every_axis() {
        let mut raw = [0.5; AXIS_COUNT];
        raw[0] = -3.0;
        raw[1] = 7.5;
        raw[2] = f64::NAN;
        let p = Personality::from_axes(raw);
        for axis in PersonalityAxis::ALL {
            let v = p.get(axis);
            assert!((0.0..=1.0).contains(&v), "{} = {v}", axis.name());
        }
        assert_eq!(p.get(PersonalityAxis::Curiosity), 0.0);
        assert_eq!(p.get(PersonalityAxis::Aggression), 1.0);
        assert_eq!(p.get(PersonalityAxis::Empathy), 0.5);
    }

    #[test]
    fn random_stays_in_range_for_many_seeds() {
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let p = Personality::random(&mut rng);
            for axis in PersonalityAxis::ALL {
                let v = p.get(axis);
                assert!((0.0..=1.0).contains(&v));
            }
        }
    }

    #[test]
    fn random_sometimes_produces_extremes() {
        let mut extreme_seen = false;
        for seed in 0..100 {
            let mut rng = StdRng::seed_from_u64(seed);
            let p = Personality::random(&mut rng);
            if PersonalityAxis::ALL
                .iter()
                .any(|a| p.get(*a) <= 0.05 || p.get(*a) >= 0.95)
            {
                extreme_seen = true;
                break;
            }
        }
        assert!(extreme_seen, "no extreme axis in 100 seeds");
    }

    #[test]
    fn values_are_frozen_after_construction() {
        // The type exposes no mutators; reading twice must agree even
        // after the value has been moved around and cloned.
        let mut rng = StdRng::seed_from_u64(9);
        let p = Personality::random(&mut rng);
        let before: Vec<f64> = p.iter().map(|(_, v)| v).collect();
        let moved = p.clone();
        let after: Vec<f64> = moved.iter().map(|(_, v)| v).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn axis_indices_cover_all_slots() {
        let mut seen = [false; AXIS_COUNT];
        for axis in PersonalityAxis::ALL {
            seen[axis.index()] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn serde_round_trip() {
        let p = Personality::neutral();
        let json = serde_json::to_string(&p).unwrap();
        let back: Personality = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }
}
