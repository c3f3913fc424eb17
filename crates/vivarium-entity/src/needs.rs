//! The 8-axis needs model.
//!
//! Each tick, every need axis accumulates by `base_rate x multiplier`,
//! where the multiplier is a logistic S-curve over a personality-derived
//! factor. Context flags discharge specific axes *before* accumulation is
//! applied, so same-tick satisfaction can offset growth. All values are
//! clamped into [0,100] after every step.
//!
//! `evolution_pressure` stands apart: it never accumulates with the
//! others. It is driven purely by a rank-based external signal (amplified
//! for apex entities), decays naturally when that signal is low, and is
//! thresholded into the three behavior modes.

use serde::{Deserialize, Serialize};
use vivarium_types::{BehaviorMode, EntityClass};

use crate::personality::{Personality, PersonalityAxis};

/// Number of need axes.
pub const NEED_COUNT: usize = 8;

/// Lower bound of the logistic accumulation multiplier.
const MULTIPLIER_FLOOR: f64 = 0.2;

/// Span of the logistic accumulation multiplier above its floor.
const MULTIPLIER_SPAN: f64 = 2.3;

/// The named need axes, each valued in [0,100].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeedAxis {
    /// Hunger for food.
    Sustenance,
    /// Fatigue.
    Rest,
    /// Loneliness.
    Social,
    /// Boredom.
    Stimulation,
    /// Felt insecurity.
    Safety,
    /// Unmet ambition.
    Achievement,
    /// Pent-up creative drive.
    Expression,
    /// Rank-driven pressure; governs behavior mode.
    EvolutionPressure,
}

impl NeedAxis {
    /// All axes in declaration order.
    pub const ALL: [Self; NEED_COUNT] = [
        Self::Sustenance,
        Self::Rest,
        Self::Social,
        Self::Stimulation,
        Self::Safety,
        Self::Achievement,
        Self::Expression,
        Self::EvolutionPressure,
    ];

    /// The axis's index into the backing array.
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|a| *a == self).unwrap_or(0)
    }

    /// The personality-derived factor in [0,1] controlling how fast this
    /// axis accumulates for the given personality.
    pub fn personality_factor(self, personality: &Personality) -> f64 {
        match self {
            Self::Sustenance => 1.0 - personality.get(PersonalityAxis::Stoicism),
            Self::Rest => 1.0 - personality.get(PersonalityAxis::Diligence),
            Self::Social => personality.get(PersonalityAxis::Sociability),
            Self::Stimulation => {
                let c = personality.get(PersonalityAxis::Curiosity);
                let p = personality.get(PersonalityAxis::Playfulness);
                (c + p) / 2.0
            }
            Self::Safety => personality.get(PersonalityAxis::Caution),
            Self::Achievement => personality.get(PersonalityAxis::Ambition),
            Self::Expression => personality.get(PersonalityAxis::Creativity),
            // Pressure never accumulates via personality.
            Self::EvolutionPressure => 0.0,
        }
    }
}

/// Configuration for per-tick need accumulation and discharge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeedsConfig {
    /// Base accumulation per tick for the seven ordinary axes, in axis
    /// declaration order (`EvolutionPressure` is ignored).
    pub base_rates: [f64; NEED_COUNT],
    /// Steepness of the logistic multiplier curve.
    pub logistic_k: f64,
    /// Amount removed from an axis when its context flag is set.
    pub discharge_amount: f64,
}

impl Default for NeedsConfig {
    fn default() -> Self {
        Self {
            base_rates: [0.8, 0.6, 0.5, 0.7, 0.3, 0.4, 0.4, 0.0],
            logistic_k: 6.0,
            discharge_amount: 20.0,
        }
    }
}

/// Configuration for evolution pressure and behavior modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PressureConfig {
    /// Multiplier applied to the incoming rank signal.
    pub signal_gain: f64,
    /// Extra amplification for [`EntityClass::Apex`] entities.
    pub apex_amplifier: f64,
    /// Signals at or below this level trigger natural decay instead.
    pub decay_floor: f64,
    /// Pressure lost per tick while the signal is low.
    pub decay_rate: f64,
    /// Pressure at or above this enters `Desperate` mode.
    pub desperate_threshold: f64,
    /// Pressure strictly above this enters `Rampage` mode.
    pub rampage_threshold: f64,
}

impl Default for PressureConfig {
    fn default() -> Self {
        Self {
            signal_gain: 4.0,
            apex_amplifier: 1.5,
            decay_floor: 0.1,
            decay_rate: 1.5,
            desperate_threshold: 80.0,
            rampage_threshold: 95.0,
        }
    }
}

/// Context flags describing what an entity experienced this tick.
///
/// Each set flag discharges the corresponding need axis before
/// accumulation runs, so a fed entity's sustenance can fall even on a
/// tick where it would otherwise grow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextFlags {
    /// The entity ate.
    pub fed: bool,
    /// The entity rested.
    pub rested: bool,
    /// The entity had meaningful company.
    pub socialized: bool,
    /// The entity experienced something novel.
    pub stimulated: bool,
    /// The entity was in secured territory.
    pub secure: bool,
    /// The entity completed something it valued.
    pub accomplished: bool,
    /// The entity created or performed.
    pub expressed: bool,
}

impl ContextFlags {
    /// Whether the flag for the given axis is set.
    ///
    /// `EvolutionPressure` has no flag and always returns false.
    pub const fn is_set(&self, axis: NeedAxis) -> bool {
        match axis {
            NeedAxis::Sustenance => self.fed,
            NeedAxis::Rest => self.rested,
            NeedAxis::Social => self.socialized,
            NeedAxis::Stimulation => self.stimulated,
            NeedAxis::Safety => self.secure,
            NeedAxis::Achievement => self.accomplished,
            NeedAxis::Expression => self.expressed,
            NeedAxis::EvolutionPressure => false,
        }
    }
}

/// The mutable 8-axis needs record, all values in [0,100].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Needs {
    values: [f64; NEED_COUNT],
}

impl Default for Needs {
    fn default() -> Self {
        Self::new()
    }
}

impl Needs {
    /// All axes at zero.
    pub const fn new() -> Self {
        Self {
            values: [0.0; NEED_COUNT],
        }
    }

    /// Read a single axis value.
    pub fn get(&self, axis: NeedAxis) -> f64 {
        self.values.get(axis.index()).copied().unwrap_or(0.0)
    }

    /// Set a single axis value, clamped into [0,100]. Test and migration
    /// helper; tick updates go through [`update`](Self::update).
    pub fn set(&mut self, axis: NeedAxis, value: f64) {
        if let Some(slot) = self.values.get_mut(axis.index()) {
            *slot = value.clamp(0.0, 100.0);
        }
    }

    /// Run one tick of the needs model: discharge flagged axes, then
    /// accumulate every ordinary axis by `base_rate x multiplier`.
    ///
    /// `evolution_pressure` is untouched; it is driven separately by
    /// [`apply_rank_signal`](Self::apply_rank_signal).
    pub fn update(
        &mut self,
        personality: &Personality,
        flags: &ContextFlags,
        config: &NeedsConfig,
    ) {
        for axis in NeedAxis::ALL {
            if axis == NeedAxis::EvolutionPressure {
                continue;
            }
            let idx = axis.index();

            // Discharge first: same-tick satisfaction offsets growth.
            if flags.is_set(axis)
                && let Some(slot) = self.values.get_mut(idx)
            {
                *slot = (*slot - config.discharge_amount).clamp(0.0, 100.0);
            }

            let base = config.base_rates.get(idx).copied().unwrap_or(0.0);
            let factor = axis.personality_factor(personality);
            let mult = logistic_multiplier(factor, config.logistic_k);
            if let Some(slot) = self.values.get_mut(idx) {
                *slot = (*slot + base * mult).clamp(0.0, 100.0);
            }
        }
    }

    /// Drive evolution pressure from a rank-based signal in [0,1].
    ///
    /// Signals above the decay floor raise pressure by
    /// `signal x gain` (x the apex amplifier for apex entities); low
    /// signals let pressure decay naturally.
    pub fn apply_rank_signal(
        &mut self,
        signal: f64,
        class: EntityClass,
        config: &PressureConfig,
    ) {
        let idx = NeedAxis::EvolutionPressure.index();
        let Some(slot) = self.values.get_mut(idx) else {
            return;
        };

        let signal = signal.clamp(0.0, 1.0);
        if signal > config.decay_floor {
            let amp = if class == EntityClass::Apex {
                config.apex_amplifier
            } else {
                1.0
            };
            *slot = (*slot + signal * config.signal_gain * amp).clamp(0.0, 100.0);
        } else {
            *slot = (*slot - config.decay_rate).clamp(0.0, 100.0);
        }
    }

    /// The behavior mode implied by the current evolution pressure.
    pub fn behavior_mode(&self, config: &PressureConfig) -> BehaviorMode {
        let pressure = self.get(NeedAxis::EvolutionPressure);
        if pressure > config.rampage_threshold {
            BehaviorMode::Rampage
        } else if pressure >= config.desperate_threshold {
            BehaviorMode::Desperate
        } else {
            BehaviorMode::Normal
        }
    }
}

/// The logistic S-curve mapping a factor in [0,1] to roughly [0.2, 2.5].
///
/// `multiplier(0.5)` sits at the curve midpoint (~1.35); extreme factors
/// approach the floor and ceiling asymptotically.
fn logistic_multiplier(factor: f64, k: f64) -> f64 {
    MULTIPLIER_FLOOR + MULTIPLIER_SPAN / (1.0 + (-k * (factor - 0.5)).exp())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::Rng;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn logistic_multiplier_bounds() {
        let lo = logistic_multiplier(0.0, 6.0);
        let hi = logistic_multiplier(1.0, 6.0);
        assert!(lo > 0.2 && lo < 0.4, "lo = {lo}");
        assert!(hi > 2.3 && hi < 2.5, "hi = {hi}");
        let mid = logistic_multiplier(0.5, 6.0);
        assert!((mid - 1.35).abs() < 1e-9);
    }

    #[test]
    fn update_then_discharge_stays_in_range_for_random_personalities() {
        let config = NeedsConfig::default();
        let mut rng = StdRng::seed_from_u64(1234);

        for _ in 0..100 {
            let mut raw = [0.0; crate::personality::AXIS_COUNT];
            for v in &mut raw {
                *v = rng.random_range(0.0..=1.0);
            }
            let personality = crate::personality::Personality::from_axes(raw);

            let flags = ContextFlags {
                fed: rng.random_bool(0.5),
                rested: rng.random_bool(0.5),
                socialized: rng.random_bool(0.5),
                stimulated: rng.random_bool(0.5),
                secure: rng.random_bool(0.5),
                accomplished: rng.random_bool(0.5),
                expressed: rng.random_bool(0.5),
            };

            let mut needs = Needs::new();
            // Start some axes near both bounds to stress the clamping.
            needs.set(NeedAxis::Sustenance, 99.9);
            needs.set(NeedAxis::Rest, 0.1);

            for _ in 0..50 {
                needs.update(&personality, &flags, &config);
                for axis in NeedAxis::ALL {
                    let v = needs.get(axis);
                    assert!((0.0..=100.0).contains(&v), "{axis:?} = {v}");
                }
            }
        }
    }

    #[test]
    fn discharge_applies_before_accumulation() {
        let config = NeedsConfig {
            base_rates: [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            logistic_k: 6.0,
            discharge_amount: 20.0,
        };
        let personality = Personality::neutral();

        let mut needs = Needs::new();
        needs.set(NeedAxis::Sustenance, 50.0);

        let flags = ContextFlags {
            fed: true,
            ..ContextFlags::default()
        };
        needs.update(&personality, &flags, &config);

        // 50 - 20 discharge + 1.0 * multiplier(0.5) accumulation.
        let expected = 30.0 + logistic_multiplier(0.5, 6.0);
        assert!((needs.get(NeedAxis::Sustenance) - expected).abs() < 1e-9);
    }

    #[test]
    fn pressure_is_excluded_from_ordinary_accumulation() {
        let config = NeedsConfig::default();
        let personality = Personality::neutral();
        let mut needs = Needs::new();
        needs.set(NeedAxis::EvolutionPressure, 42.0);

        needs.update(&personality, &ContextFlags::default(), &config);
        assert!((needs.get(NeedAxis::EvolutionPressure) - 42.0).abs() < 1e-9);
    }

    #[test]
    fn rank_signal_raises_pressure_and_apex_amplifies() {
        let config = PressureConfig::default();

        let mut citizen = Needs::new();
        citizen.apply_rank_signal(0.5, EntityClass::Citizen, &config);

        let mut apex = Needs::new();
        apex.apply_rank_signal(0.5, EntityClass::Apex, &config);

        let c = citizen.get(NeedAxis::EvolutionPressure);
        let a = apex.get(NeedAxis::EvolutionPressure);
        assert!((c - 2.0).abs() < 1e-9);
        assert!((a - 3.0).abs() < 1e-9);
    }

    #[test]
    fn low_signal_decays_pressure() {
        let config = PressureConfig::default();
        let mut needs = Needs::new();
        needs.set(NeedAxis::EvolutionPressure, 10.0);

        needs.apply_rank_signal(0.0, EntityClass::Citizen, &config);
        assert!((needs.get(NeedAxis::EvolutionPressure) - 8.5).abs() < 1e-9);

        // Decay never goes below zero.
        for _ in 0..100 {
            needs.apply_rank_signal(0.0, EntityClass::Citizen, &config);
        }
        assert!(needs.get(NeedAxis::EvolutionPressure).abs() < 1e-9);
    }

    #[test]
    fn behavior_mode_thresholds() {
        let config = PressureConfig::default();
        let mut needs = Needs::new();

        needs.set(NeedAxis::EvolutionPressure, 79.9);
        assert_eq!(needs.behavior_mode(&config), BehaviorMode::Normal);

        needs.set(NeedAxis::EvolutionPressure, 80.0);
        assert_eq!(needs.behavior_mode(&config), BehaviorMode::Desperate);

        needs.set(NeedAxis::EvolutionPressure, 95.0);
        assert_eq!(needs.behavior_mode(&config), BehaviorMode::Desperate);

        needs.set(NeedAxis::EvolutionPressure, 95.1);
        assert_eq!(needs.behavior_mode(&config), BehaviorMode::Rampage);
    }
}
