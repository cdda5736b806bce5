//! # Pairwise Interaction Model
//!
//! Closed-form scoring of one (problem, persona, fatigue) triple. Every
//! function here is pure: identical inputs always give identical outputs, and
//! the only randomness in a simulation (the Bernoulli outcome draw) lives in
//! the sequential simulator, not here.
//!
//! ## Signals
//!
//! * perceived success: `clamp(1 - (difficulty - ability) / scale, floor, ceiling)`
//! * time-on-task: `words * (1 + k * complexity) * level_multiplier * (1 + (1 - reading))`
//! * confusion: additive point system over novelty, complexity and level gap
//! * engagement: weighted novelty appeal, success, fatigue discount, confidence
//! * fatigue: `min(1, prior + (1 - success) * rate + seconds / seconds_per_unit)`
//!
//! Out-of-range numeric inputs are clamped, never rejected. Overlay effects
//! are composed once per pairing and applied on top of the base signals.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::trace;
use serde::{Deserialize, Serialize};

use crate::assignment::Problem;
use crate::config::SimulationConfig;
use crate::learner::persona::clamp_unit;
use crate::learner::{LearnerPersona, OverlayEffect};

/// Novelty appeal at zero novelty; appeal rises linearly to 1.0 at the sweet spot
const UNDER_STIMULATION_APPEAL: f64 = 0.6;

/// Appeal lost between the top of the sweet spot and maximal novelty
const EXCESS_NOVELTY_PENALTY: f64 = 0.6;

/// Absorbs float error when an ability sits exactly on a level boundary
const LEVEL_BOUNDARY_EPSILON: f64 = 1e-9;

/// Signals produced by one pairing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairwiseInteractionResult {
    /// Probability the persona solves the problem (0.0-1.0)
    pub perceived_success: f64,
    /// Estimated time-on-task, whole seconds
    pub time_on_task_seconds: u64,
    /// Accumulated confusion points
    pub confusion_signals: u32,
    /// Engagement (0.0-1.0)
    pub engagement_score: f64,
    /// Fatigue index after this problem (0.0-1.0), input to the next step
    pub updated_fatigue: f64,
}

/// Scoring functions bound to one tuning set
#[derive(Debug, Clone, Copy)]
pub struct InteractionModel<'c> {
    config: &'c SimulationConfig,
}

impl<'c> InteractionModel<'c> {
    pub fn new(config: &'c SimulationConfig) -> Self {
        Self { config }
    }

    /// Compute every signal for one pairing
    pub fn evaluate(
        &self,
        problem: &Problem,
        persona: &LearnerPersona,
        current_fatigue: f64,
    ) -> PairwiseInteractionResult {
        let effect = OverlayEffect::compose(&persona.overlays, problem);

        let perceived_success = self.perceived_success(problem, persona);
        let time_on_task_seconds = self.time_on_task(problem, persona, &effect);
        let confusion_signals = self.confusion_signals(problem, persona, &effect);
        let engagement_score =
            self.engagement_score(problem, persona, perceived_success, current_fatigue, &effect);
        let updated_fatigue =
            self.updated_fatigue(current_fatigue, perceived_success, time_on_task_seconds, &effect);

        trace!(
            "{} x {}: success={:.3} time={}s confusion={} engagement={:.3} fatigue={:.3}",
            persona.id,
            problem.id,
            perceived_success,
            time_on_task_seconds,
            confusion_signals,
            engagement_score,
            updated_fatigue
        );

        PairwiseInteractionResult {
            perceived_success,
            time_on_task_seconds,
            confusion_signals,
            engagement_score,
            updated_fatigue,
        }
    }

    /// Weighted ability mapped onto `0..=ability_scale`
    pub fn scaled_ability(&self, persona: &LearnerPersona) -> f64 {
        let tuning = &self.config.interaction;
        let traits = &persona.traits;
        let weighted = tuning.reading_weight * traits.reading_proficiency
            + tuning.quantitative_weight * traits.quantitative_fluency
            + tuning.confidence_weight * traits.self_confidence;
        (weighted * tuning.ability_scale).clamp(0.0, tuning.ability_scale)
    }

    /// Cognitive level (1-6) the persona is estimated to work at comfortably
    pub fn ability_level_estimate(&self, persona: &LearnerPersona) -> u32 {
        let normalized = self.scaled_ability(persona) / self.config.interaction.ability_scale;
        ((normalized * 5.0 + LEVEL_BOUNDARY_EPSILON).floor() as u32 + 1).min(6)
    }

    pub fn perceived_success(&self, problem: &Problem, persona: &LearnerPersona) -> f64 {
        let tuning = &self.config.interaction;
        let difficulty = tuning.difficulty_weight(problem.cognitive_level);
        let gap = difficulty - self.scaled_ability(persona);
        (1.0 - gap / tuning.ability_scale).clamp(tuning.success_floor, tuning.success_ceiling)
    }

    pub fn time_on_task(&self, problem: &Problem, persona: &LearnerPersona, effect: &OverlayEffect) -> u64 {
        let tuning = &self.config.interaction;
        let complexity = clamp_unit(problem.linguistic_complexity);
        let reading_drag = 1.0 + (1.0 - persona.traits.reading_proficiency);
        let overlay_factor = 1.0 + effect.time_factor.max(0.0);

        let seconds = f64::from(problem.length_words)
            * (1.0 + tuning.complexity_time_factor * complexity)
            * tuning.time_multiplier(problem.cognitive_level)
            * reading_drag
            * overlay_factor;
        seconds.round() as u64
    }

    pub fn confusion_signals(&self, problem: &Problem, persona: &LearnerPersona, effect: &OverlayEffect) -> u32 {
        let tuning = &self.config.confusion;
        let novelty = clamp_unit(problem.novelty_score);
        let complexity = clamp_unit(problem.linguistic_complexity);
        let mut signals = 0;

        if novelty > tuning.novelty_high_threshold {
            signals += tuning.novelty_high_points;
        } else if novelty > tuning.novelty_moderate_threshold {
            signals += tuning.novelty_moderate_points;
        }

        if complexity > tuning.complexity_threshold {
            if persona.traits.reading_proficiency < tuning.reading_support_threshold {
                signals += tuning.complexity_unsupported_points;
            } else {
                signals += tuning.complexity_points;
            }
        }

        let level_gap = problem
            .cognitive_level
            .ordinal()
            .saturating_sub(self.ability_level_estimate(persona));
        if level_gap > tuning.level_gap_severe {
            signals += tuning.level_gap_severe_points;
        } else if level_gap > tuning.level_gap_moderate {
            signals += tuning.level_gap_moderate_points;
        }

        signals + effect.extra_confusion
    }

    /// Appeal of a novelty score: flat inside the sweet spot, lower on both sides
    pub fn novelty_appeal(&self, novelty: f64) -> f64 {
        let tuning = &self.config.engagement;
        let novelty = clamp_unit(novelty);
        if novelty > tuning.sweet_spot_high {
            let excess = (novelty - tuning.sweet_spot_high) / (1.0 - tuning.sweet_spot_high);
            1.0 - EXCESS_NOVELTY_PENALTY * excess
        } else if novelty < tuning.sweet_spot_low {
            let shortfall = (tuning.sweet_spot_low - novelty) / tuning.sweet_spot_low;
            1.0 - (1.0 - UNDER_STIMULATION_APPEAL) * shortfall
        } else {
            1.0
        }
    }

    pub fn engagement_score(
        &self,
        problem: &Problem,
        persona: &LearnerPersona,
        perceived_success: f64,
        current_fatigue: f64,
        effect: &OverlayEffect,
    ) -> f64 {
        let tuning = &self.config.engagement;
        let fatigue_discount = 1.0 - clamp_unit(current_fatigue) * tuning.fatigue_discount;

        let score = tuning.novelty_weight * self.novelty_appeal(problem.novelty_score)
            + tuning.success_weight * perceived_success
            + tuning.fatigue_weight * fatigue_discount
            + tuning.confidence_weight * persona.traits.self_confidence
            + effect.engagement_shift;
        clamp_unit(score)
    }

    /// Next fatigue index; never lower than the prior value
    pub fn updated_fatigue(
        &self,
        prior_fatigue: f64,
        perceived_success: f64,
        time_on_task_seconds: u64,
        effect: &OverlayEffect,
    ) -> f64 {
        let tuning = &self.config.fatigue;
        let prior = clamp_unit(prior_fatigue);
        let increment = (1.0 - perceived_success) * tuning.failure_rate
            + time_on_task_seconds as f64 / tuning.seconds_per_unit;
        let increment = increment.max(0.0) * (1.0 + effect.fatigue_rate.max(0.0));
        (prior + increment).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::assignment::CognitiveLevel;
    use crate::learner::{Overlay, Traits};

    fn persona(value: f64) -> LearnerPersona {
        LearnerPersona::new("s", "Student", Traits::uniform(value))
    }

    fn problem(level: CognitiveLevel) -> Problem {
        Problem::new("p", "word", level, 1)
            .with_length_words(100)
            .with_linguistic_complexity(0.4)
            .with_novelty(0.5)
    }

    #[test]
    fn test_perceived_success_follows_difficulty_gap() {
        let config = SimulationConfig::default();
        let model = InteractionModel::new(&config);
        let average = persona(0.6);

        assert_relative_eq!(model.scaled_ability(&average), 3.0, epsilon = 1e-9);
        assert_relative_eq!(model.perceived_success(&problem(CognitiveLevel::Analyze), &average), 1.0, epsilon = 1e-9);
        assert_relative_eq!(model.perceived_success(&problem(CognitiveLevel::Evaluate), &average), 0.9, epsilon = 1e-9);
        assert_relative_eq!(model.perceived_success(&problem(CognitiveLevel::Create), &average), 0.7, epsilon = 1e-9);
    }

    #[test]
    fn test_success_is_floored() {
        let config = SimulationConfig::default();
        let model = InteractionModel::new(&config);
        let novice = persona(0.0);

        assert_relative_eq!(model.perceived_success(&problem(CognitiveLevel::Create), &novice), 0.1, epsilon = 1e-9);
        assert_relative_eq!(model.perceived_success(&problem(CognitiveLevel::Remember), &novice), 0.8, epsilon = 1e-9);
    }

    #[test]
    fn test_perfect_persona_on_recall_problems() {
        let config = SimulationConfig::default();
        let model = InteractionModel::new(&config);
        let result = model.evaluate(&problem(CognitiveLevel::Remember), &persona(1.0), 0.0);
        assert!(result.perceived_success >= 0.9);
    }

    #[test]
    fn test_time_on_task_formula() {
        let config = SimulationConfig::default();
        let model = InteractionModel::new(&config);
        let reader = LearnerPersona::new("s", "Student", Traits::new(0.8, 0.5, 0.5, 0.5));

        // 100 * (1 + 1.5 * 0.4) * 1.3 * (1 + 0.2) = 249.6
        let seconds = model.time_on_task(&problem(CognitiveLevel::Understand), &reader, &OverlayEffect::default());
        assert_eq!(seconds, 250);

        let slowed = OverlayEffect {
            time_factor: 0.5,
            ..OverlayEffect::default()
        };
        let seconds = model.time_on_task(&problem(CognitiveLevel::Understand), &reader, &slowed);
        assert_eq!(seconds, 374);
    }

    #[test]
    fn test_time_grows_with_cognitive_level() {
        let config = SimulationConfig::default();
        let model = InteractionModel::new(&config);
        let student = persona(0.7);
        let times: Vec<u64> = CognitiveLevel::ALL
            .iter()
            .map(|&level| model.time_on_task(&problem(level), &student, &OverlayEffect::default()))
            .collect();
        assert!(times.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_confusion_point_system() {
        let config = SimulationConfig::default();
        let model = InteractionModel::new(&config);
        let neutral = OverlayEffect::default();

        // Level estimate for 0.6 traits is 1 + floor(0.6 * 5) = 4
        let average = persona(0.6);
        assert_eq!(model.ability_level_estimate(&average), 4);
        assert_eq!(model.confusion_signals(&problem(CognitiveLevel::Apply), &average, &neutral), 0);

        let novel_dense = problem(CognitiveLevel::Create)
            .with_novelty(0.8)
            .with_linguistic_complexity(0.9);
        // novelty +2, complexity with reading 0.6 +1, gap 6 - 4 = 2 -> +1
        assert_eq!(model.confusion_signals(&novel_dense, &average, &neutral), 4);

        // Weak reader: level estimate 1, complexity +2, gap 5 -> +3
        let weak = persona(0.1);
        assert_eq!(model.ability_level_estimate(&weak), 1);
        assert_eq!(model.confusion_signals(&novel_dense, &weak, &neutral), 7);
    }

    #[test]
    fn test_attention_overlay_adds_confusion_on_multi_part() {
        let config = SimulationConfig::default();
        let model = InteractionModel::new(&config);
        let distracted = persona(0.6).with_overlay(Overlay::AttentionLimiting);

        let single = model.evaluate(&problem(CognitiveLevel::Apply), &distracted, 0.0);
        let multi = model.evaluate(&problem(CognitiveLevel::Apply).with_multi_part(true), &distracted, 0.0);
        assert_eq!(multi.confusion_signals, single.confusion_signals + 1);
        assert_eq!(multi.perceived_success, single.perceived_success);
    }

    #[test]
    fn test_novelty_appeal_sweet_spot() {
        let config = SimulationConfig::default();
        let model = InteractionModel::new(&config);
        assert_relative_eq!(model.novelty_appeal(0.5), 1.0, epsilon = 1e-9);
        assert_relative_eq!(model.novelty_appeal(0.3), 1.0, epsilon = 1e-9);
        assert_relative_eq!(model.novelty_appeal(0.7), 1.0, epsilon = 1e-9);
        assert_relative_eq!(model.novelty_appeal(1.0), 0.4, epsilon = 1e-9);
        assert_relative_eq!(model.novelty_appeal(0.0), 0.6, epsilon = 1e-9);
        assert!(model.novelty_appeal(0.9) < model.novelty_appeal(0.75));
    }

    #[test]
    fn test_engagement_weighting() {
        let config = SimulationConfig::default();
        let model = InteractionModel::new(&config);
        let student = persona(0.6);
        let p = problem(CognitiveLevel::Evaluate);
        let neutral = OverlayEffect::default();

        // 0.3 * 1.0 + 0.3 * 0.9 + 0.3 * 1.0 + 0.1 * 0.6
        let fresh = model.engagement_score(&p, &student, 0.9, 0.0, &neutral);
        assert_relative_eq!(fresh, 0.93, epsilon = 1e-9);

        let tired = model.engagement_score(&p, &student, 0.9, 1.0, &neutral);
        assert_relative_eq!(fresh - tired, 0.15, epsilon = 1e-9);

        let boosted = OverlayEffect {
            engagement_shift: 0.5,
            ..OverlayEffect::default()
        };
        assert_eq!(model.engagement_score(&p, &student, 0.9, 0.0, &boosted), 1.0);
    }

    #[test]
    fn test_fatigue_update_is_monotone_and_capped() {
        let config = SimulationConfig::default();
        let model = InteractionModel::new(&config);
        let neutral = OverlayEffect::default();

        // 0.2 + 0.5 * 0.1 + 360 / 3600
        assert_relative_eq!(model.updated_fatigue(0.2, 0.5, 360, &neutral), 0.35, epsilon = 1e-9);
        assert_relative_eq!(model.updated_fatigue(0.3, 1.0, 0, &neutral), 0.3, epsilon = 1e-9);
        assert_eq!(model.updated_fatigue(0.95, 0.1, 7200, &neutral), 1.0);

        let sensitive = OverlayEffect {
            fatigue_rate: 0.5,
            ..OverlayEffect::default()
        };
        assert_relative_eq!(model.updated_fatigue(0.2, 0.5, 360, &sensitive), 0.425, epsilon = 1e-9);
    }

    #[test]
    fn test_evaluate_is_deterministic() {
        let config = SimulationConfig::default();
        let model = InteractionModel::new(&config);
        let student = persona(0.55).with_overlay(Overlay::ReadingLimiting);
        let p = problem(CognitiveLevel::Analyze).with_novelty(0.9);

        let first = model.evaluate(&p, &student, 0.25);
        let second = model.evaluate(&p, &student, 0.25);
        assert_eq!(first, second);
    }

    #[test]
    fn test_out_of_range_inputs_are_clamped() {
        let config = SimulationConfig::default();
        let model = InteractionModel::new(&config);
        let p = problem(CognitiveLevel::Apply)
            .with_novelty(3.0)
            .with_linguistic_complexity(-1.0);
        let result = model.evaluate(&p, &persona(0.5), 4.0);

        assert!((0.0..=1.0).contains(&result.engagement_score));
        assert!((0.0..=1.0).contains(&result.updated_fatigue));
        assert!(result.perceived_success >= 0.1);
    }
}
