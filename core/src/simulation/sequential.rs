//! # Per-Student Sequential Simulator
//!
//! Drives one persona through an assignment in `sequence_index` order. The
//! run is a small state machine:
//!
//! ```text
//! state   = (cumulative_fatigue, engagement_trajectory[], total_time_seconds, confusion_points[])
//! initial = (0, [], 0, [])
//! step    = evaluate pairing -> append engagement -> add time -> replace fatigue
//!           -> Bernoulli outcome draw -> classify confusion and engagement
//! ```
//!
//! After the last problem the trajectories are reduced to their summary
//! points and handed to the outcome summarizer.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::interaction::{InteractionModel, PairwiseInteractionResult};
use super::summary::{OutcomeSummarizer, PerStudentSimulation};
use crate::assignment::{validate_assignment, Problem};
use crate::config::{BandThresholds, SimulationConfig};
use crate::error::SimulationResult;
use crate::learner::LearnerPersona;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfusionLevel {
    Low,
    Medium,
    High,
}

impl ConfusionLevel {
    pub fn classify(signals: u32, bands: &BandThresholds) -> Self {
        if signals < bands.confusion_medium {
            ConfusionLevel::Low
        } else if signals < bands.confusion_high {
            ConfusionLevel::Medium
        } else {
            ConfusionLevel::High
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngagementLevel {
    Low,
    Medium,
    High,
}

impl EngagementLevel {
    pub fn classify(score: f64, bands: &BandThresholds) -> Self {
        if score < bands.engagement_medium {
            EngagementLevel::Low
        } else if score < bands.engagement_high {
            EngagementLevel::Medium
        } else {
            EngagementLevel::High
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngagementTrend {
    Improving,
    Declining,
    #[default]
    Stable,
}

/// Result of one problem within a student's run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemOutcome {
    pub problem_id: String,
    pub sequence_index: u32,
    pub time_seconds: u64,
    /// Perceived success as a percentage
    pub percentage_successful: f64,
    pub confusion_signals: u32,
    pub confusion_level: ConfusionLevel,
    pub engagement_score: f64,
    pub engagement_level: EngagementLevel,
    /// Fatigue index after this problem
    pub fatigue_after: f64,
    /// Stochastic outcome of the Bernoulli draw
    pub actual_correct: bool,
}

/// Engagement at the start, middle and end of a run
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EngagementTrajectory {
    pub initial: f64,
    pub at_midpoint: f64,
    #[serde(rename = "final")]
    pub final_value: f64,
    pub trend: EngagementTrend,
}

impl EngagementTrajectory {
    /// First, middle (`len / 2`) and last samples; `None` for an empty run
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        let initial = *samples.first()?;
        let at_midpoint = samples[samples.len() / 2];
        let final_value = *samples.last()?;

        let trend = if final_value > initial {
            EngagementTrend::Improving
        } else if final_value < initial {
            EngagementTrend::Declining
        } else {
            EngagementTrend::Stable
        };

        Some(Self {
            initial,
            at_midpoint,
            final_value,
            trend,
        })
    }
}

/// Fatigue at the start of a run, its maximum, and its final value
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FatigueTrajectory {
    pub initial: f64,
    pub peak: f64,
    #[serde(rename = "final")]
    pub final_value: f64,
}

/// Mutable state carried from one problem to the next
#[derive(Debug, Clone, Default)]
pub struct StudentRunState {
    cumulative_fatigue: f64,
    peak_fatigue: f64,
    engagement_trajectory: Vec<f64>,
    total_time_seconds: u64,
    confusion_points: Vec<String>,
    outcomes: Vec<ProblemOutcome>,
}

/// Terminal state of a run, reduced and ready for summarizing
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedRun {
    pub outcomes: Vec<ProblemOutcome>,
    pub engagement_samples: Vec<f64>,
    pub engagement_trajectory: EngagementTrajectory,
    pub fatigue_trajectory: FatigueTrajectory,
    pub total_time_seconds: u64,
    pub confusion_points: Vec<String>,
}

impl StudentRunState {
    pub fn new(problem_count: usize) -> Self {
        Self {
            engagement_trajectory: Vec::with_capacity(problem_count),
            outcomes: Vec::with_capacity(problem_count),
            ..Self::default()
        }
    }

    pub fn cumulative_fatigue(&self) -> f64 {
        self.cumulative_fatigue
    }

    pub fn total_time_seconds(&self) -> u64 {
        self.total_time_seconds
    }

    /// Apply one transition
    pub fn advance(
        &mut self,
        problem: &Problem,
        interaction: &PairwiseInteractionResult,
        actual_correct: bool,
        bands: &BandThresholds,
    ) {
        self.engagement_trajectory.push(interaction.engagement_score);
        self.total_time_seconds += interaction.time_on_task_seconds;
        self.cumulative_fatigue = interaction.updated_fatigue;
        self.peak_fatigue = self.peak_fatigue.max(interaction.updated_fatigue);

        let confusion_level = ConfusionLevel::classify(interaction.confusion_signals, bands);
        if confusion_level == ConfusionLevel::High {
            self.confusion_points.push(problem.id.clone());
        }

        self.outcomes.push(ProblemOutcome {
            problem_id: problem.id.clone(),
            sequence_index: problem.sequence_index,
            time_seconds: interaction.time_on_task_seconds,
            percentage_successful: interaction.perceived_success * 100.0,
            confusion_signals: interaction.confusion_signals,
            confusion_level,
            engagement_score: interaction.engagement_score,
            engagement_level: EngagementLevel::classify(interaction.engagement_score, bands),
            fatigue_after: interaction.updated_fatigue,
            actual_correct,
        });
    }

    /// Reduce the trajectories into their summary points
    pub fn finish(self) -> CompletedRun {
        let engagement_trajectory =
            EngagementTrajectory::from_samples(&self.engagement_trajectory).unwrap_or_default();
        let fatigue_trajectory = FatigueTrajectory {
            initial: 0.0,
            peak: self.peak_fatigue,
            final_value: self.cumulative_fatigue,
        };

        CompletedRun {
            outcomes: self.outcomes,
            engagement_samples: self.engagement_trajectory,
            engagement_trajectory,
            fatigue_trajectory,
            total_time_seconds: self.total_time_seconds,
            confusion_points: self.confusion_points,
        }
    }
}

/// Runs one persona through an assignment
#[derive(Debug, Clone, Copy)]
pub struct SequentialSimulator<'c> {
    config: &'c SimulationConfig,
    model: InteractionModel<'c>,
}

impl<'c> SequentialSimulator<'c> {
    pub fn new(config: &'c SimulationConfig) -> Self {
        Self {
            config,
            model: InteractionModel::new(config),
        }
    }

    /// Validate the assignment, then simulate and summarize one persona
    pub fn simulate_student<R: Rng + ?Sized>(
        &self,
        persona: &LearnerPersona,
        problems: &[Problem],
        rng: &mut R,
    ) -> SimulationResult<PerStudentSimulation> {
        let ordered = validate_assignment(problems)?;
        let run = self.run_ordered(persona, &ordered, rng);
        Ok(OutcomeSummarizer::new(self.config).summarize(persona, run))
    }

    /// Run the state machine over problems already in `sequence_index` order
    pub fn run_ordered<R: Rng + ?Sized>(
        &self,
        persona: &LearnerPersona,
        ordered: &[&Problem],
        rng: &mut R,
    ) -> CompletedRun {
        let mut state = StudentRunState::new(ordered.len());

        for problem in ordered {
            let interaction = self.model.evaluate(problem, persona, state.cumulative_fatigue());
            let actual_correct = rng.gen::<f64>() < interaction.perceived_success;
            state.advance(problem, &interaction, actual_correct, &self.config.bands);
        }

        debug!(
            "{} finished {} problems in {}s (fatigue {:.3})",
            persona.id,
            ordered.len(),
            state.total_time_seconds(),
            state.cumulative_fatigue()
        );
        state.finish()
    }
}
