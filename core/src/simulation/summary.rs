//! # Per-Student Outcome Summarizer
//!
//! Reduces a completed run into a score, a letter grade and a risk
//! classification. A student is at risk when the grade is D or F, or when
//! more than the configured fraction of problems were confusion points.
//! Every at-risk student carries at least one human-readable risk factor.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::fmt;

use serde::{Deserialize, Serialize};

use super::sequential::{CompletedRun, EngagementTrajectory, FatigueTrajectory, ProblemOutcome};
use crate::config::{GradeThresholds, SimulationConfig};
use crate::learner::LearnerPersona;

/// Letter grade, best first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub const ALL: [Grade; 5] = [Grade::A, Grade::B, Grade::C, Grade::D, Grade::F];

    /// Map a score percent onto the grade scale
    pub fn from_score(score_percent: f64, thresholds: &GradeThresholds) -> Grade {
        if score_percent >= thresholds.a {
            Grade::A
        } else if score_percent >= thresholds.b {
            Grade::B
        } else if score_percent >= thresholds.c {
            Grade::C
        } else if score_percent >= thresholds.d {
            Grade::D
        } else {
            Grade::F
        }
    }

    pub fn is_failing(self) -> bool {
        self == Grade::F
    }

    pub fn is_at_risk(self) -> bool {
        matches!(self, Grade::D | Grade::F)
    }

    pub fn letter(self) -> &'static str {
        match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}

/// One persona's complete run, never mutated after creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerStudentSimulation {
    pub student_id: String,
    pub display_name: String,
    pub total_time_seconds: u64,
    pub total_time_minutes: u64,
    /// Mean perceived success, percent, rounded
    pub estimated_score_percent: f64,
    pub estimated_grade: Grade,
    pub problem_outcomes: Vec<ProblemOutcome>,
    pub engagement_trajectory: EngagementTrajectory,
    pub fatigue_trajectory: FatigueTrajectory,
    /// Ids of high-confusion problems, in sequence order
    pub confusion_points: Vec<String>,
    /// Problems the Bernoulli draw marked correct
    pub observed_correct_count: usize,
    pub at_risk: bool,
    pub risk_factors: Vec<String>,
}

pub struct OutcomeSummarizer<'c> {
    config: &'c SimulationConfig,
}

impl<'c> OutcomeSummarizer<'c> {
    pub fn new(config: &'c SimulationConfig) -> Self {
        Self { config }
    }

    pub fn summarize(&self, persona: &LearnerPersona, run: CompletedRun) -> PerStudentSimulation {
        let problem_count = run.outcomes.len();
        let estimated_score_percent = mean_success_percent(&run.outcomes).round();
        let estimated_grade = Grade::from_score(estimated_score_percent, &self.config.grades);

        let at_risk = self.is_at_risk(estimated_grade, run.confusion_points.len(), problem_count);
        let risk_factors = self.risk_factors(
            estimated_grade,
            run.confusion_points.len(),
            run.fatigue_trajectory.final_value,
        );

        PerStudentSimulation {
            student_id: persona.id.clone(),
            display_name: persona.display_name.clone(),
            total_time_seconds: run.total_time_seconds,
            total_time_minutes: (run.total_time_seconds as f64 / 60.0).round() as u64,
            estimated_score_percent,
            estimated_grade,
            observed_correct_count: run.outcomes.iter().filter(|o| o.actual_correct).count(),
            problem_outcomes: run.outcomes,
            engagement_trajectory: run.engagement_trajectory,
            fatigue_trajectory: run.fatigue_trajectory,
            confusion_points: run.confusion_points,
            at_risk,
            risk_factors,
        }
    }

    /// Grade D/F, or confusion points on more than the configured share of problems
    pub fn is_at_risk(&self, grade: Grade, confusion_points: usize, problem_count: usize) -> bool {
        let confusion_majority =
            confusion_points as f64 > self.config.risk.confusion_majority * problem_count as f64;
        grade.is_at_risk() || confusion_majority
    }

    /// Ordered reasons; absent factors are omitted, never left blank
    pub fn risk_factors(&self, grade: Grade, confusion_points: usize, final_fatigue: f64) -> Vec<String> {
        let mut factors = Vec::new();
        match grade {
            Grade::F => factors.push("very low performance".to_string()),
            Grade::D => factors.push("low performance".to_string()),
            _ => {}
        }
        if confusion_points > 0 {
            factors.push(format!("confusion on {} problems", confusion_points));
        }
        if final_fatigue > self.config.risk.high_fatigue {
            factors.push("high fatigue".to_string());
        }
        factors
    }
}

fn mean_success_percent(outcomes: &[ProblemOutcome]) -> f64 {
    if outcomes.is_empty() {
        return 0.0;
    }
    outcomes.iter().map(|o| o.percentage_successful).sum::<f64>() / outcomes.len() as f64
}
