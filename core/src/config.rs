//! # Simulation Tuning Configuration
//!
//! Every coefficient the engine uses is an empirically chosen tuning constant,
//! not a law. They are grouped here by the component that consumes them and
//! injected into the simulators, so a caller can replay a run under
//! alternative weights without touching the scoring code.
//!
//! `SimulationConfig::default()` reproduces the reference calibration. Partial
//! JSON overrides are accepted: any omitted field keeps its default.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::assignment::CognitiveLevel;
use crate::error::{SimulationError, SimulationResult};

/// Complete tuning set for one simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SimulationConfig {
    pub interaction: InteractionTuning,
    pub confusion: ConfusionTuning,
    pub engagement: EngagementTuning,
    pub fatigue: FatigueTuning,
    pub bands: BandThresholds,
    pub grades: GradeThresholds,
    pub risk: RiskTuning,
    pub aggregation: AggregationTuning,
}

/// Ability weighting, difficulty scale and time-on-task coefficients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionTuning {
    /// Weight of reading proficiency in the ability score
    pub reading_weight: f64,
    /// Weight of quantitative fluency in the ability score
    pub quantitative_weight: f64,
    /// Weight of self-confidence in the ability score
    pub confidence_weight: f64,
    /// Upper end of the scaled ability range (ability is mapped to 0..scale)
    pub ability_scale: f64,
    /// Lowest perceived success any pairing can receive
    pub success_floor: f64,
    /// Highest perceived success any pairing can receive
    pub success_ceiling: f64,
    /// Difficulty weight per cognitive level, Remember first
    pub difficulty_weights: [f64; 6],
    /// Time multiplier per cognitive level, Remember first
    pub time_multipliers: [f64; 6],
    /// How strongly linguistic complexity stretches reading time
    pub complexity_time_factor: f64,
}

impl Default for InteractionTuning {
    fn default() -> Self {
        Self {
            reading_weight: 0.4,
            quantitative_weight: 0.3,
            confidence_weight: 0.3,
            ability_scale: 5.0,
            success_floor: 0.1,
            success_ceiling: 1.0,
            difficulty_weights: [1.0, 1.5, 2.0, 3.0, 3.5, 4.5],
            time_multipliers: [1.0, 1.3, 1.6, 2.0, 2.4, 2.8],
            complexity_time_factor: 1.5,
        }
    }
}

impl InteractionTuning {
    pub fn difficulty_weight(&self, level: CognitiveLevel) -> f64 {
        self.difficulty_weights[level.index()]
    }

    pub fn time_multiplier(&self, level: CognitiveLevel) -> f64 {
        self.time_multipliers[level.index()]
    }
}

/// Point system for confusion signals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfusionTuning {
    pub novelty_high_threshold: f64,
    pub novelty_high_points: u32,
    pub novelty_moderate_threshold: f64,
    pub novelty_moderate_points: u32,
    pub complexity_threshold: f64,
    /// Readers below this proficiency get the larger complexity penalty
    pub reading_support_threshold: f64,
    pub complexity_unsupported_points: u32,
    pub complexity_points: u32,
    pub level_gap_severe: u32,
    pub level_gap_severe_points: u32,
    pub level_gap_moderate: u32,
    pub level_gap_moderate_points: u32,
}

impl Default for ConfusionTuning {
    fn default() -> Self {
        Self {
            novelty_high_threshold: 0.75,
            novelty_high_points: 2,
            novelty_moderate_threshold: 0.5,
            novelty_moderate_points: 1,
            complexity_threshold: 0.7,
            reading_support_threshold: 0.6,
            complexity_unsupported_points: 2,
            complexity_points: 1,
            level_gap_severe: 2,
            level_gap_severe_points: 3,
            level_gap_moderate: 1,
            level_gap_moderate_points: 1,
        }
    }
}

/// Engagement weighting and the novelty "sweet spot"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementTuning {
    pub novelty_weight: f64,
    pub success_weight: f64,
    pub fatigue_weight: f64,
    pub confidence_weight: f64,
    pub sweet_spot_low: f64,
    pub sweet_spot_high: f64,
    /// Share of the fatigue index subtracted from the fatigue discount
    pub fatigue_discount: f64,
}

impl Default for EngagementTuning {
    fn default() -> Self {
        Self {
            novelty_weight: 0.3,
            success_weight: 0.3,
            fatigue_weight: 0.3,
            confidence_weight: 0.1,
            sweet_spot_low: 0.3,
            sweet_spot_high: 0.7,
            fatigue_discount: 0.5,
        }
    }
}

/// Fatigue accumulation coefficients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FatigueTuning {
    /// Fatigue added per unit of expected failure
    pub failure_rate: f64,
    /// Seconds of work that add one full unit of fatigue
    pub seconds_per_unit: f64,
}

impl Default for FatigueTuning {
    fn default() -> Self {
        Self {
            failure_rate: 0.1,
            seconds_per_unit: 3600.0,
        }
    }
}

/// Low/medium/high classification boundaries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandThresholds {
    /// Signal counts below this are low confusion
    pub confusion_medium: u32,
    /// Signal counts at or above this are high confusion
    pub confusion_high: u32,
    pub engagement_medium: f64,
    pub engagement_high: f64,
}

impl Default for BandThresholds {
    fn default() -> Self {
        Self {
            confusion_medium: 2,
            confusion_high: 4,
            engagement_medium: 0.35,
            engagement_high: 0.65,
        }
    }
}

/// Minimum score percent for each passing letter grade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradeThresholds {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl Default for GradeThresholds {
    fn default() -> Self {
        Self {
            a: 90.0,
            b: 80.0,
            c: 70.0,
            d: 60.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskTuning {
    /// Fraction of problems that must be confusion points to flag a student
    pub confusion_majority: f64,
    /// Final fatigue above this is reported as a risk factor
    pub high_fatigue: f64,
}

impl Default for RiskTuning {
    fn default() -> Self {
        Self {
            confusion_majority: 0.5,
            high_fatigue: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationTuning {
    /// Length of the common-confusion-point ranking
    pub top_confusion_points: usize,
    /// Run per-persona simulations on the rayon pool
    pub parallel: bool,
}

impl Default for AggregationTuning {
    fn default() -> Self {
        Self {
            top_confusion_points: 5,
            parallel: false,
        }
    }
}

impl SimulationConfig {
    /// Parse a (possibly partial) JSON override and validate it
    pub fn from_json_str(json: &str) -> SimulationResult<Self> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> SimulationResult<Self> {
        let path = path.as_ref();
        debug!("Loading simulation config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Reject tuning that would make the model ill-defined
    pub fn validate(&self) -> SimulationResult<()> {
        let i = &self.interaction;
        non_negative("interaction.reading_weight", i.reading_weight)?;
        non_negative("interaction.quantitative_weight", i.quantitative_weight)?;
        non_negative("interaction.confidence_weight", i.confidence_weight)?;
        if !(i.ability_scale.is_finite() && i.ability_scale > 0.0) {
            return invalid("interaction.ability_scale must be positive");
        }
        if !(0.0..=1.0).contains(&i.success_floor)
            || !(0.0..=1.0).contains(&i.success_ceiling)
            || i.success_floor > i.success_ceiling
        {
            return invalid("interaction success bounds must satisfy 0 <= floor <= ceiling <= 1");
        }
        ascending("interaction.difficulty_weights", &i.difficulty_weights)?;
        ascending("interaction.time_multipliers", &i.time_multipliers)?;
        if i.time_multipliers[0] <= 0.0 {
            return invalid("interaction.time_multipliers must be positive");
        }
        non_negative("interaction.complexity_time_factor", i.complexity_time_factor)?;

        let c = &self.confusion;
        unit_interval("confusion.novelty_high_threshold", c.novelty_high_threshold)?;
        unit_interval("confusion.novelty_moderate_threshold", c.novelty_moderate_threshold)?;
        unit_interval("confusion.complexity_threshold", c.complexity_threshold)?;
        unit_interval("confusion.reading_support_threshold", c.reading_support_threshold)?;
        if c.novelty_moderate_threshold > c.novelty_high_threshold {
            return invalid("confusion novelty thresholds are inverted");
        }
        if c.level_gap_moderate > c.level_gap_severe {
            return invalid("confusion level gap thresholds are inverted");
        }

        let e = &self.engagement;
        non_negative("engagement.novelty_weight", e.novelty_weight)?;
        non_negative("engagement.success_weight", e.success_weight)?;
        non_negative("engagement.fatigue_weight", e.fatigue_weight)?;
        non_negative("engagement.confidence_weight", e.confidence_weight)?;
        if !(0.0 <= e.sweet_spot_low && e.sweet_spot_low < e.sweet_spot_high && e.sweet_spot_high < 1.0) {
            return invalid("engagement sweet spot must satisfy 0 <= low < high < 1");
        }
        non_negative("engagement.fatigue_discount", e.fatigue_discount)?;

        non_negative("fatigue.failure_rate", self.fatigue.failure_rate)?;
        if !(self.fatigue.seconds_per_unit.is_finite() && self.fatigue.seconds_per_unit > 0.0) {
            return invalid("fatigue.seconds_per_unit must be positive");
        }

        let b = &self.bands;
        unit_interval("bands.engagement_medium", b.engagement_medium)?;
        unit_interval("bands.engagement_high", b.engagement_high)?;
        if b.confusion_medium > b.confusion_high || b.engagement_medium > b.engagement_high {
            return invalid("band thresholds must be ascending");
        }

        let g = &self.grades;
        for (field, value) in [("grades.a", g.a), ("grades.b", g.b), ("grades.c", g.c), ("grades.d", g.d)] {
            non_negative(field, value)?;
        }
        if !(g.a >= g.b && g.b >= g.c && g.c >= g.d) {
            return invalid("grade thresholds must descend from A to D");
        }

        unit_interval("risk.confusion_majority", self.risk.confusion_majority)?;
        unit_interval("risk.high_fatigue", self.risk.high_fatigue)?;

        Ok(())
    }
}

fn invalid(message: &str) -> SimulationResult<()> {
    Err(SimulationError::InvalidConfiguration(message.to_string()))
}

fn non_negative(field: &str, value: f64) -> SimulationResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(SimulationError::InvalidConfiguration(format!(
            "{} must be a non-negative number, got {}",
            field, value
        )));
    }
    Ok(())
}

fn unit_interval(field: &str, value: f64) -> SimulationResult<()> {
    if !(value.is_finite() && (0.0..=1.0).contains(&value)) {
        return Err(SimulationError::InvalidConfiguration(format!(
            "{} must lie in [0, 1], got {}",
            field, value
        )));
    }
    Ok(())
}

fn ascending(field: &str, values: &[f64]) -> SimulationResult<()> {
    if values.iter().any(|v| !v.is_finite()) || values.windows(2).any(|w| w[0] > w[1]) {
        return Err(SimulationError::InvalidConfiguration(format!(
            "{} must increase with cognitive level",
            field
        )));
    }
    Ok(())
}
