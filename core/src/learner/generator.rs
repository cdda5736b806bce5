//! # Persona Generator
//!
//! Draws randomized rosters shaped like a target population. Each trait is
//! sampled from a normal distribution around the population mean and clamped
//! into [0, 1]. Overlays are attached two ways:
//!
//! * by prevalence, an independent draw per overlay;
//! * by implication, when a sampled trait falls below the low-trait threshold
//!   (low attention implies attention-limiting, low reading implies
//!   reading-limiting).
//!
//! The generator consumes the caller's RNG, so a seeded `ChaCha20Rng` replays
//! the same roster.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::BTreeMap;

use log::debug;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use super::overlay::Overlay;
use super::persona::{LearnerPersona, Traits};
use crate::error::{SimulationError, SimulationResult};

/// Shape of the population a roster is drawn from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationProfile {
    pub trait_means: Traits,
    pub trait_std_dev: f64,
    /// Probability that a generated persona carries each overlay
    pub overlay_prevalence: BTreeMap<Overlay, f64>,
    /// Traits sampled below this imply the matching overlay
    pub low_trait_threshold: f64,
}

impl Default for PopulationProfile {
    fn default() -> Self {
        let mut overlay_prevalence = BTreeMap::new();
        overlay_prevalence.insert(Overlay::AttentionLimiting, 0.1);
        overlay_prevalence.insert(Overlay::ReadingLimiting, 0.08);
        overlay_prevalence.insert(Overlay::FatigueSensitive, 0.12);
        overlay_prevalence.insert(Overlay::LanguageLearner, 0.1);

        Self {
            trait_means: Traits::uniform(0.65),
            trait_std_dev: 0.15,
            overlay_prevalence,
            low_trait_threshold: 0.3,
        }
    }
}

/// Randomized, population-shaped persona source
#[derive(Debug, Clone)]
pub struct PersonaGenerator {
    profile: PopulationProfile,
    id_prefix: String,
    reading: Normal<f64>,
    quantitative: Normal<f64>,
    attention: Normal<f64>,
    confidence: Normal<f64>,
}

impl PersonaGenerator {
    /// Build a generator, rejecting unusable population parameters
    pub fn new(profile: PopulationProfile) -> SimulationResult<Self> {
        for (overlay, prevalence) in &profile.overlay_prevalence {
            if !(0.0..=1.0).contains(prevalence) {
                return Err(SimulationError::InvalidPopulation(format!(
                    "prevalence of {} must lie in [0, 1], got {}",
                    overlay, prevalence
                )));
            }
        }
        if !(0.0..=1.0).contains(&profile.low_trait_threshold) {
            return Err(SimulationError::InvalidPopulation(format!(
                "low trait threshold must lie in [0, 1], got {}",
                profile.low_trait_threshold
            )));
        }

        if !(profile.trait_std_dev.is_finite() && profile.trait_std_dev >= 0.0) {
            return Err(SimulationError::InvalidPopulation(format!(
                "trait standard deviation must be finite and non-negative, got {}",
                profile.trait_std_dev
            )));
        }
        let means = profile.trait_means;
        for (name, mean) in [
            ("reading_proficiency", means.reading_proficiency),
            ("quantitative_fluency", means.quantitative_fluency),
            ("sustained_attention", means.sustained_attention),
            ("self_confidence", means.self_confidence),
        ] {
            if !(mean.is_finite() && (0.0..=1.0).contains(&mean)) {
                return Err(SimulationError::InvalidPopulation(format!(
                    "mean {} must be a finite value in [0, 1], got {}",
                    name, mean
                )));
            }
        }

        let normal = |mean: f64| {
            Normal::new(mean, profile.trait_std_dev)
                .map_err(|e| SimulationError::InvalidPopulation(format!("trait distribution: {}", e)))
        };

        Ok(Self {
            reading: normal(means.reading_proficiency)?,
            quantitative: normal(means.quantitative_fluency)?,
            attention: normal(means.sustained_attention)?,
            confidence: normal(means.self_confidence)?,
            id_prefix: "generated".to_string(),
            profile,
        })
    }

    /// Prefix for generated ids (`<prefix>-001`, `<prefix>-002`, ...)
    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = prefix.into();
        self
    }

    pub fn profile(&self) -> &PopulationProfile {
        &self.profile
    }

    /// Draw `count` personas
    pub fn generate<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<LearnerPersona> {
        let roster: Vec<LearnerPersona> = (1..=count).map(|n| self.draw_one(n, rng)).collect();
        debug!(
            "Generated {} personas ({} with overlays)",
            roster.len(),
            roster.iter().filter(|p| !p.overlays.is_empty()).count()
        );
        roster
    }

    fn draw_one<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> LearnerPersona {
        let traits = Traits::new(
            self.reading.sample(rng),
            self.quantitative.sample(rng),
            self.attention.sample(rng),
            self.confidence.sample(rng),
        );

        let mut persona = LearnerPersona::new(
            format!("{}-{:03}", self.id_prefix, n),
            format!("Student {}", n),
            traits,
        )
        .with_tag("generated");

        for (&overlay, &prevalence) in &self.profile.overlay_prevalence {
            if rng.gen::<f64>() < prevalence {
                persona = persona.with_overlay(overlay);
            }
        }

        let threshold = self.profile.low_trait_threshold;
        if traits.sustained_attention < threshold {
            persona = persona.with_overlay(Overlay::AttentionLimiting);
        }
        if traits.reading_proficiency < threshold {
            persona = persona.with_overlay(Overlay::ReadingLimiting);
        }

        persona
    }
}
