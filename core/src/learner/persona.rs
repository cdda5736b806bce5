//! Learner personas: synthetic students with stable trait scores.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::overlay::Overlay;

/// Four trait scores, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "TraitScores")]
pub struct Traits {
    pub reading_proficiency: f64,
    pub quantitative_fluency: f64,
    pub sustained_attention: f64,
    pub self_confidence: f64,
}

/// Unchecked wire form; converting into `Traits` clamps every score
#[derive(Deserialize)]
struct TraitScores {
    reading_proficiency: f64,
    quantitative_fluency: f64,
    sustained_attention: f64,
    self_confidence: f64,
}

impl From<TraitScores> for Traits {
    fn from(raw: TraitScores) -> Self {
        Traits::new(
            raw.reading_proficiency,
            raw.quantitative_fluency,
            raw.sustained_attention,
            raw.self_confidence,
        )
    }
}

impl Traits {
    /// Create trait scores, clamping each into [0, 1]
    pub fn new(reading: f64, quantitative: f64, attention: f64, confidence: f64) -> Self {
        Self {
            reading_proficiency: clamp_unit(reading),
            quantitative_fluency: clamp_unit(quantitative),
            sustained_attention: clamp_unit(attention),
            self_confidence: clamp_unit(confidence),
        }
    }

    /// Every trait at the same value
    pub fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value)
    }
}

/// Clamp into [0, 1]; non-finite scores count as zero
pub(crate) fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// One synthetic student, immutable during a simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnerPersona {
    pub id: String,
    pub display_name: String,
    pub traits: Traits,
    /// Deduplicated behavioral modifiers
    #[serde(default)]
    pub overlays: BTreeSet<Overlay>,
    /// Display-only labels, never read by scoring
    #[serde(default)]
    pub narrative_tags: Vec<String>,
}

impl LearnerPersona {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, traits: Traits) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            traits,
            overlays: BTreeSet::new(),
            narrative_tags: Vec::new(),
        }
    }

    pub fn with_overlay(mut self, overlay: Overlay) -> Self {
        self.overlays.insert(overlay);
        self
    }

    pub fn with_overlays(mut self, overlays: impl IntoIterator<Item = Overlay>) -> Self {
        self.overlays.extend(overlays);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.narrative_tags.push(tag.into());
        self
    }

    pub fn has_overlay(&self, overlay: Overlay) -> bool {
        self.overlays.contains(&overlay)
    }
}
