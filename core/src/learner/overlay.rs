//! # Behavioral Overlays
//!
//! An overlay is a named behavioral modifier attached to a persona. Each
//! overlay maps to exactly one modifier function producing an
//! [`OverlayEffect`] for a given problem; a persona's effects are summed and
//! the interaction model applies the sum once. Adding an overlay means adding
//! a variant and its modifier, nothing in the scoring code changes.
//!
//! Overlays never touch perceived success. They shift time, confusion,
//! fatigue accumulation and engagement.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::fmt;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::assignment::Problem;

/// Multi-part problems above this word count strain limited attention further
const ATTENTION_LONG_PROBLEM_WORDS: u32 = 200;
const ATTENTION_FATIGUE_RATE: f64 = 0.25;
const ATTENTION_LONG_PROBLEM_ENGAGEMENT: f64 = -0.05;

const READING_TIME_FACTOR: f64 = 0.3;
const READING_DENSE_TEXT_COMPLEXITY: f64 = 0.7;
const READING_DENSE_TEXT_ENGAGEMENT: f64 = -0.05;

const FATIGUE_SENSITIVE_RATE: f64 = 0.5;

const LANGUAGE_TIME_FACTOR: f64 = 0.2;
const LANGUAGE_COMPLEXITY_THRESHOLD: f64 = 0.6;

/// Named behavioral modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Overlay {
    /// Limited sustained attention, struggles with multi-part items
    AttentionLimiting,
    /// Slow decoding, every word costs more time
    ReadingLimiting,
    /// Tires faster than the base fatigue model predicts
    FatigueSensitive,
    /// Working in a second language
    LanguageLearner,
}

/// Signature shared by every overlay modifier
pub type OverlayModifier = fn(&Problem) -> OverlayEffect;

impl Overlay {
    pub const ALL: [Overlay; 4] = [
        Overlay::AttentionLimiting,
        Overlay::ReadingLimiting,
        Overlay::FatigueSensitive,
        Overlay::LanguageLearner,
    ];

    /// Stable identifier used in exports and persona definitions
    pub fn identifier(self) -> &'static str {
        match self {
            Overlay::AttentionLimiting => "attention-limiting",
            Overlay::ReadingLimiting => "reading-limiting",
            Overlay::FatigueSensitive => "fatigue-sensitive",
            Overlay::LanguageLearner => "language-learner",
        }
    }

    pub fn from_identifier(identifier: &str) -> Option<Overlay> {
        Overlay::ALL
            .iter()
            .copied()
            .find(|overlay| overlay.identifier() == identifier)
    }

    /// Strategy table: overlay identifier to modifier function
    pub fn modifier(self) -> OverlayModifier {
        match self {
            Overlay::AttentionLimiting => attention_limiting,
            Overlay::ReadingLimiting => reading_limiting,
            Overlay::FatigueSensitive => fatigue_sensitive,
            Overlay::LanguageLearner => language_learner,
        }
    }
}

impl fmt::Display for Overlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

/// Additive perturbation of the interaction model's outputs
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OverlayEffect {
    /// Extra fraction of time-on-task (0.3 means 30% longer)
    pub time_factor: f64,
    /// Extra confusion signal points
    pub extra_confusion: u32,
    /// Extra fraction of the per-problem fatigue increment
    pub fatigue_rate: f64,
    /// Shift applied to the engagement score before clamping
    pub engagement_shift: f64,
}

impl OverlayEffect {
    /// Sum the effects of every overlay on one problem
    pub fn compose<'a, I>(overlays: I, problem: &Problem) -> OverlayEffect
    where
        I: IntoIterator<Item = &'a Overlay>,
    {
        overlays
            .into_iter()
            .map(|overlay| (overlay.modifier())(problem))
            .fold(OverlayEffect::default(), |acc, effect| acc + effect)
    }

    pub fn is_neutral(&self) -> bool {
        *self == OverlayEffect::default()
    }
}

impl Add for OverlayEffect {
    type Output = OverlayEffect;

    fn add(self, other: OverlayEffect) -> OverlayEffect {
        OverlayEffect {
            time_factor: self.time_factor + other.time_factor,
            extra_confusion: self.extra_confusion + other.extra_confusion,
            fatigue_rate: self.fatigue_rate + other.fatigue_rate,
            engagement_shift: self.engagement_shift + other.engagement_shift,
        }
    }
}

impl AddAssign for OverlayEffect {
    fn add_assign(&mut self, other: OverlayEffect) {
        *self = *self + other;
    }
}

fn attention_limiting(problem: &Problem) -> OverlayEffect {
    let mut effect = OverlayEffect {
        fatigue_rate: ATTENTION_FATIGUE_RATE,
        ..OverlayEffect::default()
    };
    if problem.is_multi_part {
        effect.extra_confusion = 1;
        if problem.length_words > ATTENTION_LONG_PROBLEM_WORDS {
            effect.engagement_shift = ATTENTION_LONG_PROBLEM_ENGAGEMENT;
        }
    }
    effect
}

fn reading_limiting(problem: &Problem) -> OverlayEffect {
    OverlayEffect {
        time_factor: READING_TIME_FACTOR,
        engagement_shift: if problem.linguistic_complexity > READING_DENSE_TEXT_COMPLEXITY {
            READING_DENSE_TEXT_ENGAGEMENT
        } else {
            0.0
        },
        ..OverlayEffect::default()
    }
}

fn fatigue_sensitive(_problem: &Problem) -> OverlayEffect {
    OverlayEffect {
        fatigue_rate: FATIGUE_SENSITIVE_RATE,
        ..OverlayEffect::default()
    }
}

fn language_learner(problem: &Problem) -> OverlayEffect {
    OverlayEffect {
        time_factor: LANGUAGE_TIME_FACTOR,
        extra_confusion: u32::from(problem.linguistic_complexity > LANGUAGE_COMPLEXITY_THRESHOLD),
        ..OverlayEffect::default()
    }
}
