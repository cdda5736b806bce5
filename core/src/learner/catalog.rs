//! # Persona Catalog
//!
//! Fixed learner archetypes for quick classroom previews. Presets are built on
//! demand so every caller owns its roster; ids are stable across releases and
//! safe to persist in the surrounding application.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use super::overlay::Overlay;
use super::persona::{LearnerPersona, Traits};

/// Stable ids of every preset, in catalog order
pub const PRESET_IDS: [&str; 8] = [
    "steady-achiever",
    "struggling-reader",
    "distracted-sprinter",
    "anxious-perfectionist",
    "confident-improviser",
    "english-learner",
    "quantitative-specialist",
    "tired-commuter",
];

/// Look up one preset by id
pub fn preset(id: &str) -> Option<LearnerPersona> {
    let persona = match id {
        "steady-achiever" => LearnerPersona::new(id, "Steady Achiever", Traits::new(0.85, 0.8, 0.8, 0.75))
            .with_tag("completes work early")
            .with_tag("rarely asks for help"),
        "struggling-reader" => LearnerPersona::new(id, "Struggling Reader", Traits::new(0.35, 0.6, 0.6, 0.45))
            .with_overlay(Overlay::ReadingLimiting)
            .with_tag("rereads instructions")
            .with_tag("strong verbally"),
        "distracted-sprinter" => {
            LearnerPersona::new(id, "Distracted Sprinter", Traits::new(0.7, 0.65, 0.3, 0.7))
                .with_overlay(Overlay::AttentionLimiting)
                .with_tag("fast starter")
                .with_tag("loses thread on long tasks")
        }
        "anxious-perfectionist" => {
            LearnerPersona::new(id, "Anxious Perfectionist", Traits::new(0.8, 0.75, 0.7, 0.3))
                .with_overlay(Overlay::FatigueSensitive)
                .with_tag("double-checks every answer")
        }
        "confident-improviser" => {
            LearnerPersona::new(id, "Confident Improviser", Traits::new(0.6, 0.55, 0.5, 0.9))
                .with_tag("skims instructions")
                .with_tag("enjoys open-ended prompts")
        }
        "english-learner" => LearnerPersona::new(id, "English Learner", Traits::new(0.45, 0.75, 0.7, 0.55))
            .with_overlay(Overlay::LanguageLearner)
            .with_tag("translating while reading"),
        "quantitative-specialist" => {
            LearnerPersona::new(id, "Quantitative Specialist", Traits::new(0.55, 0.95, 0.75, 0.65))
                .with_tag("prefers numbers to prose")
        }
        "tired-commuter" => LearnerPersona::new(id, "Tired Commuter", Traits::new(0.65, 0.6, 0.45, 0.55))
            .with_overlays([Overlay::FatigueSensitive, Overlay::AttentionLimiting])
            .with_tag("works late evenings")
            .with_tag("part-time job"),
        _ => return None,
    };
    Some(persona)
}

/// Every preset, in catalog order
pub fn full_roster() -> Vec<LearnerPersona> {
    PRESET_IDS.iter().filter_map(|id| preset(id)).collect()
}
