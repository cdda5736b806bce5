//! Synthetic learners: personas, behavioral overlays, the preset catalog and
//! the population-shaped generator.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod catalog;
pub mod generator;
pub mod overlay;
pub mod persona;

pub use generator::{PersonaGenerator, PopulationProfile};
pub use overlay::{Overlay, OverlayEffect, OverlayModifier};
pub use persona::{LearnerPersona, Traits};
