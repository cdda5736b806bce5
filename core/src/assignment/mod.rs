//! Assignment items consumed by the simulation and the export surface that
//! flattens them for display.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod export;
pub mod problem;

pub use export::{ProblemRow, SimulationExport};
pub use problem::{validate_assignment, CognitiveLevel, Problem};
