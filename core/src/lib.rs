//! # Preflight Core
//!
//! Assignment simulation engine. Given an assignment decomposed into tagged
//! [`Problem`]s and a roster of synthetic [`LearnerPersona`]s, it predicts
//! per-problem time, success, confusion and engagement for every student,
//! threads fatigue and engagement through each student's run, and aggregates
//! the classroom into population analytics.
//!
//! ```no_run
//! use preflight_core::{catalog, ClassroomSimulator, CognitiveLevel, Problem, SimulationConfig};
//!
//! let problems = vec![
//!     Problem::new("q1", "Define photosynthesis.", CognitiveLevel::Remember, 1),
//!     Problem::new("q2", "Design an experiment to measure it.", CognitiveLevel::Create, 2)
//!         .with_linguistic_complexity(0.6)
//!         .with_novelty(0.7),
//! ];
//! let simulator = ClassroomSimulator::new(SimulationConfig::default())?;
//! let result = simulator.simulate_seeded(&problems, &catalog::full_roster(), 7)?;
//! println!("{} students at risk", result.at_risk_student_count);
//! # Ok::<(), preflight_core::SimulationError>(())
//! ```
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod assignment;
pub mod config;
pub mod error;
pub mod learner;
pub mod simulation;

pub use assignment::{CognitiveLevel, Problem, ProblemRow, SimulationExport};
pub use config::SimulationConfig;
pub use error::{SimulationError, SimulationResult};
pub use learner::{catalog, LearnerPersona, Overlay, PersonaGenerator, PopulationProfile, Traits};
pub use simulation::{
    ClassroomSimulationResult, ClassroomSimulator, Grade, LogObserver, PerStudentSimulation,
    SequentialSimulator, SimulationObserver,
};

/// Engine version recorded in exports
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
