//! The simulation pipeline, leaves first: the pairwise interaction model, the
//! per-student sequential simulator, the outcome summarizer and the classroom
//! aggregator.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod classroom;
pub mod interaction;
pub mod observer;
pub mod sequential;
pub mod summary;

pub use classroom::{ClassroomSimulationResult, ClassroomSimulator, ProblemAnalytics};
pub use interaction::{InteractionModel, PairwiseInteractionResult};
pub use observer::{LogObserver, NoopObserver, SimulationObserver};
pub use sequential::{
    ConfusionLevel, EngagementLevel, EngagementTrajectory, EngagementTrend, FatigueTrajectory,
    ProblemOutcome, SequentialSimulator,
};
pub use summary::{Grade, OutcomeSummarizer, PerStudentSimulation};
