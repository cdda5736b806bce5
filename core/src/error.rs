//! Error taxonomy for the simulation engine.
//!
//! Every error here is fatal for the call that produced it: the engine has no
//! transient failure modes, so nothing is retried and no partial result is
//! ever returned. Non-fatal findings travel inside the result as warnings.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use thiserror::Error;

/// Simulation engine error types
#[derive(Error, Debug)]
pub enum SimulationError {
    /// The classroom aggregator was handed no problems
    #[error("Cannot simulate an assignment with no problems")]
    EmptyProblemSet,

    /// The classroom aggregator was handed no personas
    #[error("Cannot simulate a classroom with an empty persona roster")]
    EmptyRoster,

    /// A problem failed field validation
    #[error("Invalid problem '{id}': {reason}")]
    InvalidProblem { id: String, reason: String },

    /// Two problems in one assignment share an identifier
    #[error("Duplicate problem id '{0}' in assignment")]
    DuplicateProblemId(String),

    /// Sequence indices are not exactly 1..=n
    #[error("Non-contiguous problem sequence: expected index {expected}, found {found}")]
    NonContiguousSequence { expected: u32, found: u32 },

    /// Tuning constants are inconsistent
    #[error("Invalid simulation configuration: {0}")]
    InvalidConfiguration(String),

    /// Persona generator population parameters are unusable
    #[error("Invalid population profile: {0}")]
    InvalidPopulation(String),

    /// JSON encoding or decoding failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading a configuration file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for simulation engine operations
pub type SimulationResult<T> = Result<T, SimulationError>;
