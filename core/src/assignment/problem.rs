//! # Assignment Problems
//!
//! A `Problem` is one decomposed, tagged assignment item. The upstream
//! decomposition step owns text splitting and cognitive-level tagging; this
//! module only models the result and checks that it is well formed before a
//! classroom run consumes it.
//!
//! Validation here rejects, it never clamps. Clamping belongs to the scoring
//! functions of the interaction model.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{SimulationError, SimulationResult};

/// Six-level ordered cognitive taxonomy
///
/// Declaration order is the difficulty order, so the derived `Ord` gives
/// `Remember < Understand < ... < Create`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CognitiveLevel {
    Remember,
    Understand,
    Apply,
    Analyze,
    Evaluate,
    Create,
}

impl CognitiveLevel {
    /// Every level, easiest first
    pub const ALL: [CognitiveLevel; 6] = [
        CognitiveLevel::Remember,
        CognitiveLevel::Understand,
        CognitiveLevel::Apply,
        CognitiveLevel::Analyze,
        CognitiveLevel::Evaluate,
        CognitiveLevel::Create,
    ];

    /// Zero-based position, used to index per-level tuning tables
    pub fn index(self) -> usize {
        self as usize
    }

    /// One-based position in the taxonomy (Remember = 1, Create = 6)
    pub fn ordinal(self) -> u32 {
        self as u32 + 1
    }

    pub fn name(self) -> &'static str {
        match self {
            CognitiveLevel::Remember => "Remember",
            CognitiveLevel::Understand => "Understand",
            CognitiveLevel::Apply => "Apply",
            CognitiveLevel::Analyze => "Analyze",
            CognitiveLevel::Evaluate => "Evaluate",
            CognitiveLevel::Create => "Create",
        }
    }
}

impl fmt::Display for CognitiveLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One assignment item, immutable for the duration of a simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    /// Stable identifier, unique within an assignment
    pub id: String,
    /// Rendered problem content
    pub text: String,
    /// Word count of `text`
    pub length_words: u32,
    /// True if the item contains sub-parts
    pub is_multi_part: bool,
    /// Cognitive level tag, doubling as a difficulty weight
    pub cognitive_level: CognitiveLevel,
    /// Linguistic complexity (0.0-1.0)
    pub linguistic_complexity: f64,
    /// Dissimilarity from neighbouring problems (0.0-1.0)
    pub novelty_score: f64,
    /// 1-based position in assignment order
    pub sequence_index: u32,
}

impl Problem {
    /// Create a problem, deriving `length_words` from the text
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        cognitive_level: CognitiveLevel,
        sequence_index: u32,
    ) -> Self {
        let text = text.into();
        let length_words = text.split_whitespace().count() as u32;
        Self {
            id: id.into(),
            text,
            length_words,
            is_multi_part: false,
            cognitive_level,
            linguistic_complexity: 0.0,
            novelty_score: 0.0,
            sequence_index,
        }
    }

    pub fn with_linguistic_complexity(mut self, complexity: f64) -> Self {
        self.linguistic_complexity = complexity;
        self
    }

    pub fn with_novelty(mut self, novelty: f64) -> Self {
        self.novelty_score = novelty;
        self
    }

    pub fn with_multi_part(mut self, multi_part: bool) -> Self {
        self.is_multi_part = multi_part;
        self
    }

    /// Override the derived word count (e.g. when `text` is an excerpt)
    pub fn with_length_words(mut self, length_words: u32) -> Self {
        self.length_words = length_words;
        self
    }

    /// Check field-level invariants without modifying anything
    pub fn validate(&self) -> SimulationResult<()> {
        if self.id.trim().is_empty() {
            return Err(SimulationError::InvalidProblem {
                id: self.id.clone(),
                reason: "identifier is empty".to_string(),
            });
        }
        if self.sequence_index == 0 {
            return Err(SimulationError::InvalidProblem {
                id: self.id.clone(),
                reason: "sequence index is 1-based".to_string(),
            });
        }
        check_unit_interval(&self.id, "linguistic complexity", self.linguistic_complexity)?;
        check_unit_interval(&self.id, "novelty score", self.novelty_score)?;
        Ok(())
    }
}

fn check_unit_interval(id: &str, field: &str, value: f64) -> SimulationResult<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(SimulationError::InvalidProblem {
            id: id.to_string(),
            reason: format!("{} {} outside [0, 1]", field, value),
        });
    }
    Ok(())
}

/// Validate a whole assignment: non-empty, every problem valid, ids unique,
/// sequence indices exactly `1..=n`.
///
/// Returns the problems ordered by ascending `sequence_index`; the input
/// slice is left untouched.
pub fn validate_assignment(problems: &[Problem]) -> SimulationResult<Vec<&Problem>> {
    if problems.is_empty() {
        return Err(SimulationError::EmptyProblemSet);
    }

    let mut seen_ids = HashSet::with_capacity(problems.len());
    for problem in problems {
        problem.validate()?;
        if !seen_ids.insert(problem.id.as_str()) {
            return Err(SimulationError::DuplicateProblemId(problem.id.clone()));
        }
    }

    let mut ordered: Vec<&Problem> = problems.iter().collect();
    ordered.sort_by_key(|p| p.sequence_index);
    for (position, problem) in ordered.iter().enumerate() {
        let expected = position as u32 + 1;
        if problem.sequence_index != expected {
            return Err(SimulationError::NonContiguousSequence {
                expected,
                found: problem.sequence_index,
            });
        }
    }

    Ok(ordered)
}
