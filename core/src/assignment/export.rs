//! # Export Surface
//!
//! Display and export helpers for the surrounding application: a JSON
//! document holding the full result set, and a flattened one-row-per-problem
//! table. Neither format carries a compatibility guarantee beyond exposing
//! every field of the data model.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use serde::{Deserialize, Serialize};

use super::problem::{CognitiveLevel, Problem};
use crate::error::SimulationResult;
use crate::simulation::ClassroomSimulationResult;

/// Characters of problem text kept in an excerpt
const EXCERPT_CHARS: usize = 60;

pub const CSV_HEADER: [&str; 8] = [
    "sequence",
    "excerpt",
    "cognitive_level",
    "complexity_percent",
    "novelty_percent",
    "similarity_percent",
    "word_length",
    "multi_part",
];

/// One flattened problem row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemRow {
    pub sequence_number: u32,
    pub text_excerpt: String,
    pub cognitive_level: CognitiveLevel,
    pub complexity_percent: u32,
    pub novelty_percent: u32,
    /// Complement of novelty: how much the problem resembles its neighbours
    pub similarity_percent: u32,
    pub word_length: u32,
    pub multi_part: bool,
}

impl ProblemRow {
    pub fn from_problem(problem: &Problem) -> Self {
        let novelty_percent = to_percent(problem.novelty_score);
        Self {
            sequence_number: problem.sequence_index,
            text_excerpt: excerpt(&problem.text),
            cognitive_level: problem.cognitive_level,
            complexity_percent: to_percent(problem.linguistic_complexity),
            novelty_percent,
            similarity_percent: 100 - novelty_percent,
            word_length: problem.length_words,
            multi_part: problem.is_multi_part,
        }
    }

    fn csv_fields(&self) -> [String; 8] {
        [
            self.sequence_number.to_string(),
            self.text_excerpt.clone(),
            self.cognitive_level.to_string(),
            self.complexity_percent.to_string(),
            self.novelty_percent.to_string(),
            self.similarity_percent.to_string(),
            self.word_length.to_string(),
            self.multi_part.to_string(),
        ]
    }
}

/// Rows in ascending sequence order
pub fn problem_rows(problems: &[Problem]) -> Vec<ProblemRow> {
    let mut rows: Vec<ProblemRow> = problems.iter().map(ProblemRow::from_problem).collect();
    rows.sort_by_key(|row| row.sequence_number);
    rows
}

/// Header line plus one CSV line per problem
pub fn problems_to_csv(problems: &[Problem]) -> String {
    let mut out = String::new();
    out.push_str(&CSV_HEADER.join(","));
    out.push('\n');
    for row in problem_rows(problems) {
        let line: Vec<String> = row.csv_fields().iter().map(|f| csv_escape(f)).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}

/// Full result set ready for JSON export
#[derive(Debug, Clone, Serialize)]
pub struct SimulationExport<'a> {
    pub engine_version: &'static str,
    pub problems: Vec<ProblemRow>,
    pub classroom: &'a ClassroomSimulationResult,
}

impl<'a> SimulationExport<'a> {
    pub fn new(problems: &[Problem], classroom: &'a ClassroomSimulationResult) -> Self {
        Self {
            engine_version: crate::VERSION,
            problems: problem_rows(problems),
            classroom,
        }
    }

    pub fn to_json(&self) -> SimulationResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> SimulationResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn to_percent(fraction: f64) -> u32 {
    (fraction.clamp(0.0, 1.0) * 100.0).round() as u32
}

fn excerpt(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= EXCERPT_CHARS {
        return collapsed;
    }
    let mut cut: String = collapsed.chars().take(EXCERPT_CHARS).collect();
    cut.push_str("...");
    cut
}

fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
