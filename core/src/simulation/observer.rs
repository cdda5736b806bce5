//! Injectable observers for classroom runs.
//!
//! The aggregator reports each finished student, each non-fatal warning and
//! the final result through a `SimulationObserver` instead of stashing
//! payloads in global state. The default observer does nothing.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::{debug, info, warn};

use super::classroom::ClassroomSimulationResult;
use super::summary::PerStudentSimulation;

pub trait SimulationObserver: Send + Sync {
    fn on_student_simulated(&self, _student: &PerStudentSimulation) {}

    fn on_warning(&self, _warning: &str) {}

    fn on_classroom_simulated(&self, _result: &ClassroomSimulationResult) {}
}

/// Discards every callback
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SimulationObserver for NoopObserver {}

/// Routes callbacks to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl SimulationObserver for LogObserver {
    fn on_student_simulated(&self, student: &PerStudentSimulation) {
        debug!(
            "{} ({}): score {}% grade {} at_risk={} factors={:?}",
            student.display_name,
            student.student_id,
            student.estimated_score_percent,
            student.estimated_grade,
            student.at_risk,
            student.risk_factors
        );
    }

    fn on_warning(&self, warning: &str) {
        warn!("{}", warning);
    }

    fn on_classroom_simulated(&self, result: &ClassroomSimulationResult) {
        info!(
            "Classroom of {} on {} problems: average {}%, completion {}%, {} at risk",
            result.student_count,
            result.problem_count,
            result.average_score,
            result.completion_rate,
            result.at_risk_student_count
        );
    }
}
