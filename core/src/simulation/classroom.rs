//! # Classroom Aggregator
//!
//! Runs the sequential simulator for every persona in a roster against the
//! same problem sequence and reduces the per-student results into population
//! analytics.
//!
//! ## Randomness
//!
//! The caller's RNG is consumed once per persona, in roster order, to seed a
//! dedicated `ChaCha20Rng` for that persona. Draws are therefore independent
//! across personas, and a sequential run and a parallel run from the same
//! master seed produce identical results.
//!
//! ## Failure policy
//!
//! Empty problem lists and empty rosters fail fast. There is no partial
//! result: either every persona is simulated and aggregated or an error is
//! returned.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use log::{debug, info};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::observer::{NoopObserver, SimulationObserver};
use super::sequential::{EngagementTrend, SequentialSimulator};
use super::summary::{Grade, OutcomeSummarizer, PerStudentSimulation};
use crate::assignment::{validate_assignment, CognitiveLevel, Problem};
use crate::config::SimulationConfig;
use crate::error::{SimulationError, SimulationResult};
use crate::learner::LearnerPersona;

/// Population view of one problem across the roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemAnalytics {
    pub problem_id: String,
    pub sequence_index: u32,
    pub cognitive_level: CognitiveLevel,
    pub mean_success_percent: f64,
    pub mean_time_seconds: f64,
    /// Personas for whom this problem was a confusion point
    pub confusion_count: usize,
    /// Share of personas whose Bernoulli draw succeeded (0.0-1.0)
    pub observed_correct_rate: f64,
}

/// Aggregate over every persona for one assignment run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassroomSimulationResult {
    pub student_count: usize,
    pub problem_count: usize,
    /// Mean estimated score percent, rounded
    pub average_score: f64,
    /// Mean total time in minutes, rounded
    pub average_time_minutes: f64,
    /// Percent of personas not graded F, rounded
    pub completion_rate: f64,
    /// Percent of problems at each level; all six levels present
    pub bloom_coverage: BTreeMap<CognitiveLevel, f64>,
    /// Most frequently flagged problem ids, most common first
    pub common_confusion_points: Vec<String>,
    pub at_risk_student_count: usize,
    pub grade_distribution: BTreeMap<Grade, usize>,
    pub engagement_trends: BTreeMap<EngagementTrend, usize>,
    pub problem_analytics: Vec<ProblemAnalytics>,
    pub students: Vec<PerStudentSimulation>,
    /// Non-fatal findings about the run
    pub warnings: Vec<String>,
}

/// Runs and aggregates whole-classroom simulations
pub struct ClassroomSimulator {
    config: SimulationConfig,
    observer: Arc<dyn SimulationObserver>,
}

impl ClassroomSimulator {
    /// Create a simulator, rejecting inconsistent tuning
    pub fn new(config: SimulationConfig) -> SimulationResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            observer: Arc::new(NoopObserver),
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn SimulationObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Simulate with a fresh master generator seeded from `seed`
    pub fn simulate_seeded(
        &self,
        problems: &[Problem],
        roster: &[LearnerPersona],
        seed: u64,
    ) -> SimulationResult<ClassroomSimulationResult> {
        self.simulate(problems, roster, &mut ChaCha20Rng::seed_from_u64(seed))
    }

    /// Simulate every persona and aggregate
    pub fn simulate<R: Rng + ?Sized>(
        &self,
        problems: &[Problem],
        roster: &[LearnerPersona],
        rng: &mut R,
    ) -> SimulationResult<ClassroomSimulationResult> {
        let ordered = validate_assignment(problems)?;
        if roster.is_empty() {
            return Err(SimulationError::EmptyRoster);
        }

        info!(
            "Simulating {} personas on {} problems ({})",
            roster.len(),
            ordered.len(),
            if self.config.aggregation.parallel { "parallel" } else { "sequential" }
        );

        let seeds: Vec<u64> = roster.iter().map(|_| rng.next_u64()).collect();
        let simulator = SequentialSimulator::new(&self.config);
        let summarizer = OutcomeSummarizer::new(&self.config);

        let run_persona = |(persona, seed): (&LearnerPersona, &u64)| {
            let mut persona_rng = ChaCha20Rng::seed_from_u64(*seed);
            let run = simulator.run_ordered(persona, &ordered, &mut persona_rng);
            summarizer.summarize(persona, run)
        };

        let students: Vec<PerStudentSimulation> = if self.config.aggregation.parallel {
            roster.par_iter().zip(seeds.par_iter()).map(run_persona).collect()
        } else {
            roster.iter().zip(seeds.iter()).map(run_persona).collect()
        };

        for student in &students {
            self.observer.on_student_simulated(student);
        }

        let warnings = collect_warnings(roster, &students);
        for warning in &warnings {
            self.observer.on_warning(warning);
        }

        let result = self.aggregate(&ordered, students, warnings);
        self.observer.on_classroom_simulated(&result);
        Ok(result)
    }

    fn aggregate(
        &self,
        ordered: &[&Problem],
        students: Vec<PerStudentSimulation>,
        warnings: Vec<String>,
    ) -> ClassroomSimulationResult {
        let student_count = students.len();
        let n = student_count as f64;

        let average_score = (students.iter().map(|s| s.estimated_score_percent).sum::<f64>() / n).round();
        let average_time_minutes =
            (students.iter().map(|s| s.total_time_minutes as f64).sum::<f64>() / n).round();
        let passing = students.iter().filter(|s| !s.estimated_grade.is_failing()).count();
        let completion_rate = (100.0 * passing as f64 / n).round();
        let at_risk_student_count = students.iter().filter(|s| s.at_risk).count();

        let mut grade_distribution: BTreeMap<Grade, usize> = Grade::ALL.iter().map(|&g| (g, 0)).collect();
        let mut engagement_trends: BTreeMap<EngagementTrend, usize> = [
            EngagementTrend::Improving,
            EngagementTrend::Declining,
            EngagementTrend::Stable,
        ]
        .iter()
        .map(|&t| (t, 0))
        .collect();
        for student in &students {
            *grade_distribution.entry(student.estimated_grade).or_insert(0) += 1;
            *engagement_trends.entry(student.engagement_trajectory.trend).or_insert(0) += 1;
        }

        let problem_analytics = problem_analytics(ordered, &students);
        let common_confusion_points =
            rank_confusion_points(&problem_analytics, self.config.aggregation.top_confusion_points);

        debug!(
            "Aggregated {} students: grades {:?}, top confusion {:?}",
            student_count, grade_distribution, common_confusion_points
        );

        ClassroomSimulationResult {
            student_count,
            problem_count: ordered.len(),
            average_score,
            average_time_minutes,
            completion_rate,
            bloom_coverage: bloom_coverage(ordered),
            common_confusion_points,
            at_risk_student_count,
            grade_distribution,
            engagement_trends,
            problem_analytics,
            students,
            warnings,
        }
    }
}

/// Percent of problems at each cognitive level, from the problems alone
pub fn bloom_coverage(problems: &[&Problem]) -> BTreeMap<CognitiveLevel, f64> {
    let total = problems.len();
    CognitiveLevel::ALL
        .iter()
        .map(|&level| {
            let count = problems.iter().filter(|p| p.cognitive_level == level).count();
            let percent = if total == 0 {
                0.0
            } else {
                100.0 * count as f64 / total as f64
            };
            (level, percent)
        })
        .collect()
}

/// Problem ids ranked by confusion count (descending), ties by sequence index
pub fn rank_confusion_points(analytics: &[ProblemAnalytics], top_n: usize) -> Vec<String> {
    let mut flagged: Vec<&ProblemAnalytics> = analytics.iter().filter(|a| a.confusion_count > 0).collect();
    flagged.sort_by(|a, b| {
        b.confusion_count
            .cmp(&a.confusion_count)
            .then(a.sequence_index.cmp(&b.sequence_index))
    });
    flagged
        .into_iter()
        .take(top_n)
        .map(|a| a.problem_id.clone())
        .collect()
}

fn problem_analytics(ordered: &[&Problem], students: &[PerStudentSimulation]) -> Vec<ProblemAnalytics> {
    let n = students.len().max(1) as f64;

    let mut confusion_counts: HashMap<&str, usize> = HashMap::new();
    for student in students {
        for id in &student.confusion_points {
            *confusion_counts.entry(id.as_str()).or_insert(0) += 1;
        }
    }

    ordered
        .iter()
        .enumerate()
        .map(|(position, problem)| {
            let outcomes = students.iter().filter_map(|s| s.problem_outcomes.get(position));
            let (success, time, correct) = outcomes.fold((0.0, 0.0, 0usize), |(s, t, c), o| {
                (
                    s + o.percentage_successful,
                    t + o.time_seconds as f64,
                    c + usize::from(o.actual_correct),
                )
            });

            ProblemAnalytics {
                problem_id: problem.id.clone(),
                sequence_index: problem.sequence_index,
                cognitive_level: problem.cognitive_level,
                mean_success_percent: success / n,
                mean_time_seconds: time / n,
                confusion_count: confusion_counts.get(problem.id.as_str()).copied().unwrap_or(0),
                observed_correct_rate: correct as f64 / n,
            }
        })
        .collect()
}

fn collect_warnings(roster: &[LearnerPersona], students: &[PerStudentSimulation]) -> Vec<String> {
    let mut warnings = Vec::new();

    let mut seen = HashSet::with_capacity(roster.len());
    for persona in roster {
        if !seen.insert(persona.id.as_str()) {
            warnings.push(format!(
                "persona id '{}' appears more than once in the roster",
                persona.id
            ));
        }
    }

    for student in students {
        if student.at_risk && student.risk_factors.is_empty() {
            warnings.push(format!(
                "student '{}' is at risk but has no risk factors",
                student.student_id
            ));
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::learner::{catalog, Overlay, Traits};
    use std::sync::Mutex;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn scenario_problems() -> Vec<Problem> {
        use CognitiveLevel::*;
        [Analyze, Analyze, Evaluate, Understand, Create]
            .iter()
            .enumerate()
            .map(|(i, &level)| {
                Problem::new(format!("q{}", i + 1), "Discuss the causes of the event.", level, i as u32 + 1)
                    .with_length_words(120)
                    .with_linguistic_complexity(0.55)
                    .with_novelty(0.35 + 0.1 * i as f64)
                    .with_multi_part(i % 2 == 0)
            })
            .collect()
    }

    fn scenario_roster() -> Vec<LearnerPersona> {
        vec![
            LearnerPersona::new("a", "Avery", Traits::new(0.6, 0.7, 0.8, 0.9)),
            LearnerPersona::new("b", "Blake", Traits::new(0.9, 0.6, 0.7, 0.6)),
            LearnerPersona::new("c", "Casey", Traits::new(0.7, 0.9, 0.6, 0.7)),
            LearnerPersona::new("d", "Devon", Traits::new(0.8, 0.8, 0.9, 0.8)),
            LearnerPersona::new("e", "Emery", Traits::new(0.6, 0.6, 0.6, 0.6)),
            LearnerPersona::new("f", "Finley", Traits::new(0.75, 0.65, 0.85, 0.7))
                .with_overlay(Overlay::AttentionLimiting),
        ]
    }

    #[test]
    fn test_reference_scenario() {
        init_logging();
        let simulator = ClassroomSimulator::new(SimulationConfig::default()).unwrap();
        let result = simulator
            .simulate_seeded(&scenario_problems(), &scenario_roster(), 42)
            .unwrap();

        let coverage = &result.bloom_coverage;
        assert_relative_eq!(coverage[&CognitiveLevel::Understand], 20.0, epsilon = 1e-9);
        assert_relative_eq!(coverage[&CognitiveLevel::Analyze], 40.0, epsilon = 1e-9);
        assert_relative_eq!(coverage[&CognitiveLevel::Evaluate], 20.0, epsilon = 1e-9);
        assert_relative_eq!(coverage[&CognitiveLevel::Create], 20.0, epsilon = 1e-9);
        assert_eq!(coverage[&CognitiveLevel::Remember], 0.0);
        assert_eq!(coverage[&CognitiveLevel::Apply], 0.0);

        assert!(result.at_risk_student_count <= 6);
        let recount = result
            .students
            .iter()
            .filter(|s| {
                s.estimated_grade.is_at_risk() || s.confusion_points.len() as f64 > 0.5 * result.problem_count as f64
            })
            .count();
        assert_eq!(result.at_risk_student_count, recount);

        assert_eq!(result.student_count, 6);
        assert_eq!(result.problem_count, 5);
        assert_eq!(result.students.len(), 6);
        assert_eq!(result.grade_distribution.values().sum::<usize>(), 6);
        assert_eq!(result.engagement_trends.values().sum::<usize>(), 6);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_per_student_invariants_hold_for_generated_rosters() {
        use crate::learner::{PersonaGenerator, PopulationProfile};

        let generator = PersonaGenerator::new(PopulationProfile {
            trait_std_dev: 0.3,
            ..PopulationProfile::default()
        })
        .unwrap();
        let roster = generator.generate(40, &mut ChaCha20Rng::seed_from_u64(17));
        let problems = scenario_problems();

        let simulator = ClassroomSimulator::new(SimulationConfig::default()).unwrap();
        let result = simulator.simulate_seeded(&problems, &roster, 17).unwrap();

        let coverage_total: f64 = result.bloom_coverage.values().sum();
        assert_relative_eq!(coverage_total, 100.0, epsilon = 0.01);

        for student in &result.students {
            let majority = student.confusion_points.len() as f64 > 0.5 * problems.len() as f64;
            assert_eq!(student.at_risk, student.estimated_grade.is_at_risk() || majority);
            if student.at_risk {
                assert!(!student.risk_factors.is_empty());
            }
            assert!(student.risk_factors.iter().all(|f| !f.trim().is_empty()));
            assert!(student.fatigue_trajectory.final_value >= student.fatigue_trajectory.initial);

            let first = &student.problem_outcomes[0];
            let mid = &student.problem_outcomes[problems.len() / 2];
            let last = &student.problem_outcomes[problems.len() - 1];
            assert_eq!(student.engagement_trajectory.initial, first.engagement_score);
            assert_eq!(student.engagement_trajectory.at_midpoint, mid.engagement_score);
            assert_eq!(student.engagement_trajectory.final_value, last.engagement_score);
        }
    }

    #[test]
    fn test_aggregate_statistics() {
        let simulator = ClassroomSimulator::new(SimulationConfig::default()).unwrap();
        let roster = catalog::full_roster();
        let result = simulator.simulate_seeded(&scenario_problems(), &roster, 5).unwrap();

        let n = roster.len() as f64;
        let mean_score = result.students.iter().map(|s| s.estimated_score_percent).sum::<f64>() / n;
        assert_eq!(result.average_score, mean_score.round());

        let mean_minutes = result.students.iter().map(|s| s.total_time_minutes as f64).sum::<f64>() / n;
        assert_eq!(result.average_time_minutes, mean_minutes.round());

        let not_failing = result.students.iter().filter(|s| s.estimated_grade != Grade::F).count();
        assert_eq!(result.completion_rate, (100.0 * not_failing as f64 / n).round());

        for analytics in &result.problem_analytics {
            assert!((0.0..=1.0).contains(&analytics.observed_correct_rate));
            assert!(analytics.mean_success_percent >= 10.0);
        }
        assert!(result.common_confusion_points.len() <= 5);
    }

    #[test]
    fn test_confusion_ranking_breaks_ties_by_sequence() {
        let problems = vec![
            Problem::new("p3", "text", CognitiveLevel::Create, 3)
                .with_novelty(0.9)
                .with_linguistic_complexity(0.9)
                .with_multi_part(true),
            Problem::new("p1", "text", CognitiveLevel::Apply, 1)
                .with_novelty(0.9)
                .with_linguistic_complexity(0.9),
            Problem::new("p2", "text", CognitiveLevel::Create, 2)
                .with_novelty(0.9)
                .with_linguistic_complexity(0.9)
                .with_multi_part(true),
            Problem::new("p4", "text", CognitiveLevel::Remember, 4)
                .with_novelty(0.1)
                .with_linguistic_complexity(0.1),
        ];
        let roster = vec![
            LearnerPersona::new("weak", "Weak", Traits::uniform(0.1)),
            LearnerPersona::new("strong", "Strong", Traits::uniform(0.9)).with_overlay(Overlay::AttentionLimiting),
        ];

        let simulator = ClassroomSimulator::new(SimulationConfig::default()).unwrap();
        let result = simulator.simulate_seeded(&problems, &roster, 1).unwrap();
        assert_eq!(result.common_confusion_points, vec!["p2", "p3", "p1"]);

        let counts: Vec<usize> = result.problem_analytics.iter().map(|a| a.confusion_count).collect();
        assert_eq!(counts, vec![1, 2, 2, 0]);

        let mut config = SimulationConfig::default();
        config.aggregation.top_confusion_points = 2;
        let truncated = ClassroomSimulator::new(config)
            .unwrap()
            .simulate_seeded(&problems, &roster, 1)
            .unwrap();
        assert_eq!(truncated.common_confusion_points, vec!["p2", "p3"]);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let roster = catalog::full_roster();
        let problems = scenario_problems();

        let sequential = ClassroomSimulator::new(SimulationConfig::default())
            .unwrap()
            .simulate_seeded(&problems, &roster, 99)
            .unwrap();

        let mut config = SimulationConfig::default();
        config.aggregation.parallel = true;
        let parallel = ClassroomSimulator::new(config)
            .unwrap()
            .simulate_seeded(&problems, &roster, 99)
            .unwrap();

        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_empty_inputs_fail_fast() {
        let simulator = ClassroomSimulator::new(SimulationConfig::default()).unwrap();

        let err = simulator.simulate_seeded(&[], &scenario_roster(), 0).unwrap_err();
        assert!(matches!(err, SimulationError::EmptyProblemSet));

        let err = simulator.simulate_seeded(&scenario_problems(), &[], 0).unwrap_err();
        assert!(matches!(err, SimulationError::EmptyRoster));
    }

    #[test]
    fn test_invalid_problem_is_rejected_not_clamped() {
        let mut problems = scenario_problems();
        problems[2].novelty_score = 1.7;
        let simulator = ClassroomSimulator::new(SimulationConfig::default()).unwrap();
        let err = simulator.simulate_seeded(&problems, &scenario_roster(), 0).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidProblem { .. }));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = SimulationConfig::default();
        config.grades.d = 95.0;
        assert!(ClassroomSimulator::new(config).is_err());
    }

    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<String>>,
    }

    impl SimulationObserver for RecordingObserver {
        fn on_student_simulated(&self, student: &PerStudentSimulation) {
            self.events.lock().unwrap().push(format!("student:{}", student.student_id));
        }

        fn on_warning(&self, warning: &str) {
            self.events.lock().unwrap().push(format!("warning:{}", warning));
        }

        fn on_classroom_simulated(&self, result: &ClassroomSimulationResult) {
            self.events.lock().unwrap().push(format!("classroom:{}", result.student_count));
        }
    }

    #[test]
    fn test_observer_receives_callbacks_in_order() {
        let observer = Arc::new(RecordingObserver::default());
        let simulator = ClassroomSimulator::new(SimulationConfig::default())
            .unwrap()
            .with_observer(observer.clone());

        let roster = vec![
            LearnerPersona::new("x", "X", Traits::uniform(0.7)),
            LearnerPersona::new("x", "X again", Traits::uniform(0.7)),
        ];
        let result = simulator.simulate_seeded(&scenario_problems(), &roster, 3).unwrap();
        assert_eq!(result.warnings.len(), 1);

        let events = observer.events.lock().unwrap();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0], "student:x");
        assert_eq!(events[1], "student:x");
        assert!(events[2].starts_with("warning:persona id 'x'"));
        assert_eq!(events[3], "classroom:2");
    }

    #[test]
    fn test_repeated_runs_draw_independently() {
        let roster: Vec<LearnerPersona> = (0..10)
            .map(|i| LearnerPersona::new(format!("s{}", i), "Student", Traits::uniform(0.3)))
            .collect();
        let problems: Vec<Problem> = (1..=20)
            .map(|i| Problem::new(format!("p{}", i), "text", CognitiveLevel::Evaluate, i))
            .collect();
        let simulator = ClassroomSimulator::new(SimulationConfig::default()).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(8);

        let first = simulator.simulate(&problems, &roster, &mut rng).unwrap();
        let second = simulator.simulate(&problems, &roster, &mut rng).unwrap();

        let draws = |r: &ClassroomSimulationResult| -> Vec<bool> {
            r.students
                .iter()
                .flat_map(|s| s.problem_outcomes.iter().map(|o| o.actual_correct))
                .collect()
        };
        assert_ne!(draws(&first), draws(&second));
        assert_eq!(first.average_score, second.average_score);
    }
}
