// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! # Facility-Location Solver
//!
//! A high-level orchestrator that computes a warm start, runs the
//! branch-and-bound engine on one or more threads, and enforces global
//! termination criteria via pluggable monitors (time limit, node limit,
//! external interrupt).
//!
//! ## Highlights
//!
//! - Warm start:
//!   - `WarmStartHeuristic` runs first; its solution is installed into a
//!     `SharedIncumbent` so that prune-by-bound is active from the root on.
//!   - The engine is free to improve on it; it is reported unchanged only if
//!     the search proves nothing better exists.
//! - Engine choice:
//!   - One thread runs `BnbSolver`; more run `ParallelBnbSolver`.
//! - Monitors:
//!   - Every worker gets a `CompositeTreeSearchMonitor` holding a
//!     `WrapperMonitor` over the `siting_search` limits (interrupt, node
//!     limit, time limit) and, on worker 0, an optional
//!     `LogTreeSearchMonitor`.
//!   - The node limit draws from one `AtomicU64` shared by all workers; the
//!     time limit counts from the start of `solve`, warm start included.
//! - Outcome:
//!   - `SolverOutcome` with `Optimal`, `Infeasible`, or, when a limit hits,
//!     `Feasible`/`Unknown` tagged `Aborted(reason)`.
//!
//! ## Usage
//!
//! ```rust
//! use siting_model::{entity::{DemandPoint, Facility}, model::Model};
//! use siting_solver::solver::SolverBuilder;
//! use std::time::Duration;
//!
//! let model = Model::new(
//!     vec![Facility::new("A", 20.0, 10.0), Facility::new("B", 20.0, 1000.0)],
//!     vec![DemandPoint::new("D", 15.0)],
//!     vec![vec![2.0, 2.0]],
//! )
//! .unwrap();
//!
//! let solver = SolverBuilder::new()
//!     .with_time_limit(Duration::from_secs(10))
//!     .build();
//! let outcome = solver.solve(&model).unwrap();
//! assert!(outcome.is_optimal());
//! assert_eq!(outcome.solution().unwrap().objective_value(), 40.0);
//! ```

use log::debug;
use siting_bnb::{
    bnb::BnbSolver,
    branching::BranchingStrategy,
    error::BnbError,
    monitor::{
        composite::CompositeTreeSearchMonitor, log::LogTreeSearchMonitor,
        wrapper::WrapperMonitor,
    },
    parallel::ParallelBnbSolver,
    warm_start::WarmStartHeuristic,
};
use siting_core::num::Tolerance;
use siting_lp::relaxation::RelaxationSolver;
use siting_model::model::Model;
use siting_search::{
    incumbent::SharedIncumbent,
    monitor::{
        composite::CompositeMonitor, interrupt::InterruptMonitor, node_limit::NodeLimitMonitor,
        time_limit::TimeLimitMonitor,
    },
    result::SolverOutcome,
};
use std::{
    sync::atomic::{AtomicBool, AtomicU64},
    time::{Duration, Instant},
};
use thiserror::Error;

/// Failures that prevent `Solver::solve` from producing an outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    #[error(transparent)]
    Bnb(#[from] BnbError),
}

/// A configured facility-location solver. Build one with `SolverBuilder`.
#[derive(Debug, Clone)]
pub struct Solver<'a> {
    time_limit: Option<Duration>,
    node_limit: Option<u64>,
    num_threads: usize,
    warm_start: bool,
    tolerance: Tolerance,
    branching: BranchingStrategy,
    progress_log: bool,
    interrupt: Option<&'a AtomicBool>,
}

impl<'a> Solver<'a> {
    #[inline]
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit
    }

    #[inline]
    pub fn node_limit(&self) -> Option<u64> {
        self.node_limit
    }

    #[inline]
    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    #[inline]
    pub fn uses_warm_start(&self) -> bool {
        self.warm_start
    }

    #[inline]
    pub fn tolerance(&self) -> &Tolerance {
        &self.tolerance
    }

    #[inline]
    pub fn branching(&self) -> BranchingStrategy {
        self.branching
    }

    /// Solves `model`.
    ///
    /// # Errors
    ///
    /// `SolveError::Bnb` if a node relaxation cannot be solved reliably even
    /// with tightened tolerances.
    pub fn solve(&self, model: &Model) -> Result<SolverOutcome, SolveError> {
        let start_time = Instant::now();
        let relaxation = RelaxationSolver::new().with_tolerance(self.tolerance);
        let incumbent = SharedIncumbent::new();

        if self.warm_start {
            match WarmStartHeuristic::new(relaxation).run(model) {
                Some(solution) => {
                    debug!("installing warm start with objective {}", solution.objective_value());
                    incumbent.try_install(&solution);
                }
                None => debug!("no warm start available"),
            }
        }

        let nodes = AtomicU64::new(0);
        let make_monitor = |worker: usize| self.build_monitor(worker, &nodes, start_time);

        let outcome = if self.num_threads <= 1 {
            BnbSolver::new()
                .with_relaxation_solver(relaxation)
                .with_rule(self.branching)
                .solve_with_incumbent(model, make_monitor(0), &incumbent)?
        } else {
            ParallelBnbSolver::new(self.num_threads)
                .with_relaxation_solver(relaxation)
                .with_rule(self.branching)
                .solve_with_incumbent(model, make_monitor, &incumbent)?
        };

        let mut outcome = outcome.into_solver_outcome(self.num_threads);
        outcome.statistics.solve_duration = start_time.elapsed();
        debug!(
            "solve finished in {:?}: {}",
            outcome.statistics.solve_duration, outcome.reason
        );
        Ok(outcome)
    }

    /// Builds the monitor stack for one worker.
    fn build_monitor<'m>(
        &'m self,
        worker: usize,
        nodes: &'m AtomicU64,
        start_time: Instant,
    ) -> CompositeTreeSearchMonitor<'m> {
        let mut limits = CompositeMonitor::with_capacity(3);
        if let Some(flag) = self.interrupt {
            limits.add_monitor(InterruptMonitor::new(flag));
        }
        if let Some(limit) = self.node_limit {
            limits.add_monitor(NodeLimitMonitor::new(nodes, limit));
        }
        if let Some(limit) = self.time_limit {
            limits.add_monitor(
                TimeLimitMonitor::with_clock_check_mask(limit, 0).starting_at(start_time),
            );
        }

        let mut monitor = CompositeTreeSearchMonitor::with_capacity(2);
        monitor.add_monitor(WrapperMonitor::new(limits));
        if self.progress_log && worker == 0 {
            monitor.add_monitor(LogTreeSearchMonitor::default());
        }
        monitor
    }
}

impl std::fmt::Display for Solver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Solver(threads: {}, warm_start: {}, branching: {}, time_limit: {:?}, node_limit: {:?})",
            self.num_threads, self.warm_start, self.branching, self.time_limit, self.node_limit
        )
    }
}

/// Builder for `Solver`.
#[derive(Debug, Clone)]
pub struct SolverBuilder<'a> {
    time_limit: Option<Duration>,
    node_limit: Option<u64>,
    num_threads: usize,
    warm_start: bool,
    tolerance: Tolerance,
    branching: BranchingStrategy,
    progress_log: bool,
    interrupt: Option<&'a AtomicBool>,
}

impl Default for SolverBuilder<'_> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> SolverBuilder<'a> {
    /// Sequential search, warm start on, default tolerances, closest-to-half
    /// branching, no limits.
    #[inline]
    pub fn new() -> Self {
        Self {
            time_limit: None,
            node_limit: None,
            num_threads: 1,
            warm_start: true,
            tolerance: Tolerance::default(),
            branching: BranchingStrategy::default(),
            progress_log: false,
            interrupt: None,
        }
    }

    #[inline]
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Caps the number of nodes popped from the frontier, summed over all
    /// workers.
    #[inline]
    pub fn with_node_limit(mut self, limit: u64) -> Self {
        self.node_limit = Some(limit);
        self
    }

    /// Number of search threads. `1` (and `0`) selects the sequential engine.
    #[inline]
    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads.max(1);
        self
    }

    #[inline]
    pub fn with_warm_start(mut self, enabled: bool) -> Self {
        self.warm_start = enabled;
        self
    }

    #[inline]
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[inline]
    pub fn with_branching(mut self, branching: BranchingStrategy) -> Self {
        self.branching = branching;
        self
    }

    /// Reports progress through `log::info!` while searching.
    #[inline]
    pub fn with_progress_log(mut self, enabled: bool) -> Self {
        self.progress_log = enabled;
        self
    }

    /// Stops the search as soon as `flag` is set.
    #[inline]
    pub fn with_interrupt(mut self, flag: &'a AtomicBool) -> Self {
        self.interrupt = Some(flag);
        self
    }

    #[inline]
    pub fn build(self) -> Solver<'a> {
        Solver {
            time_limit: self.time_limit,
            node_limit: self.node_limit,
            num_threads: self.num_threads,
            warm_start: self.warm_start,
            tolerance: self.tolerance,
            branching: self.branching,
            progress_log: self.progress_log,
            interrupt: self.interrupt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siting_core::num::tolerance::is_near;
    use siting_model::{
        entity::{DemandPoint, Facility},
        index::{DemandIndex, FacilityIndex},
    };
    use siting_search::result::{SolverResult, TerminationReason};
    use std::sync::atomic::Ordering;

    fn two_plant_instance() -> Model {
        Model::new(
            vec![Facility::new("A", 20.0, 10.0), Facility::new("B", 20.0, 1000.0)],
            vec![DemandPoint::new("D", 15.0)],
            vec![vec![2.0, 2.0]],
        )
        .expect("valid model")
    }

    /// Five plants, six customers; closing the priciest plant is not optimal.
    fn mid_sized_instance() -> Model {
        Model::new(
            vec![
                Facility::new("P0", 40.0, 120.0),
                Facility::new("P1", 35.0, 90.0),
                Facility::new("P2", 50.0, 150.0),
                Facility::new("P3", 30.0, 60.0),
                Facility::new("P4", 45.0, 110.0),
            ],
            vec![
                DemandPoint::new("C0", 14.0),
                DemandPoint::new("C1", 22.0),
                DemandPoint::new("C2", 9.0),
                DemandPoint::new("C3", 17.0),
                DemandPoint::new("C4", 25.0),
                DemandPoint::new("C5", 11.0),
            ],
            vec![
                vec![3.0, 8.0, 6.0, 9.0, 4.0],
                vec![7.0, 2.0, 5.0, 6.0, 8.0],
                vec![5.0, 6.0, 2.0, 7.0, 6.0],
                vec![8.0, 4.0, 7.0, 2.0, 5.0],
                vec![4.0, 9.0, 3.0, 8.0, 2.0],
                vec![6.0, 5.0, 8.0, 3.0, 7.0],
            ],
        )
        .expect("valid model")
    }

    fn objective(outcome: &SolverOutcome) -> f64 {
        outcome.solution().expect("solution").objective_value()
    }

    #[test]
    fn test_two_plant_instance() {
        let model = two_plant_instance();
        let outcome = SolverBuilder::new()
            .build()
            .solve(&model)
            .expect("no numeric failure");

        assert!(outcome.is_optimal());
        assert_eq!(outcome.reason, TerminationReason::OptimalityProven);
        let solution = outcome.solution().expect("solution");
        assert!(is_near(solution.objective_value(), 40.0, 1e-9));
        assert!(solution.is_open(FacilityIndex::new(0)));
        assert!(!solution.is_open(FacilityIndex::new(1)));
        assert!(is_near(
            solution.flow(FacilityIndex::new(0), DemandIndex::new(0)),
            15.0,
            1e-9
        ));
        assert_eq!(outcome.statistics.used_threads, 1);
    }

    #[test]
    fn test_insufficient_capacity() {
        let model = Model::new(
            vec![Facility::new("A", 5.0, 1.0)],
            vec![DemandPoint::new("D", 10.0)],
            vec![vec![1.0]],
        )
        .expect("valid model");
        let outcome = SolverBuilder::new()
            .with_threads(2)
            .build()
            .solve(&model)
            .expect("no numeric failure");
        assert!(outcome.is_infeasible());
        assert_eq!(outcome.reason, TerminationReason::InfeasibilityProven);
    }

    #[test]
    fn test_configurations_agree_on_optimum() {
        let model = mid_sized_instance();
        let reference = SolverBuilder::new()
            .build()
            .solve(&model)
            .expect("no numeric failure");
        assert!(reference.is_optimal());
        let expected = objective(&reference);

        let variants = [
            SolverBuilder::new().with_warm_start(false),
            SolverBuilder::new().with_threads(4),
            SolverBuilder::new().with_branching(BranchingStrategy::LowestIndexFractional),
            SolverBuilder::new()
                .with_threads(3)
                .with_warm_start(false)
                .with_progress_log(true),
        ];
        for builder in variants {
            let solver = builder.build();
            let outcome = solver.solve(&model).expect("no numeric failure");
            assert!(outcome.is_optimal(), "{}", solver);
            assert!(
                is_near(objective(&outcome), expected, 1e-6 * expected),
                "{}: {} vs {}",
                solver,
                objective(&outcome),
                expected
            );
        }
    }

    #[test]
    fn test_node_limit_returns_warm_start() {
        let model = two_plant_instance();
        let outcome = SolverBuilder::new()
            .with_node_limit(0)
            .build()
            .solve(&model)
            .expect("no numeric failure");

        assert!(!outcome.is_optimal());
        assert!(matches!(outcome.result, SolverResult::Feasible(_)));
        assert_eq!(
            outcome.reason,
            TerminationReason::Aborted("node limit reached".to_string())
        );
        // The warm start closes the expensive plant, which happens to be optimal.
        assert!(is_near(objective(&outcome), 40.0, 1e-9));
        assert!(is_near(outcome.statistics.best_bound, 37.5, 1e-9));
    }

    #[test]
    fn test_node_limit_without_warm_start_is_unknown() {
        let model = two_plant_instance();
        let outcome = SolverBuilder::new()
            .with_node_limit(0)
            .with_warm_start(false)
            .build()
            .solve(&model)
            .expect("no numeric failure");
        assert!(matches!(outcome.result, SolverResult::Unknown));
        assert!(outcome.is_aborted());
    }

    #[test]
    fn test_interrupt_stops_parallel_search() {
        let model = mid_sized_instance();
        let flag = AtomicBool::new(false);
        flag.store(true, Ordering::Relaxed);

        let outcome = SolverBuilder::new()
            .with_threads(3)
            .with_interrupt(&flag)
            .build()
            .solve(&model)
            .expect("no numeric failure");
        assert_eq!(
            outcome.reason,
            TerminationReason::Aborted("Interrupt signal received".to_string())
        );
        // The warm start is still reported.
        assert!(matches!(outcome.result, SolverResult::Feasible(_)));
    }

    #[test]
    fn test_zero_time_limit_aborts() {
        let model = mid_sized_instance();
        let outcome = SolverBuilder::new()
            .with_time_limit(Duration::ZERO)
            .build()
            .solve(&model)
            .expect("no numeric failure");
        assert_eq!(
            outcome.reason,
            TerminationReason::Aborted("time limit reached".to_string())
        );
        assert!(matches!(outcome.result, SolverResult::Feasible(_)));
    }

    #[test]
    fn test_free_facilities_route_at_minimum_cost() {
        let model = Model::new(
            vec![Facility::new("A", 1.0, 0.0), Facility::new("B", 1.0, 0.0)],
            vec![DemandPoint::new("X", 1.0), DemandPoint::new("Y", 1.0)],
            vec![vec![1.0, 10.0], vec![2.0, 100.0]],
        )
        .expect("valid model");
        // Crossing the assignment costs 10 + 2, the direct one 1 + 100.
        let solver = SolverBuilder::new().with_warm_start(false).build();
        let outcome = solver.solve(&model).expect("no numeric failure");
        assert!(outcome.is_optimal());
        assert!(is_near(objective(&outcome), 12.0, 1e-9));
    }

    #[test]
    fn test_builder_defaults_and_display() {
        let solver = SolverBuilder::new().with_threads(0).build();
        assert_eq!(solver.num_threads(), 1);
        assert!(solver.uses_warm_start());
        assert_eq!(solver.branching(), BranchingStrategy::ClosestToHalf);
        assert_eq!(solver.time_limit(), None);
        assert_eq!(solver.node_limit(), None);
        assert_eq!(
            solver.to_string(),
            "Solver(threads: 1, warm_start: true, branching: ClosestToHalf, time_limit: None, node_limit: None)"
        );
    }

    #[test]
    fn test_solve_error_wraps_engine_error() {
        let err = SolveError::from(BnbError::Numeric {
            node_id: 3,
            iterations: 12,
        });
        assert!(err.to_string().contains("node 3"));
    }
}
