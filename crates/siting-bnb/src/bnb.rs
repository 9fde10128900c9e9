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

//! Branch-and-bound solver for capacitated facility location.
//!
//! This module implements the sequential best-first search over facility
//! activation decisions. Every node is bounded by the transportation
//! relaxation solved under its activation bounds; nodes whose bound cannot
//! beat the incumbent are pruned, integral nodes yield candidate solutions,
//! and the remaining nodes are split on one fractional facility into a
//! closed child and an open child.
//!
//! The `BnbSolver` itself is stateless between runs: it holds the
//! relaxation solver configuration and the branching rule. Each call to one
//! of the `solve*` methods creates a search session that owns the frontier,
//! the local incumbent and the statistics of that run. Children are solved
//! as soon as they are created, so the frontier only ever holds evaluated
//! nodes and best-first order is exact.
//!
//! The incumbent is read through an `IncumbentStore`: isolated runs use
//! `NoSharedIncumbent`, while `solve_with_incumbent` reads and publishes
//! through a `SharedIncumbent` so that a warm start (or another search)
//! contributes to pruning.

use crate::{
    branching::{BranchingRule, BranchingStrategy},
    error::BnbError,
    eval::NodeEvaluator,
    frontier::Frontier,
    incumbent::{IncumbentStore, NoSharedIncumbent, SharedIncumbentAdapter},
    monitor::tree_search_monitor::{PruneReason, TreeSearchMonitor},
    node::Node,
    result::BnbSolverOutcome,
    stats::BnbSolverStatistics,
};
use log::{debug, trace};
use siting_lp::{bounds::ActivationBounds, relaxation::RelaxationSolver};
use siting_model::{model::Model, solution::Solution};
use siting_search::{
    incumbent::SharedIncumbent, monitor::search_monitor::SearchCommand,
    result::TerminationReason,
};
use smallvec::SmallVec;

/// A best-first branch-and-bound solver over facility activations.
///
/// The relaxation of every node is solved by a `RelaxationSolver`, and the
/// facility to branch on is chosen by a `BranchingRule`.
#[derive(Debug, Clone)]
pub struct BnbSolver<B = BranchingStrategy> {
    relaxation: RelaxationSolver,
    rule: B,
}

impl Default for BnbSolver<BranchingStrategy> {
    fn default() -> Self {
        Self::new()
    }
}

impl BnbSolver<BranchingStrategy> {
    /// Creates a solver with default tolerances and closest-to-half branching.
    #[inline]
    pub fn new() -> Self {
        Self {
            relaxation: RelaxationSolver::new(),
            rule: BranchingStrategy::default(),
        }
    }
}

impl<B> BnbSolver<B>
where
    B: BranchingRule,
{
    /// Replaces the branching rule.
    #[inline]
    pub fn with_rule<R>(self, rule: R) -> BnbSolver<R>
    where
        R: BranchingRule,
    {
        BnbSolver {
            relaxation: self.relaxation,
            rule,
        }
    }

    /// Replaces the relaxation solver, and with it the tolerances used for
    /// integrality and pruning decisions.
    #[inline]
    pub fn with_relaxation_solver(mut self, relaxation: RelaxationSolver) -> Self {
        self.relaxation = relaxation;
        self
    }

    #[inline]
    pub fn relaxation_solver(&self) -> &RelaxationSolver {
        &self.relaxation
    }

    #[inline]
    pub fn rule(&self) -> &B {
        &self.rule
    }

    /// Solves `model` in isolation.
    ///
    /// # Errors
    ///
    /// `BnbError::Numeric` if a node relaxation cannot be solved reliably.
    pub fn solve<S>(&self, model: &Model, monitor: S) -> Result<BnbSolverOutcome, BnbError>
    where
        S: TreeSearchMonitor,
    {
        self.solve_internal(model, monitor, NoSharedIncumbent::new(), None)
    }

    /// Solves `model` starting from a known feasible solution.
    ///
    /// The warm start only serves as the initial upper bound: it is returned
    /// if the search proves nothing better exists, and replaced otherwise.
    pub fn solve_with_warm_start<S>(
        &self,
        model: &Model,
        warm_start: Solution,
        monitor: S,
    ) -> Result<BnbSolverOutcome, BnbError>
    where
        S: TreeSearchMonitor,
    {
        self.solve_internal(model, monitor, NoSharedIncumbent::new(), Some(warm_start))
    }

    /// Solves `model` while reading and publishing the upper bound through
    /// `incumbent`. A solution already installed there takes part in pruning
    /// and is reported if the search does not improve on it.
    pub fn solve_with_incumbent<S>(
        &self,
        model: &Model,
        monitor: S,
        incumbent: &SharedIncumbent,
    ) -> Result<BnbSolverOutcome, BnbError>
    where
        S: TreeSearchMonitor,
    {
        let backing = SharedIncumbentAdapter::new(incumbent);
        self.solve_internal(model, monitor, backing, None)
    }

    #[inline(always)]
    fn solve_internal<S, I>(
        &self,
        model: &Model,
        mut monitor: S,
        backing: I,
        warm_start: Option<Solution>,
    ) -> Result<BnbSolverOutcome, BnbError>
    where
        S: TreeSearchMonitor,
        I: IncumbentStore,
    {
        let expander = NodeExpander::new(NodeEvaluator::new(model, &self.relaxation), &self.rule);
        let session =
            BnbSolverSearchSession::new(model, expander, &mut monitor, backing, warm_start);
        session.run()
    }
}

impl<B> std::fmt::Display for BnbSolver<B>
where
    B: BranchingRule,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BnbSolver(rule: {}, tolerance: {})",
            self.rule.name(),
            self.relaxation.tolerance()
        )
    }
}

/// What processing a popped node produced.
pub(crate) enum Expansion {
    /// The node was discarded.
    Pruned,
    /// The node's relaxation is integral. Whether the solution improves on
    /// the incumbent is for the caller to decide.
    Integral { node: Node, solution: Solution },
    /// The node was split; holds the children that survived evaluation.
    Branched(SmallVec<[Node; 2]>),
}

/// Node processing shared by the sequential and the parallel engine.
pub(crate) struct NodeExpander<'a, B> {
    evaluator: NodeEvaluator<'a>,
    rule: &'a B,
}

impl<'a, B> NodeExpander<'a, B>
where
    B: BranchingRule,
{
    #[inline]
    pub(crate) fn new(evaluator: NodeEvaluator<'a>, rule: &'a B) -> Self {
        Self { evaluator, rule }
    }

    #[inline]
    pub(crate) fn evaluator(&self) -> &NodeEvaluator<'a> {
        &self.evaluator
    }

    /// Evaluates the root node. `None` means the model is infeasible.
    pub(crate) fn root<S>(
        &self,
        monitor: &mut S,
        stats: &mut BnbSolverStatistics,
    ) -> Result<Option<Node>, BnbError>
    where
        S: TreeSearchMonitor,
    {
        let bounds = ActivationBounds::root(self.evaluator.model().num_facilities());
        let Some(root) = self.evaluator.evaluate(0, 0, bounds, stats)? else {
            debug!("root relaxation is infeasible");
            return Ok(None);
        };
        debug!(
            "root lower bound {} after {} pivots, max fractionality {}",
            root.lower_bound(),
            root.relaxation().iterations(),
            root.relaxation().max_fractionality()
        );
        stats.set_root_lower_bound(root.lower_bound());
        monitor.on_node_evaluated(&root, stats);
        Ok(Some(root))
    }

    /// Processes `node` against the upper bound `upper_bound`.
    ///
    /// Child ids are drawn from `next_id`. Children that are infeasible or
    /// already dominated are pruned here and never reach the frontier.
    pub(crate) fn expand<S, F>(
        &self,
        node: Node,
        upper_bound: f64,
        mut next_id: F,
        monitor: &mut S,
        stats: &mut BnbSolverStatistics,
    ) -> Result<Expansion, BnbError>
    where
        S: TreeSearchMonitor,
        F: FnMut() -> u64,
    {
        let tolerance = self.evaluator.tolerance();
        if tolerance.is_dominated(node.lower_bound(), upper_bound) {
            trace!(
                "node {}: bound {} dominated by incumbent {}",
                node.id(),
                node.lower_bound(),
                upper_bound
            );
            stats.on_pruning_bound();
            monitor.on_prune(node.bounds(), PruneReason::BoundDominated, stats);
            return Ok(Expansion::Pruned);
        }

        let Some(facility) = self
            .rule
            .select(node.relaxation(), node.bounds(), tolerance)
        else {
            stats.on_integral_node();
            let solution = self.evaluator.to_solution(node.relaxation());
            return Ok(Expansion::Integral { node, solution });
        };

        trace!(
            "node {}: branching on facility {} (open value {})",
            node.id(),
            facility,
            node.relaxation().open_value(facility)
        );
        monitor.on_branch(&node, facility, stats);

        let depth = node.depth() + 1;
        let mut children = SmallVec::new();
        for bounds in [
            node.bounds().with_closed(facility),
            node.bounds().with_open(facility),
        ] {
            let id = next_id();
            let Some(child) = self.evaluator.evaluate(id, depth, bounds.clone(), stats)? else {
                trace!("node {}: infeasible", id);
                stats.on_pruning_infeasible();
                monitor.on_prune(&bounds, PruneReason::Infeasible, stats);
                continue;
            };
            if tolerance.is_dominated(child.lower_bound(), upper_bound) {
                trace!("node {}: bound {} dominated on creation", id, child.lower_bound());
                stats.on_pruning_bound();
                monitor.on_prune(child.bounds(), PruneReason::BoundDominated, stats);
                continue;
            }
            monitor.on_node_evaluated(&child, stats);
            children.push(child);
        }
        Ok(Expansion::Branched(children))
    }
}

/// A search session for the sequential solver.
/// This struct encapsulates the state and logic
/// of a single search run.
struct BnbSolverSearchSession<'a, B, S, I>
where
    I: IncumbentStore,
{
    model: &'a Model,
    expander: NodeExpander<'a, B>,
    monitor: &'a mut S,
    incumbent: I,
    frontier: Frontier,
    next_id: u64,
    best_objective: f64,
    best_solution: Option<Solution>,
    stats: BnbSolverStatistics,
    start_time: std::time::Instant,
}

impl<B, S, I> std::fmt::Debug for BnbSolverSearchSession<'_, B, S, I>
where
    I: IncumbentStore,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchSession")
            .field("frontier", &self.frontier)
            .field("next_id", &self.next_id)
            .field("best_objective", &self.best_objective)
            .field("best_solution", &self.best_solution)
            .field("stats", &self.stats)
            .finish()
    }
}

impl<'a, B, S, I> BnbSolverSearchSession<'a, B, S, I>
where
    B: BranchingRule,
    S: TreeSearchMonitor,
    I: IncumbentStore,
{
    #[inline]
    fn new(
        model: &'a Model,
        expander: NodeExpander<'a, B>,
        monitor: &'a mut S,
        incumbent: I,
        warm_start: Option<Solution>,
    ) -> Self {
        let mut best_objective = incumbent.initial_upper_bound();
        let mut best_solution = None;
        if let Some(solution) = warm_start {
            if solution.objective_value() < best_objective {
                best_objective = solution.objective_value();
                best_solution = Some(solution);
            }
        }

        Self {
            model,
            expander,
            monitor,
            incumbent,
            frontier: Frontier::new(),
            next_id: 1,
            best_objective,
            best_solution,
            stats: BnbSolverStatistics::default(),
            start_time: std::time::Instant::now(),
        }
    }

    /// Run the search session.
    fn run(mut self) -> Result<BnbSolverOutcome, BnbError> {
        self.monitor.on_enter_search(self.model, &self.stats);
        let reason = self.search();
        self.stats.set_total_time(self.start_time.elapsed());
        self.monitor.on_exit_search(&self.stats);

        let reason = reason?;
        debug!(
            "search finished: {} after {} nodes",
            reason, self.stats.nodes_explored
        );
        Ok(self.finalize_result(reason))
    }

    fn search(&mut self) -> Result<TerminationReason, BnbError> {
        let Some(root) = self.expander.root(&mut *self.monitor, &mut self.stats)? else {
            return Ok(TerminationReason::InfeasibilityProven);
        };
        self.frontier.push(root);

        loop {
            self.best_objective = self.incumbent.tighten(self.best_objective);

            let Some(node) = self.frontier.pop() else {
                return Ok(if self.best_objective.is_finite() {
                    TerminationReason::OptimalityProven
                } else {
                    TerminationReason::InfeasibilityProven
                });
            };

            self.stats.on_node_explored();
            self.monitor.on_step(&node, &self.stats);
            if let SearchCommand::Terminate(msg) = self.monitor.search_command(&node, &self.stats)
            {
                // The node stays open; its bound still counts for the final gap.
                self.frontier.push(node);
                return Ok(TerminationReason::Aborted(msg));
            }

            self.process(node)?;
        }
    }

    fn process(&mut self, node: Node) -> Result<(), BnbError> {
        let next_id = &mut self.next_id;
        let expansion = self.expander.expand(
            node,
            self.best_objective,
            || {
                let id = *next_id;
                *next_id += 1;
                id
            },
            &mut *self.monitor,
            &mut self.stats,
        )?;

        match expansion {
            Expansion::Pruned => {}
            Expansion::Integral { node, solution } => self.handle_integral(node, solution),
            Expansion::Branched(children) => {
                for child in children {
                    self.frontier.push(child);
                }
            }
        }
        Ok(())
    }

    fn handle_integral(&mut self, node: Node, solution: Solution) {
        let tolerance = self.expander.evaluator().tolerance();
        if !tolerance.is_improvement(solution.objective_value(), self.best_objective) {
            trace!(
                "node {}: integral with objective {}, not better than {}",
                node.id(),
                solution.objective_value(),
                self.best_objective
            );
            self.stats.on_pruning_bound();
            self.monitor
                .on_prune(node.bounds(), PruneReason::BoundDominated, &self.stats);
            return;
        }

        debug_assert!(
            self.model
                .check_solution(solution.activation(), solution.flows(), tolerance)
                .is_empty(),
            "integral node {} produced an infeasible solution",
            node.id()
        );
        debug!(
            "node {}: new incumbent with objective {} (previous {})",
            node.id(),
            solution.objective_value(),
            self.best_objective
        );

        self.stats.on_solution_found();
        self.monitor.on_solution_found(&solution, &self.stats);
        self.incumbent.on_solution_found(&solution);
        self.best_objective = solution.objective_value();
        self.best_solution = Some(solution);
    }

    /// The better of the local best solution and the store's snapshot.
    fn best_known_solution(&mut self) -> Option<Solution> {
        let local = self.best_solution.take();
        match (local, self.incumbent.snapshot()) {
            (Some(a), Some(b)) => Some(if b.objective_value() < a.objective_value() {
                b
            } else {
                a
            }),
            (a, b) => a.or(b),
        }
    }

    /// Finalize the solver result based on the best solution found
    /// and the termination reason.
    fn finalize_result(mut self, reason: TerminationReason) -> BnbSolverOutcome {
        let solution = self.best_known_solution();
        match reason {
            TerminationReason::OptimalityProven => match solution {
                Some(solution) => {
                    self.stats.set_best_bound(solution.objective_value());
                    BnbSolverOutcome::optimal(solution, self.stats)
                }
                None => {
                    debug_assert!(false, "optimality proven without an incumbent");
                    BnbSolverOutcome::infeasible(self.stats)
                }
            },
            TerminationReason::InfeasibilityProven => BnbSolverOutcome::infeasible(self.stats),
            TerminationReason::Aborted(msg) => {
                let open = self.frontier.best_bound().unwrap_or(f64::INFINITY);
                self.stats.set_best_bound(open.min(self.best_objective));
                BnbSolverOutcome::aborted(solution, msg, self.stats)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        branching::lowest_index::LowestIndexFractional, monitor::no_op::NoOperationMonitor,
        monitor::wrapper::WrapperMonitor, warm_start::WarmStartHeuristic,
    };
    use siting_core::num::{Tolerance, tolerance::is_near};
    use siting_model::{
        entity::{DemandPoint, Facility},
        index::{DemandIndex, FacilityIndex},
    };
    use siting_search::{
        monitor::node_limit::NodeLimitMonitor,
        result::SolverResult,
    };
    use std::{
        cell::{Cell, RefCell},
        rc::Rc,
        sync::atomic::AtomicU64,
    };

    /// A cheap and an expensive plant competing for one demand point.
    /// The optimum opens only the cheap plant at objective 40.
    pub(crate) fn two_plant_instance() -> Model {
        Model::new(
            vec![Facility::new("A", 20.0, 10.0), Facility::new("B", 20.0, 1000.0)],
            vec![DemandPoint::new("D", 15.0)],
            vec![vec![2.0, 2.0]],
        )
        .expect("valid model")
    }

    /// The evaluated root of `two_plant_instance`.
    pub(crate) fn root_node_of_two_plant_instance() -> Node {
        let model = two_plant_instance();
        let evaluator = NodeEvaluator::new(&model, &RelaxationSolver::new());
        evaluator
            .evaluate(
                0,
                0,
                ActivationBounds::root(2),
                &mut BnbSolverStatistics::default(),
            )
            .expect("no numeric failure")
            .expect("feasible root")
    }

    fn fi(i: usize) -> FacilityIndex {
        FacilityIndex::new(i)
    }

    fn assert_accepted(model: &Model, solution: &Solution) {
        assert!(
            model
                .check_solution(solution.activation(), solution.flows(), &Tolerance::default())
                .is_empty()
        );
        let recomputed = model.evaluate_objective(solution.activation(), solution.flows());
        assert!(is_near(recomputed, solution.objective_value(), 1e-9));
    }

    #[derive(Default)]
    struct Trace {
        entered: Cell<u32>,
        exited: Cell<u32>,
        branched_bounds: RefCell<Vec<f64>>,
        solutions: RefCell<Vec<f64>>,
        prunes: RefCell<Vec<PruneReason>>,
    }

    struct TracingMonitor(Rc<Trace>);

    impl TreeSearchMonitor for TracingMonitor {
        fn name(&self) -> &str {
            "TracingMonitor"
        }
        fn on_enter_search(&mut self, _model: &Model, _statistics: &BnbSolverStatistics) {
            self.0.entered.set(self.0.entered.get() + 1);
        }
        fn on_exit_search(&mut self, _statistics: &BnbSolverStatistics) {
            self.0.exited.set(self.0.exited.get() + 1);
        }
        fn on_step(&mut self, _node: &Node, _statistics: &BnbSolverStatistics) {}
        fn on_node_evaluated(&mut self, _node: &Node, _statistics: &BnbSolverStatistics) {}
        fn on_prune(
            &mut self,
            _bounds: &ActivationBounds,
            reason: PruneReason,
            _statistics: &BnbSolverStatistics,
        ) {
            self.0.prunes.borrow_mut().push(reason);
        }
        fn on_branch(
            &mut self,
            node: &Node,
            _facility: FacilityIndex,
            _statistics: &BnbSolverStatistics,
        ) {
            self.0.branched_bounds.borrow_mut().push(node.lower_bound());
        }
        fn on_solution_found(&mut self, solution: &Solution, _statistics: &BnbSolverStatistics) {
            self.0.solutions.borrow_mut().push(solution.objective_value());
        }
    }

    #[test]
    fn test_two_plant_instance_opens_cheap_plant() {
        let model = two_plant_instance();
        let outcome = BnbSolver::new()
            .solve(&model, NoOperationMonitor::new())
            .expect("no numeric failure");

        assert!(outcome.is_optimal());
        assert_eq!(
            outcome.termination_reason(),
            &TerminationReason::OptimalityProven
        );
        let solution = outcome.solution().expect("optimal solution");
        assert!(is_near(solution.objective_value(), 40.0, 1e-9));
        assert!(solution.is_open(fi(0)));
        assert!(!solution.is_open(fi(1)));
        assert!(is_near(solution.flow(fi(0), DemandIndex::new(0)), 15.0, 1e-9));
        assert_eq!(solution.flow(fi(1), DemandIndex::new(0)), 0.0);
        assert_accepted(&model, solution);

        let stats = outcome.statistics();
        assert!(is_near(stats.root_lower_bound, 37.5, 1e-9));
        assert!(is_near(stats.best_bound, 40.0, 1e-9));
        assert_eq!(stats.solutions_found, 1);
    }

    #[test]
    fn test_both_plants_needed_for_demand() {
        let model = Model::new(
            vec![Facility::new("A", 5.0, 5.0), Facility::new("B", 10.0, 5.0)],
            vec![DemandPoint::new("D", 12.0)],
            vec![vec![1.0, 3.0]],
        )
        .expect("valid model");
        let outcome = BnbSolver::new()
            .solve(&model, NoOperationMonitor::new())
            .expect("no numeric failure");

        let solution = outcome.solution().expect("optimal solution");
        assert!(outcome.is_optimal());
        assert_eq!(solution.num_open(), 2);
        // Fill the cheap plant, send the rest from the other one.
        assert!(is_near(solution.flow(fi(0), DemandIndex::new(0)), 5.0, 1e-9));
        assert!(is_near(solution.flow(fi(1), DemandIndex::new(0)), 7.0, 1e-9));
        assert!(is_near(solution.objective_value(), 36.0, 1e-9));
        assert_accepted(&model, solution);
    }

    #[test]
    fn test_trickle_flow_through_large_facility_is_branched() {
        // At the root, `Big` ships everything with an activation of 5e-7.
        // Rounding that node would charge Big's full fixed cost.
        let model = Model::new(
            vec![
                Facility::new("Big", 1e7, 1e6),
                Facility::new("Small", 10.0, 100.0),
                Facility::new("Pricey", 10.0, 1e7),
            ],
            vec![DemandPoint::new("D", 5.0)],
            vec![vec![0.0, 1.0, 0.0]],
        )
        .expect("valid model");
        let trace = Rc::new(Trace::default());
        let outcome = BnbSolver::new()
            .solve(&model, TracingMonitor(Rc::clone(&trace)))
            .expect("no numeric failure");

        assert!(outcome.is_optimal());
        let solution = outcome.solution().expect("optimal solution");
        assert!(is_near(solution.objective_value(), 105.0, 1e-9));
        assert_eq!(solution.activation().ones().collect::<Vec<_>>(), vec![1]);
        assert_accepted(&model, solution);

        assert!(is_near(outcome.statistics().root_lower_bound, 0.5, 1e-9));
        assert!(is_near(trace.branched_bounds.borrow()[0], 0.5, 1e-9));
        assert_eq!(*trace.solutions.borrow(), vec![105.0]);
    }

    #[test]
    fn test_insufficient_capacity_is_infeasible() {
        let model = Model::new(
            vec![Facility::new("A", 5.0, 1.0)],
            vec![DemandPoint::new("D", 10.0)],
            vec![vec![1.0]],
        )
        .expect("valid model");
        let trace = Rc::new(Trace::default());
        let outcome = BnbSolver::new()
            .solve(&model, TracingMonitor(Rc::clone(&trace)))
            .expect("no numeric failure");

        assert!(matches!(outcome.result(), SolverResult::Infeasible));
        assert_eq!(
            outcome.termination_reason(),
            &TerminationReason::InfeasibilityProven
        );
        assert_eq!(outcome.statistics().nodes_explored, 0);
        assert_eq!(trace.entered.get(), 1);
        assert_eq!(trace.exited.get(), 1);
    }

    #[test]
    fn test_branched_nodes_bound_the_optimum() {
        let model = two_plant_instance();
        let trace = Rc::new(Trace::default());
        let outcome = BnbSolver::new()
            .solve(&model, TracingMonitor(Rc::clone(&trace)))
            .expect("no numeric failure");
        let optimum = outcome.solution().expect("optimal").objective_value();

        let bounds = trace.branched_bounds.borrow();
        assert!(!bounds.is_empty());
        for &bound in bounds.iter() {
            assert!(bound <= optimum + 1e-6);
            assert!(bound >= outcome.statistics().root_lower_bound - 1e-6);
        }
        // Closing the cheap plant leaves a child bounded far above 40.
        assert!(trace.prunes.borrow().contains(&PruneReason::BoundDominated));
        assert_eq!(*trace.solutions.borrow(), vec![40.0]);
    }

    #[test]
    fn test_search_improves_on_weak_warm_start() {
        let model = Model::new(
            vec![Facility::new("Near", 20.0, 50.0), Facility::new("Far", 20.0, 10.0)],
            vec![DemandPoint::new("D", 10.0)],
            vec![vec![1.0, 20.0]],
        )
        .expect("valid model");
        let warm = WarmStartHeuristic::default().run(&model).expect("feasible");
        assert!(is_near(warm.objective_value(), 210.0, 1e-9));

        let outcome = BnbSolver::new()
            .solve_with_warm_start(&model, warm, NoOperationMonitor::new())
            .expect("no numeric failure");
        let solution = outcome.solution().expect("optimal");
        assert!(outcome.is_optimal());
        assert!(is_near(solution.objective_value(), 60.0, 1e-9));
        assert!(solution.is_open(fi(0)));
        assert!(!solution.is_open(fi(1)));
        assert_accepted(&model, solution);
    }

    #[test]
    fn test_optimal_warm_start_is_kept() {
        let model = two_plant_instance();
        let warm = WarmStartHeuristic::default().run(&model).expect("feasible");
        let trace = Rc::new(Trace::default());

        let outcome = BnbSolver::new()
            .solve_with_warm_start(&model, warm.clone(), TracingMonitor(Rc::clone(&trace)))
            .expect("no numeric failure");
        assert!(outcome.is_optimal());
        assert_eq!(outcome.solution(), Some(&warm));
        // Nothing can beat the warm start, so no new solution is announced.
        assert!(trace.solutions.borrow().is_empty());
        assert_eq!(outcome.statistics().solutions_found, 0);
    }

    #[test]
    fn test_shared_incumbent_is_overwritten_by_better_solution() {
        let model = two_plant_instance();
        let shared = SharedIncumbent::new();
        let only_b = Solution::new(
            1030.0,
            {
                let mut open = fixedbitset::FixedBitSet::with_capacity(2);
                open.insert(1);
                open
            },
            siting_model::flow::FlowAssignment::new(),
        );
        assert!(shared.try_install(&only_b));

        let outcome = BnbSolver::new()
            .solve_with_incumbent(&model, NoOperationMonitor::new(), &shared)
            .expect("no numeric failure");
        assert!(outcome.is_optimal());
        assert!(is_near(shared.upper_bound(), 40.0, 1e-9));
        assert_eq!(
            outcome.solution().map(Solution::objective_value),
            shared.snapshot().map(|s| s.objective_value())
        );
    }

    #[test]
    fn test_node_limit_aborts_without_solution() {
        let model = two_plant_instance();
        let nodes = AtomicU64::new(0);
        let mut limit = NodeLimitMonitor::new(&nodes, 1);

        let outcome = BnbSolver::new()
            .solve(&model, WrapperMonitor::new(&mut limit))
            .expect("no numeric failure");

        assert!(matches!(outcome.result(), SolverResult::Unknown));
        match outcome.termination_reason() {
            TerminationReason::Aborted(msg) => assert_eq!(msg, "node limit reached"),
            other => panic!("expected Aborted termination reason, got {}", other),
        }
        // Both children of the root are still open; the better one is forced open at 40.
        assert!(is_near(outcome.statistics().best_bound, 40.0, 1e-9));
    }

    #[test]
    fn test_node_limit_returns_warm_start_as_feasible() {
        let model = two_plant_instance();
        let warm = WarmStartHeuristic::default().run(&model).expect("feasible");
        let nodes = AtomicU64::new(0);
        let mut limit = NodeLimitMonitor::new(&nodes, 0);

        let outcome = BnbSolver::new()
            .solve_with_warm_start(
                &model,
                warm.clone(),
                WrapperMonitor::new(&mut limit),
            )
            .expect("no numeric failure");

        assert!(!outcome.is_optimal());
        assert!(matches!(outcome.result(), SolverResult::Feasible(_)));
        assert_eq!(outcome.solution(), Some(&warm));
        assert!(is_near(outcome.statistics().best_bound, 37.5, 1e-9));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let model = Model::new(
            vec![
                Facility::new("F0", 30.0, 40.0),
                Facility::new("F1", 25.0, 35.0),
                Facility::new("F2", 40.0, 60.0),
            ],
            vec![
                DemandPoint::new("D0", 12.0),
                DemandPoint::new("D1", 18.0),
                DemandPoint::new("D2", 9.0),
            ],
            vec![
                vec![2.0, 6.0, 4.0],
                vec![5.0, 1.0, 3.0],
                vec![4.0, 3.0, 1.0],
            ],
        )
        .expect("valid model");
        let solver = BnbSolver::new();

        let first = solver
            .solve(&model, NoOperationMonitor::new())
            .expect("no numeric failure");
        let second = solver
            .solve(&model, NoOperationMonitor::new())
            .expect("no numeric failure");
        let (a, b) = (
            first.solution().expect("optimal"),
            second.solution().expect("optimal"),
        );
        assert_eq!(a.objective_value(), b.objective_value());
        assert_eq!(a.activation(), b.activation());
        assert_accepted(&model, a);

        let other_rule = solver
            .clone()
            .with_rule(LowestIndexFractional)
            .solve(&model, NoOperationMonitor::new())
            .expect("no numeric failure");
        assert!(is_near(
            other_rule.solution().expect("optimal").objective_value(),
            a.objective_value(),
            1e-6
        ));
    }

    #[test]
    fn test_numeric_failure_is_surfaced() {
        let model = Model::new(
            vec![Facility::new("A", 1.0, 0.0), Facility::new("B", 1.0, 0.0)],
            vec![DemandPoint::new("X", 1.0), DemandPoint::new("Y", 1.0)],
            vec![vec![1.0, 10.0], vec![2.0, 100.0]],
        )
        .expect("valid model");
        let solver = BnbSolver::new()
            .with_relaxation_solver(RelaxationSolver::new().with_max_iterations(0));
        let trace = Rc::new(Trace::default());

        let err = solver
            .solve(&model, TracingMonitor(Rc::clone(&trace)))
            .expect_err("zero pivot budget");
        assert_eq!(
            err,
            BnbError::Numeric {
                node_id: 0,
                iterations: 0
            }
        );
        assert_eq!(trace.exited.get(), 1);
    }

    #[test]
    fn test_empty_model_is_trivially_optimal() {
        let model = Model::new(vec![], vec![], vec![]).expect("valid model");
        let outcome = BnbSolver::new()
            .solve(&model, NoOperationMonitor::new())
            .expect("no numeric failure");
        assert!(outcome.is_optimal());
        assert_eq!(outcome.solution().map(Solution::objective_value), Some(0.0));
    }

    #[test]
    fn test_display() {
        let solver = BnbSolver::new();
        assert!(solver.to_string().starts_with("BnbSolver(rule: ClosestToHalf"));
    }
}
