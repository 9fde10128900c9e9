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

//! Multi-threaded best-first branch-and-bound
//!
//! `ParallelBnbSolver` runs the same node processing as `BnbSolver`, but
//! with several workers drawing from one shared frontier.
//!
//! Behavior
//! - The root is evaluated on the calling thread; workers start once the
//!   frontier holds it.
//! - The frontier lives behind a `Mutex` together with an in-flight counter.
//!   A worker that finds the frontier empty waits on a `Condvar` while other
//!   workers are still expanding nodes, and declares the search finished
//!   once nothing is in flight.
//! - Relaxations are solved outside the lock.
//! - The incumbent is a `SharedIncumbent`: lock-free reads of the upper
//!   bound, strict compare-and-set installs.
//! - Each worker owns the monitor built for it by `make_monitor(worker)`.
//!   The first `Terminate` command stops every worker; the node it was
//!   issued for goes back to the frontier.
//!
//! Notes
//! - Best-first order is global only up to the nodes in flight, so node
//!   counts vary between runs. The optimal objective does not.
//! - Monitors do not observe the root evaluation.

use crate::{
    bnb::{Expansion, NodeExpander},
    branching::{BranchingRule, BranchingStrategy},
    error::BnbError,
    eval::NodeEvaluator,
    frontier::Frontier,
    monitor::{
        no_op::NoOperationMonitor,
        tree_search_monitor::{PruneReason, TreeSearchMonitor},
    },
    node::Node,
    result::BnbSolverOutcome,
    stats::BnbSolverStatistics,
};
use log::{debug, trace};
use siting_lp::relaxation::RelaxationSolver;
use siting_model::{model::Model, solution::Solution};
use siting_search::{incumbent::SharedIncumbent, monitor::search_monitor::SearchCommand};
use std::sync::{
    Condvar, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicU64, Ordering},
};

/// A branch-and-bound solver that expands nodes on several threads.
#[derive(Debug, Clone)]
pub struct ParallelBnbSolver<B = BranchingStrategy> {
    relaxation: RelaxationSolver,
    rule: B,
    num_threads: usize,
}

impl ParallelBnbSolver<BranchingStrategy> {
    /// Creates a solver with `num_threads` workers (at least one).
    #[inline]
    pub fn new(num_threads: usize) -> Self {
        Self {
            relaxation: RelaxationSolver::new(),
            rule: BranchingStrategy::default(),
            num_threads: num_threads.max(1),
        }
    }
}

impl<B> ParallelBnbSolver<B>
where
    B: BranchingRule + Sync,
{
    #[inline]
    pub fn with_rule<R>(self, rule: R) -> ParallelBnbSolver<R>
    where
        R: BranchingRule + Sync,
    {
        ParallelBnbSolver {
            relaxation: self.relaxation,
            rule,
            num_threads: self.num_threads,
        }
    }

    #[inline]
    pub fn with_relaxation_solver(mut self, relaxation: RelaxationSolver) -> Self {
        self.relaxation = relaxation;
        self
    }

    #[inline]
    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    /// Solves `model` in isolation.
    ///
    /// `make_monitor` is called once per worker, on that worker's thread,
    /// with the worker index.
    ///
    /// # Errors
    ///
    /// `BnbError::Numeric` if any node relaxation cannot be solved reliably.
    pub fn solve<F, M>(&self, model: &Model, make_monitor: F) -> Result<BnbSolverOutcome, BnbError>
    where
        F: Fn(usize) -> M + Sync,
        M: TreeSearchMonitor,
    {
        let incumbent = SharedIncumbent::new();
        self.solve_with_incumbent(model, make_monitor, &incumbent)
    }

    /// Solves `model` with `incumbent` as the shared upper bound. A solution
    /// already installed there, such as a warm start, takes part in pruning
    /// and is reported if the search does not improve on it.
    pub fn solve_with_incumbent<F, M>(
        &self,
        model: &Model,
        make_monitor: F,
        incumbent: &SharedIncumbent,
    ) -> Result<BnbSolverOutcome, BnbError>
    where
        F: Fn(usize) -> M + Sync,
        M: TreeSearchMonitor,
    {
        let start_time = std::time::Instant::now();
        let expander = NodeExpander::new(NodeEvaluator::new(model, &self.relaxation), &self.rule);

        let mut stats = BnbSolverStatistics::default();
        let root = match expander.root(&mut NoOperationMonitor::new(), &mut stats) {
            Ok(Some(root)) => root,
            Ok(None) => {
                stats.set_total_time(start_time.elapsed());
                return Ok(BnbSolverOutcome::infeasible(stats));
            }
            Err(err) => return Err(err),
        };
        let root_lower_bound = stats.root_lower_bound;

        let shared = SharedSearch::new(root, incumbent);
        let worker_stats: Vec<BnbSolverStatistics> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..self.num_threads)
                .map(|worker| {
                    let shared = &shared;
                    let expander = &expander;
                    let make_monitor = &make_monitor;
                    scope.spawn(move || {
                        let monitor = make_monitor(worker);
                        Worker::new(worker, model, expander, shared, monitor).run()
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
                })
                .collect()
        });

        for s in &worker_stats {
            stats.merge(s);
        }
        stats.set_root_lower_bound(root_lower_bound);
        stats.set_total_time(start_time.elapsed());

        let state = shared.into_state();
        if let Some(err) = state.error {
            debug!("parallel search failed: {}", err);
            return Err(err);
        }

        let solution = incumbent.snapshot();
        let outcome = match state.abort_reason {
            Some(reason) => {
                let open = state.frontier.best_bound().unwrap_or(f64::INFINITY);
                stats.set_best_bound(open.min(incumbent.upper_bound()));
                debug!("parallel search aborted: {}", reason);
                BnbSolverOutcome::aborted(solution, reason, stats)
            }
            None => match solution {
                Some(solution) => {
                    stats.set_best_bound(solution.objective_value());
                    BnbSolverOutcome::optimal(solution, stats)
                }
                None => BnbSolverOutcome::infeasible(stats),
            },
        };
        debug!(
            "parallel search finished with {} workers after {} nodes: {}",
            self.num_threads,
            outcome.statistics().nodes_explored,
            outcome.termination_reason()
        );
        Ok(outcome)
    }
}

impl<B> std::fmt::Display for ParallelBnbSolver<B>
where
    B: BranchingRule,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ParallelBnbSolver(threads: {}, rule: {}, tolerance: {})",
            self.num_threads,
            self.rule.name(),
            self.relaxation.tolerance()
        )
    }
}

/// Search state guarded by the frontier lock.
#[derive(Debug)]
struct SearchState {
    frontier: Frontier,
    in_flight: usize,
    done: bool,
    abort_reason: Option<String>,
    error: Option<BnbError>,
}

/// State shared by all workers of one run.
struct SharedSearch<'a> {
    state: Mutex<SearchState>,
    available: Condvar,
    next_id: AtomicU64,
    incumbent: &'a SharedIncumbent,
}

impl<'a> SharedSearch<'a> {
    fn new(root: Node, incumbent: &'a SharedIncumbent) -> Self {
        let mut frontier = Frontier::new();
        frontier.push(root);
        Self {
            state: Mutex::new(SearchState {
                frontier,
                in_flight: 0,
                done: false,
                abort_reason: None,
                error: None,
            }),
            available: Condvar::new(),
            next_id: AtomicU64::new(1),
            incumbent,
        }
    }

    // A worker that panicked has released its node through `InFlightGuard`;
    // the state itself is still consistent, and the panic is re-raised on
    // join.
    #[inline]
    fn lock(&self) -> MutexGuard<'_, SearchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Blocks until a node is available or the search is over.
    fn acquire(&self) -> Option<Node> {
        let mut state = self.lock();
        loop {
            if state.done {
                return None;
            }
            if let Some(node) = state.frontier.pop() {
                state.in_flight += 1;
                return Some(node);
            }
            if state.in_flight == 0 {
                state.done = true;
                self.available.notify_all();
                return None;
            }
            state = self
                .available
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Returns an unprocessed node and stops the search.
    fn abort(&self, node: Node, reason: String) {
        let mut state = self.lock();
        state.frontier.push(node);
        state.in_flight -= 1;
        state.abort_reason.get_or_insert(reason);
        state.done = true;
        self.available.notify_all();
    }

    /// Publishes the children of a processed node.
    fn complete(&self, children: impl IntoIterator<Item = Node>) {
        let mut state = self.lock();
        for child in children {
            state.frontier.push(child);
        }
        state.in_flight -= 1;
        self.available.notify_all();
    }

    fn fail(&self, err: BnbError) {
        let mut state = self.lock();
        state.in_flight -= 1;
        state.error.get_or_insert(err);
        state.done = true;
        self.available.notify_all();
    }

    /// Drops the node of a worker that is unwinding and stops the search.
    fn abandon(&self) {
        let mut state = self.lock();
        state.in_flight -= 1;
        state.done = true;
        self.available.notify_all();
    }

    fn into_state(self) -> SearchState {
        self.state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Held while a worker owns an acquired node. If the worker panics before
/// handing the node back, the drop releases its in-flight slot so that the
/// remaining workers stop waiting.
struct InFlightGuard<'s, 'a> {
    shared: &'s SharedSearch<'a>,
}

impl Drop for InFlightGuard<'_, '_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.shared.abandon();
        }
    }
}

struct Worker<'s, 'a, B, M> {
    index: usize,
    model: &'a Model,
    expander: &'s NodeExpander<'a, B>,
    shared: &'s SharedSearch<'a>,
    monitor: M,
    stats: BnbSolverStatistics,
}

impl<'s, 'a, B, M> Worker<'s, 'a, B, M>
where
    B: BranchingRule,
    M: TreeSearchMonitor,
{
    fn new(
        index: usize,
        model: &'a Model,
        expander: &'s NodeExpander<'a, B>,
        shared: &'s SharedSearch<'a>,
        monitor: M,
    ) -> Self {
        Self {
            index,
            model,
            expander,
            shared,
            monitor,
            stats: BnbSolverStatistics::default(),
        }
    }

    fn run(mut self) -> BnbSolverStatistics {
        self.monitor.on_enter_search(self.model, &self.stats);

        while let Some(node) = self.shared.acquire() {
            let _guard = InFlightGuard {
                shared: self.shared,
            };
            self.stats.on_node_explored();
            self.monitor.on_step(&node, &self.stats);
            if let SearchCommand::Terminate(msg) = self.monitor.search_command(&node, &self.stats)
            {
                trace!("worker {}: terminating: {}", self.index, msg);
                self.shared.abort(node, msg);
                break;
            }

            match self.process(node) {
                Ok(children) => self.shared.complete(children),
                Err(err) => {
                    self.shared.fail(err);
                    break;
                }
            }
        }

        self.monitor.on_exit_search(&self.stats);
        self.stats
    }

    fn process(&mut self, node: Node) -> Result<Vec<Node>, BnbError> {
        let shared = self.shared;
        let expansion = self.expander.expand(
            node,
            shared.incumbent.upper_bound(),
            || shared.next_id(),
            &mut self.monitor,
            &mut self.stats,
        )?;

        Ok(match expansion {
            Expansion::Pruned => Vec::new(),
            Expansion::Integral { node, solution } => {
                self.install(&node, solution);
                Vec::new()
            }
            Expansion::Branched(children) => children.into_vec(),
        })
    }

    fn install(&mut self, node: &Node, solution: Solution) {
        let tolerance = self.expander.evaluator().tolerance();
        let improves =
            tolerance.is_improvement(solution.objective_value(), self.shared.incumbent.upper_bound());
        if improves && self.shared.incumbent.try_install(&solution) {
            debug!(
                "worker {}: node {}: new incumbent with objective {}",
                self.index,
                node.id(),
                solution.objective_value()
            );
            self.stats.on_solution_found();
            self.monitor.on_solution_found(&solution, &self.stats);
        } else {
            self.stats.on_pruning_bound();
            self.monitor
                .on_prune(node.bounds(), PruneReason::BoundDominated, &self.stats);
        }
    }
}
