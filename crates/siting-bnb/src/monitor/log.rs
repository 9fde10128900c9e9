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

use crate::{
    monitor::tree_search_monitor::{PruneReason, TreeSearchMonitor},
    node::Node,
    stats::BnbSolverStatistics,
};
use ::log::info;
use siting_lp::bounds::ActivationBounds;
use siting_model::{index::FacilityIndex, model::Model, solution::Solution};
use std::time::{Duration, Instant};

/// Periodically reports search progress through `log::info!`.
///
/// A line is emitted when the number of explored nodes is a multiple of
/// `clock_check_mask + 1` and at least `log_interval` has passed since the
/// previous line. New incumbents are always reported.
#[derive(Debug, Clone)]
pub struct LogTreeSearchMonitor {
    start_time: Instant,
    last_log_time: Instant,
    log_interval: Duration,
    clock_check_mask: u64,
    best_objective: Option<f64>,
}

impl LogTreeSearchMonitor {
    pub fn new(log_interval: Duration, clock_check_mask: u64) -> Self {
        Self {
            start_time: Instant::now(),
            last_log_time: Instant::now(),
            log_interval,
            clock_check_mask,
            best_objective: None,
        }
    }

    /// Objective of the last incumbent reported to this monitor.
    #[inline]
    pub fn best_objective(&self) -> Option<f64> {
        self.best_objective
    }

    #[inline(always)]
    fn print_header(&self) {
        info!(
            "{:<9} | {:<12} | {:<6} | {:<14} | {:<14} | {:<8}",
            "Elapsed", "Nodes", "Depth", "Bound", "Incumbent", "Gap"
        );
        info!("{}", "-".repeat(78));
    }

    #[inline(always)]
    fn log_line(&mut self, node: &Node, stats: &BnbSolverStatistics) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.start_time).as_secs_f32();
        let bound = node.lower_bound();
        let (incumbent, gap) = match self.best_objective {
            Some(obj) => (
                format!("{:.4}", obj),
                format!(
                    "{:.2}%",
                    100.0 * ((obj - bound) / obj.abs().max(1.0)).max(0.0)
                ),
            ),
            None => ("Inf".to_string(), "-".to_string()),
        };
        info!(
            "{:<9} | {:<12} | {:<6} | {:<14.4} | {:<14} | {:<8}",
            format!("{:.1}s", elapsed),
            stats.nodes_explored,
            node.depth(),
            bound,
            incumbent,
            gap
        );
        self.last_log_time = now;
    }
}

impl Default for LogTreeSearchMonitor {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), 255)
    }
}

impl std::fmt::Display for LogTreeSearchMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "LogTreeSearchMonitor(log_interval: {}s, clock_check_mask: {})",
            self.log_interval.as_secs(),
            self.clock_check_mask
        )
    }
}

impl TreeSearchMonitor for LogTreeSearchMonitor {
    fn name(&self) -> &str {
        "LogTreeSearchMonitor"
    }

    fn on_enter_search(&mut self, model: &Model, _stats: &BnbSolverStatistics) {
        self.start_time = Instant::now();
        self.last_log_time = self.start_time;
        self.best_objective = None;
        info!(
            "branch-and-bound on {} facilities and {} demand points",
            model.num_facilities(),
            model.num_demand_points()
        );
        self.print_header();
    }

    fn on_exit_search(&mut self, stats: &BnbSolverStatistics) {
        info!("{}", "-".repeat(78));
        info!(
            "Search finished after {} nodes in {:.2?}.",
            stats.nodes_explored,
            self.start_time.elapsed()
        );
    }

    fn on_step(&mut self, node: &Node, stats: &BnbSolverStatistics) {
        if (stats.nodes_explored & self.clock_check_mask) == 0
            && self.last_log_time.elapsed() >= self.log_interval
        {
            self.log_line(node, stats);
        }
    }

    fn on_node_evaluated(&mut self, _node: &Node, _stats: &BnbSolverStatistics) {}

    fn on_prune(
        &mut self,
        _bounds: &ActivationBounds,
        _reason: PruneReason,
        _stats: &BnbSolverStatistics,
    ) {
    }

    fn on_branch(&mut self, _node: &Node, _facility: FacilityIndex, _stats: &BnbSolverStatistics) {}

    fn on_solution_found(&mut self, solution: &Solution, stats: &BnbSolverStatistics) {
        let obj = solution.objective_value();
        self.best_objective = Some(obj);
        info!(
            "new incumbent {:.4} with {} open facilities after {} nodes",
            obj,
            solution.num_open(),
            stats.nodes_explored
        );
    }
}
