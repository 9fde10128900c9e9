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

use std::time::Duration;

/// Statistics collected during one branch-and-bound run.
///
/// The parallel engine keeps one instance per worker and merges them at the
/// end, so every counter here is additive.
#[derive(Debug, Clone, PartialEq)]
pub struct BnbSolverStatistics {
    /// Nodes popped from the frontier and processed.
    pub nodes_explored: u64,
    /// Nodes whose relaxation was solved, including the root.
    pub nodes_created: u64,
    /// The deepest level reached in the tree.
    pub max_depth: u64,
    /// Subtrees discarded because their relaxation was infeasible.
    pub prunings_infeasible: u64,
    /// Nodes discarded because their bound could not beat the incumbent.
    pub prunings_bound: u64,
    /// Nodes whose relaxation had an integral activation vector.
    pub integral_nodes: u64,
    /// Improving solutions installed by the search.
    pub solutions_found: u64,
    /// Relaxations that were retried with tightened tolerances.
    pub numeric_retries: u64,
    /// Simplex pivots summed over all relaxation solves.
    pub lp_iterations: u64,
    /// The relaxation objective at the root.
    pub root_lower_bound: f64,
    /// Lowest bound still open at termination; equals the objective when
    /// optimality was proven.
    pub best_bound: f64,
    /// Total time spent in the solver.
    pub time_total: Duration,
}

impl Default for BnbSolverStatistics {
    fn default() -> Self {
        Self {
            nodes_explored: 0,
            nodes_created: 0,
            max_depth: 0,
            prunings_infeasible: 0,
            prunings_bound: 0,
            integral_nodes: 0,
            solutions_found: 0,
            numeric_retries: 0,
            lp_iterations: 0,
            root_lower_bound: f64::NEG_INFINITY,
            best_bound: f64::NEG_INFINITY,
            time_total: Duration::ZERO,
        }
    }
}

impl BnbSolverStatistics {
    #[inline]
    pub fn on_node_explored(&mut self) {
        self.nodes_explored = self.nodes_explored.saturating_add(1);
    }

    /// Records a solved relaxation at `depth` that took `iterations` pivots.
    #[inline]
    pub fn on_node_created(&mut self, depth: u64, iterations: usize) {
        self.nodes_created = self.nodes_created.saturating_add(1);
        self.max_depth = self.max_depth.max(depth);
        self.lp_iterations = self.lp_iterations.saturating_add(iterations as u64);
    }

    #[inline]
    pub fn on_pruning_infeasible(&mut self) {
        self.prunings_infeasible = self.prunings_infeasible.saturating_add(1);
    }

    #[inline]
    pub fn on_pruning_bound(&mut self) {
        self.prunings_bound = self.prunings_bound.saturating_add(1);
    }

    #[inline]
    pub fn on_integral_node(&mut self) {
        self.integral_nodes = self.integral_nodes.saturating_add(1);
    }

    #[inline]
    pub fn on_solution_found(&mut self) {
        self.solutions_found = self.solutions_found.saturating_add(1);
    }

    #[inline]
    pub fn on_numeric_retry(&mut self) {
        self.numeric_retries = self.numeric_retries.saturating_add(1);
    }

    #[inline]
    pub fn set_root_lower_bound(&mut self, bound: f64) {
        self.root_lower_bound = bound;
    }

    #[inline]
    pub fn set_best_bound(&mut self, bound: f64) {
        self.best_bound = bound;
    }

    #[inline]
    pub fn set_total_time(&mut self, duration: Duration) {
        self.time_total = duration;
    }

    /// Adds the counters of `other` into `self`.
    ///
    /// Bounds and time are left untouched; the caller owns those.
    pub fn merge(&mut self, other: &BnbSolverStatistics) {
        self.nodes_explored = self.nodes_explored.saturating_add(other.nodes_explored);
        self.nodes_created = self.nodes_created.saturating_add(other.nodes_created);
        self.max_depth = self.max_depth.max(other.max_depth);
        self.prunings_infeasible = self
            .prunings_infeasible
            .saturating_add(other.prunings_infeasible);
        self.prunings_bound = self.prunings_bound.saturating_add(other.prunings_bound);
        self.integral_nodes = self.integral_nodes.saturating_add(other.integral_nodes);
        self.solutions_found = self.solutions_found.saturating_add(other.solutions_found);
        self.numeric_retries = self.numeric_retries.saturating_add(other.numeric_retries);
        self.lp_iterations = self.lp_iterations.saturating_add(other.lp_iterations);
    }

    /// Relative gap between `objective` and `best_bound`, or `None` if either is not finite.
    pub fn gap(&self, objective: f64) -> Option<f64> {
        if !objective.is_finite() || !self.best_bound.is_finite() {
            return None;
        }
        Some(((objective - self.best_bound) / objective.abs().max(1.0)).max(0.0))
    }
}

impl std::fmt::Display for BnbSolverStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Siting-BnB Solver Statistics:")?;
        writeln!(f, "  Nodes explored:       {}", self.nodes_explored)?;
        writeln!(f, "  Nodes created:        {}", self.nodes_created)?;
        writeln!(f, "  Max depth reached:    {}", self.max_depth)?;
        writeln!(f, "  Prunings (infeasible):{}", self.prunings_infeasible)?;
        writeln!(f, "  Prunings (bound):     {}", self.prunings_bound)?;
        writeln!(f, "  Integral nodes:       {}", self.integral_nodes)?;
        writeln!(f, "  Solutions found:      {}", self.solutions_found)?;
        writeln!(f, "  Numeric retries:      {}", self.numeric_retries)?;
        writeln!(f, "  LP pivots:            {}", self.lp_iterations)?;
        writeln!(f, "  Root lower bound:     {}", self.root_lower_bound)?;
        writeln!(f, "  Best bound:           {}", self.best_bound)?;
        writeln!(f, "  Total time:           {:.2?}", self.time_total)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_and_depth() {
        let mut stats = BnbSolverStatistics::default();
        stats.on_node_created(0, 3);
        stats.on_node_created(2, 4);
        stats.on_node_created(1, 0);
        stats.on_node_explored();
        stats.on_pruning_bound();
        stats.on_pruning_infeasible();

        assert_eq!(stats.nodes_created, 3);
        assert_eq!(stats.max_depth, 2);
        assert_eq!(stats.lp_iterations, 7);
        assert_eq!(stats.nodes_explored, 1);
        assert_eq!(stats.prunings_bound, 1);
        assert_eq!(stats.prunings_infeasible, 1);
    }

    #[test]
    fn test_merge_adds_counters_and_keeps_bounds() {
        let mut a = BnbSolverStatistics::default();
        a.on_node_created(3, 10);
        a.on_solution_found();
        a.set_best_bound(5.0);

        let mut b = BnbSolverStatistics::default();
        b.on_node_created(1, 2);
        b.on_node_explored();
        b.on_numeric_retry();
        b.set_best_bound(99.0);

        a.merge(&b);
        assert_eq!(a.nodes_created, 2);
        assert_eq!(a.nodes_explored, 1);
        assert_eq!(a.max_depth, 3);
        assert_eq!(a.lp_iterations, 12);
        assert_eq!(a.solutions_found, 1);
        assert_eq!(a.numeric_retries, 1);
        assert_eq!(a.best_bound, 5.0);
    }

    #[test]
    fn test_gap() {
        let mut stats = BnbSolverStatistics::default();
        assert_eq!(stats.gap(10.0), None);
        stats.set_best_bound(37.5);
        assert_eq!(stats.gap(40.0), Some(0.0625));
        stats.set_best_bound(40.0);
        assert_eq!(stats.gap(40.0), Some(0.0));
    }

    #[test]
    fn test_display_lists_counters() {
        let mut stats = BnbSolverStatistics::default();
        stats.on_node_explored();
        let text = stats.to_string();
        assert!(text.starts_with("Siting-BnB Solver Statistics:"));
        assert!(text.contains("Nodes explored:       1"));
        assert!(text.contains("LP pivots:            0"));
    }
}
