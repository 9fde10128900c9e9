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

/// Statistics collected during the solving process.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverStatistics {
    /// Number of improving solutions installed, including the warm start.
    pub solutions_found: u64,
    /// Number of search nodes processed across all threads.
    pub nodes_explored: u64,
    /// Number of threads used during the solving process.
    pub used_threads: usize,
    /// Lowest relaxation bound among nodes still open at termination, or the
    /// final objective when optimality was proven.
    pub best_bound: f64,
    /// Total duration of the solving process.
    pub solve_duration: Duration,
}

impl SolverStatistics {
    /// Relative gap between `objective` and `best_bound`, or `None` if either is not finite.
    pub fn gap(&self, objective: f64) -> Option<f64> {
        if !objective.is_finite() || !self.best_bound.is_finite() {
            return None;
        }
        Some(((objective - self.best_bound) / objective.abs().max(1.0)).max(0.0))
    }
}

impl std::fmt::Display for SolverStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solver Statistics:")?;
        writeln!(f, "  Solutions Found: {}", self.solutions_found)?;
        writeln!(f, "  Nodes Explored: {}", self.nodes_explored)?;
        writeln!(f, "  Used Threads: {}", self.used_threads)?;
        writeln!(f, "  Best Bound: {}", self.best_bound)?;
        writeln!(
            f,
            "  Solve Duration (secs): {:.3}",
            self.solve_duration.as_secs_f64()
        )
    }
}

/// Builder for `SolverStatistics`.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverStatisticsBuilder {
    solutions_found: u64,
    nodes_explored: u64,
    used_threads: usize,
    best_bound: f64,
    solve_duration: Duration,
}

impl Default for SolverStatisticsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverStatisticsBuilder {
    /// Creates a new `SolverStatisticsBuilder` with default values.
    #[inline]
    pub fn new() -> Self {
        Self {
            solutions_found: 0,
            nodes_explored: 0,
            used_threads: 1,
            best_bound: f64::NEG_INFINITY,
            solve_duration: Duration::ZERO,
        }
    }

    #[inline]
    pub fn solutions_found(mut self, solutions_found: u64) -> Self {
        self.solutions_found = solutions_found;
        self
    }

    #[inline]
    pub fn nodes_explored(mut self, nodes_explored: u64) -> Self {
        self.nodes_explored = nodes_explored;
        self
    }

    #[inline]
    pub fn used_threads(mut self, used_threads: usize) -> Self {
        self.used_threads = used_threads;
        self
    }

    #[inline]
    pub fn best_bound(mut self, best_bound: f64) -> Self {
        self.best_bound = best_bound;
        self
    }

    #[inline]
    pub fn solve_duration(mut self, solve_duration: Duration) -> Self {
        self.solve_duration = solve_duration;
        self
    }

    /// Builds the `SolverStatistics` instance.
    #[inline]
    pub fn build(self) -> SolverStatistics {
        SolverStatistics {
            solutions_found: self.solutions_found,
            nodes_explored: self.nodes_explored,
            used_threads: self.used_threads,
            best_bound: self.best_bound,
            solve_duration: self.solve_duration,
        }
    }
}
