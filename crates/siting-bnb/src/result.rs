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

use crate::stats::BnbSolverStatistics;
use siting_model::solution::Solution;
use siting_search::{
    result::{SolverOutcome, SolverResult, TerminationReason},
    stats::SolverStatisticsBuilder,
};

/// Result of the branch-and-bound engine after termination.
#[derive(Debug, Clone)]
pub struct BnbSolverOutcome {
    result: SolverResult,
    termination_reason: TerminationReason,
    statistics: BnbSolverStatistics,
}

impl BnbSolverOutcome {
    #[inline]
    pub fn optimal(solution: Solution, statistics: BnbSolverStatistics) -> Self {
        Self {
            result: SolverResult::Optimal(solution),
            termination_reason: TerminationReason::OptimalityProven,
            statistics,
        }
    }

    #[inline]
    pub fn infeasible(statistics: BnbSolverStatistics) -> Self {
        Self {
            result: SolverResult::Infeasible,
            termination_reason: TerminationReason::InfeasibilityProven,
            statistics,
        }
    }

    /// A run stopped by a limit. The incumbent, if any, is reported as
    /// feasible but not proven optimal.
    #[inline]
    pub fn aborted<R>(solution: Option<Solution>, reason: R, statistics: BnbSolverStatistics) -> Self
    where
        R: Into<String>,
    {
        let result = match solution {
            Some(sol) => SolverResult::Feasible(sol),
            None => SolverResult::Unknown,
        };
        Self {
            result,
            termination_reason: TerminationReason::Aborted(reason.into()),
            statistics,
        }
    }

    #[inline]
    pub fn result(&self) -> &SolverResult {
        &self.result
    }

    #[inline]
    pub fn termination_reason(&self) -> &TerminationReason {
        &self.termination_reason
    }

    #[inline]
    pub fn statistics(&self) -> &BnbSolverStatistics {
        &self.statistics
    }

    #[inline]
    pub fn solution(&self) -> Option<&Solution> {
        self.result.solution()
    }

    #[inline]
    pub fn is_optimal(&self) -> bool {
        matches!(self.result, SolverResult::Optimal(_))
    }

    #[inline]
    pub fn into_parts(self) -> (SolverResult, TerminationReason, BnbSolverStatistics) {
        (self.result, self.termination_reason, self.statistics)
    }

    /// Converts into the engine-independent outcome, reporting `used_threads`.
    pub fn into_solver_outcome(self, used_threads: usize) -> SolverOutcome {
        let statistics = SolverStatisticsBuilder::new()
            .solutions_found(self.statistics.solutions_found)
            .nodes_explored(self.statistics.nodes_explored)
            .used_threads(used_threads)
            .best_bound(self.statistics.best_bound)
            .solve_duration(self.statistics.time_total)
            .build();
        SolverOutcome::new(self.result, self.termination_reason, statistics)
    }
}

impl std::fmt::Display for BnbSolverOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Result: {}", self.result)?;
        writeln!(f, "Termination: {}", self.termination_reason)?;
        write!(f, "{}", self.statistics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixedbitset::FixedBitSet;
    use siting_model::flow::FlowAssignment;

    fn solution(objective: f64) -> Solution {
        Solution::new(objective, FixedBitSet::with_capacity(2), FlowAssignment::new())
    }

    #[test]
    fn test_aborted_without_solution_is_unknown() {
        let outcome =
            BnbSolverOutcome::aborted(None, "time limit reached", BnbSolverStatistics::default());
        assert!(matches!(outcome.result(), SolverResult::Unknown));
        match outcome.termination_reason() {
            TerminationReason::Aborted(msg) => assert_eq!(msg, "time limit reached"),
            other => panic!("expected Aborted termination reason, got {}", other),
        }
    }

    #[test]
    fn test_aborted_with_solution_is_feasible() {
        let outcome = BnbSolverOutcome::aborted(
            Some(solution(12.0)),
            "node limit reached",
            BnbSolverStatistics::default(),
        );
        assert!(!outcome.is_optimal());
        assert_eq!(outcome.solution().map(Solution::objective_value), Some(12.0));
    }

    #[test]
    fn test_into_solver_outcome_carries_statistics() {
        let mut stats = BnbSolverStatistics::default();
        stats.on_node_explored();
        stats.on_node_explored();
        stats.on_solution_found();
        stats.set_best_bound(40.0);

        let outcome = BnbSolverOutcome::optimal(solution(40.0), stats).into_solver_outcome(4);
        assert!(outcome.is_optimal());
        assert_eq!(outcome.reason, TerminationReason::OptimalityProven);
        assert_eq!(outcome.statistics.nodes_explored, 2);
        assert_eq!(outcome.statistics.solutions_found, 1);
        assert_eq!(outcome.statistics.used_threads, 4);
        assert_eq!(outcome.statistics.best_bound, 40.0);
    }

    #[test]
    fn test_infeasible_outcome() {
        let outcome = BnbSolverOutcome::infeasible(BnbSolverStatistics::default());
        assert!(matches!(outcome.result(), SolverResult::Infeasible));
        assert_eq!(
            outcome.termination_reason(),
            &TerminationReason::InfeasibilityProven
        );
        assert!(outcome.solution().is_none());
    }
}
