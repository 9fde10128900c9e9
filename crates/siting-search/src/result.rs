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

use crate::stats::SolverStatistics;
use siting_model::solution::Solution;

#[derive(Debug, Clone, PartialEq)]
pub enum SolverResult {
    /// We have proven that the problem is infeasible.
    Infeasible,
    /// We have found a solution and proven its optimality.
    Optimal(Solution),
    /// We have found a feasible solution, but not proven its optimality.
    Feasible(Solution),
    /// The solver terminated without finding a solution and
    /// without proving infeasibility.
    Unknown,
}

impl SolverResult {
    /// Returns the solution, if any.
    #[inline]
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            SolverResult::Optimal(s) | SolverResult::Feasible(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the objective of the solution, if any.
    #[inline]
    pub fn objective_value(&self) -> Option<f64> {
        self.solution().map(Solution::objective_value)
    }

    #[inline]
    pub fn into_solution(self) -> Option<Solution> {
        match self {
            SolverResult::Optimal(s) | SolverResult::Feasible(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for SolverResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverResult::Infeasible => write!(f, "Infeasible"),
            SolverResult::Optimal(solution) => {
                write!(f, "Optimal(objective={})", solution.objective_value())
            }
            SolverResult::Feasible(solution) => {
                write!(f, "Feasible(objective={})", solution.objective_value())
            }
            SolverResult::Unknown => write!(f, "Unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationReason {
    /// The solver found and proved optimality of a solution.
    OptimalityProven,
    /// The solver proved that the problem is infeasible.
    InfeasibilityProven,
    /// The solver aborted due to a search limit (time, nodes, interrupt).
    /// The string contains information about the reason for abortion.
    Aborted(String),
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminationReason::OptimalityProven => write!(f, "Optimality Proven"),
            TerminationReason::InfeasibilityProven => write!(f, "Infeasibility Proven"),
            TerminationReason::Aborted(reason) => write!(f, "Aborted: {}", reason),
        }
    }
}

/// The answer of a complete solve: result, why the search stopped, and statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverOutcome {
    pub result: SolverResult,
    pub reason: TerminationReason,
    pub statistics: SolverStatistics,
}

impl SolverOutcome {
    #[inline]
    pub fn new(
        result: SolverResult,
        reason: TerminationReason,
        statistics: SolverStatistics,
    ) -> Self {
        Self {
            result,
            reason,
            statistics,
        }
    }

    #[inline]
    pub fn is_optimal(&self) -> bool {
        matches!(self.result, SolverResult::Optimal(_))
    }

    #[inline]
    pub fn is_feasible(&self) -> bool {
        matches!(self.result, SolverResult::Feasible(_))
    }

    #[inline]
    pub fn is_infeasible(&self) -> bool {
        matches!(self.result, SolverResult::Infeasible)
    }

    #[inline]
    pub fn has_solution(&self) -> bool {
        matches!(
            self.result,
            SolverResult::Optimal(_) | SolverResult::Feasible(_)
        )
    }

    /// Returns `true` if a limit stopped the search.
    #[inline]
    pub fn is_aborted(&self) -> bool {
        matches!(self.reason, TerminationReason::Aborted(_))
    }

    #[inline]
    pub fn solution(&self) -> Option<&Solution> {
        self.result.solution()
    }
}

impl std::fmt::Display for SolverOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solver Outcome")?;
        writeln!(f, "  Result: {}", self.result)?;
        writeln!(f, "  Termination: {}", self.reason)?;
        write!(f, "{}", self.statistics)
    }
}
