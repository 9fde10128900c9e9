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

//! Warm-start heuristic
//!
//! Produces one feasible integral solution before the tree search starts, so
//! that prune-by-bound is active from the first node on.
//!
//! The rule:
//! 1. Open every facility.
//! 2. Pick the facility with the largest fixed cost (first index on ties).
//!    If the remaining facilities still cover total demand, close it and
//!    route demand optimally over the rest.
//! 3. Otherwise, or if that routing fails, route demand over all facilities.
//!
//! Routing is the relaxation with every activation fixed, which is an exact
//! transportation problem and therefore already integral in the activations.
//! The result is only ever used as an upper bound; the search is free to
//! improve on it or discard it.

use crate::{eval::NodeEvaluator, stats::BnbSolverStatistics};
use log::debug;
use siting_lp::{bounds::ActivationBounds, relaxation::RelaxationSolver};
use siting_model::{index::FacilityIndex, model::Model, solution::Solution};

/// Builds the initial incumbent for a model.
#[derive(Debug, Clone, Copy, Default)]
pub struct WarmStartHeuristic {
    solver: RelaxationSolver,
}

impl WarmStartHeuristic {
    #[inline]
    pub fn new(solver: RelaxationSolver) -> Self {
        Self { solver }
    }

    /// The facility the heuristic tries to close: strictly largest fixed
    /// cost, lowest index among equals. `None` for a model without facilities.
    pub fn closing_candidate(model: &Model) -> Option<FacilityIndex> {
        let mut best: Option<(FacilityIndex, f64)> = None;
        for facility in model.facility_indices() {
            let cost = model.fixed_cost(facility);
            match best {
                Some((_, c)) if c >= cost => {}
                _ => best = Some((facility, cost)),
            }
        }
        best.map(|(facility, _)| facility)
    }

    /// Runs the heuristic.
    ///
    /// Returns `None` if even the all-open configuration cannot satisfy
    /// demand, or if its relaxation cannot be solved reliably.
    pub fn run(&self, model: &Model) -> Option<Solution> {
        let evaluator = NodeEvaluator::new(model, &self.solver);
        let all_open = ActivationBounds::all_open(model.num_facilities());
        let demand = model.total_demand();
        let eps = self.solver.tolerance().feasibility * demand.max(1.0);

        if let Some(candidate) = Self::closing_candidate(model) {
            let remaining = model.total_capacity() - model.capacity(candidate);
            if remaining >= demand - eps {
                match self.route(&evaluator, all_open.with_closed(candidate)) {
                    Some(solution) => {
                        debug!(
                            "warm start: closed facility {} ({}), objective {}",
                            candidate,
                            model.facility_id(candidate),
                            solution.objective_value()
                        );
                        return Some(solution);
                    }
                    None => debug!(
                        "warm start: routing without facility {} failed, keeping all open",
                        candidate
                    ),
                }
            }
        }

        let solution = self.route(&evaluator, all_open);
        match &solution {
            Some(s) => debug!("warm start: all facilities open, objective {}", s.objective_value()),
            None => debug!("warm start: no feasible configuration"),
        }
        solution
    }

    fn route(&self, evaluator: &NodeEvaluator<'_>, bounds: ActivationBounds) -> Option<Solution> {
        let mut scratch = BnbSolverStatistics::default();
        match evaluator.evaluate(0, 0, bounds, &mut scratch) {
            Ok(Some(node)) => Some(evaluator.to_solution(node.relaxation())),
            Ok(None) => None,
            Err(err) => {
                debug!("warm start: {}", err);
                None
            }
        }
    }
}
