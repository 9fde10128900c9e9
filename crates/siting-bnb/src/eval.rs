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

//! Node evaluation
//!
//! `NodeEvaluator` turns activation bounds into evaluated `Node`s. It owns
//! the retry policy for numerically difficult relaxations: a solve that
//! reports `NumericInstability` is repeated once with
//! `RelaxationSolver::tightened`, and only a second failure is surfaced as
//! `BnbError::Numeric`.
//!
//! It also converts integral relaxations into `Solution`s. The activation
//! vector of such a solution opens every facility whose relaxed value
//! rounds to one and every facility that ships anything, and the objective
//! is recomputed from scratch with `Model::evaluate_objective`.

use crate::{error::BnbError, node::Node, stats::BnbSolverStatistics};
use log::debug;
use siting_core::num::Tolerance;
use siting_lp::{
    bounds::ActivationBounds,
    error::RelaxationError,
    relaxation::{Relaxation, RelaxationSolver},
};
use siting_model::{model::Model, solution::Solution};

/// Solves node relaxations for one model.
#[derive(Debug, Clone, Copy)]
pub struct NodeEvaluator<'a> {
    model: &'a Model,
    solver: RelaxationSolver,
    retry: RelaxationSolver,
}

impl<'a> NodeEvaluator<'a> {
    #[inline]
    pub fn new(model: &'a Model, solver: &RelaxationSolver) -> Self {
        Self {
            model,
            solver: *solver,
            retry: solver.tightened(),
        }
    }

    #[inline]
    pub fn model(&self) -> &'a Model {
        self.model
    }

    /// The tolerances used for integrality and pruning decisions.
    #[inline]
    pub fn tolerance(&self) -> &Tolerance {
        self.solver.tolerance()
    }

    /// Solves the relaxation under `bounds` and wraps it in a node.
    ///
    /// Returns `Ok(None)` when the relaxation is infeasible.
    ///
    /// # Errors
    ///
    /// `BnbError::Numeric` if both the regular and the tightened solve fail
    /// to certify optimality.
    pub fn evaluate(
        &self,
        id: u64,
        depth: u32,
        bounds: ActivationBounds,
        stats: &mut BnbSolverStatistics,
    ) -> Result<Option<Node>, BnbError> {
        let Some(relaxation) = self.solve(id, &bounds, stats)? else {
            return Ok(None);
        };
        stats.on_node_created(depth as u64, relaxation.iterations());
        Ok(Some(Node::new(id, depth, bounds, relaxation)))
    }

    fn solve(
        &self,
        id: u64,
        bounds: &ActivationBounds,
        stats: &mut BnbSolverStatistics,
    ) -> Result<Option<Relaxation>, BnbError> {
        match self.solver.solve(self.model, bounds) {
            Ok(relaxation) => return Ok(Some(relaxation)),
            Err(RelaxationError::Infeasible { .. }) => return Ok(None),
            Err(RelaxationError::NumericInstability { iterations }) => {
                debug!(
                    "node {}: relaxation not certified after {} pivots, retrying with tightened tolerances",
                    id, iterations
                );
                stats.on_numeric_retry();
            }
        }

        match self.retry.solve(self.model, bounds) {
            Ok(relaxation) => Ok(Some(relaxation)),
            Err(RelaxationError::Infeasible { .. }) => Ok(None),
            Err(RelaxationError::NumericInstability { iterations }) => Err(BnbError::Numeric {
                node_id: id,
                iterations,
            }),
        }
    }

    /// Builds the integral solution described by `relaxation`.
    pub fn to_solution(&self, relaxation: &Relaxation) -> Solution {
        let mut open = relaxation.rounded_activation();
        for e in relaxation.flows() {
            open.insert(e.route.facility.get());
        }
        let flows = relaxation.flows().clone();
        let objective = self.model.evaluate_objective(&open, &flows);
        Solution::new(objective, open, flows)
    }
}
