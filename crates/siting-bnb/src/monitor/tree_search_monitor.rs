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

//! Tree search monitoring interface
//!
//! Declares the `TreeSearchMonitor` trait and `PruneReason` for observing and
//! controlling branch-and-bound. Callbacks track the engine lifecycle, and a
//! monitor can stop the run via `SearchCommand` (default: Continue).
//!
//! Lifecycle highlights
//! - enter → {evaluated | prune}* → step → command → {prune | solution | branch → {evaluated | prune}*} → ... → exit
//! - `on_step` and `search_command` run once per node popped from the
//!   frontier, before the node is processed.
//! - `BnbSolverStatistics` is provided to every callback for telemetry.
use crate::{node::Node, stats::BnbSolverStatistics};
use siting_lp::bounds::ActivationBounds;
use siting_model::{index::FacilityIndex, model::Model, solution::Solution};
use siting_search::monitor::search_monitor::SearchCommand;

/// Reasons for discarding a subtree.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PruneReason {
    /// The relaxation under the subtree's bounds is infeasible.
    Infeasible,
    /// The subtree's lower bound cannot beat the incumbent.
    BoundDominated,
}

impl std::fmt::Display for PruneReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PruneReason::Infeasible => write!(f, "Infeasible"),
            PruneReason::BoundDominated => write!(f, "BoundDominated"),
        }
    }
}

/// Trait for monitoring and controlling the search process of the engines.
pub trait TreeSearchMonitor {
    /// Returns the name of the monitor.
    fn name(&self) -> &str;
    /// Called when the search starts.
    fn on_enter_search(&mut self, model: &Model, statistics: &BnbSolverStatistics);
    /// Called when the search ends.
    fn on_exit_search(&mut self, statistics: &BnbSolverStatistics);
    /// Called to determine the next action of the search.
    fn search_command(&mut self, _node: &Node, _statistics: &BnbSolverStatistics) -> SearchCommand {
        SearchCommand::Continue
    }
    /// Called for every node popped from the frontier.
    fn on_step(&mut self, node: &Node, statistics: &BnbSolverStatistics);
    /// Called when the relaxation of a new node has been solved.
    fn on_node_evaluated(&mut self, node: &Node, statistics: &BnbSolverStatistics);
    /// Called when a subtree is discarded.
    fn on_prune(
        &mut self,
        bounds: &ActivationBounds,
        reason: PruneReason,
        statistics: &BnbSolverStatistics,
    );
    /// Called when `node` is split on `facility`.
    fn on_branch(&mut self, node: &Node, facility: FacilityIndex, statistics: &BnbSolverStatistics);
    /// Called when a new incumbent is installed.
    fn on_solution_found(&mut self, solution: &Solution, statistics: &BnbSolverStatistics);
}

impl std::fmt::Debug for dyn TreeSearchMonitor + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TreeSearchMonitor({})", self.name())
    }
}

impl std::fmt::Display for dyn TreeSearchMonitor + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TreeSearchMonitor({})", self.name())
    }
}
