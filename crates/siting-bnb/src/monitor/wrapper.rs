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

//! Adapter for engine-independent search monitors
//!
//! `WrapperMonitor` bridges this crate's `TreeSearchMonitor` with a generic
//! `SearchMonitor` from `siting_search`. It forwards lifecycle events and
//! commands to the inner monitor while ignoring tree-specific callbacks.
//!
//! Behavior
//! - Delegates: enter, step, solution, exit, and `search_command`.
//! - No-ops: node evaluation, prune, and branch.
//! - `name()` is `WrapperMonitor(inner.name())`.
//! - Owns the inner monitor. Pass `&mut monitor` to keep ownership at the
//!   call site; pass the monitor by value to hand it to a worker thread.
use crate::{
    monitor::tree_search_monitor::{PruneReason, TreeSearchMonitor},
    node::Node,
    stats::BnbSolverStatistics,
};
use siting_lp::bounds::ActivationBounds;
use siting_model::{index::FacilityIndex, model::Model, solution::Solution};
use siting_search::monitor::search_monitor::{SearchCommand, SearchMonitor};

/// A tree search monitor that wraps a general search monitor.
pub struct WrapperMonitor<M> {
    inner: M,
    name: String,
}

impl<M> WrapperMonitor<M>
where
    M: SearchMonitor,
{
    /// Creates a new `WrapperMonitor` that wraps the given search monitor.
    #[inline(always)]
    pub fn new(inner: M) -> Self {
        let name = format!("WrapperMonitor({})", inner.name());
        Self { inner, name }
    }

    #[inline]
    pub fn inner(&self) -> &M {
        &self.inner
    }

    #[inline]
    pub fn into_inner(self) -> M {
        self.inner
    }
}

impl<M> TreeSearchMonitor for WrapperMonitor<M>
where
    M: SearchMonitor,
{
    #[inline(always)]
    fn name(&self) -> &str {
        &self.name
    }

    #[inline(always)]
    fn on_enter_search(&mut self, model: &Model, _statistics: &BnbSolverStatistics) {
        self.inner.on_enter_search(model);
    }

    #[inline(always)]
    fn on_exit_search(&mut self, _statistics: &BnbSolverStatistics) {
        self.inner.on_exit_search();
    }

    #[inline(always)]
    fn search_command(&mut self, _node: &Node, _statistics: &BnbSolverStatistics) -> SearchCommand {
        self.inner.search_command()
    }

    #[inline(always)]
    fn on_step(&mut self, _node: &Node, _statistics: &BnbSolverStatistics) {
        self.inner.on_step();
    }

    #[inline(always)]
    fn on_node_evaluated(&mut self, _node: &Node, _statistics: &BnbSolverStatistics) {}

    #[inline(always)]
    fn on_prune(
        &mut self,
        _bounds: &ActivationBounds,
        _reason: PruneReason,
        _statistics: &BnbSolverStatistics,
    ) {
    }

    #[inline(always)]
    fn on_branch(
        &mut self,
        _node: &Node,
        _facility: FacilityIndex,
        _statistics: &BnbSolverStatistics,
    ) {
    }

    #[inline(always)]
    fn on_solution_found(&mut self, solution: &Solution, _statistics: &BnbSolverStatistics) {
        self.inner.on_solution_found(solution);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siting_search::monitor::node_limit::NodeLimitMonitor;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[test]
    fn test_forwards_steps_and_commands() {
        let counter = AtomicU64::new(0);
        let mut inner = NodeLimitMonitor::new(&counter, 1);
        let mut wrapper = WrapperMonitor::new(&mut inner);
        assert_eq!(wrapper.name(), "WrapperMonitor(NodeLimitMonitor)");

        let node = crate::bnb::tests::root_node_of_two_plant_instance();
        let stats = BnbSolverStatistics::default();

        wrapper.on_step(&node, &stats);
        assert_eq!(wrapper.search_command(&node, &stats), SearchCommand::Continue);
        wrapper.on_step(&node, &stats);
        assert!(matches!(
            wrapper.search_command(&node, &stats),
            SearchCommand::Terminate(_)
        ));
        assert_eq!(counter.load(Ordering::Relaxed), 2);
    }
}
