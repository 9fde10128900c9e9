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

//! Monitoring combinators for tree search
//!
//! Provides `CompositeTreeSearchMonitor`, a fan-out monitor that forwards every
//! event to its children. This lets you mix logging, limits and recording
//! without coupling them to the engines.
//!
//! Behavior
//! - Events are dispatched to child monitors in insertion order.
//! - `search_command` short-circuits on the first non-`Continue` response;
//!   put stricter stop conditions first.
//! - Other callbacks always fan out to all children.

use crate::{
    monitor::tree_search_monitor::{PruneReason, TreeSearchMonitor},
    node::Node,
    stats::BnbSolverStatistics,
};
use siting_lp::bounds::ActivationBounds;
use siting_model::{index::FacilityIndex, model::Model, solution::Solution};
use siting_search::monitor::search_monitor::SearchCommand;

/// A tree search monitor that aggregates multiple monitors and forwards events to all of them.
pub struct CompositeTreeSearchMonitor<'a> {
    monitors: Vec<Box<dyn TreeSearchMonitor + 'a>>,
}

impl Default for CompositeTreeSearchMonitor<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> CompositeTreeSearchMonitor<'a> {
    /// Creates a new empty `CompositeTreeSearchMonitor`.
    #[inline(always)]
    pub fn new() -> Self {
        Self {
            monitors: Vec::new(),
        }
    }

    /// Creates a new `CompositeTreeSearchMonitor` with room for `capacity` monitors.
    #[inline(always)]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            monitors: Vec::with_capacity(capacity),
        }
    }

    /// Adds a new monitor to the composite monitor.
    #[inline(always)]
    pub fn add_monitor<M>(&mut self, monitor: M)
    where
        M: TreeSearchMonitor + 'a,
    {
        self.monitors.push(Box::new(monitor));
    }

    /// Adds a boxed monitor to the composite monitor.
    #[inline(always)]
    pub fn add_monitor_boxed(&mut self, monitor: Box<dyn TreeSearchMonitor + 'a>) {
        self.monitors.push(monitor);
    }

    /// Returns a slice of the monitors contained in the composite monitor.
    #[inline(always)]
    pub fn monitors(&self) -> &[Box<dyn TreeSearchMonitor + 'a>] {
        &self.monitors
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }
}

impl<'a> FromIterator<Box<dyn TreeSearchMonitor + 'a>> for CompositeTreeSearchMonitor<'a> {
    #[inline(always)]
    fn from_iter<I: IntoIterator<Item = Box<dyn TreeSearchMonitor + 'a>>>(iter: I) -> Self {
        Self {
            monitors: iter.into_iter().collect(),
        }
    }
}

impl std::fmt::Debug for CompositeTreeSearchMonitor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.monitors.iter().map(|m| m.name()))
            .finish()
    }
}

impl TreeSearchMonitor for CompositeTreeSearchMonitor<'_> {
    #[inline(always)]
    fn name(&self) -> &str {
        "CompositeTreeSearchMonitor"
    }

    fn on_enter_search(&mut self, model: &Model, statistics: &BnbSolverStatistics) {
        for monitor in self.monitors.iter_mut() {
            monitor.on_enter_search(model, statistics);
        }
    }

    fn on_exit_search(&mut self, statistics: &BnbSolverStatistics) {
        for monitor in self.monitors.iter_mut() {
            monitor.on_exit_search(statistics);
        }
    }

    fn search_command(&mut self, node: &Node, statistics: &BnbSolverStatistics) -> SearchCommand {
        for monitor in self.monitors.iter_mut() {
            if let SearchCommand::Terminate(msg) = monitor.search_command(node, statistics) {
                return SearchCommand::Terminate(msg);
            }
        }
        SearchCommand::Continue
    }

    fn on_step(&mut self, node: &Node, statistics: &BnbSolverStatistics) {
        for monitor in self.monitors.iter_mut() {
            monitor.on_step(node, statistics);
        }
    }

    fn on_node_evaluated(&mut self, node: &Node, statistics: &BnbSolverStatistics) {
        for monitor in self.monitors.iter_mut() {
            monitor.on_node_evaluated(node, statistics);
        }
    }

    fn on_prune(
        &mut self,
        bounds: &ActivationBounds,
        reason: PruneReason,
        statistics: &BnbSolverStatistics,
    ) {
        for monitor in self.monitors.iter_mut() {
            monitor.on_prune(bounds, reason, statistics);
        }
    }

    fn on_branch(&mut self, node: &Node, facility: FacilityIndex, statistics: &BnbSolverStatistics) {
        for monitor in self.monitors.iter_mut() {
            monitor.on_branch(node, facility, statistics);
        }
    }

    fn on_solution_found(&mut self, solution: &Solution, statistics: &BnbSolverStatistics) {
        for monitor in self.monitors.iter_mut() {
            monitor.on_solution_found(solution, statistics);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::no_op::NoOperationMonitor;
    use std::{cell::RefCell, rc::Rc};

    struct Recording {
        name: &'static str,
        log: Rc<RefCell<Vec<String>>>,
        stop: bool,
    }

    impl TreeSearchMonitor for Recording {
        fn name(&self) -> &str {
            self.name
        }
        fn on_enter_search(&mut self, _model: &Model, _statistics: &BnbSolverStatistics) {
            self.log.borrow_mut().push(format!("{}:enter", self.name));
        }
        fn on_exit_search(&mut self, _statistics: &BnbSolverStatistics) {
            self.log.borrow_mut().push(format!("{}:exit", self.name));
        }
        fn search_command(
            &mut self,
            _node: &Node,
            _statistics: &BnbSolverStatistics,
        ) -> SearchCommand {
            self.log.borrow_mut().push(format!("{}:command", self.name));
            if self.stop {
                SearchCommand::Terminate(self.name.to_string())
            } else {
                SearchCommand::Continue
            }
        }
        fn on_step(&mut self, _node: &Node, _statistics: &BnbSolverStatistics) {
            self.log.borrow_mut().push(format!("{}:step", self.name));
        }
        fn on_node_evaluated(&mut self, _node: &Node, _statistics: &BnbSolverStatistics) {}
        fn on_prune(
            &mut self,
            _bounds: &ActivationBounds,
            reason: PruneReason,
            _statistics: &BnbSolverStatistics,
        ) {
            self.log
                .borrow_mut()
                .push(format!("{}:prune:{}", self.name, reason));
        }
        fn on_branch(
            &mut self,
            _node: &Node,
            _facility: FacilityIndex,
            _statistics: &BnbSolverStatistics,
        ) {
        }
        fn on_solution_found(&mut self, _solution: &Solution, _statistics: &BnbSolverStatistics) {}
    }

    fn recording(
        name: &'static str,
        log: &Rc<RefCell<Vec<String>>>,
        stop: bool,
    ) -> Box<dyn TreeSearchMonitor> {
        Box::new(Recording {
            name,
            log: Rc::clone(log),
            stop,
        })
    }

    #[test]
    fn test_fans_out_in_insertion_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut composite: CompositeTreeSearchMonitor =
            [recording("a", &log, false), recording("b", &log, false)]
                .into_iter()
                .collect();
        let node = crate::bnb::tests::root_node_of_two_plant_instance();
        let stats = BnbSolverStatistics::default();

        composite.on_step(&node, &stats);
        composite.on_prune(node.bounds(), PruneReason::Infeasible, &stats);
        composite.on_exit_search(&stats);

        assert_eq!(
            *log.borrow(),
            vec![
                "a:step",
                "b:step",
                "a:prune:Infeasible",
                "b:prune:Infeasible",
                "a:exit",
                "b:exit"
            ]
        );
    }

    #[test]
    fn test_search_command_short_circuits() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut composite = CompositeTreeSearchMonitor::new();
        composite.add_monitor(NoOperationMonitor::new());
        composite.add_monitor_boxed(recording("first", &log, true));
        composite.add_monitor_boxed(recording("second", &log, true));
        assert_eq!(composite.len(), 3);

        let node = crate::bnb::tests::root_node_of_two_plant_instance();
        let command = composite.search_command(&node, &BnbSolverStatistics::default());
        assert_eq!(command, SearchCommand::Terminate("first".to_string()));
        assert_eq!(*log.borrow(), vec!["first:command"]);
    }

    #[test]
    fn test_empty_composite_continues() {
        let mut composite = CompositeTreeSearchMonitor::default();
        assert!(composite.is_empty());
        let node = crate::bnb::tests::root_node_of_two_plant_instance();
        assert_eq!(
            composite.search_command(&node, &BnbSolverStatistics::default()),
            SearchCommand::Continue
        );
    }
}
