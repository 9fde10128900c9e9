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

//! # Node Limit Monitor
//!
//! Caps the number of nodes an engine may process. The counter is an
//! `AtomicU64` owned by the caller so that every worker of a parallel search
//! draws from the same budget.
//!
//! Each `on_step` counts one node pop. Once more than `node_limit` pops have
//! been counted, `search_command` returns `Terminate`; exactly `node_limit`
//! nodes are processed in a sequential search.

use crate::monitor::search_monitor::{SearchCommand, SearchMonitor};
use siting_model::{model::Model, solution::Solution};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug)]
pub struct NodeLimitMonitor<'a> {
    nodes: &'a AtomicU64,
    node_limit: u64,
}

impl<'a> NodeLimitMonitor<'a> {
    /// Creates a new `NodeLimitMonitor` drawing from the shared `nodes` counter.
    #[inline]
    pub fn new(nodes: &'a AtomicU64, node_limit: u64) -> Self {
        Self { nodes, node_limit }
    }

    #[inline]
    pub fn node_limit(&self) -> u64 {
        self.node_limit
    }

    #[inline]
    fn exceeded(&self) -> bool {
        self.nodes.load(Ordering::Relaxed) > self.node_limit
    }
}

impl SearchMonitor for NodeLimitMonitor<'_> {
    fn name(&self) -> &str {
        "NodeLimitMonitor"
    }

    fn on_enter_search(&mut self, _model: &Model) {}

    fn on_exit_search(&mut self) {}

    fn on_solution_found(&mut self, _solution: &Solution) {}

    #[inline]
    fn on_step(&mut self) {
        self.nodes.fetch_add(1, Ordering::Relaxed);
    }

    fn search_command(&self) -> SearchCommand {
        if self.exceeded() {
            SearchCommand::Terminate("node limit reached".to_string())
        } else {
            SearchCommand::Continue
        }
    }
}
