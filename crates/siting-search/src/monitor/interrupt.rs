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

//! External stop signal.
//!
//! Stops the search as soon as a caller-owned `AtomicBool` is raised, for
//! example from a Ctrl-C handler or a supervising thread. The flag is only
//! read between node pops, so a node that is already being evaluated runs
//! to completion first.

use crate::monitor::search_monitor::{SearchCommand, SearchMonitor};
use siting_model::{model::Model, solution::Solution};
use std::sync::atomic::{AtomicBool, Ordering};

const INTERRUPT_REASON: &str = "Interrupt signal received";

/// Terminates the search once `signal` reads `true`.
#[derive(Debug, Clone, Copy)]
pub struct InterruptMonitor<'a> {
    signal: &'a AtomicBool,
}

impl<'a> InterruptMonitor<'a> {
    #[inline(always)]
    pub fn new(signal: &'a AtomicBool) -> Self {
        Self { signal }
    }

    /// Whether the signal has been raised.
    #[inline(always)]
    pub fn is_raised(&self) -> bool {
        self.signal.load(Ordering::Acquire)
    }
}

impl SearchMonitor for InterruptMonitor<'_> {
    fn name(&self) -> &str {
        "InterruptMonitor"
    }

    fn on_enter_search(&mut self, _model: &Model) {}
    fn on_exit_search(&mut self) {}
    fn on_solution_found(&mut self, _solution: &Solution) {}
    fn on_step(&mut self) {}

    fn search_command(&self) -> SearchCommand {
        match self.is_raised() {
            true => SearchCommand::Terminate(INTERRUPT_REASON.to_string()),
            false => SearchCommand::Continue,
        }
    }
}
