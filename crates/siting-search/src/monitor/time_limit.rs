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

//! # Time Limit Monitor
//!
//! Enforces a wall-clock time budget on the search. The clock is read only on
//! steps selected by a bitmask and termination is requested once the
//! configured `Duration` has elapsed.
//!
//! ## Highlights
//!
//! - Bitmask-driven clock checks: `(steps & clock_check_mask) == 0` triggers a check.
//!   Every node pop solves at least one LP, so the default mask (`0x7`) reads the
//!   clock every 8 steps.
//! - `on_step()` uses `wrapping_add` to increment steps at minimal cost.
//! - `search_command()` returns `Terminate("time limit reached")` once elapsed time
//!   exceeds the limit at a check point; otherwise `Continue`.
//!
//! ## Usage
//!
//! ```rust
//! use siting_search::monitor::time_limit::TimeLimitMonitor;
//! use siting_search::monitor::search_monitor::{SearchMonitor, SearchCommand};
//! use std::time::Duration;
//!
//! let mut mon = TimeLimitMonitor::new(Duration::from_secs(5));
//! mon.on_step();
//! assert_eq!(mon.search_command(), SearchCommand::Continue);
//! ```

use crate::monitor::search_monitor::{SearchCommand, SearchMonitor};
use siting_model::{model::Model, solution::Solution};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeLimitMonitor {
    clock_check_mask: u64,
    steps: u64,
    time_limit: Duration,
    start_time: Instant,
}

impl TimeLimitMonitor {
    /// Default mask: check every 8 steps.
    const DEFAULT_STEP_CLOCK_CHECK_MASK: u64 = 0x7;

    #[inline]
    pub fn new(time_limit: Duration) -> Self {
        Self::with_clock_check_mask(time_limit, Self::DEFAULT_STEP_CLOCK_CHECK_MASK)
    }

    #[inline]
    pub fn with_clock_check_mask(time_limit: Duration, clock_check_mask: u64) -> Self {
        Self {
            clock_check_mask,
            steps: 0,
            time_limit,
            start_time: Instant::now(),
        }
    }

    /// Restarts the clock from `start`, e.g. the instant the caller began solving.
    #[inline]
    pub fn starting_at(mut self, start: Instant) -> Self {
        self.start_time = start;
        self
    }

    #[inline]
    pub fn time_limit(&self) -> Duration {
        self.time_limit
    }
}

impl SearchMonitor for TimeLimitMonitor {
    fn name(&self) -> &str {
        "TimeLimitMonitor"
    }

    fn on_enter_search(&mut self, _model: &Model) {
        self.steps = 0;
    }

    fn on_exit_search(&mut self) {}

    fn on_solution_found(&mut self, _solution: &Solution) {}

    #[inline(always)]
    fn on_step(&mut self) {
        self.steps = self.steps.wrapping_add(1);
    }

    #[inline(always)]
    fn search_command(&self) -> SearchCommand {
        if (self.steps & self.clock_check_mask) == 0 && self.start_time.elapsed() >= self.time_limit
        {
            return SearchCommand::Terminate("time limit reached".to_string());
        }
        SearchCommand::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_monitor_with_limit(ms: u64) -> TimeLimitMonitor {
        TimeLimitMonitor::new(Duration::from_millis(ms))
    }

    #[test]
    fn test_terminates_after_time_limit_when_mask_condition_met() {
        let mut mon = new_monitor_with_limit(10);
        mon.start_time = Instant::now() - Duration::from_millis(50);
        mon.steps = 0;
        match mon.search_command() {
            SearchCommand::Terminate(msg) => assert!(msg.contains("time limit")),
            other => panic!("expected Terminate, got {:?}", other),
        }
    }

    #[test]
    fn test_continues_when_mask_condition_not_met_even_if_time_exceeded() {
        let mut mon = new_monitor_with_limit(1);
        mon.start_time = Instant::now() - Duration::from_millis(50);
        mon.steps = 1;
        assert_eq!(mon.search_command(), SearchCommand::Continue);
    }

    #[test]
    fn test_zero_mask_always_checks() {
        let mut mon = TimeLimitMonitor::with_clock_check_mask(Duration::from_millis(1), 0);
        mon.start_time = Instant::now() - Duration::from_millis(50);
        mon.steps = 12345;
        assert!(matches!(mon.search_command(), SearchCommand::Terminate(_)));
    }

    #[test]
    fn test_continues_before_time_limit() {
        let mon = new_monitor_with_limit(60_000);
        assert_eq!(mon.search_command(), SearchCommand::Continue);
    }

    #[test]
    fn test_zero_limit_terminates_immediately() {
        let mon = TimeLimitMonitor::new(Duration::ZERO);
        assert!(matches!(mon.search_command(), SearchCommand::Terminate(_)));
    }

    #[test]
    fn test_on_step_wraps() {
        let mut mon = new_monitor_with_limit(1000);
        mon.steps = u64::MAX;
        mon.on_step();
        assert_eq!(mon.steps, 0);
    }

    #[test]
    fn test_starting_at_backdates_the_clock() {
        let start = Instant::now() - Duration::from_millis(100);
        let mon = TimeLimitMonitor::new(Duration::from_millis(10)).starting_at(start);
        assert!(matches!(mon.search_command(), SearchCommand::Terminate(_)));
        assert_eq!(mon.time_limit(), Duration::from_millis(10));
    }
}
