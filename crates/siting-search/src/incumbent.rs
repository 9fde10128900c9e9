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

//! # Shared Incumbent (Best Solution Holder)
//!
//! A concurrent container for the best integral solution discovered so far.
//! It exposes a fast, lock-free upper bound via an atomic and stores the
//! actual `Solution` behind a `Mutex` as the source of truth.
//!
//! ## Motivation
//!
//! - Fast pruning checks: workers compare node bounds against the atomic upper
//!   bound on every pop without taking a lock.
//! - Compare-and-set under the lock: a candidate is installed only if it is
//!   strictly better than the solution held in the mutex, so two workers that
//!   find solutions concurrently can never overwrite a better one.
//! - Simple sentinel: the upper bound starts at `f64::INFINITY`, meaning "no
//!   incumbent yet."
//!
//! ## Highlights
//!
//! - Objectives are `f64`; the atomic stores their bit pattern in an `AtomicU64`.
//! - `try_install(&Solution) -> bool` installs strictly better candidates.
//! - `snapshot() -> Option<Solution>` clones the current incumbent.
//!
//! ## Usage
//!
//! ```rust
//! use siting_search::incumbent::SharedIncumbent;
//! use siting_model::{flow::FlowAssignment, solution::Solution};
//! use fixedbitset::FixedBitSet;
//!
//! let inc = SharedIncumbent::new();
//! let candidate = Solution::new(100.0, FixedBitSet::with_capacity(2), FlowAssignment::new());
//!
//! assert!(inc.try_install(&candidate));
//! assert_eq!(inc.upper_bound(), 100.0);
//! assert!(inc.snapshot().is_some());
//! ```

use siting_model::solution::Solution;
use std::sync::{
    Mutex, PoisonError,
    atomic::{AtomicU64, Ordering},
};

/// A concurrent holder for the best (incumbent) solution found during search.
///
/// The upper bound is loaded and stored with `Ordering::Relaxed`; it is a hint
/// for pruning. The solution and its objective are synchronised by the mutex.
#[derive(Debug)]
pub struct SharedIncumbent {
    /// Objective of the incumbent as `f64::to_bits`.
    upper_bound: AtomicU64,
    solution: Mutex<Option<Solution>>,
}

impl Default for SharedIncumbent {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SharedIncumbent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Incumbent(upper_bound: {})", self.upper_bound())
    }
}

impl SharedIncumbent {
    /// Creates a new shared incumbent with no solution installed.
    #[inline]
    pub fn new() -> Self {
        SharedIncumbent {
            upper_bound: AtomicU64::new(f64::INFINITY.to_bits()),
            solution: Mutex::new(None),
        }
    }

    /// Returns the objective of the current incumbent, or `f64::INFINITY`.
    #[inline]
    pub fn upper_bound(&self) -> f64 {
        f64::from_bits(self.upper_bound.load(Ordering::Relaxed))
    }

    /// Returns `true` once a solution has been installed.
    #[inline]
    pub fn has_solution(&self) -> bool {
        self.upper_bound().is_finite()
    }

    /// Returns a snapshot of the current incumbent solution, if any.
    #[inline]
    pub fn snapshot(&self) -> Option<Solution> {
        // Installation is a single assignment; a poisoned value is still consistent.
        let guard = self.solution.lock().unwrap_or_else(PoisonError::into_inner);
        guard.clone()
    }

    /// Consumes the holder and returns the incumbent, if any.
    #[inline]
    pub fn into_solution(self) -> Option<Solution> {
        self.solution
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Installs `candidate` if its objective is strictly below the current
    /// incumbent. Returns `true` if it was installed.
    pub fn try_install(&self, candidate: &Solution) -> bool {
        let candidate_objective = candidate.objective_value();
        if candidate_objective.is_nan() || candidate_objective >= self.upper_bound() {
            return false;
        }

        let mut guard = self.solution.lock().unwrap_or_else(PoisonError::into_inner);
        // Another thread might have installed a better solution while we waited.
        if let Some(current) = guard.as_ref()
            && candidate_objective >= current.objective_value()
        {
            return false;
        }

        *guard = Some(candidate.clone());
        self.upper_bound
            .store(candidate_objective.to_bits(), Ordering::Relaxed);

        true
    }
}

#[cfg(test)]
mod tests {
    use super::SharedIncumbent;
    use fixedbitset::FixedBitSet;
    use siting_model::{flow::FlowAssignment, solution::Solution};
    use std::sync::Arc;
    use std::thread;

    fn make_solution(objective: f64, n: usize) -> Solution {
        let mut open = FixedBitSet::with_capacity(n);
        open.insert_range(..);
        Solution::new(objective, open, FlowAssignment::new())
    }

    #[test]
    fn test_initial_state() {
        let inc = SharedIncumbent::new();
        assert_eq!(inc.upper_bound(), f64::INFINITY);
        assert!(!inc.has_solution());
        assert!(inc.snapshot().is_none());
    }

    #[test]
    fn test_install_better_solution_updates_upper_bound_and_snapshot() {
        let inc = SharedIncumbent::new();
        assert!(inc.try_install(&make_solution(100.5, 3)));
        assert_eq!(inc.upper_bound(), 100.5);

        let snap = inc.snapshot().expect("snapshot should be Some");
        assert_eq!(snap.objective_value(), 100.5);
        assert_eq!(snap.num_facilities(), 3);
        assert_eq!(snap.num_open(), 3);
    }

    #[test]
    fn test_reject_worse_or_equal_candidates() {
        let inc = SharedIncumbent::new();
        assert!(inc.try_install(&make_solution(100.0, 2)));
        assert!(!inc.try_install(&make_solution(150.0, 2)));
        assert!(!inc.try_install(&make_solution(100.0, 2)));
        assert!(!inc.try_install(&make_solution(f64::NAN, 2)));
        assert_eq!(inc.upper_bound(), 100.0);
        assert_eq!(inc.snapshot().map(|s| s.objective_value()), Some(100.0));
    }

    #[test]
    fn test_negative_objectives_are_ordered() {
        let inc = SharedIncumbent::new();
        assert!(inc.try_install(&make_solution(-5.0, 1)));
        assert!(inc.try_install(&make_solution(-7.25, 1)));
        assert!(!inc.try_install(&make_solution(-6.0, 1)));
        assert_eq!(inc.upper_bound(), -7.25);
    }

    #[test]
    fn test_concurrent_installs_minimum_wins() {
        let inc = Arc::new(SharedIncumbent::new());
        let objectives = vec![300.0, 200.0, 400.0, 50.0, 120.0, 75.0, 500.0, 60.0, 90.0];

        let handles: Vec<_> = objectives
            .iter()
            .copied()
            .map(|obj| {
                let inc = Arc::clone(&inc);
                thread::spawn(move || inc.try_install(&make_solution(obj, 4)))
            })
            .collect();
        let results: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(results.iter().any(|&r| r));

        assert_eq!(inc.upper_bound(), 50.0);
        let snap = inc.snapshot().expect("snapshot should be Some after installs");
        assert_eq!(snap.objective_value(), 50.0);
    }

    #[test]
    fn test_into_solution() {
        let inc = SharedIncumbent::new();
        inc.try_install(&make_solution(3.0, 1));
        assert_eq!(inc.into_solution().map(|s| s.objective_value()), Some(3.0));
    }
}
