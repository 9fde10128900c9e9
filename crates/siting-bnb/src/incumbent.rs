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

//! Incumbent management for branch-and-bound
//!
//! Declares `IncumbentStore`, a minimal interface to read the best known
//! objective (upper bound), publish new solutions, and recover the shared
//! best solution at the end of a run.
//!
//! Implementations
//! - `NoSharedIncumbent`: local only. `initial_upper_bound = +inf`,
//!   `tighten(x) = x`, `on_solution_found` is a no-op, and there is never a
//!   shared snapshot.
//! - `SharedIncumbentAdapter<'a>`: wraps `siting_search::incumbent::SharedIncumbent`;
//!   `tighten(x)` returns `min(shared, x)` and `on_solution_found` attempts
//!   a strict compare-and-set installation.

use siting_model::solution::Solution;
use siting_search::incumbent::SharedIncumbent;

/// Where a search reads and publishes its upper bound.
pub trait IncumbentStore {
    /// Returns the upper bound the search starts with.
    fn initial_upper_bound(&self) -> f64;
    /// Combines the local best objective with the shared one.
    fn tighten(&self, current_local_best: f64) -> f64;
    /// Publishes a new local best solution.
    fn on_solution_found(&self, solution: &Solution);
    /// Returns a copy of the shared best solution, if the store has one.
    fn snapshot(&self) -> Option<Solution>;
}

/// An `IncumbentStore` that shares nothing. Use it for isolated runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSharedIncumbent;

impl NoSharedIncumbent {
    #[inline(always)]
    pub fn new() -> Self {
        Self
    }
}

impl IncumbentStore for NoSharedIncumbent {
    #[inline(always)]
    fn initial_upper_bound(&self) -> f64 {
        f64::INFINITY
    }

    #[inline(always)]
    fn tighten(&self, current_local_best: f64) -> f64 {
        current_local_best
    }

    #[inline(always)]
    fn on_solution_found(&self, _: &Solution) {}

    #[inline(always)]
    fn snapshot(&self) -> Option<Solution> {
        None
    }
}

/// An `IncumbentStore` backed by a `SharedIncumbent`.
#[repr(transparent)]
#[derive(Debug, Clone, Copy)]
pub struct SharedIncumbentAdapter<'a> {
    inner: &'a SharedIncumbent,
}

impl<'a> SharedIncumbentAdapter<'a> {
    #[inline(always)]
    pub fn new(inner: &'a SharedIncumbent) -> Self {
        Self { inner }
    }
}

impl IncumbentStore for SharedIncumbentAdapter<'_> {
    #[inline(always)]
    fn initial_upper_bound(&self) -> f64 {
        self.inner.upper_bound()
    }

    #[inline(always)]
    fn tighten(&self, current_local_best: f64) -> f64 {
        self.inner.upper_bound().min(current_local_best)
    }

    #[inline(always)]
    fn on_solution_found(&self, solution: &Solution) {
        self.inner.try_install(solution);
    }

    #[inline]
    fn snapshot(&self) -> Option<Solution> {
        self.inner.snapshot()
    }
}
