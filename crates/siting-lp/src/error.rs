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

use thiserror::Error;

/// Failures of a single relaxation solve.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RelaxationError {
    /// No non-negative flow satisfies every demand under the node's bounds.
    #[error("relaxation infeasible: available capacity {capacity} is below total demand {demand}")]
    Infeasible { capacity: f64, demand: f64 },

    /// The simplex could not certify an optimal basic solution within its budget.
    #[error("transportation simplex failed to certify optimality after {iterations} pivots")]
    NumericInstability { iterations: usize },
}

impl RelaxationError {
    /// Returns `true` for the infeasibility variant.
    #[inline]
    pub fn is_infeasible(&self) -> bool {
        matches!(self, RelaxationError::Infeasible { .. })
    }
}
