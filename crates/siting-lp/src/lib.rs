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

//! # Siting LP
//!
//! **Continuous relaxation of the facility-location MIP.**
//!
//! For a node of the search tree, activation variables are restricted by
//! `ActivationBounds` (free, forced open, forced closed) and relaxed to the
//! interval `[lower, upper]`. This crate computes the optimal value of that
//! linear program together with its flows and fractional activations.
//!
//! ## Reduction
//!
//! With non-negative fixed costs an optimal relaxation sets every activation
//! as low as its capacity row allows: `open_f = max(lower_f, load_f / capacity_f)`.
//! Substituting this back leaves a pure transportation problem:
//!
//! * facilities with `upper = 0` disappear;
//! * free facilities supply `capacity_f` units and charge an extra
//!   `fixed_cost_f / capacity_f` per unit shipped;
//! * forced-open facilities supply `capacity_f` units and add `fixed_cost_f`
//!   as a constant;
//! * a zero-cost dummy sink absorbs unused supply.
//!
//! The transportation problem is solved by a primal transportation simplex
//! (`transport`), which returns a basic optimal solution.
//!
//! ## Determinism
//!
//! Every tie (initial allocation, entering cell, leaving cell) is broken by
//! the lowest facility index, then the lowest demand point index, so repeated
//! solves of the same node produce identical flows.

pub mod bounds;
pub mod error;
pub mod relaxation;
pub mod transport;
