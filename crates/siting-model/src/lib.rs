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

//! # Siting Model
//!
//! **The problem description consumed by every solver component.**
//!
//! A capacitated facility-location instance consists of candidate facilities
//! (capacity, fixed activation cost), demand points (required inbound flow),
//! and a dense unit-cost matrix indexed by demand point × facility. This crate
//! owns that description together with the shapes the solver hands back:
//! flow assignments and integral solutions.
//!
//! ## Architecture
//!
//! * **`index`**: `FacilityIndex` and `DemandIndex`, two distinct typed index spaces.
//! * **`entity`**: `Facility` and `DemandPoint`, the row types of the input tables.
//! * **`model`**: the immutable `Model` and its validating `ModelBuilder`.
//! * **`flow`**: `Route` and the sparse `FlowAssignment` (zero flows are never stored).
//! * **`solution`**: `Solution`, an integral activation vector plus its flows.
//! * **`violation`**: constraint violations reported by `Model::check_solution`.
//! * **`lp_format`**: an optional CPLEX-LP text dump of the full MIP for auditing.
//! * **`error`**: `ModelError`, raised for malformed input.
//!
//! ## Design Philosophy
//!
//! 1.  **Fail-Fast**: the builder rejects malformed input eagerly; a `Model` that exists is valid.
//! 2.  **Structure of Arrays**: capacities, fixed costs, demands and unit costs live in flat vectors.
//! 3.  **Solver Independence**: `Model::evaluate_objective` recomputes the cost of any
//!     activation/flow pair from scratch, without consulting solver state.

pub mod entity;
pub mod error;
pub mod flow;
pub mod index;
pub mod lp_format;
pub mod model;
pub mod solution;
pub mod violation;
