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

//! Siting-BnB: branch-and-bound for capacitated facility location
//!
//! Implements a best-first branch-and-bound over facility activations. Every
//! node is bounded by the transportation relaxation from `siting_lp`, which
//! is exact for fixed activations and a valid lower bound otherwise.
//!
//! Core flow
//! - Provide a `siting_model::model::Model`.
//! - Optionally compute a `warm_start::WarmStartHeuristic` solution.
//! - Choose a `branching::BranchingRule` (default: closest to one half).
//! - Run `bnb::BnbSolver` sequentially or `parallel::ParallelBnbSolver` on
//!   several threads, with monitors for limits and progress output.
//!
//! Assumptions and guarantees
//! - Relaxation objectives never exceed the best integral objective under
//!   the same bounds; prune-by-bound relies on this.
//! - Exploration order is a pure function of the model and the rule in the
//!   sequential engine: the frontier breaks bound ties by insertion order.
//! - Infeasible relaxations prune silently; at the root they prove the whole
//!   model infeasible.
//!
//! Module map
//! - `bnb`: the sequential engine and its search session.
//! - `branching`: branching rules.
//! - `error`: `BnbError`, the numeric failure surfaced to callers.
//! - `eval`: node evaluation with one tightened retry.
//! - `frontier`: best-first priority queue of open nodes.
//! - `incumbent`: local or shared upper bound access.
//! - `monitor`: tree-search monitors (log, composite, wrapper).
//! - `node`: evaluated search tree nodes.
//! - `parallel`: the multi-threaded engine.
//! - `result`: solver outcomes with termination reasons.
//! - `stats`: counters and timing.
//! - `warm_start`: the initial incumbent heuristic.

pub mod bnb;
pub mod branching;
pub mod error;
pub mod eval;
pub mod frontier;
mod incumbent;
pub mod monitor;
pub mod node;
pub mod parallel;
pub mod result;
pub mod stats;
pub mod warm_start;
