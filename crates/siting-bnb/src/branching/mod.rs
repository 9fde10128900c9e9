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

//! Branching variable selection
//!
//! A node whose relaxation has fractional activations is split on a single
//! facility: one child forces it closed, the other forces it open. The rules
//! here only decide which facility to split on.
//!
//! Provided rules:
//! - `closest_half`: the fractional facility whose value is nearest to `0.5`.
//! - `lowest_index`: the first fractional facility.
//! - `rule`: the `BranchingRule` trait and the `BranchingStrategy` selector.
//!
//! Every rule breaks ties by the lowest facility index and only considers
//! facilities that are still free under the node's bounds.

pub mod closest_half;
pub mod lowest_index;
pub mod rule;

pub use rule::{BranchingRule, BranchingStrategy};
