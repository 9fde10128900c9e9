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

use crate::branching::rule::BranchingRule;
use siting_core::num::Tolerance;
use siting_lp::{bounds::ActivationBounds, relaxation::Relaxation};
use siting_model::index::FacilityIndex;

/// Branches on the first free facility with a fractional activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LowestIndexFractional;

impl BranchingRule for LowestIndexFractional {
    #[inline]
    fn name(&self) -> &str {
        "LowestIndexFractional"
    }

    #[inline]
    fn select(
        &self,
        relaxation: &Relaxation,
        bounds: &ActivationBounds,
        tolerance: &Tolerance,
    ) -> Option<FacilityIndex> {
        relaxation
            .fractional_facilities(tolerance)
            .map(|(facility, _)| facility)
            .find(|&facility| bounds.is_free(facility))
    }
}
