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

//! Most-fractional branching
//!
//! Picks the free facility whose activation value is closest to `0.5`; on
//! equal distance the lowest facility index wins. Splitting the most
//! undecided facility tends to move both children's bounds the most.

use crate::branching::rule::BranchingRule;
use siting_core::num::Tolerance;
use siting_lp::{bounds::ActivationBounds, relaxation::Relaxation};
use siting_model::index::FacilityIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClosestToHalf;

impl BranchingRule for ClosestToHalf {
    #[inline]
    fn name(&self) -> &str {
        "ClosestToHalf"
    }

    fn select(
        &self,
        relaxation: &Relaxation,
        bounds: &ActivationBounds,
        tolerance: &Tolerance,
    ) -> Option<FacilityIndex> {
        let mut best: Option<(FacilityIndex, f64)> = None;
        for (facility, value) in relaxation.fractional_facilities(tolerance) {
            if !bounds.is_free(facility) {
                continue;
            }
            let distance = (value - 0.5).abs();
            match best {
                Some((_, d)) if d <= distance => {}
                _ => best = Some((facility, distance)),
            }
        }
        best.map(|(facility, _)| facility)
    }
}
