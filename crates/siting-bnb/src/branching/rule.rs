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

use crate::branching::{closest_half::ClosestToHalf, lowest_index::LowestIndexFractional};
use siting_core::num::Tolerance;
use siting_lp::{bounds::ActivationBounds, relaxation::Relaxation};
use siting_model::index::FacilityIndex;

/// Chooses the facility a node is branched on.
///
/// Implementations must be deterministic and must return `None` exactly when
/// `Relaxation::fractional_facilities` yields no free facility, in which case
/// the engine treats the node as integral.
pub trait BranchingRule {
    /// Returns the name of the rule.
    fn name(&self) -> &str;

    /// Selects the branching facility for a node.
    fn select(
        &self,
        relaxation: &Relaxation,
        bounds: &ActivationBounds,
        tolerance: &Tolerance,
    ) -> Option<FacilityIndex>;
}

impl std::fmt::Debug for dyn BranchingRule + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BranchingRule({})", self.name())
    }
}

/// The built-in branching rules, selectable by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BranchingStrategy {
    /// Branch on the fractional facility closest to `0.5`.
    #[default]
    ClosestToHalf,
    /// Branch on the first fractional facility.
    LowestIndexFractional,
}

impl std::fmt::Display for BranchingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl BranchingRule for BranchingStrategy {
    #[inline]
    fn name(&self) -> &str {
        match self {
            BranchingStrategy::ClosestToHalf => ClosestToHalf.name(),
            BranchingStrategy::LowestIndexFractional => LowestIndexFractional.name(),
        }
    }

    #[inline]
    fn select(
        &self,
        relaxation: &Relaxation,
        bounds: &ActivationBounds,
        tolerance: &Tolerance,
    ) -> Option<FacilityIndex> {
        match self {
            BranchingStrategy::ClosestToHalf => ClosestToHalf.select(relaxation, bounds, tolerance),
            BranchingStrategy::LowestIndexFractional => {
                LowestIndexFractional.select(relaxation, bounds, tolerance)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use siting_lp::relaxation::RelaxationSolver;
    use siting_model::{
        entity::{DemandPoint, Facility},
        model::Model,
    };

    /// Two free facilities, each serving one demand point alone, so that the
    /// root activations are `first / 40` and `second / 40`.
    pub(crate) fn relaxation_with_open_values(first: f64, second: f64) -> Relaxation {
        let model = Model::new(
            vec![Facility::new("F0", 40.0, 0.0), Facility::new("F1", 40.0, 0.0)],
            vec![DemandPoint::new("D0", first), DemandPoint::new("D1", second)],
            vec![vec![1.0, 100.0], vec![100.0, 2.0]],
        )
        .expect("valid model");
        RelaxationSolver::new()
            .solve(&model, &ActivationBounds::root(2))
            .expect("feasible relaxation")
    }

    #[test]
    fn test_strategy_dispatches_to_rules() {
        let relaxation = relaxation_with_open_values(4.0, 24.0);
        let bounds = ActivationBounds::root(2);
        let tol = Tolerance::default();

        assert_eq!(
            BranchingStrategy::ClosestToHalf.select(&relaxation, &bounds, &tol),
            Some(FacilityIndex::new(1))
        );
        assert_eq!(
            BranchingStrategy::LowestIndexFractional.select(&relaxation, &bounds, &tol),
            Some(FacilityIndex::new(0))
        );
    }

    #[test]
    fn test_default_and_names() {
        assert_eq!(BranchingStrategy::default(), BranchingStrategy::ClosestToHalf);
        assert_eq!(BranchingStrategy::ClosestToHalf.to_string(), "ClosestToHalf");
        assert_eq!(
            BranchingStrategy::LowestIndexFractional.to_string(),
            "LowestIndexFractional"
        );
    }
}
