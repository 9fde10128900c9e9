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

use crate::{
    flow::FlowAssignment,
    index::{DemandIndex, FacilityIndex},
    model::Model,
};
use fixedbitset::FixedBitSet;

/// An integral solution of the facility-location problem.
///
/// One activation bit per facility plus the flows that serve every demand
/// point. Zero flows are not stored (see `FlowAssignment`).
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    /// The total cost: fixed costs of open facilities plus transport costs.
    objective_value: f64,

    /// `open[f]` is set if facility `f` is active.
    open: FixedBitSet,

    flows: FlowAssignment,
}

impl Solution {
    /// Constructs a new `Solution`.
    ///
    /// # Panics
    ///
    /// In debug builds, if a flow leaves a facility outside `open`'s range.
    pub fn new(objective_value: f64, open: FixedBitSet, flows: FlowAssignment) -> Self {
        debug_assert!(
            flows.iter().all(|e| e.route.facility.get() < open.len()),
            "called `Solution::new` with a flow from a facility outside the activation vector of len {}",
            open.len()
        );

        Self {
            objective_value,
            open,
            flows,
        }
    }

    /// Returns the total objective value of this solution.
    #[inline]
    pub fn objective_value(&self) -> f64 {
        self.objective_value
    }

    /// Returns the number of facilities covered by the activation vector.
    #[inline]
    pub fn num_facilities(&self) -> usize {
        self.open.len()
    }

    /// Returns `true` if `facility_index` is open.
    ///
    /// # Panics
    ///
    /// In debug builds, if `facility_index` is out of bounds.
    #[inline]
    pub fn is_open(&self, facility_index: FacilityIndex) -> bool {
        let index = facility_index.get();
        debug_assert!(
            index < self.num_facilities(),
            "called `Solution::is_open` with facility index out of bounds: the len is {} but the index is {}",
            self.num_facilities(),
            index
        );

        self.open.contains(index)
    }

    /// Iterates over the open facilities in ascending order.
    #[inline]
    pub fn open_facilities(&self) -> impl Iterator<Item = FacilityIndex> + '_ {
        self.open.ones().map(FacilityIndex::new)
    }

    /// Returns the number of open facilities.
    #[inline]
    pub fn num_open(&self) -> usize {
        self.open.count_ones(..)
    }

    /// Returns the activation vector.
    #[inline]
    pub fn activation(&self) -> &FixedBitSet {
        &self.open
    }

    /// Returns the flow assignment.
    #[inline]
    pub fn flows(&self) -> &FlowAssignment {
        &self.flows
    }

    /// Returns the amount shipped along `facility_index -> demand_index`.
    #[inline]
    pub fn flow(&self, facility_index: FacilityIndex, demand_index: DemandIndex) -> f64 {
        self.flows.get(facility_index, demand_index)
    }

    /// Decomposes the solution into its parts.
    #[inline]
    pub fn into_parts(self) -> (f64, FixedBitSet, FlowAssignment) {
        (self.objective_value, self.open, self.flows)
    }

    /// Pairs this solution with the model it solves, for an id-based report.
    #[inline]
    pub fn report<'a>(&'a self, model: &'a Model) -> SolutionReport<'a> {
        SolutionReport {
            solution: self,
            model,
        }
    }
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solution Summary")?;
        writeln!(f, "   Objective Value: {}", self.objective_value)?;
        writeln!(f)?;

        if self.num_facilities() == 0 {
            writeln!(f, "   (No facilities)")?;
            return Ok(());
        }

        writeln!(
            f,
            "   {:<10} | {:<8} | {:<12}",
            "Facility", "Status", "Outflow"
        )?;
        writeln!(f, "   {:-<10}-+-{:-<8}-+-{:-<12}", "", "", "")?;
        for i in 0..self.num_facilities() {
            let status = if self.open.contains(i) { "open" } else { "closed" };
            let outflow = self.flows.outflow(FacilityIndex::new(i));
            writeln!(f, "   {:<10} | {:<8} | {:<12}", i, status, outflow)?;
        }

        Ok(())
    }
}

/// A `Solution` rendered with the identifiers of its `Model`.
///
/// Lists the total cost, then for every facility in model order either the
/// non-zero transports it performs or that it stays closed.
#[derive(Clone, Copy, Debug)]
pub struct SolutionReport<'a> {
    solution: &'a Solution,
    model: &'a Model,
}

impl std::fmt::Display for SolutionReport<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "TOTAL COSTS: {}", self.solution.objective_value())?;
        writeln!(f, "SOLUTION:")?;
        for facility in self.model.facility_indices() {
            let id = self.model.facility_id(facility);
            if facility.get() < self.solution.num_facilities() && self.solution.is_open(facility) {
                writeln!(f, "Plant {} open", id)?;
                for e in self.solution.flows().outbound(facility) {
                    writeln!(
                        f,
                        "  Transport {} units to warehouse {}",
                        e.amount,
                        self.model.demand_point_id(e.route.demand_point)
                    )?;
                }
            } else {
                writeln!(f, "Plant {} closed!", id)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{DemandPoint, Facility};

    fn open_set(len: usize, ones: &[usize]) -> FixedBitSet {
        let mut set = FixedBitSet::with_capacity(len);
        for &i in ones {
            set.insert(i);
        }
        set
    }

    #[test]
    fn test_new_and_basic_accessors() {
        let flows = FlowAssignment::from_dense(3, 2, &[4.0, 0.0, 0.0, 0.0, 1.0, 6.0], 0.0);
        let sol = Solution::new(42.5, open_set(3, &[0, 2]), flows);

        assert_eq!(sol.objective_value(), 42.5);
        assert_eq!(sol.num_facilities(), 3);
        assert_eq!(sol.num_open(), 2);
        assert!(sol.is_open(FacilityIndex::new(0)));
        assert!(!sol.is_open(FacilityIndex::new(1)));
        assert_eq!(
            sol.open_facilities().collect::<Vec<_>>(),
            vec![FacilityIndex::new(0), FacilityIndex::new(2)]
        );
        assert_eq!(sol.flow(FacilityIndex::new(2), DemandIndex::new(1)), 6.0);
        assert_eq!(sol.flow(FacilityIndex::new(1), DemandIndex::new(1)), 0.0);
        assert_eq!(sol.flows().len(), 3);
    }

    #[test]
    fn test_display_lists_every_facility() {
        let flows = FlowAssignment::from_dense(2, 1, &[15.0, 0.0], 0.0);
        let sol = Solution::new(40.0, open_set(2, &[0]), flows);
        let text = format!("{}", sol);
        assert!(text.contains("Objective Value: 40"));
        assert!(text.contains("open"));
        assert!(text.contains("closed"));
    }

    #[test]
    fn test_report_omits_zero_flows() {
        let model = Model::new(
            vec![
                Facility::new("Berlin", 20.0, 10.0),
                Facility::new("Hamburg", 20.0, 1000.0),
            ],
            vec![DemandPoint::new("Munich", 15.0), DemandPoint::new("Bonn", 5.0)],
            vec![vec![2.0, 2.0], vec![1.0, 1.0]],
        )
        .expect("valid model");
        let flows = FlowAssignment::from_dense(2, 2, &[15.0, 5.0, 0.0, 0.0], 0.0);
        let sol = Solution::new(
            model.evaluate_objective(&open_set(2, &[0]), &flows),
            open_set(2, &[0]),
            flows,
        );

        let expected = "TOTAL COSTS: 45\n\
                        SOLUTION:\n\
                        Plant Berlin open\n\
                        \x20 Transport 15 units to warehouse Munich\n\
                        \x20 Transport 5 units to warehouse Bonn\n\
                        Plant Hamburg closed!\n";
        assert_eq!(sol.report(&model).to_string(), expected);
    }

    #[test]
    fn test_into_parts() {
        let sol = Solution::new(1.0, open_set(1, &[0]), FlowAssignment::new());
        let (obj, open, flows) = sol.into_parts();
        assert_eq!(obj, 1.0);
        assert!(open.contains(0));
        assert!(flows.is_empty());
    }
}
