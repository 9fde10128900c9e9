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

//! # Problem Model
//!
//! `Model` is the immutable description of one facility-location instance.
//! It is produced by `ModelBuilder::build` (or `Model::new` for table-shaped
//! input) which validates every field; a `Model` that exists is well formed.
//!
//! ## Layout
//!
//! Attributes are stored as a Structure of Arrays. Unit costs live in a
//! single flat vector indexed demand-point-major, mirroring the
//! `|demand points| × |facilities|` cost matrix of the input contract.
//!
//! ## Objective
//!
//! `Model::evaluate_objective` recomputes
//! `Σ_f fixed_cost_f · open_f + Σ_{f,d} unit_cost_{f,d} · flow_{f,d}`
//! from scratch. It never consults solver state, which makes it the
//! reference for verifying anything a solver reports.

use crate::{
    entity::{DemandPoint, Facility},
    error::ModelError,
    flow::FlowAssignment,
    index::{DemandIndex, FacilityIndex},
    violation::Violation,
};
use fixedbitset::FixedBitSet;
use rustc_hash::{FxHashMap, FxHashSet};
use siting_core::num::Tolerance;

#[inline(always)]
fn flatten_index(
    num_facilities: usize,
    facility_index: FacilityIndex,
    demand_index: DemandIndex,
) -> usize {
    demand_index.get() * num_facilities + facility_index.get()
}

/// An immutable, validated facility-location instance.
#[derive(Clone, PartialEq)]
pub struct Model {
    facility_ids: Vec<String>,
    capacities: Vec<f64>,
    fixed_costs: Vec<f64>,
    demand_point_ids: Vec<String>,
    demands: Vec<f64>,
    /// Demand-point-major: `unit_costs[d * num_facilities + f]`.
    unit_costs: Vec<f64>,
    total_capacity: f64,
    total_demand: f64,
}

impl Model {
    /// Builds a model from the three input tables.
    ///
    /// `cost_matrix` must have one row per demand point and one column per
    /// facility, in the order of `facilities` and `demand_points`.
    ///
    /// # Errors
    ///
    /// Returns a `ModelError` describing the first structural violation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use siting_model::{entity::{Facility, DemandPoint}, model::Model};
    /// let model = Model::new(
    ///     vec![Facility::new("A", 20.0, 10.0), Facility::new("B", 20.0, 1000.0)],
    ///     vec![DemandPoint::new("D", 15.0)],
    ///     vec![vec![2.0, 2.0]],
    /// ).unwrap();
    /// assert_eq!(model.num_facilities(), 2);
    /// assert_eq!(model.total_demand(), 15.0);
    /// ```
    pub fn new(
        facilities: Vec<Facility>,
        demand_points: Vec<DemandPoint>,
        cost_matrix: Vec<Vec<f64>>,
    ) -> Result<Self, ModelError> {
        let mut builder = ModelBuilder::new();
        builder.extend_facilities(facilities);
        builder.extend_demand_points(demand_points);
        builder.set_cost_matrix(cost_matrix);
        builder.build()
    }

    /// Returns the number of candidate facilities.
    #[inline]
    pub fn num_facilities(&self) -> usize {
        self.capacities.len()
    }

    /// Returns the number of demand points.
    #[inline]
    pub fn num_demand_points(&self) -> usize {
        self.demands.len()
    }

    /// Returns the identifier of `facility_index`.
    ///
    /// # Panics
    ///
    /// Panics if `facility_index` is not in `0..num_facilities()`.
    #[inline]
    pub fn facility_id(&self, facility_index: FacilityIndex) -> &str {
        let index = facility_index.get();
        debug_assert!(
            index < self.num_facilities(),
            "called `Model::facility_id` with facility index out of bounds: the len is {} but the index is {}",
            self.num_facilities(),
            index
        );

        &self.facility_ids[index]
    }

    /// Returns the identifier of `demand_index`.
    ///
    /// # Panics
    ///
    /// Panics if `demand_index` is not in `0..num_demand_points()`.
    #[inline]
    pub fn demand_point_id(&self, demand_index: DemandIndex) -> &str {
        let index = demand_index.get();
        debug_assert!(
            index < self.num_demand_points(),
            "called `Model::demand_point_id` with demand index out of bounds: the len is {} but the index is {}",
            self.num_demand_points(),
            index
        );

        &self.demand_point_ids[index]
    }

    /// Returns the capacity of `facility_index`.
    ///
    /// # Panics
    ///
    /// Panics if `facility_index` is not in `0..num_facilities()`.
    #[inline]
    pub fn capacity(&self, facility_index: FacilityIndex) -> f64 {
        let index = facility_index.get();
        debug_assert!(
            index < self.num_facilities(),
            "called `Model::capacity` with facility index out of bounds: the len is {} but the index is {}",
            self.num_facilities(),
            index
        );

        self.capacities[index]
    }

    /// Returns the fixed activation cost of `facility_index`.
    ///
    /// # Panics
    ///
    /// Panics if `facility_index` is not in `0..num_facilities()`.
    #[inline]
    pub fn fixed_cost(&self, facility_index: FacilityIndex) -> f64 {
        let index = facility_index.get();
        debug_assert!(
            index < self.num_facilities(),
            "called `Model::fixed_cost` with facility index out of bounds: the len is {} but the index is {}",
            self.num_facilities(),
            index
        );

        self.fixed_costs[index]
    }

    /// Returns the demand of `demand_index`.
    ///
    /// # Panics
    ///
    /// Panics if `demand_index` is not in `0..num_demand_points()`.
    #[inline]
    pub fn demand(&self, demand_index: DemandIndex) -> f64 {
        let index = demand_index.get();
        debug_assert!(
            index < self.num_demand_points(),
            "called `Model::demand` with demand index out of bounds: the len is {} but the index is {}",
            self.num_demand_points(),
            index
        );

        self.demands[index]
    }

    /// Returns the cost of shipping one unit from `facility_index` to `demand_index`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[inline]
    pub fn unit_cost(&self, facility_index: FacilityIndex, demand_index: DemandIndex) -> f64 {
        debug_assert!(
            facility_index.get() < self.num_facilities(),
            "called `Model::unit_cost` with facility index out of bounds: the len is {} but the index is {}",
            self.num_facilities(),
            facility_index.get()
        );
        debug_assert!(
            demand_index.get() < self.num_demand_points(),
            "called `Model::unit_cost` with demand index out of bounds: the len is {} but the index is {}",
            self.num_demand_points(),
            demand_index.get()
        );

        self.unit_costs[flatten_index(self.num_facilities(), facility_index, demand_index)]
    }

    #[inline]
    pub fn facility_ids(&self) -> &[String] {
        &self.facility_ids
    }

    #[inline]
    pub fn demand_point_ids(&self) -> &[String] {
        &self.demand_point_ids
    }

    #[inline]
    pub fn capacities(&self) -> &[f64] {
        &self.capacities
    }

    #[inline]
    pub fn fixed_costs(&self) -> &[f64] {
        &self.fixed_costs
    }

    #[inline]
    pub fn demands(&self) -> &[f64] {
        &self.demands
    }

    /// Returns the unit-cost row of `demand_index`, one entry per facility.
    #[inline]
    pub fn unit_cost_row(&self, demand_index: DemandIndex) -> &[f64] {
        let n = self.num_facilities();
        let start = demand_index.get() * n;
        &self.unit_costs[start..start + n]
    }

    /// Returns the sum of all facility capacities.
    #[inline]
    pub fn total_capacity(&self) -> f64 {
        self.total_capacity
    }

    /// Returns the sum of all demands.
    #[inline]
    pub fn total_demand(&self) -> f64 {
        self.total_demand
    }

    /// Looks up a facility by identifier.
    pub fn facility_index_of(&self, id: &str) -> Option<FacilityIndex> {
        self.facility_ids
            .iter()
            .position(|candidate| candidate == id)
            .map(FacilityIndex::new)
    }

    /// Looks up a demand point by identifier.
    pub fn demand_index_of(&self, id: &str) -> Option<DemandIndex> {
        self.demand_point_ids
            .iter()
            .position(|candidate| candidate == id)
            .map(DemandIndex::new)
    }

    /// Iterates over all facility indices in ascending order.
    #[inline]
    pub fn facility_indices(&self) -> impl DoubleEndedIterator<Item = FacilityIndex> + ExactSizeIterator {
        FacilityIndex::range(self.num_facilities())
    }

    /// Iterates over all demand point indices in ascending order.
    #[inline]
    pub fn demand_indices(&self) -> impl DoubleEndedIterator<Item = DemandIndex> + ExactSizeIterator {
        DemandIndex::range(self.num_demand_points())
    }

    /// Recomputes the total cost of an activation vector and a flow assignment.
    ///
    /// Fixed costs are charged for every set bit of `activation`; routes
    /// contribute `unit_cost · amount`. Feasibility is not checked here, see
    /// [`Model::check_solution`].
    ///
    /// # Panics
    ///
    /// In debug builds, if a route in `flows` is out of bounds.
    pub fn evaluate_objective(&self, activation: &FixedBitSet, flows: &FlowAssignment) -> f64 {
        let fixed: f64 = activation
            .ones()
            .filter(|&f| f < self.num_facilities())
            .map(|f| self.fixed_costs[f])
            .sum();

        let variable: f64 = flows
            .iter()
            .map(|e| e.amount * self.unit_cost(e.route.facility, e.route.demand_point))
            .sum();

        fixed + variable
    }

    /// Lists every constraint that `activation` and `flows` break.
    ///
    /// An empty vector means the pair is a feasible integral solution. Row
    /// slacks are measured against `tolerance.feasibility`, scaled by the
    /// magnitude of the right-hand side when it exceeds one.
    pub fn check_solution(
        &self,
        activation: &FixedBitSet,
        flows: &FlowAssignment,
        tolerance: &Tolerance,
    ) -> Vec<Violation> {
        let mut violations = Vec::new();
        let nf = self.num_facilities();
        let nd = self.num_demand_points();

        if activation.len() != nf {
            violations.push(Violation::ActivationLengthMismatch {
                len: activation.len(),
                expected: nf,
            });
            return violations;
        }

        let mut outflow = vec![0.0; nf];
        let mut inflow = vec![0.0; nd];
        for e in flows {
            let (f, d) = (e.route.facility.get(), e.route.demand_point.get());
            if f >= nf || d >= nd {
                violations.push(Violation::UnknownRoute { route: e.route });
                continue;
            }
            if e.amount < -tolerance.feasibility {
                violations.push(Violation::NegativeFlow {
                    route: e.route,
                    amount: e.amount,
                });
            }
            outflow[f] += e.amount;
            inflow[d] += e.amount;
        }

        for (f, &out) in outflow.iter().enumerate() {
            let facility = FacilityIndex::new(f);
            if !activation.contains(f) {
                if out > tolerance.feasibility {
                    violations.push(Violation::FlowFromClosedFacility {
                        facility,
                        outflow: out,
                    });
                }
                continue;
            }
            let capacity = self.capacities[f];
            if out > capacity + tolerance.feasibility * capacity.max(1.0) {
                violations.push(Violation::CapacityExceeded {
                    facility,
                    outflow: out,
                    capacity,
                });
            }
        }

        for (d, &received) in inflow.iter().enumerate() {
            let demand = self.demands[d];
            if (received - demand).abs() > tolerance.feasibility * demand.max(1.0) {
                violations.push(Violation::DemandNotMet {
                    demand_point: DemandIndex::new(d),
                    inflow: received,
                    demand,
                });
            }
        }

        violations
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("facility_ids", &self.facility_ids)
            .field("capacities", &self.capacities)
            .field("fixed_costs", &self.fixed_costs)
            .field("demand_point_ids", &self.demand_point_ids)
            .field("demands", &self.demands)
            .field("unit_costs", &self.unit_costs)
            .finish()
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Model(num_facilities: {}, num_demand_points: {}, total_capacity: {}, total_demand: {})",
            self.num_facilities(),
            self.num_demand_points(),
            self.total_capacity,
            self.total_demand
        )
    }
}

/// Collects facilities, demand points and unit costs, then validates them
/// into a `Model`.
///
/// Costs may be given as a whole matrix (`set_cost_matrix`), per route
/// (`set_unit_cost`), or both; per-route values override the matrix.
///
/// # Examples
///
/// ```rust
/// # use siting_model::model::ModelBuilder;
/// let mut builder = ModelBuilder::new();
/// let a = builder.add_facility("A", 20.0, 10.0);
/// let d = builder.add_demand_point("D", 15.0);
/// builder.set_unit_cost(a, d, 2.0);
/// let model = builder.build().unwrap();
/// assert_eq!(model.unit_cost(a, d), 2.0);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ModelBuilder {
    facilities: Vec<Facility>,
    demand_points: Vec<DemandPoint>,
    cost_matrix: Option<Vec<Vec<f64>>>,
    unit_costs: FxHashMap<(FacilityIndex, DemandIndex), f64>,
}

impl ModelBuilder {
    /// Creates an empty builder.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn num_facilities(&self) -> usize {
        self.facilities.len()
    }

    #[inline]
    pub fn num_demand_points(&self) -> usize {
        self.demand_points.len()
    }

    /// Appends a facility and returns its index.
    pub fn add_facility<S>(&mut self, id: S, capacity: f64, fixed_cost: f64) -> FacilityIndex
    where
        S: Into<String>,
    {
        let index = FacilityIndex::new(self.facilities.len());
        self.facilities.push(Facility::new(id, capacity, fixed_cost));
        index
    }

    /// Appends a demand point and returns its index.
    pub fn add_demand_point<S>(&mut self, id: S, demand: f64) -> DemandIndex
    where
        S: Into<String>,
    {
        let index = DemandIndex::new(self.demand_points.len());
        self.demand_points.push(DemandPoint::new(id, demand));
        index
    }

    /// Appends several facilities in order.
    pub fn extend_facilities<I>(&mut self, facilities: I) -> &mut Self
    where
        I: IntoIterator<Item = Facility>,
    {
        self.facilities.extend(facilities);
        self
    }

    /// Appends several demand points in order.
    pub fn extend_demand_points<I>(&mut self, demand_points: I) -> &mut Self
    where
        I: IntoIterator<Item = DemandPoint>,
    {
        self.demand_points.extend(demand_points);
        self
    }

    /// Sets the full cost matrix: one row per demand point, one column per facility.
    ///
    /// Dimensions are checked by `build`.
    pub fn set_cost_matrix(&mut self, rows: Vec<Vec<f64>>) -> &mut Self {
        self.cost_matrix = Some(rows);
        self
    }

    /// Sets the unit cost of a single route.
    pub fn set_unit_cost(
        &mut self,
        facility_index: FacilityIndex,
        demand_index: DemandIndex,
        cost: f64,
    ) -> &mut Self {
        self.unit_costs.insert((facility_index, demand_index), cost);
        self
    }

    /// Validates the collected data and produces a `Model`.
    ///
    /// # Errors
    ///
    /// Checks, in order: duplicate ids, facility values, demand values,
    /// cost matrix dimensions, finiteness of every unit cost, completeness of
    /// the cost data. The first failure is returned.
    pub fn build(self) -> Result<Model, ModelError> {
        let nf = self.facilities.len();
        let nd = self.demand_points.len();

        let mut seen: FxHashSet<&str> = FxHashSet::default();
        for facility in &self.facilities {
            if !seen.insert(facility.id()) {
                return Err(ModelError::DuplicateFacilityId(facility.id().to_string()));
            }
        }
        seen.clear();
        for point in &self.demand_points {
            if !seen.insert(point.id()) {
                return Err(ModelError::DuplicateDemandPointId(point.id().to_string()));
            }
        }

        for facility in &self.facilities {
            validate_facility(facility)?;
        }
        for point in &self.demand_points {
            validate_demand_point(point)?;
        }

        let mut dense: Vec<Option<f64>> = vec![None; nf * nd];
        if let Some(rows) = &self.cost_matrix {
            if rows.len() != nd {
                return Err(ModelError::DimensionMismatch {
                    rows: rows.len(),
                    expected: nd,
                });
            }
            for (d, row) in rows.iter().enumerate() {
                if row.len() != nf {
                    return Err(ModelError::RowLengthMismatch {
                        row: d,
                        len: row.len(),
                        expected: nf,
                    });
                }
                for (f, &cost) in row.iter().enumerate() {
                    dense[d * nf + f] = Some(cost);
                }
            }
        }

        for (&(fi, di), &cost) in &self.unit_costs {
            if fi.get() >= nf || di.get() >= nd {
                return Err(ModelError::DimensionMismatch {
                    rows: di.get() + 1,
                    expected: nd,
                });
            }
            dense[flatten_index(nf, fi, di)] = Some(cost);
        }

        let mut unit_costs = Vec::with_capacity(nf * nd);
        for d in 0..nd {
            for f in 0..nf {
                let facility = &self.facilities[f];
                let point = &self.demand_points[d];
                match dense[d * nf + f] {
                    Some(cost) if cost.is_finite() => unit_costs.push(cost),
                    Some(_) => {
                        return Err(ModelError::NonFiniteValue {
                            id: format!("{}->{}", facility.id(), point.id()),
                            field: "unit cost",
                        });
                    }
                    None => {
                        return Err(ModelError::MissingUnitCost {
                            facility: facility.id().to_string(),
                            demand_point: point.id().to_string(),
                        });
                    }
                }
            }
        }

        let total_capacity = self.facilities.iter().map(Facility::capacity).sum();
        let total_demand = self.demand_points.iter().map(DemandPoint::demand).sum();

        let (facility_ids, (capacities, fixed_costs)): (Vec<String>, (Vec<f64>, Vec<f64>)) = self
            .facilities
            .into_iter()
            .map(|f| (f.id().to_string(), (f.capacity(), f.fixed_cost())))
            .unzip();
        let (demand_point_ids, demands): (Vec<String>, Vec<f64>) = self
            .demand_points
            .into_iter()
            .map(|p| (p.id().to_string(), p.demand()))
            .unzip();

        Ok(Model {
            facility_ids,
            capacities,
            fixed_costs,
            demand_point_ids,
            demands,
            unit_costs,
            total_capacity,
            total_demand,
        })
    }
}

impl std::fmt::Display for ModelBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ModelBuilder(num_facilities: {}, num_demand_points: {})",
            self.facilities.len(),
            self.demand_points.len()
        )
    }
}

fn validate_facility(facility: &Facility) -> Result<(), ModelError> {
    if !facility.capacity().is_finite() {
        return Err(ModelError::NonFiniteValue {
            id: facility.id().to_string(),
            field: "capacity",
        });
    }
    if !facility.fixed_cost().is_finite() {
        return Err(ModelError::NonFiniteValue {
            id: facility.id().to_string(),
            field: "fixed cost",
        });
    }
    if facility.capacity() < 0.0 {
        return Err(ModelError::NegativeCapacity {
            id: facility.id().to_string(),
            capacity: facility.capacity(),
        });
    }
    if facility.fixed_cost() < 0.0 {
        return Err(ModelError::NegativeFixedCost {
            id: facility.id().to_string(),
            fixed_cost: facility.fixed_cost(),
        });
    }
    Ok(())
}

fn validate_demand_point(point: &DemandPoint) -> Result<(), ModelError> {
    if !point.demand().is_finite() {
        return Err(ModelError::NonFiniteValue {
            id: point.id().to_string(),
            field: "demand",
        });
    }
    if point.demand() <= 0.0 {
        return Err(ModelError::NonPositiveDemand {
            id: point.id().to_string(),
            demand: point.demand(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fi(i: usize) -> FacilityIndex {
        FacilityIndex::new(i)
    }

    fn di(i: usize) -> DemandIndex {
        DemandIndex::new(i)
    }

    fn two_plant_model() -> Model {
        Model::new(
            vec![Facility::new("A", 20.0, 10.0), Facility::new("B", 20.0, 1000.0)],
            vec![DemandPoint::new("D", 15.0)],
            vec![vec![2.0, 2.0]],
        )
        .expect("valid model")
    }

    fn bits(len: usize, ones: &[usize]) -> FixedBitSet {
        let mut set = FixedBitSet::with_capacity(len);
        for &i in ones {
            set.insert(i);
        }
        set
    }

    #[test]
    fn test_flatten_index_is_demand_major() {
        assert_eq!(flatten_index(3, fi(0), di(0)), 0);
        assert_eq!(flatten_index(3, fi(2), di(0)), 2);
        assert_eq!(flatten_index(3, fi(1), di(2)), 7);
    }

    #[test]
    fn test_new_exposes_tables() {
        let model = two_plant_model();
        assert_eq!(model.num_facilities(), 2);
        assert_eq!(model.num_demand_points(), 1);
        assert_eq!(model.facility_id(fi(1)), "B");
        assert_eq!(model.demand_point_id(di(0)), "D");
        assert_eq!(model.capacity(fi(0)), 20.0);
        assert_eq!(model.fixed_cost(fi(1)), 1000.0);
        assert_eq!(model.demand(di(0)), 15.0);
        assert_eq!(model.unit_cost(fi(1), di(0)), 2.0);
        assert_eq!(model.total_capacity(), 40.0);
        assert_eq!(model.total_demand(), 15.0);
        assert_eq!(model.facility_index_of("B"), Some(fi(1)));
        assert_eq!(model.demand_index_of("X"), None);
        assert_eq!(model.unit_cost_row(di(0)), &[2.0, 2.0]);
    }

    #[test]
    fn test_unit_cost_orientation() {
        let model = Model::new(
            vec![Facility::new("A", 1.0, 0.0), Facility::new("B", 1.0, 0.0)],
            vec![DemandPoint::new("X", 1.0), DemandPoint::new("Y", 1.0)],
            vec![vec![1.0, 2.0], vec![3.0, 4.0]],
        )
        .expect("valid model");
        assert_eq!(model.unit_cost(fi(0), di(0)), 1.0);
        assert_eq!(model.unit_cost(fi(1), di(0)), 2.0);
        assert_eq!(model.unit_cost(fi(0), di(1)), 3.0);
        assert_eq!(model.unit_cost(fi(1), di(1)), 4.0);
    }

    #[test]
    fn test_rejects_negative_capacity() {
        let err = Model::new(
            vec![Facility::new("A", -1.0, 0.0)],
            vec![DemandPoint::new("D", 1.0)],
            vec![vec![1.0]],
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::NegativeCapacity { .. }));
    }

    #[test]
    fn test_rejects_negative_fixed_cost() {
        let err = Model::new(
            vec![Facility::new("A", 1.0, -5.0)],
            vec![DemandPoint::new("D", 1.0)],
            vec![vec![1.0]],
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::NegativeFixedCost { .. }));
    }

    #[test]
    fn test_rejects_non_positive_demand() {
        for demand in [0.0, -3.0] {
            let err = Model::new(
                vec![Facility::new("A", 1.0, 0.0)],
                vec![DemandPoint::new("D", demand)],
                vec![vec![1.0]],
            )
            .unwrap_err();
            assert!(matches!(err, ModelError::NonPositiveDemand { .. }));
        }
    }

    #[test]
    fn test_rejects_wrong_matrix_dimensions() {
        let err = Model::new(
            vec![Facility::new("A", 1.0, 0.0)],
            vec![DemandPoint::new("D", 1.0)],
            vec![vec![1.0], vec![2.0]],
        )
        .unwrap_err();
        assert_eq!(
            err,
            ModelError::DimensionMismatch {
                rows: 2,
                expected: 1
            }
        );

        let err = Model::new(
            vec![Facility::new("A", 1.0, 0.0), Facility::new("B", 1.0, 0.0)],
            vec![DemandPoint::new("D", 1.0)],
            vec![vec![1.0]],
        )
        .unwrap_err();
        assert_eq!(
            err,
            ModelError::RowLengthMismatch {
                row: 0,
                len: 1,
                expected: 2
            }
        );
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let err = Model::new(
            vec![Facility::new("A", 1.0, 0.0), Facility::new("A", 1.0, 0.0)],
            vec![DemandPoint::new("D", 1.0)],
            vec![vec![1.0, 1.0]],
        )
        .unwrap_err();
        assert_eq!(err, ModelError::DuplicateFacilityId("A".to_string()));

        let err = Model::new(
            vec![Facility::new("A", 1.0, 0.0)],
            vec![DemandPoint::new("D", 1.0), DemandPoint::new("D", 2.0)],
            vec![vec![1.0], vec![1.0]],
        )
        .unwrap_err();
        assert_eq!(err, ModelError::DuplicateDemandPointId("D".to_string()));
    }

    #[test]
    fn test_rejects_non_finite_values() {
        let err = Model::new(
            vec![Facility::new("A", f64::NAN, 0.0)],
            vec![DemandPoint::new("D", 1.0)],
            vec![vec![1.0]],
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::NonFiniteValue { field: "capacity", .. }));

        let err = Model::new(
            vec![Facility::new("A", 1.0, 0.0)],
            vec![DemandPoint::new("D", 1.0)],
            vec![vec![f64::INFINITY]],
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::NonFiniteValue { field: "unit cost", .. }));
    }

    #[test]
    fn test_builder_requires_every_unit_cost() {
        let mut builder = ModelBuilder::new();
        let a = builder.add_facility("A", 5.0, 1.0);
        builder.add_facility("B", 5.0, 1.0);
        let d = builder.add_demand_point("D", 3.0);
        builder.set_unit_cost(a, d, 1.0);
        let err = builder.build().unwrap_err();
        assert_eq!(
            err,
            ModelError::MissingUnitCost {
                facility: "B".to_string(),
                demand_point: "D".to_string()
            }
        );
    }

    #[test]
    fn test_builder_route_costs_override_matrix() {
        let mut builder = ModelBuilder::new();
        let a = builder.add_facility("A", 5.0, 1.0);
        let d = builder.add_demand_point("D", 3.0);
        builder.set_cost_matrix(vec![vec![9.0]]).set_unit_cost(a, d, 4.0);
        let model = builder.build().expect("valid model");
        assert_eq!(model.unit_cost(a, d), 4.0);
    }

    #[test]
    fn test_zero_capacity_is_accepted() {
        let model = Model::new(
            vec![Facility::new("A", 0.0, 0.0)],
            vec![DemandPoint::new("D", 1.0)],
            vec![vec![1.0]],
        );
        assert!(model.is_ok());
    }

    #[test]
    fn test_evaluate_objective() {
        let model = two_plant_model();
        let flows = FlowAssignment::from_dense(2, 1, &[15.0, 0.0], 0.0);
        assert_eq!(model.evaluate_objective(&bits(2, &[0]), &flows), 40.0);
        assert_eq!(model.evaluate_objective(&bits(2, &[0, 1]), &flows), 1040.0);
        assert_eq!(
            model.evaluate_objective(&bits(2, &[]), &FlowAssignment::new()),
            0.0
        );
    }

    #[test]
    fn test_check_solution_accepts_feasible() {
        let model = two_plant_model();
        let flows = FlowAssignment::from_dense(2, 1, &[15.0, 0.0], 0.0);
        let violations = model.check_solution(&bits(2, &[0]), &flows, &Tolerance::default());
        assert!(violations.is_empty(), "{:?}", violations);
    }

    #[test]
    fn test_check_solution_reports_violations() {
        let model = two_plant_model();
        let tol = Tolerance::default();

        // B is closed but ships.
        let flows = FlowAssignment::from_dense(2, 1, &[10.0, 5.0], 0.0);
        let violations = model.check_solution(&bits(2, &[0]), &flows, &tol);
        assert_eq!(
            violations,
            vec![Violation::FlowFromClosedFacility {
                facility: fi(1),
                outflow: 5.0
            }]
        );

        // Demand short and capacity not touched.
        let flows = FlowAssignment::from_dense(2, 1, &[14.0, 0.0], 0.0);
        let violations = model.check_solution(&bits(2, &[0]), &flows, &tol);
        assert!(matches!(violations[..], [Violation::DemandNotMet { .. }]));

        // Capacity exceeded.
        let model = Model::new(
            vec![Facility::new("A", 10.0, 0.0)],
            vec![DemandPoint::new("D", 15.0)],
            vec![vec![1.0]],
        )
        .expect("valid model");
        let flows = FlowAssignment::from_dense(1, 1, &[15.0], 0.0);
        let violations = model.check_solution(&bits(1, &[0]), &flows, &tol);
        assert!(matches!(violations[..], [Violation::CapacityExceeded { .. }]));

        // Wrong activation length.
        let violations = model.check_solution(&bits(3, &[0]), &flows, &tol);
        assert!(matches!(
            violations[..],
            [Violation::ActivationLengthMismatch { len: 3, expected: 1 }]
        ));
    }

    #[test]
    fn test_check_solution_reports_unknown_and_negative_routes() {
        let model = two_plant_model();
        let flows = FlowAssignment::from_triples(
            vec![(fi(0), di(0), 16.0), (fi(0), di(3), 1.0), (fi(1), di(0), -1.0)],
            0.0,
        );
        let violations = model.check_solution(&bits(2, &[0, 1]), &flows, &Tolerance::default());
        assert!(violations.iter().any(|v| matches!(v, Violation::UnknownRoute { .. })));
        assert!(violations.iter().any(|v| matches!(v, Violation::NegativeFlow { .. })));
    }
}
