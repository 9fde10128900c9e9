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

//! # Relaxation Solver
//!
//! `RelaxationSolver::solve` computes the LP relaxation of the
//! facility-location MIP under a set of `ActivationBounds`. See the crate
//! documentation for the reduction to a transportation problem.
//!
//! The returned `Relaxation` carries:
//!
//! - the objective, a valid lower bound for every integral solution that
//!   respects the same bounds;
//! - one activation value per facility, in `[lower, upper]`;
//! - the flows, sparse with zero routes omitted;
//! - the number of simplex pivots spent.
//!
//! A relaxation is integral only if rounding it loses nothing. Every
//! activation value must be within the integrality tolerance of `0` or `1`,
//! no facility that rounds to `0` may ship anything, and paying the rounded
//! fixed cost of a facility must stay within the optimality tolerance of the
//! objective. A large facility carrying a trickle of flow has an activation
//! value close to zero but is still unresolved.

use crate::{
    bounds::{Activation, ActivationBounds},
    error::RelaxationError,
    transport::{self, Pricing, TransportProblem},
};
use fixedbitset::FixedBitSet;
use log::trace;
use ndarray::Array2;
use siting_core::num::{
    Tolerance,
    tolerance::{fractionality, is_near_relative, snap_to_zero},
};
use siting_model::{
    flow::FlowAssignment,
    index::{DemandIndex, FacilityIndex},
    model::Model,
};

/// Pivot budget multiplier applied by [`RelaxationSolver::tightened`].
const RETRY_BUDGET_FACTOR: usize = 4;

/// Solves continuous relaxations of a `Model`.
///
/// The solver holds configuration only and is freely shareable between
/// threads; every call to `solve` is independent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelaxationSolver {
    tolerance: Tolerance,
    max_iterations: Option<usize>,
    pricing: Pricing,
}

impl Default for RelaxationSolver {
    fn default() -> Self {
        Self {
            tolerance: Tolerance::default(),
            max_iterations: None,
            pricing: Pricing::MostNegative,
        }
    }
}

impl RelaxationSolver {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tolerance bundle.
    #[inline]
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Caps the number of simplex pivots per solve.
    ///
    /// Without a cap the budget scales with the instance:
    /// `1000 + 10 · sources · sinks`.
    #[inline]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    /// Selects the entering-cell rule.
    #[inline]
    pub fn with_pricing(mut self, pricing: Pricing) -> Self {
        self.pricing = pricing;
        self
    }

    #[inline]
    pub fn tolerance(&self) -> &Tolerance {
        &self.tolerance
    }

    #[inline]
    pub fn pricing(&self) -> Pricing {
        self.pricing
    }

    /// The configuration used to retry a solve that reported
    /// `NumericInstability`: tightened tolerances, a larger pivot budget and
    /// first-negative pricing.
    pub fn tightened(&self) -> Self {
        Self {
            tolerance: self.tolerance.tightened(),
            max_iterations: self
                .max_iterations
                .map(|n| n.saturating_mul(RETRY_BUDGET_FACTOR)),
            pricing: Pricing::FirstNegative,
        }
    }

    #[inline]
    fn budget(&self, sources: usize, sinks: usize) -> usize {
        self.max_iterations.unwrap_or_else(|| {
            let base = 1000 + 10 * sources * sinks;
            if self.pricing == Pricing::FirstNegative {
                base * RETRY_BUDGET_FACTOR
            } else {
                base
            }
        })
    }

    /// Solves the relaxation of `model` under `bounds`.
    ///
    /// # Errors
    ///
    /// * `RelaxationError::Infeasible` if the capacity of facilities with
    ///   upper bound one is below total demand.
    /// * `RelaxationError::NumericInstability` if the simplex does not
    ///   certify an optimum within its budget.
    ///
    /// # Panics
    ///
    /// In debug builds, if `bounds` does not cover every facility.
    pub fn solve(
        &self,
        model: &Model,
        bounds: &ActivationBounds,
    ) -> Result<Relaxation, RelaxationError> {
        let nf = model.num_facilities();
        let nd = model.num_demand_points();
        debug_assert_eq!(
            bounds.len(),
            nf,
            "called `RelaxationSolver::solve` with bounds for {} facilities but the model has {}",
            bounds.len(),
            nf
        );

        let mut open_values = vec![0.0; nf];
        let mut sources: Vec<usize> = Vec::with_capacity(nf);
        let mut surcharges: Vec<f64> = Vec::with_capacity(nf);
        let mut available = 0.0;

        for facility in model.facility_indices() {
            let f = facility.get();
            let state = bounds.get(facility);
            open_values[f] = state.lower();
            if state == Activation::Closed || model.capacity(facility) <= 0.0 {
                continue;
            }
            let capacity = model.capacity(facility);
            sources.push(f);
            surcharges.push(match state {
                Activation::Free => model.fixed_cost(facility) / capacity,
                _ => 0.0,
            });
            available += capacity;
        }

        let demand = model.total_demand();
        let eps = self.tolerance.feasibility;
        if available < demand - eps * demand.max(1.0) {
            trace!(
                "relaxation {} infeasible: capacity {} below demand {}",
                bounds, available, demand
            );
            return Err(RelaxationError::Infeasible {
                capacity: available,
                demand,
            });
        }

        if nd == 0 || sources.is_empty() {
            let objective = fixed_part(model, &open_values);
            return Ok(Relaxation {
                objective,
                rounding_costs: vec![0.0; nf],
                shipping: FixedBitSet::with_capacity(nf),
                open_values,
                flows: FlowAssignment::new(),
                iterations: 0,
            });
        }

        let excess = available - demand;
        let dummy = excess > eps * demand.max(1.0);
        let sinks = nd + usize::from(dummy);

        let costs = Array2::from_shape_fn((sources.len(), sinks), |(k, j)| {
            if j < nd {
                model.unit_cost(FacilityIndex::new(sources[k]), DemandIndex::new(j))
                    + surcharges[k]
            } else {
                0.0
            }
        });
        let supply: Vec<f64> = sources
            .iter()
            .map(|&f| model.capacity(FacilityIndex::new(f)))
            .collect();
        let mut sink_demand = model.demands().to_vec();
        if dummy {
            sink_demand.push(excess);
        }

        let problem = TransportProblem::new(costs, supply, sink_demand);
        let budget = self.budget(sources.len(), sinks);
        let solution = transport::solve(&problem, &self.tolerance, budget, self.pricing)?;
        let iterations = solution.iterations();
        let shipped = solution.into_flows();

        let mut triples = Vec::new();
        let mut shipping = FixedBitSet::with_capacity(nf);
        let mut rounding_costs = vec![0.0; nf];
        for (k, &f) in sources.iter().enumerate() {
            let facility = FacilityIndex::new(f);
            let mut load = 0.0;
            for d in 0..nd {
                let amount = snap_to_zero(shipped[[k, d]], eps);
                if amount > 0.0 {
                    triples.push((facility, DemandIndex::new(d), amount));
                    load += amount;
                }
            }
            if load > 0.0 {
                shipping.insert(f);
            }
            if bounds.get(facility) == Activation::Free {
                let value = (load / model.capacity(facility)).clamp(0.0, 1.0);
                let rounded = if value > 0.5 || load > 0.0 { 1.0 } else { 0.0 };
                open_values[f] = value;
                rounding_costs[f] = model.fixed_cost(facility) * (rounded - value).abs();
            }
        }
        let flows = FlowAssignment::from_triples(triples, 0.0);

        let variable: f64 = flows
            .iter()
            .map(|e| e.amount * model.unit_cost(e.route.facility, e.route.demand_point))
            .sum();
        let objective = fixed_part(model, &open_values) + variable;
        trace!(
            "relaxation {} solved: objective {}, {} pivots",
            bounds, objective, iterations
        );

        Ok(Relaxation {
            objective,
            open_values,
            rounding_costs,
            shipping,
            flows,
            iterations,
        })
    }
}

#[inline]
fn fixed_part(model: &Model, open_values: &[f64]) -> f64 {
    model
        .fixed_costs()
        .iter()
        .zip(open_values)
        .map(|(c, o)| c * o)
        .sum()
}

/// The optimal solution of one relaxation.
#[derive(Debug, Clone, PartialEq)]
pub struct Relaxation {
    objective: f64,
    open_values: Vec<f64>,
    /// `fixed_cost · |rounded - value|` per facility.
    rounding_costs: Vec<f64>,
    shipping: FixedBitSet,
    flows: FlowAssignment,
    iterations: usize,
}

impl Relaxation {
    /// The relaxation objective: a lower bound for the node.
    #[inline]
    pub fn objective(&self) -> f64 {
        self.objective
    }

    /// One fractional activation value per facility.
    #[inline]
    pub fn open_values(&self) -> &[f64] {
        &self.open_values
    }

    /// Returns the activation value of `facility_index`.
    #[inline]
    pub fn open_value(&self, facility_index: FacilityIndex) -> f64 {
        let index = facility_index.get();
        debug_assert!(
            index < self.open_values.len(),
            "called `Relaxation::open_value` with facility index out of bounds: the len is {} but the index is {}",
            self.open_values.len(),
            index
        );

        self.open_values[index]
    }

    #[inline]
    pub fn flows(&self) -> &FlowAssignment {
        &self.flows
    }

    /// Simplex pivots performed for this solve.
    #[inline]
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Returns `true` if `facility_index` ships a positive amount.
    #[inline]
    pub fn is_shipping(&self, facility_index: FacilityIndex) -> bool {
        self.shipping.contains(facility_index.get())
    }

    /// Returns `true` if rounding the activation of `facility_index` yields
    /// an integral choice that the objective already accounts for.
    pub fn is_settled(&self, facility_index: FacilityIndex, tolerance: &Tolerance) -> bool {
        let f = facility_index.get();
        let value = self.open_values[f];
        if !tolerance.is_binary(value) {
            return false;
        }
        if value <= 0.5 && self.shipping.contains(f) {
            return false;
        }
        is_near_relative(
            self.objective + self.rounding_costs[f],
            self.objective,
            tolerance.optimality,
        )
    }

    /// Returns `true` if every facility is settled.
    #[inline]
    pub fn is_integral(&self, tolerance: &Tolerance) -> bool {
        FacilityIndex::range(self.open_values.len()).all(|f| self.is_settled(f, tolerance))
    }

    /// Iterates over `(facility, value)` for every facility that is not
    /// settled, in index order.
    pub fn fractional_facilities<'a>(
        &'a self,
        tolerance: &'a Tolerance,
    ) -> impl Iterator<Item = (FacilityIndex, f64)> + 'a {
        FacilityIndex::range(self.open_values.len())
            .filter(move |&f| !self.is_settled(f, tolerance))
            .map(|f| (f, self.open_values[f.get()]))
    }

    /// Rounds the activation values to a bit set. A facility is open if its
    /// value exceeds `0.5` or if it ships anything.
    pub fn rounded_activation(&self) -> FixedBitSet {
        let mut open = self.shipping.clone();
        for (f, &v) in self.open_values.iter().enumerate() {
            if v > 0.5 {
                open.insert(f);
            }
        }
        open
    }

    /// Largest distance of any activation value from an integer.
    pub fn max_fractionality(&self) -> f64 {
        self.open_values
            .iter()
            .map(|&v| fractionality(v))
            .fold(0.0, f64::max)
    }

    #[inline]
    pub fn into_flows(self) -> FlowAssignment {
        self.flows
    }
}

impl std::fmt::Display for Relaxation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Relaxation(objective: {}, routes: {}, iterations: {}, open: [",
            self.objective,
            self.flows.len(),
            self.iterations
        )?;
        for (i, v) in self.open_values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:.3}", v)?;
        }
        write!(f, "])")
    }
}
