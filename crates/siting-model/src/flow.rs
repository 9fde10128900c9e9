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

//! # Flow Assignments
//!
//! A `FlowAssignment` records the amount shipped along each route
//! (facility → demand point). It is stored sparsely: only strictly positive
//! amounts are kept, sorted by `(facility, demand point)`, so iteration order
//! is deterministic and lookups are a binary search.
//!
//! Dense inputs use a facility-major layout, `amounts[f * num_demand_points + d]`.

use crate::index::{DemandIndex, FacilityIndex};

/// A directed edge from a facility to a demand point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Route {
    pub facility: FacilityIndex,
    pub demand_point: DemandIndex,
}

impl Route {
    #[inline]
    pub const fn new(facility: FacilityIndex, demand_point: DemandIndex) -> Self {
        Self {
            facility,
            demand_point,
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.facility, self.demand_point)
    }
}

/// The amount shipped along one route.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteFlow {
    pub route: Route,
    pub amount: f64,
}

/// Sparse route flows, sorted by route, zero amounts omitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowAssignment {
    entries: Vec<RouteFlow>,
}

impl FlowAssignment {
    /// Creates an empty assignment.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an assignment from a dense facility-major array.
    ///
    /// Amounts with magnitude at most `zero_eps` are dropped.
    ///
    /// # Panics
    ///
    /// In debug builds, if `amounts.len()` differs from
    /// `num_facilities * num_demand_points`.
    pub fn from_dense(
        num_facilities: usize,
        num_demand_points: usize,
        amounts: &[f64],
        zero_eps: f64,
    ) -> Self {
        debug_assert_eq!(
            amounts.len(),
            num_facilities * num_demand_points,
            "called `FlowAssignment::from_dense` with a buffer of the wrong size: expected {} but got {}",
            num_facilities * num_demand_points,
            amounts.len()
        );

        let mut entries = Vec::new();
        for f in 0..num_facilities {
            for d in 0..num_demand_points {
                let amount = amounts[f * num_demand_points + d];
                if amount.abs() > zero_eps {
                    entries.push(RouteFlow {
                        route: Route::new(FacilityIndex::new(f), DemandIndex::new(d)),
                        amount,
                    });
                }
            }
        }
        Self { entries }
    }

    /// Builds an assignment from arbitrary `(facility, demand point, amount)`
    /// triples. Repeated routes are summed; resulting amounts with magnitude
    /// at most `zero_eps` are dropped.
    pub fn from_triples<I>(triples: I, zero_eps: f64) -> Self
    where
        I: IntoIterator<Item = (FacilityIndex, DemandIndex, f64)>,
    {
        let mut raw: Vec<RouteFlow> = triples
            .into_iter()
            .map(|(facility, demand_point, amount)| RouteFlow {
                route: Route::new(facility, demand_point),
                amount,
            })
            .collect();
        raw.sort_by(|a, b| a.route.cmp(&b.route));

        let mut entries: Vec<RouteFlow> = Vec::with_capacity(raw.len());
        for entry in raw {
            match entries.last_mut() {
                Some(last) if last.route == entry.route => last.amount += entry.amount,
                _ => entries.push(entry),
            }
        }
        entries.retain(|e| e.amount.abs() > zero_eps);
        Self { entries }
    }

    /// Returns the amount shipped along `facility -> demand_point`, or `0.0`.
    #[inline]
    pub fn get(&self, facility: FacilityIndex, demand_point: DemandIndex) -> f64 {
        let route = Route::new(facility, demand_point);
        match self.entries.binary_search_by(|e| e.route.cmp(&route)) {
            Ok(pos) => self.entries[pos].amount,
            Err(_) => 0.0,
        }
    }

    /// Iterates over the non-zero route flows in route order.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, RouteFlow> {
        self.entries.iter()
    }

    /// Iterates over the non-zero flows leaving `facility`.
    pub fn outbound(&self, facility: FacilityIndex) -> impl Iterator<Item = &RouteFlow> {
        let start = self.entries.partition_point(|e| e.route.facility < facility);
        self.entries[start..]
            .iter()
            .take_while(move |e| e.route.facility == facility)
    }

    /// Returns the total flow leaving `facility`.
    #[inline]
    pub fn outflow(&self, facility: FacilityIndex) -> f64 {
        self.outbound(facility).map(|e| e.amount).sum()
    }

    /// Returns the total flow arriving at `demand_point`.
    #[inline]
    pub fn inflow(&self, demand_point: DemandIndex) -> f64 {
        self.entries
            .iter()
            .filter(|e| e.route.demand_point == demand_point)
            .map(|e| e.amount)
            .sum()
    }

    /// Returns the outflow of every facility in one pass.
    pub fn outflows(&self, num_facilities: usize) -> Vec<f64> {
        let mut out = vec![0.0; num_facilities];
        for e in &self.entries {
            out[e.route.facility.get()] += e.amount;
        }
        out
    }

    /// Returns the inflow of every demand point in one pass.
    pub fn inflows(&self, num_demand_points: usize) -> Vec<f64> {
        let mut inflow = vec![0.0; num_demand_points];
        for e in &self.entries {
            inflow[e.route.demand_point.get()] += e.amount;
        }
        inflow
    }

    /// Returns the number of stored (non-zero) routes.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no flow is recorded.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the sum of all stored amounts.
    #[inline]
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|e| e.amount).sum()
    }
}

impl<'a> IntoIterator for &'a FlowAssignment {
    type Item = &'a RouteFlow;
    type IntoIter = std::slice::Iter<'a, RouteFlow>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
