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

//! Constraint violations found by `Model::check_solution`.

use crate::{
    flow::Route,
    index::{DemandIndex, FacilityIndex},
};

/// A single broken constraint of a candidate solution.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    /// The activation vector does not have one entry per facility.
    ActivationLengthMismatch { len: usize, expected: usize },
    /// A route refers to a facility or demand point the model does not know.
    UnknownRoute { route: Route },
    /// A route carries a negative amount.
    NegativeFlow { route: Route, amount: f64 },
    /// A closed facility ships a non-zero amount.
    FlowFromClosedFacility { facility: FacilityIndex, outflow: f64 },
    /// An open facility ships more than its capacity.
    CapacityExceeded {
        facility: FacilityIndex,
        outflow: f64,
        capacity: f64,
    },
    /// A demand point receives more or less than its demand.
    DemandNotMet {
        demand_point: DemandIndex,
        inflow: f64,
        demand: f64,
    },
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::ActivationLengthMismatch { len, expected } => write!(
                f,
                "activation vector has {} entries but the model has {} facilities",
                len, expected
            ),
            Violation::UnknownRoute { route } => write!(f, "unknown route {}", route),
            Violation::NegativeFlow { route, amount } => {
                write!(f, "negative flow {} on route {}", amount, route)
            }
            Violation::FlowFromClosedFacility { facility, outflow } => {
                write!(f, "closed {} ships {} units", facility, outflow)
            }
            Violation::CapacityExceeded {
                facility,
                outflow,
                capacity,
            } => write!(
                f,
                "{} ships {} units but its capacity is {}",
                facility, outflow, capacity
            ),
            Violation::DemandNotMet {
                demand_point,
                inflow,
                demand,
            } => write!(
                f,
                "{} receives {} units but requires {}",
                demand_point, inflow, demand
            ),
        }
    }
}
