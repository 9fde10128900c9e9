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

//! Errors raised while constructing a `Model`.
//!
//! Every variant describes malformed input. Construction never proceeds past
//! the first violation found.

use thiserror::Error;

/// Structural problems with facility, demand point, or cost data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// The cost matrix does not have one row per demand point.
    #[error("cost matrix has {rows} rows but the model has {expected} demand points")]
    DimensionMismatch { rows: usize, expected: usize },

    /// A cost matrix row does not have one entry per facility.
    #[error("cost matrix row {row} has {len} entries but the model has {expected} facilities")]
    RowLengthMismatch {
        row: usize,
        len: usize,
        expected: usize,
    },

    /// No unit cost was provided for a (facility, demand point) pair.
    #[error("no unit cost given for route '{facility}' -> '{demand_point}'")]
    MissingUnitCost {
        facility: String,
        demand_point: String,
    },

    /// A facility declares a capacity below zero.
    #[error("facility '{id}' has negative capacity {capacity}")]
    NegativeCapacity { id: String, capacity: f64 },

    /// A facility declares a fixed cost below zero.
    #[error("facility '{id}' has negative fixed cost {fixed_cost}")]
    NegativeFixedCost { id: String, fixed_cost: f64 },

    /// A demand point requires zero or negative flow.
    #[error("demand point '{id}' has non-positive demand {demand}")]
    NonPositiveDemand { id: String, demand: f64 },

    /// A numeric field is NaN or infinite.
    #[error("{field} of '{id}' is not a finite number")]
    NonFiniteValue { id: String, field: &'static str },

    /// Two facilities share the same identifier.
    #[error("duplicate facility id '{0}'")]
    DuplicateFacilityId(String),

    /// Two demand points share the same identifier.
    #[error("duplicate demand point id '{0}'")]
    DuplicateDemandPointId(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offender() {
        let err = ModelError::NegativeCapacity {
            id: "Plant-3".to_string(),
            capacity: -1.5,
        };
        assert_eq!(err.to_string(), "facility 'Plant-3' has negative capacity -1.5");

        let err = ModelError::RowLengthMismatch {
            row: 2,
            len: 4,
            expected: 5,
        };
        assert!(err.to_string().contains("row 2 has 4 entries"));

        let err = ModelError::DuplicateDemandPointId("W1".to_string());
        assert_eq!(err.to_string(), "duplicate demand point id 'W1'");
    }
}
