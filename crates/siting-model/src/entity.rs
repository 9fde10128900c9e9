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

//! Row types of the facility and demand point input tables.

/// A candidate supply location.
///
/// `capacity` is the maximum outbound flow when the facility is open,
/// `fixed_cost` is paid once if it is open at all.
#[derive(Debug, Clone, PartialEq)]
pub struct Facility {
    id: String,
    capacity: f64,
    fixed_cost: f64,
}

impl Facility {
    /// Creates a facility. Values are validated by `ModelBuilder::build`.
    #[inline]
    pub fn new<S>(id: S, capacity: f64, fixed_cost: f64) -> Self
    where
        S: Into<String>,
    {
        Self {
            id: id.into(),
            capacity,
            fixed_cost,
        }
    }

    /// Returns the facility identifier.
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the capacity in units of flow.
    #[inline]
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Returns the fixed activation cost.
    #[inline]
    pub fn fixed_cost(&self) -> f64 {
        self.fixed_cost
    }
}

impl std::fmt::Display for Facility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Facility(id: {}, capacity: {}, fixed_cost: {})",
            self.id, self.capacity, self.fixed_cost
        )
    }
}

/// A location with a fixed required inbound flow.
#[derive(Debug, Clone, PartialEq)]
pub struct DemandPoint {
    id: String,
    demand: f64,
}

impl DemandPoint {
    /// Creates a demand point. Values are validated by `ModelBuilder::build`.
    #[inline]
    pub fn new<S>(id: S, demand: f64) -> Self
    where
        S: Into<String>,
    {
        Self {
            id: id.into(),
            demand,
        }
    }

    /// Returns the demand point identifier.
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the required inbound flow.
    #[inline]
    pub fn demand(&self) -> f64 {
        self.demand
    }
}

impl std::fmt::Display for DemandPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DemandPoint(id: {}, demand: {})", self.id, self.demand)
    }
}
