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

//! # Activation Bounds
//!
//! A branch-and-bound node restricts every activation variable to one of
//! three intervals: `[0, 1]` (free), `[1, 1]` (forced open) or `[0, 0]`
//! (forced closed). `ActivationBounds` stores the pair of bound vectors as
//! two bit sets, `lower` and `upper`, with `lower ⊆ upper` at all times.

use fixedbitset::FixedBitSet;
use siting_model::index::FacilityIndex;

/// The state of one activation variable at a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Activation {
    /// `[0, 1]`: relaxed.
    Free,
    /// `[1, 1]`.
    Open,
    /// `[0, 0]`.
    Closed,
}

impl Activation {
    #[inline]
    pub fn lower(self) -> f64 {
        match self {
            Activation::Open => 1.0,
            _ => 0.0,
        }
    }

    #[inline]
    pub fn upper(self) -> f64 {
        match self {
            Activation::Closed => 0.0,
            _ => 1.0,
        }
    }

    #[inline]
    pub fn is_fixed(self) -> bool {
        self != Activation::Free
    }
}

impl std::fmt::Display for Activation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Activation::Free => write!(f, "*"),
            Activation::Open => write!(f, "1"),
            Activation::Closed => write!(f, "0"),
        }
    }
}

/// Per-facility `(lower, upper)` activation bounds of a search node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActivationBounds {
    lower: FixedBitSet,
    upper: FixedBitSet,
}

impl ActivationBounds {
    /// Bounds of the root node: every facility free.
    pub fn root(num_facilities: usize) -> Self {
        let mut upper = FixedBitSet::with_capacity(num_facilities);
        upper.insert_range(..);
        Self {
            lower: FixedBitSet::with_capacity(num_facilities),
            upper,
        }
    }

    /// Bounds where every facility is fixed open.
    pub fn all_open(num_facilities: usize) -> Self {
        let mut bounds = Self::root(num_facilities);
        bounds.lower.insert_range(..);
        bounds
    }

    /// Returns the number of facilities covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.upper.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.upper.is_empty()
    }

    /// Returns the state of `facility_index`.
    ///
    /// # Panics
    ///
    /// In debug builds, if `facility_index` is out of bounds.
    #[inline]
    pub fn get(&self, facility_index: FacilityIndex) -> Activation {
        let index = facility_index.get();
        debug_assert!(
            index < self.len(),
            "called `ActivationBounds::get` with facility index out of bounds: the len is {} but the index is {}",
            self.len(),
            index
        );

        if self.lower.contains(index) {
            Activation::Open
        } else if self.upper.contains(index) {
            Activation::Free
        } else {
            Activation::Closed
        }
    }

    /// Returns the lower bound of `facility_index` as a real.
    #[inline]
    pub fn lower(&self, facility_index: FacilityIndex) -> f64 {
        self.get(facility_index).lower()
    }

    /// Returns the upper bound of `facility_index` as a real.
    #[inline]
    pub fn upper(&self, facility_index: FacilityIndex) -> f64 {
        self.get(facility_index).upper()
    }

    /// Returns `true` if `facility_index` is not fixed.
    #[inline]
    pub fn is_free(&self, facility_index: FacilityIndex) -> bool {
        self.get(facility_index) == Activation::Free
    }

    /// Fixes `facility_index` to zero, replacing any earlier fix.
    #[inline]
    pub fn close(&mut self, facility_index: FacilityIndex) {
        let index = facility_index.get();
        self.lower.set(index, false);
        self.upper.set(index, false);
    }

    /// Fixes `facility_index` to one, replacing any earlier fix.
    #[inline]
    pub fn open(&mut self, facility_index: FacilityIndex) {
        let index = facility_index.get();
        self.lower.insert(index);
        self.upper.insert(index);
    }

    /// Returns a copy with `facility_index` fixed to zero.
    #[inline]
    pub fn with_closed(&self, facility_index: FacilityIndex) -> Self {
        let mut child = self.clone();
        child.close(facility_index);
        child
    }

    /// Returns a copy with `facility_index` fixed to one.
    #[inline]
    pub fn with_open(&self, facility_index: FacilityIndex) -> Self {
        let mut child = self.clone();
        child.open(facility_index);
        child
    }

    /// Iterates over facilities that are not fixed, ascending.
    pub fn free_facilities(&self) -> impl Iterator<Item = FacilityIndex> + '_ {
        self.upper.difference(&self.lower).map(FacilityIndex::new)
    }

    /// Returns the number of fixed facilities, i.e. the depth of the node.
    #[inline]
    pub fn num_fixed(&self) -> usize {
        self.len() - self.upper.difference(&self.lower).count()
    }

    /// Iterates over the state of every facility in index order.
    pub fn iter(&self) -> impl Iterator<Item = Activation> + '_ {
        FacilityIndex::range(self.len()).map(|f| self.get(f))
    }
}

impl std::fmt::Display for ActivationBounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for state in self.iter() {
            write!(f, "{}", state)?;
        }
        write!(f, "]")
    }
}
