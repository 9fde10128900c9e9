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

//! # Strongly Typed Indices
//!
//! The solver juggles two dense index spaces at once: facilities (columns of
//! the cost matrix) and demand points (rows). Mixing them up compiles fine
//! with bare `usize` and silently produces wrong flows. `TypedIndex<T>`
//! carries a tag type so the compiler rejects such swaps, while staying a
//! transparent `usize` at runtime.
//!
//! ```rust
//! use siting_core::utils::index::{TypedIndex, TypedIndexTag};
//!
//! #[derive(Clone)]
//! struct PlantTag;
//! impl TypedIndexTag for PlantTag { const NAME: &'static str = "PlantIndex"; }
//!
//! type PlantIndex = TypedIndex<PlantTag>;
//! let p = PlantIndex::new(3);
//! assert_eq!(p.get(), 3);
//! assert_eq!(format!("{}", p), "PlantIndex(3)");
//! ```

/// Names a family of typed indices for `Debug` and `Display` output.
pub trait TypedIndexTag: Clone {
    const NAME: &'static str;
}

/// A `usize` index branded with the tag type `T`.
///
/// Ordering and hashing follow the wrapped value, so typed indices can be
/// used directly as keys and sorted deterministically.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypedIndex<T> {
    index: usize,
    _marker: std::marker::PhantomData<T>,
}

impl<T> TypedIndex<T> {
    /// Wraps a raw index.
    #[inline(always)]
    pub const fn new(index: usize) -> Self {
        Self {
            index,
            _marker: std::marker::PhantomData,
        }
    }

    /// Returns the raw index.
    #[inline(always)]
    pub const fn get(&self) -> usize {
        self.index
    }

    /// Returns the index that follows this one in the same space.
    #[inline(always)]
    pub const fn next(&self) -> Self {
        Self::new(self.index + 1)
    }

    /// Iterates over all indices `0..len` of this space in ascending order.
    #[inline]
    pub fn range(len: usize) -> impl DoubleEndedIterator<Item = Self> + ExactSizeIterator {
        (0..len).map(Self::new)
    }
}

impl<T> std::fmt::Debug for TypedIndex<T>
where
    T: TypedIndexTag,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", T::NAME, self.index)
    }
}

impl<T> std::fmt::Display for TypedIndex<T>
where
    T: TypedIndexTag,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", T::NAME, self.index)
    }
}

impl<T> From<usize> for TypedIndex<T> {
    #[inline(always)]
    fn from(index: usize) -> Self {
        Self::new(index)
    }
}

impl<T> From<TypedIndex<T>> for usize {
    #[inline(always)]
    fn from(typed_index: TypedIndex<T>) -> Self {
        typed_index.index
    }
}
