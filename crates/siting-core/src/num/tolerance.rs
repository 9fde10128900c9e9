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

//! # Tolerances
//!
//! `Tolerance` groups the epsilons the solver needs:
//!
//! - `feasibility`: slack allowed on capacity and demand rows, and the
//!   threshold below which a flow counts as zero.
//! - `integrality`: how far an activation value may sit from `0` or `1` and
//!   still count as integral.
//! - `optimality`: relative gap under which a node bound is considered no
//!   better than the incumbent (prune-by-bound also removes ties).
//! - `pivot`: reduced-cost threshold of the simplex pricing step.
//!
//! `Tolerance::tightened` divides every epsilon by 100; the search engine
//! uses it when it retries a relaxation that failed to certify optimality.
//!
//! The free functions are generic over `num_traits::Float` so that they can
//! be used on `f32` data as well.

use num_traits::Float;

/// The factor applied by [`Tolerance::tightened`].
const TIGHTEN_FACTOR: f64 = 100.0;

/// A bundle of numerical tolerances shared by the model, the relaxation
/// solver, and the search engines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Absolute slack on constraint rows and the zero-flow threshold.
    pub feasibility: f64,
    /// Maximum distance from `0` or `1` for an activation to be integral.
    pub integrality: f64,
    /// Relative gap used by prune-by-bound.
    pub optimality: f64,
    /// Reduced-cost threshold for entering variables.
    pub pivot: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            feasibility: 1e-6,
            integrality: 1e-6,
            optimality: 1e-9,
            pivot: 1e-9,
        }
    }
}

impl Tolerance {
    /// Creates the default tolerance bundle.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy where every epsilon is divided by 100.
    #[inline]
    pub fn tightened(&self) -> Self {
        Self {
            feasibility: self.feasibility / TIGHTEN_FACTOR,
            integrality: self.integrality / TIGHTEN_FACTOR,
            optimality: self.optimality / TIGHTEN_FACTOR,
            pivot: self.pivot / TIGHTEN_FACTOR,
        }
    }

    /// Returns `true` if `value` is within `integrality` of `0` or `1`.
    #[inline]
    pub fn is_binary(&self, value: f64) -> bool {
        is_near(value, 0.0, self.integrality) || is_near(value, 1.0, self.integrality)
    }

    /// Returns `true` if `value` is indistinguishable from zero.
    #[inline]
    pub fn is_zero(&self, value: f64) -> bool {
        value.abs() <= self.feasibility
    }

    /// Returns `true` if a node with lower bound `bound` cannot improve on an
    /// incumbent with objective `incumbent`.
    ///
    /// Equal values are dominated; the comparison uses a gap relative to the
    /// magnitude of the incumbent.
    #[inline]
    pub fn is_dominated(&self, bound: f64, incumbent: f64) -> bool {
        if !incumbent.is_finite() {
            return false;
        }
        bound >= incumbent - self.optimality * incumbent.abs().max(1.0)
    }

    /// Returns `true` if `candidate` is strictly better than `incumbent`.
    #[inline]
    pub fn is_improvement(&self, candidate: f64, incumbent: f64) -> bool {
        !self.is_dominated(candidate, incumbent)
    }
}

impl std::fmt::Display for Tolerance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Tolerance(feasibility: {:e}, integrality: {:e}, optimality: {:e}, pivot: {:e})",
            self.feasibility, self.integrality, self.optimality, self.pivot
        )
    }
}

/// Returns `true` if `a` and `b` differ by at most `eps`.
#[inline]
pub fn is_near<F>(a: F, b: F, eps: F) -> bool
where
    F: Float,
{
    (a - b).abs() <= eps
}

/// Returns `true` if `a` and `b` agree up to `eps` scaled by their magnitude.
///
/// For values below `1.0` in magnitude the check is absolute.
#[inline]
pub fn is_near_relative<F>(a: F, b: F, eps: F) -> bool
where
    F: Float,
{
    let scale = a.abs().max(b.abs()).max(F::one());
    (a - b).abs() <= eps * scale
}

/// Distance of `value` from the nearest integer.
#[inline]
pub fn fractionality<F>(value: F) -> F
where
    F: Float,
{
    (value - value.round()).abs()
}

/// Clamps values within `eps` of zero to exactly zero.
#[inline]
pub fn snap_to_zero<F>(value: F, eps: F) -> F
where
    F: Float,
{
    if value.abs() <= eps { F::zero() } else { value }
}
