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

//! Search tree nodes
//!
//! A `Node` pairs the activation bounds that define a subproblem with the
//! relaxation solved for it. Nodes are created already evaluated: a subtree
//! whose relaxation is infeasible never becomes a node at all, so every
//! node carries a valid lower bound.

use siting_lp::{bounds::ActivationBounds, relaxation::Relaxation};

/// An evaluated subproblem of the branch-and-bound tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: u64,
    depth: u32,
    bounds: ActivationBounds,
    relaxation: Relaxation,
}

impl Node {
    /// Creates a node from its bounds and the relaxation solved under them.
    #[inline]
    pub fn new(id: u64, depth: u32, bounds: ActivationBounds, relaxation: Relaxation) -> Self {
        Self {
            id,
            depth,
            bounds,
            relaxation,
        }
    }

    /// Identifier, unique within one search. The root is `0`.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Number of branchings between the root and this node.
    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    #[inline]
    pub fn bounds(&self) -> &ActivationBounds {
        &self.bounds
    }

    #[inline]
    pub fn relaxation(&self) -> &Relaxation {
        &self.relaxation
    }

    /// The relaxation objective, a lower bound for the whole subtree.
    #[inline]
    pub fn lower_bound(&self) -> f64 {
        self.relaxation.objective()
    }

    #[inline]
    pub fn into_parts(self) -> (ActivationBounds, Relaxation) {
        (self.bounds, self.relaxation)
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Node(id: {}, depth: {}, bounds: {}, lower_bound: {})",
            self.id,
            self.depth,
            self.bounds,
            self.lower_bound()
        )
    }
}
