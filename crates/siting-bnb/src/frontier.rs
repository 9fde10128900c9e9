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

//! Best-first frontier
//!
//! Open nodes are kept in a binary heap ordered by lower bound. Among nodes
//! with the same bound the one inserted first is popped first, so the order
//! of exploration is a pure function of the insertion sequence.
//!
//! Bounds are compared with `f64::total_cmp`; relaxation objectives are
//! always finite, so this agrees with the numeric order.

use crate::node::Node;
use std::{cmp::Ordering, collections::BinaryHeap};

struct Entry {
    bound: f64,
    seq: u64,
    node: Node,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Reversed: `BinaryHeap` is a max-heap and we want the smallest
    // (bound, seq) pair on top.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .bound
            .total_cmp(&self.bound)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// A min-priority queue of open nodes keyed by `(lower bound, insertion order)`.
#[derive(Default)]
pub struct Frontier {
    heap: BinaryHeap<Entry>,
    next_seq: u64,
}

impl Frontier {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `node`, stamping it with the next insertion number.
    #[inline]
    pub fn push(&mut self, node: Node) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry {
            bound: node.lower_bound(),
            seq,
            node,
        });
    }

    /// Removes the node with the lowest bound; ties go to the earliest insertion.
    #[inline]
    pub fn pop(&mut self) -> Option<Node> {
        self.heap.pop().map(|entry| entry.node)
    }

    /// Lowest bound among open nodes, or `None` if the frontier is empty.
    #[inline]
    pub fn best_bound(&self) -> Option<f64> {
        self.heap.peek().map(|entry| entry.bound)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Total number of insertions since construction.
    #[inline]
    pub fn num_pushed(&self) -> u64 {
        self.next_seq
    }
}

impl std::fmt::Debug for Frontier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frontier")
            .field("len", &self.heap.len())
            .field("best_bound", &self.best_bound())
            .field("next_seq", &self.next_seq)
            .finish()
    }
}

impl std::fmt::Display for Frontier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.best_bound() {
            Some(bound) => write!(f, "Frontier(len: {}, best_bound: {})", self.len(), bound),
            None => write!(f, "Frontier(empty)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siting_lp::{bounds::ActivationBounds, relaxation::RelaxationSolver};
    use siting_model::{
        entity::{DemandPoint, Facility},
        model::Model,
    };

    // A relaxation of an instance whose root objective is `cost * 10`.
    fn node_with_bound(id: u64, cost: f64) -> Node {
        let model = Model::new(
            vec![Facility::new("F", 10.0, 0.0)],
            vec![DemandPoint::new("D", 10.0)],
            vec![vec![cost]],
        )
        .expect("valid model");
        let bounds = ActivationBounds::root(1);
        let relaxation = RelaxationSolver::new()
            .solve(&model, &bounds)
            .expect("feasible relaxation");
        Node::new(id, 0, bounds, relaxation)
    }

    #[test]
    fn test_pops_in_bound_order() {
        let mut frontier = Frontier::new();
        frontier.push(node_with_bound(0, 3.0));
        frontier.push(node_with_bound(1, 1.0));
        frontier.push(node_with_bound(2, 2.0));

        assert_eq!(frontier.len(), 3);
        assert_eq!(frontier.best_bound(), Some(10.0));
        let order: Vec<u64> = std::iter::from_fn(|| frontier.pop()).map(|n| n.id()).collect();
        assert_eq!(order, vec![1, 2, 0]);
        assert!(frontier.is_empty());
        assert_eq!(frontier.best_bound(), None);
    }

    #[test]
    fn test_ties_pop_in_insertion_order() {
        let mut frontier = Frontier::new();
        for id in [7, 3, 5] {
            frontier.push(node_with_bound(id, 2.0));
        }
        let order: Vec<u64> = std::iter::from_fn(|| frontier.pop()).map(|n| n.id()).collect();
        assert_eq!(order, vec![7, 3, 5]);
        assert_eq!(frontier.num_pushed(), 3);
    }

    #[test]
    fn test_display() {
        let mut frontier = Frontier::new();
        assert_eq!(frontier.to_string(), "Frontier(empty)");
        frontier.push(node_with_bound(0, 1.5));
        assert_eq!(frontier.to_string(), "Frontier(len: 1, best_bound: 15)");
    }
}
