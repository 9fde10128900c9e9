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

use thiserror::Error;

/// Failures that abort a branch-and-bound run.
///
/// Infeasible relaxations are not errors: they prune the subtree, or prove
/// the model infeasible when they occur at the root.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BnbError {
    /// A relaxation failed to certify optimality, and so did its retry with
    /// tightened tolerances.
    #[error(
        "numeric failure at node {node_id}: relaxation not certified after {iterations} pivots, even with tightened tolerances"
    )]
    Numeric { node_id: u64, iterations: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_node_and_pivots() {
        let err = BnbError::Numeric {
            node_id: 7,
            iterations: 4000,
        };
        let text = err.to_string();
        assert!(text.contains("node 7"));
        assert!(text.contains("4000 pivots"));
    }
}
