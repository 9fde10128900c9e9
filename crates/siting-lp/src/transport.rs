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

//! # Transportation Simplex
//!
//! A primal simplex specialised to the balanced transportation problem
//!
//! ```text
//! minimize   Σ_{i,j} c_ij · x_ij
//! subject to Σ_j x_ij = s_i   for every source i
//!            Σ_i x_ij = d_j   for every sink j
//!            x_ij ≥ 0
//! ```
//!
//! A basis has exactly `m + n - 1` cells and forms a spanning tree over the
//! bipartite graph of rows and columns. That structure makes each pivot
//! cheap:
//!
//! 1. **Potentials**: `u_0 = 0`, then `u_i + v_j = c_ij` along basic cells,
//!    propagated by walking the tree.
//! 2. **Pricing**: reduced cost `c_ij - u_i - v_j` of every non-basic cell.
//! 3. **Cycle**: the entering cell closes exactly one cycle with the tree
//!    path between its row and its column; signs alternate along it.
//! 4. **Ratio test**: the minus cell with the smallest flow leaves.
//!
//! The initial basis comes from the minimum-cost method. All ties are broken
//! by the lowest row index, then the lowest column index.

use crate::error::RelaxationError;
use fixedbitset::FixedBitSet;
use ndarray::Array2;
use siting_core::num::Tolerance;

/// Rule for choosing the entering cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pricing {
    /// Most negative reduced cost (Dantzig).
    #[default]
    MostNegative,
    /// First cell with a negative reduced cost in index order (Bland).
    FirstNegative,
}

impl std::fmt::Display for Pricing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Pricing::MostNegative => write!(f, "MostNegative"),
            Pricing::FirstNegative => write!(f, "FirstNegative"),
        }
    }
}

/// A balanced transportation problem with `m` sources and `n` sinks.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportProblem {
    costs: Array2<f64>,
    supply: Vec<f64>,
    demand: Vec<f64>,
}

impl TransportProblem {
    /// Creates a problem from an `m × n` cost matrix and the two margins.
    ///
    /// # Panics
    ///
    /// In debug builds, if the margins do not match the matrix shape.
    pub fn new(costs: Array2<f64>, supply: Vec<f64>, demand: Vec<f64>) -> Self {
        debug_assert_eq!(
            costs.nrows(),
            supply.len(),
            "called `TransportProblem::new` with {} cost rows but {} supplies",
            costs.nrows(),
            supply.len()
        );
        debug_assert_eq!(
            costs.ncols(),
            demand.len(),
            "called `TransportProblem::new` with {} cost columns but {} demands",
            costs.ncols(),
            demand.len()
        );

        Self {
            costs,
            supply,
            demand,
        }
    }

    #[inline]
    pub fn num_sources(&self) -> usize {
        self.supply.len()
    }

    #[inline]
    pub fn num_sinks(&self) -> usize {
        self.demand.len()
    }

    #[inline]
    pub fn costs(&self) -> &Array2<f64> {
        &self.costs
    }

    #[inline]
    pub fn supply(&self) -> &[f64] {
        &self.supply
    }

    #[inline]
    pub fn demand(&self) -> &[f64] {
        &self.demand
    }
}

/// An optimal basic solution.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportSolution {
    flows: Array2<f64>,
    cost: f64,
    iterations: usize,
}

impl TransportSolution {
    /// The `m × n` flow matrix. Non-basic cells are exactly zero.
    #[inline]
    pub fn flows(&self) -> &Array2<f64> {
        &self.flows
    }

    #[inline]
    pub fn into_flows(self) -> Array2<f64> {
        self.flows
    }

    /// `Σ c_ij · x_ij`.
    #[inline]
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// The number of pivots performed after the initial basis.
    #[inline]
    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

/// Solves `problem` to optimality.
///
/// # Errors
///
/// * `RelaxationError::Infeasible` if there are sinks but no sources.
/// * `RelaxationError::NumericInstability` if no optimal basis is certified
///   within `max_iterations` pivots, or the final flows fail the margin check.
pub fn solve(
    problem: &TransportProblem,
    tolerance: &Tolerance,
    max_iterations: usize,
    pricing: Pricing,
) -> Result<TransportSolution, RelaxationError> {
    let m = problem.num_sources();
    let n = problem.num_sinks();

    if n == 0 {
        return Ok(TransportSolution {
            flows: Array2::zeros((m, 0)),
            cost: 0.0,
            iterations: 0,
        });
    }
    if m == 0 {
        return Err(RelaxationError::Infeasible {
            capacity: 0.0,
            demand: problem.demand.iter().sum(),
        });
    }

    let mut simplex = TransportSimplex::with_initial_basis(problem, tolerance);
    for iteration in 0..=max_iterations {
        if !simplex.compute_potentials() {
            return Err(RelaxationError::NumericInstability {
                iterations: iteration,
            });
        }

        let Some(entering) = simplex.price(pricing) else {
            return simplex.finish(iteration);
        };
        if iteration == max_iterations {
            break;
        }

        let Some(cycle) = simplex.cycle(entering) else {
            return Err(RelaxationError::NumericInstability {
                iterations: iteration,
            });
        };
        simplex.pivot(entering, &cycle);
    }

    Err(RelaxationError::NumericInstability {
        iterations: max_iterations,
    })
}

type Cell = (usize, usize);

/// Working state of one solve.
struct TransportSimplex<'a> {
    problem: &'a TransportProblem,
    tolerance: &'a Tolerance,
    flows: Array2<f64>,
    /// The `m + n - 1` basic cells.
    basis: Vec<Cell>,
    /// Row-major membership flags of `basis`.
    in_basis: FixedBitSet,
    u: Vec<f64>,
    v: Vec<f64>,
}

impl<'a> TransportSimplex<'a> {
    /// Builds the initial basis with the minimum-cost method.
    ///
    /// Each allocation removes exactly one row or column. A row is removed
    /// when its supply is exhausted first, unless it is the last active row;
    /// the last active column is never removed. This yields `m + n - 1` cells.
    fn with_initial_basis(problem: &'a TransportProblem, tolerance: &'a Tolerance) -> Self {
        let m = problem.num_sources();
        let n = problem.num_sinks();
        let costs = &problem.costs;

        let mut flows = Array2::<f64>::zeros((m, n));
        let mut basis = Vec::with_capacity(m + n - 1);
        let mut in_basis = FixedBitSet::with_capacity(m * n);
        let mut rem_supply = problem.supply.clone();
        let mut rem_demand = problem.demand.clone();
        let mut row_active = FixedBitSet::with_capacity(m);
        let mut col_active = FixedBitSet::with_capacity(n);
        row_active.insert_range(..);
        col_active.insert_range(..);
        let mut active_rows = m;
        let mut active_cols = n;

        while active_rows > 0 && active_cols > 0 {
            let mut best: Option<Cell> = None;
            for i in row_active.ones() {
                for j in col_active.ones() {
                    match best {
                        Some((bi, bj)) if costs[[i, j]] >= costs[[bi, bj]] => {}
                        _ => best = Some((i, j)),
                    }
                }
            }
            let Some((i, j)) = best else {
                break;
            };

            let amount = rem_supply[i].min(rem_demand[j]).max(0.0);
            flows[[i, j]] = amount;
            basis.push((i, j));
            in_basis.insert(i * n + j);

            let row_exhausted = rem_supply[i] <= rem_demand[j];
            rem_supply[i] = (rem_supply[i] - amount).max(0.0);
            rem_demand[j] = (rem_demand[j] - amount).max(0.0);

            if (row_exhausted && active_rows > 1) || active_cols == 1 {
                row_active.set(i, false);
                active_rows -= 1;
            } else {
                col_active.set(j, false);
                active_cols -= 1;
            }
        }

        Self {
            problem,
            tolerance,
            flows,
            basis,
            in_basis,
            u: vec![0.0; m],
            v: vec![0.0; n],
        }
    }

    #[inline]
    fn num_rows(&self) -> usize {
        self.problem.num_sources()
    }

    #[inline]
    fn num_cols(&self) -> usize {
        self.problem.num_sinks()
    }

    /// Adjacency of the basis tree: for each row its basic columns, for each
    /// column its basic rows.
    fn adjacency(&self) -> (Vec<Vec<usize>>, Vec<Vec<usize>>) {
        let mut row_adj = vec![Vec::new(); self.num_rows()];
        let mut col_adj = vec![Vec::new(); self.num_cols()];
        for &(i, j) in &self.basis {
            row_adj[i].push(j);
            col_adj[j].push(i);
        }
        (row_adj, col_adj)
    }

    /// Solves `u_i + v_j = c_ij` over the basis tree with `u_0 = 0`.
    ///
    /// Returns `false` if the basis does not span every row and column or
    /// the potentials are not finite.
    fn compute_potentials(&mut self) -> bool {
        let m = self.num_rows();
        let n = self.num_cols();
        let (row_adj, col_adj) = self.adjacency();
        let costs = &self.problem.costs;

        // Node ids: rows are `0..m`, columns are `m..m + n`.
        let mut seen = FixedBitSet::with_capacity(m + n);
        let mut stack = vec![0usize];
        seen.insert(0);
        self.u[0] = 0.0;

        while let Some(node) = stack.pop() {
            if node < m {
                let i = node;
                for &j in &row_adj[i] {
                    if !seen.put(m + j) {
                        self.v[j] = costs[[i, j]] - self.u[i];
                        stack.push(m + j);
                    }
                }
            } else {
                let j = node - m;
                for &i in &col_adj[j] {
                    if !seen.put(i) {
                        self.u[i] = costs[[i, j]] - self.v[j];
                        stack.push(i);
                    }
                }
            }
        }

        seen.count_ones(..) == m + n
            && self.u.iter().chain(self.v.iter()).all(|p| p.is_finite())
    }

    /// Picks the entering cell, or `None` if the basis is optimal.
    fn price(&self, pricing: Pricing) -> Option<Cell> {
        let n = self.num_cols();
        let costs = &self.problem.costs;
        let threshold = -self.tolerance.pivot;

        let mut best: Option<(Cell, f64)> = None;
        for i in 0..self.num_rows() {
            for j in 0..n {
                if self.in_basis.contains(i * n + j) {
                    continue;
                }
                let reduced = costs[[i, j]] - self.u[i] - self.v[j];
                if reduced >= threshold {
                    continue;
                }
                match pricing {
                    Pricing::FirstNegative => return Some((i, j)),
                    Pricing::MostNegative => match best {
                        Some((_, r)) if reduced >= r => {}
                        _ => best = Some(((i, j), reduced)),
                    },
                }
            }
        }
        best.map(|(cell, _)| cell)
    }

    /// Returns the basic cells of the cycle closed by `entering`, ordered from
    /// the entering column back to the entering row. Even positions receive
    /// `-θ`, odd positions `+θ`.
    fn cycle(&self, entering: Cell) -> Option<Vec<Cell>> {
        let m = self.num_rows();
        let (row_adj, col_adj) = self.adjacency();
        let (start_row, target_col) = entering;
        let target = m + target_col;

        let mut parent: Vec<Option<usize>> = vec![None; m + self.num_cols()];
        let mut seen = FixedBitSet::with_capacity(m + self.num_cols());
        let mut queue = std::collections::VecDeque::from([start_row]);
        seen.insert(start_row);

        while let Some(node) = queue.pop_front() {
            if node == target {
                break;
            }
            if node < m {
                for &j in &row_adj[node] {
                    if !seen.put(m + j) {
                        parent[m + j] = Some(node);
                        queue.push_back(m + j);
                    }
                }
            } else {
                for &i in &col_adj[node - m] {
                    if !seen.put(i) {
                        parent[i] = Some(node);
                        queue.push_back(i);
                    }
                }
            }
        }

        if !seen.contains(target) {
            return None;
        }

        let mut cells = Vec::new();
        let mut node = target;
        while node != start_row {
            let prev = parent[node]?;
            let cell = if node < m {
                (node, prev - m)
            } else {
                (prev, node - m)
            };
            cells.push(cell);
            node = prev;
        }
        Some(cells)
    }

    /// Shifts `θ` around the cycle and swaps `entering` into the basis.
    fn pivot(&mut self, entering: Cell, cycle: &[Cell]) {
        let n = self.num_cols();

        let mut leaving = cycle[0];
        for &cell in cycle.iter().step_by(2) {
            let flow = self.flows[[cell.0, cell.1]];
            let best = self.flows[[leaving.0, leaving.1]];
            if flow < best || (flow == best && cell < leaving) {
                leaving = cell;
            }
        }
        let theta = self.flows[[leaving.0, leaving.1]];

        for (k, &(i, j)) in cycle.iter().enumerate() {
            if k % 2 == 0 {
                self.flows[[i, j]] = (self.flows[[i, j]] - theta).max(0.0);
            } else {
                self.flows[[i, j]] += theta;
            }
        }
        self.flows[[entering.0, entering.1]] = theta;
        self.flows[[leaving.0, leaving.1]] = 0.0;

        if let Some(slot) = self.basis.iter().position(|&c| c == leaving) {
            self.basis[slot] = entering;
        }
        self.in_basis.set(leaving.0 * n + leaving.1, false);
        self.in_basis.insert(entering.0 * n + entering.1);
    }

    /// Checks the margins of the final basis and packages the solution.
    fn finish(self, iterations: usize) -> Result<TransportSolution, RelaxationError> {
        let eps = self.tolerance.feasibility;
        let mut flows = self.flows;

        for x in flows.iter_mut() {
            if *x < -eps {
                return Err(RelaxationError::NumericInstability { iterations });
            }
            if *x < 0.0 {
                *x = 0.0;
            }
        }

        for (i, row) in flows.rows().into_iter().enumerate() {
            let supply = self.problem.supply[i];
            if row.sum() > supply + eps * supply.max(1.0) {
                return Err(RelaxationError::NumericInstability { iterations });
            }
        }
        for (j, col) in flows.columns().into_iter().enumerate() {
            let demand = self.problem.demand[j];
            if (col.sum() - demand).abs() > eps * demand.max(1.0) {
                return Err(RelaxationError::NumericInstability { iterations });
            }
        }

        let cost = (&flows * &self.problem.costs).sum();
        Ok(TransportSolution {
            flows,
            cost,
            iterations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn solve_default(problem: &TransportProblem) -> TransportSolution {
        solve(problem, &Tolerance::default(), 10_000, Pricing::MostNegative)
            .expect("balanced problem must solve")
    }

    fn assert_margins(problem: &TransportProblem, sol: &TransportSolution) {
        for (i, row) in sol.flows().rows().into_iter().enumerate() {
            assert!((row.sum() - problem.supply()[i]).abs() < 1e-6);
        }
        for (j, col) in sol.flows().columns().into_iter().enumerate() {
            assert!((col.sum() - problem.demand()[j]).abs() < 1e-6);
        }
        assert!(sol.flows().iter().all(|&x| x >= 0.0));
    }

    /// Enumerates every vertex of a 2 × n problem by brute force over the
    /// first row, which is enough for small reference checks.
    fn brute_force_two_rows(problem: &TransportProblem, steps: usize) -> f64 {
        let n = problem.num_sinks();
        let mut best = f64::INFINITY;
        let mut x = vec![0usize; n];
        loop {
            let row0: Vec<f64> = (0..n)
                .map(|j| problem.demand()[j] * x[j] as f64 / steps as f64)
                .collect();
            let s0: f64 = row0.iter().sum();
            if (s0 - problem.supply()[0]).abs() < 1e-9 {
                let cost: f64 = (0..n)
                    .map(|j| {
                        row0[j] * problem.costs()[[0, j]]
                            + (problem.demand()[j] - row0[j]) * problem.costs()[[1, j]]
                    })
                    .sum();
                best = best.min(cost);
            }
            let mut k = 0;
            loop {
                if k == n {
                    return best;
                }
                x[k] += 1;
                if x[k] <= steps {
                    break;
                }
                x[k] = 0;
                k += 1;
            }
        }
    }

    #[test]
    fn test_textbook_instance() {
        // Classic 3 × 4 instance with optimum 743.
        let problem = TransportProblem::new(
            array![
                [19.0, 30.0, 50.0, 10.0],
                [70.0, 30.0, 40.0, 60.0],
                [40.0, 8.0, 70.0, 20.0]
            ],
            vec![7.0, 9.0, 18.0],
            vec![5.0, 8.0, 7.0, 14.0],
        );
        let sol = solve_default(&problem);
        assert_margins(&problem, &sol);
        assert!((sol.cost() - 743.0).abs() < 1e-9, "cost {}", sol.cost());
    }

    #[test]
    fn test_single_cell() {
        let problem = TransportProblem::new(array![[3.0]], vec![4.0], vec![4.0]);
        let sol = solve_default(&problem);
        assert_eq!(sol.flows()[[0, 0]], 4.0);
        assert_eq!(sol.cost(), 12.0);
        assert_eq!(sol.iterations(), 0);
    }

    #[test]
    fn test_min_cost_start_can_be_suboptimal() {
        // The cheapest cell (0, 0) is a trap: the optimum routes row 0 to column 1.
        let problem = TransportProblem::new(
            array![[1.0, 2.0], [10.0, 100.0]],
            vec![1.0, 1.0],
            vec![1.0, 1.0],
        );
        let sol = solve_default(&problem);
        assert_margins(&problem, &sol);
        assert_eq!(sol.cost(), 12.0);
        assert_eq!(sol.flows()[[0, 1]], 1.0);
        assert_eq!(sol.flows()[[1, 0]], 1.0);
        assert!(sol.iterations() >= 1);
    }

    #[test]
    fn test_ties_prefer_lowest_row_in_initial_basis() {
        let problem = TransportProblem::new(
            array![[2.0], [2.0]],
            vec![15.0, 0.0],
            vec![15.0],
        );
        let sol = solve_default(&problem);
        assert_eq!(sol.flows()[[0, 0]], 15.0);
        assert_eq!(sol.flows()[[1, 0]], 0.0);

        let problem = TransportProblem::new(
            array![[2.0, 0.0], [2.0, 0.0]],
            vec![20.0, 20.0],
            vec![15.0, 25.0],
        );
        let sol = solve_default(&problem);
        assert_margins(&problem, &sol);
        assert_eq!(sol.cost(), 30.0);
    }

    #[test]
    fn test_pricing_rules_agree() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..25 {
            let m = rng.random_range(1..6);
            let n = rng.random_range(1..6);
            let costs = Array2::from_shape_fn((m, n), |_| rng.random_range(0..50) as f64);
            let demand: Vec<f64> = (0..n).map(|_| rng.random_range(1..20) as f64).collect();
            let total: f64 = demand.iter().sum();
            let mut supply: Vec<f64> = (0..m).map(|_| rng.random_range(1..20) as f64).collect();
            let raw: f64 = supply.iter().sum();
            supply.iter_mut().for_each(|s| *s *= total / raw);

            let problem = TransportProblem::new(costs, supply, demand);
            let a = solve(&problem, &Tolerance::default(), 10_000, Pricing::MostNegative)
                .expect("solvable");
            let b = solve(&problem, &Tolerance::default(), 10_000, Pricing::FirstNegative)
                .expect("solvable");
            assert_margins(&problem, &a);
            assert_margins(&problem, &b);
            assert!((a.cost() - b.cost()).abs() < 1e-6 * a.cost().abs().max(1.0));
        }
    }

    #[test]
    fn test_matches_brute_force_on_two_rows() {
        let problem = TransportProblem::new(
            array![[4.0, 1.0, 7.0], [2.0, 6.0, 3.0]],
            vec![6.0, 6.0],
            vec![4.0, 4.0, 4.0],
        );
        let sol = solve_default(&problem);
        assert_margins(&problem, &sol);
        let reference = brute_force_two_rows(&problem, 4);
        assert!((sol.cost() - reference).abs() < 1e-9);
    }

    #[test]
    fn test_deterministic() {
        let problem = TransportProblem::new(
            array![[1.0, 1.0, 1.0], [1.0, 1.0, 1.0]],
            vec![3.0, 3.0],
            vec![2.0, 2.0, 2.0],
        );
        let a = solve_default(&problem);
        let b = solve_default(&problem);
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_budget_reports_instability() {
        let problem = TransportProblem::new(
            array![[1.0, 2.0], [10.0, 100.0]],
            vec![1.0, 1.0],
            vec![1.0, 1.0],
        );
        let err = solve(&problem, &Tolerance::default(), 0, Pricing::MostNegative).unwrap_err();
        assert_eq!(err, RelaxationError::NumericInstability { iterations: 0 });
    }

    #[test]
    fn test_no_sinks_and_no_sources() {
        let problem = TransportProblem::new(Array2::zeros((2, 0)), vec![0.0, 0.0], vec![]);
        let sol = solve_default(&problem);
        assert_eq!(sol.cost(), 0.0);

        let problem = TransportProblem::new(Array2::zeros((0, 1)), vec![], vec![5.0]);
        let err = solve(&problem, &Tolerance::default(), 10, Pricing::MostNegative).unwrap_err();
        assert!(err.is_infeasible());
    }
}
