//! Hungarian (Kuhn-Munkres) algorithm for minimum-cost bipartite assignment.
//!
//! Solves the assignment globally over the whole cost matrix, so the total
//! empty distance across all pairs is minimal (not the greedy per-transport
//! nearest shipment).

use pathfinding::kuhn_munkres::{kuhn_munkres_min, Weights};

use crate::cost_matrix::CostMatrix;

use super::algorithm::AssignmentSolver;

/// Scale factor to convert f64 kilometres to i64 weights (metre precision).
const SCALE: f64 = 1_000.0;

/// Clamp for converted weights. Keeps sums over large matrices inside i64.
const MAX_WEIGHT: i64 = 1_000_000_000_000_000;

/// Row-major i64 matrix implementing pathfinding's `Weights`.
struct I64Weights {
    rows: usize,
    cols: usize,
    cells: Vec<i64>,
}

impl I64Weights {
    /// Convert `costs`, transposing when it has more rows than columns
    /// (Kuhn-Munkres requires rows <= columns).
    fn from_costs(costs: &CostMatrix, transpose: bool) -> Self {
        let (rows, cols) = if transpose {
            (costs.cols(), costs.rows())
        } else {
            (costs.rows(), costs.cols())
        };
        let mut cells = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                let cost = if transpose { costs.get(c, r) } else { costs.get(r, c) };
                cells.push(cost_to_weight(cost));
            }
        }
        Self { rows, cols, cells }
    }
}

impl Weights<i64> for I64Weights {
    fn rows(&self) -> usize {
        self.rows
    }

    fn columns(&self) -> usize {
        self.cols
    }

    fn at(&self, row: usize, col: usize) -> i64 {
        self.cells[row * self.cols + col]
    }

    fn neg(&self) -> Self {
        I64Weights {
            rows: self.rows,
            cols: self.cols,
            cells: self.cells.iter().map(|&x| x.saturating_neg()).collect(),
        }
    }
}

/// Convert an f64 cost to an i64 weight (scale and clamp to avoid overflow).
fn cost_to_weight(cost: f64) -> i64 {
    let w = (cost * SCALE).round();
    if w.is_nan() {
        MAX_WEIGHT
    } else if w >= MAX_WEIGHT as f64 {
        MAX_WEIGHT
    } else if w <= -(MAX_WEIGHT as f64) {
        -MAX_WEIGHT
    } else {
        w as i64
    }
}

/// Minimum-cost assignment via Kuhn-Munkres, O(n³).
#[derive(Debug, Clone, Copy, Default)]
pub struct HungarianSolver;

impl AssignmentSolver for HungarianSolver {
    fn solve(&self, costs: &CostMatrix) -> Vec<(usize, usize)> {
        if costs.rows() == 0 || costs.cols() == 0 {
            return Vec::new();
        }

        let transpose = costs.rows() > costs.cols();
        let weights = I64Weights::from_costs(costs, transpose);
        let (_total, assignment) = kuhn_munkres_min(&weights);

        // assignment[r] is the column of weights-row r
        let mut pairs: Vec<(usize, usize)> = assignment
            .into_iter()
            .enumerate()
            .map(|(r, c)| if transpose { (c, r) } else { (r, c) })
            .collect();
        pairs.sort_unstable();

        tracing::debug!(
            rows = costs.rows(),
            cols = costs.cols(),
            pairs = pairs.len(),
            transposed = transpose,
            "assignment solved"
        );
        pairs
    }
}
