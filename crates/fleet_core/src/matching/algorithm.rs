use crate::cost_matrix::CostMatrix;

/// Trait for one-to-one assignment solvers over a transport × shipment cost matrix.
///
/// Implementations return `min(rows, cols)` `(row, col)` pairs sorted by row,
/// with every row and column used at most once. Zero-sized input yields no
/// pairs. Output must be deterministic for identical input.
pub trait AssignmentSolver: Send + Sync {
    fn solve(&self, costs: &CostMatrix) -> Vec<(usize, usize)>;
}
