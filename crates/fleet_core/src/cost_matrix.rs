//! Dense transport × shipment distance table and its concurrent construction.

use std::sync::Arc;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::AllocationError;
use crate::model::{Shipment, Transport};
use crate::resolver::DistanceResolver;

/// Minimum cost given to pairs farther apart than the allowed maximum. The
/// pair stays in the matrix so a complete matching still exists.
pub const INFEASIBLE_COST: f64 = 1_000_000.0;

/// Sentinel cost for `max_distance_km`: at least [`INFEASIBLE_COST`] and
/// strictly greater than the threshold, so it exceeds every feasible cost.
pub fn infeasible_cost(max_distance_km: f64) -> f64 {
    INFEASIBLE_COST.max(max_distance_km * 2.0 + 1.0)
}

/// Row-major cost table. Row `i` is the `i`-th transport, column `j` the
/// `j`-th shipment of the sequences the matrix was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    rows: usize,
    cols: usize,
    cells: Vec<f64>,
}

impl CostMatrix {
    /// Build a matrix from row-major cells.
    ///
    /// # Panics
    ///
    /// Panics if `cells.len() != rows * cols`.
    pub fn from_cells(rows: usize, cols: usize, cells: Vec<f64>) -> Self {
        assert_eq!(cells.len(), rows * cols, "cell count must equal rows * cols");
        Self { rows, cols, cells }
    }

    /// Build a matrix from nested rows.
    ///
    /// # Panics
    ///
    /// Panics if the rows have different lengths.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Self {
        let cols = rows.first().map_or(0, |r| r.len());
        assert!(
            rows.iter().all(|r| r.len() == cols),
            "all rows must have the same length"
        );
        let n_rows = rows.len();
        Self::from_cells(n_rows, cols, rows.into_iter().flatten().collect())
    }

    /// A matrix with no cells and the given shape on one side.
    pub fn empty(rows: usize, cols: usize) -> Self {
        debug_assert!(rows == 0 || cols == 0);
        Self {
            rows,
            cols,
            cells: Vec::new(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.cells[row * self.cols + col]
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.cells[row * self.cols..(row + 1) * self.cols]
    }

    /// Sum of the costs of the given `(row, col)` pairs.
    pub fn total(&self, pairs: &[(usize, usize)]) -> f64 {
        pairs.iter().map(|&(i, j)| self.get(i, j)).sum()
    }

    /// A copy with every cell above `max_distance_km` replaced by the sentinel.
    pub fn penalized(&self, max_distance_km: f64) -> CostMatrix {
        CostMatrix {
            rows: self.rows,
            cols: self.cols,
            cells: self
                .cells
                .iter()
                .map(|&distance_km| penalize(distance_km, max_distance_km))
                .collect(),
        }
    }
}

/// Cost for one pair: the distance, or [`infeasible_cost`] when it exceeds `max_distance_km`.
pub fn penalize(distance_km: f64, max_distance_km: f64) -> f64 {
    if distance_km > max_distance_km {
        infeasible_cost(max_distance_km)
    } else {
        distance_km
    }
}

/// Resolves every transport/shipment pair on a bounded worker pool.
pub struct CostMatrixBuilder {
    resolver: Arc<DistanceResolver>,
    pool: ThreadPool,
}

impl CostMatrixBuilder {
    /// Create a builder with `worker_threads` workers (one per CPU when `None`).
    pub fn new(
        resolver: Arc<DistanceResolver>,
        worker_threads: Option<usize>,
    ) -> Result<Self, AllocationError> {
        let mut pool = ThreadPoolBuilder::new().thread_name(|idx| format!("cost-matrix-{idx}"));
        if let Some(threads) = worker_threads {
            pool = pool.num_threads(threads.max(1));
        }
        Ok(Self {
            resolver,
            pool: pool.build()?,
        })
    }

    pub fn worker_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Build the cost matrix for `transports × shipments`: resolved distances
    /// with every pair above `max_distance_km` penalized.
    pub fn build(
        &self,
        transports: &[Transport],
        shipments: &[Shipment],
        max_distance_km: f64,
    ) -> Result<CostMatrix, AllocationError> {
        Ok(self
            .distances(transports, shipments)?
            .penalized(max_distance_km))
    }

    /// Resolve the raw distance of every `transports × shipments` pair.
    ///
    /// Cells are computed concurrently and collected in index order; the
    /// matrix is assembled only after every cell finished. The first failing
    /// cell fails the whole build.
    pub fn distances(
        &self,
        transports: &[Transport],
        shipments: &[Shipment],
    ) -> Result<CostMatrix, AllocationError> {
        let (rows, cols) = (transports.len(), shipments.len());
        if rows == 0 || cols == 0 {
            return Ok(CostMatrix::empty(rows, cols));
        }

        let cells = self.pool.install(|| {
            (0..rows * cols)
                .into_par_iter()
                .map(|idx| {
                    let (i, j) = (idx / cols, idx % cols);
                    self.resolver
                        .resolve(&transports[i].location, &shipments[j].location)
                })
                .collect::<Result<Vec<f64>, AllocationError>>()
        })?;

        tracing::debug!(
            rows,
            cols,
            provider = self.resolver.provider_name(),
            "distance matrix built"
        );

        Ok(CostMatrix::from_cells(rows, cols, cells))
    }
}
