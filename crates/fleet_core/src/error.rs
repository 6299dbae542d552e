use thiserror::Error;

use crate::geo::{CoordinateError, Point};
use crate::import::ImportError;
use crate::model::{PlanningId, ShipmentId, TransportId};
use crate::routing::RoutingError;
use crate::store::StoreError;

/// Errors surfaced by allocation and planning operations.
#[derive(Debug, Error)]
pub enum AllocationError {
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(#[from] CoordinateError),
    #[error("distance unavailable from ({from}) to ({to}): {source}")]
    DistanceUnavailable {
        from: Point,
        to: Point,
        #[source]
        source: RoutingError,
    },
    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),
    #[error("maximum distance must be a non-negative number of kilometres, got {0}")]
    InvalidThreshold(f64),
    #[error("failed to build cost-matrix worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
    #[error("routing provider could not be built: {0}")]
    Provider(#[source] RoutingError),
    #[error("transport {0} not found")]
    TransportNotFound(TransportId),
    #[error("shipment {0} not found")]
    ShipmentNotFound(ShipmentId),
    #[error("planning {0} not found")]
    PlanningNotFound(PlanningId),
    #[error("entity import failed: {0}")]
    Import(#[from] ImportError),
}
