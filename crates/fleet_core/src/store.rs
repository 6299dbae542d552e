//! Storage seams for entities, cached routes and plannings.
//!
//! The allocation core only needs [`RouteStore`] (read-mostly, shared by the
//! cost-matrix workers). The planning service needs the full [`EntityStore`].
//! [`InMemoryStore`] is the bundled implementation.

mod memory;

use thiserror::Error;

use crate::model::{
    Entity, LocationId, NewPlanning, NewRoute, Planning, PlanningId, Route, RouteId, Shipment,
    ShipmentId, Transport, TransportId,
};

pub use memory::InMemoryStore;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("unknown transport {0}")]
    UnknownTransport(TransportId),
    #[error("unknown shipment {0}")]
    UnknownShipment(ShipmentId),
    #[error("unknown planning {0}")]
    UnknownPlanning(PlanningId),
    #[error("unknown route {0}")]
    UnknownRoute(RouteId),
    #[error("transport {0} already has a planning")]
    TransportAlreadyPlanned(TransportId),
    #[error("shipment {0} already has a planning")]
    ShipmentAlreadyPlanned(ShipmentId),
    #[error("transport {transport} or shipment {shipment} appears twice in one batch")]
    DuplicateInBatch {
        transport: TransportId,
        shipment: ShipmentId,
    },
    #[error("route distance must be finite and non-negative, got {0}")]
    InvalidDistance(f64),
    #[error("store lock poisoned")]
    Poisoned,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Persisted route cache keyed by directed `(start, end)` location identity.
pub trait RouteStore: Send + Sync {
    /// Look up a cached route. When several exist for the pair, the first stored wins.
    fn find_route(&self, start: LocationId, end: LocationId) -> Result<Option<Route>, StoreError>;

    fn insert_route(&self, route: NewRoute) -> Result<Route, StoreError>;

    fn route(&self, id: RouteId) -> Result<Option<Route>, StoreError>;
}

/// Entity, planning and route persistence.
///
/// Sequences are returned in insertion order, which must stay stable between
/// cost-matrix construction and interpretation of the assignment.
pub trait EntityStore: RouteStore {
    fn insert_entity(&self, entity: Entity) -> Result<(), StoreError>;

    /// Remove a transport and any planning it takes part in. Returns whether it existed.
    fn delete_transport(&self, id: TransportId) -> Result<bool, StoreError>;

    /// Remove a shipment and any planning it takes part in. Returns whether it existed.
    fn delete_shipment(&self, id: ShipmentId) -> Result<bool, StoreError>;

    fn transport(&self, id: TransportId) -> Result<Option<Transport>, StoreError>;

    fn shipment(&self, id: ShipmentId) -> Result<Option<Shipment>, StoreError>;

    fn transports(&self) -> Result<Vec<Transport>, StoreError>;

    fn shipments(&self) -> Result<Vec<Shipment>, StoreError>;

    /// Transports without a planning.
    fn unplanned_transports(&self) -> Result<Vec<Transport>, StoreError>;

    /// Shipments without a planning.
    fn unplanned_shipments(&self) -> Result<Vec<Shipment>, StoreError>;

    fn planning(&self, id: PlanningId) -> Result<Option<Planning>, StoreError>;

    fn plannings(&self) -> Result<Vec<Planning>, StoreError>;

    /// Persist a batch of plannings atomically: either every planning is
    /// stored or none is.
    fn commit_plannings(&self, batch: &[NewPlanning]) -> Result<Vec<Planning>, StoreError>;

    fn set_planning_route(&self, id: PlanningId, route: RouteId) -> Result<(), StoreError>;

    /// Returns whether the planning existed.
    fn delete_planning(&self, id: PlanningId) -> Result<bool, StoreError>;

    /// Remove every planning, returning how many were removed.
    fn clear_plannings(&self) -> Result<usize, StoreError>;

    /// Remove every entity, planning and route.
    fn clear_all(&self) -> Result<(), StoreError>;
}
