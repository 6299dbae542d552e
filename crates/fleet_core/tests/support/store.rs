use std::sync::atomic::{AtomicBool, Ordering};

use fleet_core::model::{
    Entity, LocationId, NewPlanning, NewRoute, Planning, PlanningId, Route, RouteId, Shipment,
    ShipmentId, Transport, TransportId,
};
use fleet_core::store::{EntityStore, InMemoryStore, RouteStore, StoreError};

/// In-memory store that, once armed, plans the first transport of the next
/// batch right before committing it, as a concurrent writer would.
#[derive(Debug, Default)]
pub struct InterferingStore {
    inner: InMemoryStore,
    armed: AtomicBool,
}

impl InterferingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interfere with the next batch commit.
    pub fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }

    pub fn inner(&self) -> &InMemoryStore {
        &self.inner
    }
}

impl RouteStore for InterferingStore {
    fn find_route(&self, start: LocationId, end: LocationId) -> Result<Option<Route>, StoreError> {
        self.inner.find_route(start, end)
    }

    fn insert_route(&self, route: NewRoute) -> Result<Route, StoreError> {
        self.inner.insert_route(route)
    }

    fn route(&self, id: RouteId) -> Result<Option<Route>, StoreError> {
        self.inner.route(id)
    }
}

impl EntityStore for InterferingStore {
    fn insert_entity(&self, entity: Entity) -> Result<(), StoreError> {
        self.inner.insert_entity(entity)
    }

    fn delete_transport(&self, id: TransportId) -> Result<bool, StoreError> {
        self.inner.delete_transport(id)
    }

    fn delete_shipment(&self, id: ShipmentId) -> Result<bool, StoreError> {
        self.inner.delete_shipment(id)
    }

    fn transport(&self, id: TransportId) -> Result<Option<Transport>, StoreError> {
        self.inner.transport(id)
    }

    fn shipment(&self, id: ShipmentId) -> Result<Option<Shipment>, StoreError> {
        self.inner.shipment(id)
    }

    fn transports(&self) -> Result<Vec<Transport>, StoreError> {
        self.inner.transports()
    }

    fn shipments(&self) -> Result<Vec<Shipment>, StoreError> {
        self.inner.shipments()
    }

    fn unplanned_transports(&self) -> Result<Vec<Transport>, StoreError> {
        self.inner.unplanned_transports()
    }

    fn unplanned_shipments(&self) -> Result<Vec<Shipment>, StoreError> {
        self.inner.unplanned_shipments()
    }

    fn planning(&self, id: PlanningId) -> Result<Option<Planning>, StoreError> {
        self.inner.planning(id)
    }

    fn plannings(&self) -> Result<Vec<Planning>, StoreError> {
        self.inner.plannings()
    }

    fn commit_plannings(&self, batch: &[NewPlanning]) -> Result<Vec<Planning>, StoreError> {
        if self.armed.swap(false, Ordering::SeqCst) {
            // Pair the batch's first transport with the last unplanned shipment.
            let spare = self.inner.unplanned_shipments()?.pop();
            if let (Some(first), Some(spare)) = (batch.first(), spare) {
                self.inner.commit_plannings(&[NewPlanning {
                    transport: first.transport,
                    shipment: spare.id,
                    route: None,
                }])?;
            }
        }
        self.inner.commit_plannings(batch)
    }

    fn set_planning_route(&self, id: PlanningId, route: RouteId) -> Result<(), StoreError> {
        self.inner.set_planning_route(id, route)
    }

    fn delete_planning(&self, id: PlanningId) -> Result<bool, StoreError> {
        self.inner.delete_planning(id)
    }

    fn clear_plannings(&self) -> Result<usize, StoreError> {
        self.inner.clear_plannings()
    }

    fn clear_all(&self) -> Result<(), StoreError> {
        self.inner.clear_all()
    }
}
