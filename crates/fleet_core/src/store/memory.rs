use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::model::{
    Entity, LocationId, NewPlanning, NewRoute, Planning, PlanningId, Route, RouteId, Shipment,
    ShipmentId, Transport, TransportId,
};

use super::{EntityStore, RouteStore, StoreError};

#[derive(Debug, Default)]
struct StoreState {
    transports: Vec<Transport>,
    shipments: Vec<Shipment>,
    routes: Vec<Route>,
    /// First stored route per directed location pair.
    route_index: HashMap<(LocationId, LocationId), usize>,
    plannings: Vec<Planning>,
}

impl StoreState {
    fn planned_transports(&self) -> HashSet<TransportId> {
        self.plannings.iter().map(|p| p.transport).collect()
    }

    fn planned_shipments(&self) -> HashSet<ShipmentId> {
        self.plannings.iter().map(|p| p.shipment).collect()
    }

    fn validate_batch(&self, batch: &[NewPlanning]) -> Result<(), StoreError> {
        let planned_transports = self.planned_transports();
        let planned_shipments = self.planned_shipments();
        let mut batch_transports = HashSet::new();
        let mut batch_shipments = HashSet::new();

        for new in batch {
            if !self.transports.iter().any(|t| t.id == new.transport) {
                return Err(StoreError::UnknownTransport(new.transport));
            }
            if !self.shipments.iter().any(|s| s.id == new.shipment) {
                return Err(StoreError::UnknownShipment(new.shipment));
            }
            if let Some(route) = new.route {
                if !self.routes.iter().any(|r| r.id == route) {
                    return Err(StoreError::UnknownRoute(route));
                }
            }
            if planned_transports.contains(&new.transport) {
                return Err(StoreError::TransportAlreadyPlanned(new.transport));
            }
            if planned_shipments.contains(&new.shipment) {
                return Err(StoreError::ShipmentAlreadyPlanned(new.shipment));
            }
            if !batch_transports.insert(new.transport) || !batch_shipments.insert(new.shipment) {
                return Err(StoreError::DuplicateInBatch {
                    transport: new.transport,
                    shipment: new.shipment,
                });
            }
        }

        Ok(())
    }
}

/// Thread-safe in-memory store.
///
/// Reads take a shared lock, so cost-matrix workers can consult the route
/// cache concurrently. Planning commits validate the whole batch under the
/// write lock before inserting anything.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<StoreState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreState>, StoreError> {
        self.state.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreState>, StoreError> {
        self.state.write().map_err(|_| StoreError::Poisoned)
    }
}

impl RouteStore for InMemoryStore {
    fn find_route(&self, start: LocationId, end: LocationId) -> Result<Option<Route>, StoreError> {
        let state = self.read()?;
        Ok(state
            .route_index
            .get(&(start, end))
            .and_then(|&idx| state.routes.get(idx))
            .cloned())
    }

    fn insert_route(&self, new: NewRoute) -> Result<Route, StoreError> {
        if !new.distance_km.is_finite() || new.distance_km < 0.0 {
            return Err(StoreError::InvalidDistance(new.distance_km));
        }
        let mut state = self.write()?;
        let route = Route {
            id: RouteId::new(),
            start: new.start,
            end: new.end,
            distance_km: new.distance_km,
            polyline: new.polyline,
        };
        let idx = state.routes.len();
        state.routes.push(route.clone());
        state.route_index.entry((route.start, route.end)).or_insert(idx);
        Ok(route)
    }

    fn route(&self, id: RouteId) -> Result<Option<Route>, StoreError> {
        Ok(self.read()?.routes.iter().find(|r| r.id == id).cloned())
    }
}

impl EntityStore for InMemoryStore {
    fn insert_entity(&self, entity: Entity) -> Result<(), StoreError> {
        let mut state = self.write()?;
        match entity {
            Entity::Transport(transport) => state.transports.push(transport),
            Entity::Shipment(shipment) => state.shipments.push(shipment),
        }
        Ok(())
    }

    fn delete_transport(&self, id: TransportId) -> Result<bool, StoreError> {
        let mut state = self.write()?;
        let before = state.transports.len();
        state.transports.retain(|t| t.id != id);
        if state.transports.len() == before {
            return Ok(false);
        }
        state.plannings.retain(|p| p.transport != id);
        Ok(true)
    }

    fn delete_shipment(&self, id: ShipmentId) -> Result<bool, StoreError> {
        let mut state = self.write()?;
        let before = state.shipments.len();
        state.shipments.retain(|s| s.id != id);
        if state.shipments.len() == before {
            return Ok(false);
        }
        state.plannings.retain(|p| p.shipment != id);
        Ok(true)
    }

    fn transport(&self, id: TransportId) -> Result<Option<Transport>, StoreError> {
        Ok(self.read()?.transports.iter().find(|t| t.id == id).cloned())
    }

    fn shipment(&self, id: ShipmentId) -> Result<Option<Shipment>, StoreError> {
        Ok(self.read()?.shipments.iter().find(|s| s.id == id).cloned())
    }

    fn transports(&self) -> Result<Vec<Transport>, StoreError> {
        Ok(self.read()?.transports.clone())
    }

    fn shipments(&self) -> Result<Vec<Shipment>, StoreError> {
        Ok(self.read()?.shipments.clone())
    }

    fn unplanned_transports(&self) -> Result<Vec<Transport>, StoreError> {
        let state = self.read()?;
        let planned = state.planned_transports();
        Ok(state
            .transports
            .iter()
            .filter(|t| !planned.contains(&t.id))
            .cloned()
            .collect())
    }

    fn unplanned_shipments(&self) -> Result<Vec<Shipment>, StoreError> {
        let state = self.read()?;
        let planned = state.planned_shipments();
        Ok(state
            .shipments
            .iter()
            .filter(|s| !planned.contains(&s.id))
            .cloned()
            .collect())
    }

    fn planning(&self, id: PlanningId) -> Result<Option<Planning>, StoreError> {
        Ok(self.read()?.plannings.iter().find(|p| p.id == id).cloned())
    }

    fn plannings(&self) -> Result<Vec<Planning>, StoreError> {
        Ok(self.read()?.plannings.clone())
    }

    fn commit_plannings(&self, batch: &[NewPlanning]) -> Result<Vec<Planning>, StoreError> {
        let mut state = self.write()?;
        state.validate_batch(batch)?;

        let committed: Vec<Planning> = batch
            .iter()
            .map(|new| Planning {
                id: PlanningId::new(),
                transport: new.transport,
                shipment: new.shipment,
                route: new.route,
            })
            .collect();
        state.plannings.extend(committed.iter().cloned());
        Ok(committed)
    }

    fn set_planning_route(&self, id: PlanningId, route: RouteId) -> Result<(), StoreError> {
        let mut state = self.write()?;
        if !state.routes.iter().any(|r| r.id == route) {
            return Err(StoreError::UnknownRoute(route));
        }
        let planning = state
            .plannings
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::UnknownPlanning(id))?;
        planning.route = Some(route);
        Ok(())
    }

    fn delete_planning(&self, id: PlanningId) -> Result<bool, StoreError> {
        let mut state = self.write()?;
        let before = state.plannings.len();
        state.plannings.retain(|p| p.id != id);
        Ok(state.plannings.len() != before)
    }

    fn clear_plannings(&self) -> Result<usize, StoreError> {
        let mut state = self.write()?;
        let removed = state.plannings.len();
        state.plannings.clear();
        Ok(removed)
    }

    fn clear_all(&self) -> Result<(), StoreError> {
        *self.write()? = StoreState::default();
        Ok(())
    }
}
