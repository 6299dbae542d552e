//! Planning workflow on top of an [`EntityStore`]: optimal batch planning,
//! manual pairing, cancellation, route requests and the planning-set summary.

use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use uuid::Uuid;

use crate::allocation::AllocationService;
use crate::config::FleetConfig;
use crate::cost_matrix::CostMatrixBuilder;
use crate::error::AllocationError;
use crate::geo::{round_km, Point};
use crate::import::parse_entities;
use crate::matching::HungarianSolver;
use crate::model::{
    Entity, EntityKind, Location, NewPlanning, NewRoute, Planning, PlanningId, Route, Shipment,
    ShipmentId, Transport, TransportId,
};
use crate::resolver::DistanceResolver;
use crate::routing::{build_route_provider, RouteProvider};
use crate::store::{EntityStore, RouteStore, StoreError};
use crate::timing::OperationTimer;

/// Manual pairing of one transport with one shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanningRequest {
    pub transport: TransportId,
    pub shipment: ShipmentId,
}

/// Snapshot of the current planning state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanningSet {
    pub plannings: Vec<Planning>,
    /// Routes attached to plannings, in planning order.
    pub routes: Vec<Route>,
    pub unplanned_transports: Vec<Transport>,
    pub unplanned_shipments: Vec<Shipment>,
    /// Rounded sum of the attached routes' distances.
    pub total_empty_km: f64,
}

pub struct PlanningService<S> {
    store: Arc<S>,
    resolver: Arc<DistanceResolver>,
    allocation: AllocationService,
    slow_threshold: Duration,
}

impl<S: EntityStore + 'static> PlanningService<S> {
    /// Build the service with the route provider described by `config.routing`.
    pub fn new(store: Arc<S>, config: &FleetConfig) -> Result<Self, AllocationError> {
        let provider = build_route_provider(&config.routing).map_err(AllocationError::Provider)?;
        Self::with_provider(store, provider, config)
    }

    /// Build the service around an explicit route provider.
    pub fn with_provider(
        store: Arc<S>,
        provider: Arc<dyn RouteProvider>,
        config: &FleetConfig,
    ) -> Result<Self, AllocationError> {
        let routes: Arc<dyn RouteStore> = store.clone();
        let resolver = Arc::new(DistanceResolver::new(routes, provider, config.routing.fallback));
        let builder = CostMatrixBuilder::new(Arc::clone(&resolver), config.worker_threads)?;
        let allocation =
            AllocationService::new(builder, Box::new(HungarianSolver), config.max_empty_km);

        tracing::debug!(
            provider = resolver.provider_name(),
            fallback = ?config.routing.fallback,
            max_empty_km = config.max_empty_km,
            "planning service ready"
        );

        Ok(Self {
            store,
            resolver,
            allocation,
            slow_threshold: Duration::from_millis(config.slow_operation_ms),
        })
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn resolver(&self) -> &DistanceResolver {
        &self.resolver
    }

    pub fn allocation(&self) -> &AllocationService {
        &self.allocation
    }

    fn timer(&self, operation: &'static str) -> OperationTimer {
        OperationTimer::start(operation, self.slow_threshold)
    }

    /// Allocate every unplanned transport/shipment optimally and commit the
    /// accepted pairs as one batch. Cached routes are attached when present.
    ///
    /// Returns the committed plannings; a repeated call without intervening
    /// changes commits nothing.
    pub fn apply_optimal_planning(
        &self,
        max_empty_km: Option<f64>,
    ) -> Result<Vec<Planning>, AllocationError> {
        let _timer = self.timer("apply_optimal_planning");

        let transports = self.store.unplanned_transports()?;
        let shipments = self.store.unplanned_shipments()?;
        let allocation = self.allocation.allocate(&transports, &shipments, max_empty_km)?;
        if allocation.is_empty() {
            tracing::info!(
                unplanned_transports = transports.len(),
                unplanned_shipments = shipments.len(),
                "no plannings to commit"
            );
            return Ok(Vec::new());
        }

        let transport_locations: HashMap<TransportId, &Location> =
            transports.iter().map(|t| (t.id, &t.location)).collect();
        let shipment_locations: HashMap<ShipmentId, &Location> =
            shipments.iter().map(|s| (s.id, &s.location)).collect();

        let mut batch = Vec::with_capacity(allocation.len());
        for assignment in &allocation {
            let start = transport_locations
                .get(&assignment.transport)
                .ok_or(AllocationError::TransportNotFound(assignment.transport))?;
            let end = shipment_locations
                .get(&assignment.shipment)
                .ok_or(AllocationError::ShipmentNotFound(assignment.shipment))?;
            let route = self.store.find_route(start.id, end.id)?.map(|r| r.id);
            batch.push(NewPlanning {
                transport: assignment.transport,
                shipment: assignment.shipment,
                route,
            });
        }

        let committed = self.store.commit_plannings(&batch)?;
        tracing::info!(
            committed = committed.len(),
            total_empty_km = allocation.total_distance_km(),
            unplanned_transports = transports.len() - committed.len(),
            unplanned_shipments = shipments.len() - committed.len(),
            "optimal planning applied"
        );
        Ok(committed)
    }

    /// Commit a single planning for the requested pair.
    pub fn apply_planning(&self, request: PlanningRequest) -> Result<Planning, AllocationError> {
        let _timer = self.timer("apply_planning");

        let transport = self.find_transport(request.transport)?;
        let shipment = self.find_shipment(request.shipment)?;
        let route = self
            .store
            .find_route(transport.location.id, shipment.location.id)?
            .map(|r| r.id);

        let planning = self
            .store
            .commit_plannings(&[NewPlanning {
                transport: transport.id,
                shipment: shipment.id,
                route,
            }])?
            .pop()
            .ok_or_else(|| StoreError::Unavailable("commit returned no planning".into()))?;

        tracing::info!(
            planning = %planning.id,
            transport = %planning.transport,
            shipment = %planning.shipment,
            "planning applied"
        );
        Ok(planning)
    }

    pub fn cancel_planning(&self, id: PlanningId) -> Result<(), AllocationError> {
        let _timer = self.timer("cancel_planning");
        if !self.store.delete_planning(id)? {
            return Err(AllocationError::PlanningNotFound(id));
        }
        tracing::info!(planning = %id, "planning cancelled");
        Ok(())
    }

    /// Delete every planning. Returns how many were removed.
    pub fn reset_planning(&self) -> Result<usize, AllocationError> {
        let _timer = self.timer("reset_planning");
        let removed = self.store.clear_plannings()?;
        tracing::info!(removed, "plannings reset");
        Ok(removed)
    }

    /// The cached route from the transport's location to the shipment's, if any.
    pub fn get_route_existing(
        &self,
        transport: &Transport,
        shipment: &Shipment,
    ) -> Result<Option<Route>, AllocationError> {
        Ok(self
            .store
            .find_route(transport.location.id, shipment.location.id)?)
    }

    /// The cached route for the pair, computing and persisting it when missing.
    pub fn get_route(
        &self,
        transport: &Transport,
        shipment: &Shipment,
    ) -> Result<Route, AllocationError> {
        let _timer = self.timer("get_route");
        if let Some(route) = self.get_route_existing(transport, shipment)? {
            return Ok(route);
        }

        let result = self
            .resolver
            .fetch_route(transport.location.point, shipment.location.point)?;
        let polyline = (!result.waypoints.is_empty()).then_some(result.waypoints);
        let route = self.store.insert_route(NewRoute {
            start: transport.location.id,
            end: shipment.location.id,
            distance_km: result.distance_km,
            polyline,
        })?;

        tracing::debug!(
            route = %route.id,
            distance_km = route.distance_km,
            provider = self.resolver.provider_name(),
            "route stored"
        );
        Ok(route)
    }

    /// Fetch (or reuse) the route of a planning and attach it.
    ///
    /// Returns `None` when the planning does not exist.
    pub fn request_route(&self, id: PlanningId) -> Result<Option<Route>, AllocationError> {
        let _timer = self.timer("request_route");
        let Some(planning) = self.store.planning(id)? else {
            return Ok(None);
        };

        let transport = self.find_transport(planning.transport)?;
        let shipment = self.find_shipment(planning.shipment)?;
        let route = self.get_route(&transport, &shipment)?;
        self.store.set_planning_route(id, route.id)?;
        Ok(Some(route))
    }

    /// Attach existing cached routes to plannings that have none, then
    /// summarize the current state.
    pub fn get_planning_set(&self) -> Result<PlanningSet, AllocationError> {
        let _timer = self.timer("get_planning_set");
        self.attach_existing_routes()?;

        let plannings = self.store.plannings()?;
        let mut routes = Vec::new();
        for route_id in plannings.iter().filter_map(|p| p.route) {
            if let Some(route) = self.store.route(route_id)? {
                routes.push(route);
            }
        }
        let total_empty_km = round_km(routes.iter().map(|r| r.distance_km).sum());

        Ok(PlanningSet {
            plannings,
            routes,
            unplanned_transports: self.store.unplanned_transports()?,
            unplanned_shipments: self.store.unplanned_shipments()?,
            total_empty_km,
        })
    }

    /// Waypoint lists of the set's routes that carry a polyline.
    pub fn get_planning_polylines(&self, set: &PlanningSet) -> Vec<Vec<(f64, f64)>> {
        set.routes
            .iter()
            .filter_map(|route| route.polyline.clone())
            .collect()
    }

    pub fn create_entity(
        &self,
        kind: EntityKind,
        name: impl Into<String>,
        point: Point,
        address: Option<String>,
    ) -> Result<Entity, AllocationError> {
        let _timer = self.timer("create_entity");
        let entity = Entity::new(kind, name, Location::new(point, address));
        self.store.insert_entity(entity.clone())?;
        tracing::debug!(kind = ?kind, name = entity.name(), "entity created");
        Ok(entity)
    }

    /// Create every entity of a tab-separated table (see [`crate::import`]).
    ///
    /// The whole table is parsed first, so a malformed row creates nothing.
    pub fn import_entities<R: Read>(&self, reader: R) -> Result<Vec<Entity>, AllocationError> {
        let _timer = self.timer("import_entities");
        let records = parse_entities(reader)?;
        let entities = records
            .into_iter()
            .map(|r| self.create_entity(r.kind, r.name, r.point, r.address))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::info!(count = entities.len(), "entities imported");
        Ok(entities)
    }

    /// Delete a transport or shipment together with its planning.
    pub fn delete_entity(&self, kind: EntityKind, id: Uuid) -> Result<(), AllocationError> {
        let _timer = self.timer("delete_entity");
        match kind {
            EntityKind::Transport => {
                let id = TransportId(id);
                if !self.store.delete_transport(id)? {
                    return Err(AllocationError::TransportNotFound(id));
                }
            }
            EntityKind::Shipment => {
                let id = ShipmentId(id);
                if !self.store.delete_shipment(id)? {
                    return Err(AllocationError::ShipmentNotFound(id));
                }
            }
        }
        tracing::debug!(kind = ?kind, %id, "entity deleted");
        Ok(())
    }

    fn attach_existing_routes(&self) -> Result<(), AllocationError> {
        for planning in self.store.plannings()? {
            if planning.route.is_some() {
                continue;
            }
            let transport = self.find_transport(planning.transport)?;
            let shipment = self.find_shipment(planning.shipment)?;
            if let Some(route) = self.get_route_existing(&transport, &shipment)? {
                self.store.set_planning_route(planning.id, route.id)?;
            }
        }
        Ok(())
    }

    fn find_transport(&self, id: TransportId) -> Result<Transport, AllocationError> {
        self.store
            .transport(id)?
            .ok_or(AllocationError::TransportNotFound(id))
    }

    fn find_shipment(&self, id: ShipmentId) -> Result<Shipment, AllocationError> {
        self.store
            .shipment(id)?
            .ok_or(AllocationError::ShipmentNotFound(id))
    }
}
