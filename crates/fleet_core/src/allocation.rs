//! Optimal allocation of transports to shipments.
//!
//! One run builds the cost matrix, solves the assignment globally and keeps
//! only the pairs within the allowed empty distance.

use crate::cost_matrix::CostMatrixBuilder;
use crate::error::AllocationError;
use crate::matching::AssignmentSolver;
use crate::model::{Shipment, ShipmentId, Transport, TransportId};

/// One accepted transport/shipment pairing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assignment {
    pub transport: TransportId,
    pub shipment: ShipmentId,
    pub distance_km: f64,
}

/// Result of one optimization run, ordered by transport position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Allocation {
    assignments: Vec<Assignment>,
}

impl Allocation {
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// The assignment of `transport`, if it was allocated.
    pub fn get(&self, transport: TransportId) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.transport == transport)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Assignment> {
        self.assignments.iter()
    }

    pub fn total_distance_km(&self) -> f64 {
        self.assignments.iter().map(|a| a.distance_km).sum()
    }

    pub fn into_assignments(self) -> Vec<Assignment> {
        self.assignments
    }
}

impl<'a> IntoIterator for &'a Allocation {
    type Item = &'a Assignment;
    type IntoIter = std::slice::Iter<'a, Assignment>;

    fn into_iter(self) -> Self::IntoIter {
        self.assignments.iter()
    }
}

pub struct AllocationService {
    builder: CostMatrixBuilder,
    solver: Box<dyn AssignmentSolver>,
    default_max_empty_km: f64,
}

impl AllocationService {
    pub fn new(
        builder: CostMatrixBuilder,
        solver: Box<dyn AssignmentSolver>,
        default_max_empty_km: f64,
    ) -> Self {
        Self {
            builder,
            solver,
            default_max_empty_km,
        }
    }

    pub fn default_max_empty_km(&self) -> f64 {
        self.default_max_empty_km
    }

    /// Allocate `transports` to `shipments`, minimizing the total empty
    /// distance. Pairs farther apart than `max_empty_km` (the configured
    /// default when `None`) are dropped from the result.
    ///
    /// The order of both slices defines the matrix rows and columns, so the
    /// result is stable for a given input order.
    pub fn allocate(
        &self,
        transports: &[Transport],
        shipments: &[Shipment],
        max_empty_km: Option<f64>,
    ) -> Result<Allocation, AllocationError> {
        let max_empty_km = max_empty_km.unwrap_or(self.default_max_empty_km);
        if !max_empty_km.is_finite() || max_empty_km < 0.0 {
            return Err(AllocationError::InvalidThreshold(max_empty_km));
        }
        if transports.is_empty() || shipments.is_empty() {
            tracing::debug!(
                transports = transports.len(),
                shipments = shipments.len(),
                "nothing to allocate"
            );
            return Ok(Allocation::default());
        }

        let distances = self.builder.distances(transports, shipments)?;
        let pairs = self.solver.solve(&distances.penalized(max_empty_km));

        // Filter on the resolved distance; penalized cells only steer the solver.
        let assignments: Vec<Assignment> = pairs
            .into_iter()
            .filter_map(|(i, j)| {
                let distance_km = distances.get(i, j);
                (distance_km <= max_empty_km).then(|| Assignment {
                    transport: transports[i].id,
                    shipment: shipments[j].id,
                    distance_km,
                })
            })
            .collect();

        tracing::debug!(
            transports = transports.len(),
            shipments = shipments.len(),
            accepted = assignments.len(),
            max_empty_km,
            "allocation computed"
        );
        Ok(Allocation { assignments })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::geo::Point;
    use crate::matching::HungarianSolver;
    use crate::model::{Location, NewRoute};
    use crate::resolver::DistanceResolver;
    use crate::routing::{FallbackPolicy, GeodesicRouteProvider};
    use crate::store::{InMemoryStore, RouteStore};

    fn service(default_max_empty_km: f64) -> AllocationService {
        service_with_store(Arc::new(InMemoryStore::new()), default_max_empty_km)
    }

    fn service_with_store(store: Arc<InMemoryStore>, default_max_empty_km: f64) -> AllocationService {
        let resolver = Arc::new(DistanceResolver::new(
            store,
            Arc::new(GeodesicRouteProvider),
            FallbackPolicy::Abort,
        ));
        let builder = CostMatrixBuilder::new(resolver, Some(2)).expect("pool");
        AllocationService::new(builder, Box::new(HungarianSolver), default_max_empty_km)
    }

    fn at(lat: f64, lon: f64) -> Location {
        Location::new(Point::new(lat, lon).expect("valid"), None)
    }

    fn transport(name: &str, lat: f64, lon: f64) -> Transport {
        Transport {
            id: TransportId::new(),
            name: name.into(),
            location: at(lat, lon),
        }
    }

    fn shipment(name: &str, lat: f64, lon: f64) -> Shipment {
        Shipment {
            id: ShipmentId::new(),
            name: name.into(),
            location: at(lat, lon),
        }
    }

    #[test]
    fn coincident_pairs_form_the_diagonal() {
        let transports = vec![
            transport("Berlin", 52.52, 13.405),
            transport("Madrid", 40.4168, -3.7038),
            transport("Rome", 41.9028, 12.4964),
        ];
        let shipments = vec![
            shipment("Berlin", 52.52, 13.405),
            shipment("Madrid", 40.4168, -3.7038),
            shipment("Rome", 41.9028, 12.4964),
        ];

        let allocation = service(3_000.0)
            .allocate(&transports, &shipments, None)
            .expect("allocation");

        assert_eq!(allocation.len(), 3);
        assert_eq!(allocation.total_distance_km(), 0.0);
        for (t, s) in transports.iter().zip(&shipments) {
            assert_eq!(allocation.get(t.id).map(|a| a.shipment), Some(s.id));
        }
    }

    #[test]
    fn zero_threshold_without_zero_distance_pairs_is_empty() {
        let transports = vec![transport("Berlin", 52.52, 13.405)];
        let shipments = vec![shipment("Paris", 48.8566, 2.3522)];

        let allocation = service(3_000.0)
            .allocate(&transports, &shipments, Some(0.0))
            .expect("allocation");
        assert!(allocation.is_empty());
    }

    #[test]
    fn pairs_over_threshold_are_dropped() {
        // Lisbon is only reachable from Berlin beyond 1000 km.
        let transports = vec![
            transport("Berlin", 52.52, 13.405),
            transport("Prague", 50.0755, 14.4378),
        ];
        let shipments = vec![
            shipment("Warsaw", 52.2297, 21.0122),
            shipment("Lisbon", 38.7223, -9.1393),
        ];

        let allocation = service(1_000.0)
            .allocate(&transports, &shipments, None)
            .expect("allocation");

        assert_eq!(allocation.len(), 1);
        assert!(allocation.iter().all(|a| a.distance_km <= 1_000.0));
        assert!(allocation.iter().all(|a| a.shipment == shipments[0].id));
    }

    #[test]
    fn empty_side_is_not_an_error() {
        let svc = service(3_000.0);
        let allocation = svc
            .allocate(&[transport("Berlin", 52.52, 13.405)], &[], None)
            .expect("allocation");
        assert!(allocation.is_empty());
        assert!(svc.allocate(&[], &[], None).expect("allocation").is_empty());
    }

    #[test]
    fn rejects_invalid_thresholds() {
        let svc = service(3_000.0);
        for bad in [-1.0, f64::NAN, f64::INFINITY] {
            let err = svc.allocate(&[], &[], Some(bad)).unwrap_err();
            assert!(matches!(err, AllocationError::InvalidThreshold(_)));
        }
    }

    #[test]
    fn uses_configured_default_threshold() {
        let transports = vec![transport("Berlin", 52.52, 13.405)];
        let shipments = vec![shipment("Paris", 48.8566, 2.3522)];

        assert!(service(100.0)
            .allocate(&transports, &shipments, None)
            .expect("allocation")
            .is_empty());
        assert_eq!(
            service(3_000.0)
                .allocate(&transports, &shipments, None)
                .expect("allocation")
                .len(),
            1
        );
    }

    fn cache(store: &InMemoryStore, t: &Transport, s: &Shipment, distance_km: f64) {
        store
            .insert_route(NewRoute {
                start: t.location.id,
                end: s.location.id,
                distance_km,
                polyline: None,
            })
            .expect("insert");
    }

    #[test]
    fn over_threshold_pair_rejected_above_sentinel() {
        let store = Arc::new(InMemoryStore::new());
        let t = transport("New York", 40.7128, -74.0060);
        let s = shipment("Los Angeles", 34.0522, -118.2437);
        cache(&store, &t, &s, 2_000_000.0);

        let allocation = service_with_store(store, 3_000.0)
            .allocate(&[t], &[s], Some(1_500_000.0))
            .expect("allocation");
        assert!(allocation.is_empty());
    }

    #[test]
    fn feasible_pair_above_sentinel_beats_infeasible_one() {
        let store = Arc::new(InMemoryStore::new());
        let t = transport("New York", 40.7128, -74.0060);
        let near = shipment("Los Angeles", 34.0522, -118.2437);
        let far = shipment("Chicago", 41.8781, -87.6298);
        cache(&store, &t, &near, 2_000_000.0);
        cache(&store, &t, &far, 6_000_000.0);

        let allocation = service_with_store(store, 3_000.0)
            .allocate(&[t.clone()], &[near.clone(), far], Some(5_000_000.0))
            .expect("allocation");

        assert_eq!(allocation.len(), 1);
        let assignment = allocation.get(t.id).expect("assigned");
        assert_eq!(assignment.shipment, near.id);
        assert_eq!(assignment.distance_km, 2_000_000.0);
    }
}
