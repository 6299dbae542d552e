//! Test helpers for common test setup and utilities.
//!
//! This module provides shared test utilities to reduce duplication across test files.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::config::FleetConfig;
use crate::geo::Point;
use crate::model::{Location, Shipment, ShipmentId, Transport, TransportId};
use crate::planning::PlanningService;
use crate::routing::{FallbackPolicy, GeodesicRouteProvider, RouteProvider, RouteResult, RoutingError};
use crate::store::InMemoryStore;

/// New York City Hall.
pub const NEW_YORK: (f64, f64) = (40.7128, -74.0060);
/// Los Angeles City Hall.
pub const LOS_ANGELES: (f64, f64) = (34.0522, -118.2437);

/// Build a point from a coordinate pair.
///
/// # Panics
///
/// Panics if the coordinates are out of range.
pub fn test_point((lat, lon): (f64, f64)) -> Point {
    Point::new(lat, lon).expect("test coordinates should be valid")
}

pub fn test_transport(name: &str, at: (f64, f64)) -> Transport {
    Transport {
        id: TransportId::new(),
        name: name.to_string(),
        location: Location::new(test_point(at), None),
    }
}

pub fn test_shipment(name: &str, at: (f64, f64)) -> Shipment {
    Shipment {
        id: ShipmentId::new(),
        name: name.to_string(),
        location: Location::new(test_point(at), None),
    }
}

/// Configuration with a small worker pool, suitable for tests.
pub fn test_config() -> FleetConfig {
    FleetConfig {
        worker_threads: Some(2),
        ..FleetConfig::default()
    }
}

/// A planning service over a fresh in-memory store with the given provider.
///
/// # Panics
///
/// Panics if the worker pool cannot be built.
pub fn test_service_with(
    provider: Arc<dyn RouteProvider>,
    fallback: FallbackPolicy,
) -> PlanningService<InMemoryStore> {
    let mut config = test_config();
    config.routing.fallback = fallback;
    PlanningService::with_provider(Arc::new(InMemoryStore::new()), provider, &config)
        .expect("test service should build")
}

/// A planning service over a fresh in-memory store using geodesic distances.
pub fn test_service() -> PlanningService<InMemoryStore> {
    test_service_with(Arc::new(GeodesicRouteProvider), FallbackPolicy::Abort)
}

/// Route provider that always times out and counts how often it was asked.
#[derive(Debug, Default)]
pub struct FailingRouteProvider {
    calls: AtomicUsize,
}

impl FailingRouteProvider {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RouteProvider for FailingRouteProvider {
    fn route(&self, _from: Point, _to: Point) -> Result<RouteResult, RoutingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(RoutingError::Timeout)
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Route provider returning a fixed distance with a two-point polyline.
#[derive(Debug, Clone, Copy)]
pub struct FixedRouteProvider {
    pub distance_km: f64,
}

impl RouteProvider for FixedRouteProvider {
    fn route(&self, from: Point, to: Point) -> Result<RouteResult, RoutingError> {
        Ok(RouteResult {
            waypoints: vec![from.coordinates(), to.coordinates()],
            distance_km: self.distance_km,
            duration_secs: None,
        })
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}
