//! Distance resolution: persisted route cache first, configured provider second.

use std::sync::Arc;

use crate::error::AllocationError;
use crate::geo::{round_km, Point};
use crate::model::Location;
use crate::routing::{FallbackPolicy, GeodesicRouteProvider, RouteProvider, RouteResult};
use crate::store::RouteStore;

/// Resolves the empty distance between a transport location and a shipment location.
///
/// The strategy (provider) and the fallback policy are fixed at construction.
/// Resolution never writes to the route store; persisting a route is an
/// explicit planning action.
pub struct DistanceResolver {
    routes: Arc<dyn RouteStore>,
    provider: Arc<dyn RouteProvider>,
    fallback: FallbackPolicy,
}

impl DistanceResolver {
    pub fn new(
        routes: Arc<dyn RouteStore>,
        provider: Arc<dyn RouteProvider>,
        fallback: FallbackPolicy,
    ) -> Self {
        Self {
            routes,
            provider,
            fallback,
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Distance in whole kilometres from `from` to `to`.
    ///
    /// A cached route for the directed `(from.id, to.id)` pair is authoritative
    /// and returned as stored.
    pub fn resolve(&self, from: &Location, to: &Location) -> Result<f64, AllocationError> {
        if let Some(route) = self.routes.find_route(from.id, to.id)? {
            return Ok(route.distance_km);
        }
        let route = self.fetch_route(from.point, to.point)?;
        Ok(route.distance_km)
    }

    /// Compute a full route (distance rounded to whole kilometres, optional
    /// waypoints) with the configured provider, applying the fallback policy.
    pub fn fetch_route(&self, from: Point, to: Point) -> Result<RouteResult, AllocationError> {
        let mut route = match self.provider.route(from, to) {
            Ok(route) => route,
            Err(source) => match self.fallback {
                FallbackPolicy::Abort => {
                    return Err(AllocationError::DistanceUnavailable { from, to, source })
                }
                FallbackPolicy::Geodesic => {
                    tracing::warn!(
                        provider = self.provider.name(),
                        %from,
                        %to,
                        error = %source,
                        "route provider failed, using geodesic distance"
                    );
                    GeodesicRouteProvider
                        .route(from, to)
                        .map_err(|source| AllocationError::DistanceUnavailable { from, to, source })?
                }
            },
        };
        route.distance_km = round_km(route.distance_km);
        Ok(route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewRoute;
    use crate::routing::RoutingError;
    use crate::store::InMemoryStore;

    struct UnreachableProvider;

    impl RouteProvider for UnreachableProvider {
        fn route(&self, _from: Point, _to: Point) -> Result<RouteResult, RoutingError> {
            Err(RoutingError::Timeout)
        }

        fn name(&self) -> &'static str {
            "unreachable"
        }
    }

    fn new_york() -> Location {
        Location::new(Point::new(40.7128, -74.0060).expect("valid"), None)
    }

    fn los_angeles() -> Location {
        Location::new(Point::new(34.0522, -118.2437).expect("valid"), None)
    }

    fn build(
        store: Arc<InMemoryStore>,
        provider: Arc<dyn RouteProvider>,
        fallback: FallbackPolicy,
    ) -> DistanceResolver {
        DistanceResolver::new(store, provider, fallback)
    }

    #[test]
    fn computes_rounded_geodesic_distance() {
        let store = Arc::new(InMemoryStore::new());
        let resolver = build(store, Arc::new(GeodesicRouteProvider), FallbackPolicy::Abort);
        let distance = resolver.resolve(&new_york(), &los_angeles()).expect("distance");
        assert_eq!(distance, 3944.0);
    }

    #[test]
    fn cached_route_takes_precedence() {
        let store = Arc::new(InMemoryStore::new());
        let (from, to) = (new_york(), los_angeles());
        store
            .insert_route(NewRoute {
                start: from.id,
                end: to.id,
                distance_km: 4490.0,
                polyline: None,
            })
            .expect("insert");

        let resolver = build(store, Arc::new(UnreachableProvider), FallbackPolicy::Abort);
        assert_eq!(resolver.resolve(&from, &to).expect("distance"), 4490.0);
    }

    #[test]
    fn cache_lookup_is_by_location_identity() {
        let store = Arc::new(InMemoryStore::new());
        let (from, to) = (new_york(), los_angeles());
        store
            .insert_route(NewRoute {
                start: from.id,
                end: to.id,
                distance_km: 1.0,
                polyline: None,
            })
            .expect("insert");

        // same coordinates, different identity
        let twin = Location::new(from.point, None);
        let resolver = build(store, Arc::new(GeodesicRouteProvider), FallbackPolicy::Abort);
        assert_eq!(resolver.resolve(&twin, &to).expect("distance"), 3944.0);
    }

    #[test]
    fn provider_failure_aborts_without_fallback() {
        let store = Arc::new(InMemoryStore::new());
        let resolver = build(store, Arc::new(UnreachableProvider), FallbackPolicy::Abort);
        let err = resolver.resolve(&new_york(), &los_angeles()).unwrap_err();
        assert!(matches!(
            err,
            AllocationError::DistanceUnavailable {
                source: RoutingError::Timeout,
                ..
            }
        ));
    }

    #[test]
    fn provider_failure_falls_back_to_geodesic() {
        let store = Arc::new(InMemoryStore::new());
        let resolver = build(store, Arc::new(UnreachableProvider), FallbackPolicy::Geodesic);
        assert_eq!(resolver.resolve(&new_york(), &los_angeles()).expect("distance"), 3944.0);
    }

    #[test]
    fn resolution_does_not_populate_cache() {
        let store = Arc::new(InMemoryStore::new());
        let (from, to) = (new_york(), los_angeles());
        let resolver = build(store.clone(), Arc::new(GeodesicRouteProvider), FallbackPolicy::Abort);
        resolver.resolve(&from, &to).expect("distance");
        assert_eq!(store.find_route(from.id, to.id).expect("read"), None);
    }
}
