//! Pluggable distance providers: trait abstraction for routing backends.
//!
//! Two implementations, selectable via [`RouteProviderKind`]:
//!
//! - **`GeodesicRouteProvider`**: WGS-84 geodesic distance. Zero dependencies, deterministic.
//! - **`OsrmRouteProvider`** (feature `osrm`): Calls a local/remote OSRM HTTP endpoint.
//!
//! Networked providers are wrapped in a [`CachedRouteProvider`] that memoizes
//! successful results in-process. That memo is separate from the persisted
//! route cache consulted by [`DistanceResolver`](crate::resolver::DistanceResolver).

mod error;
#[cfg(feature = "osrm")]
mod osrm;
#[cfg(any(feature = "osrm", test))]
mod response;

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lru::LruCache;
use serde::{Deserialize, Serialize};

use crate::config::RoutingConfig;
use crate::geo::{geodesic_km, Point};

pub use error::RoutingError;
#[cfg(feature = "osrm")]
pub use osrm::OsrmRouteProvider;

// ---------------------------------------------------------------------------
// Core types
// ---------------------------------------------------------------------------

/// Result of a route query between two points.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    /// Lat/lng waypoints along the road (empty for the geodesic provider).
    pub waypoints: Vec<(f64, f64)>,
    /// Distance in kilometres, unrounded.
    pub distance_km: f64,
    /// Free-flow travel time in seconds, when the backend reports one.
    pub duration_secs: Option<f64>,
}

/// Which routing backend to use.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RouteProviderKind {
    /// Ellipsoidal geodesic distance, no external dependencies.
    #[default]
    Geodesic,
    /// OSRM HTTP endpoint (e.g. `"http://localhost:5000"`).
    #[cfg(feature = "osrm")]
    Osrm { endpoint: String },
}

/// What to do when the configured provider cannot produce a distance.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Fail the whole computation with `DistanceUnavailable`.
    #[default]
    Abort,
    /// Log a warning and use the geodesic distance instead.
    Geodesic,
}

/// Trait for routing backends. Implementations must be `Send + Sync` so the
/// provider can be shared by the cost-matrix worker pool.
pub trait RouteProvider: Send + Sync {
    /// Compute a route between two points.
    fn route(&self, from: Point, to: Point) -> Result<RouteResult, RoutingError>;

    /// Short backend name used in log fields.
    fn name(&self) -> &'static str;
}

// ---------------------------------------------------------------------------
// Geodesic provider (always available)
// ---------------------------------------------------------------------------

/// Straight-line distance along the WGS-84 ellipsoid.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeodesicRouteProvider;

impl RouteProvider for GeodesicRouteProvider {
    fn route(&self, from: Point, to: Point) -> Result<RouteResult, RoutingError> {
        Ok(RouteResult {
            waypoints: Vec::new(),
            distance_km: geodesic_km(from, to),
            duration_secs: None,
        })
    }

    fn name(&self) -> &'static str {
        "geodesic"
    }
}

// ---------------------------------------------------------------------------
// Caching wrapper
// ---------------------------------------------------------------------------

type PairKey = [u64; 4];

fn pair_key(from: Point, to: Point) -> PairKey {
    [
        from.latitude().to_bits(),
        from.longitude().to_bits(),
        to.latitude().to_bits(),
        to.longitude().to_bits(),
    ]
}

/// LRU-cached wrapper around any [`RouteProvider`].
///
/// Cache key is the directed coordinate pair. Only successful results are
/// cached; failures are retried on the next call.
pub struct CachedRouteProvider {
    inner: Box<dyn RouteProvider>,
    cache: Mutex<LruCache<PairKey, RouteResult>>,
}

impl CachedRouteProvider {
    /// Create a caching wrapper with the given capacity (at least one entry).
    pub fn new(inner: Box<dyn RouteProvider>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Number of memoized routes.
    pub fn len(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RouteProvider for CachedRouteProvider {
    fn route(&self, from: Point, to: Point) -> Result<RouteResult, RoutingError> {
        let key = pair_key(from, to);

        // Fast path: cache hit. A poisoned lock only disables caching.
        if let Ok(mut cache) = self.cache.lock() {
            if let Some(cached) = cache.get(&key) {
                return Ok(cached.clone());
            }
        }

        let result = self.inner.route(from, to)?;

        if let Ok(mut cache) = self.cache.lock() {
            cache.put(key, result.clone());
        }

        Ok(result)
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}

// ---------------------------------------------------------------------------
// Factory: build a provider from configuration
// ---------------------------------------------------------------------------

/// Construct a shared [`RouteProvider`] from the routing configuration.
///
/// - `Geodesic` is returned without caching (it is already cheap).
/// - `Osrm` is wrapped in a [`CachedRouteProvider`].
pub fn build_route_provider(config: &RoutingConfig) -> Result<Arc<dyn RouteProvider>, RoutingError> {
    match &config.provider {
        RouteProviderKind::Geodesic => Ok(Arc::new(GeodesicRouteProvider)),

        #[cfg(feature = "osrm")]
        RouteProviderKind::Osrm { endpoint } => {
            let inner = Box::new(OsrmRouteProvider::new(endpoint, config.timeout())?);
            Ok(Arc::new(CachedRouteProvider::new(inner, config.cache_capacity)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl RouteProvider for CountingProvider {
        fn route(&self, _from: Point, _to: Point) -> Result<RouteResult, RoutingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(RoutingError::NoRoute);
            }
            Ok(RouteResult {
                waypoints: vec![(1.0, 2.0)],
                distance_km: 42.0,
                duration_secs: Some(60.0),
            })
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    fn points() -> (Point, Point) {
        (
            Point::new(52.52, 13.405).expect("valid"),
            Point::new(48.1351, 11.582).expect("valid"),
        )
    }

    #[test]
    fn geodesic_provider_has_no_waypoints() {
        let (a, b) = points();
        let route = GeodesicRouteProvider.route(a, b).expect("route");
        assert!(route.waypoints.is_empty());
        assert!(route.distance_km > 400.0 && route.distance_km < 550.0);
    }

    #[test]
    fn cache_hits_skip_inner_provider() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cached = CachedRouteProvider::new(
            Box::new(CountingProvider {
                calls: calls.clone(),
                fail: false,
            }),
            16,
        );
        let (a, b) = points();

        cached.route(a, b).expect("first");
        cached.route(a, b).expect("second");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // direction matters
        cached.route(b, a).expect("reverse");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cached.len(), 2);
    }

    #[test]
    fn failures_are_not_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cached = CachedRouteProvider::new(
            Box::new(CountingProvider {
                calls: calls.clone(),
                fail: true,
            }),
            16,
        );
        let (a, b) = points();

        assert!(cached.route(a, b).is_err());
        assert!(cached.route(a, b).is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(cached.is_empty());
    }

    #[test]
    fn route_provider_kind_default_is_geodesic() {
        assert_eq!(RouteProviderKind::default(), RouteProviderKind::Geodesic);
        let provider = build_route_provider(&RoutingConfig::default()).expect("provider");
        assert_eq!(provider.name(), "geodesic");
    }
}
