//! Minimal OSRM `/route` JSON structures and their conversion into [`RouteResult`].

use serde::Deserialize;

use super::error::RoutingError;
use super::RouteResult;

#[derive(Debug, Deserialize)]
pub(super) struct OsrmRouteResponse {
    pub(super) code: String,
    pub(super) routes: Option<Vec<OsrmRoute>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OsrmRoute {
    pub(super) distance: f64, // metres
    pub(super) duration: f64, // seconds
    pub(super) geometry: Option<OsrmGeometry>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OsrmGeometry {
    pub(super) coordinates: Vec<[f64; 2]>, // [lng, lat]
}

pub(super) fn parse_route_response(resp: OsrmRouteResponse) -> Result<RouteResult, RoutingError> {
    if resp.code != "Ok" {
        return Err(RoutingError::Api(resp.code));
    }

    let route = resp
        .routes
        .and_then(|routes| routes.into_iter().next())
        .ok_or(RoutingError::NoRoute)?;

    if !route.distance.is_finite() || route.distance < 0.0 {
        return Err(RoutingError::Api(format!(
            "invalid route distance {}",
            route.distance
        )));
    }

    // OSRM returns [lng, lat], we store (lat, lng)
    let waypoints = route
        .geometry
        .map(|geometry| {
            geometry
                .coordinates
                .iter()
                .map(|c| (c[1], c[0]))
                .collect()
        })
        .unwrap_or_default();

    Ok(RouteResult {
        waypoints,
        distance_km: route.distance / 1000.0,
        duration_secs: Some(route.duration),
    })
}
