use std::time::Duration;

use reqwest::{blocking::Client, Url};

use crate::geo::Point;

use super::error::RoutingError;
use super::response::{parse_route_response, OsrmRouteResponse};
use super::{RouteProvider, RouteResult};

/// Routes via an OSRM HTTP endpoint (e.g. `http://localhost:5000`).
#[derive(Debug, Clone)]
pub struct OsrmRouteProvider {
    client: Client,
    endpoint: String,
}

impl OsrmRouteProvider {
    /// Create a provider whose requests are bounded by `timeout`.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, RoutingError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    fn route_url(&self, from: Point, to: Point) -> Result<Url, RoutingError> {
        let base = format!(
            "{}/route/v1/driving/{},{};{},{}",
            self.endpoint,
            from.longitude(),
            from.latitude(),
            to.longitude(),
            to.latitude(),
        );
        let mut url = Url::parse(&base)
            .map_err(|err| RoutingError::Api(format!("failed to build OSRM URL: {}", err)))?;
        url.query_pairs_mut()
            .append_pair("overview", "full")
            .append_pair("geometries", "geojson");
        Ok(url)
    }
}

fn classify(err: reqwest::Error) -> RoutingError {
    if err.is_timeout() {
        RoutingError::Timeout
    } else {
        RoutingError::Http(err)
    }
}

impl RouteProvider for OsrmRouteProvider {
    fn route(&self, from: Point, to: Point) -> Result<RouteResult, RoutingError> {
        let url = self.route_url(from, to)?;
        let response = self.client.get(url).send().map_err(classify)?;
        let parsed: OsrmRouteResponse = response.json().map_err(classify)?;
        parse_route_response(parsed)
    }

    fn name(&self) -> &'static str {
        "osrm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_uses_lon_lat_order() {
        let provider =
            OsrmRouteProvider::new("http://localhost:5000/", Duration::from_secs(1)).expect("client");
        let url = provider
            .route_url(
                Point::new(52.5, 13.4).expect("valid"),
                Point::new(48.1, 11.5).expect("valid"),
            )
            .expect("url");
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/route/v1/driving/13.4,52.5;11.5,48.1?overview=full&geometries=geojson"
        );
    }

    #[test]
    fn unreachable_endpoint_fails() {
        let provider =
            OsrmRouteProvider::new("http://127.0.0.1:9", Duration::from_millis(200)).expect("client");
        let a = Point::new(52.5, 13.4).expect("valid");
        assert!(provider.route(a, a).is_err());
    }
}
