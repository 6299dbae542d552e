use thiserror::Error;

/// Errors returned by a [`RouteProvider`](super::RouteProvider).
#[derive(Debug, Error)]
pub enum RoutingError {
    #[cfg(feature = "osrm")]
    #[error("routing request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("routing request timed out")]
    Timeout,
    #[error("routing service returned {0}")]
    Api(String),
    #[error("no route between the given points")]
    NoRoute,
}
