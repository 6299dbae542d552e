//! Layered configuration: built-in defaults, an optional file, then `FLEET__*`
//! environment variables.
//!
//! ```text
//! FLEET__MAX_EMPTY_KM=500
//! FLEET__ROUTING__FALLBACK=geodesic
//! FLEET__ROUTING__TIMEOUT_MS=2000
//! ```

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};

pub use config::ConfigError;
use serde::{Deserialize, Serialize};

use crate::routing::{FallbackPolicy, RouteProviderKind};

/// Default maximum empty distance for a single pairing (km).
pub const DEFAULT_MAX_EMPTY_KM: f64 = 3_000.0;

/// Operations slower than this are logged at warn level (ms).
pub const DEFAULT_SLOW_OPERATION_MS: u64 = 500;

const DEFAULT_ROUTE_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_ROUTE_CACHE_CAPACITY: usize = 20_000;
const ENV_PREFIX: &str = "FLEET";

/// Distance strategy settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub provider: RouteProviderKind,
    /// Upper bound for a single networked route request.
    pub timeout_ms: u64,
    pub fallback: FallbackPolicy,
    /// In-process memo size for networked providers.
    pub cache_capacity: usize,
}

impl RoutingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            provider: RouteProviderKind::Geodesic,
            timeout_ms: DEFAULT_ROUTE_TIMEOUT_MS,
            fallback: FallbackPolicy::Abort,
            cache_capacity: DEFAULT_ROUTE_CACHE_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    /// Threshold used when the caller does not supply one.
    pub max_empty_km: f64,
    /// Cost-matrix worker pool size. `None` uses one thread per CPU.
    pub worker_threads: Option<usize>,
    pub slow_operation_ms: u64,
    pub routing: RoutingConfig,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            max_empty_km: DEFAULT_MAX_EMPTY_KM,
            worker_threads: None,
            slow_operation_ms: DEFAULT_SLOW_OPERATION_MS,
            routing: RoutingConfig::default(),
        }
    }
}

impl FleetConfig {
    /// Load defaults, then `path` (format chosen by extension) when given, then
    /// `FLEET__*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env_prefix(path, ENV_PREFIX)
    }

    fn load_with_env_prefix(path: Option<&Path>, prefix: &str) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&FleetConfig::default())?);
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder
            .add_source(
                Environment::with_prefix(prefix)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
