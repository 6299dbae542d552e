pub mod allocation;
pub mod config;
pub mod cost_matrix;
pub mod error;
pub mod fixtures;
pub mod geo;
pub mod import;
pub mod matching;
pub mod model;
pub mod planning;
pub mod resolver;
pub mod routing;
pub mod store;
pub mod timing;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use allocation::{Allocation, AllocationService, Assignment};
pub use config::FleetConfig;
pub use error::AllocationError;
pub use planning::{PlanningRequest, PlanningService, PlanningSet};
