//! Domain entities: locations, transports, shipments, cached routes and plannings.
//!
//! Identifiers are UUID newtypes so the different entity kinds cannot be mixed
//! up at call sites.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::Point;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

entity_id!(
    /// Identity routes are keyed by. Two locations at the same coordinates are still distinct.
    LocationId
);
entity_id!(TransportId);
entity_id!(ShipmentId);
entity_id!(RouteId);
entity_id!(PlanningId);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub point: Point,
    pub address: Option<String>,
}

impl Location {
    pub fn new(point: Point, address: Option<String>) -> Self {
        Self {
            id: LocationId::new(),
            point,
            address,
        }
    }
}

/// A mobile resource that can be sent to a shipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transport {
    pub id: TransportId,
    pub name: String,
    pub location: Location,
}

/// A work item waiting for a transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    pub id: ShipmentId,
    pub name: String,
    pub location: Location,
}

/// Which kind of entity a generic create/delete request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Transport,
    Shipment,
}

/// An entity created through [`EntityKind`].
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Transport(Transport),
    Shipment(Shipment),
}

impl Entity {
    /// Build a new entity of the given kind at a fresh location.
    pub fn new(kind: EntityKind, name: impl Into<String>, location: Location) -> Self {
        let name = name.into();
        match kind {
            EntityKind::Transport => Entity::Transport(Transport {
                id: TransportId::new(),
                name,
                location,
            }),
            EntityKind::Shipment => Entity::Shipment(Shipment {
                id: ShipmentId::new(),
                name,
                location,
            }),
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Transport(_) => EntityKind::Transport,
            Entity::Shipment(_) => EntityKind::Shipment,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Entity::Transport(transport) => &transport.name,
            Entity::Shipment(shipment) => &shipment.name,
        }
    }

    pub fn location(&self) -> &Location {
        match self {
            Entity::Transport(transport) => &transport.location,
            Entity::Shipment(shipment) => &shipment.location,
        }
    }
}

/// Cached distance (and optional path) between two locations. Directed and immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: RouteId,
    pub start: LocationId,
    pub end: LocationId,
    pub distance_km: f64,
    /// `(lat, lon)` waypoints.
    pub polyline: Option<Vec<(f64, f64)>>,
}

/// Route data before it has been stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRoute {
    pub start: LocationId,
    pub end: LocationId,
    pub distance_km: f64,
    pub polyline: Option<Vec<(f64, f64)>>,
}

/// A committed transport/shipment pairing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Planning {
    pub id: PlanningId,
    pub transport: TransportId,
    pub shipment: ShipmentId,
    pub route: Option<RouteId>,
}

/// Planning data before it has been committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewPlanning {
    pub transport: TransportId,
    pub shipment: ShipmentId,
    pub route: Option<RouteId>,
}
