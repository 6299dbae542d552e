#![allow(dead_code)]

pub mod store;

use fleet_core::geo::Point;
use fleet_core::model::{Entity, EntityKind, Shipment, Transport};
use fleet_core::planning::PlanningService;
use fleet_core::store::EntityStore;
use fleet_core::test_helpers::test_point;

/// Create a transport through the service.
pub fn add_transport<S: EntityStore + 'static>(
    svc: &PlanningService<S>,
    name: &str,
    at: (f64, f64),
) -> Transport {
    match svc
        .create_entity(EntityKind::Transport, name, test_point(at), None)
        .expect("create transport")
    {
        Entity::Transport(transport) => transport,
        Entity::Shipment(_) => unreachable!("created a shipment for a transport request"),
    }
}

/// Create a shipment through the service.
pub fn add_shipment<S: EntityStore + 'static>(
    svc: &PlanningService<S>,
    name: &str,
    at: (f64, f64),
) -> Shipment {
    match svc
        .create_entity(EntityKind::Shipment, name, test_point(at), None)
        .expect("create shipment")
    {
        Entity::Shipment(shipment) => shipment,
        Entity::Transport(_) => unreachable!("created a transport for a shipment request"),
    }
}

/// Cities far enough apart that every cross pairing exceeds 500 km.
pub const BERLIN: (f64, f64) = (52.5200, 13.4050);
pub const MADRID: (f64, f64) = (40.4168, -3.7038);
pub const ROME: (f64, f64) = (41.9028, 12.4964);
pub const PARIS: (f64, f64) = (48.8566, 2.3522);
pub const WARSAW: (f64, f64) = (52.2297, 21.0122);

pub fn point(at: (f64, f64)) -> Point {
    test_point(at)
}
