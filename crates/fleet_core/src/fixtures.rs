//! Seed data for demos, benchmarks and tests.

use std::ops::Range;

use rand::Rng;

use crate::error::AllocationError;
use crate::geo::{CoordinateError, Point};
use crate::model::{Entity, EntityKind, Location};
use crate::store::{EntityStore, StoreError};

/// `(address, latitude, longitude)` of European capitals.
pub const EUROPEAN_CAPITALS: &[(&str, f64, f64)] = &[
    ("Amsterdam, Netherlands", 52.3676, 4.9041),
    ("Andorra la Vella, Andorra", 42.5063, 1.5218),
    ("Athens, Greece", 37.9838, 23.7275),
    ("Belgrade, Serbia", 44.7866, 20.4489),
    ("Berlin, Germany", 52.5200, 13.4050),
    ("Bern, Switzerland", 46.9480, 7.4474),
    ("Bratislava, Slovakia", 48.1486, 17.1077),
    ("Brussels, Belgium", 50.8503, 4.3517),
    ("Bucharest, Romania", 44.4268, 26.1025),
    ("Budapest, Hungary", 47.4979, 19.0402),
    ("Chisinau, Moldova", 47.0105, 28.8638),
    ("Copenhagen, Denmark", 55.6761, 12.5683),
    ("Dublin, Ireland", 53.3498, -6.2603),
    ("Helsinki, Finland", 60.1699, 24.9384),
    ("Kyiv, Ukraine", 50.4501, 30.5234),
    ("Lisbon, Portugal", 38.7223, -9.1393),
    ("Ljubljana, Slovenia", 46.0569, 14.5058),
    ("London, United Kingdom", 51.5074, -0.1278),
    ("Luxembourg, Luxembourg", 49.6116, 6.1319),
    ("Madrid, Spain", 40.4168, -3.7038),
    ("Minsk, Belarus", 53.9006, 27.5590),
    ("Monaco, Monaco", 43.7384, 7.4246),
    ("Oslo, Norway", 59.9139, 10.7522),
    ("Paris, France", 48.8566, 2.3522),
    ("Podgorica, Montenegro", 42.4304, 19.2594),
    ("Prague, Czech Republic", 50.0755, 14.4378),
    ("Reykjavik, Iceland", 64.1466, -21.9426),
    ("Riga, Latvia", 56.9496, 24.1052),
    ("Rome, Italy", 41.9028, 12.4964),
    ("San Marino, San Marino", 43.9424, 12.4578),
    ("Sarajevo, Bosnia and Herzegovina", 43.8563, 18.4131),
    ("Skopje, North Macedonia", 41.9981, 21.4254),
    ("Sofia, Bulgaria", 42.6977, 23.3219),
    ("Stockholm, Sweden", 59.3293, 18.0686),
    ("Tallinn, Estonia", 59.4370, 24.7536),
    ("Tirana, Albania", 41.3275, 19.8187),
    ("Vaduz, Liechtenstein", 47.1410, 9.5209),
    ("Valletta, Malta", 35.8989, 14.5146),
    ("Vienna, Austria", 48.2082, 16.3738),
    ("Vilnius, Lithuania", 54.6872, 25.2797),
    ("Warsaw, Poland", 52.2297, 21.0122),
    ("Zagreb, Croatia", 45.8150, 15.9819),
];

/// Bounding box used by [`random_location`] (roughly Uzbekistan).
pub const RANDOM_LATITUDE_RANGE: Range<f64> = 37.0..45.0;
pub const RANDOM_LONGITUDE_RANGE: Range<f64> = 56.0..73.0;

/// Seed `store` with one entity per European capital: transports at even
/// indices (`"Transport {i}"`), shipments at odd ones (`"Shipment {i}"`).
pub fn european_capital_factory<S>(store: &S) -> Result<Vec<Entity>, AllocationError>
where
    S: EntityStore + ?Sized,
{
    let mut created = Vec::with_capacity(EUROPEAN_CAPITALS.len());
    for (i, &(address, latitude, longitude)) in EUROPEAN_CAPITALS.iter().enumerate() {
        let location = Location::new(Point::new(latitude, longitude)?, Some(address.to_string()));
        let entity = if i % 2 == 0 {
            Entity::new(EntityKind::Transport, format!("Transport {i}"), location)
        } else {
            Entity::new(EntityKind::Shipment, format!("Shipment {i}"), location)
        };
        store.insert_entity(entity.clone())?;
        created.push(entity);
    }
    tracing::info!(entities = created.len(), "seeded european capitals");
    Ok(created)
}

/// A uniformly random point inside the fixed bounding box.
pub fn random_location<R: Rng + ?Sized>(rng: &mut R) -> Result<Point, CoordinateError> {
    Point::new(
        rng.gen_range(RANDOM_LATITUDE_RANGE),
        rng.gen_range(RANDOM_LONGITUDE_RANGE),
    )
}

/// Remove every entity, planning and cached route.
pub fn reset_data<S>(store: &S) -> Result<(), StoreError>
where
    S: EntityStore + ?Sized,
{
    store.clear_all()?;
    tracing::info!("store reset");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::store::InMemoryStore;

    #[test]
    fn capitals_alternate_between_kinds() {
        let store = InMemoryStore::new();
        let created = european_capital_factory(&store).expect("seed");

        assert_eq!(created.len(), EUROPEAN_CAPITALS.len());
        assert_eq!(created[0].kind(), EntityKind::Transport);
        assert_eq!(created[0].name(), "Transport 0");
        assert_eq!(created[1].kind(), EntityKind::Shipment);
        assert_eq!(created[1].name(), "Shipment 1");
        assert_eq!(
            created[4].location().address.as_deref(),
            Some("Berlin, Germany")
        );

        let transports = store.transports().expect("transports");
        let shipments = store.shipments().expect("shipments");
        assert_eq!(transports.len(), EUROPEAN_CAPITALS.len().div_ceil(2));
        assert_eq!(shipments.len(), EUROPEAN_CAPITALS.len() / 2);
    }

    #[test]
    fn random_location_is_seeded_and_bounded() {
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let p = random_location(&mut a).expect("in range");
            assert_eq!(p, random_location(&mut b).expect("in range"));
            assert!(RANDOM_LATITUDE_RANGE.contains(&p.latitude()));
            assert!(RANDOM_LONGITUDE_RANGE.contains(&p.longitude()));
        }
    }

    #[test]
    fn reset_clears_everything() {
        let store = InMemoryStore::new();
        european_capital_factory(&store).expect("seed");
        reset_data(&store).expect("reset");
        assert!(store.transports().expect("transports").is_empty());
        assert!(store.shipments().expect("shipments").is_empty());
    }
}
