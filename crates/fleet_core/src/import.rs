//! Tab-separated entity import.
//!
//! Expected header: `kind`, `name`, `latitude`, `longitude` and an optional
//! `address` column. `kind` is `transport` or `shipment`. Blank addresses are
//! treated as absent. Fields are trimmed.

use std::io::Read;

use serde::Deserialize;
use thiserror::Error;

use crate::geo::{CoordinateError, Point};
use crate::model::EntityKind;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("malformed entity table: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line}: {source}")]
    Coordinate {
        line: u64,
        #[source]
        source: CoordinateError,
    },
    #[error("line {line}: entity name is empty")]
    MissingName { line: u64 },
}

#[derive(Debug, Deserialize)]
struct EntityRow {
    kind: EntityKind,
    name: String,
    latitude: f64,
    longitude: f64,
    address: Option<String>,
}

/// One validated row, ready to be created.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord {
    pub kind: EntityKind,
    pub name: String,
    pub point: Point,
    pub address: Option<String>,
}

/// Parse every row of a tab-separated entity table.
///
/// Nothing is returned unless all rows are valid.
pub fn parse_entities<R: Read>(reader: R) -> Result<Vec<EntityRecord>, ImportError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    for result in rdr.deserialize::<EntityRow>() {
        let row = result?;
        // header is line 1
        let line = records.len() as u64 + 2;
        if row.name.is_empty() {
            return Err(ImportError::MissingName { line });
        }
        let point = Point::new(row.latitude, row.longitude)
            .map_err(|source| ImportError::Coordinate { line, source })?;
        records.push(EntityRecord {
            kind: row.kind,
            name: row.name,
            point,
            address: row.address.filter(|a| !a.is_empty()),
        });
    }
    tracing::debug!(rows = records.len(), "entity table parsed");
    Ok(records)
}
