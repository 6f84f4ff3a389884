//! Region identifier codec.
//!
//! Every monitored region carries an identifier that losslessly encodes the
//! originating `(node_id, beacon_id)` pair. Encoding is prefix + node id +
//! `/` + beacon id; the prefix distinguishes fyr's regions from anything else
//! the OS might be tracking, and `/` is a safe delimiter because node ids
//! are constrained to an alphanumeric/`_`/`-` charset.
//!
//! Decoding fails closed: identifiers that do not carry the prefix, or that
//! have no `/` after it, are foreign and yield no match rather than a panic.

use serde::{Deserialize, Serialize};

use crate::beacon::Beacon;

/// Prefix marking region identifiers produced by this engine. Must not
/// contain `/`.
pub const REGION_IDENTIFIER_PREFIX: &str = "fyr-beacon-";

/// A circular geofence derived from a beacon, as handed to the OS
/// monitoring primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Encoded identifier; see [`region_identifier`].
    pub identifier: String,

    /// Latitude in degrees.
    pub latitude: f64,

    /// Longitude in degrees.
    pub longitude: f64,

    /// Radius in meters. One configured value is used for all regions.
    pub radius: f64,
}

impl Region {
    /// Builds the monitoring region for a beacon.
    #[must_use]
    pub fn from_beacon(beacon: &Beacon, radius: f64) -> Self {
        Self {
            identifier: region_identifier(beacon),
            latitude: beacon.latitude,
            longitude: beacon.longitude,
            radius,
        }
    }
}

/// The pair recovered from a region identifier this engine produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRegion {
    /// The originating node id.
    pub node_id: String,

    /// The trailing beacon id segment. Present only to disambiguate several
    /// beacons on one node within the monitor set; the entry event handler
    /// does not use it.
    pub beacon_id: Option<i64>,
}

/// Encodes a beacon into its region identifier.
///
/// A node may have multiple beacons, so the beacon id is appended.
#[must_use]
pub fn region_identifier(beacon: &Beacon) -> String {
    format!(
        "{REGION_IDENTIFIER_PREFIX}{}/{}",
        beacon.node_id, beacon.id
    )
}

/// Decodes a region identifier back to its node id and beacon id.
///
/// Returns `None` for any identifier this engine did not produce: a missing
/// prefix, or no `/` after the prefix.
#[must_use]
pub fn decode_region_identifier(identifier: &str) -> Option<DecodedRegion> {
    let rest = identifier.strip_prefix(REGION_IDENTIFIER_PREFIX)?;
    let slash = rest.find('/')?;

    let node_id = rest[..slash].to_string();
    let beacon_id = rest[slash + 1..].parse::<i64>().ok();

    Some(DecodedRegion { node_id, beacon_id })
}
