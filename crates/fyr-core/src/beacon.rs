//! Beacon wire model and validation.
//!
//! A beacon is a remote point of interest owned by the authority. The client
//! never persists beacons; every sync cycle refetches the full list and the
//! only durable trace of a past cycle is whatever regions are currently
//! registered with the OS.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{FyrError, Result};

/// Node ids are opaque references into the upstream graph. The upstream type
/// constrains them to this charset, which is what makes `/` safe as a
/// structural delimiter in region identifiers.
static NODE_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("node id regex is valid"));

/// A remote point of interest to watch for proximity.
///
/// `id` is unique within a single fetch response. `node_id` may repeat across
/// beacons: one logical place can carry more than one beacon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Beacon {
    /// Stable, unique beacon id.
    pub id: i64,

    /// Owning account.
    pub account_id: i64,

    /// Opaque reference to the upstream node this beacon belongs to.
    pub node_id: String,

    /// Display label (the saved query the beacon was created from).
    pub query: String,

    /// Latitude in degrees.
    pub latitude: f64,

    /// Longitude in degrees.
    pub longitude: f64,
}

/// Ephemeral payload built when a region entry event fires. Never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    /// Node id recovered from the region identifier.
    pub node_id: String,

    /// Deep link opened when the user taps the alert.
    pub tana_url: String,
}

/// Parses the remote beacon list from a raw JSON body.
///
/// Any deviation from the wire schema (missing field, wrong type) is a hard
/// validation failure; the caller must not fall back to stale data.
///
/// # Errors
///
/// Returns [`FyrError::DataShape`] if the body is not a JSON array of
/// well-formed beacon objects.
pub fn parse_beacon_list(body: &str) -> Result<Vec<Beacon>> {
    serde_json::from_str(body).map_err(|err| FyrError::DataShape(err.to_string()))
}

/// Returns `true` if `node_id` matches the upstream node-id charset
/// (alphanumeric, `_`, `-`).
#[must_use]
pub fn is_valid_node_id(node_id: &str) -> bool {
    !node_id.is_empty() && NODE_ID_RE.is_match(node_id)
}

/// Builds the deep link into Tana for a node id.
#[must_use]
pub fn to_tana_url(node_id: &str) -> String {
    format!("https://app.tana.inc?nodeid={node_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beacon_json() -> &'static str {
        r#"[{"id":1,"accountId":7,"nodeId":"abc123x","query":"coffee","latitude":59.91,"longitude":10.75}]"#
    }

    #[test]
    fn test_parse_beacon_list() {
        let beacons = parse_beacon_list(beacon_json()).unwrap();
        assert_eq!(beacons.len(), 1);
        assert_eq!(beacons[0].id, 1);
        assert_eq!(beacons[0].account_id, 7);
        assert_eq!(beacons[0].node_id, "abc123x");
        assert_eq!(beacons[0].query, "coffee");
    }

    #[test]
    fn test_parse_empty_list() {
        assert!(parse_beacon_list("[]").unwrap().is_empty());
    }

    #[test]
    fn test_missing_field_is_data_shape_error() {
        let body = r#"[{"id":1,"accountId":7,"query":"coffee","latitude":1.0,"longitude":2.0}]"#;
        let err = parse_beacon_list(body).unwrap_err();
        assert!(matches!(err, FyrError::DataShape(_)));
    }

    #[test]
    fn test_mistyped_field_is_data_shape_error() {
        let body = r#"[{"id":"one","accountId":7,"nodeId":"n","query":"q","latitude":1.0,"longitude":2.0}]"#;
        assert!(matches!(
            parse_beacon_list(body).unwrap_err(),
            FyrError::DataShape(_)
        ));
    }

    #[test]
    fn test_non_array_body_is_data_shape_error() {
        assert!(matches!(
            parse_beacon_list(r#"{"error":"nope"}"#).unwrap_err(),
            FyrError::DataShape(_)
        ));
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let body = r#"[{"id":1,"accountId":7,"nodeId":"n0d3-id","query":"q","latitude":1.0,"longitude":2.0,"extra":true}]"#;
        assert_eq!(parse_beacon_list(body).unwrap().len(), 1);
    }

    #[test]
    fn test_node_id_charset() {
        assert!(is_valid_node_id("abc123"));
        assert!(is_valid_node_id("A_b-9"));
        assert!(!is_valid_node_id(""));
        assert!(!is_valid_node_id("has/slash"));
        assert!(!is_valid_node_id("has space"));
    }

    #[test]
    fn test_tana_url() {
        assert_eq!(to_tana_url("abc123"), "https://app.tana.inc?nodeid=abc123");
    }
}
