//! Staleness check between the fetched beacon list and the last-known one.

use std::collections::HashSet;

use crate::beacon::Beacon;

/// Decides whether the monitor set must be re-registered.
///
/// Re-registration is needed iff geofencing is enabled AND the lists differ
/// in length OR some beacon in `new` has an id absent from `prev`. This is a
/// one-directional set difference by id, not a symmetric diff.
///
/// A beacon whose coordinates moved but whose id is unchanged does NOT
/// trigger re-registration. That gap is intentional and must not be closed
/// here without a matching change to the authority's id semantics.
///
/// An empty `new` list is a teardown, handled by the scheduler before the
/// diff is ever consulted.
#[must_use]
pub fn needs_reregistration(new: &[Beacon], prev: &[Beacon], enabled: bool) -> bool {
    if !enabled {
        return false;
    }

    if new.len() != prev.len() {
        return true;
    }

    let prev_ids: HashSet<i64> = prev.iter().map(|b| b.id).collect();
    new.iter().any(|b| !prev_ids.contains(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beacon(id: i64, latitude: f64, longitude: f64) -> Beacon {
        Beacon {
            id,
            account_id: 1,
            node_id: format!("node-{id}"),
            query: "q".to_string(),
            latitude,
            longitude,
        }
    }

    #[test]
    fn test_disabled_never_needs_reregistration() {
        assert!(!needs_reregistration(&[], &[], false));
        assert!(!needs_reregistration(&[beacon(1, 0.0, 0.0)], &[], false));
    }

    #[test]
    fn test_equal_empty_lists() {
        assert!(!needs_reregistration(&[], &[], true));
    }

    #[test]
    fn test_length_change_triggers() {
        let prev = vec![beacon(1, 10.0, 10.0)];
        let new = vec![beacon(1, 10.0, 10.0), beacon(2, 20.0, 20.0)];
        assert!(needs_reregistration(&new, &prev, true));
        assert!(needs_reregistration(&prev, &new, true));
    }

    #[test]
    fn test_new_id_triggers() {
        let prev = vec![beacon(1, 10.0, 10.0), beacon(2, 20.0, 20.0)];
        let new = vec![beacon(1, 10.0, 10.0), beacon(3, 30.0, 30.0)];
        assert!(needs_reregistration(&new, &prev, true));
    }

    #[test]
    fn test_unchanged_ids_do_not_trigger() {
        let prev = vec![beacon(1, 10.0, 10.0), beacon(2, 20.0, 20.0)];
        let new = vec![beacon(2, 20.0, 20.0), beacon(1, 10.0, 10.0)];
        assert!(!needs_reregistration(&new, &prev, true));
    }

    #[test]
    fn test_moved_coordinates_do_not_trigger() {
        // Documented gap: same id, different coordinates.
        let prev = vec![beacon(1, 10.0, 10.0)];
        let new = vec![beacon(1, 99.0, 99.0)];
        assert!(!needs_reregistration(&new, &prev, true));
    }
}
