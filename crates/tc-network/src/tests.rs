//! Unit tests for tc-network.

use tc_core::GeoPoint;

use crate::{Edge, EdgeIndex, EdgeIndexBuilder, Lane, NetworkLocator};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn lane(edge: &str, index: u32) -> Lane {
    Lane {
        id:            format!("{edge}_{index}"),
        edge_id:       edge.to_owned(),
        index,
        length_m:      110.0,
        max_speed_mps: 13.89,
        allowed_types: vec![],
    }
}

/// Two parallel east-west edges ~111 m apart (0.001° latitude), each roughly
/// 74 m long at 48° N.
fn two_edges() -> EdgeIndex {
    let mut b = EdgeIndexBuilder::new();
    b.add_edge(Edge {
        id:        "north".into(),
        from_node: "n1".into(),
        to_node:   "n2".into(),
        length_m:  74.0,
        lanes:     vec![lane("north", 0), lane("north", 1)],
        shape:     vec![GeoPoint::new(2.000, 48.001), GeoPoint::new(2.001, 48.001)],
    });
    b.add_edge(Edge {
        id:        "south".into(),
        from_node: "s1".into(),
        to_node:   "s2".into(),
        length_m:  74.0,
        lanes:     vec![lane("south", 0)],
        shape:     vec![GeoPoint::new(2.000, 48.000), GeoPoint::new(2.001, 48.000)],
    });
    b.build()
}

// ── EdgeIndex ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod edge_index {
    use super::*;

    #[test]
    fn snaps_to_nearest_edge() {
        let index = two_edges();
        let hit = index.closest_edge(GeoPoint::new(2.0005, 48.00002), 10.0).unwrap();
        assert_eq!(hit.edge_id, "south");
        assert!(hit.distance_m < 3.0, "distance {}", hit.distance_m);
    }

    #[test]
    fn offset_measured_along_shape() {
        let index = two_edges();
        let hit = index.closest_edge(GeoPoint::new(2.0005, 48.0), 1.0).unwrap();
        // Half of ~74.4 m.
        assert!((hit.offset_m - 37.2).abs() < 0.5, "offset {}", hit.offset_m);
    }

    #[test]
    fn outside_radius_is_none() {
        let index = two_edges();
        // ~55 m from both edges.
        assert!(index.closest_edge(GeoPoint::new(2.0005, 48.0005), 5.0).is_none());
    }

    #[test]
    fn empty_index_is_none() {
        let index = EdgeIndexBuilder::new().build();
        assert!(index.is_empty());
        assert!(index.closest_edge(GeoPoint::new(0.0, 0.0), 1_000.0).is_none());
    }

    #[test]
    fn lane_ids_in_index_order() {
        let index = two_edges();
        assert_eq!(index.lane_ids("north"), vec!["north_0", "north_1"]);
        assert!(index.lane_ids("missing").is_empty());
    }
}
