//! Edge and lane values plus the locator contract.

use tc_core::GeoPoint;

/// One lane of an edge.  Lane ids follow the simulator's `<edge>_<index>`
/// convention.
#[derive(Clone, Debug, PartialEq)]
pub struct Lane {
    pub id:            String,
    pub edge_id:       String,
    pub index:         u32,
    pub length_m:      f64,
    pub max_speed_mps: f64,
    /// Vehicle classes allowed on the lane.  Empty means unrestricted.
    pub allowed_types: Vec<String>,
}

/// A directed road edge with its geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    pub id:        String,
    pub from_node: String,
    pub to_node:   String,
    pub length_m:  f64,
    pub lanes:     Vec<Lane>,
    /// Polyline from `from_node` to `to_node`.
    pub shape:     Vec<GeoPoint>,
}

impl Edge {
    pub fn lane_ids(&self) -> Vec<String> {
        self.lanes.iter().map(|l| l.id.clone()).collect()
    }
}

/// Result of snapping a point onto the network.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeHit {
    pub edge_id:  String,
    /// Distance in metres along the edge shape to the projected point.
    pub offset_m: f64,
    /// Distance in metres from the query point to the edge.
    pub distance_m: f64,
}

/// Geometry lookups consumed by sensor → calibrator/detector conversion.
///
/// Implementations must be pure: the same query always yields the same hit.
pub trait NetworkLocator {
    /// The closest edge within `radius_m` of `point`, if any.
    fn closest_edge(&self, point: GeoPoint, radius_m: f64) -> Option<EdgeHit>;

    /// Lane ids of `edge_id` in index order.  Unknown edges have no lanes.
    fn lane_ids(&self, edge_id: &str) -> Vec<String>;
}
