//! Sensor-site metadata: where a count point sits on the map.
//!
//! Rows are four `;`-separated fields with one header row:
//!
//! ```text
//! count_point_id;count_point_name;op_road_name;geometry
//! 101;"SiteA";"Main Street";POINT (2.1734 41.3851)
//! ```

use std::path::Path;

use tracing::debug;

use tc_core::{GeoPoint, TcError, TcResult};
use tc_model::{Calibrator, InductionLoop};
use tc_network::NetworkLocator;

const FIELD_COUNT: usize = 4;
const POINT_PREFIX: &str = "POINT (";
const POINT_SUFFIX: &str = ")";

#[derive(Clone, Debug, PartialEq)]
pub struct SensorSite {
    pub count_point_id:   i64,
    pub count_point_name: String,
    pub road_name:        String,
    pub location:         GeoPoint,
}

impl SensorSite {
    /// A calibrator on the closest edge within `radius_m`, placed at the
    /// snapped offset.  Further settings are chained on the result.
    pub fn to_calibrator(&self, locator: &dyn NetworkLocator, radius_m: f64) -> Option<Calibrator> {
        let hit = locator.closest_edge(self.location, radius_m)?;
        debug!(site = %self.count_point_name, edge = %hit.edge_id, offset = hit.offset_m, "site snapped");
        Some(Calibrator::on_edge(self.count_point_name.clone(), hit.edge_id).with_pos(hit.offset_m))
    }

    /// One detector per lane of the closest edge within `radius_m`.
    pub fn to_induction_loops(
        &self,
        locator:  &dyn NetworkLocator,
        radius_m: f64,
        file:     &Path,
    ) -> Vec<InductionLoop> {
        match locator.closest_edge(self.location, radius_m) {
            Some(hit) => induction_loops_for_lanes(
                &self.count_point_name,
                &locator.lane_ids(&hit.edge_id),
                hit.offset_m,
                file,
            ),
            None => {
                debug!(site = %self.count_point_name, "no edge within radius");
                Vec::new()
            }
        }
    }
}

/// Detectors named `<site>_<lane_id>`, all at `pos`, with `friendlyPos` set so
/// the simulator clamps positions past the lane end.
pub fn induction_loops_for_lanes(
    site_name: &str,
    lane_ids:  &[String],
    pos:       f64,
    file:      &Path,
) -> Vec<InductionLoop> {
    lane_ids
        .iter()
        .map(|lane| {
            InductionLoop::new(format!("{site_name}_{lane}"), lane.clone(), pos, file)
                .with_friendly_pos(true)
        })
        .collect()
}

// ── Parsing ───────────────────────────────────────────────────────────────────

pub fn parse_sensor_site_row(line: &str, delimiter: u8) -> TcResult<SensorSite> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());
    let mut record = csv::StringRecord::new();
    match reader.read_record(&mut record) {
        Ok(true) => from_record(&record),
        Ok(false) => Err(TcError::Parse("empty sensor row".to_owned())),
        Err(e) => Err(TcError::Parse(e.to_string())),
    }
}

/// Parse a whole sensor export, skipping the header row and blank lines.
pub fn parse_sensor_sites(content: &str, delimiter: u8) -> TcResult<Vec<SensorSite>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());
    let mut sites = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| TcError::Parse(e.to_string()))?;
        let site = from_record(&record).map_err(|e| match e {
            TcError::Parse(msg) => TcError::Parse(format!("line {}: {msg}", i + 2)),
            other => other,
        })?;
        sites.push(site);
    }
    debug!(sites = sites.len(), "sensor sites parsed");
    Ok(sites)
}

fn from_record(record: &csv::StringRecord) -> TcResult<SensorSite> {
    if record.len() < FIELD_COUNT {
        return Err(TcError::Parse(format!(
            "expected {FIELD_COUNT} fields, found {}",
            record.len()
        )));
    }
    let field = |i: usize| record.get(i).unwrap_or_default();
    let count_point_id = field(0)
        .trim()
        .parse::<i64>()
        .map_err(|_| TcError::Parse(format!("invalid count point id {:?}", field(0))))?;
    Ok(SensorSite {
        count_point_id,
        count_point_name: field(1).trim_matches('"').to_owned(),
        road_name:        field(2).trim_matches('"').to_owned(),
        location:         parse_point(field(3))?,
    })
}

/// `POINT (lon lat)` → `GeoPoint`.
fn parse_point(s: &str) -> TcResult<GeoPoint> {
    let inner = s.trim().replace(POINT_PREFIX, "").replace(POINT_SUFFIX, "");
    let mut coords = inner.split_whitespace().map(str::parse::<f64>);
    match (coords.next(), coords.next()) {
        (Some(Ok(lon)), Some(Ok(lat))) => Ok(GeoPoint::new(lon, lat)),
        _ => Err(TcError::Parse(format!("invalid point {s:?}"))),
    }
}
