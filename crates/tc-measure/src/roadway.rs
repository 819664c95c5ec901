//! Roadway-sensor measurements and their delimited-row format.
//!
//! # Row format
//!
//! Nine `;`-separated fields, one header row:
//!
//! ```text
//! count_point_id;count_point_name;measure_datetime;flow;occupancy;speed;flow_conf;occupancy_conf;speed_conf
//! 101;"SiteA";2024-05-01T08:00:00+0000;120.5;0.3;65.2;A;A;A
//! ```
//!
//! | Field | Meaning                                                         |
//! |-------|-----------------------------------------------------------------|
//! | 0     | integer count-point id (becomes the sensor id)                  |
//! | 1     | site name, optionally quoted                                    |
//! | 2     | `%Y-%m-%dT%H:%M:%S%z`, normalized to UTC and made zone-less     |
//! | 3–5   | flow (veh/h), occupancy (fraction), speed (km/h); blank = absent|
//! | 6–8   | confidence tags, kept verbatim (may be empty)                   |
//!
//! A blank numeric field is `None`, never `0`.  A missing value and a missing
//! confidence tag are tracked independently.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use chrono::DateTime;
use csv::StringRecord;
use tracing::{debug, warn};

use tc_core::{TcError, TcResult, kph_to_mps, naive_utc, seconds_of_day};
use tc_model::{Flow, FlowTemplate};

use crate::measurement::{Measurement, MeasurementHeader};

pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";
const FIELD_COUNT: usize = 9;

// ── RoadwaySensorMeasurement ──────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct RoadwaySensorMeasurement {
    header:               MeasurementHeader,
    count_point_id:       i64,
    count_point_name:     String,
    /// veh/h.
    flow:                 Option<f64>,
    /// Fraction of time the detector is occupied.
    occupancy:            Option<f64>,
    /// km/h.
    speed:                Option<f64>,
    flow_confidence:      String,
    occupancy_confidence: String,
    speed_confidence:     String,
}

impl Measurement for RoadwaySensorMeasurement {
    fn header(&self) -> &MeasurementHeader {
        &self.header
    }
}

impl RoadwaySensorMeasurement {
    /// The sensor id is the decimal `count_point_id`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        count_point_id:   i64,
        count_point_name: impl Into<String>,
        timestamp:        impl Into<tc_core::RawTimestamp>,
        flow:             Option<f64>,
        occupancy:        Option<f64>,
        speed:            Option<f64>,
        confidence:       [String; 3],
    ) -> TcResult<Self> {
        let [flow_confidence, occupancy_confidence, speed_confidence] = confidence;
        Ok(Self {
            header: MeasurementHeader::new(timestamp, count_point_id.to_string())?,
            count_point_id,
            count_point_name: count_point_name.into(),
            flow,
            occupancy,
            speed,
            flow_confidence,
            occupancy_confidence,
            speed_confidence,
        })
    }

    pub fn count_point_id(&self) -> i64 { self.count_point_id }
    pub fn count_point_name(&self) -> &str { &self.count_point_name }
    pub fn flow(&self) -> Option<f64> { self.flow }
    pub fn occupancy(&self) -> Option<f64> { self.occupancy }
    pub fn speed(&self) -> Option<f64> { self.speed }
    pub fn flow_confidence(&self) -> &str { &self.flow_confidence }
    pub fn occupancy_confidence(&self) -> &str { &self.occupancy_confidence }
    pub fn speed_confidence(&self) -> &str { &self.speed_confidence }

    /// Map this point-in-time reading onto the calibration window that ends
    /// one second before it: `[sod - period, sod - 1]`, where `sod` is the
    /// seconds-of-day of the UTC timestamp (rows with an offset are shifted).
    ///
    /// The date is dropped, so every measurement combined into one calibrator
    /// must come from the same simulated day.  Speed is converted to m/s;
    /// flow is already in veh/h.
    pub fn to_calibrator_flow(&self, period: f64, template: &FlowTemplate) -> Flow {
        let sod = f64::from(seconds_of_day(&self.timestamp()));
        let flow = Flow::new(sod - period, sod - 1.0).with_rate(self.flow, self.speed.map(kph_to_mps));
        template.stamp(flow)
    }
}

/// One flow per measurement, in input order.
pub fn measurements_to_flows<'a>(
    measurements: impl IntoIterator<Item = &'a RoadwaySensorMeasurement>,
    period:       f64,
    template:     &FlowTemplate,
) -> Vec<Flow> {
    measurements
        .into_iter()
        .map(|m| m.to_calibrator_flow(period, template))
        .collect()
}

/// Group by site name.  Within a group, input order is kept.
pub fn aggregate_by_site(
    measurements: impl IntoIterator<Item = RoadwaySensorMeasurement>,
) -> BTreeMap<String, Vec<RoadwaySensorMeasurement>> {
    let mut grouped: BTreeMap<String, Vec<RoadwaySensorMeasurement>> = BTreeMap::new();
    for m in measurements {
        grouped.entry(m.count_point_name.clone()).or_default().push(m);
    }
    grouped
}

// ── Row parsing ───────────────────────────────────────────────────────────────

/// Parse one data row (no header).
pub fn parse_measurement_row(line: &str, delimiter: u8) -> TcResult<RoadwaySensorMeasurement> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());
    let mut record = StringRecord::new();
    match reader.read_record(&mut record) {
        Ok(true) => from_record(&record),
        Ok(false) => Err(TcError::Parse("empty measurement row".to_owned())),
        Err(e) => Err(TcError::Parse(e.to_string())),
    }
}

/// Parse a whole export: header row skipped, blank lines ignored, first bad
/// row aborts.
pub fn parse_measurements(content: &str, delimiter: u8) -> TcResult<Vec<RoadwaySensorMeasurement>> {
    parse_measurements_reader(content.as_bytes(), delimiter)
}

/// Like [`parse_measurements`] but reading from any `Read` source.
pub fn parse_measurements_reader<R: Read>(reader: R, delimiter: u8) -> TcResult<Vec<RoadwaySensorMeasurement>> {
    let mut rows = Vec::new();
    for (i, record) in records(reader, delimiter).enumerate() {
        let record = record?;
        let row = from_record(&record).map_err(|e| with_line(e, i + 2))?;
        rows.push(row);
    }
    debug!(rows = rows.len(), "measurement rows parsed");
    Ok(rows)
}

/// Load a measurement export from disk.
pub fn load_measurements_csv(path: &Path, delimiter: u8) -> TcResult<Vec<RoadwaySensorMeasurement>> {
    let file = std::fs::File::open(path)?;
    parse_measurements_reader(file, delimiter)
}

/// Skip-bad-row policy: malformed rows are logged and dropped.
pub fn parse_measurements_lenient(content: &str, delimiter: u8) -> Vec<RoadwaySensorMeasurement> {
    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for (i, record) in records(content.as_bytes(), delimiter).enumerate() {
        match record.and_then(|r| from_record(&r)) {
            Ok(row) => rows.push(row),
            Err(e) => {
                skipped += 1;
                warn!(line = i + 2, error = %e, "skipping measurement row");
            }
        }
    }
    debug!(rows = rows.len(), skipped, "measurement rows parsed (lenient)");
    rows
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn records<R: Read>(reader: R, delimiter: u8) -> impl Iterator<Item = TcResult<StringRecord>> {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader)
        .into_records()
        .map(|r| r.map_err(|e| TcError::Parse(e.to_string())))
}

fn with_line(e: TcError, line: usize) -> TcError {
    match e {
        TcError::Parse(msg) => TcError::Parse(format!("line {line}: {msg}")),
        other => other,
    }
}

fn from_record(record: &StringRecord) -> TcResult<RoadwaySensorMeasurement> {
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
    let timestamp = DateTime::parse_from_str(field(2).trim(), DATETIME_FORMAT)
        .map_err(|e| TcError::Parse(format!("invalid timestamp {:?}: {e}", field(2))))?;

    RoadwaySensorMeasurement::new(
        count_point_id,
        field(1).trim_matches('"'),
        naive_utc(&timestamp),
        optional_float(field(3), "flow")?,
        optional_float(field(4), "occupancy")?,
        optional_float(field(5), "speed")?,
        [field(6).to_owned(), field(7).to_owned(), field(8).to_owned()],
    )
}

pub(crate) fn optional_float(s: &str, name: &str) -> TcResult<Option<f64>> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    s.parse::<f64>()
        .map(Some)
        .map_err(|_| TcError::Parse(format!("invalid {name} {s:?}")))
}
