//! Edge/lane mean-data documents.
//!
//! ```text
//! <meandata>
//!   <interval begin="0.00" end="300.00" id="dump_300">
//!     <edge id="e1" sampledSeconds="12.5" ...>
//!       <lane id="e1_0" ... speedRelative="0.61"/>
//!     </edge>
//!     <edge id="e2" sampledSeconds="3.0" .../>
//!   </interval>
//! </meandata>
//! ```
//!
//! An edge with lane children contributes one [`TrafficStats`] per lane (with
//! `speed_relative`); its own attributes are discarded.  An edge without lane
//! children contributes a single entry built from its own attributes, with no
//! `speed_relative`.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tc_core::TcResult;

use crate::attrs::Attrs;
use crate::stream::{RecordShape, RecordStream};

mod tag {
    pub const INTERVAL: &[u8] = b"interval";
    pub const EDGE:     &[u8] = b"edge";
    pub const LANE:     &[u8] = b"lane";
}

// ── Records ───────────────────────────────────────────────────────────────────

/// Aggregated traffic quantities of one edge or lane over an interval.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrafficStats {
    pub id:                String,
    pub sampled_seconds:   f64,
    pub travel_time:       f64,
    pub density:           f64,
    pub occupancy:         f64,
    pub waiting_time:      f64,
    pub speed:             f64,
    pub departed:          i32,
    pub arrived:           i32,
    pub entered:           i32,
    pub left:              i32,
    pub lane_changed_from: i32,
    pub lane_changed_to:   i32,
    /// Lane entries only.
    pub speed_relative:    Option<f64>,
}

impl TrafficStats {
    fn from_attrs(attrs: &Attrs, lane: bool) -> TcResult<Self> {
        Ok(Self {
            id:                attrs.string("id"),
            sampled_seconds:   attrs.float("sampledSeconds")?,
            travel_time:       attrs.float("traveltime")?,
            density:           attrs.float("density")?,
            occupancy:         attrs.float("occupancy")?,
            waiting_time:      attrs.float("waitingTime")?,
            speed:             attrs.float("speed")?,
            departed:          attrs.int("departed")?,
            arrived:           attrs.int("arrived")?,
            entered:           attrs.int("entered")?,
            left:              attrs.int("left")?,
            lane_changed_from: attrs.int("laneChangedFrom")?,
            lane_changed_to:   attrs.int("laneChangedTo")?,
            speed_relative:    if lane { Some(attrs.float("speedRelative")?) } else { None },
        })
    }
}

/// One aggregation interval: edge id → per-lane (or whole-edge) stats.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Interval {
    pub begin: f64,
    pub end:   f64,
    pub id:    String,
    pub data:  BTreeMap<String, Vec<TrafficStats>>,
}

impl Interval {
    /// All stats of the interval, paired with their edge id.
    pub fn stats(&self) -> impl Iterator<Item = (&str, &TrafficStats)> {
        self.data
            .iter()
            .flat_map(|(edge, stats)| stats.iter().map(move |s| (edge.as_str(), s)))
    }
}

// ── Shape ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default)]
pub struct MeanData;

/// An interval under construction.
#[derive(Debug, Default)]
pub struct PartialInterval {
    interval: Interval,
    edge:     Option<PartialEdge>,
}

#[derive(Debug)]
struct PartialEdge {
    id:    String,
    own:   TrafficStats,
    lanes: Vec<TrafficStats>,
}

impl RecordShape for MeanData {
    type Partial = PartialInterval;
    type Record = Interval;

    const TAG: &'static [u8] = tag::INTERVAL;

    fn open(&self, attrs: &Attrs) -> TcResult<PartialInterval> {
        Ok(PartialInterval {
            interval: Interval {
                begin: attrs.float("begin")?,
                end:   attrs.float("end")?,
                id:    attrs.string("id"),
                data:  BTreeMap::new(),
            },
            edge: None,
        })
    }

    fn child(&self, partial: &mut PartialInterval, depth: usize, name: &[u8], attrs: &Attrs) -> TcResult<()> {
        match (depth, name) {
            (1, tag::EDGE) => {
                partial.edge = Some(PartialEdge {
                    id:    attrs.string("id"),
                    own:   TrafficStats::from_attrs(attrs, false)?,
                    lanes: Vec::new(),
                });
            }
            (2, tag::LANE) => {
                if let Some(edge) = partial.edge.as_mut() {
                    edge.lanes.push(TrafficStats::from_attrs(attrs, true)?);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn close_child(&self, partial: &mut PartialInterval, depth: usize, name: &[u8]) -> TcResult<()> {
        if depth == 1 && name == tag::EDGE {
            if let Some(edge) = partial.edge.take() {
                let stats = if edge.lanes.is_empty() { vec![edge.own] } else { edge.lanes };
                partial.interval.data.insert(edge.id, stats);
            }
        }
        Ok(())
    }

    fn finish(&self, partial: PartialInterval) -> TcResult<Interval> {
        Ok(partial.interval)
    }
}

// ── Entry points ──────────────────────────────────────────────────────────────

pub fn stream_meandata_reader<R: BufRead>(reader: R) -> RecordStream<R, MeanData> {
    RecordStream::new(reader, MeanData)
}

pub fn stream_meandata_file(path: &Path) -> TcResult<RecordStream<BufReader<File>, MeanData>> {
    RecordStream::from_file(path, MeanData)
}

pub fn parse_meandata_reader<R: BufRead>(reader: R) -> TcResult<Vec<Interval>> {
    stream_meandata_reader(reader).collect()
}

pub fn parse_meandata_str(xml: &str) -> TcResult<Vec<Interval>> {
    parse_meandata_reader(xml.as_bytes())
}

pub fn parse_meandata_file(path: &Path) -> TcResult<Vec<Interval>> {
    stream_meandata_file(path)?.collect()
}
