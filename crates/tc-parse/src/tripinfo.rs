//! Per-trip summary documents (`<tripinfos><tripinfo .../></tripinfos>`).

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tc_core::TcResult;

use crate::attrs::Attrs;
use crate::stream::{RecordShape, RecordStream};

/// Summary of one completed (or vaporized) trip.  Times are simulation
/// seconds, positions metres, speeds m/s.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TripRecord {
    pub id:            String,
    pub depart:        f64,
    pub depart_lane:   String,
    pub depart_pos:    f64,
    pub depart_speed:  f64,
    pub depart_delay:  f64,
    pub arrival:       f64,
    pub arrival_lane:  String,
    pub arrival_pos:   f64,
    pub arrival_speed: f64,
    pub duration:      f64,
    pub route_length:  f64,
    pub waiting_time:  f64,
    pub waiting_count: i32,
    pub stop_time:     f64,
    pub time_loss:     f64,
    pub reroute_no:    i32,
    pub devices:       String,
    pub v_type:        String,
    pub speed_factor:  f64,
    pub vaporized:     String,
}

impl TripRecord {
    fn from_attrs(a: &Attrs) -> TcResult<Self> {
        Ok(Self {
            id:            a.string("id"),
            depart:        a.float("depart")?,
            depart_lane:   a.string("departLane"),
            depart_pos:    a.float("departPos")?,
            depart_speed:  a.float("departSpeed")?,
            depart_delay:  a.float("departDelay")?,
            arrival:       a.float("arrival")?,
            arrival_lane:  a.string("arrivalLane"),
            arrival_pos:   a.float("arrivalPos")?,
            arrival_speed: a.float("arrivalSpeed")?,
            duration:      a.float("duration")?,
            route_length:  a.float("routeLength")?,
            waiting_time:  a.float("waitingTime")?,
            waiting_count: a.int("waitingCount")?,
            stop_time:     a.float("stopTime")?,
            time_loss:     a.float("timeLoss")?,
            reroute_no:    a.int("rerouteNo")?,
            devices:       a.string("devices"),
            v_type:        a.string("vType"),
            speed_factor:  a.float("speedFactor")?,
            vaporized:     a.string("vaporized"),
        })
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TripInfo;

impl RecordShape for TripInfo {
    type Partial = TripRecord;
    type Record = TripRecord;

    const TAG: &'static [u8] = b"tripinfo";

    fn open(&self, attrs: &Attrs) -> TcResult<TripRecord> {
        TripRecord::from_attrs(attrs)
    }

    // Device children (<emissions>, <battery>, ...) are not summarised.

    fn finish(&self, partial: TripRecord) -> TcResult<TripRecord> {
        Ok(partial)
    }
}

pub fn stream_tripinfo_reader<R: BufRead>(reader: R) -> RecordStream<R, TripInfo> {
    RecordStream::new(reader, TripInfo)
}

pub fn stream_tripinfo_file(path: &Path) -> TcResult<RecordStream<BufReader<File>, TripInfo>> {
    RecordStream::from_file(path, TripInfo)
}

pub fn parse_tripinfo_reader<R: BufRead>(reader: R) -> TcResult<Vec<TripRecord>> {
    stream_tripinfo_reader(reader).collect()
}

pub fn parse_tripinfo_str(xml: &str) -> TcResult<Vec<TripRecord>> {
    parse_tripinfo_reader(xml.as_bytes())
}

pub fn parse_tripinfo_file(path: &Path) -> TcResult<Vec<TripRecord>> {
    stream_tripinfo_file(path)?.collect()
}
