//! Unit tests for tc-parse.

use chrono::{NaiveDate, NaiveDateTime};

use tc_core::TcError;
use tc_measure::Measurement;

use crate::{
    parse_detector_str, parse_meandata_file, parse_meandata_str, parse_tripinfo_str,
    stream_meandata_reader, stream_tripinfo_reader,
};

// ── Fixtures ──────────────────────────────────────────────────────────────────

const MEANDATA: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!-- generated by the simulator -->
<meandata xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
    <interval begin="0.00" end="300.00" id="dump">
        <edge id="e1" sampledSeconds="99.0" speed="1.0">
            <lane id="e1_0" sampledSeconds="10.5" traveltime="7.2" density="3.1" occupancy="2.5"
                  waitingTime="0.00" speed="13.40" departed="2" arrived="1" entered="4" left="5"
                  laneChangedFrom="1" laneChangedTo="0" speedRelative="0.96"/>
            <lane id="e1_1" sampledSeconds="4.0" speed="12.00"/>
        </edge>
        <edge id="e2" sampledSeconds="3.0" speed="8.5" departed="1"/>
        <unknown foo="bar"/>
    </interval>
    <interval begin="300.00" end="600.00" id="dump">
        <edge id="e2" sampledSeconds="6.0" speed="9.0"/>
    </interval>
</meandata>
"#;

const TRIPINFO: &str = r#"<tripinfos>
    <tripinfo id="veh0" depart="10.00" departLane="e1_0" departPos="5.10" departSpeed="0.00"
              departDelay="2.00" arrival="130.00" arrivalLane="e9_0" arrivalPos="88.0"
              arrivalSpeed="11.2" duration="120.00" routeLength="1450.30" waitingTime="4.00"
              waitingCount="1" stopTime="0.00" timeLoss="28.00" rerouteNo="0"
              devices="tripinfo_veh0" vType="bus" speedFactor="1.02" vaporized=""/>
    <tripinfo id="veh1" depart="12.00" timeLoss="5.5" vType="car">
        <emissions CO2_abs="1234.5"/>
    </tripinfo>
</tripinfos>
"#;

fn midnight() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
}

// ── Mean data ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod meandata {
    use super::*;

    #[test]
    fn lanes_replace_edge_stats() {
        let intervals = parse_meandata_str(MEANDATA).unwrap();
        assert_eq!(intervals.len(), 2);

        let first = &intervals[0];
        assert_eq!((first.begin, first.end, first.id.as_str()), (0.0, 300.0, "dump"));
        let lanes = &first.data["e1"];
        assert_eq!(lanes.len(), 2);
        assert_eq!(lanes[0].id, "e1_0");
        assert_eq!(lanes[0].travel_time, 7.2);
        assert_eq!(lanes[0].left, 5);
        assert_eq!(lanes[0].speed_relative, Some(0.96));
        // Missing on the second lane.
        assert_eq!(lanes[1].speed_relative, Some(0.0));
        assert_eq!(lanes[1].departed, 0);
        assert!(lanes.iter().all(|l| l.sampled_seconds != 99.0));
    }

    #[test]
    fn edge_without_lanes_uses_own_stats() {
        let intervals = parse_meandata_str(MEANDATA).unwrap();
        let e2 = &intervals[0].data["e2"];
        assert_eq!(e2.len(), 1);
        assert_eq!(e2[0].id, "e2");
        assert_eq!(e2[0].speed, 8.5);
        assert_eq!(e2[0].departed, 1);
        assert_eq!(e2[0].speed_relative, None);
        assert_eq!(intervals[0].data.len(), 2, "unknown tags are skipped");
    }

    #[test]
    fn stats_iterator_pairs_edge_ids() {
        let intervals = parse_meandata_str(MEANDATA).unwrap();
        let ids: Vec<_> = intervals[0].stats().map(|(edge, s)| (edge, s.id.as_str())).collect();
        assert_eq!(ids, [("e1", "e1_0"), ("e1", "e1_1"), ("e2", "e2")]);
    }

    #[test]
    fn streaming_matches_whole_parse() {
        let whole = parse_meandata_str(MEANDATA).unwrap();
        let mut stream = stream_meandata_reader(MEANDATA.as_bytes());
        let first = stream.next().unwrap().unwrap();
        assert_eq!(first, whole[0]);
        assert_eq!(stream.yielded(), 1);
        let rest: Vec<_> = stream.map(Result::unwrap).collect();
        assert_eq!(rest, whole[1..]);
    }

    #[test]
    fn empty_document_yields_nothing() {
        assert!(parse_meandata_str("<meandata/>").unwrap().is_empty());
        assert!(parse_meandata_str("<meandata></meandata>").unwrap().is_empty());
    }

    #[test]
    fn reads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edgedata.xml");
        std::fs::write(&path, MEANDATA).unwrap();
        assert_eq!(parse_meandata_file(&path).unwrap(), parse_meandata_str(MEANDATA).unwrap());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = parse_meandata_file(std::path::Path::new("/nonexistent/edgedata.xml")).unwrap_err();
        assert!(matches!(err, TcError::Io(_)));
    }
}

// ── Trip summaries ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tripinfo {
    use super::*;

    #[test]
    fn all_attributes_mapped() {
        let trips = parse_tripinfo_str(TRIPINFO).unwrap();
        let t = &trips[0];
        assert_eq!(t.id, "veh0");
        assert_eq!(t.depart_lane, "e1_0");
        assert_eq!(t.depart_delay, 2.0);
        assert_eq!(t.arrival_lane, "e9_0");
        assert_eq!(t.route_length, 1450.3);
        assert_eq!(t.waiting_count, 1);
        assert_eq!(t.time_loss, 28.0);
        assert_eq!(t.devices, "tripinfo_veh0");
        assert_eq!(t.v_type, "bus");
        assert_eq!(t.speed_factor, 1.02);
        assert_eq!(t.vaporized, "");
    }

    #[test]
    fn missing_attributes_default() {
        let trips = parse_tripinfo_str(TRIPINFO).unwrap();
        let t = &trips[1];
        assert_eq!(t.id, "veh1");
        assert_eq!(t.time_loss, 5.5);
        assert_eq!(t.duration, 0.0);
        assert_eq!(t.reroute_no, 0);
        assert_eq!(t.arrival_lane, "");
        assert_eq!(t.vaporized, "");
    }

    #[test]
    fn nested_children_do_not_split_records() {
        assert_eq!(stream_tripinfo_reader(TRIPINFO.as_bytes()).count(), 2);
    }
}

// ── Detector output ───────────────────────────────────────────────────────────

#[cfg(test)]
mod detector {
    use super::*;

    #[test]
    fn intervals_dated_from_reference() {
        let xml = r#"<detector>
            <interval begin="0.00" end="300.00" id="SiteA_e1_0" flow="60.00" occupancy="1.20"
                      speed="12.90" harmonicMeanSpeed="12.40"/>
            <interval begin="300.00" end="600.00" id="SiteA_e1_0"/>
        </detector>"#;
        let rows = parse_detector_str(xml, midnight()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].sensor_id(), "SiteA_e1_0");
        assert_eq!(rows[0].timestamp(), midnight() + chrono::Duration::seconds(300));
        assert_eq!(rows[0].flow, 60.0);
        assert_eq!(rows[0].harmonic_speed, 12.4);
        assert_eq!(rows[1].speed, 0.0);
        assert_eq!(rows[1].timestamp(), midnight() + chrono::Duration::seconds(600));
    }
}

// ── Malformed input ───────────────────────────────────────────────────────────

#[cfg(test)]
mod malformed {
    use super::*;

    fn assert_malformed_then_ends(xml: &str) {
        let mut stream = stream_meandata_reader(xml.as_bytes());
        let err = loop {
            match stream.next() {
                Some(Ok(_)) => continue,
                Some(Err(e)) => break e,
                None => panic!("expected an error for {xml:?}"),
            }
        };
        assert!(matches!(err, TcError::MalformedDocument(_)), "{err:?}");
        assert!(stream.next().is_none());
        assert!(stream.next().is_none());
    }

    #[test]
    fn truncated_document() {
        assert_malformed_then_ends(r#"<meandata><interval begin="0" end="1"><edge id="a"/>"#);
    }

    #[test]
    fn mismatched_end_tag() {
        assert_malformed_then_ends(r#"<meandata><interval begin="0" end="1"></edge></meandata>"#);
    }

    #[test]
    fn unparsable_number() {
        assert_malformed_then_ends(r#"<meandata><interval begin="zero" end="1"/></meandata>"#);
    }

    #[test]
    fn earlier_records_survive_a_later_error() {
        let xml = r#"<meandata>
            <interval begin="0" end="1" id="ok"/>
            <interval begin="1" end="2"><edge id="a" speed="fast"/></interval>
        </meandata>"#;
        let results: Vec<_> = stream_meandata_reader(xml.as_bytes()).collect();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().unwrap().id, "ok");
        assert!(matches!(results[1], Err(TcError::MalformedDocument(_))));
    }
}
