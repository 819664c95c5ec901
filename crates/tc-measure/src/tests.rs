//! Unit tests for tc-measure.

use std::path::Path;

use chrono::{Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};

use tc_core::{GeoPoint, RawTimestamp, TcError};
use tc_model::FlowTemplate;
use tc_network::{EdgeHit, NetworkLocator};

use crate::{
    InductionLoopMeasurement, Measurement, MeasurementHeader, RoadwaySensorMeasurement,
    aggregate_by_site, align_measurements, filter_by_time, induction_loops_for_lanes,
    measurements_to_flows, parse_measurement_row, parse_measurements, parse_measurements_lenient,
    parse_sensor_site_row, parse_sensor_sites,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

const HEADER: &str =
    "count_point_id;count_point_name;measure_datetime;flow;occupancy;speed;flow_conf;occupancy_conf;speed_conf";
const ROW: &str = "101;SiteA;2024-05-01T08:00:00+0000;120.5;0.3;65.2;A;A;A";

fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(h, m, s).unwrap()
}

fn header(id: &str, t: NaiveDateTime) -> MeasurementHeader {
    MeasurementHeader::new(t, id).unwrap()
}

/// Resolves every point to edge `e1` (two lanes) at offset 12.5 m, as long as
/// the radius is at least 1 m.
struct FixedLocator;

impl NetworkLocator for FixedLocator {
    fn closest_edge(&self, _point: GeoPoint, radius_m: f64) -> Option<EdgeHit> {
        (radius_m >= 1.0).then(|| EdgeHit {
            edge_id:    "e1".to_owned(),
            offset_m:   12.5,
            distance_m: 0.8,
        })
    }

    fn lane_ids(&self, edge_id: &str) -> Vec<String> {
        vec![format!("{edge_id}_0"), format!("{edge_id}_1")]
    }
}

// ── Measurement header ────────────────────────────────────────────────────────

#[cfg(test)]
mod headers {
    use super::*;

    #[test]
    fn blank_sensor_id_rejected() {
        let err = MeasurementHeader::new(at(8, 0, 0), "   ").unwrap_err();
        assert!(matches!(err, TcError::InvariantViolation(_)));
    }

    #[test]
    fn aware_timestamp_rejected() {
        let aware = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let err = MeasurementHeader::new(aware, "101").unwrap_err();
        assert!(matches!(err, TcError::InvariantViolation(_)));

        let ok = MeasurementHeader::new(RawTimestamp::from(aware).normalized(), "101").unwrap();
        assert_eq!(ok.timestamp(), at(8, 0, 0));
    }

    #[test]
    fn time_diff_is_absolute() {
        let a = header("1", at(8, 0, 0));
        let b = header("1", at(8, 5, 0));
        assert_eq!(a.time_diff(&b), Duration::minutes(5));
        assert_eq!(b.time_diff(&a), Duration::minutes(5));
    }
}

// ── Roadway rows ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod roadway_rows {
    use super::*;

    #[test]
    fn parses_full_row() {
        let m = parse_measurement_row(ROW, b';').unwrap();
        assert_eq!(m.count_point_id(), 101);
        assert_eq!(m.sensor_id(), "101");
        assert_eq!(m.count_point_name(), "SiteA");
        assert_eq!(m.timestamp(), at(8, 0, 0));
        assert_eq!(m.flow(), Some(120.5));
        assert_eq!(m.occupancy(), Some(0.3));
        assert_eq!(m.speed(), Some(65.2));
        assert_eq!(m.speed_confidence(), "A");
    }

    #[test]
    fn offset_is_normalized_to_utc() {
        let m = parse_measurement_row("7;X;2024-05-01T10:15:00+0200;1;;;;;", b';').unwrap();
        assert_eq!(m.timestamp(), at(8, 15, 0));
    }

    #[test]
    fn quoted_name_is_unquoted() {
        let m = parse_measurement_row("7;\"Site B\";2024-05-01T08:00:00+0000;1;2;3;A;B;C", b';').unwrap();
        assert_eq!(m.count_point_name(), "Site B");
    }

    #[test]
    fn blank_values_are_absent_not_zero() {
        let m = parse_measurement_row("7;X;2024-05-01T08:00:00+0000;;0.1;;;B;", b';').unwrap();
        assert_eq!(m.flow(), None);
        assert_eq!(m.occupancy(), Some(0.1));
        assert_eq!(m.speed(), None);
        assert_eq!(m.flow_confidence(), "");
        assert_eq!(m.occupancy_confidence(), "B");
    }

    #[test]
    fn short_row_fails() {
        let err = parse_measurement_row("101;SiteA;2024-05-01T08:00:00+0000", b';').unwrap_err();
        assert!(matches!(err, TcError::Parse(_)));
    }

    #[test]
    fn bad_fields_fail() {
        for row in [
            "abc;SiteA;2024-05-01T08:00:00+0000;1;2;3;A;A;A",
            "101;SiteA;2024-05-01 08:00;1;2;3;A;A;A",
            "101;SiteA;2024-05-01T08:00:00+0000;fast;2;3;A;A;A",
        ] {
            assert!(matches!(parse_measurement_row(row, b';'), Err(TcError::Parse(_))), "{row}");
        }
    }

    #[test]
    fn document_skips_header_and_blank_lines() {
        let content = format!("{HEADER}\n{ROW}\n\n102;SiteB;2024-05-01T08:05:00+0000;10;;;;;\n");
        let rows = parse_measurements(&content, b';').unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].count_point_name(), "SiteB");
    }

    #[test]
    fn document_fails_on_first_bad_row() {
        let content = format!("{HEADER}\n{ROW}\nbroken\n");
        let err = parse_measurements(&content, b';').unwrap_err();
        assert!(err.to_string().contains("line 3"), "{err}");
    }

    #[test]
    fn lenient_skips_bad_rows() {
        let content = format!("{HEADER}\n{ROW}\nbroken\n{ROW}\n");
        assert_eq!(parse_measurements_lenient(&content, b';').len(), 2);
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("measures.csv");
        std::fs::write(&path, format!("{HEADER}\n{ROW}\n")).unwrap();
        let rows = crate::load_measurements_csv(&path, b';').unwrap();
        assert_eq!(rows.len(), 1);
    }
}

// ── Flow conversion ───────────────────────────────────────────────────────────

#[cfg(test)]
mod flow_conversion {
    use super::*;

    #[test]
    fn window_ends_one_second_before_reading() {
        let m = parse_measurement_row(ROW, b';').unwrap();
        let flow = m.to_calibrator_flow(300.0, &FlowTemplate::default());
        assert_eq!(flow.begin(), 28_500.0);
        assert_eq!(flow.end(), 28_799.0);
        assert_eq!(flow.vehs_per_hour(), Some(120.5));
        assert!((flow.speed().unwrap() - 18.111).abs() < 1e-3);
    }

    #[test]
    fn offset_rows_use_the_utc_clock() {
        // 10:00 at +0200 is 08:00 UTC; the window follows the UTC time of day.
        let m = parse_measurement_row("101;SiteA;2024-05-01T10:00:00+0200;60;;;A;A;A", b';').unwrap();
        assert_eq!(m.timestamp(), at(8, 0, 0));
        let flow = m.to_calibrator_flow(300.0, &FlowTemplate::default());
        assert_eq!(flow.begin(), 28_500.0);
        assert_eq!(flow.end(), 28_799.0);
    }

    #[test]
    fn absent_values_stay_absent() {
        let m = parse_measurement_row("7;X;2024-05-01T08:00:00+0000;;;;;;", b';').unwrap();
        let flow = m.to_calibrator_flow(300.0, &FlowTemplate::default());
        assert_eq!(flow.vehs_per_hour(), None);
        assert_eq!(flow.speed(), None);
    }

    #[test]
    fn template_fields_are_copied() {
        let template = FlowTemplate {
            route:        Some("r_site_a".into()),
            vehicle_type: Some("passenger".into()),
            ..FlowTemplate::default()
        };
        let rows = parse_measurements(&format!("{HEADER}\n{ROW}\n{ROW}\n"), b';').unwrap();
        let flows = measurements_to_flows(&rows, 300.0, &template);
        assert_eq!(flows.len(), 2);
        assert!(flows.iter().all(|f| f.route() == Some("r_site_a")));
        assert!(flows.iter().all(|f| f.vehicle_type() == Some("passenger")));
    }

    #[test]
    fn grouping_by_site_keeps_order() {
        let content = format!(
            "{HEADER}\n\
             1;B;2024-05-01T08:00:00+0000;1;;;;;\n\
             2;A;2024-05-01T08:00:00+0000;2;;;;;\n\
             1;B;2024-05-01T08:05:00+0000;3;;;;;\n"
        );
        let grouped = aggregate_by_site(parse_measurements(&content, b';').unwrap());
        assert_eq!(grouped.keys().collect::<Vec<_>>(), ["A", "B"]);
        let flows: Vec<_> = grouped["B"].iter().map(|m| m.flow()).collect();
        assert_eq!(flows, [Some(1.0), Some(3.0)]);
    }
}

// ── Induction-loop readings ───────────────────────────────────────────────────

#[cfg(test)]
mod induction {
    use super::*;

    #[test]
    fn timestamp_is_reference_plus_end() {
        let m = InductionLoopMeasurement::from_attributes(
            "SiteA_e1_0",
            28_800.0,
            [600.0, 13.0, 4.5, 12.5],
            at(0, 0, 0),
        )
        .unwrap();
        assert_eq!(m.timestamp(), at(8, 0, 0));
        assert_eq!(m.sensor_id(), "SiteA_e1_0");
        assert_eq!(m.harmonic_speed, 12.5);
    }

    #[test]
    fn aware_reference_is_normalized() {
        let reference = chrono::FixedOffset::east_opt(2 * 3_600)
            .unwrap()
            .with_ymd_and_hms(2024, 5, 1, 2, 0, 0)
            .unwrap();
        let m = InductionLoopMeasurement::from_attributes("d", 60.0, [0.0; 4], reference).unwrap();
        assert_eq!(m.timestamp(), at(0, 1, 0));
    }
}

// ── Sensor sites ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod sites {
    use super::*;

    const SITE_ROW: &str = "101;\"SiteA\";\"Main Street\";POINT (2.1734 41.3851)";

    #[test]
    fn parses_point_geometry() {
        let site = parse_sensor_site_row(SITE_ROW, b';').unwrap();
        assert_eq!(site.count_point_id, 101);
        assert_eq!(site.count_point_name, "SiteA");
        assert_eq!(site.road_name, "Main Street");
        assert_eq!(site.location, GeoPoint::new(2.1734, 41.3851));
    }

    #[test]
    fn bad_point_fails() {
        let err = parse_sensor_site_row("101;A;B;POINT (2.1)", b';').unwrap_err();
        assert!(matches!(err, TcError::Parse(_)));
    }

    #[test]
    fn document_skips_header() {
        let content = format!("count_point_id;count_point_name;op_road_name;geometry\n{SITE_ROW}\n");
        assert_eq!(parse_sensor_sites(&content, b';').unwrap().len(), 1);
    }

    #[test]
    fn calibrator_on_snapped_edge() {
        let site = parse_sensor_site_row(SITE_ROW, b';').unwrap();
        let cal = site.to_calibrator(&FixedLocator, 5.0).unwrap();
        assert_eq!(cal.id(), "SiteA");
        assert_eq!(cal.target().id(), "e1");
        assert_eq!(cal.pos(), 12.5);
        assert!(site.to_calibrator(&FixedLocator, 0.5).is_none());
    }

    #[test]
    fn one_detector_per_lane() {
        let site = parse_sensor_site_row(SITE_ROW, b';').unwrap();
        let loops = site.to_induction_loops(&FixedLocator, 5.0, Path::new("out.xml"));
        let ids: Vec<_> = loops.iter().map(|l| l.id()).collect();
        assert_eq!(ids, ["SiteA_e1_0", "SiteA_e1_1"]);
        assert!(loops.iter().all(|l| l.friendly_pos() && l.pos() == 12.5));
        assert!(site.to_induction_loops(&FixedLocator, 0.5, Path::new("out.xml")).is_empty());
    }

    #[test]
    fn no_lanes_no_detectors() {
        assert!(induction_loops_for_lanes("S", &[], 0.0, Path::new("o.xml")).is_empty());
    }
}

// ── Alignment ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod alignment {
    use super::*;

    #[test]
    fn filter_window_is_inclusive() {
        let hs = [header("1", at(7, 59, 59)), header("1", at(8, 0, 0)), header("1", at(8, 5, 0))];
        let kept = filter_by_time(&hs, at(8, 0, 0), at(8, 5, 0));
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn nearest_partner_within_tolerance() {
        let left = [header("1", at(8, 0, 0)), header("1", at(9, 0, 0)), header("2", at(8, 0, 0))];
        let right = [
            header("1", at(7, 58, 0)),
            header("1", at(8, 1, 0)),
            header("2", at(8, 30, 0)),
        ];
        let aligned = align_measurements(&left, &right, Duration::minutes(5));
        assert_eq!(aligned.len(), 3);
        assert_eq!(aligned[0].right.map(|r| r.timestamp()), Some(at(8, 1, 0)));
        // 59 minutes away from the closest reading.
        assert!(aligned[1].right.is_none());
        // Sensor 2's only reading is outside tolerance.
        assert!(aligned[2].right.is_none());
    }

    #[test]
    fn equidistant_partners_prefer_the_earlier() {
        let left = [header("1", at(8, 0, 0))];
        let right = [header("1", at(8, 2, 0)), header("1", at(7, 58, 0))];
        let aligned = align_measurements(&left, &right, Duration::minutes(5));
        assert_eq!(aligned[0].right.map(|r| r.timestamp()), Some(at(7, 58, 0)));
    }

    #[test]
    fn other_sensors_never_match() {
        let left = [header("1", at(8, 0, 0))];
        let right = [header("9", at(8, 0, 0))];
        assert!(align_measurements(&left, &right, Duration::hours(1))[0].right.is_none());
    }

    #[test]
    fn output_sorted_by_sensor_then_time() {
        let left = [header("2", at(8, 0, 0)), header("1", at(9, 0, 0)), header("1", at(8, 0, 0))];
        let right: [MeasurementHeader; 0] = [];
        let order: Vec<_> = align_measurements(&left, &right, Duration::zero())
            .iter()
            .map(|a| (a.left.sensor_id().to_owned(), a.left.timestamp()))
            .collect();
        assert_eq!(
            order,
            [("1".to_owned(), at(8, 0, 0)), ("1".to_owned(), at(9, 0, 0)), ("2".to_owned(), at(8, 0, 0))]
        );
    }

    #[test]
    fn roadway_rows_align_with_each_other() {
        let a: Vec<RoadwaySensorMeasurement> = parse_measurements(&format!("{HEADER}\n{ROW}\n"), b';').unwrap();
        let aligned = align_measurements(&a, &a, Duration::zero());
        assert!(aligned[0].right.is_some());
    }
}
