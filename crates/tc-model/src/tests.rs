//! Unit tests for tc-model.

use tc_core::TcError;

use crate::{
    AdditionalDocument, Calibrator, CalibratorTarget, Flow, FlowOp, InductionLoop, apply_to_flows,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn window(vph: Option<f64>) -> Flow {
    let f = Flow::new(28_500.0, 28_799.0)
        .with_route("r0")
        .with_speed(18.0)
        .with_vehicle_type("passenger")
        .with_depart_pos("free");
    match vph {
        Some(v) => f.with_vehs_per_hour(v),
        None => f,
    }
}

// ── Flow algebra ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod flow_algebra {
    use super::*;

    #[test]
    fn add_sums_rates_and_keeps_left_fields() {
        let a = window(Some(120.5));
        let b = Flow::new(28_500.0, 28_799.0).with_vehs_per_hour(30.0).with_route("other");
        let sum = a.try_add(&b).unwrap();
        assert_eq!(sum.vehs_per_hour(), Some(150.5));
        assert_eq!(sum.route(), Some("r0"));
        assert_eq!(sum.speed(), Some(18.0));
        assert_eq!(sum.vehicle_type(), Some("passenger"));
        assert_eq!(sum.depart_pos(), Some("free"));
        assert_eq!((sum.begin(), sum.end()), (28_500.0, 28_799.0));
    }

    #[test]
    fn absent_rates_count_as_zero() {
        let sum = window(None).try_add(&window(Some(40.0))).unwrap();
        assert_eq!(sum.vehs_per_hour(), Some(40.0));

        let diff = window(Some(40.0)).try_sub(&window(None)).unwrap();
        assert_eq!(diff.vehs_per_hour(), Some(40.0));
    }

    #[test]
    fn add_property_over_grid() {
        let values = [None, Some(0.0), Some(1.5), Some(-3.0), Some(900.0)];
        for a in values {
            for b in values {
                let r = window(a).try_add(&window(b)).unwrap();
                assert_eq!(r.vehs_per_hour(), Some(a.unwrap_or(0.0) + b.unwrap_or(0.0)));
                assert_eq!(r.route(), Some("r0"));
            }
        }
    }

    #[test]
    fn mismatched_windows_fail() {
        let a = window(Some(10.0));
        let b = Flow::new(0.0, 299.0).with_vehs_per_hour(10.0);
        for op in [FlowOp::Add, FlowOp::Sub, FlowOp::Mul, FlowOp::Div, FlowOp::Pow] {
            let err = a.combine(&b, op).unwrap_err();
            assert!(matches!(err, TcError::StructuralMismatch(_)), "{op:?}");
        }
    }

    #[test]
    fn scalar_operands() {
        let a = window(Some(100.0));
        assert_eq!(a.try_mul(1.5).unwrap().vehs_per_hour(), Some(150.0));
        assert_eq!(a.try_div(4.0).unwrap().vehs_per_hour(), Some(25.0));
        assert_eq!(a.try_pow(2.0).unwrap().vehs_per_hour(), Some(10_000.0));
        assert_eq!((&a + 5.0).vehs_per_hour(), Some(105.0));
        assert_eq!((&a - 5.0).vehs_per_hour(), Some(95.0));
        assert_eq!((a * 0.5).vehs_per_hour(), Some(50.0));
    }

    #[test]
    fn scalar_on_absent_rate() {
        assert_eq!((window(None) + 7.0).vehs_per_hour(), Some(7.0));
        assert_eq!((window(None) * 7.0).vehs_per_hour(), Some(0.0));
    }

    #[test]
    fn combine_leaves_operands_unchanged() {
        let a = window(Some(1.0));
        let b = window(Some(2.0));
        let _ = a.try_add(&b).unwrap();
        assert_eq!(a.vehs_per_hour(), Some(1.0));
        assert_eq!(b.vehs_per_hour(), Some(2.0));
    }
}

// ── Flow lists ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod flow_lists {
    use super::*;

    fn series(rates: &[f64]) -> Vec<Flow> {
        rates
            .iter()
            .enumerate()
            .map(|(i, &r)| {
                let begin = i as f64 * 300.0;
                Flow::new(begin, begin + 299.0).with_vehs_per_hour(r)
            })
            .collect()
    }

    #[test]
    fn pairs_index_for_index() {
        let out = apply_to_flows(&series(&[1.0, 2.0, 3.0]), &series(&[10.0, 20.0, 30.0]), FlowOp::Add).unwrap();
        let rates: Vec<_> = out.iter().map(|f| f.vehs_per_hour().unwrap()).collect();
        assert_eq!(rates, vec![11.0, 22.0, 33.0]);
    }

    #[test]
    fn scalar_broadcasts() {
        let out = apply_to_flows(&series(&[1.0, 2.0]), 3.0, FlowOp::Mul).unwrap();
        let rates: Vec<_> = out.iter().map(|f| f.vehs_per_hour().unwrap()).collect();
        assert_eq!(rates, vec![3.0, 6.0]);
    }

    #[test]
    fn length_mismatch_fails() {
        let err = apply_to_flows(&series(&[1.0, 2.0, 3.0]), &series(&[1.0, 2.0]), FlowOp::Add).unwrap_err();
        assert!(matches!(err, TcError::StructuralMismatch(_)));
    }

    #[test]
    fn misaligned_windows_fail() {
        let shifted: Vec<Flow> = series(&[1.0, 2.0]).into_iter().map(|f| f.with_window(1.0, 2.0)).collect();
        let err = apply_to_flows(&series(&[1.0, 2.0]), &shifted, FlowOp::Add).unwrap_err();
        assert!(matches!(err, TcError::StructuralMismatch(_)));
    }
}

// ── Serialization ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod serialization {
    use super::*;

    #[test]
    fn flow_mandatory_only() {
        let xml = Flow::new(0.0, 299.0).to_xml();
        assert_eq!(xml.tag(), "flow");
        assert_eq!(xml.attrs().len(), 2);
        assert_eq!(xml.attr("begin"), Some("0.0"));
        assert_eq!(xml.attr("end"), Some("299.0"));
        assert_eq!(xml.attr("vehsPerHour"), None);
    }

    #[test]
    fn flow_optional_attribute_names() {
        let xml = window(Some(120.5))
            .with_depart_speed("max")
            .with_arrival_pos("random")
            .with_arrival_speed("current")
            .to_xml();
        assert_eq!(xml.attr("vehsPerHour"), Some("120.5"));
        assert_eq!(xml.attr("speed"), Some("18.0"));
        assert_eq!(xml.attr("type"), Some("passenger"));
        assert_eq!(xml.attr("departPos"), Some("free"));
        assert_eq!(xml.attr("departSpeed"), Some("max"));
        assert_eq!(xml.attr("arrivalPos"), Some("random"));
        assert_eq!(xml.attr("arrivalSpeed"), Some("current"));
    }

    #[test]
    fn flow_string_is_self_closing() {
        let s = Flow::new(0.0, 299.0).with_vehs_per_hour(60.0).to_xml().to_xml_string().unwrap();
        assert_eq!(s, r#"<flow begin="0.0" end="299.0" vehsPerHour="60.0"/>"#);
    }

    #[test]
    fn calibrator_on_edge_nests_flows_in_order() {
        let cal = Calibrator::on_edge("site_a", "e12")
            .with_pos(12.5)
            .with_period(60.0)
            .with_jam_threshold(0.3)
            .with_vehicle_types(["truck", "passenger"])
            .add_flows([Flow::new(0.0, 299.0), Flow::new(300.0, 599.0)]);
        let xml = cal.to_xml();

        assert_eq!(xml.tag(), "calibrator");
        assert_eq!(xml.attr("id"), Some("site_a"));
        assert_eq!(xml.attr("pos"), Some("12.5"));
        assert_eq!(xml.attr("edge"), Some("e12"));
        assert_eq!(xml.attr("lane"), None);
        assert_eq!(xml.attr("period"), Some("60.0"));
        assert_eq!(xml.attr("jamThreshold"), Some("0.3"));
        assert_eq!(xml.attr("vTypes"), Some("passenger truck"));
        assert_eq!(xml.attr("routeProbe"), None);
        assert_eq!(xml.attr("output"), None);

        let begins: Vec<_> = xml.children().iter().map(|c| c.attr("begin").unwrap()).collect();
        assert_eq!(begins, vec!["0.0", "300.0"]);
    }

    #[test]
    fn jam_threshold_without_period_is_written() {
        let xml = Calibrator::on_lane("c", "e1_0").with_jam_threshold(0.5).to_xml();
        assert_eq!(xml.attr("jamThreshold"), Some("0.5"));
        assert_eq!(xml.attr("lane"), Some("e1_0"));
        assert_eq!(xml.attr("edge"), None);
    }

    #[test]
    fn target_is_exactly_one_of_edge_or_lane() {
        for target in [CalibratorTarget::Edge("e".into()), CalibratorTarget::Lane("e_0".into())] {
            let xml = Calibrator::new("c", target).to_xml();
            let set = [xml.attr("edge"), xml.attr("lane")].iter().filter(|a| a.is_some()).count();
            assert_eq!(set, 1);
        }
    }

    #[test]
    fn add_flows_returns_new_value() {
        let base = Calibrator::on_edge("c", "e").add_flows([Flow::new(0.0, 1.0)]);
        let grown = base.add_flows([Flow::new(2.0, 3.0)]);
        assert_eq!(base.flows().len(), 1);
        assert_eq!(grown.flows().len(), 2);
    }

    #[test]
    fn induction_loop_attributes() {
        let xml = InductionLoop::new("site_e1_0", "e1_0", 4.0, "out/loops.xml")
            .with_friendly_pos(true)
            .with_period(300)
            .with_vehicle_types(["passenger", "bus"])
            .to_xml();
        assert_eq!(xml.tag(), "inductionLoop");
        assert_eq!(xml.attr("lane"), Some("e1_0"));
        assert_eq!(xml.attr("file"), Some("out/loops.xml"));
        assert_eq!(xml.attr("friendlyPos"), Some("true"));
        assert_eq!(xml.attr("period"), Some("300"));
        assert_eq!(xml.attr("vTypes"), Some("passenger,bus"));
        assert_eq!(xml.attr("length"), None);
        assert_eq!(xml.attr("nextEdges"), None);
    }

    #[test]
    fn friendly_pos_false_is_omitted() {
        let xml = InductionLoop::new("d", "e_0", 0.0, "f.xml").to_xml();
        assert_eq!(xml.attr("friendlyPos"), None);
    }

    #[test]
    fn additional_document_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("calibrators.add.xml");
        let doc = AdditionalDocument::new()
            .with(Calibrator::on_edge("c1", "e1").add_flows([Flow::new(0.0, 299.0)]).to_xml())
            .with(InductionLoop::new("d1", "e1_0", 1.0, "d.xml").to_xml());
        doc.write_file(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(text.contains("xsi:noNamespaceSchemaLocation=\"http://sumo.dlr.de/xsd/additional_file.xsd\""));
        assert!(text.contains("<calibrator id=\"c1\" pos=\"0.0\" edge=\"e1\">"));
        assert!(text.contains("<flow begin=\"0.0\" end=\"299.0\"/>"));
        assert!(text.contains("<inductionLoop id=\"d1\""));
        assert!(text.trim_end().ends_with("</additional>"));
    }
}

// ── FlowTemplate ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod flow_template {
    use crate::{Flow, FlowTemplate};

    #[test]
    fn stamps_only_set_fields() {
        let template = FlowTemplate {
            vehicle_type: Some("passenger".into()),
            depart_speed: Some("max".into()),
            ..Default::default()
        };
        let flow = template.stamp(Flow::new(0.0, 299.0).with_route("r1").with_vehs_per_hour(10.0));
        assert_eq!(flow.vehicle_type(), Some("passenger"));
        assert_eq!(flow.depart_speed(), Some("max"));
        assert_eq!(flow.route(), Some("r1"));
        assert_eq!(flow.vehs_per_hour(), Some(10.0));
        assert_eq!(flow.depart_pos(), None);
    }
}
