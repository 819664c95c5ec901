//! Calibrators: simulation entities that inject or remove vehicles on an
//! edge or lane so that observed traffic matches an ordered list of flows.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::flow::Flow;
use crate::vocab::{calibrator as attr, tag};
use crate::xml::{XmlElement, format_float};

/// Where a calibrator sits.  Exactly one of edge or lane; "both" and
/// "neither" cannot be expressed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CalibratorTarget {
    Edge(String),
    Lane(String),
}

impl CalibratorTarget {
    pub fn id(&self) -> &str {
        match self {
            CalibratorTarget::Edge(id) | CalibratorTarget::Lane(id) => id,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Calibrator {
    id:            String,
    target:        CalibratorTarget,
    /// Position on the edge/lane in metres.  Currently ignored by the
    /// simulator but still required by its schema.
    pos:           f64,
    flows:         Vec<Flow>,
    /// Seconds between corrections.  The simulator defaults to the step length.
    period:        Option<f64>,
    route_probe:   Option<String>,
    /// The simulator defaults to 0.5.
    jam_threshold: Option<f64>,
    output:        Option<PathBuf>,
    /// Vehicle types the calibrator acts on.  Empty means all types.
    vehicle_types: BTreeSet<String>,
}

impl Calibrator {
    pub fn new(id: impl Into<String>, target: CalibratorTarget) -> Self {
        Self {
            id: id.into(),
            target,
            pos: 0.0,
            flows: Vec::new(),
            period: None,
            route_probe: None,
            jam_threshold: None,
            output: None,
            vehicle_types: BTreeSet::new(),
        }
    }

    pub fn on_edge(id: impl Into<String>, edge_id: impl Into<String>) -> Self {
        Self::new(id, CalibratorTarget::Edge(edge_id.into()))
    }

    pub fn on_lane(id: impl Into<String>, lane_id: impl Into<String>) -> Self {
        Self::new(id, CalibratorTarget::Lane(lane_id.into()))
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn target(&self) -> &CalibratorTarget {
        &self.target
    }

    pub fn pos(&self) -> f64 {
        self.pos
    }

    pub fn flows(&self) -> &[Flow] {
        &self.flows
    }

    pub fn period(&self) -> Option<f64> {
        self.period
    }

    pub fn route_probe(&self) -> Option<&str> {
        self.route_probe.as_deref()
    }

    pub fn jam_threshold(&self) -> Option<f64> {
        self.jam_threshold
    }

    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    pub fn vehicle_types(&self) -> &BTreeSet<String> {
        &self.vehicle_types
    }

    // ── Field replacement (returns a new value) ───────────────────────────

    pub fn with_pos(self, pos: f64) -> Self {
        Self { pos, ..self }
    }

    pub fn with_period(self, period: f64) -> Self {
        Self { period: Some(period), ..self }
    }

    pub fn with_route_probe(self, route_probe: impl Into<String>) -> Self {
        Self { route_probe: Some(route_probe.into()), ..self }
    }

    pub fn with_jam_threshold(self, jam_threshold: f64) -> Self {
        Self { jam_threshold: Some(jam_threshold), ..self }
    }

    pub fn with_output(self, output: impl Into<PathBuf>) -> Self {
        Self { output: Some(output.into()), ..self }
    }

    pub fn with_vehicle_types<S: Into<String>>(self, types: impl IntoIterator<Item = S>) -> Self {
        Self { vehicle_types: types.into_iter().map(Into::into).collect(), ..self }
    }

    /// A new calibrator owning `self`'s flows followed by `flows`.
    /// `self` is left untouched.
    pub fn add_flows(&self, flows: impl IntoIterator<Item = Flow>) -> Calibrator {
        let mut next = self.clone();
        next.flows.extend(flows);
        next
    }

    // ── Serialization ─────────────────────────────────────────────────────

    /// `<calibrator>` with one nested `<flow>` per owned flow, in order.
    pub fn to_xml(&self) -> XmlElement {
        let (edge, lane) = match &self.target {
            CalibratorTarget::Edge(id) => (Some(id.clone()), None),
            CalibratorTarget::Lane(id) => (None, Some(id.clone())),
        };
        let v_types = (!self.vehicle_types.is_empty())
            .then(|| self.vehicle_types.iter().map(String::as_str).collect::<Vec<_>>().join(" "));

        XmlElement::with_attrs(
            tag::CALIBRATOR,
            [(attr::ID, self.id.clone()), (attr::POS, format_float(self.pos))],
            [
                (attr::EDGE, edge),
                (attr::LANE, lane),
                (attr::JAM_THRESHOLD, self.jam_threshold.map(format_float)),
                (attr::PERIOD, self.period.map(format_float)),
                (attr::ROUTE_PROBE, self.route_probe.clone()),
                (attr::OUTPUT, self.output.as_ref().map(|p| p.display().to_string())),
                (attr::V_TYPES, v_types),
            ],
        )
        .with_children(self.flows.iter().map(Flow::to_xml))
    }
}
