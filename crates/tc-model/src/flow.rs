//! Calibration flows and their algebra.
//!
//! A [`Flow`] describes a vehicle-generation rate over a fixed `[begin, end]`
//! window in simulation seconds.  Flows combine like numbers, but only
//! through `vehs_per_hour`: every other field of the result comes from the
//! left operand.  Two flows may only be combined when they describe the same
//! window ("same structure"); anything else is a `StructuralMismatch`.
//!
//! ```
//! use tc_model::{Flow, FlowOp};
//!
//! let a = Flow::new(0.0, 299.0).with_vehs_per_hour(120.0);
//! let b = Flow::new(0.0, 299.0).with_vehs_per_hour(30.0);
//! let sum = a.combine(&b, FlowOp::Add).unwrap();
//! assert_eq!(sum.vehs_per_hour(), Some(150.0));
//!
//! // Scalar operands cannot fail, so they also get plain operators.
//! assert_eq!((a * 2.0).vehs_per_hour(), Some(240.0));
//! ```

use std::ops;

use tc_core::{TcError, TcResult};

use crate::vocab::{flow as attr, tag};
use crate::xml::{XmlElement, format_float};

// ── FlowOp ────────────────────────────────────────────────────────────────────

/// Arithmetic applied to `vehs_per_hour`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlowOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl FlowOp {
    #[inline]
    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            FlowOp::Add => lhs + rhs,
            FlowOp::Sub => lhs - rhs,
            FlowOp::Mul => lhs * rhs,
            FlowOp::Div => lhs / rhs,
            FlowOp::Pow => lhs.powf(rhs),
        }
    }
}

/// Right-hand side of a flow combination.
#[derive(Copy, Clone, Debug)]
pub enum Operand<'a> {
    Flow(&'a Flow),
    Scalar(f64),
}

impl<'a> From<&'a Flow> for Operand<'a> {
    fn from(f: &'a Flow) -> Self {
        Operand::Flow(f)
    }
}

impl From<f64> for Operand<'_> {
    fn from(x: f64) -> Self {
        Operand::Scalar(x)
    }
}

// ── Flow ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Flow {
    begin:         f64,
    end:           f64,
    route:         Option<String>,
    vehs_per_hour: Option<f64>,
    /// m/s.
    speed:         Option<f64>,
    vehicle_type:  Option<String>,
    depart_pos:    Option<String>,
    depart_speed:  Option<String>,
    arrival_pos:   Option<String>,
    arrival_speed: Option<String>,
}

impl Flow {
    pub fn new(begin: f64, end: f64) -> Self {
        Self { begin, end, ..Default::default() }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn begin(&self) -> f64 { self.begin }
    pub fn end(&self) -> f64 { self.end }
    pub fn route(&self) -> Option<&str> { self.route.as_deref() }
    pub fn vehs_per_hour(&self) -> Option<f64> { self.vehs_per_hour }
    pub fn speed(&self) -> Option<f64> { self.speed }
    pub fn vehicle_type(&self) -> Option<&str> { self.vehicle_type.as_deref() }
    pub fn depart_pos(&self) -> Option<&str> { self.depart_pos.as_deref() }
    pub fn depart_speed(&self) -> Option<&str> { self.depart_speed.as_deref() }
    pub fn arrival_pos(&self) -> Option<&str> { self.arrival_pos.as_deref() }
    pub fn arrival_speed(&self) -> Option<&str> { self.arrival_speed.as_deref() }

    // ── Field replacement (returns a new value) ───────────────────────────

    pub fn with_window(self, begin: f64, end: f64) -> Self {
        Self { begin, end, ..self }
    }

    pub fn with_route(self, route: impl Into<String>) -> Self {
        Self { route: Some(route.into()), ..self }
    }

    pub fn with_vehs_per_hour(self, vehs_per_hour: f64) -> Self {
        Self { vehs_per_hour: Some(vehs_per_hour), ..self }
    }

    pub fn with_speed(self, speed_mps: f64) -> Self {
        Self { speed: Some(speed_mps), ..self }
    }

    pub fn with_vehicle_type(self, vehicle_type: impl Into<String>) -> Self {
        Self { vehicle_type: Some(vehicle_type.into()), ..self }
    }

    pub fn with_depart_pos(self, depart_pos: impl Into<String>) -> Self {
        Self { depart_pos: Some(depart_pos.into()), ..self }
    }

    pub fn with_depart_speed(self, depart_speed: impl Into<String>) -> Self {
        Self { depart_speed: Some(depart_speed.into()), ..self }
    }

    pub fn with_arrival_pos(self, arrival_pos: impl Into<String>) -> Self {
        Self { arrival_pos: Some(arrival_pos.into()), ..self }
    }

    pub fn with_arrival_speed(self, arrival_speed: impl Into<String>) -> Self {
        Self { arrival_speed: Some(arrival_speed.into()), ..self }
    }

    /// Like the `with_*` setters but taking optional values, for building
    /// from partially-filled sources.
    pub fn with_rate(self, vehs_per_hour: Option<f64>, speed_mps: Option<f64>) -> Self {
        Self { vehs_per_hour, speed: speed_mps, ..self }
    }

    // ── Algebra ───────────────────────────────────────────────────────────

    /// Same structure = identical `[begin, end]` window.
    pub fn same_struct_as(&self, other: &Flow) -> bool {
        self.begin == other.begin && self.end == other.end
    }

    /// Apply `op` to `vehs_per_hour`, treating an absent value on either side
    /// as `0`.  All other fields are copied from `self`.
    pub fn combine<'a>(&self, rhs: impl Into<Operand<'a>>, op: FlowOp) -> TcResult<Flow> {
        let rhs_value = match rhs.into() {
            Operand::Flow(other) => {
                if !self.same_struct_as(other) {
                    return Err(TcError::StructuralMismatch(format!(
                        "flow windows differ: [{}, {}] vs [{}, {}]",
                        self.begin, self.end, other.begin, other.end
                    )));
                }
                other.vehs_per_hour.unwrap_or(0.0)
            }
            Operand::Scalar(x) => x,
        };
        Ok(self.scaled(op, rhs_value))
    }

    pub fn try_add<'a>(&self, rhs: impl Into<Operand<'a>>) -> TcResult<Flow> {
        self.combine(rhs, FlowOp::Add)
    }

    pub fn try_sub<'a>(&self, rhs: impl Into<Operand<'a>>) -> TcResult<Flow> {
        self.combine(rhs, FlowOp::Sub)
    }

    pub fn try_mul<'a>(&self, rhs: impl Into<Operand<'a>>) -> TcResult<Flow> {
        self.combine(rhs, FlowOp::Mul)
    }

    pub fn try_div<'a>(&self, rhs: impl Into<Operand<'a>>) -> TcResult<Flow> {
        self.combine(rhs, FlowOp::Div)
    }

    pub fn try_pow<'a>(&self, rhs: impl Into<Operand<'a>>) -> TcResult<Flow> {
        self.combine(rhs, FlowOp::Pow)
    }

    fn scaled(&self, op: FlowOp, rhs: f64) -> Flow {
        Flow {
            vehs_per_hour: Some(op.apply(self.vehs_per_hour.unwrap_or(0.0), rhs)),
            ..self.clone()
        }
    }

    // ── Serialization ─────────────────────────────────────────────────────

    pub fn to_xml(&self) -> XmlElement {
        XmlElement::with_attrs(
            tag::FLOW,
            [
                (attr::BEGIN, format_float(self.begin)),
                (attr::END, format_float(self.end)),
            ],
            [
                (attr::ROUTE, self.route.clone()),
                (attr::VEHS_PER_HOUR, self.vehs_per_hour.map(format_float)),
                (attr::SPEED, self.speed.map(format_float)),
                (attr::TYPE, self.vehicle_type.clone()),
                (attr::DEPART_POS, self.depart_pos.clone()),
                (attr::DEPART_SPEED, self.depart_speed.clone()),
                (attr::ARRIVAL_POS, self.arrival_pos.clone()),
                (attr::ARRIVAL_SPEED, self.arrival_speed.clone()),
            ],
        )
    }
}

// ── FlowTemplate ──────────────────────────────────────────────────────────────

/// Attributes stamped onto every flow derived from a measurement series:
/// route, vehicle type, and the depart/arrival hints.  `None` leaves the
/// flow's own value in place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlowTemplate {
    pub route:         Option<String>,
    pub vehicle_type:  Option<String>,
    pub depart_pos:    Option<String>,
    pub depart_speed:  Option<String>,
    pub arrival_pos:   Option<String>,
    pub arrival_speed: Option<String>,
}

impl FlowTemplate {
    pub fn stamp(&self, flow: Flow) -> Flow {
        Flow {
            route:         self.route.clone().or(flow.route),
            vehicle_type:  self.vehicle_type.clone().or(flow.vehicle_type),
            depart_pos:    self.depart_pos.clone().or(flow.depart_pos),
            depart_speed:  self.depart_speed.clone().or(flow.depart_speed),
            arrival_pos:   self.arrival_pos.clone().or(flow.arrival_pos),
            arrival_speed: self.arrival_speed.clone().or(flow.arrival_speed),
            ..flow
        }
    }
}

// ── Scalar operators ──────────────────────────────────────────────────────────

macro_rules! scalar_op {
    ($trait:ident, $method:ident, $op:expr) => {
        impl ops::$trait<f64> for &Flow {
            type Output = Flow;
            fn $method(self, rhs: f64) -> Flow {
                self.scaled($op, rhs)
            }
        }

        impl ops::$trait<f64> for Flow {
            type Output = Flow;
            fn $method(self, rhs: f64) -> Flow {
                <&Flow as ops::$trait<f64>>::$method(&self, rhs)
            }
        }
    };
}

scalar_op!(Add, add, FlowOp::Add);
scalar_op!(Sub, sub, FlowOp::Sub);
scalar_op!(Mul, mul, FlowOp::Mul);
scalar_op!(Div, div, FlowOp::Div);

// ── Lists of flows ────────────────────────────────────────────────────────────

/// Right-hand side of an elementwise list combination.
#[derive(Copy, Clone, Debug)]
pub enum ListOperand<'a> {
    Flows(&'a [Flow]),
    /// Broadcast to every element.
    Scalar(f64),
}

impl<'a> From<&'a [Flow]> for ListOperand<'a> {
    fn from(f: &'a [Flow]) -> Self {
        ListOperand::Flows(f)
    }
}

impl<'a> From<&'a Vec<Flow>> for ListOperand<'a> {
    fn from(f: &'a Vec<Flow>) -> Self {
        ListOperand::Flows(f.as_slice())
    }
}

impl From<f64> for ListOperand<'_> {
    fn from(x: f64) -> Self {
        ListOperand::Scalar(x)
    }
}

/// Combine `flows` with `operand` position by position.
///
/// List operands must have the same length as `flows`; a length mismatch is
/// a `StructuralMismatch`, as is any pair of flows with different windows.
pub fn apply_to_flows<'a>(
    flows:   &[Flow],
    operand: impl Into<ListOperand<'a>>,
    op:      FlowOp,
) -> TcResult<Vec<Flow>> {
    match operand.into() {
        ListOperand::Scalar(x) => Ok(flows.iter().map(|f| f.scaled(op, x)).collect()),
        ListOperand::Flows(others) => {
            if others.len() != flows.len() {
                return Err(TcError::StructuralMismatch(format!(
                    "flow lists differ in length: {} vs {}",
                    flows.len(),
                    others.len()
                )));
            }
            flows
                .iter()
                .zip(others)
                .map(|(lhs, rhs)| lhs.combine(rhs, op))
                .collect()
        }
    }
}
