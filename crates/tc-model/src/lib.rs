//! `tc-model` — the calibration-side value model.
//!
//! Every type here is an immutable value: "setters" consume `self` and
//! return a new value, and combining flows always produces a fresh `Flow`.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                |
//! |-----------------|---------------------------------------------------------|
//! | [`flow`]        | `Flow`, `FlowOp`, `FlowTemplate`, `apply_to_flows`      |
//! | [`calibrator`]  | `Calibrator`, `CalibratorTarget`                        |
//! | [`detector`]    | `InductionLoop` detector definition                     |
//! | [`xml`]         | `XmlElement` fragments, `AdditionalDocument`            |
//! | [`vocab`]       | Tag and attribute names of the simulator vocabulary     |

pub mod calibrator;
pub mod detector;
pub mod flow;
pub mod vocab;
pub mod xml;

#[cfg(test)]
mod tests;

pub use calibrator::{Calibrator, CalibratorTarget};
pub use detector::InductionLoop;
pub use flow::{Flow, FlowOp, FlowTemplate, ListOperand, Operand, apply_to_flows};
pub use xml::{AdditionalDocument, XmlElement, format_float};
