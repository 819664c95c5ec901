//! `tc-measure` — dated, sensor-attributed observations.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                      |
//! |-----------------|---------------------------------------------------------------|
//! | [`measurement`] | `Measurement` trait, validated `MeasurementHeader`            |
//! | [`roadway`]     | `RoadwaySensorMeasurement`, row loaders, flow conversion      |
//! | [`induction`]   | `InductionLoopMeasurement` (simulator detector output)        |
//! | [`site`]        | `SensorSite` metadata rows → calibrators / detectors          |
//! | [`align`]       | `filter_by_time`, `align_measurements`                        |
//!
//! # Invariants
//!
//! A measurement cannot exist with an empty (after trimming) sensor id or a
//! zone-aware timestamp: both are rejected by [`MeasurementHeader::new`],
//! the only way to build the shared header.

pub mod align;
pub mod induction;
pub mod measurement;
pub mod roadway;
pub mod site;

#[cfg(test)]
mod tests;

pub use align::{Alignment, align_measurements, filter_by_time};
pub use induction::InductionLoopMeasurement;
pub use measurement::{Measurement, MeasurementHeader};
pub use roadway::{
    RoadwaySensorMeasurement, aggregate_by_site, load_measurements_csv, measurements_to_flows,
    parse_measurement_row, parse_measurements, parse_measurements_lenient, parse_measurements_reader,
};
pub use site::{SensorSite, induction_loops_for_lanes, parse_sensor_site_row, parse_sensor_sites};
