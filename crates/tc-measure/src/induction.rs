//! Readings reported by simulated induction-loop detectors.

use tc_core::{RawTimestamp, TcResult, seconds_to_duration};

use crate::measurement::{Measurement, MeasurementHeader};

/// One `<interval>` of a detector result file.  Speeds are m/s.
#[derive(Clone, Debug, PartialEq)]
pub struct InductionLoopMeasurement {
    header:             MeasurementHeader,
    pub flow:           f64,
    pub speed:          f64,
    pub occupancy:      f64,
    pub harmonic_speed: f64,
}

impl Measurement for InductionLoopMeasurement {
    fn header(&self) -> &MeasurementHeader {
        &self.header
    }
}

impl InductionLoopMeasurement {
    pub fn new(
        header:         MeasurementHeader,
        flow:           f64,
        speed:          f64,
        occupancy:      f64,
        harmonic_speed: f64,
    ) -> Self {
        Self { header, flow, speed, occupancy, harmonic_speed }
    }

    /// Build from the raw attribute values of a result interval.
    ///
    /// `end_secs` is the simulation-time end of the interval; the timestamp is
    /// `reference + end_secs`, with a zone-aware `reference` first converted
    /// to UTC.
    pub fn from_attributes(
        detector_id: &str,
        end_secs:    f64,
        values:      [f64; 4],
        reference:   impl Into<RawTimestamp>,
    ) -> TcResult<Self> {
        let [flow, speed, occupancy, harmonic_speed] = values;
        let base = reference.into().normalized().into_naive()?;
        let header = MeasurementHeader::new(base + seconds_to_duration(end_secs), detector_id)?;
        Ok(Self::new(header, flow, speed, occupancy, harmonic_speed))
    }
}
